use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// Synchronization point where every participant must arrive before any
/// proceeds. One bit per thread; each thread only ever sets its own bit.
pub trait Rendezvous: Sync {
    fn arrive_and_wait(&self, slot: usize);
}

/// Production barrier: an unbounded busy-wait with no timeout. A thread
/// that never arrives hangs all the others; this keeps the release path
/// free of any scheduling noise.
pub struct SpinBarrier {
    flags: AtomicU64,
    expected: u64,
}

impl SpinBarrier {
    pub fn new(threads: usize) -> SpinBarrier {
        SpinBarrier {
            flags: AtomicU64::new(0),
            expected: all_ones(threads),
        }
    }

    pub fn arrived(&self) -> u64 {
        self.flags.load(Ordering::Acquire)
    }

    pub fn expected(&self) -> u64 {
        self.expected
    }
}

impl Rendezvous for SpinBarrier {
    fn arrive_and_wait(&self, slot: usize) {
        self.flags.fetch_or(1 << slot, Ordering::Release);
        while self.flags.load(Ordering::Acquire) != self.expected {
            std::hint::spin_loop();
        }
    }
}

/// Debug substitute: same release condition, but built on a condition
/// variable with a timeout so a missing participant turns into a panic
/// instead of a silent hang. Not used on the measurement path.
pub struct TimedBarrier {
    flags: Mutex<u64>,
    cond: Condvar,
    expected: u64,
    timeout: Duration,
}

impl TimedBarrier {
    pub fn new(threads: usize, timeout: Duration) -> TimedBarrier {
        TimedBarrier {
            flags: Mutex::new(0),
            cond: Condvar::new(),
            expected: all_ones(threads),
            timeout,
        }
    }
}

impl Rendezvous for TimedBarrier {
    fn arrive_and_wait(&self, slot: usize) {
        let mut flags = self.flags.lock().unwrap_or_else(|e| e.into_inner());
        *flags |= 1 << slot;
        self.cond.notify_all();
        while *flags != self.expected {
            let (guard, result) = self
                .cond
                .wait_timeout(flags, self.timeout)
                .unwrap_or_else(|e| e.into_inner());
            flags = guard;
            if result.timed_out() && *flags != self.expected {
                panic!(
                    "rendezvous timed out: arrived {:#x}, expected {:#x}",
                    *flags, self.expected
                );
            }
        }
        self.cond.notify_all();
    }
}

fn all_ones(threads: usize) -> u64 {
    if threads >= 64 {
        u64::MAX
    } else {
        (1u64 << threads) - 1
    }
}
