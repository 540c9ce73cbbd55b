//! Thread affinity, priority and yield primitives.

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        use log::warn;

        /// Logical processors the process may run on, among the first
        /// `limit` processor numbers.
        pub fn allowed_processors(limit: usize) -> Vec<usize> {
            let mut set: libc::cpu_set_t = unsafe { std::mem::zeroed() };
            let rc = unsafe {
                libc::sched_getaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mut set)
            };
            if rc != 0 {
                warn!("sched_getaffinity failed, assuming all processors available");
                return (0..limit).collect();
            }
            (0..limit)
                .filter(|&p| unsafe { libc::CPU_ISSET(p, &set) })
                .collect()
        }

        /// Pin the calling thread to one logical processor.
        pub fn pin_current_thread(processor: usize) {
            let mut set: libc::cpu_set_t = unsafe { std::mem::zeroed() };
            unsafe {
                libc::CPU_SET(processor, &mut set);
            }
            let rc = unsafe {
                libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set)
            };
            if rc != 0 {
                warn!("failed to pin thread to processor {processor}");
            }
        }

        pub fn set_priority_high() {
            // needs privileges; a failure only costs measurement stability
            unsafe {
                libc::setpriority(libc::PRIO_PROCESS as _, 0, -20);
            }
        }

        pub fn set_priority_normal() {
            unsafe {
                libc::setpriority(libc::PRIO_PROCESS as _, 0, 0);
            }
        }
    } else {
        pub fn allowed_processors(limit: usize) -> Vec<usize> {
            (0..limit).collect()
        }

        pub fn pin_current_thread(_processor: usize) {}

        pub fn set_priority_high() {}

        pub fn set_priority_normal() {}
    }
}

/// Give up the rest of the current timeslice.
pub fn yield_timeslice() {
    std::thread::yield_now();
}
