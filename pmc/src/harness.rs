use log::{error, warn};
use smallvec::SmallVec;

use crate::barrier::{Rendezvous, SpinBarrier};
use crate::channel::MsrChannel;
use crate::engine::{AllocatedCounter, CounterEngine, MAX_COUNTERS};
use crate::identity::ProcessorIdentity;
use crate::os;
use crate::queue::CommandQueue;
use crate::raw;
use crate::Error;

pub const MAX_THREADS: usize = 8;
pub const MAX_REPEAT: usize = 128;
pub const OVERHEAD_REPETITIONS: usize = 5;

pub struct MeasureOptions {
    pub threads: usize,
    pub repetitions: usize,
    pub overhead_repetitions: usize,
    pub counter_ids: Vec<u16>,
}

impl Default for MeasureOptions {
    fn default() -> MeasureOptions {
        MeasureOptions {
            threads: 1,
            repetitions: 8,
            overhead_repetitions: OVERHEAD_REPETITIONS,
            counter_ids: Vec::new(),
        }
    }
}

/// Results of one worker, owned and written only by its thread and read
/// after join.
#[derive(Debug)]
pub struct ThreadMeasurement {
    pub processor: usize,
    /// Overhead-subtracted clock count per repetition.
    pub clock: Vec<i64>,
    /// Overhead-subtracted counts per configured counter per repetition.
    pub counters: Vec<Vec<i64>>,
}

#[derive(Debug)]
pub struct Measurement {
    pub counter_names: Vec<&'static str>,
    pub threads: Vec<ThreadMeasurement>,
}

/// Choose a distinct logical processor for each thread from the allowed
/// set. With at least four processors the low/high-half interleave makes
/// sibling threads prefer distinct physical cores. The last thread (the
/// caller) gets the lowest number.
pub fn assign_processors(threads: usize, allowed: &[usize]) -> Result<Vec<usize>, Error> {
    let count = allowed.len();
    let mut processors = Vec::with_capacity(threads);
    for t in 0..threads {
        let i = threads - 1 - t;
        let p = if count < 4 {
            i
        } else {
            (i % 2) * (count / 2) + i / 2
        };
        if !allowed.contains(&p) {
            return Err(Error::ProcessorUnavailable {
                requested: p,
                available: allowed.to_vec(),
            });
        }
        processors.push(p);
    }
    Ok(processors)
}

/// Run `workload` on the configured number of pinned threads, reading the
/// clock and the configured counters around every repetition and
/// subtracting the self-measured overhead.
///
/// A channel is required as soon as any counter id is requested; with no
/// counters the run is clock-only and never touches privileged state.
pub fn measure<F>(
    identity: &ProcessorIdentity,
    channel: Option<&dyn MsrChannel>,
    options: &MeasureOptions,
    workload: F,
) -> Result<Measurement, Error>
where
    F: Fn(usize) + Sync,
{
    let threads = options.threads.clamp(1, MAX_THREADS);
    let repetitions = options.repetitions.clamp(1, MAX_REPEAT);
    let overhead_repetitions = options.overhead_repetitions.max(1);
    let use_pmc = options.counter_ids.iter().any(|&id| id != 0);

    let allowed = os::allowed_processors(MAX_THREADS);
    let processors = assign_processors(threads, &allowed)?;

    let mut engine = CounterEngine::new(*identity, threads);
    if use_pmc {
        if channel.is_none() {
            return Err(Error::ChannelRequired);
        }
        engine.lock_processor(&processors)?;
        for &id in &options.counter_ids {
            if let Err(err) = engine.define_counter(id) {
                warn!("cannot set up counter {id}: {err}");
            }
        }
    }
    let counters: Vec<AllocatedCounter> = engine.counters().to_vec();
    let (start_queues, stop_queues) = engine.into_queues();
    let channel = if use_pmc { channel } else { None };

    let barrier = SpinBarrier::new(threads);
    let mut results: Vec<ThreadMeasurement> = Vec::with_capacity(threads);

    os::set_priority_high();
    std::thread::scope(|scope| {
        let mut pairs: Vec<(CommandQueue, CommandQueue)> =
            start_queues.into_iter().zip(stop_queues).collect();
        let last_pair = pairs.pop().expect("at least one thread");

        let mut handles = Vec::with_capacity(threads - 1);
        for (slot, (mut start, mut stop)) in pairs.into_iter().enumerate() {
            let barrier = &barrier;
            let counters = &counters;
            let workload = &workload;
            let processor = processors[slot];
            handles.push(scope.spawn(move || {
                run_worker(
                    slot,
                    processor,
                    &mut start,
                    &mut stop,
                    channel,
                    barrier,
                    counters,
                    repetitions,
                    overhead_repetitions,
                    workload,
                )
            }));
        }

        let slot = threads - 1;
        let (mut start, mut stop) = last_pair;
        let last = run_worker(
            slot,
            processors[slot],
            &mut start,
            &mut stop,
            channel,
            &barrier,
            &counters,
            repetitions,
            overhead_repetitions,
            &workload,
        );

        for handle in handles {
            match handle.join() {
                Ok(measurement) => results.push(measurement),
                Err(payload) => std::panic::resume_unwind(payload),
            }
        }
        results.push(last);
    });
    os::set_priority_normal();

    Ok(Measurement {
        counter_names: counters.iter().map(|c| c.name).collect(),
        threads: results,
    })
}

#[allow(clippy::too_many_arguments)]
fn run_worker<F>(
    slot: usize,
    processor: usize,
    start_queue: &mut CommandQueue,
    stop_queue: &mut CommandQueue,
    channel: Option<&dyn MsrChannel>,
    barrier: &SpinBarrier,
    counters: &[AllocatedCounter],
    repetitions: usize,
    overhead_repetitions: usize,
    workload: &F,
) -> ThreadMeasurement
where
    F: Fn(usize) + Sync,
{
    os::pin_current_thread(processor);

    if let Some(channel) = channel {
        if let Err(err) = channel.execute(start_queue) {
            error!("start batch failed on processor {processor}: {err}");
        }
    }
    os::yield_timeslice();
    barrier.arrive_and_wait(slot);

    // The empty bracket measures the counts the measurement itself
    // produces. Interrupts only ever inflate a sample, so the minimum is
    // the bare overhead.
    let channels = counters.len() + 1;
    let mut overhead: SmallVec<[i64; MAX_COUNTERS + 1]> =
        SmallVec::from_elem(i64::MAX, channels);
    for _ in 0..overhead_repetitions {
        let sample = timed_bracket(counters, || {});
        fold_minimum(&mut overhead, &sample);
    }

    let mut clock = Vec::with_capacity(repetitions);
    let mut per_counter: Vec<Vec<i64>> = vec![Vec::with_capacity(repetitions); counters.len()];
    for _ in 0..repetitions {
        let sample = timed_bracket(counters, || workload(slot));
        clock.push(sample[0] - overhead[0]);
        for (c, out) in per_counter.iter_mut().enumerate() {
            out.push(sample[c + 1] - overhead[c + 1]);
        }
    }

    os::yield_timeslice();
    if let Some(channel) = channel {
        if let Err(err) = channel.execute(stop_queue) {
            error!("stop batch failed on processor {processor}: {err}");
        }
    }

    ThreadMeasurement {
        processor,
        clock,
        counters: per_counter,
    }
}

/// One serialized read bracket around `body`: clock first, then every
/// configured counter, identical on both sides.
fn timed_bracket(
    counters: &[AllocatedCounter],
    body: impl FnOnce(),
) -> SmallVec<[i64; MAX_COUNTERS + 1]> {
    let mut pmc_before = [0u64; MAX_COUNTERS];

    raw::serialize();
    for (i, counter) in counters.iter().enumerate() {
        pmc_before[i] = raw::read_pmc(counter.rdpmc_index());
    }
    raw::serialize();
    let tsc_before = raw::read_tsc();
    raw::serialize();

    body();

    raw::serialize();
    let tsc_after = raw::read_tsc();
    raw::serialize();

    let mut sample = SmallVec::new();
    sample.push(tsc_after.wrapping_sub(tsc_before) as i64);
    for (i, counter) in counters.iter().enumerate() {
        sample.push(raw::read_pmc(counter.rdpmc_index()).wrapping_sub(pmc_before[i]) as i64);
    }
    raw::serialize();
    sample
}

fn fold_minimum(minimum: &mut [i64], sample: &[i64]) {
    for (m, &s) in minimum.iter_mut().zip(sample) {
        if s < *m {
            *m = s;
        }
    }
}
