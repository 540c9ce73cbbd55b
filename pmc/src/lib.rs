mod barrier;
pub mod catalog;
mod channel;
mod engine;
mod harness;
mod identity;
mod layout;
mod os;
mod p4;
mod queue;
mod raw;

pub use barrier::{Rendezvous, SpinBarrier, TimedBarrier};
#[cfg(target_os = "linux")]
pub use channel::DevMsrChannel;
pub use channel::MsrChannel;
pub use engine::{AllocatedCounter, CounterClass, CounterEngine, MAX_COUNTERS};
pub use harness::{
    measure, MeasureOptions, Measurement, ThreadMeasurement, MAX_REPEAT, MAX_THREADS,
    OVERHEAD_REPETITIONS,
};
pub use identity::{CpuidReader, CpuidWords, FamilyMask, HostCpuid, ProcessorIdentity, SchemeMask, Vendor};
pub use p4::escr_address;
pub use queue::{Command, CommandQueue, MsrRequest, MAX_QUE_ENTRIES};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("No matching counter definition found")]
    NoMatchingDefinition,
    #[error("Counter not defined for present microprocessor family")]
    NotDefinedForFamily,
    #[error("Too many counters")]
    TooManyCounters,
    #[error("Counter registers are already in use")]
    RegistersInUse,
    #[error("No counters defined for present microprocessor family")]
    UnsupportedScheme,
    #[error("Command queue is full")]
    QueueFull,
    #[error("Control register {0} cannot be accessed")]
    InvalidControlRegister(u32),
    #[error("Cannot open MSR driver device {device}")]
    ChannelOpen { device: &'static str },
    #[error("MSR driver request failed with status {status}")]
    ChannelStatus { status: i32 },
    #[error("Performance counters requested but no MSR channel available")]
    ChannelRequired,
    #[error("Processor {requested} not available. Processors available: {available:?}")]
    ProcessorUnavailable {
        requested: usize,
        available: Vec<usize>,
    },
}
