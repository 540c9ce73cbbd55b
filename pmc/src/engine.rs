use smallvec::SmallVec;

use crate::catalog::{self, CounterDef, Slot};
use crate::identity::{ProcessorIdentity, SchemeMask};
use crate::layout;
use crate::p4;
use crate::queue::{Command, CommandQueue};
use crate::Error;

/// Maximum number of counters in one measurement run.
pub const MAX_COUNTERS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterClass {
    General,
    /// Fixed-function counter; the register number indexes the fixed bank.
    Fixed,
    /// Netburst counter read through the fast RDPMC path.
    FastRead,
}

#[derive(Debug, Clone, Copy)]
pub struct AllocatedCounter {
    pub register: u32,
    pub class: CounterClass,
    pub name: &'static str,
}

impl AllocatedCounter {
    /// ECX value for the RDPMC instruction reading this counter.
    pub fn rdpmc_index(&self) -> u32 {
        match self.class {
            CounterClass::General => self.register,
            CounterClass::Fixed => 1 << 30 | self.register,
            CounterClass::FastRead => 1 << 31 | self.register,
        }
    }
}

/// Allocation and programming session for one measurement run. Resolves
/// counter requests against the catalog, hands out conflict-free registers
/// and fills one start and one stop command queue per thread.
pub struct CounterEngine {
    identity: ProcessorIdentity,
    num_threads: usize,
    start_queues: Vec<CommandQueue>,
    stop_queues: Vec<CommandQueue>,
    allocated: SmallVec<[AllocatedCounter; MAX_COUNTERS]>,
    escr_in_use: SmallVec<[u32; MAX_COUNTERS]>,
    // CESR value last written; counter 1's encoding merges into it
    p1_cesr_written: u32,
    // one-shot enable latches for the Core-2-and-later global control MSRs
    general_enabled: bool,
    fixed_enabled: bool,
}

impl CounterEngine {
    pub fn new(identity: ProcessorIdentity, num_threads: usize) -> CounterEngine {
        let num_threads = num_threads.max(1);
        CounterEngine {
            identity,
            num_threads,
            start_queues: (0..num_threads).map(|_| CommandQueue::new()).collect(),
            stop_queues: (0..num_threads).map(|_| CommandQueue::new()).collect(),
            allocated: SmallVec::new(),
            escr_in_use: SmallVec::new(),
            p1_cesr_written: 0,
            general_enabled: false,
            fixed_enabled: false,
        }
    }

    pub fn identity(&self) -> &ProcessorIdentity {
        &self.identity
    }

    pub fn counters(&self) -> &[AllocatedCounter] {
        &self.allocated
    }

    pub fn start_queue(&self, thread: usize) -> &CommandQueue {
        &self.start_queues[thread]
    }

    pub fn stop_queue(&self, thread: usize) -> &CommandQueue {
        &self.stop_queues[thread]
    }

    pub fn into_queues(self) -> (Vec<CommandQueue>, Vec<CommandQueue>) {
        (self.start_queues, self.stop_queues)
    }

    /// Bind each thread's batches to its processor number and gate the
    /// RDPMC instruction around the run.
    pub fn lock_processor(&mut self, processors: &[usize]) -> Result<(), Error> {
        for (t, &p) in processors.iter().enumerate().take(self.num_threads) {
            self.start_queues[t].put(Command::SetProcessor, 0, p as u64)?;
            self.start_queues[t].put(Command::EnablePmc, 0, 0)?;
            self.stop_queues[t].put(Command::SetProcessor, 0, p as u64)?;
            self.stop_queues[t].put(Command::DisablePmc, 0, 0)?;
        }
        Ok(())
    }

    /// Set up the counter with the given id. Id 0 is a no-op request.
    pub fn define_counter(&mut self, id: u16) -> Result<(), Error> {
        if id == 0 {
            return Ok(());
        }
        let def = catalog::lookup(catalog::COUNTER_DEFINITIONS, &self.identity, id)
            .ok_or(Error::NoMatchingDefinition)?;
        self.define_from(def)
    }

    /// Set up a counter from a catalog record.
    pub fn define_from(&mut self, def: &CounterDef) -> Result<(), Error> {
        if !def.family.intersects(self.identity.family) {
            return Err(Error::NotDefinedForFamily);
        }
        if self.allocated.len() >= MAX_COUNTERS {
            return Err(Error::TooManyCounters);
        }

        let (register, class) = self.select_register(def)?;

        let scheme = self.identity.scheme;
        if scheme.intersects(SchemeMask::P1) {
            self.program_p1(def, register)?;
        } else if scheme.intersects(SchemeMask::ID23) {
            if class == CounterClass::Fixed {
                self.enable_fixed()?;
            } else {
                self.enable_general()?;
                self.program_perfevtsel(def, register, false)?;
            }
        } else if scheme.intersects(SchemeMask::P2 | SchemeMask::ID1) {
            self.program_perfevtsel(def, register, scheme.intersects(SchemeMask::ID1))?;
        } else if scheme.intersects(SchemeMask::P4) {
            self.program_p4(def, register)?;
        } else if scheme.intersects(SchemeMask::AMD) {
            self.program_amd(def, register)?;
        } else if scheme.intersects(SchemeMask::VIA) {
            self.program_via(def, register)?;
        } else {
            return Err(Error::UnsupportedScheme);
        }

        let class = if scheme.intersects(SchemeMask::P4) && class == CounterClass::General {
            CounterClass::FastRead
        } else {
            class
        };
        self.allocated.push(AllocatedCounter {
            register,
            class,
            name: def.name,
        });
        Ok(())
    }

    /// Pick the first vacant register in the record's range. Fixed-function
    /// records name their register directly and never scan.
    fn select_register(&self, def: &CounterDef) -> Result<(u32, CounterClass), Error> {
        match def.slot {
            Slot::Fixed(n) => Ok((n as u32, CounterClass::Fixed)),
            Slot::Range { first, last } => {
                let last = last.max(first);
                for candidate in first..=last {
                    let candidate = candidate as u32;
                    if self
                        .allocated
                        .iter()
                        .any(|a| a.class != CounterClass::Fixed && a.register == candidate)
                    {
                        continue;
                    }
                    if self.identity.scheme.intersects(SchemeMask::P4) {
                        // the ESCR derived from this counter must be free too
                        match p4::escr_address(candidate, def.escr_select as u32) {
                            Some(escr) if !self.escr_in_use.contains(&escr) => {}
                            _ => continue,
                        }
                    }
                    return Ok((candidate, CounterClass::General));
                }
                Err(Error::RegistersInUse)
            }
        }
    }

    fn put_start(&mut self, register: u32, value: u64) -> Result<(), Error> {
        for q in &mut self.start_queues {
            q.put(Command::WriteMsr, register, value)?;
        }
        Ok(())
    }

    fn put_stop(&mut self, register: u32, value: u64) -> Result<(), Error> {
        for q in &mut self.stop_queues {
            q.put(Command::WriteMsr, register, value)?;
        }
        Ok(())
    }

    fn program_p1(&mut self, def: &CounterDef, register: u32) -> Result<(), Error> {
        let mut cesr = layout::p1_cesr(def.event, def.unit_mask);
        if register == 1 {
            cesr = layout::p1_pair(self.p1_cesr_written, cesr);
        }
        self.put_start(layout::MSR_P1_CESR, cesr as u64)?;
        self.put_stop(layout::MSR_P1_CESR, 0)?;
        self.put_start(layout::MSR_P1_CTR0 + register, 0)?;
        self.put_stop(layout::MSR_P1_CTR0 + register, 0)?;
        self.p1_cesr_written = cesr;
        Ok(())
    }

    fn enable_fixed(&mut self) -> Result<(), Error> {
        if self.fixed_enabled {
            return Ok(());
        }
        self.fixed_enabled = true;
        let ctrl = layout::fixed_ctr_ctrl(self.identity.fixed_pmcs);
        self.put_start(layout::MSR_PERF_FIXED_CTR_CTRL, ctrl)?;
        self.put_stop(layout::MSR_PERF_FIXED_CTR_CTRL, 0)
    }

    fn enable_general(&mut self) -> Result<(), Error> {
        if self.general_enabled {
            return Ok(());
        }
        self.general_enabled = true;
        let ctrl = layout::global_ctrl(self.identity.general_pmcs, self.identity.fixed_pmcs);
        self.put_start(layout::MSR_PERF_GLOBAL_CTRL, ctrl)?;
        self.put_stop(layout::MSR_PERF_GLOBAL_CTRL, 0)
    }

    fn program_perfevtsel(
        &mut self,
        def: &CounterDef,
        register: u32,
        this_core_only: bool,
    ) -> Result<(), Error> {
        let value = layout::perfevtsel(def.event, def.unit_mask, this_core_only);
        let evtsel = layout::MSR_PERFEVTSEL0 + register;
        let counter = layout::MSR_PMC0 + register;
        self.put_start(evtsel, value)?;
        self.put_stop(evtsel, 0)?;
        self.put_start(counter, 0)?;
        self.put_stop(counter, 0)
    }

    fn program_p4(&mut self, def: &CounterDef, register: u32) -> Result<(), Error> {
        let escr = p4::escr_address(register, def.escr_select as u32)
            .ok_or(Error::RegistersInUse)?;
        self.put_start(escr, layout::p4_escr(def.event, def.unit_mask))?;
        self.put_stop(escr, 0)?;
        let cccr = layout::MSR_P4_CCCR0 + register;
        self.put_start(cccr, layout::p4_cccr(def.escr_select))?;
        self.put_stop(cccr, 0)?;
        let counter = layout::MSR_P4_CTR0 + register;
        self.put_start(counter, 0)?;
        self.put_stop(counter, 0)?;
        self.escr_in_use.push(escr);
        Ok(())
    }

    fn program_amd(&mut self, def: &CounterDef, register: u32) -> Result<(), Error> {
        let value = layout::perfevtsel(def.event, def.unit_mask, false);
        let evtsel = layout::MSR_AMD_PERF_CTL0 + register;
        let counter = layout::MSR_AMD_PERF_CTR0 + register;
        self.put_start(evtsel, value)?;
        self.put_stop(evtsel, 0)?;
        self.put_start(counter, 0)?;
        self.put_stop(counter, 0)
    }

    fn program_via(&mut self, def: &CounterDef, register: u32) -> Result<(), Error> {
        let value = layout::via_evtsel(def.event);
        let evtsel = layout::MSR_PERFEVTSEL0 + register;
        let counter = layout::MSR_PMC0 + register;
        self.put_start(evtsel, value)?;
        self.put_stop(evtsel, 0)?;
        self.put_start(counter, 0)?;
        self.put_stop(counter, 0)
    }
}
