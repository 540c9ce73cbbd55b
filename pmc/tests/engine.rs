use std::sync::Mutex;

use itertools::Itertools;
use pmc::catalog::{CounterDef, Slot};
use pmc::{
    Command, CommandQueue, CounterClass, CounterEngine, Error, FamilyMask, MsrChannel,
    ProcessorIdentity, SchemeMask, Vendor,
};

struct FakeChannel {
    batches: Mutex<Vec<Vec<(Command, u32, u64)>>>,
}

impl FakeChannel {
    fn new() -> FakeChannel {
        FakeChannel {
            batches: Mutex::new(Vec::new()),
        }
    }

    fn batches(&self) -> Vec<Vec<(Command, u32, u64)>> {
        self.batches.lock().unwrap().clone()
    }
}

impl MsrChannel for FakeChannel {
    fn execute(&self, queue: &mut CommandQueue) -> Result<(), Error> {
        let batch = queue
            .commands()
            .iter()
            .map(|r| (r.command, r.register_number, r.value()))
            .collect();
        self.batches.lock().unwrap().push(batch);
        Ok(())
    }
}

fn identity(
    vendor: Vendor,
    scheme: SchemeMask,
    family: FamilyMask,
    general: u32,
    fixed: u32,
) -> ProcessorIdentity {
    ProcessorIdentity {
        vendor,
        family,
        model: 0,
        scheme,
        general_pmcs: general,
        fixed_pmcs: fixed,
    }
}

fn core2() -> ProcessorIdentity {
    identity(Vendor::Intel, SchemeMask::ID2, FamilyMask::INTEL_CORE2, 2, 3)
}

fn haswell() -> ProcessorIdentity {
    identity(Vendor::Intel, SchemeMask::ID3, FamilyMask::INTEL_HASWELL, 4, 3)
}

fn netburst() -> ProcessorIdentity {
    identity(Vendor::Intel, SchemeMask::P4, FamilyMask::INTEL_P4, 2, 0)
}

fn pentium_mmx() -> ProcessorIdentity {
    identity(Vendor::Intel, SchemeMask::P1, FamilyMask::INTEL_P1MMX, 2, 0)
}

fn core1() -> ProcessorIdentity {
    identity(Vendor::Intel, SchemeMask::ID1, FamilyMask::INTEL_CORE, 2, 0)
}

fn athlon64() -> ProcessorIdentity {
    identity(Vendor::Amd, SchemeMask::AMD, FamilyMask::AMD_ATHLON64, 4, 0)
}

fn nano() -> ProcessorIdentity {
    identity(Vendor::Via, SchemeMask::VIA, FamilyMask::VIA_NANO, 2, 0)
}

fn writes_to(queue: &CommandQueue, register: u32) -> Vec<u64> {
    queue
        .commands()
        .iter()
        .filter(|r| r.command == Command::WriteMsr && r.register_number == register)
        .map(|r| r.value())
        .collect()
}

#[test]
fn core2_fixed_and_general_allocation() {
    let mut engine = CounterEngine::new(core2(), 1);
    engine.define_counter(1).unwrap();
    engine.define_counter(9).unwrap();
    engine.define_counter(100).unwrap();

    let counters = engine.counters();
    assert_eq!(counters.len(), 3);
    assert_eq!(counters[0].class, CounterClass::Fixed);
    assert_eq!(counters[0].register, 1);
    assert_eq!(counters[0].rdpmc_index(), 0x4000_0001);
    assert_eq!(counters[1].class, CounterClass::Fixed);
    assert_eq!(counters[1].register, 0);
    assert_eq!(counters[1].rdpmc_index(), 0x4000_0000);
    // the general counter lands on register 0 without clashing with the
    // fixed bank's register 0
    assert_eq!(counters[2].class, CounterClass::General);
    assert_eq!(counters[2].register, 0);
    assert_eq!(counters[2].rdpmc_index(), 0);
    assert_eq!(counters[2].name, "Uops");

    insta::assert_snapshot!(engine.start_queue(0).to_string(), @r"
    wrmsr 0x38d <- 0x222
    wrmsr 0x38f <- 0x700000003
    wrmsr 0x186 <- 0x410fc2
    wrmsr 0xc1 <- 0x0
    ");
    insta::assert_snapshot!(engine.stop_queue(0).to_string(), @r"
    wrmsr 0x38d <- 0x0
    wrmsr 0x38f <- 0x0
    wrmsr 0x186 <- 0x0
    wrmsr 0xc1 <- 0x0
    ");
}

#[test]
fn enable_writes_are_emitted_once_per_batch() {
    let mut engine = CounterEngine::new(core2(), 1);
    for id in [1, 2, 9, 10, 100] {
        engine.define_counter(id).unwrap();
    }
    // three fixed and two general counters, but each enable register is
    // written exactly once
    assert_eq!(writes_to(engine.start_queue(0), 0x38D), vec![0x222]);
    assert_eq!(writes_to(engine.start_queue(0), 0x38F), vec![0x0000_0007_0000_0003]);
    assert_eq!(writes_to(engine.stop_queue(0), 0x38D), vec![0]);
    assert_eq!(writes_to(engine.stop_queue(0), 0x38F), vec![0]);
}

#[test]
fn every_thread_gets_the_same_programming() {
    let mut engine = CounterEngine::new(core2(), 3);
    engine.define_counter(100).unwrap();
    let q0 = engine.start_queue(0).to_string();
    assert_eq!(q0, engine.start_queue(1).to_string());
    assert_eq!(q0, engine.start_queue(2).to_string());
}

#[test]
fn permuted_requests_never_double_assign() {
    let ids = [10u16, 100, 201, 207];
    for order in ids.iter().permutations(ids.len()) {
        let mut engine = CounterEngine::new(haswell(), 1);
        for &&id in &order {
            engine.define_counter(id).unwrap();
        }
        let mut registers: Vec<u32> = engine.counters().iter().map(|c| c.register).collect();
        registers.sort_unstable();
        assert_eq!(registers, vec![0, 1, 2, 3], "order {order:?}");

        // all four general registers taken, the next request must fail
        assert_eq!(engine.define_counter(22), Err(Error::RegistersInUse));
    }
}

#[test]
fn netburst_skips_counters_with_busy_escr() {
    let mut engine = CounterEngine::new(netburst(), 1);
    engine.define_counter(100).unwrap();
    engine.define_counter(101).unwrap();

    let counters = engine.counters();
    assert_eq!(counters[0].register, 4);
    assert_eq!(counters[0].class, CounterClass::FastRead);
    assert_eq!(counters[0].rdpmc_index(), 0x8000_0004);
    // counter 5 shares counter 4's ESCR, so the second uops counter lands
    // on counter 6
    assert_eq!(counters[1].register, 6);

    // both registers 5 and 7 are still free, but their ESCRs are taken
    assert_eq!(engine.define_counter(102), Err(Error::RegistersInUse));

    // ESCR 0x3C0, CCCR 0x364 and counter 0x304 for the first allocation
    assert_eq!(writes_to(engine.start_queue(0), 0x3C0), vec![0x1200_0E3C]);
    assert_eq!(writes_to(engine.start_queue(0), 0x364), vec![0x0003_1000]);
    assert_eq!(writes_to(engine.start_queue(0), 0x304), vec![0]);
    assert_eq!(writes_to(engine.stop_queue(0), 0x3C0), vec![0]);
}

#[test]
fn netburst_seventh_request_exceeds_counter_limit() {
    let mut engine = CounterEngine::new(netburst(), 1);
    for id in [100, 110, 150, 200, 310, 210] {
        engine.define_counter(id).unwrap();
    }
    assert_eq!(engine.counters().len(), 6);
    assert_eq!(engine.define_counter(320), Err(Error::TooManyCounters));
    assert_eq!(engine.counters().len(), 6);
}

#[test]
fn pentium_packs_second_counter_into_shared_cesr() {
    let mut engine = CounterEngine::new(pentium_mmx(), 1);
    engine.define_counter(9).unwrap();
    engine.define_counter(11).unwrap();

    let registers: Vec<u32> = engine.counters().iter().map(|c| c.register).collect();
    assert_eq!(registers, vec![0, 1]);

    // counter 0 writes its encoding, counter 1 merges into the high half
    assert_eq!(writes_to(engine.start_queue(0), 0x11), vec![0x96, 0x0097_0096]);
    assert_eq!(writes_to(engine.start_queue(0), 0x12), vec![0]);
    assert_eq!(writes_to(engine.start_queue(0), 0x13), vec![0]);
}

#[test]
fn core1_restricts_counting_to_this_core() {
    let mut engine = CounterEngine::new(core1(), 1);
    engine.define_counter(9).unwrap();
    assert_eq!(writes_to(engine.start_queue(0), 0x186), vec![0x0041_40C0]);
}

#[test]
fn amd_uses_its_own_register_block() {
    let mut engine = CounterEngine::new(athlon64(), 1);
    engine.define_counter(9).unwrap();
    engine.define_counter(100).unwrap();

    assert_eq!(writes_to(engine.start_queue(0), 0xC001_0000), vec![0x0041_00C0]);
    assert_eq!(writes_to(engine.start_queue(0), 0xC001_0004), vec![0]);
    assert_eq!(writes_to(engine.start_queue(0), 0xC001_0001), vec![0x0041_00C1]);
    assert_eq!(writes_to(engine.start_queue(0), 0xC001_0005), vec![0]);
}

#[test]
fn via_event_goes_into_low_byte_without_unit_mask() {
    let mut engine = CounterEngine::new(nano(), 1);
    engine.define_counter(0x1000).unwrap();
    assert_eq!(writes_to(engine.start_queue(0), 0x186), vec![0x0041_0000]);
    assert_eq!(writes_to(engine.start_queue(0), 0xC1), vec![0]);
}

#[test]
fn id_zero_request_is_a_noop() {
    let mut engine = CounterEngine::new(core2(), 1);
    engine.define_counter(0).unwrap();
    assert!(engine.counters().is_empty());
    assert!(engine.start_queue(0).is_empty());
}

#[test]
fn unknown_id_reports_no_matching_definition() {
    let mut engine = CounterEngine::new(core2(), 1);
    assert_eq!(engine.define_counter(9999), Err(Error::NoMatchingDefinition));
    assert!(engine.counters().is_empty());
}

#[test]
fn family_mismatch_is_rechecked_on_the_record() {
    let def = CounterDef {
        id: 77,
        scheme: SchemeMask::ID2,
        family: FamilyMask::AMD_ANY,
        slot: Slot::Range { first: 0, last: 1 },
        escr_select: 0,
        event: 0xC0,
        unit_mask: 0,
        name: "elsewhere",
    };
    let mut engine = CounterEngine::new(core2(), 1);
    assert_eq!(engine.define_from(&def), Err(Error::NotDefinedForFamily));
    assert!(engine.counters().is_empty());
}

#[test]
fn unknown_scheme_cannot_program_anything() {
    let id = identity(Vendor::Intel, SchemeMask::empty(), FamilyMask::INTEL_CORE2, 2, 0);
    let def = CounterDef {
        id: 77,
        scheme: SchemeMask::ID2,
        family: FamilyMask::INTEL_CORE2,
        slot: Slot::Range { first: 0, last: 1 },
        escr_select: 0,
        event: 0xC0,
        unit_mask: 0,
        name: "nowhere",
    };
    let mut engine = CounterEngine::new(id, 1);
    assert_eq!(engine.define_from(&def), Err(Error::UnsupportedScheme));
}

#[test]
fn lock_processor_brackets_each_thread_batch() {
    let channel = FakeChannel::new();
    let mut engine = CounterEngine::new(core2(), 2);
    engine.lock_processor(&[2, 3]).unwrap();
    engine.define_counter(9).unwrap();

    let (mut starts, mut stops) = engine.into_queues();
    for q in starts.iter_mut().chain(stops.iter_mut()) {
        channel.execute(q).unwrap();
    }

    let batches = channel.batches();
    assert_eq!(batches.len(), 4);
    // start batches: pin, enable rdpmc, then the fixed-counter enable
    assert_eq!(
        batches[0],
        vec![
            (Command::SetProcessor, 0, 2),
            (Command::EnablePmc, 0, 0),
            (Command::WriteMsr, 0x38D, 0x222),
        ]
    );
    assert_eq!(batches[1][0], (Command::SetProcessor, 0, 3));
    // stop batches: pin, disable rdpmc, then reset
    assert_eq!(
        batches[2],
        vec![
            (Command::SetProcessor, 0, 2),
            (Command::DisablePmc, 0, 0),
            (Command::WriteMsr, 0x38D, 0),
        ]
    );
    assert_eq!(batches[3][1], (Command::DisablePmc, 0, 0));
}
