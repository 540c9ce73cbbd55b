//! Counter definition catalog.
//!
//! A flat, ordered table mapping a portable counter id to register ranges
//! and event encodings per scheme and family. The same id appears in
//! several rows; lookup takes the FIRST row whose scheme and family masks
//! intersect the detected identity, so table order encodes precedence.
//! Do not reorder rows or replace the scan with a keyed map.

use crate::identity::{FamilyMask, ProcessorIdentity, SchemeMask};

pub const COUNTER_NAME_LEN: usize = 10;

/// Which register a record programs: a scan range over the general
/// counters, or one fixed-function counter named directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Range { first: u8, last: u8 },
    Fixed(u8),
}

#[derive(Debug, Clone, Copy)]
pub struct CounterDef {
    /// Portable id; the same event keeps its id across families.
    pub id: u16,
    pub scheme: SchemeMask,
    pub family: FamilyMask,
    pub slot: Slot,
    /// CCCR event select number (Netburst only).
    pub escr_select: u8,
    pub event: u16,
    pub unit_mask: u16,
    pub name: &'static str,
}

impl CounterDef {
    pub fn is_sentinel(&self) -> bool {
        self.id == 0 && self.family.is_empty()
    }

    pub fn matches(&self, identity: &ProcessorIdentity) -> bool {
        self.scheme.intersects(identity.scheme) && self.family.intersects(identity.family)
    }
}

const fn gp(
    id: u16,
    scheme: SchemeMask,
    family: FamilyMask,
    first: u8,
    last: u8,
    escr_select: u8,
    event: u16,
    unit_mask: u16,
    name: &'static str,
) -> CounterDef {
    CounterDef {
        id,
        scheme,
        family,
        slot: Slot::Range { first, last },
        escr_select,
        event,
        unit_mask,
        name,
    }
}

const fn fx(id: u16, scheme: SchemeMask, family: FamilyMask, counter: u8, name: &'static str) -> CounterDef {
    CounterDef {
        id,
        scheme,
        family,
        slot: Slot::Fixed(counter),
        escr_select: 0,
        event: 0,
        unit_mask: 0,
        name,
    }
}

pub(crate) const SENTINEL: CounterDef = CounterDef {
    id: 0,
    scheme: SchemeMask::empty(),
    family: FamilyMask::empty(),
    slot: Slot::Range { first: 0, last: 0 },
    escr_select: 0,
    event: 0,
    unit_mask: 0,
    name: "",
};

/// Rows up to (excluding) the terminating sentinel.
pub fn entries(table: &[CounterDef]) -> &[CounterDef] {
    let end = table
        .iter()
        .position(|d| d.is_sentinel())
        .unwrap_or(table.len());
    &table[..end]
}

/// First row with the requested id matching the identity's scheme and
/// family masks.
pub fn lookup<'a>(
    table: &'a [CounterDef],
    identity: &ProcessorIdentity,
    id: u16,
) -> Option<&'a CounterDef> {
    entries(table)
        .iter()
        .find(|d| d.id == id && d.matches(identity))
}

/// All rows usable on the given processor, in table order.
pub fn matching<'a>(
    table: &'a [CounterDef],
    identity: &'a ProcessorIdentity,
) -> impl Iterator<Item = &'a CounterDef> {
    entries(table).iter().filter(move |d| d.matches(identity))
}

use crate::identity::FamilyMask as F;
use crate::identity::SchemeMask as S;

#[rustfmt::skip]
pub static COUNTER_DEFINITIONS: &[CounterDef] = &[
    // Pentium 4 / Netburst. Counter ranges and event select numbers from
    // the per-event tables in the Intel SDM vol. 3 appendix A.
    //  id  scheme  family  countregs  esel  event   mask    name
    gp(100, S::P4, F::ANY,   4,  7,     0,      9,      7,  "Uops"     ), // uops from any source
    gp(101, S::P4, F::ANY,   4,  7,     0,      9,      2,  "UopsTC"   ), // uops from trace cache
    gp(102, S::P4, F::ANY,   4,  7,     0,      9,      1,  "UopsDec"  ), // uops directly from decoder
    gp(103, S::P4, F::ANY,   4,  7,     0,      9,      4,  "UopsMCode"), // uops from microcode ROM
    gp(110, S::P4, F::ANY,  12, 17,     4,      1,      1,  "UopsNB"   ), // uops non-bogus
    gp(111, S::P4, F::ANY,  12, 17,     4,      2,   0x0c,  "UopsBogus"), // uops bogus
    gp(150, S::P4, F::ANY,   8, 11,     1,      4, 0x8000,  "UopsFP"   ), // uops floating point, except move etc.
    gp(151, S::P4, F::ANY,   8, 11,     1,   0x2e,      8,  "UopsFPMov"), // uops floating point and SIMD move
    gp(152, S::P4, F::ANY,   8, 11,     1,   0x2e,   0x10,  "UopsFPLd" ), // uops floating point and SIMD load
    gp(160, S::P4, F::ANY,   8, 11,     1,      2, 0x8000,  "UopsMMX"  ), // uops 64-bit MMX
    gp(170, S::P4, F::ANY,   8, 11,     1,   0x1a, 0x8000,  "UopsXMM"  ), // uops 128-bit integer XMM
    gp(200, S::P4, F::ANY,  12, 17,     5,      6,   0x0f,  "Branch"   ), // branches
    gp(201, S::P4, F::ANY,  12, 17,     5,      6,   0x0c,  "BrTaken"  ), // branches taken
    gp(202, S::P4, F::ANY,  12, 17,     5,      6,   0x03,  "BrNTaken" ), // branches not taken
    gp(203, S::P4, F::ANY,  12, 17,     5,      6,   0x05,  "BrPredict"), // branches predicted
    gp(204, S::P4, F::ANY,  12, 17,     4,      3,   0x01,  "BrMispred"), // branches mispredicted
    gp(210, S::P4, F::ANY,   4,  7,     2,      5,   0x02,  "CondJMisp"), // conditional jumps mispredicted
    gp(211, S::P4, F::ANY,   4,  7,     2,      5,   0x04,  "CallMisp" ), // indirect call mispredicted
    gp(212, S::P4, F::ANY,   4,  7,     2,      5,   0x08,  "RetMisp"  ), // return mispredicted
    gp(220, S::P4, F::ANY,   4,  7,     2,      5,   0x10,  "IndirMisp"), // indirect calls, jumps and returns mispredicted
    gp(310, S::P4, F::ANY,   0,  3,     0,      3,   0x01,  "TCMiss"   ), // trace cache miss
    gp(320, S::P4, F::ANY,   0,  3,     7,   0x0c,  0x100,  "Cach2Miss"), // level 2 cache miss
    gp(321, S::P4, F::ANY,   0,  3,     7,   0x0c,  0x200,  "Cach3Miss"), // level 3 cache miss
    gp(330, S::P4, F::ANY,   0,  3,     3,   0x18,   0x02,  "ITLBMiss" ), // instructions TLB miss
    gp(340, S::P4, F::ANY,   0,  3,     2,      3,   0x3a,  "LdReplay" ), // memory load replay

    // Pentium 1 and Pentium MMX
    gp(  9, S::P1, F::ANY,   0,  1,     0,   0x16,      2,  "Instruct" ), // instructions executed
    gp( 11, S::P1, F::ANY,   0,  1,     0,   0x17,      2,  "InstVpipe"), // instructions executed in V-pipe
    gp(202, S::P1, F::ANY,   0,  1,     0,   0x15,      2,  "Flush"    ), // pipeline flush due to branch misprediction or serializing event
    gp(310, S::P1, F::ANY,   0,  1,     0,   0x0e,      2,  "CodeMiss" ), // code cache miss
    gp(311, S::P1, F::ANY,   0,  1,     0,   0x29,      2,  "DataMiss" ), // data cache miss

    // Pentium Pro, Pentium II/III, Pentium M, Core Solo/Duo
    gp(  9, S::P2MC, F::ANY,       0, 1, 0,  0xc0,      0,  "Instruct" ), // instructions executed
    gp( 10, S::P2MC, F::ANY,       0, 1, 0,  0xd0,      0,  "IDecode"  ), // instructions decoded
    gp( 20, S::P2MC, F::ANY,       0, 1, 0,  0x80,      0,  "IFetch"   ), // instruction fetches
    gp( 21, S::P2MC, F::ANY,       0, 1, 0,  0x86,      0,  "IFetchStl"), // instruction fetch stall
    gp( 22, S::P2MC, F::ANY,       0, 1, 0,  0x87,      0,  "ILenStal" ), // instruction length decoder stalls
    gp(100, S::P2MC, F::INTEL_PM,  0, 1, 0,  0xc2,      0,  "Uops(F)"  ), // microoperations in fused domain
    gp(100, S::P2MC, F::ANY,       0, 1, 0,  0xc2,      0,  "Uops"     ), // microoperations
    gp(110, S::P2MC, F::INTEL_PM,  0, 1, 0,  0xa0,      0,  "Uops(UF)" ), // unfused microoperations submitted to execution units (undocumented)
    gp(104, S::P2MC, F::INTEL_PM,  0, 1, 0,  0xda,      0,  "UopsFused"), // fused uops
    gp(115, S::P2MC, F::INTEL_PM,  0, 1, 0,  0xd3,      0,  "SynchUops"), // stack synchronization uops
    gp(121, S::P2MC, F::ANY,       0, 1, 0,  0xd2,      0,  "PartRStl" ), // partial register access stall
    gp(130, S::P2MC, F::ANY,       0, 1, 0,  0xa2,      0,  "Rs Stall" ), // all resource stalls
    gp(201, S::P2MC, F::ANY,       0, 1, 0,  0xc9,      0,  "BrTaken"  ), // branches taken
    gp(204, S::P2MC, F::ANY,       0, 1, 0,  0xc5,      0,  "BrMispred"), // mispredicted branches
    gp(205, S::P2MC, F::ANY,       0, 1, 0,  0xe6,      0,  "BTBMiss"  ), // static branch prediction made
    gp(310, S::P2MC, F::ANY,       0, 1, 0,  0x28,   0x0f,  "CodeMiss" ), // level 2 cache code fetch
    gp(311, S::P2MC, F::INTEL_P23, 0, 1, 0,  0x29,   0x0f,  "L1D Miss" ), // level 2 cache data fetch

    // Core 2. The first three are fixed-function counters with their own
    // register; the rest compete for the same two counter registers.
    fx(  1, S::ID2, F::ANY, 1, "Core cyc" ), // core clock cycles
    fx(  2, S::ID2, F::ANY, 2, "Ref cyc"  ), // reference clock cycles
    fx(  9, S::ID2, F::ANY, 0, "Instruct" ), // instructions (reference counter)
    gp( 10, S::ID2, F::ANY,  0, 1, 0,  0xc0,  0x0f, "Instruct" ), // instructions
    gp( 11, S::ID2, F::ANY,  0, 1, 0,  0xc0,  0x01, "Read inst"), // instructions involving read, fused count as one
    gp( 12, S::ID2, F::ANY,  0, 1, 0,  0xc0,  0x02, "Write ins"), // instructions involving write, fused count as one
    gp( 13, S::ID2, F::ANY,  0, 1, 0,  0xc0,  0x04, "NonMem in"), // instructions without memory
    gp( 20, S::ID2, F::ANY,  0, 1, 0,  0x80,     0, "Insfetch" ), // instruction fetches
    gp( 21, S::ID2, F::ANY,  0, 1, 0,  0x86,     0, "IFetchStl"), // instruction fetch stall
    gp( 22, S::ID2, F::ANY,  0, 1, 0,  0x87,     0, "ILenStal" ), // instruction length decoder stalls (length changing prefix)
    gp( 23, S::ID2, F::ANY,  0, 1, 0,  0x83,     0, "IQue ful" ), // instruction queue full
    gp(100, S::ID2, F::ANY,  0, 1, 0,  0xc2,  0x0f, "Uops"     ), // uops retired, fused domain
    gp(101, S::ID2, F::ANY,  0, 1, 0,  0xc2,  0x01, "Fused Rd" ), // fused read uops
    gp(102, S::ID2, F::ANY,  0, 1, 0,  0xc2,  0x02, "Fused Wrt"), // fused write uops
    gp(103, S::ID2, F::ANY,  0, 1, 0,  0xc2,  0x04, "Macrofus" ), // macrofused uops
    gp(104, S::ID2, F::ANY,  0, 1, 0,  0xc2,  0x07, "FusedUop" ), // fused uops, all kinds
    gp(105, S::ID2, F::ANY,  0, 1, 0,  0xc2,  0x08, "NotFusUop"), // uops, not fused
    gp(110, S::ID2, F::ANY,  0, 1, 0,  0xa0,     0, "Uops UFD" ), // uops dispatched, unfused domain. Imprecise
    gp(111, S::ID2, F::ANY,  0, 1, 0,  0xa2,     0, "res.stl." ), // any resource stall
    gp(115, S::ID2, F::ANY,  0, 1, 0,  0xab,  0x01, "SP synch" ), // stack synchronization uops
    gp(116, S::ID2, F::ANY,  0, 1, 0,  0xab,  0x02, "SP engine"), // stack engine additions
    gp(121, S::ID2, F::ANY,  0, 1, 0,  0xd2,  0x02, "Part.reg" ), // partial register synchronization, clock cycles
    gp(122, S::ID2, F::ANY,  0, 1, 0,  0xd2,  0x04, "part.flag"), // partial flags stall, clock cycles
    gp(123, S::ID2, F::ANY,  0, 1, 0,  0xd2,  0x08, "FP SW stl"), // floating point status word stall
    gp(130, S::ID2, F::ANY,  0, 1, 0,  0xd2,  0x01, "R Rd stal"), // ROB register read stall
    gp(140, S::ID2, F::ANY,  0, 1, 0,  0x19,  0x00, "I2FP pass"), // bypass delay to FP unit from int unit
    gp(141, S::ID2, F::ANY,  0, 1, 0,  0x19,  0x01, "FP2I pass"), // bypass delay to SIMD/int unit from fp unit
    gp(150, S::ID2, F::ANY,  0, 0, 0,  0xa1,  0x01, "uop p0"   ), // uops port 0. Can only use first counter
    gp(151, S::ID2, F::ANY,  0, 0, 0,  0xa1,  0x02, "uop p1"   ), // uops port 1. Can only use first counter
    gp(152, S::ID2, F::ANY,  0, 0, 0,  0xa1,  0x04, "uop p2"   ), // uops port 2. Can only use first counter
    gp(153, S::ID2, F::ANY,  0, 0, 0,  0xa1,  0x08, "uop p3"   ), // uops port 3. Can only use first counter
    gp(154, S::ID2, F::ANY,  0, 0, 0,  0xa1,  0x10, "uop p4"   ), // uops port 4. Can only use first counter
    gp(155, S::ID2, F::ANY,  0, 0, 0,  0xa1,  0x20, "uop p5"   ), // uops port 5. Can only use first counter
    gp(201, S::ID2, F::ANY,  0, 1, 0,  0xc4,  0x0c, "BrTaken"  ), // branches taken (mask: 1=pred.not taken, 2=mispred not taken, 4=pred.taken, 8=mispred taken)
    gp(204, S::ID2, F::ANY,  0, 1, 0,  0xc4,  0x0a, "BrMispred"), // mispredicted branches
    gp(205, S::ID2, F::ANY,  0, 1, 0,  0xe6,     0, "BTBMiss"  ), // static branch prediction made
    gp(210, S::ID2, F::ANY,  0, 1, 0,  0x97,     0, "BranchBu1"), // branch taken bubble 1
    gp(211, S::ID2, F::ANY,  0, 1, 0,  0x98,     0, "BranchBu2"), // branch taken bubble 2 (the two values must be added)
    gp(310, S::ID2, F::ANY,  0, 1, 0,  0x28,  0x0f, "CodeMiss" ), // level 2 cache code fetch
    gp(311, S::ID2, F::ANY,  0, 1, 0,  0x29,  0x0f, "L1D Miss" ), // level 2 cache data fetch
    gp(320, S::ID2, F::ANY,  0, 1, 0,  0x24,  0x00, "L2 Miss"  ), // level 2 cache miss
    gp(410, S::ID2, F::ANY,  0, 3, 0,  0xe6,  0x01, "BaClrAny" ),

    // Nehalem, Sandy Bridge, Ivy Bridge
    fx(  1, S::ID3, F::INTEL_I7_IVY, 1, "Core cyc"), // core clock cycles
    fx(  2, S::ID3, F::INTEL_I7_IVY, 2, "Ref cyc" ), // reference clock cycles
    fx(  9, S::ID3, F::INTEL_I7_IVY, 0, "Instruct"), // instructions (reference counter)
    gp( 10, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0xc0,  0x01, "Instruct" ), // instructions
    gp( 22, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0x87,     0, "ILenStal" ), // instruction length decoder stalls (length changing prefix)
    gp( 24, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0xA8,  0x01, "Loop uops"), // uops from loop stream detector
    gp( 25, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0x79,  0x04, "Dec uops" ), // uops from decoders (MITE)
    gp( 26, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0x79,  0x08, "Cach uops"), // uops from uop cache (DSB)
    gp(100, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0xc2,  0x01, "Uops"     ), // uops retired, unfused domain
    gp(103, S::ID3, F::INTEL_I7,     0, 3, 0,  0xc2,  0x04, "Macrofus" ), // macrofused uops, Sandy Bridge
    gp(104, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0x0E,  0x01, "Uops F.D."), // uops, fused domain
    gp(105, S::ID3, F::INTEL_I7,     0, 3, 0,  0x0E,  0x02, "fused uop"), // microfused uops
    gp(110, S::ID3, F::INTEL_I7,     0, 3, 0,  0xa0,     0, "Uops UFD?"), // uops dispatched, unfused domain. Imprecise
    gp(111, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0xa2,     1, "res.stl." ), // any resource stall
    gp(121, S::ID3, F::INTEL_I7,     0, 3, 0,  0xd2,  0x02, "Part.reg" ), // partial register synchronization, clock cycles
    gp(122, S::ID3, F::INTEL_I7,     0, 3, 0,  0xd2,  0x01, "part.flag"), // partial flags stall, clock cycles
    gp(123, S::ID3, F::INTEL_I7,     0, 3, 0,  0xd2,  0x04, "R Rd stal"), // ROB register read stall
    gp(124, S::ID3, F::INTEL_I7,     0, 3, 0,  0xd2,  0x0F, "RAT stal" ), // RAT stall, any
    gp(150, S::ID3, F::INTEL_I7,     0, 3, 0,  0xb1,  0x01, "uop p0"   ), // uops port 0
    gp(151, S::ID3, F::INTEL_I7,     0, 3, 0,  0xb1,  0x02, "uop p1"   ), // uops port 1
    gp(152, S::ID3, F::INTEL_I7,     0, 3, 0,  0xb1,  0x04, "uop p2"   ), // uops port 2
    gp(153, S::ID3, F::INTEL_I7,     0, 3, 0,  0xb1,  0x08, "uop p3"   ), // uops port 3
    gp(154, S::ID3, F::INTEL_I7,     0, 3, 0,  0xb1,  0x10, "uop p4"   ), // uops port 4
    gp(155, S::ID3, F::INTEL_I7,     0, 3, 0,  0xb1,  0x20, "uop p5"   ), // uops port 5. Unreliable!
    gp(156, S::ID3, F::INTEL_I7,     0, 3, 0,  0xb1,  0x40, "uop p015" ), // uops port 0,1,5. Unreliable!
    gp(157, S::ID3, F::INTEL_I7,     0, 3, 0,  0xb1,  0x80, "uop p234" ), // uops port 2,3,4
    gp(201, S::ID2, F::INTEL_IVY,    0, 1, 0,  0xc4,  0x20, "BrTaken"  ), // branches taken
    gp(204, S::ID3, F::INTEL_I7,     0, 3, 0,  0xc5,  0x0a, "BrMispred"), // mispredicted branches
    gp(207, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0xc5,  0x00, "BrMispred"), // mispredicted branches
    gp(201, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0xc4,  0x00, "BrTaken"  ),
    gp(400, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0xa7,  0x01, "BaClrFIq" ),
    gp(401, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0xe6,  0x01, "BaClrClr" ),
    gp(402, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0xe6,  0x02, "BaClrBad" ),
    gp(403, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0xe8,  0x01, "BaClrEly" ),
    gp(404, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0xe8,  0x02, "BaClrL8"  ),
    gp(410, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0xe6,  0x1f, "BaClrAny" ),
    gp(205, S::ID3, F::INTEL_I7,     0, 3, 0,  0xe6,     2, "BTBMiss"  ), // static branch prediction made
    gp(220, S::ID3, F::INTEL_IVY,    0, 3, 0,  0x58,  0x03, "Mov elim" ), // register moves eliminated
    gp(221, S::ID3, F::INTEL_IVY,    0, 3, 0,  0x58,  0x0C, "Mov elim-"), // register moves elimination unsuccessful
    gp(311, S::ID3, F::INTEL_I7_IVY, 0, 3, 0,  0x28,  0x0f, "L1D Miss" ), // level 1 data cache miss
    gp(312, S::ID3, F::INTEL_I7,     0, 3, 0,  0x24,  0x0f, "L1 Miss"  ), // level 2 cache requests
    gp(150, S::ID3, F::INTEL_IVY,    0, 3, 0,  0xa1,  0x01, "uop p0"   ), // uops port 0
    gp(151, S::ID3, F::INTEL_IVY,    0, 3, 0,  0xa1,  0x02, "uop p1"   ), // uops port 1
    gp(152, S::ID3, F::INTEL_IVY,    0, 3, 0,  0xa1,  0x0c, "uop p2"   ), // uops port 2
    gp(153, S::ID3, F::INTEL_IVY,    0, 3, 0,  0xa1,  0x30, "uop p3"   ), // uops port 3
    gp(154, S::ID3, F::INTEL_IVY,    0, 3, 0,  0xa1,  0x40, "uop p4"   ), // uops port 4
    gp(155, S::ID3, F::INTEL_IVY,    0, 3, 0,  0xa1,  0x80, "uop p5"   ), // uops port 5
    gp(160, S::ID3, F::INTEL_IVY,    0, 3, 0,  0xa1,  0xFF, "uop p05"  ), // uops port 0 - 5

    // Haswell
    fx(  1, S::ID3, F::INTEL_HASWELL, 1, "Core cyc"), // core clock cycles
    fx(  2, S::ID3, F::INTEL_HASWELL, 2, "Ref cyc" ), // reference clock cycles
    fx(  9, S::ID3, F::INTEL_HASWELL, 0, "Instruct"), // instructions (reference counter)
    gp( 10, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xc0,  0x01, "Instruct" ), // instructions
    gp( 22, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0x87,  0x01, "ILenStal" ), // instruction length decoder stall due to length changing prefix
    gp( 24, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xA8,  0x01, "Loop uops"), // uops from loop stream detector
    gp( 25, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0x79,  0x04, "Dec uops" ), // uops from decoders (MITE)
    gp( 26, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0x79,  0x08, "Cach uops"), // uops from uop cache (DSB)
    gp(100, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xc2,  0x01, "Uops"     ), // uops retired, unfused domain
    gp(104, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0x0e,  0x01, "uops RAT" ), // uops from RAT to RS
    gp(111, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xa2,  0x01, "res.stl." ), // any resource stall
    gp(131, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xC1,  0x18, "AVX trans"), // VEX - non-VEX transition penalties
    gp(201, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xC4,  0x20, "BrTaken"  ), // branches taken
    gp(207, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xc5,  0x00, "BrMispred"), // mispredicted branches
    gp(220, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0x58,  0x03, "Mov elim" ), // register moves eliminated
    gp(221, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0x58,  0x0C, "Mov elim-"), // register moves elimination unsuccessful
    gp(310, S::ID2, F::INTEL_HASWELL, 0, 3, 0,  0x80,  0x02, "CodeMiss" ), // code cache misses
    gp(311, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0x24,  0xe1, "L1D Miss" ), // level 1 data cache miss
    gp(320, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0x24,  0x27, "L2 Miss"  ), // level 2 cache misses
    gp(150, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xa1,  0x01, "uop p0"   ), // uops port 0
    gp(151, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xa1,  0x02, "uop p1"   ), // uops port 1
    gp(152, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xa1,  0x04, "uop p2"   ), // uops port 2
    gp(153, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xa1,  0x08, "uop p3"   ), // uops port 3
    gp(154, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xa1,  0x10, "uop p4"   ), // uops port 4
    gp(155, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xa1,  0x20, "uop p5"   ), // uops port 5
    gp(156, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xa1,  0x40, "uop p6"   ), // uops port 6
    gp(157, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xa1,  0x80, "uop p7"   ), // uops port 7
    gp(160, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xa1,  0xFF, "uop p07"  ), // uops port 0 - 7
    gp(410, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xe6,  0x1f, "BaClrAny" ),
    gp(400, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xa7,  0x01, "BaClrFIq" ),
    gp(403, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xe8,  0x01, "BaClrEly" ),
    gp(404, S::ID3, F::INTEL_HASWELL, 0, 3, 0,  0xe8,  0x02, "BaClrL8"  ),

    // Broadwell through Tiger Lake share the ID3 register layout; event
    // encodings from the Intel perfmon data files.
    fx(  1, S::ID3, F::INTEL_BDW_TGL, 2, "Core cyc"),
    fx(  9, S::ID3, F::INTEL_BDW_TGL, 0, "Instruct"),
    gp(207, S::ID3, F::INTEL_BDW_TGL, 0, 3, 0,  0xc5,  0x00, "BrMispred"), // BR_MISP_RETIRED.ALL_BRANCHES
    gp(410, S::ID3, F::INTEL_BDW_TGL, 0, 3, 0,  0xe6,  0x01, "BaClrAny" ), // BACLEARS.ANY
    gp(411, S::ID3, F::INTEL_BDW_TGL, 0, 3, 0,  0x0d,  0x80, "ClrRestr" ), // INT_MISC.CLEAR_RESTEER_CYCLES

    // Intel Atom. One fixed-function counter, two general registers.
    fx(  9, S::ID3, F::INTEL_ATOM, 0, "Instruct"), // instructions (reference counter)
    gp( 10, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0xc0,  0x00, "Instr"    ), // instructions retired
    gp( 20, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0x80,  0x03, "Insfetch" ), // instruction fetches
    gp( 21, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0x80,  0x02, "I miss"   ), // instruction cache miss
    gp( 30, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0x40,  0x21, "L1 read"  ), // L1 data cache read
    gp( 31, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0x40,  0x22, "L1 write" ), // L1 data cache write
    gp(100, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0xc2,  0x10, "Uops"     ), // uops retired
    gp(200, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0xc4,  0x00, "Branch"   ), // branches
    gp(201, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0xc4,  0x0c, "BrTaken"  ), // branches taken
    gp(204, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0xc4,  0x0a, "BrMispred"), // mispredicted branches
    gp(205, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0xe6,  0x01, "BTBMiss"  ), // baclear
    gp(310, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0x28,  0x4f, "CodeMiss" ), // level 2 cache code fetch
    gp(311, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0x29,  0x4f, "L1D Miss" ), // level 2 cache data fetch
    gp(320, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0x24,  0x00, "L2 Miss"  ), // level 2 cache miss
    gp(501, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0xC0,  0x00, "inst re"  ), // instructions retired
    gp(505, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0xAA,  0x02, "CISC"     ), // CISC macro instructions decoded
    gp(506, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0xAA,  0x03, "decoded"  ), // all instructions decoded
    gp(601, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0x02,  0x81, "st.forw"  ), // successful store forwards
    gp(640, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0x12,  0x81, "mul"      ), // int and FP multiply operations
    gp(641, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0x13,  0x81, "div"      ), // int and FP divide and sqrt operations
    gp(651, S::ID3, F::INTEL_ATOM, 0, 1, 0,  0x10,  0x81, "fp uop"   ), // floating point uops

    // AMD
    gp(  9, S::AMD, F::AMD_ANY,       0, 3, 0,  0xc0,     0, "Instruct" ), // x86 instructions executed
    gp(100, S::AMD, F::AMD_ANY,       0, 3, 0,  0xc1,     0, "Uops"     ), // microoperations
    gp(204, S::AMD, F::AMD_ANY,       0, 3, 0,  0xc3,     0, "BrMispred"), // mispredicted branches
    gp(201, S::AMD, F::AMD_BULLDOZER, 0, 3, 0,  0xc4,  0x00, "BrTaken"  ), // branches taken
    gp(209, S::AMD, F::AMD_BULLDOZER, 0, 3, 0,  0xc2,  0x00, "RSBovfl"  ), // return stack buffer overflow
    gp(310, S::AMD, F::AMD_ANY,       0, 3, 0,  0x81,     0, "CodeMiss" ), // instruction cache misses
    gp(311, S::AMD, F::AMD_ANY,       0, 3, 0,  0x41,     0, "L1D Miss" ), // L1 data cache misses
    gp(320, S::AMD, F::AMD_ANY,       0, 3, 0,  0x43,  0x1f, "L2 Miss"  ), // L2 cache misses
    gp(150, S::AMD, F::AMD_ATHLON64,  0, 3, 0,  0x00,  0x3f, "UopsFP"   ), // microoperations in FP pipe
    gp(151, S::AMD, F::AMD_ATHLON64,  0, 3, 0,  0x00,  0x09, "FPADD"    ), // microoperations in FP ADD unit
    gp(152, S::AMD, F::AMD_ATHLON64,  0, 3, 0,  0x00,  0x12, "FPMUL"    ), // microoperations in FP MUL unit
    gp(153, S::AMD, F::AMD_ATHLON64,  0, 3, 0,  0x00,  0x24, "FPMISC"   ), // microoperations in FP Store unit
    gp(150, S::AMD, F::AMD_BULLDOZER, 3, 3, 0,  0x00,  0x01, "UopsFP0"  ), // microoperations in FP pipe 0
    gp(151, S::AMD, F::AMD_BULLDOZER, 3, 3, 0,  0x00,  0x02, "UopsFP1"  ), // microoperations in FP pipe 1
    gp(152, S::AMD, F::AMD_BULLDOZER, 3, 3, 0,  0x00,  0x04, "UopsFP2"  ), // microoperations in FP pipe 2
    gp(153, S::AMD, F::AMD_BULLDOZER, 3, 3, 0,  0x00,  0x08, "UopsFP3"  ), // microoperations in FP pipe 3
    gp(110, S::AMD, F::AMD_BULLDOZER, 0, 3, 0,  0x04,  0x0a, "UopsElim" ), // move eliminations and scalar op optimizations
    gp(120, S::AMD, F::AMD_BULLDOZER, 0, 3, 0,  0x2A,  0x01, "Forwfail" ), // load-to-store forwarding failed
    gp(160, S::AMD, F::AMD_BULLDOZER, 0, 3, 0,  0xCB,  0x01, "x87"      ), // FP x87 instructions
    gp(161, S::AMD, F::AMD_BULLDOZER, 0, 3, 0,  0xCB,  0x02, "MMX"      ), // MMX instructions
    gp(162, S::AMD, F::AMD_BULLDOZER, 0, 3, 0,  0xCB,  0x04, "XMM"      ), // XMM and YMM instructions

    // VIA Nano counters are undocumented; these are the ones that count.
    gp(0x1000, S::VIA, F::ANY, 0, 1, 0,  0x000, 0, "Instr"    ), // instructions
    gp(0x0001, S::VIA, F::ANY, 0, 1, 0,  0x001, 0, "uops"     ), // micro-ops?
    gp(0x0002, S::VIA, F::ANY, 0, 1, 0,  0x002, 0, "2"        ),
    gp(0x0003, S::VIA, F::ANY, 0, 1, 0,  0x003, 0, "3"        ),
    gp(0x0004, S::VIA, F::ANY, 0, 1, 0,  0x004, 0, "bubble"   ), // branch bubble clock cycles?
    gp(0x0005, S::VIA, F::ANY, 0, 1, 0,  0x005, 0, "5"        ),
    gp(0x0006, S::VIA, F::ANY, 0, 1, 0,  0x006, 0, "6"        ),
    gp(0x0007, S::VIA, F::ANY, 0, 1, 0,  0x007, 0, "7"        ),
    gp(0x0008, S::VIA, F::ANY, 0, 1, 0,  0x008, 0, "8"        ),
    gp(0x0009, S::VIA, F::ANY, 0, 1, 0,  0x000, 0, "Instr"    ), // instructions
    gp(0x0010, S::VIA, F::ANY, 0, 1, 0,  0x010, 0, "10"       ),
    gp(0x0014, S::VIA, F::ANY, 0, 1, 0,  0x014, 0, "14"       ),
    gp(0x0020, S::VIA, F::ANY, 0, 1, 0,  0x020, 0, "Br NT"    ), // branch not taken
    gp(0x0021, S::VIA, F::ANY, 0, 1, 0,  0x021, 0, "Br NT Pr" ), // branch not taken, predicted
    gp(0x0022, S::VIA, F::ANY, 0, 1, 0,  0x022, 0, "Br Tk"    ), // branch taken
    gp(0x0023, S::VIA, F::ANY, 0, 1, 0,  0x023, 0, "Br Tk Pr" ), // branch taken, predicted
    gp(0x0024, S::VIA, F::ANY, 0, 1, 0,  0x024, 0, "Jmp"      ), // jump or call
    gp(0x0025, S::VIA, F::ANY, 0, 1, 0,  0x025, 0, "Jmp"      ), // jump or call, predicted
    gp(0x0026, S::VIA, F::ANY, 0, 1, 0,  0x026, 0, "Ind.Jmp"  ), // indirect jump or return
    gp(0x0027, S::VIA, F::ANY, 0, 1, 0,  0x027, 0, "Ind.J. Pr"), // indirect jump or return, predicted
    gp(0x0034, S::VIA, F::ANY, 0, 1, 0,  0x034, 0, "34"       ),
    gp(0x0040, S::VIA, F::ANY, 0, 1, 0,  0x040, 0, "40"       ),
    gp(0x0041, S::VIA, F::ANY, 0, 1, 0,  0x040, 0, "41"       ),
    gp(0x0042, S::VIA, F::ANY, 0, 1, 0,  0x040, 0, "42"       ),
    gp(0x0043, S::VIA, F::ANY, 0, 1, 0,  0x040, 0, "43"       ),
    gp(0x0044, S::VIA, F::ANY, 0, 1, 0,  0x040, 0, "44"       ),
    gp(0x0046, S::VIA, F::ANY, 0, 1, 0,  0x040, 0, "46"       ),
    gp(0x0048, S::VIA, F::ANY, 0, 1, 0,  0x040, 0, "48"       ),
    gp(0x0082, S::VIA, F::ANY, 0, 1, 0,  0x082, 0, "82"       ),
    gp(0x0083, S::VIA, F::ANY, 0, 1, 0,  0x083, 0, "83"       ),
    gp(0x0084, S::VIA, F::ANY, 0, 1, 0,  0x084, 0, "84"       ),
    gp(0x00B4, S::VIA, F::ANY, 0, 1, 0,  0x0B4, 0, "B4"       ),
    gp(0x00C0, S::VIA, F::ANY, 0, 1, 0,  0x0C0, 0, "C0"       ),
    gp(0x00C4, S::VIA, F::ANY, 0, 1, 0,  0x0C4, 0, "C4"       ),
    gp(0x0104, S::VIA, F::ANY, 0, 1, 0,  0x104, 0, "104"      ),
    gp(0x0105, S::VIA, F::ANY, 0, 1, 0,  0x105, 0, "105"      ),
    gp(0x0106, S::VIA, F::ANY, 0, 1, 0,  0x106, 0, "106"      ),
    gp(0x0107, S::VIA, F::ANY, 0, 1, 0,  0x107, 0, "107"      ),
    gp(0x0109, S::VIA, F::ANY, 0, 1, 0,  0x109, 0, "109"      ),
    gp(0x010A, S::VIA, F::ANY, 0, 1, 0,  0x10A, 0, "10A"      ),
    gp(0x010B, S::VIA, F::ANY, 0, 1, 0,  0x10B, 0, "10B"      ),
    gp(0x010C, S::VIA, F::ANY, 0, 1, 0,  0x10C, 0, "10C"      ),
    gp(0x0110, S::VIA, F::ANY, 0, 1, 0,  0x110, 0, "110"      ),
    gp(0x0111, S::VIA, F::ANY, 0, 1, 0,  0x111, 0, "111"      ),
    gp(0x0116, S::VIA, F::ANY, 0, 1, 0,  0x116, 0, "116"      ),
    gp(0x0120, S::VIA, F::ANY, 0, 1, 0,  0x120, 0, "120"      ),
    gp(0x0121, S::VIA, F::ANY, 0, 1, 0,  0x121, 0, "121"      ),
    gp(0x013C, S::VIA, F::ANY, 0, 1, 0,  0x13C, 0, "13C"      ),
    gp(0x0200, S::VIA, F::ANY, 0, 1, 0,  0x200, 0, "200"      ),
    gp(0x0201, S::VIA, F::ANY, 0, 1, 0,  0x201, 0, "201"      ),
    gp(0x0206, S::VIA, F::ANY, 0, 1, 0,  0x206, 0, "206"      ),
    gp(0x0207, S::VIA, F::ANY, 0, 1, 0,  0x207, 0, "207"      ),
    gp(0x0301, S::VIA, F::ANY, 0, 1, 0,  0x301, 0, "301"      ),
    gp(0x0302, S::VIA, F::ANY, 0, 1, 0,  0x302, 0, "302"      ),
    gp(0x0303, S::VIA, F::ANY, 0, 1, 0,  0x303, 0, "303"      ),
    gp(0x0304, S::VIA, F::ANY, 0, 1, 0,  0x304, 0, "304"      ),
    gp(0x0305, S::VIA, F::ANY, 0, 1, 0,  0x305, 0, "305"      ),
    gp(0x0306, S::VIA, F::ANY, 0, 1, 0,  0x306, 0, "306"      ),
    gp(0x0502, S::VIA, F::ANY, 0, 1, 0,  0x502, 0, "502"      ),
    gp(0x0507, S::VIA, F::ANY, 0, 1, 0,  0x507, 0, "507"      ),
    gp(0x0508, S::VIA, F::ANY, 0, 1, 0,  0x508, 0, "508"      ),
    gp(0x050D, S::VIA, F::ANY, 0, 1, 0,  0x50D, 0, "50D"      ),
    gp(0x0600, S::VIA, F::ANY, 0, 1, 0,  0x600, 0, "600"      ),
    gp(0x0605, S::VIA, F::ANY, 0, 1, 0,  0x605, 0, "605"      ),
    gp(0x0607, S::VIA, F::ANY, 0, 1, 0,  0x607, 0, "607"      ),

    // list must end with an all-zero record
    SENTINEL,
];
