//! Serializing brackets and raw counter reads used by the measurement loop.

cfg_if::cfg_if! {
    if #[cfg(target_arch = "x86_64")] {
        /// Serialize instruction execution with CPUID leaf 0.
        #[inline(always)]
        pub fn serialize() {
            unsafe {
                core::arch::x86_64::__cpuid_count(0, 0);
            }
        }

        /// Read the time stamp counter.
        #[inline(always)]
        pub fn read_tsc() -> u64 {
            unsafe { core::arch::x86_64::_rdtsc() }
        }

        /// Read a performance monitor counter. Bit 30 of the index selects
        /// the fixed-function bank, bit 31 the Netburst fast-read path.
        #[inline(always)]
        pub fn read_pmc(index: u32) -> u64 {
            let lo: u32;
            let hi: u32;
            unsafe {
                core::arch::asm!(
                    "rdpmc",
                    in("ecx") index,
                    out("eax") lo,
                    out("edx") hi,
                    options(nomem, nostack, preserves_flags),
                );
            }
            (hi as u64) << 32 | lo as u64
        }
    } else {
        pub fn serialize() {}

        pub fn read_tsc() -> u64 {
            0
        }

        pub fn read_pmc(_index: u32) -> u64 {
            0
        }
    }
}
