use bitflags::bitflags;
use lazy_static::lazy_static;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    Unknown,
    Intel,
    Amd,
    Via,
}

bitflags! {
    /// One bit per microprocessor generation. Catalog rows may OR several
    /// bits together; matching is mask intersection, never equality.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FamilyMask: u32 {
        const INTEL_P1MMX    = 0x1;
        const INTEL_P23      = 0x2;
        const INTEL_PM       = 0x4;
        const INTEL_P4       = 0x8;
        const INTEL_CORE     = 0x10;
        const INTEL_CORE2    = 0x20;
        const INTEL_I7       = 0x40;
        const INTEL_IVY      = 0x80;
        const INTEL_HASWELL  = 0x100;
        const INTEL_BROADWELL = 0x200;
        const INTEL_SKYLAKE  = 0x400;
        const INTEL_KABYLAKE = 0x800;
        const INTEL_ATOM     = 0x1000;
        const INTEL_ICELAKE  = 0x2000;
        const INTEL_TIGERLAKE = 0x4000;
        const AMD_ATHLON     = 0x10000;
        const AMD_ATHLON64   = 0x20000;
        const AMD_BULLDOZER  = 0x80000;
        const VIA_NANO       = 0x100000;

        // combinations used by catalog rows
        const INTEL_P23M   = 0x16;
        const INTEL_I7_IVY = 0xC0;
        const INTEL_BDW_TGL = 0x200 | 0x400 | 0x800 | 0x2000 | 0x4000;
        const AMD_ANY      = 0xF0000;
        const ANY          = 0xFFFF_FFFF;
    }
}

bitflags! {
    /// One bit per PMC programming scheme.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SchemeMask: u32 {
        const P1  = 0x0001;
        const P4  = 0x0002;
        const P2  = 0x0010;
        const ID1 = 0x0020;
        const ID2 = 0x0040;
        const ID3 = 0x0080;

        const P2MC = 0x0030;
        const ID23 = 0x00C0;
        const INTEL_ANY = 0x00F0;
        const AMD = 0x1000;
        const VIA = 0x2000;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuidWords {
    pub eax: u32,
    pub ebx: u32,
    pub ecx: u32,
    pub edx: u32,
}

/// Leaf-indexed processor identification query.
pub trait CpuidReader {
    fn cpuid(&self, leaf: u32) -> CpuidWords;
}

pub struct HostCpuid;

impl CpuidReader for HostCpuid {
    #[cfg(target_arch = "x86_64")]
    fn cpuid(&self, leaf: u32) -> CpuidWords {
        let r = unsafe { core::arch::x86_64::__cpuid_count(leaf, 0) };
        CpuidWords {
            eax: r.eax,
            ebx: r.ebx,
            ecx: r.ecx,
            edx: r.edx,
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn cpuid(&self, _leaf: u32) -> CpuidWords {
        CpuidWords::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessorIdentity {
    pub vendor: Vendor,
    pub family: FamilyMask,
    pub model: u32,
    pub scheme: SchemeMask,
    pub general_pmcs: u32,
    pub fixed_pmcs: u32,
}

lazy_static! {
    static ref HOST_IDENTITY: ProcessorIdentity = ProcessorIdentity::detect(&HostCpuid);
}

impl ProcessorIdentity {
    /// Identity of the processor this program runs on, computed once.
    pub fn host() -> ProcessorIdentity {
        *HOST_IDENTITY
    }

    pub fn detect(cpuid: &impl CpuidReader) -> ProcessorIdentity {
        let vendor = detect_vendor(cpuid);
        let (family, model) = detect_family(cpuid, vendor);
        let (scheme, general_pmcs, fixed_pmcs) = detect_scheme(cpuid, vendor, family);
        let identity = ProcessorIdentity {
            vendor,
            family,
            model,
            scheme,
            general_pmcs,
            fixed_pmcs,
        };
        debug!(
            "detected {:?}, family {:#x}, model {:#x}, scheme {:#x}, {} general + {} fixed pmcs",
            identity.vendor,
            identity.family.bits(),
            identity.model,
            identity.scheme.bits(),
            identity.general_pmcs,
            identity.fixed_pmcs
        );
        identity
    }

    /// An unknown scheme disables all counter setup, never the whole run.
    pub fn supports_pmc(&self) -> bool {
        !self.scheme.is_empty()
    }
}

fn detect_vendor(cpuid: &impl CpuidReader) -> Vendor {
    let id = cpuid.cpuid(0);
    if id.eax == 0 {
        return Vendor::Unknown;
    }
    // 12-character vendor string in ebx:edx:ecx
    if id.ebx == 0x756E_6547 && id.edx == 0x4965_6E69 && id.ecx == 0x6C65_746E {
        Vendor::Intel // "GenuineIntel"
    } else if id.ebx == 0x6874_7541 && id.edx == 0x6974_6E65 && id.ecx == 0x444D_4163 {
        Vendor::Amd // "AuthenticAMD"
    } else if id.ebx == 0x746E_6543 && id.edx == 0x4872_7561 && id.ecx == 0x736C_7561 {
        Vendor::Via // "CentaurHauls"
    } else {
        Vendor::Unknown
    }
}

fn detect_family(cpuid: &impl CpuidReader, vendor: Vendor) -> (FamilyMask, u32) {
    if cpuid.cpuid(0).eax == 0 {
        return (FamilyMask::empty(), 0); // leaf 1 not supported
    }
    let leaf1 = cpuid.cpuid(1);
    let family = ((leaf1.eax >> 8) & 0x0F) + ((leaf1.eax >> 20) & 0xFF);
    let model = ((leaf1.eax >> 4) & 0x0F) | ((leaf1.eax >> 12) & 0xF0);

    let mut f = FamilyMask::empty();
    match vendor {
        Vendor::Intel => {
            if family == 5 {
                f = FamilyMask::INTEL_P1MMX;
            }
            if family == 0x0F {
                f = FamilyMask::INTEL_P4;
            }
            if family == 6 {
                // Later rules deliberately override earlier ones; the order
                // of these tests is significant.
                f = FamilyMask::INTEL_P23;
                if model == 0x09 || model == 0x0D {
                    f = FamilyMask::INTEL_PM;
                }
                if model == 0x0E {
                    f = FamilyMask::INTEL_CORE;
                }
                if model == 0x0F || model == 0x16 || model == 0x17 {
                    f = FamilyMask::INTEL_CORE2;
                }
                if model == 0x1A {
                    f = FamilyMask::INTEL_I7;
                }
                if model == 0x1C {
                    f = FamilyMask::INTEL_ATOM;
                }
                if model >= 0x1D {
                    f = FamilyMask::INTEL_I7;
                }
                if model == 0x3A || model == 0x3E {
                    f = FamilyMask::INTEL_IVY;
                }
                if model == 0x3C || model == 0x3F || model == 0x45 || model == 0x46 {
                    f = FamilyMask::INTEL_HASWELL;
                }
                if model == 0x3D || model == 0x47 || model == 0x4F || model == 0x56 {
                    f = FamilyMask::INTEL_BROADWELL;
                }
                if model == 0x4E || model == 0x5E || model == 0x55 {
                    f = FamilyMask::INTEL_SKYLAKE;
                }
                if model == 0x8E || model == 0x9E || model == 0xA5 || model == 0xA6 {
                    f = FamilyMask::INTEL_KABYLAKE;
                }
                if model == 0x7D || model == 0x7E || model == 0x6A || model == 0x6C {
                    f = FamilyMask::INTEL_ICELAKE;
                }
                if model == 0x8C || model == 0x8D {
                    f = FamilyMask::INTEL_TIGERLAKE;
                }
                if f == FamilyMask::INTEL_P23 && model >= 0x3F {
                    f = FamilyMask::INTEL_HASWELL;
                }
            }
        }
        Vendor::Amd => {
            if family == 6 {
                f = FamilyMask::AMD_ATHLON;
            }
            if (0x0F..=0x14).contains(&family) {
                f = FamilyMask::AMD_ATHLON64;
            }
            if family >= 0x15 {
                f = FamilyMask::AMD_BULLDOZER;
            }
        }
        Vendor::Via => {
            if family == 6 && model >= 0x0F {
                f = FamilyMask::VIA_NANO;
            }
        }
        Vendor::Unknown => {}
    }
    (f, model)
}

fn detect_scheme(
    cpuid: &impl CpuidReader,
    vendor: Vendor,
    family: FamilyMask,
) -> (SchemeMask, u32, u32) {
    let mut scheme = SchemeMask::empty();
    let mut general = 2;
    let mut fixed = 0;

    match vendor {
        Vendor::Amd => {
            scheme = SchemeMask::AMD;
            general = 4;
        }
        Vendor::Via => {
            scheme = SchemeMask::VIA;
        }
        Vendor::Intel => {
            if cpuid.cpuid(0).eax >= 0x0A {
                // architectural performance monitoring leaf
                let caps = cpuid.cpuid(0x0A);
                let version = caps.eax & 0xFF;
                if version != 0 {
                    general = (caps.eax >> 8) & 0xFF;
                    fixed = caps.edx & 0x1F;
                }
                if (1..=4).contains(&version) {
                    scheme = SchemeMask::from_bits_retain(SchemeMask::ID1.bits() << (version - 1));
                }
            }
            if scheme.is_empty() || scheme.bits() > SchemeMask::ID3.bits() {
                // scheme not reported by cpuid, derive it from the family
                scheme = if family == FamilyMask::INTEL_P1MMX {
                    SchemeMask::P1
                } else if family.intersects(FamilyMask::INTEL_P23 | FamilyMask::INTEL_PM) {
                    SchemeMask::P2
                } else if family == FamilyMask::INTEL_P4 {
                    SchemeMask::P4
                } else if family == FamilyMask::INTEL_CORE {
                    SchemeMask::ID1
                } else if family == FamilyMask::INTEL_CORE2 {
                    SchemeMask::ID2
                } else if family.intersects(
                    FamilyMask::INTEL_I7_IVY
                        | FamilyMask::INTEL_HASWELL
                        | FamilyMask::INTEL_BDW_TGL
                        | FamilyMask::INTEL_ATOM,
                ) {
                    SchemeMask::ID3
                } else {
                    SchemeMask::empty()
                };
            }
        }
        Vendor::Unknown => {}
    }
    (scheme, general, fixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeCpuid {
        leaves: Vec<(u32, CpuidWords)>,
    }

    impl CpuidReader for FakeCpuid {
        fn cpuid(&self, leaf: u32) -> CpuidWords {
            self.leaves
                .iter()
                .find(|(l, _)| *l == leaf)
                .map(|(_, w)| *w)
                .unwrap_or_default()
        }
    }

    const GENU: u32 = 0x756E_6547;
    const INEI: u32 = 0x4965_6E69;
    const NTEL: u32 = 0x6C65_746E;
    const AUTH: u32 = 0x6874_7541;
    const ENTI: u32 = 0x6974_6E65;
    const CAMD: u32 = 0x444D_4163;
    const CENT: u32 = 0x746E_6543;
    const AURH: u32 = 0x4872_7561;
    const AULS: u32 = 0x736C_7561;

    fn vendor_leaf(max: u32, b: u32, d: u32, c: u32) -> (u32, CpuidWords) {
        (
            0,
            CpuidWords {
                eax: max,
                ebx: b,
                ecx: c,
                edx: d,
            },
        )
    }

    fn signature(family: u32, model: u32) -> (u32, CpuidWords) {
        let base_family = family.min(0x0F);
        let ext_family = family - base_family;
        let eax = (base_family << 8) | ((model & 0x0F) << 4) | ((model >> 4) << 16) | (ext_family << 20);
        (
            1,
            CpuidWords {
                eax,
                ..Default::default()
            },
        )
    }

    fn perfmon_leaf(version: u32, general: u32, fixed: u32) -> (u32, CpuidWords) {
        (
            0x0A,
            CpuidWords {
                eax: version | (general << 8),
                edx: fixed,
                ..Default::default()
            },
        )
    }

    #[test]
    fn intel_ivy_bridge_with_perfmon_leaf() {
        let cpuid = FakeCpuid {
            leaves: vec![
                vendor_leaf(0x0D, GENU, INEI, NTEL),
                signature(6, 0x3A),
                perfmon_leaf(3, 4, 3),
            ],
        };
        let id = ProcessorIdentity::detect(&cpuid);
        assert_eq!(id.vendor, Vendor::Intel);
        assert_eq!(id.family, FamilyMask::INTEL_IVY);
        assert_eq!(id.scheme, SchemeMask::ID3);
        assert_eq!(id.general_pmcs, 4);
        assert_eq!(id.fixed_pmcs, 3);
    }

    #[test]
    fn intel_core2_without_perfmon_leaf_falls_back_to_family() {
        let cpuid = FakeCpuid {
            leaves: vec![vendor_leaf(5, GENU, INEI, NTEL), signature(6, 0x17)],
        };
        let id = ProcessorIdentity::detect(&cpuid);
        assert_eq!(id.family, FamilyMask::INTEL_CORE2);
        assert_eq!(id.scheme, SchemeMask::ID2);
        assert_eq!(id.general_pmcs, 2);
    }

    #[test]
    fn intel_perfmon_version_above_four_falls_back_to_family() {
        let cpuid = FakeCpuid {
            leaves: vec![
                vendor_leaf(0x0D, GENU, INEI, NTEL),
                signature(6, 0x9E),
                perfmon_leaf(5, 8, 4),
            ],
        };
        let id = ProcessorIdentity::detect(&cpuid);
        assert_eq!(id.family, FamilyMask::INTEL_KABYLAKE);
        // version 5 shifts past ID3; the family table takes over
        assert_eq!(id.scheme, SchemeMask::ID3);
        // counts still come from the capability leaf
        assert_eq!(id.general_pmcs, 8);
        assert_eq!(id.fixed_pmcs, 4);
    }

    #[test]
    fn intel_netburst() {
        let cpuid = FakeCpuid {
            leaves: vec![vendor_leaf(2, GENU, INEI, NTEL), signature(0x0F, 2)],
        };
        let id = ProcessorIdentity::detect(&cpuid);
        assert_eq!(id.family, FamilyMask::INTEL_P4);
        assert_eq!(id.scheme, SchemeMask::P4);
    }

    #[test]
    fn broad_nehalem_rule_is_overridden_by_later_models() {
        let nehalem = FakeCpuid {
            leaves: vec![vendor_leaf(5, GENU, INEI, NTEL), signature(6, 0x2A)],
        };
        assert_eq!(
            ProcessorIdentity::detect(&nehalem).family,
            FamilyMask::INTEL_I7
        );

        let haswell = FakeCpuid {
            leaves: vec![vendor_leaf(5, GENU, INEI, NTEL), signature(6, 0x3C)],
        };
        assert_eq!(
            ProcessorIdentity::detect(&haswell).family,
            FamilyMask::INTEL_HASWELL
        );

        let skylake = FakeCpuid {
            leaves: vec![vendor_leaf(5, GENU, INEI, NTEL), signature(6, 0x5E)],
        };
        assert_eq!(
            ProcessorIdentity::detect(&skylake).family,
            FamilyMask::INTEL_SKYLAKE
        );
    }

    #[test]
    fn amd_scheme_is_vendor_forced() {
        let cpuid = FakeCpuid {
            leaves: vec![
                vendor_leaf(0x0D, AUTH, ENTI, CAMD),
                signature(0x17, 1),
                // even a plausible perfmon leaf must not override the vendor rule
                perfmon_leaf(2, 6, 3),
            ],
        };
        let id = ProcessorIdentity::detect(&cpuid);
        assert_eq!(id.vendor, Vendor::Amd);
        assert_eq!(id.family, FamilyMask::AMD_BULLDOZER);
        assert_eq!(id.scheme, SchemeMask::AMD);
        assert_eq!(id.general_pmcs, 4);
    }

    #[test]
    fn amd_athlon64_range() {
        let cpuid = FakeCpuid {
            leaves: vec![vendor_leaf(1, AUTH, ENTI, CAMD), signature(0x0F, 4)],
        };
        let id = ProcessorIdentity::detect(&cpuid);
        assert_eq!(id.family, FamilyMask::AMD_ATHLON64);
        assert_eq!(id.scheme, SchemeMask::AMD);
    }

    #[test]
    fn via_nano_scheme_is_vendor_forced() {
        let cpuid = FakeCpuid {
            leaves: vec![vendor_leaf(1, CENT, AURH, AULS), signature(6, 0x0F)],
        };
        let id = ProcessorIdentity::detect(&cpuid);
        assert_eq!(id.vendor, Vendor::Via);
        assert_eq!(id.family, FamilyMask::VIA_NANO);
        assert_eq!(id.scheme, SchemeMask::VIA);
    }

    #[test]
    fn unknown_vendor_disables_counters() {
        let cpuid = FakeCpuid {
            leaves: vec![vendor_leaf(1, 0x1234, 0x5678, 0x9ABC), signature(6, 0x17)],
        };
        let id = ProcessorIdentity::detect(&cpuid);
        assert_eq!(id.vendor, Vendor::Unknown);
        assert!(id.family.is_empty());
        assert!(!id.supports_pmc());
    }

    #[test]
    fn unsupported_leaf_zero_means_unknown() {
        let cpuid = FakeCpuid {
            leaves: vec![vendor_leaf(0, GENU, INEI, NTEL)],
        };
        let id = ProcessorIdentity::detect(&cpuid);
        assert_eq!(id.vendor, Vendor::Unknown);
        assert!(id.family.is_empty());
    }
}
