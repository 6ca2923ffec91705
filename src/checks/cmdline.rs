//! Boot-time kernel command line hardening recommendations.
//!
//! Compound entries put the cmdline leaf first, so the report row carries
//! the parameter name even when the tree also consults Kconfig data.

use super::{c, eq, k, not_off, off, y};
use crate::engine::check::{Check, Expected, LeafCheck};
use crate::engine::Decision::{self, Clipos, Defconfig, Grsecurity, Kspp, Maintainer};
use crate::engine::Rationale::{self, CutAttackSurface, HardenUserspace, SelfProtection};
use crate::engine::{Arch, Recommendation};

fn cmdline(rationale: Rationale, decision: Decision, name: &str, expected: Expected) -> Recommendation {
    Recommendation::new(rationale, decision, LeafCheck::cmdline(name, expected))
}

fn complex(rationale: Rationale, decision: Decision, check: Check) -> Recommendation {
    Recommendation::new(rationale, decision, check)
}

/// Boot parameter hardening recommendations for `arch`.
pub fn cmdline_recommendations(arch: Arch) -> Vec<Recommendation> {
    let mut checks = Vec::new();

    // self_protection: defconfig
    checks.push(cmdline(SelfProtection, Defconfig, "mitigations", not_off()));
    if matches!(arch, Arch::X86_64 | Arch::X86_32 | Arch::Arm64) {
        checks.push(complex(
            SelfProtection,
            Defconfig,
            Check::and(vec![c("nokaslr", off()), k("RANDOMIZE_BASE", y())]),
        ));
    }
    if arch.is_x86() {
        checks.push(cmdline(SelfProtection, Defconfig, "spectre_v2", not_off()));
    }
    if arch == Arch::Arm64 {
        checks.push(complex(
            SelfProtection,
            Defconfig,
            Check::or(vec![
                c("rodata", eq("full")),
                Check::and(vec![c("rodata", off()), k("RODATA_FULL_DEFAULT_ENABLED", y())]),
            ]),
        ));
    } else {
        checks.push(cmdline(SelfProtection, Defconfig, "rodata", not_off()));
    }

    // self_protection: kspp
    if arch.is_x86() {
        checks.push(cmdline(SelfProtection, Kspp, "nosmt", not_off()));
    }
    if arch == Arch::X86_64 {
        // Explicit pti=on, or the build-time default left enabled
        checks.push(complex(
            SelfProtection,
            Kspp,
            Check::or(vec![
                c("pti", eq("on")),
                Check::and(vec![c("pti", off()), k("PAGE_TABLE_ISOLATION", y())]),
            ]),
        ));
    }
    checks.extend([
        complex(
            SelfProtection,
            Kspp,
            Check::or(vec![
                c("init_on_alloc", eq("1")),
                Check::and(vec![c("init_on_alloc", off()), k("INIT_ON_ALLOC_DEFAULT_ON", y())]),
            ]),
        ),
        complex(
            SelfProtection,
            Kspp,
            Check::or(vec![
                c("init_on_free", eq("1")),
                Check::and(vec![c("init_on_free", off()), k("INIT_ON_FREE_DEFAULT_ON", y())]),
            ]),
        ),
        complex(
            SelfProtection,
            Kspp,
            Check::or(vec![
                c("iommu.strict", eq("1")),
                Check::and(vec![c("iommu.strict", off()), k("IOMMU_DEFAULT_DMA_STRICT", y())]),
            ]),
        ),
        complex(
            SelfProtection,
            Kspp,
            Check::or(vec![
                c("iommu.passthrough", eq("0")),
                Check::and(vec![c("iommu.passthrough", off()), k("IOMMU_DEFAULT_PASSTHROUGH", off())]),
            ]),
        ),
    ]);
    if matches!(arch, Arch::X86_64 | Arch::Arm64) {
        checks.push(complex(
            SelfProtection,
            Kspp,
            Check::or(vec![
                c("randomize_kstack_offset", eq("1")),
                Check::and(vec![
                    c("randomize_kstack_offset", off()),
                    k("RANDOMIZE_KSTACK_OFFSET_DEFAULT", y()),
                ]),
            ]),
        ));
    }

    // self_protection: clipos
    checks.push(complex(
        SelfProtection,
        Clipos,
        Check::or(vec![
            c("slab_nomerge", not_off()),
            Check::and(vec![c("slab_merge", off()), k("SLAB_MERGE_DEFAULT", off())]),
        ]),
    ));

    // self_protection: maintainer
    if arch.is_x86() {
        checks.extend([
            cmdline(SelfProtection, Maintainer, "nosmep", off()),
            cmdline(SelfProtection, Maintainer, "nosmap", off()),
            cmdline(SelfProtection, Maintainer, "nospectre_v1", off()),
            cmdline(SelfProtection, Maintainer, "nospectre_v2", off()),
            cmdline(SelfProtection, Maintainer, "nospec_store_bypass_disable", off()),
        ]);
    }
    if arch == Arch::Arm64 {
        checks.extend([
            cmdline(SelfProtection, Maintainer, "arm64.nobti", off()),
            cmdline(SelfProtection, Maintainer, "arm64.nopauth", off()),
            cmdline(SelfProtection, Maintainer, "arm64.nomte", off()),
        ]);
    }

    // cut_attack_surface
    if arch == Arch::X86_64 {
        checks.push(complex(
            CutAttackSurface,
            Kspp,
            Check::or(vec![c("vsyscall", eq("none")), k("LEGACY_VSYSCALL_NONE", y())]),
        ));
    }
    checks.extend([
        cmdline(CutAttackSurface, Grsecurity, "debugfs", eq("off")),
        cmdline(CutAttackSurface, Maintainer, "sysrq_always_enabled", off()),
    ]);

    // harden_userspace
    checks.push(cmdline(HardenUserspace, Maintainer, "norandmaps", off()));

    checks
}
