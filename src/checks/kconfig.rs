//! Build-time Kconfig hardening recommendations.

use super::{at_least, eq, k, off, ver, y};
use crate::engine::check::{Check, Expected, LeafCheck};
use crate::engine::Decision::{self, Clipos, Defconfig, Grsecurity, Kspp, Lockdown, Maintainer};
use crate::engine::Rationale::{
    self, CutAttackSurface, HardenUserspace, SecurityPolicy, SelfProtection,
};
use crate::engine::{Arch, KernelVersion, Recommendation};

fn kconfig(rationale: Rationale, decision: Decision, name: &str, expected: Expected) -> Recommendation {
    Recommendation::new(rationale, decision, LeafCheck::kconfig(name, expected))
}

fn complex(rationale: Rationale, decision: Decision, check: Check) -> Recommendation {
    Recommendation::new(rationale, decision, check)
}

/// Build-time hardening recommendations for `arch`.
///
/// Entries reference only Kconfig and version leaves, so the list evaluates
/// standalone when no command line file is supplied.
pub fn kconfig_recommendations(arch: Arch) -> Vec<Recommendation> {
    let mut checks = Vec::new();

    let modules_not_set = k("MODULES", off());

    // self_protection: defconfig
    checks.extend([
        kconfig(SelfProtection, Defconfig, "BUG", y()),
        kconfig(SelfProtection, Defconfig, "SLUB_DEBUG", y()),
        kconfig(SelfProtection, Defconfig, "THREAD_INFO_IN_TASK", y()),
        kconfig(SelfProtection, Defconfig, "IOMMU_SUPPORT", y()),
        kconfig(SelfProtection, Defconfig, "STACKPROTECTOR", y()),
        kconfig(SelfProtection, Defconfig, "STACKPROTECTOR_STRONG", y()),
        kconfig(SelfProtection, Defconfig, "STRICT_KERNEL_RWX", y()),
        complex(
            SelfProtection,
            Defconfig,
            Check::or(vec![k("STRICT_MODULE_RWX", y()), modules_not_set.clone()]),
        ),
        // CONFIG_REFCOUNT_FULL became the unconditional behavior in 5.5
        complex(SelfProtection, Defconfig, Check::or(vec![k("REFCOUNT_FULL", y()), ver(5, 5)])),
    ]);
    if arch.is_x86() {
        checks.extend([
            kconfig(SelfProtection, Defconfig, "MICROCODE", y()),
            kconfig(SelfProtection, Defconfig, "RETPOLINE", y()),
            // CONFIG_X86_SMAP dropped out of Kconfig in 5.19, SMAP is
            // unconditional from there on
            complex(SelfProtection, Defconfig, Check::or(vec![k("X86_SMAP", y()), ver(5, 19)])),
            // CONFIG_X86_INTEL_UMIP was renamed to CONFIG_X86_UMIP in 5.5
            complex(
                SelfProtection,
                Defconfig,
                Check::version_gated(
                    KernelVersion::new(5, 5),
                    k("X86_INTEL_UMIP", y()),
                    k("X86_UMIP", y()),
                ),
            ),
        ]);
    }
    if arch == Arch::X86_64 {
        checks.extend([
            kconfig(SelfProtection, Defconfig, "PAGE_TABLE_ISOLATION", y()),
            kconfig(SelfProtection, Defconfig, "RANDOMIZE_MEMORY", y()),
        ]);
    }
    if matches!(arch, Arch::X86_64 | Arch::Arm64) {
        checks.push(kconfig(SelfProtection, Defconfig, "VMAP_STACK", y()));
    }
    if matches!(arch, Arch::X86_64 | Arch::X86_32 | Arch::Arm64) {
        checks.push(kconfig(SelfProtection, Defconfig, "RANDOMIZE_BASE", y()));
    }
    if arch == Arch::Arm64 {
        checks.extend([
            kconfig(SelfProtection, Defconfig, "UNMAP_KERNEL_AT_EL0", y()),
            kconfig(SelfProtection, Defconfig, "ARM64_E0PD", y()),
            kconfig(SelfProtection, Defconfig, "RODATA_FULL_DEFAULT_ENABLED", y()),
            // The 5.13 split left the kernel half of pointer authentication
            // under CONFIG_ARM64_PTR_AUTH_KERNEL
            complex(
                SelfProtection,
                Defconfig,
                Check::version_gated(
                    KernelVersion::new(5, 13),
                    k("ARM64_PTR_AUTH", y()),
                    k("ARM64_PTR_AUTH_KERNEL", y()),
                ),
            ),
            complex(
                SelfProtection,
                Defconfig,
                Check::version_gated(
                    KernelVersion::new(5, 13),
                    k("ARM64_BTI", y()),
                    k("ARM64_BTI_KERNEL", y()),
                ),
            ),
        ]);
    }
    if arch == Arch::Arm {
        checks.extend([
            kconfig(SelfProtection, Defconfig, "CPU_SW_DOMAIN_PAN", y()),
            kconfig(SelfProtection, Defconfig, "HARDEN_BRANCH_PREDICTOR", y()),
        ]);
    }

    // self_protection: kspp
    checks.extend([
        kconfig(SelfProtection, Kspp, "BUG_ON_DATA_CORRUPTION", y()),
        kconfig(SelfProtection, Kspp, "DEBUG_WX", y()),
        kconfig(SelfProtection, Kspp, "SCHED_STACK_END_CHECK", y()),
        kconfig(SelfProtection, Kspp, "SLAB_FREELIST_HARDENED", y()),
        kconfig(SelfProtection, Kspp, "SLAB_FREELIST_RANDOM", y()),
        kconfig(SelfProtection, Kspp, "SHUFFLE_PAGE_ALLOCATOR", y()),
        kconfig(SelfProtection, Kspp, "FORTIFY_SOURCE", y()),
        kconfig(SelfProtection, Kspp, "DEBUG_LIST", y()),
        kconfig(SelfProtection, Kspp, "DEBUG_SG", y()),
        kconfig(SelfProtection, Kspp, "DEBUG_NOTIFIERS", y()),
        kconfig(SelfProtection, Kspp, "DEBUG_VIRTUAL", y()),
        // CONFIG_DEBUG_CREDENTIALS was retired in 6.6 with the cred refcount
        // rework
        complex(SelfProtection, Kspp, Check::or(vec![k("DEBUG_CREDENTIALS", y()), ver(6, 6)])),
        kconfig(SelfProtection, Kspp, "HARDENED_USERCOPY", y()),
        kconfig(SelfProtection, Kspp, "HARDENED_USERCOPY_FALLBACK", off()),
        kconfig(SelfProtection, Kspp, "INIT_ON_ALLOC_DEFAULT_ON", y()),
        kconfig(SelfProtection, Kspp, "INIT_ON_FREE_DEFAULT_ON", y()),
        kconfig(SelfProtection, Kspp, "ZERO_CALL_USED_REGS", y()),
        kconfig(SelfProtection, Kspp, "GCC_PLUGIN_LATENT_ENTROPY", y()),
        // CONFIG_GCC_PLUGIN_RANDSTRUCT moved out of the plugin menu in 5.19
        complex(
            SelfProtection,
            Kspp,
            Check::version_gated(
                KernelVersion::new(5, 19),
                k("GCC_PLUGIN_RANDSTRUCT", y()),
                k("RANDSTRUCT_FULL", y()),
            ),
        ),
        // Stack variable zeroing grew a compiler-independent implementation
        // in 5.9
        complex(
            SelfProtection,
            Kspp,
            Check::version_gated(
                KernelVersion::new(5, 9),
                k("GCC_PLUGIN_STRUCTLEAK_BYREF_ALL", y()),
                k("INIT_STACK_ALL_ZERO", y()),
            ),
        ),
        complex(SelfProtection, Kspp, Check::or(vec![k("MODULE_SIG", y()), modules_not_set.clone()])),
        complex(
            SelfProtection,
            Kspp,
            Check::or(vec![k("MODULE_SIG_ALL", y()), modules_not_set.clone()]),
        ),
        complex(
            SelfProtection,
            Kspp,
            Check::or(vec![k("MODULE_SIG_SHA512", y()), modules_not_set.clone()]),
        ),
    ]);
    if arch.is_64bit() {
        checks.push(kconfig(SelfProtection, Kspp, "DEFAULT_MMAP_MIN_ADDR", eq("65536")));
    } else {
        checks.push(kconfig(SelfProtection, Kspp, "DEFAULT_MMAP_MIN_ADDR", eq("32768")));
    }
    if matches!(arch, Arch::X86_64 | Arch::X86_32 | Arch::Arm64) {
        checks.push(complex(
            SelfProtection,
            Kspp,
            Check::and(vec![k("GCC_PLUGIN_STACKLEAK", y()), k("GCC_PLUGINS", y())]),
        ));
    }
    if matches!(arch, Arch::X86_64 | Arch::Arm64) {
        checks.push(kconfig(SelfProtection, Kspp, "RANDOMIZE_KSTACK_OFFSET_DEFAULT", y()));
    }
    if arch.is_x86() {
        checks.extend([
            kconfig(SelfProtection, Kspp, "INTEL_IOMMU", y()),
            kconfig(SelfProtection, Kspp, "INTEL_IOMMU_DEFAULT_ON", y()),
        ]);
    }
    if arch == Arch::X86_64 {
        checks.push(kconfig(SelfProtection, Kspp, "AMD_IOMMU", y()));
    }
    if arch == Arch::Arm64 {
        checks.extend([
            kconfig(SelfProtection, Kspp, "ARM64_SW_TTBR0_PAN", y()),
            kconfig(SelfProtection, Kspp, "ARM64_MTE", y()),
        ]);
    }
    if arch == Arch::Arm {
        checks.push(kconfig(SelfProtection, Kspp, "DEBUG_ALIGN_RODATA", y()));
    }

    // self_protection: clipos
    checks.extend([
        kconfig(SelfProtection, Clipos, "SLAB_MERGE_DEFAULT", off()),
        kconfig(SelfProtection, Clipos, "RANDOM_TRUST_BOOTLOADER", off()),
    ]);
    if arch.is_x86() {
        checks.push(kconfig(SelfProtection, Clipos, "RANDOM_TRUST_CPU", off()));
    }

    // self_protection: maintainer
    checks.push(kconfig(SelfProtection, Maintainer, "UBSAN_BOUNDS", y()));
    if arch.is_x86() {
        checks.push(kconfig(SelfProtection, Maintainer, "RESET_ATTACK_MITIGATION", y()));
    }
    if arch == Arch::X86_64 {
        checks.push(kconfig(SelfProtection, Maintainer, "SLS", y()));
    }

    // security_policy
    checks.extend([
        kconfig(SecurityPolicy, Defconfig, "SECURITY", y()),
        kconfig(SecurityPolicy, Defconfig, "SECCOMP", y()),
        kconfig(SecurityPolicy, Defconfig, "SECCOMP_FILTER", y()),
        kconfig(SecurityPolicy, Kspp, "SECURITY_YAMA", y()),
        kconfig(SecurityPolicy, Kspp, "SECURITY_LANDLOCK", y()),
        kconfig(SecurityPolicy, Kspp, "SECURITY_SELINUX_DISABLE", off()),
        kconfig(SecurityPolicy, Kspp, "SECURITY_SELINUX_BOOTPARAM", off()),
        kconfig(SecurityPolicy, Kspp, "SECURITY_SELINUX_DEVELOP", off()),
        kconfig(SecurityPolicy, Maintainer, "SECURITY_WRITABLE_HOOKS", off()),
        kconfig(SecurityPolicy, Clipos, "SECURITY_LOCKDOWN_LSM", y()),
        kconfig(SecurityPolicy, Clipos, "SECURITY_LOCKDOWN_LSM_EARLY", y()),
        kconfig(SecurityPolicy, Clipos, "LOCK_DOWN_KERNEL_FORCE_CONFIDENTIALITY", y()),
        kconfig(SecurityPolicy, Clipos, "STATIC_USERMODEHELPER", y()),
        kconfig(SecurityPolicy, Maintainer, "SECURITY_SAFESETID", y()),
        kconfig(SecurityPolicy, Maintainer, "LSM", eq("landlock,lockdown,yama,integrity")),
        complex(
            SecurityPolicy,
            Maintainer,
            Check::and(vec![k("SECURITY_LOADPIN", y()), k("SECURITY_LOADPIN_ENFORCE", y())]),
        ),
    ]);

    // cut_attack_surface: kspp
    checks.extend([
        kconfig(CutAttackSurface, Kspp, "SECURITY_DMESG_RESTRICT", y()),
        kconfig(CutAttackSurface, Kspp, "ACPI_CUSTOM_METHOD", off()),
        kconfig(CutAttackSurface, Kspp, "COMPAT_BRK", off()),
        kconfig(CutAttackSurface, Kspp, "DEVKMEM", off()),
        kconfig(CutAttackSurface, Kspp, "COMPAT_VDSO", off()),
        kconfig(CutAttackSurface, Kspp, "BINFMT_MISC", off()),
        kconfig(CutAttackSurface, Kspp, "INET_DIAG", off()),
        kconfig(CutAttackSurface, Kspp, "KEXEC", off()),
        kconfig(CutAttackSurface, Kspp, "PROC_KCORE", off()),
        kconfig(CutAttackSurface, Kspp, "LEGACY_PTYS", off()),
        kconfig(CutAttackSurface, Kspp, "HIBERNATION", off()),
    ]);
    if arch == Arch::X86_64 {
        checks.extend([
            kconfig(CutAttackSurface, Kspp, "IA32_EMULATION", off()),
            // CONFIG_X86_X32 was renamed to CONFIG_X86_X32_ABI in 5.18
            complex(
                CutAttackSurface,
                Kspp,
                Check::version_gated(
                    KernelVersion::new(5, 18),
                    k("X86_X32", off()),
                    k("X86_X32_ABI", off()),
                ),
            ),
        ]);
    }
    if arch.is_x86() {
        checks.push(kconfig(CutAttackSurface, Kspp, "MODIFY_LDT_SYSCALL", off()));
    }
    if arch == Arch::Arm {
        checks.push(kconfig(CutAttackSurface, Kspp, "OABI_COMPAT", off()));
    }

    // cut_attack_surface: grsecurity
    checks.extend([
        kconfig(CutAttackSurface, Grsecurity, "ZSMALLOC_STAT", off()),
        kconfig(CutAttackSurface, Grsecurity, "PAGE_OWNER", off()),
        kconfig(CutAttackSurface, Grsecurity, "DEBUG_KMEMLEAK", off()),
        kconfig(CutAttackSurface, Grsecurity, "BINFMT_AOUT", off()),
        kconfig(CutAttackSurface, Grsecurity, "KPROBE_EVENTS", off()),
        kconfig(CutAttackSurface, Grsecurity, "UPROBE_EVENTS", off()),
        kconfig(CutAttackSurface, Grsecurity, "GENERIC_TRACER", off()),
        kconfig(CutAttackSurface, Grsecurity, "FUNCTION_TRACER", off()),
        kconfig(CutAttackSurface, Grsecurity, "STACK_TRACER", off()),
        kconfig(CutAttackSurface, Grsecurity, "HIST_TRIGGERS", off()),
        kconfig(CutAttackSurface, Grsecurity, "BLK_DEV_IO_TRACE", off()),
        kconfig(CutAttackSurface, Grsecurity, "PROC_VMCORE", off()),
        kconfig(CutAttackSurface, Grsecurity, "PROC_PAGE_MONITOR", off()),
        kconfig(CutAttackSurface, Grsecurity, "USELIB", off()),
        kconfig(CutAttackSurface, Grsecurity, "CHECKPOINT_RESTORE", off()),
        kconfig(CutAttackSurface, Grsecurity, "USERFAULTFD", off()),
        kconfig(CutAttackSurface, Grsecurity, "HWPOISON_INJECT", off()),
        kconfig(CutAttackSurface, Grsecurity, "MEM_SOFT_DIRTY", off()),
        kconfig(CutAttackSurface, Grsecurity, "DEVPORT", off()),
        kconfig(CutAttackSurface, Grsecurity, "DEBUG_FS", off()),
        kconfig(CutAttackSurface, Grsecurity, "NOTIFIER_ERROR_INJECTION", off()),
        kconfig(CutAttackSurface, Grsecurity, "FAIL_FUTEX", off()),
    ]);
    if arch.is_x86() {
        checks.extend([
            kconfig(CutAttackSurface, Grsecurity, "X86_16BIT", off()),
            kconfig(CutAttackSurface, Grsecurity, "PUNIT_ATOM_DEBUG", off()),
            kconfig(CutAttackSurface, Grsecurity, "ACPI_CONFIGFS", off()),
        ]);
    }

    // cut_attack_surface: clipos
    checks.extend([
        kconfig(CutAttackSurface, Clipos, "STAGING", off()),
        kconfig(CutAttackSurface, Clipos, "KSM", off()),
        kconfig(CutAttackSurface, Clipos, "KALLSYMS", off()),
        kconfig(CutAttackSurface, Clipos, "MAGIC_SYSRQ", off()),
        kconfig(CutAttackSurface, Clipos, "KEXEC_FILE", off()),
        kconfig(CutAttackSurface, Clipos, "USER_NS", off()),
        kconfig(CutAttackSurface, Clipos, "AIO", off()),
        kconfig(CutAttackSurface, Clipos, "EFI_CUSTOM_SSDT_OVERLAYS", off()),
    ]);
    if arch.is_x86() {
        checks.extend([
            kconfig(CutAttackSurface, Clipos, "X86_CPUID", off()),
            kconfig(CutAttackSurface, Clipos, "X86_IOPL_IOPERM", off()),
            kconfig(CutAttackSurface, Clipos, "ACPI_TABLE_UPGRADE", off()),
        ]);
    }
    if arch == Arch::X86_64 {
        checks.push(kconfig(CutAttackSurface, Clipos, "X86_VSYSCALL_EMULATION", off()));
    }

    // cut_attack_surface: lockdown
    checks.extend([
        kconfig(CutAttackSurface, Lockdown, "EFI_TEST", off()),
        kconfig(CutAttackSurface, Lockdown, "BPF_SYSCALL", off()),
        kconfig(CutAttackSurface, Lockdown, "MMIOTRACE_TEST", off()),
        kconfig(CutAttackSurface, Lockdown, "KPROBES", off()),
    ]);

    // cut_attack_surface: maintainer
    checks.extend([
        kconfig(CutAttackSurface, Maintainer, "TRIM_UNUSED_KSYMS", y()),
        kconfig(CutAttackSurface, Maintainer, "MMIOTRACE", off()),
        kconfig(CutAttackSurface, Maintainer, "LIVEPATCH", off()),
        kconfig(CutAttackSurface, Maintainer, "IP_DCCP", off()),
        kconfig(CutAttackSurface, Maintainer, "IP_SCTP", off()),
        kconfig(CutAttackSurface, Maintainer, "FTRACE", off()),
        kconfig(CutAttackSurface, Maintainer, "VIDEO_VIVID", off()),
        kconfig(CutAttackSurface, Maintainer, "INPUT_EVBUG", off()),
        kconfig(CutAttackSurface, Maintainer, "KGDB", off()),
    ]);

    // harden_userspace
    checks.push(kconfig(HardenUserspace, Defconfig, "INTEGRITY", y()));
    if arch == Arch::X86_64 {
        checks.push(kconfig(HardenUserspace, Kspp, "LEGACY_VSYSCALL_NONE", y()));
    }
    if matches!(arch, Arch::X86_32 | Arch::Arm) {
        checks.push(kconfig(HardenUserspace, Defconfig, "VMSPLIT_3G", y()));
    }
    if arch.is_64bit() {
        checks.push(kconfig(HardenUserspace, Clipos, "ARCH_MMAP_RND_BITS", at_least(32)));
    } else {
        checks.push(kconfig(HardenUserspace, Clipos, "ARCH_MMAP_RND_BITS", at_least(16)));
    }
    checks.push(kconfig(HardenUserspace, Clipos, "COREDUMP", off()));

    checks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(arch: Arch) -> Vec<String> {
        kconfig_recommendations(arch).iter().map(|item| item.name().to_string()).collect()
    }

    #[test]
    fn arch_specific_entries_stay_on_their_arch() {
        assert!(names(Arch::X86_64).contains(&"CONFIG_PAGE_TABLE_ISOLATION".to_string()));
        assert!(!names(Arch::Arm64).contains(&"CONFIG_PAGE_TABLE_ISOLATION".to_string()));
        assert!(names(Arch::Arm64).contains(&"CONFIG_ARM64_MTE".to_string()));
        assert!(!names(Arch::X86_32).contains(&"CONFIG_ARM64_MTE".to_string()));
        assert!(names(Arch::Arm).contains(&"CONFIG_OABI_COMPAT".to_string()));
    }

    #[test]
    fn renamed_options_are_version_gated() {
        let items = kconfig_recommendations(Arch::Arm64);
        let gate = items
            .iter()
            .find(|item| item.name() == "CONFIG_ARM64_PTR_AUTH_KERNEL")
            .expect("pointer auth entry");
        assert_eq!(gate.kind(), "complex");

        let items = kconfig_recommendations(Arch::X86_64);
        let gate = items
            .iter()
            .find(|item| item.name() == "CONFIG_X86_X32_ABI")
            .expect("x32 ABI entry");
        assert_eq!(gate.kind(), "complex");
    }

    #[test]
    fn stack_zeroing_gate_is_registered_everywhere() {
        for arch in Arch::ALL {
            assert!(
                names(arch).contains(&"CONFIG_INIT_STACK_ALL_ZERO".to_string()),
                "{arch} misses the stack zeroing entry"
            );
        }
    }

    #[test]
    fn mmap_entropy_threshold_follows_bitness() {
        for arch in Arch::ALL {
            let items = kconfig_recommendations(arch);
            let entry = items
                .iter()
                .find(|item| item.name() == "CONFIG_ARCH_MMAP_RND_BITS")
                .expect("mmap entropy entry");
            let want = if arch.is_64bit() { ">= 32" } else { ">= 16" };
            assert_eq!(entry.desired(), want);
        }
    }

    #[test]
    fn rows_are_kconfig_or_complex() {
        for arch in Arch::ALL {
            for item in kconfig_recommendations(arch) {
                assert!(
                    matches!(item.kind(), "kconfig" | "complex"),
                    "{} has row type {}",
                    item.name(),
                    item.kind()
                );
            }
        }
    }
}
