//! Core types shared across the check engine.
//!
//! - `Arch` - the supported microarchitectures
//! - `KernelVersion` - `(major, minor)` pair with lexicographic ordering
//! - `DataSource` - where a leaf check reads its data from
//! - `Verdict` - the outcome of one evaluated check
//! - `Decision` / `Rationale` - static registration-time labels on a rule

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Microarchitectures the rule database knows about.
///
/// The string forms double as the `CONFIG_<ARCH>=y` marker suffixes used
/// for auto-detection.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Arch {
    /// 64-bit x86
    #[value(name = "X86_64")]
    X86_64,
    /// 32-bit x86
    #[value(name = "X86_32")]
    X86_32,
    /// 64-bit ARM
    #[value(name = "ARM64")]
    Arm64,
    /// 32-bit ARM
    #[value(name = "ARM")]
    Arm,
}

impl Arch {
    /// Every supported microarchitecture, in detection order.
    pub const ALL: [Arch; 4] = [Arch::X86_64, Arch::X86_32, Arch::Arm64, Arch::Arm];

    /// Get the marker suffix, e.g. `"X86_64"` for `CONFIG_X86_64=y`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86_64 => "X86_64",
            Self::X86_32 => "X86_32",
            Self::Arm64 => "ARM64",
            Self::Arm => "ARM",
        }
    }

    /// Parse a marker suffix (exact match).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|arch| arch.as_str() == s)
    }

    /// Whether this is a 64-bit target.
    pub fn is_64bit(&self) -> bool {
        matches!(self, Self::X86_64 | Self::Arm64)
    }

    /// Whether this is an x86 target.
    pub fn is_x86(&self) -> bool {
        matches!(self, Self::X86_64 | Self::X86_32)
    }

    /// Whether this is an ARM target.
    pub fn is_arm(&self) -> bool {
        matches!(self, Self::Arm64 | Self::Arm)
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A kernel version as the `(major, minor)` pair taken from the Kconfig
/// banner. Derived ordering compares major first, then minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct KernelVersion {
    /// Major version component
    pub major: u32,
    /// Minor version component
    pub minor: u32,
}

impl KernelVersion {
    /// Create a version pair.
    pub fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl From<(u32, u32)> for KernelVersion {
    fn from((major, minor): (u32, u32)) -> Self {
        Self::new(major, minor)
    }
}

impl fmt::Display for KernelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// The data source a leaf check reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Build-time Kconfig options
    Kconfig,
    /// Boot-time kernel command line parameters
    Cmdline,
    /// The detected kernel version itself
    Version,
}

impl DataSource {
    /// Get the string representation used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kconfig => "kconfig",
            Self::Cmdline => "cmdline",
            Self::Version => "version",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one evaluated check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// The recommendation is satisfied
    Ok,
    /// The recommendation is contradicted
    Fail,
    /// The option never appeared in any supplied data source
    Unknown,
}

impl Verdict {
    /// Get the string representation used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Fail => "FAIL",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where a recommendation comes from: its decision strength label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Enabled in the upstream defconfig for the architecture
    Defconfig,
    /// Kernel Self Protection Project recommendation
    Kspp,
    /// grsecurity-derived recommendation
    Grsecurity,
    /// CLIP OS configuration recommendation
    Clipos,
    /// Kernel lockdown feature set
    Lockdown,
    /// Maintainer's own recommendation
    Maintainer,
}

impl Decision {
    /// Get the string representation used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Defconfig => "defconfig",
            Self::Kspp => "kspp",
            Self::Grsecurity => "grsecurity",
            Self::Clipos => "clipos",
            Self::Lockdown => "lockdown",
            Self::Maintainer => "maintainer",
        }
    }

    /// Parse a decision label (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "defconfig" => Some(Self::Defconfig),
            "kspp" => Some(Self::Kspp),
            "grsecurity" => Some(Self::Grsecurity),
            "clipos" => Some(Self::Clipos),
            "lockdown" => Some(Self::Lockdown),
            "maintainer" => Some(Self::Maintainer),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The hardening category a recommendation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rationale {
    /// Kernel self-protection features
    SelfProtection,
    /// Security policy enforcement (LSMs, lockdown)
    SecurityPolicy,
    /// Removing reachable kernel attack surface
    CutAttackSurface,
    /// Userspace hardening driven by kernel configuration
    HardenUserspace,
}

impl Rationale {
    /// Get the string representation used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SelfProtection => "self_protection",
            Self::SecurityPolicy => "security_policy",
            Self::CutAttackSurface => "cut_attack_surface",
            Self::HardenUserspace => "harden_userspace",
        }
    }
}

impl fmt::Display for Rationale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arch_markers_round_trip() {
        for arch in Arch::ALL {
            assert_eq!(Arch::parse(arch.as_str()), Some(arch));
        }
        assert_eq!(Arch::parse("RISCV"), None);
        assert_eq!(Arch::parse("x86_64"), None, "marker match is exact");
    }

    #[test]
    fn arch_bitness_helpers() {
        assert!(Arch::X86_64.is_64bit());
        assert!(Arch::Arm64.is_64bit());
        assert!(!Arch::X86_32.is_64bit());
        assert!(Arch::Arm.is_arm());
        assert!(Arch::X86_32.is_x86());
    }

    #[test]
    fn kernel_version_orders_lexicographically() {
        assert!(KernelVersion::new(5, 10) > KernelVersion::new(5, 9));
        assert!(KernelVersion::new(6, 0) > KernelVersion::new(5, 19));
        assert!(KernelVersion::new(4, 20) < KernelVersion::new(5, 0));
        assert_eq!(KernelVersion::new(5, 15), KernelVersion::from((5, 15)));
    }

    #[test]
    fn display_forms_match_report_tokens() {
        assert_eq!(Verdict::Unknown.to_string(), "UNKNOWN");
        assert_eq!(Decision::Grsecurity.to_string(), "grsecurity");
        assert_eq!(Rationale::CutAttackSurface.to_string(), "cut_attack_surface");
        assert_eq!(DataSource::Cmdline.to_string(), "cmdline");
        assert_eq!(KernelVersion::new(5, 17).to_string(), "5.17");
    }

    #[test]
    fn decision_parse_is_case_insensitive() {
        assert_eq!(Decision::parse("KSPP"), Some(Decision::Kspp));
        assert_eq!(Decision::parse("CLIPOS"), Some(Decision::Clipos));
        assert_eq!(Decision::parse("unknown"), None);
    }
}
