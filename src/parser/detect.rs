//! Marker detection: microarchitecture, kernel version, and compiler.
//!
//! All three detectors scan the raw Kconfig text before the option parser
//! runs, so a file that fails detection is rejected without building any
//! checklist.

use crate::engine::types::{Arch, KernelVersion};
use crate::error::{DetectError, Result};
use log::debug;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static ARCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CONFIG_([A-Za-z0-9_]+)=y$").unwrap());

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^# Linux/\S+\s+(\S+)\s+Kernel Configuration$").unwrap());

static GCC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CONFIG_GCC_VERSION=(\d+)$").unwrap());

static CLANG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CONFIG_CLANG_VERSION=(\d+)$").unwrap());

/// Detect the target microarchitecture from its `CONFIG_<ARCH>=y` marker.
///
/// Exactly one marker line from the supported set must be present; zero or
/// more than one (duplicates included) is a detection failure.
pub fn detect_arch(text: &str) -> Result<Arch> {
    let mut detected: Option<Arch> = None;
    for line in text.lines() {
        let Some(caps) = ARCH_RE.captures(line) else {
            continue;
        };
        let Some(arch) = Arch::parse(&caps[1]) else {
            continue;
        };
        if detected.is_some() {
            return Err(DetectError::MultipleArch.into());
        }
        detected = Some(arch);
    }
    match detected {
        Some(arch) => {
            debug!("detected microarchitecture {arch}");
            Ok(arch)
        }
        None => Err(DetectError::ArchNotFound.into()),
    }
}

/// Detect the kernel version from the `# Linux/<arch> <version> Kernel
/// Configuration` banner.
///
/// The version field must have at least three dot-separated components and
/// integer major/minor parts; anything else is fatal.
pub fn detect_kernel_version(text: &str) -> Result<KernelVersion> {
    for line in text.lines() {
        let Some(caps) = VERSION_RE.captures(line) else {
            continue;
        };
        let ver_str = &caps[1];
        let parts: Vec<&str> = ver_str.split('.').collect();
        if parts.len() < 3 {
            return Err(DetectError::BadVersionString(ver_str.to_string()).into());
        }
        let (Ok(major), Ok(minor)) = (parts[0].parse::<u32>(), parts[1].parse::<u32>()) else {
            return Err(DetectError::BadVersionString(ver_str.to_string()).into());
        };
        let version = KernelVersion::new(major, minor);
        debug!("detected kernel version {version}");
        return Ok(version);
    }
    Err(DetectError::VersionNotFound.into())
}

/// The toolchain a kernel was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toolchain {
    /// GNU Compiler Collection
    Gcc,
    /// LLVM Clang
    Clang,
}

impl Toolchain {
    /// Get the marker-style name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gcc => "GCC",
            Self::Clang => "CLANG",
        }
    }
}

/// The detected compiler: toolchain plus its packed version number, e.g.
/// `GCC 120200` for gcc 12.2.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compiler {
    /// Which toolchain built the kernel
    pub toolchain: Toolchain,
    /// The packed numeric version from the marker
    pub version: u32,
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.toolchain.as_str(), self.version)
    }
}

/// Detect the compiler from the `CONFIG_GCC_VERSION` / `CONFIG_CLANG_VERSION`
/// markers.
///
/// When both markers are present exactly one must be nonzero; both zero or
/// both nonzero is a fatal inconsistency. Kernels too old to carry the
/// markers yield `Ok(None)` and the audit carries on without compiler info.
pub fn detect_compiler(text: &str) -> Result<Option<Compiler>> {
    let mut gcc: Option<u32> = None;
    let mut clang: Option<u32> = None;

    for line in text.lines() {
        if let Some(caps) = GCC_RE.captures(line) {
            gcc = caps[1].parse().ok();
        } else if let Some(caps) = CLANG_RE.captures(line) {
            clang = caps[1].parse().ok();
        }
    }

    match (gcc, clang) {
        (Some(gcc), Some(0)) if gcc != 0 => {
            Ok(Some(Compiler { toolchain: Toolchain::Gcc, version: gcc }))
        }
        (Some(0), Some(clang)) if clang != 0 => {
            Ok(Some(Compiler { toolchain: Toolchain::Clang, version: clang }))
        }
        (Some(gcc), Some(clang)) => Err(DetectError::ConflictingCompilers { gcc, clang }.into()),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;

    fn detect_err<T: fmt::Debug>(result: Result<T>) -> DetectError {
        match result.unwrap_err() {
            AuditError::Detect(err) => err,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn single_arch_marker_is_detected() {
        let text = "# comment\nCONFIG_X86_64=y\nCONFIG_64BIT=y\n";
        assert_eq!(detect_arch(text).unwrap(), Arch::X86_64);
        assert_eq!(detect_arch("CONFIG_ARM=y\n").unwrap(), Arch::Arm);
    }

    #[test]
    fn conflicting_arch_markers_are_fatal() {
        let err = detect_err(detect_arch("CONFIG_X86_64=y\nCONFIG_ARM64=y\n"));
        assert_eq!(err, DetectError::MultipleArch);

        // A repeated marker for the same arch is just as ambiguous.
        let err = detect_err(detect_arch("CONFIG_X86_64=y\nCONFIG_X86_64=y\n"));
        assert_eq!(err, DetectError::MultipleArch);
    }

    #[test]
    fn missing_arch_marker_is_fatal() {
        let err = detect_err(detect_arch("CONFIG_BUG=y\n# CONFIG_ARM64 is not set\n"));
        assert_eq!(err, DetectError::ArchNotFound);
    }

    #[test]
    fn off_and_module_markers_do_not_count() {
        let err = detect_err(detect_arch("CONFIG_ARM64=m\n"));
        assert_eq!(err, DetectError::ArchNotFound);
    }

    #[test]
    fn version_banner_yields_major_minor() {
        let text = "# Linux/x86_64 5.15.41-generic Kernel Configuration\nCONFIG_BUG=y\n";
        assert_eq!(detect_kernel_version(text).unwrap(), KernelVersion::new(5, 15));

        let text = "# Linux/arm64 6.1.0 Kernel Configuration\n";
        assert_eq!(detect_kernel_version(text).unwrap(), KernelVersion::new(6, 1));
    }

    #[test]
    fn short_version_field_is_fatal() {
        let text = "# Linux/x86_64 5.15 Kernel Configuration\n";
        assert_eq!(
            detect_err(detect_kernel_version(text)),
            DetectError::BadVersionString("5.15".to_string())
        );
    }

    #[test]
    fn non_numeric_version_parts_are_fatal() {
        let text = "# Linux/x86_64 five.15.41 Kernel Configuration\n";
        assert_eq!(
            detect_err(detect_kernel_version(text)),
            DetectError::BadVersionString("five.15.41".to_string())
        );
    }

    #[test]
    fn missing_banner_is_fatal() {
        assert_eq!(
            detect_err(detect_kernel_version("CONFIG_BUG=y\n")),
            DetectError::VersionNotFound
        );
    }

    #[test]
    fn gcc_marker_wins_when_clang_is_zero() {
        let text = "CONFIG_GCC_VERSION=120200\nCONFIG_CLANG_VERSION=0\n";
        let compiler = detect_compiler(text).unwrap().unwrap();
        assert_eq!(compiler.toolchain, Toolchain::Gcc);
        assert_eq!(compiler.version, 120200);
        assert_eq!(compiler.to_string(), "GCC 120200");
    }

    #[test]
    fn clang_marker_wins_when_gcc_is_zero() {
        let text = "CONFIG_GCC_VERSION=0\nCONFIG_CLANG_VERSION=150006\n";
        let compiler = detect_compiler(text).unwrap().unwrap();
        assert_eq!(compiler.toolchain, Toolchain::Clang);
        assert_eq!(compiler.to_string(), "CLANG 150006");
    }

    #[test]
    fn contradictory_markers_are_fatal() {
        let both = "CONFIG_GCC_VERSION=120200\nCONFIG_CLANG_VERSION=150006\n";
        assert_eq!(
            detect_err(detect_compiler(both)),
            DetectError::ConflictingCompilers { gcc: 120200, clang: 150006 }
        );

        let neither = "CONFIG_GCC_VERSION=0\nCONFIG_CLANG_VERSION=0\n";
        assert_eq!(
            detect_err(detect_compiler(neither)),
            DetectError::ConflictingCompilers { gcc: 0, clang: 0 }
        );
    }

    #[test]
    fn absent_markers_fail_softly() {
        assert_eq!(detect_compiler("CONFIG_BUG=y\n").unwrap(), None);
        assert_eq!(detect_compiler("CONFIG_GCC_VERSION=120200\n").unwrap(), None);
    }
}
