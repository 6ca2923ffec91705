//! Error types for the audit pipeline
//!
//! Fatal errors abort the run; per-check verdicts are never errors and live
//! in the engine's evaluation results instead.

use thiserror::Error;

/// Errors raised while parsing Kconfig or kernel command line input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// An enabled option line carries the disabled marker as its value
    #[error("bad enabled Kconfig option in line \"{0}\"")]
    BadEnabledOption(String),

    /// A `# CONFIG_... ` comment line is not a well-formed disabled marker
    #[error("bad disabled Kconfig option in line \"{0}\"")]
    BadDisabledOption(String),

    /// The same option name appears twice in one Kconfig file
    #[error("Kconfig option {0} exists multiple times")]
    DuplicateOption(String),

    /// The kernel command line file has content after its first line
    #[error("the kernel command line file contains more than one line")]
    MultiLineCmdline,

    /// The kernel command line file has no content at all
    #[error("the kernel command line file is empty")]
    EmptyCmdline,
}

/// Errors raised while detecting architecture, kernel version, or compiler
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DetectError {
    /// No supported `CONFIG_<ARCH>=y` marker found
    #[error("failed to detect microarchitecture")]
    ArchNotFound,

    /// Conflicting architecture markers found
    #[error("more than one supported microarchitecture is detected")]
    MultipleArch,

    /// No `# Linux/... Kernel Configuration` banner found
    #[error("no kernel version detected")]
    VersionNotFound,

    /// The version banner exists but its version field is malformed
    #[error("failed to parse the kernel version string \"{0}\"")]
    BadVersionString(String),

    /// Compiler markers are present but contradict each other
    #[error("invalid GCC_VERSION ({gcc}) and CLANG_VERSION ({clang}) markers")]
    ConflictingCompilers {
        /// Value of `CONFIG_GCC_VERSION`
        gcc: u32,
        /// Value of `CONFIG_CLANG_VERSION`
        clang: u32,
    },
}

/// Errors raised by the check engine itself
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// A numeric comparison met a value that does not parse as an integer
    #[error("non-numeric value \"{value}\" for {name} in a numeric comparison")]
    NonNumericValue {
        /// Option name of the offending check
        name: String,
        /// The raw value that failed to parse
        value: String,
    },

    /// A refinement hook targets a check that cannot take a numeric threshold
    #[error("refinement for {0} requires a numeric leaf check")]
    RefinementTarget(String),

    /// A version-gated check was evaluated before version data was attached
    #[error("version-gated check evaluated without a detected kernel version")]
    VersionNotAttached,
}

/// Top-level error type for every audit operation
#[derive(Debug, Error)]
pub enum AuditError {
    /// Input parsing failed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Marker detection failed
    #[error(transparent)]
    Detect(#[from] DetectError),

    /// The check engine hit an internal inconsistency
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Reading an input file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested flag combination is not valid
    #[error("{0}")]
    Usage(String),
}

/// Result type alias for audit operations
pub type Result<T> = std::result::Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_messages_name_the_offender() {
        let err = ParseError::DuplicateOption("CONFIG_BUG".to_string());
        assert_eq!(err.to_string(), "Kconfig option CONFIG_BUG exists multiple times");

        let err = ParseError::BadDisabledOption("# CONFIG_BUG is not here".to_string());
        assert!(err.to_string().contains("bad disabled Kconfig option"));
    }

    #[test]
    fn detect_errors_render_expected_phrases() {
        assert_eq!(
            DetectError::MultipleArch.to_string(),
            "more than one supported microarchitecture is detected"
        );
        assert_eq!(
            DetectError::ConflictingCompilers { gcc: 0, clang: 0 }.to_string(),
            "invalid GCC_VERSION (0) and CLANG_VERSION (0) markers"
        );
    }

    #[test]
    fn engine_errors_pass_through_the_audit_error() {
        let err = AuditError::from(EngineError::NonNumericValue {
            name: "CONFIG_ARCH_MMAP_RND_BITS".to_string(),
            value: "deadbeef".to_string(),
        });
        assert!(
            err.to_string()
                .contains("non-numeric value \"deadbeef\" for CONFIG_ARCH_MMAP_RND_BITS")
        );
    }
}
