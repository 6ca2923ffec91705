//! # kconfig-audit
//!
//! A Rust-based command-line tool that audits Linux kernel build configurations
//! against security hardening recommendations drawn from the Kernel Self
//! Protection Project, grsecurity, CLIP OS and distribution lockdown guidance.
//!
//! ## Features
//!
//! - **Kconfig Auditing**: Parses plain or gzipped kernel config files
//! - **Cmdline Auditing**: Optionally checks boot command line parameters
//! - **Version Awareness**: Recommendations adapt to the detected kernel version
//! - **Multiple Reports**: Fixed-width tables, JSON, and filtered views
//! - **Fragment Generation**: Emits a hardened Kconfig fragment per architecture
//!
//! ## Example
//!
//! ```rust,no_run
//! use kconfig_audit::checks::build_checklist;
//! use kconfig_audit::parser::{detect_arch, detect_kernel_version, parse_kconfig, read_source};
//! use std::path::Path;
//!
//! # fn main() -> kconfig_audit::Result<()> {
//! let text = read_source(Path::new("/boot/config-6.6.8"))?;
//! let opts = parse_kconfig(&text)?;
//! let mut checklist = build_checklist(detect_arch(&text)?, false);
//! checklist.populate_kconfig(&opts);
//! checklist.populate_version(detect_kernel_version(&text)?);
//! checklist.refine(&opts)?;
//! checklist.evaluate()?;
//! let tally = checklist.tally();
//! println!("OK {} / FAIL {}", tally.ok, tally.fail);
//! # Ok(())
//! # }
//! ```

pub mod checks;
pub mod cli;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod report;

// Re-export commonly used types and functions
pub use engine::{Arch, Checklist, KernelVersion, Tally, Verdict};
pub use error::{AuditError, Result};
pub use handlers::*;
use cli::Commands;

/// The current version of the CLI tool
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Check { config, cmdline, mode } => {
            handlers::handle_check(&config, cmdline.as_deref(), mode)
        }
        Commands::Print { arch, mode } => handlers::handle_print(arch, mode),
        Commands::Generate { arch } => handlers::handle_generate(arch),
    }
}
