use crate::engine::Arch;
use crate::report::ReportMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kconfig-audit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Audit kernel build configurations against hardening recommendations")]
#[command(
    long_about = "A CLI tool that checks Linux kernel Kconfig files and boot command lines against security hardening recommendations drawn from the KSPP, grsecurity, CLIP OS and distribution lockdown guidance."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check a kernel config file against the hardening checklist
    Check {
        /// Path to the kernel config file (plain or gzipped)
        #[arg(short, long, value_name = "FILE")]
        config: PathBuf,

        /// Path to a one-line kernel cmdline file (e.g. /proc/cmdline)
        #[arg(short = 'l', long, value_name = "FILE")]
        cmdline: Option<PathBuf>,

        /// Report mode
        #[arg(short, long, value_enum, value_name = "MODE")]
        mode: Option<ReportMode>,
    },

    /// Print the hardening checklist for an architecture
    Print {
        /// Target microarchitecture
        #[arg(value_enum, value_name = "ARCH")]
        arch: Arch,

        /// Report mode (verbose or json)
        #[arg(short, long, value_enum, value_name = "MODE")]
        mode: Option<ReportMode>,
    },

    /// Generate a hardened Kconfig fragment for an architecture
    Generate {
        /// Target microarchitecture
        #[arg(value_enum, value_name = "ARCH")]
        arch: Arch,
    },
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        if self.quiet {
            return;
        }

        let level = match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}
