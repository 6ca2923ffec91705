use clap::Parser;
use kconfig_audit::cli::Cli;
use std::process;

fn main() {
    if let Err(e) = run() {
        eprintln!("[!] ERROR: {}", e);
        process::exit(1);
    }
}

fn run() -> kconfig_audit::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    kconfig_audit::run_command(cli.command)
}
