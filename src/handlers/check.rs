//! The `check` command: audit a kernel configuration.

use crate::checks::build_checklist;
use crate::engine::DataSource;
use crate::error::Result;
use crate::parser::{
    detect_arch, detect_compiler, detect_kernel_version, parse_cmdline, parse_kconfig, read_source,
};
use crate::report::{ReportMode, json, table};
use log::debug;
use std::path::Path;

/// Audit a Kconfig file, and optionally a kernel command line file, against
/// the hardening checklist for the detected microarchitecture.
///
/// A completed audit exits successfully no matter how many checks fail;
/// only fatal input errors propagate.
pub fn handle_check(config: &Path, cmdline: Option<&Path>, mode: Option<ReportMode>) -> Result<()> {
    let json_mode = mode == Some(ReportMode::Json);

    if !json_mode {
        println!("[+] Kconfig file to check: {}", config.display());
        if let Some(path) = cmdline {
            println!("[+] Kernel cmdline file to check: {}", path.display());
        }
    }

    let kconfig_text = read_source(config)?;
    let arch = detect_arch(&kconfig_text)?;
    let version = detect_kernel_version(&kconfig_text)?;
    let compiler = detect_compiler(&kconfig_text)?;
    if !json_mode {
        println!("[+] Detected microarchitecture: {arch}");
        println!("[+] Detected kernel version: {version}");
        match &compiler {
            Some(compiler) => println!("[+] Detected compiler: {compiler}"),
            None => println!("[-] The compiler is not detected"),
        }
    }

    let mut checklist = build_checklist(arch, cmdline.is_some());
    debug!("built {} checks for {arch}", checklist.len());

    let kconfig_opts = parse_kconfig(&kconfig_text)?;
    checklist.populate_kconfig(&kconfig_opts);
    checklist.populate_version(version);

    let cmdline_opts = match cmdline {
        Some(path) => {
            let text = read_source(path)?;
            let opts = parse_cmdline(&text)?;
            checklist.populate_cmdline(&opts);
            Some(opts)
        }
        None => None,
    };

    checklist.refine(&kconfig_opts)?;
    checklist.evaluate()?;

    let tally = checklist.tally();
    debug!("verdicts: {} ok, {} fail, {} unknown", tally.ok, tally.fail, tally.unknown);

    if json_mode {
        println!("{}", json::format(&checklist, true));
        return Ok(());
    }

    println!();
    print!("{}", table::format(&checklist, mode, true));

    if mode == Some(ReportMode::Verbose) {
        for (name, value) in checklist.unknown_options(DataSource::Kconfig, &kconfig_opts) {
            println!("[?] No check found for option {} ({})", name, value.render());
        }
        if let Some(opts) = &cmdline_opts {
            for (name, value) in checklist.unknown_options(DataSource::Cmdline, opts) {
                println!("[?] No check found for option {} ({})", name, value.render());
            }
        }
    }

    println!("{}", table::footer(&tally, mode));
    Ok(())
}
