//! The `print` command: list the checklist for an architecture.

use crate::checks::build_checklist;
use crate::engine::Arch;
use crate::error::{AuditError, Result};
use crate::report::{ReportMode, json, table};

/// Print the full recommendation database for `arch`, without evaluating
/// anything. Filtering modes need check results, so they are rejected here.
pub fn handle_print(arch: Arch, mode: Option<ReportMode>) -> Result<()> {
    if let Some(mode) = mode {
        if mode.is_filter() {
            return Err(AuditError::Usage(
                "filtering report modes require check results; print accepts verbose or json"
                    .to_string(),
            ));
        }
    }

    let checklist = build_checklist(arch, true);
    if mode == Some(ReportMode::Json) {
        println!("{}", json::format(&checklist, false));
        return Ok(());
    }

    println!("[+] Hardening recommendations for {}: {} checks", arch, checklist.len());
    println!();
    print!("{}", table::format(&checklist, mode, false));
    Ok(())
}
