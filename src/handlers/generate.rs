//! The `generate` command: emit a hardened Kconfig fragment.

use crate::checks::kconfig_recommendations;
use crate::engine::Arch;
use crate::engine::check::Expected;
use crate::error::Result;

/// Print a Kconfig fragment enabling the recommended options for `arch`.
///
/// Only the fragment itself goes to stdout, so the output can be appended
/// to a kernel config directly.
pub fn handle_generate(arch: Arch) -> Result<()> {
    print!("{}", fragment(arch));
    Ok(())
}

/// Build the fragment text: the architecture marker first, then one line per
/// build-time recommendation, derived from its head leaf.
pub fn fragment(arch: Arch) -> String {
    let mut out = String::new();
    out.push_str(&format!("CONFIG_{}=y\n", arch.as_str()));
    for item in kconfig_recommendations(arch) {
        let head = item.head();
        // The right entropy width is only knowable from a real config,
        // where CONFIG_ARCH_MMAP_RND_BITS_MAX bounds it.
        if head.name() == "CONFIG_ARCH_MMAP_RND_BITS" {
            continue;
        }
        match head.expected() {
            Expected::Equals(value) => out.push_str(&format!("{}={}\n", head.name(), value)),
            Expected::Off => out.push_str(&format!("# {} is not set\n", head.name())),
            Expected::NotOff => out.push_str(&format!("{}=y\n", head.name())),
            Expected::Bound { threshold, .. } => {
                out.push_str(&format!("{}={}\n", head.name(), threshold))
            }
            Expected::VersionAtLeast(_) => {}
        }
    }
    out
}
