//! Kconfig file parsing.
//!
//! Recognizes the two line shapes a kernel build writes into `.config`:
//! `CONFIG_NAME=value` and `# CONFIG_NAME is not set`. Everything else is
//! ignored. Malformed variants of the two shapes and repeated option names
//! are fatal, since they mean the input cannot be trusted.

use crate::error::{ParseError, Result};
use crate::parser::{OptionValue, ParsedOptions};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

static ON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(CONFIG_[A-Za-z0-9_]+)=(.*)$").unwrap());

// Prefix match; the exact-trailer rule is enforced separately so that a
// mangled marker is an error instead of silently ignored noise.
static OFF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^# (CONFIG_[A-Za-z0-9_]+) is not set").unwrap());

/// Parse Kconfig text into an ordered option mapping.
///
/// Values keep their raw spelling, quotes included; explicitly disabled
/// options are recorded as [`OptionValue::Off`].
pub fn parse_kconfig(text: &str) -> Result<ParsedOptions> {
    let mut opts = ParsedOptions::new();

    for raw in text.lines() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if let Some(caps) = ON_RE.captures(line) {
            let name = &caps[1];
            let value = &caps[2];
            if value == "is not set" {
                return Err(ParseError::BadEnabledOption(line.to_string()).into());
            }
            opts.insert_unique(name.to_string(), OptionValue::Set(value.to_string()))?;
        } else if let Some(caps) = OFF_RE.captures(line) {
            let name = &caps[1];
            if line != format!("# {} is not set", name) {
                return Err(ParseError::BadDisabledOption(line.to_string()).into());
            }
            opts.insert_unique(name.to_string(), OptionValue::Off)?;
        }
    }

    debug!("parsed {} Kconfig options", opts.len());
    Ok(opts)
}
