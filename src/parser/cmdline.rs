//! Kernel command line parsing.
//!
//! The input is the one-line format of `/proc/cmdline`: space-separated
//! `name` or `name=value` tokens. Values are folded through a limited
//! kstrtobool table before insertion so that the rule database can compare
//! against canonical `1`/`0` forms; parameters whose kernel-side parsers do
//! not use kstrtobool are exempt and keep their raw values.

use crate::error::{ParseError, Result};
use crate::parser::{OptionValue, ParsedOptions};
use log::debug;

/// Parameters parsed by hand in the kernel rather than via kstrtobool():
/// debugfs_kernel(), mitigations_parse_cmdline(), pti_check_boottime_disable()
/// and spectre_v2_parse_cmdline() all accept words the table must not fold.
const KSTRTOBOOL_EXEMPT: &[&str] = &["debugfs", "mitigations", "pti", "spectre_v2"];

/// Parse kernel command line text into an ordered option mapping.
///
/// A bare `name` token records the empty-string value. Repeated names
/// overwrite (the kernel honors the last occurrence). Content on any line
/// after the first is fatal; trailing blank lines are tolerated.
pub fn parse_cmdline(text: &str) -> Result<ParsedOptions> {
    let mut lines = text.lines();
    let first = match lines.next() {
        Some(line) => line,
        None => return Err(ParseError::EmptyCmdline.into()),
    };
    if lines.any(|line| !line.trim().is_empty()) {
        return Err(ParseError::MultiLineCmdline.into());
    }

    let mut opts = ParsedOptions::new();
    for token in first.split_whitespace() {
        let (name, value) = match token.split_once('=') {
            Some((name, value)) => (name, value),
            None => (token, ""),
        };
        let value = normalize_value(name, value);
        opts.insert_overwrite(name.to_string(), OptionValue::Set(value));
    }

    debug!("parsed {} cmdline parameters", opts.len());
    Ok(opts)
}

/// Fold a parameter value through the limited kstrtobool() table.
pub(crate) fn normalize_value(name: &str, value: &str) -> String {
    if KSTRTOBOOL_EXEMPT.contains(&name) {
        return value.to_string();
    }
    match value.to_ascii_lowercase().as_str() {
        "1" | "on" | "y" | "yes" | "t" | "true" => "1".to_string(),
        "0" | "off" | "n" | "no" | "f" | "false" => "0".to_string(),
        _ => value.to_string(),
    }
}
