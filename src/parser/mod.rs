//! Parsed-data adapters: raw text sources in, ordered option mappings out.
//!
//! - `kconfig` - the `CONFIG_X=value` / `# CONFIG_X is not set` grammar
//! - `cmdline` - the single-line kernel command line token grammar
//! - `detect` - architecture / kernel version / compiler marker scanning
//!
//! Adapters are pure functions over text and know nothing about checks.

pub mod cmdline;
pub mod detect;
pub mod kconfig;

pub use cmdline::parse_cmdline;
pub use detect::{Compiler, Toolchain, detect_arch, detect_compiler, detect_kernel_version};
pub use kconfig::parse_kconfig;

use crate::error::{ParseError, Result};
use flate2::read::GzDecoder;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

/// A single option's recorded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    /// Present with a raw value (possibly empty for bare cmdline flags)
    Set(String),
    /// Present as an explicitly disabled `# CONFIG_X is not set` record
    Off,
}

impl OptionValue {
    /// Render the value for diagnostics.
    pub fn render(&self) -> &str {
        match self {
            Self::Set(value) => value,
            Self::Off => "is not set",
        }
    }
}

/// An ordered name→value mapping for one data source.
///
/// Insertion order is the file discovery order; it feeds the unknown-options
/// diagnostic and nothing else. Lookups go through a side index.
#[derive(Debug, Clone, Default)]
pub struct ParsedOptions {
    entries: Vec<(String, OptionValue)>,
    index: HashMap<String, usize>,
}

impl ParsedOptions {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct options discovered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was discovered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up one option by its full name.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.index.get(name).map(|&at| &self.entries[at].1)
    }

    /// Iterate options in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Insert an option that must not already exist (Kconfig rule).
    pub(crate) fn insert_unique(&mut self, name: String, value: OptionValue) -> Result<()> {
        if self.index.contains_key(&name) {
            return Err(ParseError::DuplicateOption(name).into());
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
        Ok(())
    }

    /// Insert an option, overwriting the value of an earlier occurrence
    /// while keeping its original position (cmdline rule: last wins).
    pub(crate) fn insert_overwrite(&mut self, name: String, value: OptionValue) {
        match self.index.get(&name) {
            Some(&at) => self.entries[at].1 = value,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }
}

/// Read a source file fully into memory, decompressing transparently when
/// the gzip magic is present. The handle is released before parsing starts.
pub fn read_source(path: &Path) -> Result<String> {
    let raw = fs::read(path)?;
    if raw.starts_with(&[0x1f, 0x8b]) {
        let mut text = String::new();
        GzDecoder::new(raw.as_slice()).read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    #[test]
    fn unique_insert_rejects_duplicates() {
        let mut opts = ParsedOptions::new();
        opts.insert_unique("CONFIG_BUG".to_string(), OptionValue::Set("y".to_string()))
            .unwrap();
        let err = opts
            .insert_unique("CONFIG_BUG".to_string(), OptionValue::Off)
            .unwrap_err();
        match err {
            AuditError::Parse(ParseError::DuplicateOption(name)) => {
                assert_eq!(name, "CONFIG_BUG");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn overwrite_keeps_first_position() {
        let mut opts = ParsedOptions::new();
        opts.insert_overwrite("pti".to_string(), OptionValue::Set("on".to_string()));
        opts.insert_overwrite("nosmt".to_string(), OptionValue::Set(String::new()));
        opts.insert_overwrite("pti".to_string(), OptionValue::Set("off".to_string()));

        let names: Vec<&str> = opts.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["pti", "nosmt"]);
        assert_eq!(opts.get("pti"), Some(&OptionValue::Set("off".to_string())));
        assert_eq!(opts.len(), 2);
    }

    #[test]
    fn off_records_render_the_marker() {
        assert_eq!(OptionValue::Off.render(), "is not set");
        assert_eq!(OptionValue::Set("0x1000".to_string()).render(), "0x1000");
    }

    #[test]
    fn read_source_handles_plain_and_gzipped_files() {
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("config");
        fs::write(&plain, "CONFIG_BUG=y\n").unwrap();
        assert_eq!(read_source(&plain).unwrap(), "CONFIG_BUG=y\n");

        let gzipped = dir.path().join("config.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"CONFIG_BUG=y\n").unwrap();
        fs::write(&gzipped, encoder.finish().unwrap()).unwrap();
        assert_eq!(read_source(&gzipped).unwrap(), "CONFIG_BUG=y\n");
    }
}
