//! Report rendering for checklists.
//!
//! Both renderers read evaluation results the engine already attached;
//! nothing here re-derives a verdict.

pub mod json;
pub mod table;

use clap::ValueEnum;

/// How a checklist report is rendered and filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportMode {
    /// Table plus one indented row per evaluated child of composite checks
    Verbose,
    /// One machine-readable JSON document on stdout
    Json,
    /// Only rows with an OK verdict
    #[value(name = "show_ok")]
    ShowOk,
    /// Only rows with a FAIL or UNKNOWN verdict
    #[value(name = "show_fail")]
    ShowFail,
}

impl ReportMode {
    /// Whether this mode suppresses table rows by verdict.
    pub fn is_filter(&self) -> bool {
        matches!(self, Self::ShowOk | Self::ShowFail)
    }
}
