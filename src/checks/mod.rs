//! The hardening recommendation database.
//!
//! Registration lists in the spirit of the KSPP/grsecurity/CLIP OS guidance,
//! parameterized by microarchitecture. The tables are data handed to the
//! engine; no evaluation logic lives here.

pub mod cmdline;
pub mod kconfig;

pub use cmdline::cmdline_recommendations;
pub use kconfig::kconfig_recommendations;

use crate::engine::check::{BoundOp, Check, Expected, LeafCheck};
use crate::engine::{Arch, Checklist, KernelVersion};

/// Build the checklist for one architecture.
///
/// Cmdline recommendations join only when a command line is actually going
/// to be checked; `print` and `generate` ask for the full set.
pub fn build_checklist(arch: Arch, with_cmdline: bool) -> Checklist {
    let mut items = kconfig_recommendations(arch);
    if with_cmdline {
        items.extend(cmdline_recommendations(arch));
    }
    Checklist::new(arch, items)
}

// Table-building shorthand shared by the registration lists.

pub(crate) fn y() -> Expected {
    Expected::Equals("y".to_string())
}

pub(crate) fn eq(value: &str) -> Expected {
    Expected::Equals(value.to_string())
}

pub(crate) fn off() -> Expected {
    Expected::Off
}

pub(crate) fn not_off() -> Expected {
    Expected::NotOff
}

pub(crate) fn at_least(threshold: i64) -> Expected {
    Expected::Bound { op: BoundOp::AtLeast, threshold }
}

pub(crate) fn k(name: &str, expected: Expected) -> Check {
    LeafCheck::kconfig(name, expected).into()
}

pub(crate) fn c(name: &str, expected: Expected) -> Check {
    LeafCheck::cmdline(name, expected).into()
}

pub(crate) fn ver(major: u32, minor: u32) -> Check {
    LeafCheck::version(KernelVersion::new(major, minor)).into()
}
