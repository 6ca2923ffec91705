//! The check-evaluation engine.
//!
//! Everything between parsed input and rendered report:
//! - `types` - verdicts, decision labels, architectures, kernel versions
//! - `check` - the recommendation tree model (leaf / group / version gate)
//! - `populate` - attaching parsed data and the refinement hook registry
//! - `eval` - verdict computation with short-circuit combinator semantics
//! - `checklist` - the per-run, per-architecture recommendation sequence
//!
//! The engine never reads files and never mutates parsed data; adapters
//! hand it mappings, it hands the report layer evaluated trees.

pub mod check;
pub mod checklist;
mod eval;
pub mod populate;
pub mod types;

pub use check::{
    BoundOp, Check, Evaluation, Expected, GroupCheck, GroupOp, LeafCheck, Recommendation,
    VersionGatedCheck,
};
pub use checklist::{Checklist, Tally};
pub use populate::{Refinement, refinements};
pub use types::{Arch, DataSource, Decision, KernelVersion, Rationale, Verdict};
