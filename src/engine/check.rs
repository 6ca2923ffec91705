//! The check model: one hardening recommendation as a tree of checks.
//!
//! A tree is built from three node shapes:
//! - `LeafCheck` - one option in one data source, compared one way
//! - `GroupCheck` - an ordered AND/OR combination of sub-checks
//! - `VersionGatedCheck` - picks one of two branches by kernel version
//!
//! Trees are constructed once per run from the rule database, populated with
//! parsed data, evaluated, and then only read by the report layer.

use crate::engine::types::{DataSource, Decision, KernelVersion, Rationale, Verdict};
use std::fmt;

/// What a leaf check expects of its option.
///
/// Folds the comparison mode and the expected value into one variant set so
/// a mode can never exist without the value it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    /// The raw value must match exactly (after normalizing surrounding quotes)
    Equals(String),
    /// The option must be set to any non-off value
    NotOff,
    /// The option must be off: explicitly disabled or absent
    Off,
    /// The value must satisfy a numeric relational comparison
    Bound {
        /// Relational operator applied as `found <op> threshold`
        op: BoundOp,
        /// Threshold the found value is compared against
        threshold: i64,
    },
    /// The detected kernel version must be at least this
    VersionAtLeast(KernelVersion),
}

impl Expected {
    /// Render the "desired val" form shown in reports.
    pub fn desired(&self) -> String {
        match self {
            Self::Equals(value) => value.clone(),
            Self::NotOff => "is not off".to_string(),
            Self::Off => "is not set".to_string(),
            Self::Bound { op, threshold } => format!("{} {}", op.symbol(), threshold),
            Self::VersionAtLeast(version) => format!("{}+", version),
        }
    }
}

/// Relational operator for numeric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundOp {
    /// Found value must be greater than or equal to the threshold
    AtLeast,
    /// Found value must be less than or equal to the threshold
    AtMost,
}

impl BoundOp {
    /// The operator's report symbol.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::AtLeast => ">=",
            Self::AtMost => "<=",
        }
    }

    /// Apply the operator as `found <op> threshold`.
    pub fn holds(&self, found: i64, threshold: i64) -> bool {
        match self {
            Self::AtLeast => found >= threshold,
            Self::AtMost => found <= threshold,
        }
    }
}

/// What population discovered for one leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum LeafState {
    /// Not found in the supplied data, or the source was never supplied
    #[default]
    Absent,
    /// Found with a raw value (possibly empty for bare cmdline flags)
    Value(String),
    /// Found as an explicitly disabled Kconfig record
    Off,
    /// Detected kernel version attached to a version-source leaf
    Version(KernelVersion),
}

/// Result attached to a check node by evaluation.
///
/// Nodes skipped by short-circuiting or version gating never carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// The verdict for this node
    pub verdict: Verdict,
    /// Why, always citing the option name and the comparison outcome
    pub reason: String,
    /// The raw value population discovered, when there was one
    pub found: Option<String>,
}

impl Evaluation {
    pub(crate) fn ok(reason: impl Into<String>) -> Self {
        Self { verdict: Verdict::Ok, reason: reason.into(), found: None }
    }

    pub(crate) fn fail(reason: impl Into<String>) -> Self {
        Self { verdict: Verdict::Fail, reason: reason.into(), found: None }
    }

    pub(crate) fn unknown(reason: impl Into<String>) -> Self {
        Self { verdict: Verdict::Unknown, reason: reason.into(), found: None }
    }

    pub(crate) fn with_found(mut self, found: impl Into<String>) -> Self {
        self.found = Some(found.into());
        self
    }

    /// Render the "check result" form shown in reports, e.g. `FAIL: CONFIG_BUG is not set`.
    pub fn render(&self) -> String {
        format!("{}: {}", self.verdict, self.reason)
    }
}

/// A rule tied to exactly one option in one data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafCheck {
    pub(crate) name: String,
    pub(crate) source: DataSource,
    pub(crate) expected: Expected,
    pub(crate) state: LeafState,
    pub(crate) result: Option<Evaluation>,
}

impl LeafCheck {
    /// A Kconfig leaf; `name` is given without the `CONFIG_` prefix.
    pub fn kconfig(name: &str, expected: Expected) -> Self {
        Self {
            name: format!("CONFIG_{}", name),
            source: DataSource::Kconfig,
            expected,
            state: LeafState::default(),
            result: None,
        }
    }

    /// A kernel command line leaf; `name` is the raw parameter name.
    pub fn cmdline(name: &str, expected: Expected) -> Self {
        Self {
            name: name.to_string(),
            source: DataSource::Cmdline,
            expected,
            state: LeafState::default(),
            result: None,
        }
    }

    /// A leaf satisfied from the given kernel version onward.
    pub fn version(min: KernelVersion) -> Self {
        Self {
            name: "kernel version".to_string(),
            source: DataSource::Version,
            expected: Expected::VersionAtLeast(min),
            state: LeafState::default(),
            result: None,
        }
    }

    /// Full option name as it appears in reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The data source this leaf reads from.
    pub fn source(&self) -> DataSource {
        self.source
    }

    /// What this leaf expects.
    pub fn expected(&self) -> &Expected {
        &self.expected
    }
}

/// How a group combines its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOp {
    /// Every child must pass
    And,
    /// At least one child must pass
    Or,
}

impl GroupOp {
    /// Get the report label for this combinator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for GroupOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An ordered AND/OR combination of sub-checks.
///
/// Non-commutative for reporting: the adopted reason comes from the first
/// failing child (AND) or the first passing child (OR).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCheck {
    pub(crate) op: GroupOp,
    pub(crate) children: Vec<Check>,
    pub(crate) result: Option<Evaluation>,
}

impl GroupCheck {
    /// The combinator of this group.
    pub fn op(&self) -> GroupOp {
        self.op
    }

    /// The children, in declaration order.
    pub fn children(&self) -> &[Check] {
        &self.children
    }
}

/// A rule that selects one of two branches by detected kernel version.
///
/// `before` applies to kernels older than `threshold`, `after` to the
/// threshold and everything newer. Only the selected branch is evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionGatedCheck {
    pub(crate) threshold: KernelVersion,
    pub(crate) before: Check,
    pub(crate) after: Check,
    pub(crate) detected: Option<KernelVersion>,
    pub(crate) result: Option<Evaluation>,
}

impl VersionGatedCheck {
    /// The version splitting the two branches.
    pub fn threshold(&self) -> KernelVersion {
        self.threshold
    }

    /// The branch evaluation selected, if evaluation ran.
    pub fn selected(&self) -> Option<&Check> {
        let detected = self.detected?;
        if detected < self.threshold { Some(&self.before) } else { Some(&self.after) }
    }
}

/// One node of a recommendation's check tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// A single option comparison
    Leaf(LeafCheck),
    /// An AND/OR combination
    Group(GroupCheck),
    /// A version-selected alternative
    VersionGated(Box<VersionGatedCheck>),
}

impl Check {
    /// Combine checks so that every one of them must pass.
    ///
    /// Panics if `children` is empty; groups are built from the static rule
    /// database, where an empty group is a bug in the table itself.
    pub fn and(children: Vec<Check>) -> Self {
        assert!(!children.is_empty(), "AND group requires at least one child");
        Self::Group(GroupCheck { op: GroupOp::And, children, result: None })
    }

    /// Combine checks so that at least one of them must pass.
    ///
    /// Panics if `children` is empty, as for [`Check::and`].
    pub fn or(children: Vec<Check>) -> Self {
        assert!(!children.is_empty(), "OR group requires at least one child");
        Self::Group(GroupCheck { op: GroupOp::Or, children, result: None })
    }

    /// Gate two alternatives on the detected kernel version.
    pub fn version_gated(threshold: KernelVersion, before: Check, after: Check) -> Self {
        Self::VersionGated(Box::new(VersionGatedCheck {
            threshold,
            before,
            after,
            detected: None,
            result: None,
        }))
    }

    /// The evaluation attached to this node, if evaluation reached it.
    pub fn result(&self) -> Option<&Evaluation> {
        match self {
            Self::Leaf(leaf) => leaf.result.as_ref(),
            Self::Group(group) => group.result.as_ref(),
            Self::VersionGated(gate) => gate.result.as_ref(),
        }
    }

    /// The head leaf whose name and expectation label the whole tree.
    ///
    /// For groups this is the leftmost leaf; for version gates the leftmost
    /// leaf of the `after` branch, so row naming is stable no matter which
    /// branch evaluation selects.
    pub fn head_leaf(&self) -> &LeafCheck {
        match self {
            Self::Leaf(leaf) => leaf,
            Self::Group(group) => group.children[0].head_leaf(),
            Self::VersionGated(gate) => gate.after.head_leaf(),
        }
    }

    /// Collect the names of every leaf bound to `source`, both gate branches
    /// included. Backs the unknown-options diagnostic.
    pub(crate) fn collect_names<'a>(
        &'a self,
        source: DataSource,
        out: &mut std::collections::HashSet<&'a str>,
    ) {
        match self {
            Self::Leaf(leaf) => {
                if leaf.source == source {
                    out.insert(leaf.name.as_str());
                }
            }
            Self::Group(group) => {
                for child in &group.children {
                    child.collect_names(source, out);
                }
            }
            Self::VersionGated(gate) => {
                gate.before.collect_names(source, out);
                gate.after.collect_names(source, out);
            }
        }
    }
}

impl From<LeafCheck> for Check {
    fn from(leaf: LeafCheck) -> Self {
        Self::Leaf(leaf)
    }
}

/// One top-level checklist entry: a check tree plus its static labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub(crate) rationale: Rationale,
    pub(crate) decision: Decision,
    pub(crate) check: Check,
}

impl Recommendation {
    /// Register a recommendation.
    pub fn new(rationale: Rationale, decision: Decision, check: impl Into<Check>) -> Self {
        Self { rationale, decision, check: check.into() }
    }

    /// The hardening category this entry belongs to.
    pub fn rationale(&self) -> Rationale {
        self.rationale
    }

    /// The decision strength this entry was registered with.
    pub fn decision(&self) -> Decision {
        self.decision
    }

    /// The check tree.
    pub fn check(&self) -> &Check {
        &self.check
    }

    /// The head leaf labeling this entry in reports.
    pub fn head(&self) -> &LeafCheck {
        self.check.head_leaf()
    }

    /// Option name shown in the report row.
    pub fn name(&self) -> &str {
        self.head().name()
    }

    /// The "type" column: the head source for plain leaves, `complex` for trees.
    pub fn kind(&self) -> &'static str {
        match &self.check {
            Check::Leaf(leaf) => leaf.source.as_str(),
            Check::Group(_) | Check::VersionGated(_) => "complex",
        }
    }

    /// The "desired val" column, taken from the head leaf.
    pub fn desired(&self) -> String {
        self.head().expected().desired()
    }

    /// The evaluation of the whole tree, if evaluation ran.
    pub fn result(&self) -> Option<&Evaluation> {
        self.check.result()
    }
}
