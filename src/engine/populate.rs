//! Population phase: attach parsed data to check trees.
//!
//! Population is a pure attach step. It records what each leaf's source
//! knows about its option and hands the detected kernel version to version
//! leaves and version gates; no verdict is computed here. The refinement
//! registry also lives here: named hooks that rewrite a check's expected
//! value from already-populated data, run once between population and
//! evaluation.

use crate::engine::check::{BoundOp, Check, Expected, LeafState, Recommendation};
use crate::engine::types::{DataSource, KernelVersion};
use crate::error::EngineError;
use crate::parser::{OptionValue, ParsedOptions};

impl Check {
    /// Attach option data from one source to every matching leaf.
    pub(crate) fn populate_options(&mut self, source: DataSource, opts: &ParsedOptions) {
        match self {
            Check::Leaf(leaf) => {
                if leaf.source != source {
                    return;
                }
                match opts.get(&leaf.name) {
                    Some(OptionValue::Set(value)) => leaf.state = LeafState::Value(value.clone()),
                    Some(OptionValue::Off) => leaf.state = LeafState::Off,
                    None => {}
                }
            }
            Check::Group(group) => {
                for child in &mut group.children {
                    child.populate_options(source, opts);
                }
            }
            Check::VersionGated(gate) => {
                gate.before.populate_options(source, opts);
                gate.after.populate_options(source, opts);
            }
        }
    }

    /// Attach the detected kernel version to version leaves and gates.
    ///
    /// Both gate branches are populated; evaluation alone selects one.
    pub(crate) fn populate_version(&mut self, version: KernelVersion) {
        match self {
            Check::Leaf(leaf) => {
                if leaf.source == DataSource::Version {
                    leaf.state = LeafState::Version(version);
                }
            }
            Check::Group(group) => {
                for child in &mut group.children {
                    child.populate_version(version);
                }
            }
            Check::VersionGated(gate) => {
                gate.detected = Some(version);
                gate.before.populate_version(version);
                gate.after.populate_version(version);
            }
        }
    }
}

/// A named post-population hook that rewrites the expected value of the
/// check it targets, using data discovered in the parsed Kconfig options.
pub struct Refinement {
    /// Full head-leaf name of the recommendation the hook targets
    pub target: &'static str,
    hook: fn(&ParsedOptions) -> Result<Option<Expected>, EngineError>,
}

impl Refinement {
    /// Run the hook; `None` means the companion data was absent and the
    /// target keeps its static expectation.
    fn resolve(&self, opts: &ParsedOptions) -> Result<Option<Expected>, EngineError> {
        (self.hook)(opts)
    }
}

/// The registered refinement hooks.
pub fn refinements() -> Vec<Refinement> {
    vec![Refinement { target: "CONFIG_ARCH_MMAP_RND_BITS", hook: mmap_rnd_bits_max }]
}

/// The mmap randomization entropy recommendation should demand the widest
/// range the platform supports, and only the config itself knows that
/// maximum: lift the threshold to `CONFIG_ARCH_MMAP_RND_BITS_MAX`.
fn mmap_rnd_bits_max(opts: &ParsedOptions) -> Result<Option<Expected>, EngineError> {
    let Some(OptionValue::Set(raw)) = opts.get("CONFIG_ARCH_MMAP_RND_BITS_MAX") else {
        return Ok(None);
    };
    let threshold = raw.parse::<i64>().map_err(|_| EngineError::NonNumericValue {
        name: "CONFIG_ARCH_MMAP_RND_BITS_MAX".to_string(),
        value: raw.clone(),
    })?;
    Ok(Some(Expected::Bound { op: BoundOp::AtLeast, threshold }))
}

/// Run every registered hook against the checklist items.
///
/// A hook only touches top-level recommendations whose head leaf carries the
/// target name; a target that is not a plain numeric leaf is a fatal
/// inconsistency in the rule table.
pub(crate) fn apply_refinements(
    items: &mut [Recommendation],
    opts: &ParsedOptions,
) -> Result<(), EngineError> {
    for refinement in refinements() {
        let Some(expected) = refinement.resolve(opts)? else {
            continue;
        };
        override_expected(items, refinement.target, expected)?;
    }
    Ok(())
}

fn override_expected(
    items: &mut [Recommendation],
    target: &str,
    expected: Expected,
) -> Result<(), EngineError> {
    for item in items.iter_mut() {
        if item.name() != target {
            continue;
        }
        return match &mut item.check {
            Check::Leaf(leaf) if matches!(leaf.expected, Expected::Bound { .. }) => {
                leaf.expected = expected;
                Ok(())
            }
            _ => Err(EngineError::RefinementTarget(target.to_string())),
        };
    }
    // The target is simply not registered for this architecture.
    Ok(())
}
