//! The checklist: the ordered recommendations registered for one run.
//!
//! Built once from the rule database for a chosen microarchitecture, then
//! populated, refined, evaluated, and finally read by the report layer.
//! Order is preserved end-to-end.

use crate::engine::check::Recommendation;
use crate::engine::populate::apply_refinements;
use crate::engine::types::{Arch, DataSource, KernelVersion, Verdict};
use crate::error::EngineError;
use crate::parser::{OptionValue, ParsedOptions};
use log::debug;
use std::collections::HashSet;

/// Aggregate verdict counts over a fully evaluated checklist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Recommendations satisfied
    pub ok: usize,
    /// Recommendations contradicted
    pub fail: usize,
    /// Recommendations whose options never appeared in the data
    pub unknown: usize,
}

/// The ordered recommendation list for one microarchitecture.
#[derive(Debug, Clone)]
pub struct Checklist {
    arch: Arch,
    items: Vec<Recommendation>,
}

impl Checklist {
    /// Wrap an already-built recommendation table.
    pub fn new(arch: Arch, items: Vec<Recommendation>) -> Self {
        Self { arch, items }
    }

    /// The microarchitecture this checklist was built for.
    pub fn arch(&self) -> Arch {
        self.arch
    }

    /// The recommendations, in registration order.
    pub fn items(&self) -> &[Recommendation] {
        &self.items
    }

    /// Number of registered recommendations.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the checklist holds no recommendations.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Attach parsed Kconfig options to every kconfig-source leaf.
    pub fn populate_kconfig(&mut self, opts: &ParsedOptions) {
        debug!("populating {} recommendations with Kconfig data", self.items.len());
        for item in &mut self.items {
            item.check.populate_options(DataSource::Kconfig, opts);
        }
    }

    /// Attach parsed cmdline parameters to every cmdline-source leaf.
    pub fn populate_cmdline(&mut self, opts: &ParsedOptions) {
        debug!("populating {} recommendations with cmdline data", self.items.len());
        for item in &mut self.items {
            item.check.populate_options(DataSource::Cmdline, opts);
        }
    }

    /// Attach the detected kernel version to version leaves and gates.
    pub fn populate_version(&mut self, version: KernelVersion) {
        for item in &mut self.items {
            item.check.populate_version(version);
        }
    }

    /// Run the registered refinement hooks once, after population.
    pub fn refine(&mut self, kconfig: &ParsedOptions) -> Result<(), EngineError> {
        apply_refinements(&mut self.items, kconfig)
    }

    /// Evaluate every recommendation, attaching verdicts to the trees.
    pub fn evaluate(&mut self) -> Result<(), EngineError> {
        for item in &mut self.items {
            item.check.evaluate()?;
        }
        Ok(())
    }

    /// Count top-level verdicts. Only meaningful after [`Self::evaluate`].
    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        for item in &self.items {
            match item.result().map(|eval| eval.verdict) {
                Some(Verdict::Ok) => tally.ok += 1,
                Some(Verdict::Fail) => tally.fail += 1,
                Some(Verdict::Unknown) => tally.unknown += 1,
                None => {}
            }
        }
        tally
    }

    /// Parsed options of `source` that no registered check references,
    /// in discovery order. Feeds the diagnostic listing only.
    pub fn unknown_options<'a>(
        &self,
        source: DataSource,
        opts: &'a ParsedOptions,
    ) -> Vec<(&'a str, &'a OptionValue)> {
        let mut known: HashSet<&str> = HashSet::new();
        for item in &self.items {
            item.check.collect_names(source, &mut known);
        }
        opts.iter().filter(|(name, _)| !known.contains(name)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::check::{Check, Expected, LeafCheck};
    use crate::engine::types::{Decision, Rationale};
    use crate::parser::parse_kconfig;

    fn sample() -> Checklist {
        Checklist::new(Arch::X86_64, vec![
            Recommendation::new(
                Rationale::SelfProtection,
                Decision::Defconfig,
                LeafCheck::kconfig("BUG", Expected::Equals("y".to_string())),
            ),
            Recommendation::new(
                Rationale::CutAttackSurface,
                Decision::Kspp,
                LeafCheck::kconfig("COMPAT_BRK", Expected::Off),
            ),
            Recommendation::new(
                Rationale::SelfProtection,
                Decision::Kspp,
                Check::or(vec![
                    LeafCheck::kconfig("SLAB_FREELIST_RANDOM", Expected::Equals("y".to_string()))
                        .into(),
                    LeafCheck::version(crate::engine::types::KernelVersion::new(9, 0)).into(),
                ]),
            ),
        ])
    }

    #[test]
    fn full_pass_attaches_verdicts_and_tallies_them() {
        let opts = parse_kconfig("CONFIG_BUG=y\n# CONFIG_COMPAT_BRK is not set\n").unwrap();
        let mut checklist = sample();
        checklist.populate_kconfig(&opts);
        checklist.populate_version(KernelVersion::new(5, 15));
        checklist.refine(&opts).unwrap();
        checklist.evaluate().unwrap();

        let tally = checklist.tally();
        assert_eq!(tally, Tally { ok: 2, fail: 0, unknown: 1 });
        assert_eq!(
            checklist.items()[2].result().map(|eval| eval.verdict),
            Some(Verdict::Unknown)
        );
    }

    #[test]
    fn unevaluated_checklist_tallies_nothing() {
        assert_eq!(sample().tally(), Tally::default());
    }

    #[test]
    fn unreferenced_options_are_listed_in_discovery_order() {
        let opts = parse_kconfig(
            "CONFIG_MYDRIVER=m\nCONFIG_BUG=y\n# CONFIG_EXPERIMENT is not set\n",
        )
        .unwrap();
        let checklist = sample();
        let unknown = checklist.unknown_options(DataSource::Kconfig, &opts);
        let names: Vec<&str> = unknown.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["CONFIG_MYDRIVER", "CONFIG_EXPERIMENT"]);
    }
}
