//! Evaluation phase: walk a check tree bottom-up and attach verdicts.
//!
//! Combinator semantics:
//! - AND stops at the first failing child and adopts its reason. With no
//!   failure, one UNKNOWN child makes the group UNKNOWN; otherwise the group
//!   is OK with the head child's reason.
//! - OR stops at the first passing child and adopts its reason. With no
//!   pass, one UNKNOWN child makes the group UNKNOWN; an all-FAIL group
//!   fails with every child reason joined by `"; "` in declaration order.
//! - A version gate evaluates only the branch its threshold selects.
//!
//! Children skipped by short-circuiting keep no evaluation and never show up
//! in verbose listings. The only fatal outcome here is a numeric comparison
//! against a value that does not parse as an integer.

use crate::engine::check::{
    Check, Evaluation, Expected, GroupCheck, GroupOp, LeafCheck, LeafState, VersionGatedCheck,
};
use crate::engine::types::Verdict;
use crate::error::EngineError;

impl Check {
    /// Evaluate this node, storing and returning its result.
    pub(crate) fn evaluate(&mut self) -> Result<Evaluation, EngineError> {
        match self {
            Check::Leaf(leaf) => leaf.evaluate(),
            Check::Group(group) => group.evaluate(),
            Check::VersionGated(gate) => gate.evaluate(),
        }
    }
}

impl LeafCheck {
    fn evaluate(&mut self) -> Result<Evaluation, EngineError> {
        let eval = self.judge()?;
        self.result = Some(eval.clone());
        Ok(eval)
    }

    fn judge(&self) -> Result<Evaluation, EngineError> {
        let name = &self.name;
        let eval = match (&self.expected, &self.state) {
            // Absence satisfies a must-be-off expectation and nothing else.
            (Expected::Off, LeafState::Absent) => Evaluation::ok(format!("{name} is not found")),
            (_, LeafState::Absent) => Evaluation::unknown(format!("{name} is not found")),

            (Expected::Equals(want), LeafState::Value(got)) => {
                if strip_quotes(want) == strip_quotes(got) {
                    Evaluation::ok(format!("{name} is \"{}\"", strip_quotes(got)))
                        .with_found(got.clone())
                } else {
                    Evaluation::fail(format!(
                        "{name} is \"{}\", expected \"{}\"",
                        strip_quotes(got),
                        strip_quotes(want)
                    ))
                    .with_found(got.clone())
                }
            }
            (Expected::Equals(want), LeafState::Off) => Evaluation::fail(format!(
                "{name} is not set, expected \"{}\"",
                strip_quotes(want)
            )),

            (Expected::NotOff, LeafState::Value(got)) => {
                if is_off_value(got) {
                    Evaluation::fail(format!("{name} is off (\"{got}\")")).with_found(got.clone())
                } else if got.is_empty() {
                    Evaluation::ok(format!("{name} is present")).with_found("")
                } else {
                    Evaluation::ok(format!("{name} is not off (\"{}\")", strip_quotes(got)))
                        .with_found(got.clone())
                }
            }
            (Expected::NotOff, LeafState::Off) => Evaluation::fail(format!("{name} is not set")),

            (Expected::Off, LeafState::Value(got)) => {
                Evaluation::fail(format!("{name} is set (\"{}\")", strip_quotes(got)))
                    .with_found(got.clone())
            }
            (Expected::Off, LeafState::Off) => Evaluation::ok(format!("{name} is not set")),

            (Expected::Bound { op, threshold }, LeafState::Value(got)) => {
                let found = strip_quotes(got).parse::<i64>().map_err(|_| {
                    EngineError::NonNumericValue { name: name.clone(), value: got.clone() }
                })?;
                if op.holds(found, *threshold) {
                    Evaluation::ok(format!(
                        "{name} is {found} ({} {threshold})",
                        op.symbol()
                    ))
                    .with_found(got.clone())
                } else {
                    Evaluation::fail(format!(
                        "{name} is {found}, expected {} {threshold}",
                        op.symbol()
                    ))
                    .with_found(got.clone())
                }
            }
            (Expected::Bound { op, threshold }, LeafState::Off) => Evaluation::fail(format!(
                "{name} is not set, expected {} {threshold}",
                op.symbol()
            )),

            (Expected::VersionAtLeast(want), LeafState::Version(got)) => {
                if got >= want {
                    Evaluation::ok(format!("kernel version {got} >= {want}"))
                        .with_found(got.to_string())
                } else {
                    Evaluation::fail(format!("kernel version {got} < {want}"))
                        .with_found(got.to_string())
                }
            }

            // A state kind the expectation cannot judge means no matching
            // data was ever attached to this leaf.
            _ => Evaluation::unknown(format!("{name} has no data attached")),
        };
        Ok(eval)
    }
}

impl GroupCheck {
    fn evaluate(&mut self) -> Result<Evaluation, EngineError> {
        let eval = match self.op {
            GroupOp::And => self.evaluate_and()?,
            GroupOp::Or => self.evaluate_or()?,
        };
        self.result = Some(eval.clone());
        Ok(eval)
    }

    fn evaluate_and(&mut self) -> Result<Evaluation, EngineError> {
        let mut head: Option<Evaluation> = None;
        let mut unknown: Option<Evaluation> = None;
        for child in &mut self.children {
            let eval = child.evaluate()?;
            if eval.verdict == Verdict::Fail {
                return Ok(eval);
            }
            if eval.verdict == Verdict::Unknown && unknown.is_none() {
                unknown = Some(eval.clone());
            }
            if head.is_none() {
                head = Some(eval);
            }
        }
        // Groups are never empty, so the head evaluation is always present.
        Ok(unknown
            .or(head)
            .unwrap_or_else(|| Evaluation::unknown("no checks evaluated")))
    }

    fn evaluate_or(&mut self) -> Result<Evaluation, EngineError> {
        let mut unknown: Option<Evaluation> = None;
        let mut failures: Vec<String> = Vec::new();
        for child in &mut self.children {
            let eval = child.evaluate()?;
            match eval.verdict {
                Verdict::Ok => return Ok(eval),
                Verdict::Unknown => {
                    if unknown.is_none() {
                        unknown = Some(eval);
                    }
                }
                Verdict::Fail => failures.push(eval.reason),
            }
        }
        Ok(match unknown {
            Some(eval) => eval,
            None => Evaluation::fail(failures.join("; ")),
        })
    }
}

impl VersionGatedCheck {
    fn evaluate(&mut self) -> Result<Evaluation, EngineError> {
        let Some(detected) = self.detected else {
            return Err(EngineError::VersionNotAttached);
        };
        let branch = if detected < self.threshold { &mut self.before } else { &mut self.after };
        let eval = branch.evaluate()?;
        self.result = Some(eval.clone());
        Ok(eval)
    }
}

/// Strip one pair of surrounding double quotes, if both are present.
fn strip_quotes(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

/// Values the kernel treats as switched off.
fn is_off_value(s: &str) -> bool {
    matches!(s, "0" | "off")
}
