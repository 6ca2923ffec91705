//! JSON rendering.

use crate::engine::check::{Check, Evaluation};
use crate::engine::{Checklist, Recommendation, Verdict};
use serde::Serialize;

/// Render the checklist as a pretty-printed JSON array, one record per
/// recommendation, composite checks carrying their children nested.
pub fn format(checklist: &Checklist, with_results: bool) -> String {
    let records: Vec<JsonRecord> =
        checklist.items().iter().map(|item| JsonRecord::from_item(item, with_results)).collect();
    serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".to_string())
}

#[derive(Serialize)]
struct JsonRecord {
    option_name: String,
    #[serde(rename = "type")]
    kind: String,
    desired_val: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    verdict: Option<Verdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    check_result: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<JsonRecord>,
}

impl JsonRecord {
    fn from_item(item: &Recommendation, with_results: bool) -> Self {
        let result = item.result().filter(|_| with_results);
        Self {
            option_name: item.name().to_string(),
            kind: item.kind().to_string(),
            desired_val: item.desired(),
            decision: Some(item.decision().to_string()),
            reason: Some(item.rationale().to_string()),
            verdict: result.map(|eval| eval.verdict),
            check_result: result.map(Evaluation::render),
            children: child_records(item.check(), with_results),
        }
    }

    fn from_node(check: &Check, with_results: bool) -> Self {
        let head = check.head_leaf();
        let kind = match check {
            Check::Leaf(leaf) => leaf.source().as_str(),
            Check::Group(_) | Check::VersionGated(_) => "complex",
        };
        let result = check.result().filter(|_| with_results);
        Self {
            option_name: head.name().to_string(),
            kind: kind.to_string(),
            desired_val: head.expected().desired(),
            decision: None,
            reason: None,
            verdict: result.map(|eval| eval.verdict),
            check_result: result.map(Evaluation::render),
            children: child_records(check, with_results),
        }
    }
}

/// The child records of a composite node: evaluated children when results
/// are attached, the full structure otherwise.
fn child_records(check: &Check, with_results: bool) -> Vec<JsonRecord> {
    match check {
        Check::Leaf(_) => Vec::new(),
        Check::Group(group) => group
            .children()
            .iter()
            .filter(|child| !with_results || child.result().is_some())
            .map(|child| JsonRecord::from_node(child, with_results))
            .collect(),
        Check::VersionGated(gate) => {
            if with_results {
                gate.selected()
                    .into_iter()
                    .map(|branch| JsonRecord::from_node(branch, with_results))
                    .collect()
            } else {
                vec![
                    JsonRecord::from_node(&gate.before, with_results),
                    JsonRecord::from_node(&gate.after, with_results),
                ]
            }
        }
    }
}
