//! Fixed-width table rendering.

use crate::engine::check::{Check, Evaluation};
use crate::engine::{Checklist, Tally, Verdict};
use crate::report::ReportMode;
use colored::Colorize;

/// Render the checklist as a fixed-width table.
///
/// `with_results` appends the check-result column; without it the table is
/// the plain recommendation listing used by `print`. In verbose mode every
/// composite row is followed by indented rows for its children: evaluated
/// children only when results are attached, the full structure otherwise.
pub fn format(checklist: &Checklist, mode: Option<ReportMode>, with_results: bool) -> String {
    let verbose = mode == Some(ReportMode::Verbose);
    let mut out = String::new();

    let mut header = format!(
        "{:^40}|{:^7}|{:^12}|{:^10}|{:^18}",
        "option name", "type", "desired val", "decision", "reason"
    );
    if with_results {
        header.push_str(&format!("|{:^14}", "check result"));
    }
    out.push_str(&header);
    out.push('\n');
    out.push_str(&"=".repeat(header.len()));
    out.push('\n');

    for item in checklist.items() {
        if !included(mode, item.result()) {
            continue;
        }
        out.push_str(&format!(
            "{:^40}|{:^7}|{:^12}|{:^10}|{:^18}",
            item.name(),
            item.kind(),
            item.desired(),
            item.decision().as_str(),
            item.rationale().as_str()
        ));
        push_result(&mut out, item.result(), with_results);
        if verbose {
            push_children(&mut out, item.check(), 1, with_results);
        }
    }

    out
}

/// Render the aggregate verdict footer, annotating the counts a filtering
/// mode suppressed from the table body.
pub fn footer(tally: &Tally, mode: Option<ReportMode>) -> String {
    let ok_note =
        if mode == Some(ReportMode::ShowFail) { " (suppressed in output)" } else { "" };
    let fail_note =
        if mode == Some(ReportMode::ShowOk) { " (suppressed in output)" } else { "" };
    format!(
        "[+] Config check is finished: 'OK' - {}{} / 'FAIL' - {}{}",
        tally.ok, ok_note, tally.fail, fail_note
    )
}

fn included(mode: Option<ReportMode>, result: Option<&Evaluation>) -> bool {
    match (mode, result) {
        (Some(ReportMode::ShowOk), Some(eval)) => eval.verdict == Verdict::Ok,
        (Some(ReportMode::ShowFail), Some(eval)) => eval.verdict != Verdict::Ok,
        _ => true,
    }
}

/// Append the result cell and terminate the row.
fn push_result(out: &mut String, result: Option<&Evaluation>, with_results: bool) {
    if with_results {
        match result {
            Some(eval) => out.push_str(&format!("| {}", result_cell(eval))),
            None => out.push_str("| "),
        }
    }
    out.push('\n');
}

fn result_cell(eval: &Evaluation) -> String {
    let verdict = match eval.verdict {
        Verdict::Ok => eval.verdict.as_str().green(),
        Verdict::Fail => eval.verdict.as_str().red(),
        Verdict::Unknown => eval.verdict.as_str().yellow(),
    };
    format!("{}: {}", verdict, eval.reason)
}

/// Append the child rows beneath a composite node.
fn push_children(out: &mut String, check: &Check, depth: usize, with_results: bool) {
    match check {
        Check::Leaf(_) => {}
        Check::Group(group) => {
            for child in group.children() {
                if with_results && child.result().is_none() {
                    continue;
                }
                push_node(out, child, depth, with_results);
            }
        }
        Check::VersionGated(gate) => {
            if with_results {
                if let Some(branch) = gate.selected() {
                    push_node(out, branch, depth, with_results);
                }
            } else {
                push_child_row(
                    out,
                    depth,
                    &format!("<<< before {} >>>", gate.threshold()),
                    "",
                    "",
                    None,
                    with_results,
                );
                push_node(out, &gate.before, depth + 1, with_results);
                push_child_row(
                    out,
                    depth,
                    &format!("<<< since {} >>>", gate.threshold()),
                    "",
                    "",
                    None,
                    with_results,
                );
                push_node(out, &gate.after, depth + 1, with_results);
            }
        }
    }
}

fn push_node(out: &mut String, check: &Check, depth: usize, with_results: bool) {
    match check {
        Check::Leaf(leaf) => {
            push_child_row(
                out,
                depth,
                leaf.name(),
                leaf.source().as_str(),
                &leaf.expected().desired(),
                leaf.result.as_ref(),
                with_results,
            );
        }
        Check::Group(group) => {
            push_child_row(
                out,
                depth,
                &format!("<<< {} >>>", group.op()),
                "",
                "",
                group.result.as_ref(),
                with_results,
            );
            push_children(out, check, depth + 1, with_results);
        }
        Check::VersionGated(gate) => {
            push_child_row(
                out,
                depth,
                &format!("<<< version gate {} >>>", gate.threshold()),
                "",
                "",
                gate.result.as_ref(),
                with_results,
            );
            push_children(out, check, depth + 1, with_results);
        }
    }
}

fn push_child_row(
    out: &mut String,
    depth: usize,
    label: &str,
    kind: &str,
    desired: &str,
    result: Option<&Evaluation>,
    with_results: bool,
) {
    let label = format!("{}{}", "    ".repeat(depth), label);
    out.push_str(&format!("{:<40}|{:^7}|{:^12}|{:^10}|{:^18}", label, kind, desired, "", ""));
    push_result(out, result, with_results);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::check::{Expected, LeafCheck};
    use crate::engine::{Arch, Decision, KernelVersion, Rationale, Recommendation};
    use crate::parser::parse_kconfig;

    fn y() -> Expected {
        Expected::Equals("y".to_string())
    }

    fn evaluated() -> Checklist {
        colored::control::set_override(false);
        let mut checklist = Checklist::new(
            Arch::X86_64,
            vec![
                Recommendation::new(
                    Rationale::SelfProtection,
                    Decision::Defconfig,
                    LeafCheck::kconfig("STACKPROTECTOR_STRONG", y()),
                ),
                Recommendation::new(
                    Rationale::SelfProtection,
                    Decision::Kspp,
                    LeafCheck::kconfig("SLAB_FREELIST_RANDOM", y()),
                ),
                Recommendation::new(
                    Rationale::SelfProtection,
                    Decision::Kspp,
                    Check::or(vec![
                        LeafCheck::kconfig("RANDSTRUCT_FULL", y()).into(),
                        LeafCheck::kconfig("GCC_PLUGIN_RANDSTRUCT", y()).into(),
                    ]),
                ),
            ],
        );
        let opts =
            parse_kconfig("CONFIG_STACKPROTECTOR_STRONG=y\nCONFIG_RANDSTRUCT_FULL=y\n").unwrap();
        checklist.populate_kconfig(&opts);
        checklist.evaluate().unwrap();
        checklist
    }

    #[test]
    fn header_and_separator_line_up() {
        let table = format(&evaluated(), None, true);
        let mut lines = table.lines();
        let header = lines.next().unwrap();
        let separator = lines.next().unwrap();
        assert!(header.contains("option name"));
        assert!(header.contains("check result"));
        assert_eq!(separator.len(), header.len());
        assert!(separator.chars().all(|c| c == '='));
    }

    #[test]
    fn rows_carry_verdict_and_reason() {
        let table = format(&evaluated(), None, true);
        assert!(table.contains("CONFIG_STACKPROTECTOR_STRONG"));
        assert!(table.contains("OK: CONFIG_STACKPROTECTOR_STRONG is \"y\""));
        assert!(table.contains("UNKNOWN: CONFIG_SLAB_FREELIST_RANDOM is not found"));
    }

    #[test]
    fn filtering_modes_drop_rows_but_not_the_footer_counts() {
        let checklist = evaluated();

        let table = format(&checklist, Some(ReportMode::ShowOk), true);
        assert!(table.contains("CONFIG_STACKPROTECTOR_STRONG"));
        assert!(!table.contains("CONFIG_SLAB_FREELIST_RANDOM"));

        let table = format(&checklist, Some(ReportMode::ShowFail), true);
        assert!(!table.contains("CONFIG_STACKPROTECTOR_STRONG"));
        assert!(table.contains("CONFIG_SLAB_FREELIST_RANDOM"), "UNKNOWN rows count as not-OK");

        let line = footer(&checklist.tally(), Some(ReportMode::ShowOk));
        assert_eq!(
            line,
            "[+] Config check is finished: 'OK' - 2 / 'FAIL' - 0 (suppressed in output)"
        );
    }

    #[test]
    fn verbose_lists_only_evaluated_children() {
        let table = format(&evaluated(), Some(ReportMode::Verbose), true);
        assert!(table.contains("    CONFIG_RANDSTRUCT_FULL"));
        assert!(
            !table.contains("CONFIG_GCC_PLUGIN_RANDSTRUCT"),
            "short-circuited children must not appear"
        );
    }

    #[test]
    fn structure_view_shows_both_gate_branches() {
        let checklist = Checklist::new(
            Arch::X86_64,
            vec![Recommendation::new(
                Rationale::SelfProtection,
                Decision::Kspp,
                Check::version_gated(
                    KernelVersion::new(5, 9),
                    LeafCheck::kconfig("GCC_PLUGIN_STRUCTLEAK_BYREF_ALL", y()).into(),
                    LeafCheck::kconfig("INIT_STACK_ALL_ZERO", y()).into(),
                ),
            )],
        );
        let table = format(&checklist, Some(ReportMode::Verbose), false);
        assert!(table.contains("<<< before 5.9 >>>"));
        assert!(table.contains("<<< since 5.9 >>>"));
        assert!(table.contains("CONFIG_GCC_PLUGIN_STRUCTLEAK_BYREF_ALL"));
        assert!(table.contains("CONFIG_INIT_STACK_ALL_ZERO"));
        assert!(!table.contains("check result"), "no result column without results");
    }
}
