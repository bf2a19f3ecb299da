//! Plan and result display

use crate::json;
use colored::{ColoredString, Colorize};
use declarative::{AttributeChange, ChangeAction, ExecuteSummary, ExecutionPlan, group_by_type};
use serde_json::Value;

/// Longest single-line value shown before truncating
const MAX_INLINE: usize = 60;

fn action_symbol(action: ChangeAction) -> ColoredString {
    match action {
        ChangeAction::Create => "+".green(),
        ChangeAction::Delete => "-".red(),
        ChangeAction::Update => "~".yellow(),
        ChangeAction::Replace => "-/+".magenta(),
        ChangeAction::NoOp => " ".normal(),
    }
}

fn type_title(resource_type: &str) -> &str {
    match resource_type {
        "ibm_openwhisk_action" => "Actions (OpenWhisk)",
        other => other,
    }
}

/// Render a value on one line: strings bare, JSON strings compacted
pub fn render_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "(unset)".to_string(),
        Some(Value::String(s)) if s.contains('\n') => format!("<{} lines>", s.lines().count()),
        Some(Value::String(s)) => {
            crate::ui::truncate(&format!("{:?}", json::normalize_or_raw(s)), MAX_INLINE)
        }
        Some(other) => crate::ui::truncate(&other.to_string(), MAX_INLINE),
    }
}

fn print_change(change: &AttributeChange) {
    let marker = if change.force_new {
        " (forces replacement)".red().to_string()
    } else {
        String::new()
    };
    println!(
        "│       {} {} → {}{}",
        format!("{}:", change.name).dimmed(),
        render_value(change.old.as_ref()),
        render_value(change.new.as_ref()),
        marker
    );

    // Multi-line strings (action code) get a line diff
    let old = change.old.as_ref().and_then(Value::as_str).unwrap_or_default();
    let new = change.new.as_ref().and_then(Value::as_str).unwrap_or_default();
    if old.contains('\n') || new.contains('\n') {
        print_text_diff(old, new);
    }
    if let (Some(Value::Array(old)), Some(Value::Array(new))) = (&change.old, &change.new) {
        for (old, new) in old.iter().zip(new.iter()) {
            let old_code = old.get("code").and_then(Value::as_str).unwrap_or_default();
            let new_code = new.get("code").and_then(Value::as_str).unwrap_or_default();
            if old_code != new_code && (old_code.contains('\n') || new_code.contains('\n')) {
                print_text_diff(old_code, new_code);
            }
        }
    }
}

fn print_text_diff(old: &str, new: &str) {
    let diff = similar::TextDiff::from_lines(old, new);
    for change in diff.iter_all_changes() {
        let line = change.to_string_lossy();
        let line = line.trim_end_matches('\n');
        match change.tag() {
            similar::ChangeTag::Delete => println!("│         {}", format!("- {line}").red()),
            similar::ChangeTag::Insert => println!("│         {}", format!("+ {line}").green()),
            similar::ChangeTag::Equal => {}
        }
    }
}

/// Display a plan grouped by resource type
pub fn display_plan(plan: &ExecutionPlan) {
    if plan.is_empty() {
        println!();
        println!("  {} No changes. Infrastructure matches the configuration.", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Execution Plan".bold()
    );
    println!("│");

    let groups = group_by_type(plan.pending().map(|c| &c.diff));
    for (resource_type, diffs) in &groups {
        println!("│ {}", type_title(resource_type).bold());
        for diff in diffs {
            println!(
                "│   {} {:<40} {}",
                action_symbol(diff.action),
                diff.address,
                format!("({})", diff.action).dimmed()
            );
            if diff.action == ChangeAction::Update || diff.action == ChangeAction::Replace {
                for change in &diff.changes {
                    print_change(change);
                }
            }
        }
        println!("│");
    }

    let summary = plan.summary();
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Plan: {} to add, {} to change, {} to replace, {} to destroy",
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.replacements.to_string().magenta(),
        summary.removals.to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}

/// Print final summary
pub fn print_summary(summary: &ExecuteSummary, verb: &str) {
    println!();
    if summary.is_success() {
        println!("  {} {} complete!", "✓".green().bold(), verb);
    } else {
        println!("  {} {} finished with errors", "⚠".yellow().bold(), verb);
    }

    if summary.created > 0 {
        println!("    • {} resources created", summary.created);
    }
    if summary.modified > 0 {
        println!("    • {} resources modified", summary.modified);
    }
    if summary.replaced > 0 {
        println!("    • {} resources replaced", summary.replaced);
    }
    if summary.removed > 0 {
        println!("    • {} resources removed", summary.removed);
    }
    if summary.skipped > 0 {
        println!("    • {} resources skipped", summary.skipped);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "resources".red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(None), "(unset)");
        assert_eq!(render_value(Some(&json!("0.0.2"))), "\"0.0.2\"");
        assert_eq!(
            render_value(Some(&json!("[ {\"value\": 1, \"key\": \"a\"} ]"))),
            r#""[{\"key\":\"a\",\"value\":1}]""#
        );
        assert_eq!(render_value(Some(&json!("a\nb\nc"))), "<3 lines>");
        assert_eq!(render_value(Some(&json!(true))), "true");
    }

    #[test]
    fn test_render_value_truncates() {
        let long = "x".repeat(200);
        assert_eq!(render_value(Some(&json!(long))).chars().count(), MAX_INLINE);
    }
}
