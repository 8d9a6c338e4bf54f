//! Plain-text rendering for the query commands.
//!
//! JSON output serializes the model types directly; this module only
//! covers the human format.
use crate::prereqs::{CheckStatus, PrerequisiteResult};
use crate::status::{ProjectStatus, Stage, StageStatus};
use crate::tree::{ItemAction, TreeSnapshot};
use std::fmt::Write;

pub fn status_marker(status: StageStatus) -> &'static str {
    match status {
        StageStatus::Pending => "[ ]",
        StageStatus::Done => "[x]",
        StageStatus::InProgress => "[~]",
    }
}

/// Render the workflow tree as ASCII art.
///
/// ```text
/// Alpha
/// ├── [x] Analyze  (preview: docs/Alpha/analysis-report.md)
/// ├── [ ] Plan  (run: lrefactor plan Alpha)
/// └── [~] Start migration
///     ├── Phase: Phase 1
///     └── Login - done
/// ```
pub fn render_tree(roots: &[TreeSnapshot]) -> String {
    let mut output = String::new();
    for root in roots {
        render_node(&mut output, root, "", true, true);
    }
    output
}

fn render_node(output: &mut String, node: &TreeSnapshot, prefix: &str, is_last: bool, is_root: bool) {
    if !is_root {
        output.push_str(prefix);
        output.push_str(if is_last { "└── " } else { "├── " });
    }
    output.push_str(&node_line(node));
    output.push('\n');

    let child_prefix = if is_root {
        String::new()
    } else {
        format!("{prefix}{}", if is_last { "    " } else { "│   " })
    };
    for (i, child) in node.children.iter().enumerate() {
        let child_is_last = i + 1 == node.children.len();
        render_node(output, child, &child_prefix, child_is_last, false);
    }
}

fn node_line(node: &TreeSnapshot) -> String {
    let item = &node.item;
    let mut line = match item.status {
        Some(status) => format!("{} {}", status_marker(status), item.label),
        None => item.label.clone(),
    };
    match &item.action {
        Some(ItemAction::RunStage { command }) => {
            let _ = write!(line, "  (run: {command})");
        }
        Some(ItemAction::PreviewReport { path }) => {
            let _ = write!(line, "  (preview: {path})");
        }
        None => {}
    }
    line
}

/// Order root projects by name; the model keeps scanner order.
pub fn sort_roots_for_display(roots: &mut [TreeSnapshot]) {
    roots.sort_by(|a, b| a.item.label.cmp(&b.item.label));
}

/// The command that advances `project` to its next stage.
pub fn next_command(project: &str, status: &ProjectStatus) -> Option<String> {
    Stage::ALL
        .iter()
        .find(|stage| status.stage(**stage) == StageStatus::Pending)
        .map(|stage| format!("lrefactor {stage} {project}"))
}

pub fn render_project_status(project: &str, status: &ProjectStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "project: {project}");
    for stage in Stage::ALL {
        let _ = writeln!(out, "  {stage}: {}", status.stage(stage));
    }
    if let Some(progress) = &status.progress {
        if let Some(phase) = progress.current_phase.as_deref().filter(|p| !p.is_empty()) {
            let _ = writeln!(out, "  phase: {phase}");
        }
        for feature in progress.features.iter().flatten() {
            if feature.status.is_empty() {
                let _ = writeln!(out, "  - {}", feature.name);
            } else {
                let _ = writeln!(out, "  - {}: {}", feature.name, feature.status);
            }
        }
    }
    match next_command(project, status) {
        Some(command) => {
            let _ = writeln!(out, "next: {command}");
        }
        None => {
            let _ = writeln!(out, "next: lrefactor start {project} <instruction>");
        }
    }
    out
}

pub fn render_prereqs(results: &[PrerequisiteResult]) -> String {
    let mut out = String::new();
    for result in results {
        match result.status {
            CheckStatus::Installed => {
                let version = result.version.as_deref().unwrap_or("version unknown");
                let _ = writeln!(out, "ok      {}: {version}", result.label);
            }
            CheckStatus::Missing => {
                let _ = writeln!(out, "missing {}", result.label);
                let _ = writeln!(out, "        fix: {} ({})", result.fix_label, result.fix_url);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{FeatureProgress, MigrationProgress};
    use crate::tree::{ItemKind, TreeItem};

    fn item(kind: ItemKind, label: &str, status: Option<StageStatus>) -> TreeItem {
        TreeItem {
            kind,
            label: label.to_string(),
            status,
            expanded: false,
            action: None,
        }
    }

    fn leaf(item: TreeItem) -> TreeSnapshot {
        TreeSnapshot {
            item,
            children: Vec::new(),
        }
    }

    #[test]
    fn tree_uses_branch_prefixes_and_markers() {
        let mut analyze = item(ItemKind::Step, "Analyze", Some(StageStatus::Done));
        analyze.action = Some(ItemAction::PreviewReport {
            path: "docs/Alpha/analysis-report.md".to_string(),
        });
        let mut plan = item(ItemKind::Step, "Plan", Some(StageStatus::Pending));
        plan.action = Some(ItemAction::RunStage {
            command: "lrefactor plan Alpha".to_string(),
        });
        let start = TreeSnapshot {
            item: item(ItemKind::Step, "Start migration", Some(StageStatus::InProgress)),
            children: vec![
                leaf(item(ItemKind::Progress, "Phase: Phase 1", None)),
                leaf(item(ItemKind::Progress, "Login - done", None)),
            ],
        };
        let roots = vec![TreeSnapshot {
            item: item(ItemKind::Project, "Alpha", None),
            children: vec![leaf(analyze), leaf(plan), start],
        }];

        let expected = "\
Alpha
├── [x] Analyze  (preview: docs/Alpha/analysis-report.md)
├── [ ] Plan  (run: lrefactor plan Alpha)
└── [~] Start migration
    ├── Phase: Phase 1
    └── Login - done
";
        assert_eq!(render_tree(&roots), expected);
    }

    #[test]
    fn roots_sort_by_name_for_display() {
        let mut roots = vec![
            leaf(item(ItemKind::Project, "Zeta", None)),
            leaf(item(ItemKind::Project, "Alpha", None)),
        ];
        sort_roots_for_display(&mut roots);
        assert_eq!(render_tree(&roots), "Alpha\nZeta\n");
    }

    #[test]
    fn status_lists_stages_progress_and_next_step() {
        let status = ProjectStatus {
            analyze: StageStatus::Done,
            plan: StageStatus::Pending,
            start: StageStatus::Pending,
            progress: None,
        };
        let text = render_project_status("Alpha", &status);
        assert!(text.contains("  analyze: done\n"));
        assert!(text.contains("  plan: pending\n"));
        assert!(text.ends_with("next: lrefactor plan Alpha\n"));

        let started = ProjectStatus {
            analyze: StageStatus::Done,
            plan: StageStatus::Done,
            start: StageStatus::InProgress,
            progress: Some(MigrationProgress {
                current_phase: Some("Phase 2".to_string()),
                features: Some(vec![FeatureProgress {
                    name: "Login".to_string(),
                    status: "done".to_string(),
                }]),
            }),
        };
        let text = render_project_status("Alpha", &started);
        assert!(text.contains("  start: in-progress\n"));
        assert!(text.contains("  phase: Phase 2\n  - Login: done\n"));
        assert_eq!(next_command("Alpha", &started), None);
    }

    #[test]
    fn missing_prereqs_show_fix() {
        let results = vec![PrerequisiteResult {
            id: "dotnet".to_string(),
            label: ".NET SDK".to_string(),
            status: CheckStatus::Missing,
            version: None,
            fix_url: "https://dotnet.microsoft.com/download".to_string(),
            fix_label: "Download the .NET SDK".to_string(),
        }];
        let text = render_prereqs(&results);
        assert!(text.starts_with("missing .NET SDK\n"));
        assert!(text.contains("fix: Download the .NET SDK (https://dotnet.microsoft.com/download)"));
    }
}
