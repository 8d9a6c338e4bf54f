//! Workflow start step.
//!
//! Sends the migration plan (plus current progress, when tracked) to the LM
//! and prints its guidance. The first successful run creates the progress
//! file, which moves the start stage to in-progress.
use super::{lm_client, StageContext};
use crate::cli::StartArgs;
use crate::config::LmPurpose;
use crate::staging::publish_json;
use crate::status::{ProgressArtifact, Stage};
use crate::templates;
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use std::fs;
use std::path::Path;

pub fn run_start(workspace_root: &Path, args: &StartArgs) -> Result<()> {
    let mut ctx = StageContext::load(workspace_root.to_path_buf(), args.verbose)?;
    let project = &args.project;
    ctx.require_project(project)?;

    ctx.transcript.step("Reading migration plan");
    let plan = ctx.require_report(project, Stage::Plan)?;

    let progress_path = ctx.paths.progress_path(project);
    let progress_json = if progress_path.is_file() {
        match fs::read_to_string(&progress_path) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(path = %progress_path.display(), error = %err, "progress file unreadable");
                None
            }
        }
    } else {
        None
    };
    if progress_json.is_some() {
        ctx.transcript.detail("including current migration progress");
    }

    let instruction = args.instruction.join(" ");
    let backend = ctx.backend(args.lm.as_deref(), args.response.as_deref(), LmPurpose::Speed);
    ctx.transcript
        .step(&format!("Requesting migration guidance from {}", backend.describe()));
    let prompt = templates::start_prompt(
        project,
        &plan,
        progress_json.as_deref(),
        Some(instruction.as_str()),
    );
    let response = lm_client::invoke(&backend, &prompt)?;
    print!("{response}");
    if !response.ends_with('\n') {
        println!();
    }

    if !progress_path.exists() {
        let started_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        publish_json(&progress_path, &ProgressArtifact::initial(project, started_at))?;
        tracing::info!(project = %project, "migration progress initialized");
        ctx.transcript.detail(&format!(
            "created {}",
            ctx.paths.display_relative(&progress_path)
        ));
    }
    ctx.transcript.finish();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{check_project_status, StageStatus};
    use tempfile::TempDir;

    fn workspace_with_plan() -> TempDir {
        let temp = TempDir::new().expect("temp dir");
        let root = temp.path();
        fs::create_dir_all(root.join("legacy-codes/Alpha")).expect("create project");
        fs::create_dir_all(root.join("docs/Alpha")).expect("create docs");
        fs::write(root.join("docs/Alpha/analysis-report.md"), "# Analysis").expect("write");
        fs::write(root.join("docs/Alpha/migration-plan.md"), "# Plan").expect("write");
        fs::write(root.join("reply.md"), "Create the new solution first.\n").expect("write");
        temp
    }

    fn args(root: &Path) -> StartArgs {
        StartArgs {
            project: "Alpha".to_string(),
            instruction: Vec::new(),
            lm: None,
            response: Some(root.join("reply.md")),
            verbose: false,
        }
    }

    #[test]
    fn first_start_initializes_progress() {
        let temp = workspace_with_plan();
        let root = temp.path();
        assert_eq!(check_project_status(root, "Alpha").start, StageStatus::Pending);

        run_start(root, &args(root)).expect("start");

        let status = check_project_status(root, "Alpha");
        assert_eq!(status.start, StageStatus::InProgress);
        let progress = status.progress.expect("progress parsed");
        assert_eq!(progress.current_phase.as_deref(), Some("Phase 1"));
        assert_eq!(progress.features, Some(Vec::new()));

        let raw: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(root.join("docs/Alpha/.migration-progress.json"))
                .expect("read progress"),
        )
        .expect("parse progress");
        assert_eq!(raw["projectName"], "Alpha");
        assert!(raw["startedAt"].as_str().expect("startedAt").ends_with('Z'));
    }

    #[test]
    fn existing_progress_is_left_untouched() {
        let temp = workspace_with_plan();
        let root = temp.path();
        let progress = root.join("docs/Alpha/.migration-progress.json");
        let existing = r#"{"currentPhase":"Phase 3","features":[{"name":"Login","status":"done"}]}"#;
        fs::write(&progress, existing).expect("write progress");

        run_start(root, &args(root)).expect("start");
        assert_eq!(fs::read_to_string(&progress).expect("read"), existing);
    }

    #[test]
    fn start_requires_plan() {
        let temp = workspace_with_plan();
        let root = temp.path();
        fs::remove_file(root.join("docs/Alpha/migration-plan.md")).expect("remove plan");
        let err = run_start(root, &args(root)).expect_err("no plan");
        assert!(err.to_string().contains("lrefactor plan Alpha"));
        assert!(!root.join("docs/Alpha/.migration-progress.json").exists());
    }
}
