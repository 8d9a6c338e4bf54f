//! Workflow plan step.
//!
//! Planning turns the analysis report into `docs/<project>/migration-plan.md`.
use super::{lm_client, StageContext};
use crate::cli::PlanArgs;
use crate::config::LmPurpose;
use crate::staging::publish_text;
use crate::status::Stage;
use crate::templates;
use anyhow::Result;
use std::path::Path;

/// Run the plan step and write the migration plan.
pub fn run_plan(workspace_root: &Path, args: &PlanArgs) -> Result<()> {
    let mut ctx = StageContext::load(workspace_root.to_path_buf(), args.verbose)?;
    let project = &args.project;
    ctx.require_project(project)?;

    ctx.transcript.step("Reading analysis report");
    let analysis = ctx.require_report(project, Stage::Analyze)?;
    ctx.transcript
        .detail(&format!("{} chars", analysis.chars().count()));

    let backend = ctx.backend(args.lm.as_deref(), args.response.as_deref(), LmPurpose::Quality);
    ctx.transcript
        .step(&format!("Requesting migration plan from {}", backend.describe()));
    let prompt = templates::plan_prompt(project, &analysis);
    let response = lm_client::invoke(&backend, &prompt)?;

    ctx.transcript.step("Writing migration plan");
    let plan = ctx.paths.migration_plan_path(project);
    publish_text(&plan, &response)?;
    ctx.transcript.finish();

    println!("wrote {}", ctx.paths.display_relative(&plan));
    println!("next: lrefactor start {project}");
    Ok(())
}
