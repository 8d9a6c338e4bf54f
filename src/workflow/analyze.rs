//! Workflow analyze step.
//!
//! Packs the project's source into a context document, asks the LM for an
//! architecture and migration-risk analysis, and writes the answer to
//! `docs/<project>/analysis-report.md`.
use super::{lm_client, StageContext};
use crate::cli::AnalyzeArgs;
use crate::config::LmPurpose;
use crate::context::{assemble_project_context, ContextOutcome};
use crate::staging::publish_text;
use crate::templates;
use anyhow::{anyhow, Result};
use std::path::Path;

pub fn run_analyze(workspace_root: &Path, args: &AnalyzeArgs) -> Result<()> {
    let mut ctx = StageContext::load(workspace_root.to_path_buf(), args.verbose)?;
    let project = &args.project;
    ctx.require_project(project)?;

    ctx.transcript.step(&format!("Scanning {project}"));
    let budget = ctx.config.char_budget(args.max_tokens);
    let result = match assemble_project_context(ctx.paths.root(), project, budget)? {
        ContextOutcome::ProjectMissing { project_dir } => {
            return Err(anyhow!(
                "project {project} not found at {} (run `lrefactor import <dir>` first)",
                ctx.paths.display_relative(&project_dir)
            ));
        }
        ContextOutcome::NoEligibleFiles { project_dir } => {
            return Err(anyhow!(
                "no source files to analyze in {}",
                ctx.paths.display_relative(&project_dir)
            ));
        }
        ContextOutcome::Assembled(result) => result,
    };
    let project_dir = ctx.paths.project_dir(project);
    ctx.transcript.files(&project_dir, &result.files);
    ctx.transcript.context_stats(&result);
    if result.truncated {
        eprintln!(
            "warning: context truncated to {} of {} files ({budget} char budget)",
            result.included_files.len(),
            result.files.len()
        );
    }

    let backend = ctx.backend(args.lm.as_deref(), args.response.as_deref(), LmPurpose::Quality);
    ctx.transcript
        .step(&format!("Requesting analysis from {}", backend.describe()));
    let prompt = templates::analyze_prompt(project, &result.content);
    let response = lm_client::invoke(&backend, &prompt)?;

    ctx.transcript.step("Writing analysis report");
    let report = ctx.paths.analysis_report_path(project);
    publish_text(&report, &response)?;
    ctx.transcript.finish();

    println!("wrote {}", ctx.paths.display_relative(&report));
    println!("next: lrefactor plan {project}");
    Ok(())
}
