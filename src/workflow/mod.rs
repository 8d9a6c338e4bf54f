//! Stage commands: analyze, plan, start, and project import.
//!
//! Each stage reads the artifacts of the one before it, calls the LM once,
//! and writes its own artifact under `docs/<project>/`. Stage status is never
//! stored; it is re-derived from these files by the status checker.
mod analyze;
mod import;
pub(crate) mod lm_client;
mod plan;
mod start;
mod transcript;

pub(crate) use analyze::run_analyze;
pub(crate) use import::run_import;
pub(crate) use plan::run_plan;
pub(crate) use start::run_start;

use crate::config::{self, LmPurpose, ToolConfig};
use crate::paths::WorkspacePaths;
use crate::scanner::{find_project, ProjectInfo};
use crate::status::Stage;
use anyhow::{anyhow, Result};
use lm_client::LmBackend;
use std::path::{Path, PathBuf};
use transcript::Transcript;

/// Shared state for a single stage run.
pub(crate) struct StageContext {
    pub(crate) paths: WorkspacePaths,
    pub(crate) config: ToolConfig,
    pub(crate) transcript: Transcript,
}

impl StageContext {
    pub(crate) fn load(workspace_root: PathBuf, verbose: bool) -> Result<Self> {
        let paths = WorkspacePaths::new(workspace_root);
        let loaded = config::load_effective(&paths)?;
        tracing::debug!(source = ?loaded.source, "config loaded");
        Ok(Self {
            paths,
            config: loaded.config,
            transcript: Transcript::new(verbose),
        })
    }

    /// The named project, or an error pointing at where it should live.
    pub(crate) fn require_project(&self, name: &str) -> Result<ProjectInfo> {
        find_project(self.paths.root(), name)?.ok_or_else(|| {
            anyhow!(
                "project {name} not found at {} (run `lrefactor import <dir>` first)",
                self.paths.display_relative(&self.paths.project_dir(name))
            )
        })
    }

    /// Read the report `stage` produced, or explain which stage to run first.
    pub(crate) fn require_report(&self, project: &str, stage: Stage) -> Result<String> {
        let file_name = stage
            .report_file()
            .ok_or_else(|| anyhow!("stage {stage} produces no report"))?;
        crate::status::read_report(self.paths.root(), project, file_name).ok_or_else(|| {
            anyhow!(
                "missing {} (run `lrefactor {stage} {project}` first)",
                self.paths
                    .display_relative(&self.paths.project_docs_dir(project).join(file_name))
            )
        })
    }

    pub(crate) fn backend(
        &self,
        lm_flag: Option<&str>,
        response: Option<&Path>,
        purpose: LmPurpose,
    ) -> LmBackend {
        match response {
            Some(path) => LmBackend::Canned(path.to_path_buf()),
            None => LmBackend::Command(config::resolve_lm_command(lm_flag, &self.config, purpose)),
        }
    }
}
