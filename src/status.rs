//! Stage status derived from workspace artifacts.
//!
//! Status is never stored. Each stage maps to one artifact under
//! `docs/<project>/` and its status is a pure function of whether that file
//! exists right now:
//!
//! ```text
//! analyze  analysis-report.md        done | pending
//! plan     migration-plan.md         done | pending
//! start    .migration-progress.json  in-progress | pending
//! ```
//!
//! Stages are checked independently. A plan without an analysis report is
//! reported as such; ordering is not enforced here.
use crate::paths::WorkspacePaths;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// The ordered workflow stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Analyze,
    Plan,
    Start,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Analyze, Stage::Plan, Stage::Start];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Analyze => "analyze",
            Stage::Plan => "plan",
            Stage::Start => "start",
        }
    }

    /// Human label shown in the workflow tree.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Analyze => "Analyze",
            Stage::Plan => "Plan",
            Stage::Start => "Start migration",
        }
    }

    /// Report file produced by the stage, if the stage produces a report.
    pub fn report_file(&self) -> Option<&'static str> {
        match self {
            Stage::Analyze => Some(crate::paths::ANALYSIS_REPORT_FILE),
            Stage::Plan => Some(crate::paths::MIGRATION_PLAN_FILE),
            Stage::Start => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageStatus {
    Pending,
    InProgress,
    Done,
}

impl StageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StageStatus::Pending => "pending",
            StageStatus::InProgress => "in-progress",
            StageStatus::Done => "done",
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One feature entry tracked in the progress artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureProgress {
    pub name: String,
    #[serde(default)]
    pub status: String,
}

/// The readable subset of `.migration-progress.json`.
///
/// The file is written by external tools, so unknown fields are tolerated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<FeatureProgress>>,
}

/// Full schema of the progress artifact as written by `start`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressArtifact {
    pub project_name: String,
    pub started_at: String,
    pub current_phase: String,
    pub features: Vec<FeatureProgress>,
}

impl ProgressArtifact {
    /// Progress recorded when a migration is first started.
    pub fn initial(project_name: &str, started_at: String) -> Self {
        Self {
            project_name: project_name.to_string(),
            started_at,
            current_phase: "Phase 1".to_string(),
            features: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectStatus {
    pub analyze: StageStatus,
    pub plan: StageStatus,
    pub start: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<MigrationProgress>,
}

impl ProjectStatus {
    pub fn stage(&self, stage: Stage) -> StageStatus {
        match stage {
            Stage::Analyze => self.analyze,
            Stage::Plan => self.plan,
            Stage::Start => self.start,
        }
    }
}

/// Derive the status of every stage for `project` from disk.
pub fn check_project_status(workspace_root: &Path, project: &str) -> ProjectStatus {
    let paths = WorkspacePaths::new(workspace_root.to_path_buf());

    let analysis_exists = paths.analysis_report_path(project).exists();
    let plan_exists = paths.migration_plan_path(project).exists();
    let progress_path = paths.progress_path(project);
    let progress_exists = progress_path.exists();

    // Existence drives the stage; parseability only decides whether details show.
    let progress = if progress_exists {
        load_progress(&progress_path)
    } else {
        None
    };

    ProjectStatus {
        analyze: if analysis_exists {
            StageStatus::Done
        } else {
            StageStatus::Pending
        },
        plan: if plan_exists {
            StageStatus::Done
        } else {
            StageStatus::Pending
        },
        start: if progress_exists {
            StageStatus::InProgress
        } else {
            StageStatus::Pending
        },
        progress,
    }
}

fn load_progress(path: &Path) -> Option<MigrationProgress> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "progress artifact unreadable");
            return None;
        }
    };
    match serde_json::from_slice::<Option<MigrationProgress>>(&bytes) {
        Ok(progress) => progress,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "ignoring malformed progress artifact");
            None
        }
    }
}

/// Return the report path for `stage` when the report exists.
pub fn report_path(workspace_root: &Path, project: &str, stage: Stage) -> Option<PathBuf> {
    let file_name = stage.report_file()?;
    let path = WorkspacePaths::new(workspace_root.to_path_buf())
        .project_docs_dir(project)
        .join(file_name);
    path.exists().then_some(path)
}

/// Read a report from `docs/<project>/<file_name>`; absent reports are `None`.
pub fn read_report(workspace_root: &Path, project: &str, file_name: &str) -> Option<String> {
    let path = WorkspacePaths::new(workspace_root.to_path_buf())
        .project_docs_dir(project)
        .join(file_name);
    if !path.is_file() {
        return None;
    }
    match fs::read(&path) {
        Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "report unreadable");
            None
        }
    }
}
