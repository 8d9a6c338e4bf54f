//! Typed paths into a migration workspace.
//!
//! The workspace layout is the contract shared with every external tool that
//! produces artifacts, so all path construction goes through here.
use anyhow::{anyhow, Result};
use std::path::{Component, Path, PathBuf};

pub const LEGACY_CODES_DIR: &str = "legacy-codes";
pub const DOCS_DIR: &str = "docs";
pub const ANALYSIS_REPORT_FILE: &str = "analysis-report.md";
pub const MIGRATION_PLAN_FILE: &str = "migration-plan.md";
pub const PROGRESS_FILE: &str = ".migration-progress.json";
pub const CONFIG_DIR: &str = ".legacy-refactor";
pub const CONFIG_FILE: &str = "config.json";

/// Convenience wrapper for locating workspace directories and artifacts.
#[derive(Debug, Clone)]
pub struct WorkspacePaths {
    root: PathBuf,
}

impl WorkspacePaths {
    /// Create a new path helper rooted at the workspace root.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Return the workspace root used for path derivation.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the `legacy-codes/` directory path.
    pub fn legacy_codes_dir(&self) -> PathBuf {
        self.root.join(LEGACY_CODES_DIR)
    }

    /// Return the `legacy-codes/<project>/` source directory path.
    pub fn project_dir(&self, project: &str) -> PathBuf {
        self.legacy_codes_dir().join(project)
    }

    /// Return the `docs/` directory path.
    pub fn docs_dir(&self) -> PathBuf {
        self.root.join(DOCS_DIR)
    }

    /// Return the `docs/<project>/` artifact directory path.
    pub fn project_docs_dir(&self, project: &str) -> PathBuf {
        self.docs_dir().join(project)
    }

    /// Return the `docs/<project>/analysis-report.md` path.
    pub fn analysis_report_path(&self, project: &str) -> PathBuf {
        self.project_docs_dir(project).join(ANALYSIS_REPORT_FILE)
    }

    /// Return the `docs/<project>/migration-plan.md` path.
    pub fn migration_plan_path(&self, project: &str) -> PathBuf {
        self.project_docs_dir(project).join(MIGRATION_PLAN_FILE)
    }

    /// Return the `docs/<project>/.migration-progress.json` path.
    pub fn progress_path(&self, project: &str) -> PathBuf {
        self.project_docs_dir(project).join(PROGRESS_FILE)
    }

    /// Return the workspace-owned `.legacy-refactor/config.json` path.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Render `path` relative to the workspace root when it lives underneath it.
    pub fn display_relative(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(relative) => relative.display().to_string(),
            Err(_) => path.display().to_string(),
        }
    }
}

/// A project name must be a single plain path component.
pub fn validate_project_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(anyhow!("invalid project name {name:?}")),
    }
}
