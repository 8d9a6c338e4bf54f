//! Project discovery under `legacy-codes/`.
//!
//! Every call re-lists the directory; nothing is cached so projects imported
//! or removed by other tools show up on the next scan.
use crate::paths::WorkspacePaths;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A tracked project, identified by its directory name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectInfo {
    pub name: String,
    pub path: PathBuf,
}

/// List project directories under `<root>/legacy-codes/`.
///
/// Entries come back in directory enumeration order. A missing
/// `legacy-codes/` directory yields an empty list; plain files are skipped.
pub fn scan_projects(workspace_root: &Path) -> Result<Vec<ProjectInfo>> {
    let legacy_codes_dir = WorkspacePaths::new(workspace_root.to_path_buf()).legacy_codes_dir();
    if !legacy_codes_dir.is_dir() {
        tracing::debug!(dir = %legacy_codes_dir.display(), "legacy-codes directory missing");
        return Ok(Vec::new());
    }

    let mut projects = Vec::new();
    let entries = fs::read_dir(&legacy_codes_dir)
        .with_context(|| format!("read {}", legacy_codes_dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read {}", legacy_codes_dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", entry.path().display()))?;
        if !file_type.is_dir() {
            continue;
        }
        projects.push(ProjectInfo {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        });
    }
    tracing::debug!(count = projects.len(), "scanned projects");
    Ok(projects)
}

/// Find a single project by name, re-reading the directory.
pub fn find_project(workspace_root: &Path, name: &str) -> Result<Option<ProjectInfo>> {
    Ok(scan_projects(workspace_root)?
        .into_iter()
        .find(|project| project.name == name))
}
