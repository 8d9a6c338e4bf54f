//! Import a legacy project directory into `legacy-codes/`.
use crate::cli::ImportArgs;
use crate::context::is_eligible_name;
use crate::paths::{validate_project_name, WorkspacePaths, LEGACY_CODES_DIR};
use crate::staging::publish_tree;
use anyhow::{anyhow, Context, Result};
use std::path::Path;

pub fn run_import(workspace_root: &Path, args: &ImportArgs) -> Result<()> {
    let paths = WorkspacePaths::new(workspace_root.to_path_buf());
    let source = args
        .source
        .canonicalize()
        .with_context(|| format!("resolve {}", args.source.display()))?;
    let name = match &args.name {
        Some(name) => name.clone(),
        None => source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| anyhow!("cannot derive a project name from {}", source.display()))?,
    };
    validate_project_name(&name)?;

    let dest = paths.project_dir(&name);
    if dest.exists() && !args.force {
        return Err(anyhow!(
            "project {name} already exists at {} (pass --force to replace it)",
            paths.display_relative(&dest)
        ));
    }
    let workspace = paths
        .root()
        .canonicalize()
        .with_context(|| format!("resolve {}", paths.root().display()))?;
    if workspace.join(LEGACY_CODES_DIR).starts_with(&source) {
        return Err(anyhow!(
            "cannot import {}: it contains the workspace's legacy-codes directory",
            source.display()
        ));
    }

    let copied = publish_tree(&source, &dest, args.force)?;
    let eligible = copied
        .iter()
        .filter(|rel| {
            rel.file_name()
                .map(|name| is_eligible_name(&name.to_string_lossy()))
                .unwrap_or(false)
        })
        .count();
    tracing::info!(project = %name, files = copied.len(), eligible, "project imported");

    println!(
        "imported {} ({} files, {} source files)",
        paths.display_relative(&dest),
        copied.len(),
        eligible
    );
    println!("next: lrefactor analyze {name}");
    Ok(())
}
