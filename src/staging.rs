//! Atomic artifact writes and staged directory copies.
//!
//! Reports and the progress file are written to a temp file next to the
//! destination and renamed into place, so the status checker never sees a
//! half-written artifact. Directory imports are staged in a sibling temp
//! directory and published with a single rename.
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// Write `text` to `dest` via a temp file in the same directory.
pub fn publish_text(dest: &Path, text: &str) -> Result<()> {
    let parent = dest
        .parent()
        .ok_or_else(|| anyhow!("{} has no parent directory", dest.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("create temp file in {}", parent.display()))?;
    tmp.write_all(text.as_bytes())
        .with_context(|| format!("write {}", tmp.path().display()))?;
    tmp.as_file()
        .sync_all()
        .with_context(|| format!("sync {}", tmp.path().display()))?;
    tmp.persist(dest)
        .map_err(|err| err.error)
        .with_context(|| format!("publish {}", dest.display()))?;
    Ok(())
}

pub fn publish_json<T: serde::Serialize>(dest: &Path, value: &T) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value).context("serialize JSON")?;
    text.push('\n');
    publish_text(dest, &text)
}

/// Copy the tree at `source` to `dest`, replacing `dest` when `replace` is set.
///
/// The copy is built in a temp directory beside `dest` and renamed into
/// place; a failed copy leaves `dest` untouched. Returns the copied files
/// relative to `dest`.
pub fn publish_tree(source: &Path, dest: &Path, replace: bool) -> Result<Vec<PathBuf>> {
    if !source.is_dir() {
        return Err(anyhow!("{} is not a directory", source.display()));
    }
    if dest.exists() && !replace {
        return Err(anyhow!("{} already exists", dest.display()));
    }
    let parent = dest
        .parent()
        .ok_or_else(|| anyhow!("{} has no parent directory", dest.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;

    let staging = TempDir::new_in(parent)
        .with_context(|| format!("create staging dir in {}", parent.display()))?;
    let staged_root = staging.path().join("tree");
    let copied = copy_tree(source, &staged_root)?;

    if dest.exists() {
        fs::remove_dir_all(dest).with_context(|| format!("remove {}", dest.display()))?;
    }
    fs::rename(&staged_root, dest).with_context(|| format!("publish {}", dest.display()))?;
    Ok(copied)
}

fn copy_tree(source: &Path, dest: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dest).with_context(|| format!("create {}", dest.display()))?;
    let mut copied = Vec::new();
    for file in collect_files_recursive(source)? {
        let rel = file
            .strip_prefix(source)
            .context("strip source prefix")?
            .to_path_buf();
        let target = dest.join(&rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        fs::copy(&file, &target).with_context(|| format!("copy {}", file.display()))?;
        copied.push(rel);
    }
    Ok(copied)
}

/// Every regular file under `root`, sorted. Symlinks are not followed.
pub fn collect_files_recursive(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !root.exists() {
        return Ok(files);
    }
    for entry in fs::read_dir(root).with_context(|| format!("read {}", root.display()))? {
        let entry = entry.with_context(|| format!("read {}", root.display()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", path.display()))?;
        if file_type.is_dir() {
            files.extend(collect_files_recursive(&path)?);
        } else if file_type.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
