//! Bounded source context for a single project.
//!
//! Eligible files under `legacy-codes/<project>/` are packed into one
//! markdown document, in lexicographic order of their project-relative path,
//! until the character budget would be exceeded. A file is either emitted
//! whole or not at all; the first file that does not fit is replaced by a
//! truncation marker and assembly stops.
//!
//! ~~~text
//! ### src/Program.cs
//! ```
//! <file contents>
//! ```
//!
//! <!-- truncated: token budget reached (300000 chars) -->
//! ~~~
use crate::paths::WorkspacePaths;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File-name suffixes of legacy source, project, config and markup files.
pub const LEGACY_EXTENSIONS: &[&str] = &[".cs", ".csproj", ".sln", ".config", ".aspx", ".cshtml"];

/// Dependency-cache and build-output directories that are never descended into.
pub const EXCLUDED_DIRS: &[&str] = &["node_modules", "bin", "obj"];

/// The assembled document plus bookkeeping about what went into it.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectContextResult {
    pub content: String,
    /// Every eligible file, in assembly order.
    pub files: Vec<PathBuf>,
    /// The prefix of `files` that made it into `content`.
    pub included_files: Vec<PathBuf>,
    /// Characters of emitted file blocks; the truncation marker is not counted.
    pub total_chars: usize,
    pub truncated: bool,
}

/// Outcome of assembling context for one project.
///
/// The two empty outcomes both mean "nothing to assemble" but stay distinct
/// for diagnostics.
#[derive(Debug, Clone)]
pub enum ContextOutcome {
    ProjectMissing { project_dir: PathBuf },
    NoEligibleFiles { project_dir: PathBuf },
    Assembled(ProjectContextResult),
}

#[cfg(test)]
impl ContextOutcome {
    pub fn into_result(self) -> Option<ProjectContextResult> {
        match self {
            ContextOutcome::Assembled(result) => Some(result),
            ContextOutcome::ProjectMissing { .. } | ContextOutcome::NoEligibleFiles { .. } => None,
        }
    }
}

/// Convert a token ceiling into a character budget.
///
/// This is a fixed-ratio approximation; no tokenizer is consulted.
pub fn char_budget(max_input_tokens: u64, chars_per_token: u64) -> usize {
    let chars = max_input_tokens.saturating_mul(chars_per_token);
    usize::try_from(chars).unwrap_or(usize::MAX)
}

/// Assemble the context document for `project` within `budget` characters.
pub fn assemble_project_context(
    workspace_root: &Path,
    project: &str,
    budget: usize,
) -> Result<ContextOutcome> {
    let project_dir = WorkspacePaths::new(workspace_root.to_path_buf()).project_dir(project);
    if !project_dir.is_dir() {
        return Ok(ContextOutcome::ProjectMissing { project_dir });
    }

    let start = Instant::now();
    let files = collect_eligible_files(&project_dir)?;
    if files.is_empty() {
        return Ok(ContextOutcome::NoEligibleFiles { project_dir });
    }

    let result = assemble_files(&project_dir, files, budget)?;
    tracing::info!(
        project,
        elapsed_ms = start.elapsed().as_millis(),
        files = result.files.len(),
        included = result.included_files.len(),
        total_chars = result.total_chars,
        truncated = result.truncated,
        "context assembled"
    );
    Ok(ContextOutcome::Assembled(result))
}

/// Pack `files` (already ordered) into a document no larger than `budget`.
pub fn assemble_files(
    project_dir: &Path,
    files: Vec<PathBuf>,
    budget: usize,
) -> Result<ProjectContextResult> {
    let mut content = String::new();
    let mut included_files = Vec::new();
    let mut total_chars = 0usize;
    let mut truncated = false;

    for path in &files {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let text = String::from_utf8_lossy(&bytes);
        let block = render_block(&relative_display(project_dir, path), &text);
        let block_chars = block.chars().count();

        if total_chars.saturating_add(block_chars) > budget {
            content.push_str(&truncation_marker(budget));
            truncated = true;
            break;
        }

        content.push_str(&block);
        total_chars += block_chars;
        included_files.push(path.clone());
    }

    Ok(ProjectContextResult {
        content,
        files,
        included_files,
        total_chars,
        truncated,
    })
}

/// Recursively collect eligible files under `project_dir`, sorted by relative path.
pub fn collect_eligible_files(project_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_into(project_dir, &mut files)?;
    let mut keyed: Vec<(String, PathBuf)> = files
        .into_iter()
        .map(|path| (relative_display(project_dir, &path), path))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, path)| path).collect())
}

fn collect_into(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read {}", dir.display()))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .with_context(|| format!("stat {}", path.display()))?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if file_type.is_dir() {
            if EXCLUDED_DIRS
                .iter()
                .any(|excluded| name.eq_ignore_ascii_case(excluded))
            {
                continue;
            }
            collect_into(&path, files)?;
        } else if is_eligible_name(&name) && path.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

/// Suffix match ignoring ASCII case; Windows trees mix `Web.Config` and `Global.CS`.
pub fn is_eligible_name(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    LEGACY_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Project-relative path with `/` separators on every platform.
pub fn relative_display(project_dir: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(project_dir).unwrap_or(path);
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn render_block(relative_path: &str, text: &str) -> String {
    format!("### {relative_path}\n```\n{text}\n```\n\n")
}

pub fn truncation_marker(budget: usize) -> String {
    format!("\n<!-- truncated: token budget reached ({budget} chars) -->\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent directory");
        }
        fs::write(path, contents).expect("write file");
    }

    fn project_root(temp: &TempDir, project: &str) -> PathBuf {
        temp.path().join("legacy-codes").join(project)
    }

    fn rel_names(project_dir: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|path| relative_display(project_dir, path))
            .collect()
    }

    #[test]
    fn budget_is_token_ceiling_times_multiplier() {
        assert_eq!(char_budget(100_000, 3), 300_000);
        assert_eq!(char_budget(u64::MAX, 3), usize::MAX);
    }

    #[test]
    fn collects_allowed_suffixes_and_skips_build_dirs() {
        let temp = TempDir::new().expect("temp dir");
        let project = project_root(&temp, "Alpha");
        write_file(&project.join("Alpha.sln"), "sln");
        write_file(&project.join("src/Program.cs"), "class P {}");
        write_file(&project.join("src/Web.config"), "<configuration/>");
        write_file(&project.join("Views/Home/Index.cshtml"), "<h1/>");
        write_file(&project.join("Pages/Default.aspx"), "<%@ Page %>");
        write_file(&project.join("Alpha.csproj"), "<Project/>");
        write_file(&project.join("README.md"), "ignored");
        write_file(&project.join("bin/Debug/Gen.cs"), "ignored");
        write_file(&project.join("obj/Temp.cs"), "ignored");
        write_file(&project.join("node_modules/pkg/index.cs"), "ignored");

        let files = collect_eligible_files(&project).expect("collect");
        assert_eq!(
            rel_names(&project, &files),
            vec![
                "Alpha.csproj",
                "Alpha.sln",
                "Pages/Default.aspx",
                "Views/Home/Index.cshtml",
                "src/Program.cs",
                "src/Web.config",
            ]
        );
    }

    #[test]
    fn suffixes_and_build_dirs_match_any_case() {
        let temp = TempDir::new().expect("temp dir");
        let project = project_root(&temp, "Alpha");
        write_file(&project.join("Web.Config"), "<configuration/>");
        write_file(&project.join("Pages/Default.ASPX"), "<%@ Page %>");
        write_file(&project.join("Global.CS"), "class Global {}");
        write_file(&project.join("Notes.TXT"), "ignored");
        write_file(&project.join("Bin/Debug/Gen.cs"), "ignored");
        write_file(&project.join("OBJ/Temp.cs"), "ignored");

        let files = collect_eligible_files(&project).expect("collect");
        assert_eq!(
            rel_names(&project, &files),
            vec!["Global.CS", "Pages/Default.ASPX", "Web.Config"]
        );
        assert!(!is_eligible_name("readme.md"));
    }

    #[test]
    fn missing_project_and_empty_project_are_distinct() {
        let temp = TempDir::new().expect("temp dir");
        let missing = assemble_project_context(temp.path(), "Ghost", 1000).expect("assemble");
        assert!(matches!(missing, ContextOutcome::ProjectMissing { .. }));

        let project = project_root(&temp, "Empty");
        write_file(&project.join("notes.txt"), "not source");
        let empty = assemble_project_context(temp.path(), "Empty", 1000).expect("assemble");
        assert!(matches!(empty, ContextOutcome::NoEligibleFiles { .. }));

        assert!(missing.into_result().is_none());
        assert!(empty.into_result().is_none());
    }

    #[test]
    fn emits_header_and_full_contents_per_file() {
        let temp = TempDir::new().expect("temp dir");
        let project = project_root(&temp, "Alpha");
        write_file(&project.join("src/A.cs"), "class A {}");
        write_file(&project.join("B.config"), "<b/>");

        let result = assemble_project_context(temp.path(), "Alpha", 10_000)
            .expect("assemble")
            .into_result()
            .expect("assembled");
        assert_eq!(
            result.content,
            "### B.config\n```\n<b/>\n```\n\n### src/A.cs\n```\nclass A {}\n```\n\n"
        );
        assert!(!result.truncated);
        assert_eq!(result.files, result.included_files);
        assert_eq!(result.total_chars, result.content.chars().count());
    }

    #[test]
    fn truncates_at_block_boundary() {
        let temp = TempDir::new().expect("temp dir");
        let project = project_root(&temp, "Alpha");
        let body = "x".repeat(100);
        for name in ["a.cs", "b.cs", "c.cs"] {
            write_file(&project.join(name), &body);
        }
        // "### a.cs\n" + "```\n" + 100 chars + "\n```\n\n"
        let block_chars = 9 + 4 + 100 + 6;
        let budget = block_chars * 2;

        let result = assemble_project_context(temp.path(), "Alpha", budget)
            .expect("assemble")
            .into_result()
            .expect("assembled");
        assert_eq!(result.files.len(), 3);
        assert_eq!(result.included_files.len(), 2);
        assert!(result.truncated);
        assert_eq!(result.total_chars, budget);
        assert!(result.content.ends_with(&truncation_marker(budget)));
        assert!(!result.content.contains("### c.cs"));
    }

    #[test]
    fn oversized_first_file_is_excluded_entirely() {
        let temp = TempDir::new().expect("temp dir");
        let project = project_root(&temp, "Alpha");
        write_file(&project.join("Huge.cs"), &"y".repeat(500));

        let result = assemble_project_context(temp.path(), "Alpha", 100)
            .expect("assemble")
            .into_result()
            .expect("assembled");
        assert!(result.truncated);
        assert!(result.included_files.is_empty());
        assert_eq!(result.total_chars, 0);
        assert_eq!(result.content, truncation_marker(100));
    }

    #[test]
    fn budget_counts_characters_not_bytes() {
        let temp = TempDir::new().expect("temp dir");
        let project = project_root(&temp, "Alpha");
        write_file(&project.join("a.cs"), "é");
        let block_chars = 9 + 4 + 1 + 6;

        let result = assemble_project_context(temp.path(), "Alpha", block_chars)
            .expect("assemble")
            .into_result()
            .expect("assembled");
        assert!(!result.truncated);
        assert_eq!(result.total_chars, block_chars);
    }

    #[test]
    fn assembly_is_deterministic() {
        let temp = TempDir::new().expect("temp dir");
        let project = project_root(&temp, "Alpha");
        for name in ["z.cs", "m/n.cs", "a.cs", "m.cs"] {
            write_file(&project.join(name), name);
        }
        let first = assemble_project_context(temp.path(), "Alpha", 10_000)
            .expect("assemble")
            .into_result()
            .expect("assembled");
        let second = assemble_project_context(temp.path(), "Alpha", 10_000)
            .expect("assemble")
            .into_result()
            .expect("assembled");
        assert_eq!(first.content, second.content);
        assert_eq!(
            rel_names(&project, &first.files),
            vec!["a.cs", "m.cs", "m/n.cs", "z.cs"]
        );
    }
}
