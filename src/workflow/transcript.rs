//! Human-readable progress transcript for `--verbose` stage runs.
//!
//! Lines go to stderr so stdout stays reserved for artifacts and LM output.
use crate::context::{relative_display, ProjectContextResult};
use std::path::{Path, PathBuf};
use std::time::Instant;

const FILE_PREVIEW_LIMIT: usize = 10;

pub(crate) struct Transcript {
    enabled: bool,
    step: usize,
    started: Instant,
}

impl Transcript {
    pub(crate) fn new(enabled: bool) -> Self {
        Self {
            enabled,
            step: 0,
            started: Instant::now(),
        }
    }

    pub(crate) fn step(&mut self, title: &str) {
        self.step += 1;
        if self.enabled {
            eprintln!("Step {} - {title}", self.step);
        }
    }

    pub(crate) fn detail(&self, line: &str) {
        if self.enabled {
            eprintln!("  {line}");
        }
    }

    pub(crate) fn files(&self, project_dir: &Path, files: &[PathBuf]) {
        if !self.enabled {
            return;
        }
        for line in file_preview(project_dir, files) {
            eprintln!("  {line}");
        }
    }

    pub(crate) fn context_stats(&self, result: &ProjectContextResult) {
        self.detail(&format!(
            "context: {} of {} files, {} chars{}",
            result.included_files.len(),
            result.files.len(),
            result.total_chars,
            if result.truncated { " (truncated)" } else { "" }
        ));
    }

    pub(crate) fn finish(&self) {
        if self.enabled {
            eprintln!("done in {} ms", self.started.elapsed().as_millis());
        }
    }
}

/// Relative paths of the first files, with a count of the rest.
fn file_preview(project_dir: &Path, files: &[PathBuf]) -> Vec<String> {
    let mut lines: Vec<String> = files
        .iter()
        .take(FILE_PREVIEW_LIMIT)
        .map(|path| relative_display(project_dir, path))
        .collect();
    if files.len() > FILE_PREVIEW_LIMIT {
        lines.push(format!("... and {} more", files.len() - FILE_PREVIEW_LIMIT));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_is_capped() {
        let dir = Path::new("/ws/legacy-codes/Alpha");
        let files: Vec<PathBuf> = (0..12).map(|i| dir.join(format!("F{i:02}.cs"))).collect();
        let lines = file_preview(dir, &files);
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "F00.cs");
        assert_eq!(lines[10], "... and 2 more");

        assert_eq!(file_preview(dir, &files[..3]).len(), 3);
    }
}
