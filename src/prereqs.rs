//! Prerequisite probing for the migration toolchain.
//!
//! Results are cached in a [`PrereqProbe`] owned by the caller; `clear`
//! forces the next `run_all` to probe again.
use serde::Serialize;
use std::path::Path;
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Installed,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrerequisiteResult {
    pub id: String,
    pub label: String,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub fix_url: String,
    pub fix_label: String,
}

/// A single executable to look for.
#[derive(Debug, Clone)]
pub struct PrereqSpec {
    pub id: &'static str,
    pub label: String,
    pub program: String,
    pub fix_url: &'static str,
    pub fix_label: &'static str,
}

/// The default checks: the LM command's executable, Node.js, and the .NET SDK.
pub fn default_specs(lm_command: &str) -> Vec<PrereqSpec> {
    let lm_program = shell_words::split(lm_command)
        .ok()
        .and_then(|argv| argv.into_iter().next())
        .unwrap_or_else(|| lm_command.trim().to_string());
    vec![
        PrereqSpec {
            id: "lm",
            label: format!("LM command ({lm_program})"),
            program: lm_program,
            fix_url: "https://docs.anthropic.com/en/docs/claude-code",
            fix_label: "Install an LM CLI or set LREFACTOR_LM_COMMAND",
        },
        PrereqSpec {
            id: "node",
            label: "Node.js".to_string(),
            program: "node".to_string(),
            fix_url: "https://nodejs.org/en/download",
            fix_label: "Download Node.js",
        },
        PrereqSpec {
            id: "dotnet",
            label: ".NET SDK".to_string(),
            program: "dotnet".to_string(),
            fix_url: "https://dotnet.microsoft.com/download",
            fix_label: "Download the .NET SDK",
        },
    ]
}

/// Caching prerequisite checker.
#[derive(Debug, Default)]
pub struct PrereqProbe {
    cache: Option<Vec<PrerequisiteResult>>,
}

impl PrereqProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe every spec, or return the cached results from an earlier run.
    pub fn run_all(&mut self, specs: &[PrereqSpec]) -> &[PrerequisiteResult] {
        self.cache
            .get_or_insert_with(|| specs.iter().map(check).collect())
            .as_slice()
    }

    #[allow(dead_code)]
    pub fn clear(&mut self) {
        self.cache = None;
    }

    #[allow(dead_code)]
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }
}

pub fn check(spec: &PrereqSpec) -> PrerequisiteResult {
    let located = which::which(&spec.program).ok();
    let (status, version) = match located {
        Some(path) => (CheckStatus::Installed, capture_version(&path)),
        None => (CheckStatus::Missing, None),
    };
    tracing::debug!(id = spec.id, program = %spec.program, ?status, "prerequisite checked");
    PrerequisiteResult {
        id: spec.id.to_string(),
        label: spec.label.clone(),
        status,
        version,
        fix_url: spec.fix_url.to_string(),
        fix_label: spec.fix_label.to_string(),
    }
}

/// First non-empty line of `<program> --version`, from stdout or stderr.
fn capture_version(program: &Path) -> Option<String> {
    let output = Command::new(program).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let line = stdout
        .lines()
        .find(|line| !line.trim().is_empty())
        .or_else(|| stderr.lines().find(|line| !line.trim().is_empty()))?;
    Some(line.trim().to_string())
}
