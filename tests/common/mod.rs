//! Shared test infrastructure for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A throwaway workspace plus helpers to run `lrefactor` against it.
pub struct TestWorkspace {
    temp: TempDir,
}

/// Captured result of one `lrefactor` invocation.
#[derive(Debug)]
pub struct RunResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for RunResult {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp workspace");
        fs::create_dir_all(temp.path().join("workspace")).expect("create workspace dir");
        Self { temp }
    }

    pub fn root(&self) -> PathBuf {
        self.temp.path().join("workspace")
    }

    /// Scratch directory outside the workspace (responses, import sources).
    pub fn scratch(&self) -> PathBuf {
        let dir = self.temp.path().join("scratch");
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    /// Write `contents` to `rel` under the workspace root.
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.root().join(rel);
        write_file(&path, contents);
        path
    }

    /// Write a canned LM response into the scratch dir.
    pub fn response(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.scratch().join(name);
        write_file(&path, contents);
        path
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.root().join(rel)).expect("read workspace file")
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.root().join(rel).exists()
    }

    /// Run `lrefactor --workspace <root> <args...>` with an isolated environment.
    pub fn run(&self, args: &[&str]) -> RunResult {
        let mut cmd = self.command();
        cmd.arg("--workspace").arg(self.root()).args(args);
        cmd.output().expect("run lrefactor").into()
    }

    /// Run `lrefactor <args...>` from inside the workspace with the default `--workspace .`.
    pub fn run_in_root(&self, args: &[&str]) -> RunResult {
        let mut cmd = self.command();
        cmd.current_dir(self.root()).args(args);
        cmd.output().expect("run lrefactor").into()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_lrefactor"));
        cmd.env("XDG_CONFIG_HOME", self.temp.path().join("xdg"))
            .env("LREFACTOR_LOG", "off")
            .env_remove("LREFACTOR_LM_COMMAND");
        cmd
    }

    /// Run a command that must succeed and parse its stdout as JSON.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let result = self.run(args);
        assert!(result.success, "lrefactor {args:?} failed: {}", result.stderr);
        serde_json::from_str(&result.stdout).expect("parse lrefactor JSON output")
    }
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    fs::write(path, contents).expect("write file");
}

pub fn path_arg(path: &Path) -> &str {
    path.to_str().expect("utf-8 path")
}
