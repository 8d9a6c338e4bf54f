//! Local LM client for the stage commands.
//!
//! The LM is any command that reads a prompt on stdin and writes its answer
//! to stdout (`claude --print`, `llm`, `ollama run <model>`, a script). The
//! command line is split with shell-words; no shell is involved.
//!
//! A canned response file can stand in for the command, which keeps the
//! stage commands testable without a model.
//!
//! The command is resolved in priority order:
//! 1. `--lm` CLI flag
//! 2. `start_lm_command` (start only) or `lm_command` in the config
//! 3. `LREFACTOR_LM_COMMAND` environment variable
//! 4. `claude --print`
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Instant;

/// Where a stage gets its LM response from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LmBackend {
    /// Run this command line with the prompt on stdin.
    Command(String),
    /// Read the response from a file instead of calling a model.
    Canned(PathBuf),
}

impl LmBackend {
    pub fn describe(&self) -> String {
        match self {
            LmBackend::Command(command) => format!("LM command `{command}`"),
            LmBackend::Canned(path) => format!("canned response {}", path.display()),
        }
    }
}

/// Send `prompt` to the backend and return its non-empty response text.
pub fn invoke(backend: &LmBackend, prompt: &str) -> Result<String> {
    let response = match backend {
        LmBackend::Command(command) => invoke_lm_command(command, prompt)?,
        LmBackend::Canned(path) => {
            tracing::info!(
                path = %path.display(),
                prompt_bytes = prompt.len(),
                "using canned LM response"
            );
            let bytes =
                fs::read(path).with_context(|| format!("read LM response {}", path.display()))?;
            String::from_utf8(bytes)
                .with_context(|| format!("decode LM response {} as UTF-8", path.display()))?
        }
    };
    if response.trim().is_empty() {
        return Err(anyhow!("{} returned an empty response", backend.describe()));
    }
    Ok(response)
}

/// Invoke the LM command with the given prompt.
fn invoke_lm_command(command: &str, prompt: &str) -> Result<String> {
    let args =
        shell_words::split(command).with_context(|| format!("parse LM command: {command}"))?;

    let Some((program, rest)) = args.split_first() else {
        return Err(anyhow!("LM command is empty"));
    };

    let start = Instant::now();
    let mut child = Command::new(program)
        .args(rest)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("spawn LM command: {program}"))?;

    // Prompts can exceed the pipe buffer; feed stdin while stdout drains.
    let writer = child.stdin.take().map(|mut stdin| {
        let prompt = prompt.to_owned();
        thread::spawn(move || stdin.write_all(prompt.as_bytes()))
    });

    let output = child.wait_with_output().context("wait for LM command")?;
    let elapsed_ms = start.elapsed().as_millis();

    tracing::info!(
        elapsed_ms,
        prompt_bytes = prompt.len(),
        response_bytes = output.stdout.len(),
        "lm invoke complete"
    );

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!(
            "LM command failed with status {}: {}",
            output.status,
            stderr.trim()
        ));
    }
    match writer.map(|handle| handle.join()) {
        None | Some(Ok(Ok(()))) => {}
        Some(Ok(Err(err))) if err.kind() == io::ErrorKind::BrokenPipe => {
            tracing::debug!("LM command exited before reading the whole prompt");
        }
        Some(Ok(Err(err))) => return Err(err).context("write prompt to LM stdin"),
        Some(Err(_)) => return Err(anyhow!("LM stdin writer panicked")),
    }

    String::from_utf8(output.stdout).context("decode LM stdout as UTF-8")
}
