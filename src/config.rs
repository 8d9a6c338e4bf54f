//! Tool configuration.
//!
//! Config lives in the workspace at `.legacy-refactor/config.json`. When the
//! workspace has none, the user-level file under the platform config
//! directory is used, and failing that the built-in defaults.
use crate::paths::WorkspacePaths;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_MAX_INPUT_TOKENS: u64 = 100_000;
pub const DEFAULT_CHARS_PER_TOKEN: u64 = 3;
pub const LM_COMMAND_ENV: &str = "LREFACTOR_LM_COMMAND";
pub const DEFAULT_LM_COMMAND: &str = "claude --print";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    pub schema_version: u32,
    /// Command used for analyze and plan (and start, unless overridden).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lm_command: Option<String>,
    /// Faster command for the interactive start stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_lm_command: Option<String>,
    #[serde(default = "default_max_input_tokens")]
    pub max_input_tokens: u64,
    /// Characters assumed per token when converting the ceiling to a budget.
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: u64,
}

fn default_max_input_tokens() -> u64 {
    DEFAULT_MAX_INPUT_TOKENS
}

fn default_chars_per_token() -> u64 {
    DEFAULT_CHARS_PER_TOKEN
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION,
            lm_command: None,
            start_lm_command: None,
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
            chars_per_token: DEFAULT_CHARS_PER_TOKEN,
        }
    }
}

impl ToolConfig {
    /// Character budget for assembled context, optionally overriding the token ceiling.
    pub fn char_budget(&self, max_tokens_override: Option<u64>) -> usize {
        crate::context::char_budget(
            max_tokens_override.unwrap_or(self.max_input_tokens),
            self.chars_per_token,
        )
    }
}

/// Where the effective config came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigSource {
    Workspace { path: PathBuf },
    User { path: PathBuf },
    Defaults,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ToolConfig,
    pub source: ConfigSource,
}

pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("legacy-refactor").join("config.json"))
}

/// Load and validate the effective config for a workspace.
pub fn load_effective(paths: &WorkspacePaths) -> Result<LoadedConfig> {
    let workspace_path = paths.config_path();
    if workspace_path.is_file() {
        let config = load_config(&workspace_path)?;
        return Ok(LoadedConfig {
            config,
            source: ConfigSource::Workspace {
                path: workspace_path,
            },
        });
    }
    if let Some(user_path) = user_config_path().filter(|path| path.is_file()) {
        let config = load_config(&user_path)?;
        return Ok(LoadedConfig {
            config,
            source: ConfigSource::User { path: user_path },
        });
    }
    Ok(LoadedConfig {
        config: ToolConfig::default(),
        source: ConfigSource::Defaults,
    })
}

pub fn load_config(path: &Path) -> Result<ToolConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: ToolConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    validate_config(&config).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

/// Persist a config to disk in a stable JSON format.
pub fn write_config(path: &Path, config: &ToolConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(config).context("serialize config")?;
    fs::write(path, text.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn validate_config(config: &ToolConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if config.max_input_tokens == 0 {
        return Err(anyhow!("max_input_tokens must be greater than zero"));
    }
    if config.chars_per_token == 0 {
        return Err(anyhow!("chars_per_token must be greater than zero"));
    }
    for (field, value) in [
        ("lm_command", &config.lm_command),
        ("start_lm_command", &config.start_lm_command),
    ] {
        if value.as_deref().is_some_and(|command| command.trim().is_empty()) {
            return Err(anyhow!("{field} must be non-empty when set"));
        }
    }
    Ok(())
}

/// Which configured command a stage uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LmPurpose {
    Quality,
    Speed,
}

/// Resolve the LM command: flag, then config, then environment, then default.
pub fn resolve_lm_command(flag: Option<&str>, config: &ToolConfig, purpose: LmPurpose) -> String {
    if let Some(command) = flag.map(str::trim).filter(|value| !value.is_empty()) {
        return command.to_string();
    }
    let configured = match purpose {
        LmPurpose::Speed => config
            .start_lm_command
            .as_deref()
            .or(config.lm_command.as_deref()),
        LmPurpose::Quality => config.lm_command.as_deref(),
    };
    if let Some(command) = configured {
        return command.to_string();
    }
    if let Ok(command) = env::var(LM_COMMAND_ENV) {
        if !command.trim().is_empty() {
            return command;
        }
    }
    DEFAULT_LM_COMMAND.to_string()
}
