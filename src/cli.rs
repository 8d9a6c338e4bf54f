//! CLI argument parsing for the migration workflow.
//!
//! Query commands only read the workspace; stage commands each write one
//! artifact under `docs/<project>/`.
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "lrefactor",
    version,
    about = "Track and drive legacy .NET project migrations",
    after_help = "Workflow:\n  import <dir>        Copy a legacy project into legacy-codes/\n  analyze <project>   Write docs/<project>/analysis-report.md\n  plan <project>      Write docs/<project>/migration-plan.md\n  start <project>     Begin or continue the migration\n\nExamples:\n  lrefactor import ~/src/OrderPortal\n  lrefactor analyze OrderPortal --verbose\n  lrefactor tree\n  lrefactor status OrderPortal --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Workspace root containing legacy-codes/ and docs/
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub workspace: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Projects(ProjectsArgs),
    Status(StatusArgs),
    Tree(TreeArgs),
    Context(ContextArgs),
    Report(ReportArgs),
    Watch(WatchArgs),
    Doctor(DoctorArgs),
    Config(ConfigArgs),
    Analyze(AnalyzeArgs),
    Plan(PlanArgs),
    Start(StartArgs),
    Import(ImportArgs),
}

#[derive(Parser, Debug)]
#[command(about = "List projects under legacy-codes/")]
pub struct ProjectsArgs {
    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Show per-stage status for one or all projects")]
pub struct StatusArgs {
    /// Project name (defaults to every project)
    pub project: Option<String>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Print the workflow tree")]
pub struct TreeArgs {
    /// Emit the nested tree snapshot as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Assemble the source context document for a project")]
pub struct ContextArgs {
    pub project: String,

    /// Token ceiling overriding the configured max_input_tokens
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<u64>,

    /// Write the document to a file instead of stdout
    #[arg(long, value_name = "FILE", conflicts_with = "json")]
    pub out: Option<PathBuf>,

    /// Emit the full result (document, files, stats) as JSON
    #[arg(long)]
    pub json: bool,
}

/// Stages that produce a previewable report.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Analyze,
    Plan,
}

#[derive(Parser, Debug)]
#[command(about = "Print the analysis report or migration plan of a project")]
pub struct ReportArgs {
    pub project: String,

    #[arg(value_enum)]
    pub stage: ReportKind,

    /// Print only the report path
    #[arg(long)]
    pub path: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Print the workflow tree and reprint it whenever docs/ changes")]
pub struct WatchArgs {
    /// Emit each tree as a single JSON line
    #[arg(long)]
    pub json: bool,

    /// Quiet period used to coalesce bursts of file events
    #[arg(long, value_name = "MS", default_value_t = 300)]
    pub debounce_ms: u64,
}

#[derive(Parser, Debug)]
#[command(about = "Check that the LM command, Node.js and the .NET SDK are installed")]
pub struct DoctorArgs {
    /// LM command to check instead of the configured one
    #[arg(long, value_name = "CMD")]
    pub lm: Option<String>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Manage the tool configuration")]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a default config to .legacy-refactor/config.json
    Init(ConfigInitArgs),
    /// Print the effective config and where it came from
    Show,
}

#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Overwrite an existing config.json
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Analyze a project's source and write analysis-report.md")]
pub struct AnalyzeArgs {
    pub project: String,

    /// LM command (overrides config and LREFACTOR_LM_COMMAND)
    #[arg(long, value_name = "CMD")]
    pub lm: Option<String>,

    /// Use a saved LM response instead of invoking the LM
    #[arg(long, value_name = "FILE")]
    pub response: Option<PathBuf>,

    /// Token ceiling overriding the configured max_input_tokens
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<u64>,

    /// Emit a verbose transcript of the workflow
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Turn the analysis report into migration-plan.md")]
pub struct PlanArgs {
    pub project: String,

    /// LM command (overrides config and LREFACTOR_LM_COMMAND)
    #[arg(long, value_name = "CMD")]
    pub lm: Option<String>,

    /// Use a saved LM response instead of invoking the LM
    #[arg(long, value_name = "FILE")]
    pub response: Option<PathBuf>,

    /// Emit a verbose transcript of the workflow
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Start or continue migrating a project from its plan")]
pub struct StartArgs {
    pub project: String,

    /// Extra instruction passed to the LM
    #[arg(trailing_var_arg = true)]
    pub instruction: Vec<String>,

    /// LM command (overrides config and LREFACTOR_LM_COMMAND)
    #[arg(long, value_name = "CMD")]
    pub lm: Option<String>,

    /// Use a saved LM response instead of invoking the LM
    #[arg(long, value_name = "FILE")]
    pub response: Option<PathBuf>,

    /// Emit a verbose transcript of the workflow
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Copy a legacy project directory into legacy-codes/")]
pub struct ImportArgs {
    /// Directory to import
    pub source: PathBuf,

    /// Project name (defaults to the directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Replace an existing project with the same name
    #[arg(long)]
    pub force: bool,
}
