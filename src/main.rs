use anyhow::Result;
use clap::Parser;
use std::env;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod context;
mod paths;
mod prereqs;
mod query;
mod render;
mod scanner;
mod staging;
mod status;
mod templates;
mod tree;
mod watch;
mod workflow;

use cli::{Command, RootArgs};

const LOG_ENV: &str = "LREFACTOR_LOG";
const DEFAULT_LOG_FILTER: &str = "lrefactor=info";

fn main() -> Result<()> {
    init_tracing();
    let args = RootArgs::parse();
    let root = args.workspace.as_path();

    match &args.command {
        Command::Projects(cmd) => query::run_projects(root, cmd),
        Command::Status(cmd) => query::run_status(root, cmd),
        Command::Tree(cmd) => query::run_tree(root, cmd),
        Command::Context(cmd) => query::run_context(root, cmd),
        Command::Report(cmd) => query::run_report(root, cmd),
        Command::Watch(cmd) => query::run_watch(root, cmd),
        Command::Doctor(cmd) => query::run_doctor(root, cmd),
        Command::Config(cmd) => query::run_config(root, &cmd.command),
        Command::Analyze(cmd) => workflow::run_analyze(root, cmd),
        Command::Plan(cmd) => workflow::run_plan(root, cmd),
        Command::Start(cmd) => workflow::run_start(root, cmd),
        Command::Import(cmd) => workflow::run_import(root, cmd),
    }
}

/// Logs go to stderr; stdout carries command output.
fn init_tracing() {
    let filter = env::var(LOG_ENV)
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
