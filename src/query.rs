//! Read-only commands: projects, status, tree, context, report, watch,
//! doctor, and config.
//!
//! None of these write under `legacy-codes/` or `docs/`.
use crate::cli::{
    ConfigCommand, ConfigInitArgs, ContextArgs, DoctorArgs, ProjectsArgs, ReportArgs, ReportKind,
    StatusArgs, TreeArgs, WatchArgs,
};
use crate::config::{self, LmPurpose, ToolConfig};
use crate::context::{assemble_project_context, ContextOutcome};
use crate::paths::{validate_project_name, WorkspacePaths};
use crate::prereqs::{default_specs, CheckStatus, PrereqProbe};
use crate::render;
use crate::scanner::{find_project, scan_projects, ProjectInfo};
use crate::status::{check_project_status, report_path, read_report, ProjectStatus, Stage};
use crate::staging::publish_text;
use crate::tree::{refresh_channel, TreeSnapshot, WorkflowTree};
use crate::watch::{PumpOutcome, RefreshTrigger};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

fn sorted_projects(root: &Path) -> Result<Vec<ProjectInfo>> {
    let mut projects = scan_projects(root)?;
    projects.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(projects)
}

fn print_json<T: Serialize + ?Sized>(value: &T, what: &str) -> Result<()> {
    let text = serde_json::to_string_pretty(value).with_context(|| format!("serialize {what}"))?;
    println!("{text}");
    Ok(())
}

pub fn run_projects(root: &Path, args: &ProjectsArgs) -> Result<()> {
    let projects = sorted_projects(root)?;
    if args.json {
        return print_json(&projects, "projects");
    }
    if projects.is_empty() {
        eprintln!(
            "no projects under {} (run `lrefactor import <dir>`)",
            WorkspacePaths::new(root.to_path_buf())
                .legacy_codes_dir()
                .display()
        );
    }
    for project in &projects {
        println!("{}", project.name);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ProjectStatusEntry {
    project: String,
    #[serde(flatten)]
    status: ProjectStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    next: Option<String>,
}

pub fn run_status(root: &Path, args: &StatusArgs) -> Result<()> {
    let names: Vec<String> = match &args.project {
        Some(name) => {
            let project = find_project(root, name)?
                .ok_or_else(|| anyhow!("project {name} not found under legacy-codes/"))?;
            vec![project.name]
        }
        None => sorted_projects(root)?
            .into_iter()
            .map(|project| project.name)
            .collect(),
    };

    let entries: Vec<ProjectStatusEntry> = names
        .into_iter()
        .map(|project| {
            let status = check_project_status(root, &project);
            let next = render::next_command(&project, &status);
            ProjectStatusEntry {
                project,
                status,
                next,
            }
        })
        .collect();

    if args.json {
        return print_json(&entries, "status");
    }
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print!(
            "{}",
            render::render_project_status(&entry.project, &entry.status)
        );
    }
    Ok(())
}

fn display_snapshot(tree: &WorkflowTree) -> Result<Vec<TreeSnapshot>> {
    let mut roots = tree.snapshot()?;
    render::sort_roots_for_display(&mut roots);
    Ok(roots)
}

pub fn run_tree(root: &Path, args: &TreeArgs) -> Result<()> {
    let tree = WorkflowTree::new(root.to_path_buf());
    let roots = display_snapshot(&tree)?;
    if args.json {
        return print_json(&roots, "tree");
    }
    print!("{}", render::render_tree(&roots));
    Ok(())
}

pub fn run_context(root: &Path, args: &ContextArgs) -> Result<()> {
    validate_project_name(&args.project)?;
    let paths = WorkspacePaths::new(root.to_path_buf());
    let loaded = config::load_effective(&paths)?;
    let budget = loaded.config.char_budget(args.max_tokens);

    let result = match assemble_project_context(root, &args.project, budget)? {
        ContextOutcome::ProjectMissing { project_dir } => {
            return Err(anyhow!(
                "project {} not found: {} does not exist",
                args.project,
                paths.display_relative(&project_dir)
            ));
        }
        ContextOutcome::NoEligibleFiles { project_dir } => {
            return Err(anyhow!(
                "project {} has no eligible source files in {}",
                args.project,
                paths.display_relative(&project_dir)
            ));
        }
        ContextOutcome::Assembled(result) => result,
    };

    if args.json {
        print_json(&result, "context")?;
    } else if let Some(out) = &args.out {
        publish_text(out, &result.content)?;
        println!("wrote {}", out.display());
    } else {
        print!("{}", result.content);
    }
    eprintln!(
        "context: {} of {} files, {} chars{}",
        result.included_files.len(),
        result.files.len(),
        result.total_chars,
        if result.truncated { " (truncated)" } else { "" }
    );
    Ok(())
}

pub fn run_report(root: &Path, args: &ReportArgs) -> Result<()> {
    validate_project_name(&args.project)?;
    let stage = match args.stage {
        ReportKind::Analyze => Stage::Analyze,
        ReportKind::Plan => Stage::Plan,
    };
    let missing = || {
        anyhow!(
            "no {stage} report for {} (run `lrefactor {stage} {}`)",
            args.project,
            args.project
        )
    };
    if args.path {
        let path = report_path(root, &args.project, stage).ok_or_else(missing)?;
        println!("{}", path.display());
        return Ok(());
    }
    let file_name = stage
        .report_file()
        .ok_or_else(|| anyhow!("stage {stage} produces no report"))?;
    let body = read_report(root, &args.project, file_name).ok_or_else(missing)?;
    print!("{body}");
    if !body.ends_with('\n') {
        println!();
    }
    Ok(())
}

pub fn run_watch(root: &Path, args: &WatchArgs) -> Result<()> {
    let paths = WorkspacePaths::new(root.to_path_buf());
    let tree = WorkflowTree::new(root.to_path_buf());
    let (handle, signals) = refresh_channel();
    let mut trigger = RefreshTrigger::start(&paths, handle)?
        .with_debounce(Duration::from_millis(args.debounce_ms));

    print_watch_frame(&tree, args.json)?;
    loop {
        match trigger.pump(Duration::from_secs(1))? {
            PumpOutcome::Refreshed => {
                // Drain so one burst renders once.
                while signals.try_recv().is_ok() {}
                print_watch_frame(&tree, args.json)?;
            }
            PumpOutcome::Idle => {}
            PumpOutcome::Closed => {
                tracing::warn!("docs watcher closed");
                return Ok(());
            }
        }
    }
}

fn print_watch_frame(tree: &WorkflowTree, json: bool) -> Result<()> {
    let roots = display_snapshot(tree)?;
    if json {
        let line = serde_json::to_string(&roots).context("serialize tree")?;
        println!("{line}");
    } else {
        println!("{}", chrono::Local::now().format("-- %H:%M:%S"));
        print!("{}", render::render_tree(&roots));
    }
    Ok(())
}

pub fn run_doctor(root: &Path, args: &DoctorArgs) -> Result<()> {
    let loaded = config::load_effective(&WorkspacePaths::new(root.to_path_buf()))?;
    let lm_command = config::resolve_lm_command(args.lm.as_deref(), &loaded.config, LmPurpose::Quality);
    let mut probe = PrereqProbe::new();
    let results = probe.run_all(&default_specs(&lm_command));

    if args.json {
        print_json(results, "prerequisites")?;
    } else {
        print!("{}", render::render_prereqs(results));
    }
    let missing = results
        .iter()
        .filter(|result| result.status == CheckStatus::Missing)
        .count();
    if missing > 0 {
        return Err(anyhow!("{missing} prerequisite(s) missing"));
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct ConfigReport<'a> {
    source: &'a config::ConfigSource,
    config: &'a ToolConfig,
    lm_command: String,
    start_lm_command: String,
    char_budget: usize,
}

pub fn run_config(root: &Path, command: &ConfigCommand) -> Result<()> {
    let paths = WorkspacePaths::new(root.to_path_buf());
    match command {
        ConfigCommand::Init(args) => config_init(&paths, args),
        ConfigCommand::Show => {
            let loaded = config::load_effective(&paths)?;
            let report = ConfigReport {
                source: &loaded.source,
                config: &loaded.config,
                lm_command: config::resolve_lm_command(None, &loaded.config, LmPurpose::Quality),
                start_lm_command: config::resolve_lm_command(
                    None,
                    &loaded.config,
                    LmPurpose::Speed,
                ),
                char_budget: loaded.config.char_budget(None),
            };
            print_json(&report, "config")
        }
    }
}

fn config_init(paths: &WorkspacePaths, args: &ConfigInitArgs) -> Result<()> {
    let path = paths.config_path();
    if path.exists() && !args.force {
        return Err(anyhow!(
            "config already exists at {} (pass --force to overwrite)",
            paths.display_relative(&path)
        ));
    }
    config::write_config(&path, &ToolConfig::default())?;
    println!("wrote {}", paths.display_relative(&path));
    Ok(())
}
