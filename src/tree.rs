//! Workflow tree: Project -> Stage -> Progress detail.
//!
//! The model holds only the workspace root. Every `roots`/`children` call goes
//! back to the scanner and the status checker, so a traversal always reflects
//! disk. Presentation layers learn that they should traverse again through a
//! payload-less refresh signal.
use crate::paths::WorkspacePaths;
use crate::scanner::{scan_projects, ProjectInfo};
use crate::status::{check_project_status, report_path, Stage, StageStatus};
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    Project(ProjectInfo),
    Step(StepNode),
    Progress(ProgressNode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepNode {
    pub project_name: String,
    pub stage: Stage,
    pub status: StageStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressNode {
    pub label: String,
    pub status: String,
}

/// Marker value sent when presentation should re-traverse the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSignal;

/// Sending half of the refresh channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<RefreshSignal>,
}

impl RefreshHandle {
    /// Ask listeners to re-traverse. A closed channel is ignored.
    pub fn refresh(&self) {
        if self.tx.send(RefreshSignal).is_err() {
            tracing::debug!("refresh listener gone");
        }
    }
}

pub fn refresh_channel() -> (RefreshHandle, mpsc::Receiver<RefreshSignal>) {
    let (tx, rx) = mpsc::channel();
    (RefreshHandle { tx }, rx)
}

/// Read-only view over the workflow state of every project in a workspace.
#[derive(Debug, Clone)]
pub struct WorkflowTree {
    paths: WorkspacePaths,
}

impl WorkflowTree {
    pub fn new(workspace_root: PathBuf) -> Self {
        Self {
            paths: WorkspacePaths::new(workspace_root),
        }
    }

    /// One node per scanned project, in scanner order.
    pub fn roots(&self) -> Result<Vec<TreeNode>> {
        Ok(scan_projects(self.paths.root())?
            .into_iter()
            .map(TreeNode::Project)
            .collect())
    }

    pub fn children(&self, node: &TreeNode) -> Vec<TreeNode> {
        match node {
            TreeNode::Project(project) => {
                let status = check_project_status(self.paths.root(), &project.name);
                Stage::ALL
                    .iter()
                    .map(|stage| {
                        TreeNode::Step(StepNode {
                            project_name: project.name.clone(),
                            stage: *stage,
                            status: status.stage(*stage),
                        })
                    })
                    .collect()
            }
            TreeNode::Step(step) => self.progress_children(step),
            TreeNode::Progress(_) => Vec::new(),
        }
    }

    fn progress_children(&self, step: &StepNode) -> Vec<TreeNode> {
        if step.stage != Stage::Start || step.status != StageStatus::InProgress {
            return Vec::new();
        }
        let status = check_project_status(self.paths.root(), &step.project_name);
        let Some(progress) = status.progress else {
            return Vec::new();
        };

        let mut nodes = Vec::new();
        if let Some(phase) = progress.current_phase.filter(|phase| !phase.is_empty()) {
            nodes.push(TreeNode::Progress(ProgressNode {
                label: format!("Phase: {phase}"),
                status: String::new(),
            }));
        }
        for feature in progress.features.unwrap_or_default() {
            nodes.push(TreeNode::Progress(ProgressNode {
                label: feature.name,
                status: feature.status,
            }));
        }
        nodes
    }

    /// Walk the whole tree once, producing a nested snapshot.
    pub fn snapshot(&self) -> Result<Vec<TreeSnapshot>> {
        Ok(self
            .roots()?
            .iter()
            .map(|root| self.snapshot_node(root))
            .collect())
    }

    fn snapshot_node(&self, node: &TreeNode) -> TreeSnapshot {
        let children = self
            .children(node)
            .iter()
            .map(|child| self.snapshot_node(child))
            .collect();
        TreeSnapshot {
            item: self.tree_item(node),
            children,
        }
    }

    /// Project a node into what a presentation layer shows for it.
    pub fn tree_item(&self, node: &TreeNode) -> TreeItem {
        match node {
            TreeNode::Project(project) => TreeItem {
                kind: ItemKind::Project,
                label: project.name.clone(),
                status: None,
                expanded: true,
                action: None,
            },
            TreeNode::Step(step) => TreeItem {
                kind: ItemKind::Step,
                label: step.stage.label().to_string(),
                status: Some(step.status),
                expanded: step.stage == Stage::Start && step.status == StageStatus::InProgress,
                action: self.step_action(step),
            },
            TreeNode::Progress(progress) => TreeItem {
                kind: ItemKind::Progress,
                label: if progress.status.is_empty() {
                    progress.label.clone()
                } else {
                    format!("{} - {}", progress.label, progress.status)
                },
                status: None,
                expanded: false,
                action: None,
            },
        }
    }

    fn step_action(&self, step: &StepNode) -> Option<ItemAction> {
        match step.status {
            StageStatus::Pending => Some(ItemAction::RunStage {
                command: format!("lrefactor {} {}", step.stage, step.project_name),
            }),
            StageStatus::Done => report_path(self.paths.root(), &step.project_name, step.stage)
                .map(|path| ItemAction::PreviewReport {
                    path: self.paths.display_relative(&path),
                }),
            StageStatus::InProgress => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Project,
    Step,
    Progress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemAction {
    RunStage { command: String },
    PreviewReport { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeItem {
    pub kind: ItemKind,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StageStatus>,
    pub expanded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ItemAction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeSnapshot {
    #[serde(flatten)]
    pub item: TreeItem,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeSnapshot>,
}
