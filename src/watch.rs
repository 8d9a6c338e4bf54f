//! Filesystem watcher for the `docs/` artifact tree.
//!
//! Create, modify and remove events under `docs/` become a single refresh
//! signal per debounce window. Signals carry no payload; listeners re-read
//! everything they show.
use crate::paths::WorkspacePaths;
use crate::tree::RefreshHandle;
use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Result of waiting for filesystem activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpOutcome {
    /// Relevant changes were seen and a refresh signal was sent.
    Refreshed,
    /// Nothing relevant happened before the timeout.
    Idle,
    /// The watcher backend shut down.
    Closed,
}

/// Watches `docs/` and fires a [`RefreshHandle`] when artifacts change.
///
/// The watcher must be kept alive (not dropped) for events to continue.
pub struct RefreshTrigger {
    watcher: RecommendedWatcher,
    events: mpsc::Receiver<notify::Result<Event>>,
    docs_root: PathBuf,
    docs_watched: bool,
    debounce: Duration,
    handle: RefreshHandle,
}

impl RefreshTrigger {
    /// Start watching the docs tree of `paths`.
    ///
    /// The workspace root is also watched non-recursively so that `docs/`
    /// is picked up when it is created (or re-created) later.
    pub fn start(paths: &WorkspacePaths, handle: RefreshHandle) -> Result<Self> {
        let (tx, events) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
            let _ = tx.send(result);
        })
        .context("create filesystem watcher")?;
        watcher
            .watch(paths.root(), RecursiveMode::NonRecursive)
            .with_context(|| format!("watch {}", paths.root().display()))?;

        let mut trigger = Self {
            watcher,
            events,
            docs_root: paths.docs_dir(),
            docs_watched: false,
            debounce: DEFAULT_DEBOUNCE,
            handle,
        };
        if !trigger.attach_docs()? {
            tracing::info!(
                dir = %paths.root().display(),
                "docs directory missing; waiting for it to appear"
            );
        }
        Ok(trigger)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Wait up to `timeout` for events, coalescing a burst into one refresh.
    pub fn pump(&mut self, timeout: Duration) -> Result<PumpOutcome> {
        let first = match self.events.recv_timeout(timeout) {
            Ok(event) => event,
            Err(mpsc::RecvTimeoutError::Timeout) => return Ok(PumpOutcome::Idle),
            Err(mpsc::RecvTimeoutError::Disconnected) => return Ok(PumpOutcome::Closed),
        };

        let mut relevant = self.consider(first)?;
        loop {
            match self.events.recv_timeout(self.debounce) {
                Ok(event) => relevant |= self.consider(event)?,
                Err(mpsc::RecvTimeoutError::Timeout) => break,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }

        if relevant {
            self.handle.refresh();
            Ok(PumpOutcome::Refreshed)
        } else {
            Ok(PumpOutcome::Idle)
        }
    }

    fn consider(&mut self, result: notify::Result<Event>) -> Result<bool> {
        let event = match result {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(error = %err, "docs watcher error");
                return Ok(false);
            }
        };
        if self.docs_watched && !self.docs_root.is_dir() {
            let _ = self.watcher.unwatch(&self.docs_root);
            self.docs_watched = false;
            tracing::info!(dir = %self.docs_root.display(), "docs directory removed");
        }
        if !self.docs_watched && self.docs_root.is_dir() && self.attach_docs()? {
            // Files created together with the directory produce no events of their own.
            return Ok(true);
        }
        let relevant = is_relevant_event(&event, &self.docs_root);
        if relevant {
            tracing::debug!(paths = ?event.paths, kind = ?event.kind, "docs watcher event");
        }
        Ok(relevant)
    }

    fn attach_docs(&mut self) -> Result<bool> {
        if self.docs_watched || !self.docs_root.is_dir() {
            return Ok(self.docs_watched);
        }
        self.watcher
            .watch(&self.docs_root, RecursiveMode::Recursive)
            .with_context(|| format!("watch {}", self.docs_root.display()))?;
        self.docs_watched = true;
        tracing::info!(dir = %self.docs_root.display(), "watching docs directory");
        Ok(true)
    }
}

/// Whether `event` is an artifact change under `docs_root`.
pub fn is_relevant_event(event: &Event, docs_root: &Path) -> bool {
    let kind_matches = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    kind_matches && event.paths.iter().any(|path| path.starts_with(docs_root))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{refresh_channel, RefreshSignal};
    use notify::event::{AccessKind, CreateKind, ModifyKind, RemoveKind};
    use std::fs;
    use tempfile::TempDir;

    const WAIT: Duration = Duration::from_secs(5);
    const QUIET: Duration = Duration::from_millis(500);

    struct Watched {
        _temp: TempDir,
        paths: WorkspacePaths,
        trigger: RefreshTrigger,
        signals: mpsc::Receiver<RefreshSignal>,
    }

    fn watch_workspace(with_docs: bool) -> Watched {
        let temp = TempDir::new().expect("temp dir");
        // notify reports canonical paths.
        let root = temp.path().canonicalize().expect("canonical root");
        let paths = WorkspacePaths::new(root);
        if with_docs {
            fs::create_dir_all(paths.project_docs_dir("Alpha")).expect("create docs");
        }
        let (handle, signals) = refresh_channel();
        let trigger = RefreshTrigger::start(&paths, handle)
            .expect("start watcher")
            .with_debounce(Duration::from_millis(100));
        Watched {
            _temp: temp,
            paths,
            trigger,
            signals,
        }
    }

    fn drain(signals: &mpsc::Receiver<RefreshSignal>) -> usize {
        signals.try_iter().count()
    }

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn artifact_changes_under_docs_are_relevant() {
        let docs = Path::new("/ws/docs");
        assert!(is_relevant_event(
            &event(EventKind::Create(CreateKind::File), "/ws/docs/Alpha/analysis-report.md"),
            docs
        ));
        assert!(is_relevant_event(
            &event(EventKind::Modify(ModifyKind::Any), "/ws/docs/Alpha/.migration-progress.json"),
            docs
        ));
        assert!(is_relevant_event(
            &event(EventKind::Remove(RemoveKind::File), "/ws/docs/Alpha/migration-plan.md"),
            docs
        ));
        assert!(is_relevant_event(
            &event(EventKind::Create(CreateKind::Folder), "/ws/docs"),
            docs
        ));
    }

    #[test]
    fn other_paths_and_access_events_are_ignored() {
        let docs = Path::new("/ws/docs");
        assert!(!is_relevant_event(
            &event(EventKind::Create(CreateKind::File), "/ws/legacy-codes/Alpha/A.cs"),
            docs
        ));
        assert!(!is_relevant_event(
            &event(EventKind::Access(AccessKind::Any), "/ws/docs/Alpha/analysis-report.md"),
            docs
        ));
        assert!(!is_relevant_event(
            &event(EventKind::Create(CreateKind::File), "/ws/docs-old/x.md"),
            docs
        ));
    }

    #[test]
    fn docs_created_after_start_triggers_one_refresh() {
        let mut watched = watch_workspace(false);
        fs::create_dir_all(watched.paths.project_docs_dir("Alpha")).expect("create docs");
        fs::write(watched.paths.analysis_report_path("Alpha"), "# Analysis\n").expect("write");

        assert_eq!(watched.trigger.pump(WAIT).expect("pump"), PumpOutcome::Refreshed);
        assert_eq!(drain(&watched.signals), 1);
    }

    #[test]
    fn report_write_under_watched_docs_refreshes() {
        let mut watched = watch_workspace(true);
        fs::write(watched.paths.analysis_report_path("Alpha"), "# Analysis\n").expect("write");
        fs::write(watched.paths.migration_plan_path("Alpha"), "# Plan\n").expect("write");

        assert_eq!(watched.trigger.pump(WAIT).expect("pump"), PumpOutcome::Refreshed);
        assert_eq!(drain(&watched.signals), 1);
    }

    #[test]
    fn source_changes_do_not_refresh() {
        let mut watched = watch_workspace(true);
        let source = watched.paths.project_dir("Alpha").join("A.cs");
        fs::create_dir_all(watched.paths.project_dir("Alpha")).expect("create source dir");
        fs::write(&source, "class A {}").expect("write");

        assert_eq!(watched.trigger.pump(QUIET).expect("pump"), PumpOutcome::Idle);
        assert_eq!(drain(&watched.signals), 0);
    }

    #[test]
    fn removed_docs_is_reattached_when_recreated() {
        let mut watched = watch_workspace(true);
        fs::remove_dir_all(watched.paths.docs_dir()).expect("remove docs");
        assert_eq!(watched.trigger.pump(WAIT).expect("pump"), PumpOutcome::Refreshed);
        assert!(!watched.trigger.docs_watched);

        fs::create_dir_all(watched.paths.project_docs_dir("Beta")).expect("recreate docs");
        fs::write(watched.paths.analysis_report_path("Beta"), "# Analysis\n").expect("write");
        assert_eq!(watched.trigger.pump(WAIT).expect("pump"), PumpOutcome::Refreshed);
        assert!(watched.trigger.docs_watched);
        assert_eq!(drain(&watched.signals), 2);
    }
}
