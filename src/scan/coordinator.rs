//! Fan-out of manager x client walks over a bounded worker pool.
//!
//! Every task runs its walk on the blocking pool and sends the outcome back
//! over a channel. The coordinator is the only owner of the `ResultSet` and
//! merges outcomes one at a time as they arrive.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use serde::Serialize;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use crate::errors::FinderError;
use crate::models::{ResultSet, ScanRequest, ScanTask, StatementRecord};
use crate::pipeline::events::PipelineEvent;
use super::walker::{walk_manager, WalkFilter};

/// Receives the completed percentage (0 to 100) after every task.
pub type ProgressCallback = Box<dyn FnMut(f64) + Send>;

/// Prefix of administrative/archive manager folders that are never scanned.
const EXCLUDED_MANAGER_PREFIX: &str = "zz";

/// A task that failed without stopping the run.
#[derive(Debug, Clone, Serialize)]
pub struct TaskWarning {
    pub manager: String,
    pub client: String,
    pub error_type: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ScanOutcome {
    pub results: ResultSet,
    pub warnings: Vec<TaskWarning>,
    pub managers: Vec<String>,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub cancelled: bool,
}

struct TaskOutcome {
    task: ScanTask,
    result: Result<Vec<StatementRecord>, FinderError>,
}

/// Manager directories directly under `base_dir`, in name order.
///
/// Folders whose name starts with `zz` (any case) are skipped. Failing to
/// list `base_dir` is the one error that aborts a run.
pub fn discover_managers(base_dir: &Path) -> Result<Vec<PathBuf>, FinderError> {
    let entries = std::fs::read_dir(base_dir).map_err(|source| FinderError::BaseDirectory {
        path: base_dir.to_path_buf(),
        source,
    })?;

    let mut managers: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                warn!(path = %base_dir.display(), error = %e, "Skipping unreadable base directory entry");
                None
            }
        })
        .filter(|path| path.is_dir())
        .filter(|path| {
            path.file_name()
                .map(|n| !n.to_string_lossy().to_lowercase().starts_with(EXCLUDED_MANAGER_PREFIX))
                .unwrap_or(false)
        })
        .collect();
    managers.sort();
    Ok(managers)
}

pub struct ScanCoordinator {
    request: Arc<ScanRequest>,
    cancel_token: CancellationToken,
    event_tx: Option<mpsc::UnboundedSender<PipelineEvent>>,
    progress: Option<ProgressCallback>,
}

impl ScanCoordinator {
    pub fn new(request: ScanRequest) -> Self {
        Self {
            request: Arc::new(request),
            cancel_token: CancellationToken::new(),
            event_tx: None,
            progress: None,
        }
    }

    /// Cancelling the token stops merging; in-flight walks are abandoned and
    /// their late results ignored.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }

    pub async fn run(self) -> Result<ScanOutcome, FinderError> {
        let base_dir = absolute_base_dir(&self.request.base_dir)?;
        let manager_dirs = {
            let base_dir = base_dir.clone();
            tokio::task::spawn_blocking(move || discover_managers(&base_dir))
                .await
                .map_err(|e| FinderError::Internal(format!("Manager discovery panicked: {e}")))??
        };
        self.scan_managers(&base_dir, manager_dirs).await
    }

    /// Walk each of `manager_dirs` once per requested client.
    async fn scan_managers(
        mut self,
        base_dir: &Path,
        manager_dirs: Vec<PathBuf>,
    ) -> Result<ScanOutcome, FinderError> {
        let filter = Arc::new(WalkFilter::from_request(&self.request)?);

        let tasks = build_tasks(&manager_dirs, &self.request.clients);
        let total_tasks = tasks.len();
        let managers: Vec<String> = manager_dirs.iter().map(|p| manager_name(p)).collect();

        info!(
            base_dir = %base_dir.display(),
            managers = managers.len(),
            clients = self.request.clients.len(),
            tasks = total_tasks,
            workers = self.request.workers,
            "Starting statement scan"
        );
        self.emit(PipelineEvent::ScanStarted {
            managers: managers.len(),
            clients: self.request.clients.len(),
            total_tasks,
        });

        let semaphore = Arc::new(Semaphore::new(self.request.workers));
        let (tx, mut rx) = mpsc::unbounded_channel::<TaskOutcome>();

        let handles: Vec<JoinHandle<()>> = tasks
            .into_iter()
            .map(|task| {
                let semaphore = semaphore.clone();
                let filter = filter.clone();
                let tx = tx.clone();
                let cancel = self.cancel_token.clone();
                tokio::spawn(async move {
                    let _permit = tokio::select! {
                        _ = cancel.cancelled() => return,
                        permit = semaphore.acquire_owned() => match permit {
                            Ok(permit) => permit,
                            Err(_) => return,
                        },
                    };
                    let result = run_task(&task, filter).await;
                    let _ = tx.send(TaskOutcome { task, result });
                })
            })
            .collect();
        drop(tx);

        let mut results = ResultSet::new(&self.request.clients);
        let mut warnings = Vec::new();
        let mut completed_tasks = 0usize;
        let mut cancelled = false;

        loop {
            let outcome = tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => {
                    cancelled = true;
                    break;
                }
                outcome = rx.recv() => match outcome {
                    Some(outcome) => outcome,
                    None => break,
                },
            };

            completed_tasks += 1;
            let progress = 100.0 * completed_tasks as f64 / total_tasks.max(1) as f64;
            let TaskOutcome { task, result } = outcome;

            match result {
                Ok(records) => {
                    let matched = records.len();
                    if !results.merge(&task.client, records) {
                        debug!(client = %task.client, "Dropping records for unrequested client");
                    }
                    self.emit(PipelineEvent::TaskCompleted {
                        manager: task.manager.clone(),
                        client: task.client.clone(),
                        matched,
                        progress,
                    });
                }
                Err(e) => {
                    let class = e.classify();
                    warn!(
                        manager = %task.manager,
                        client = %task.client,
                        error_type = class.error_type,
                        error = %e,
                        "Scan task failed"
                    );
                    self.emit(PipelineEvent::TaskFailed {
                        manager: task.manager.clone(),
                        client: task.client.clone(),
                        error: e.to_string(),
                        progress,
                    });
                    warnings.push(TaskWarning {
                        manager: task.manager,
                        client: task.client,
                        error_type: class.error_type,
                        message: e.to_string(),
                    });
                }
            }

            if let Some(callback) = self.progress.as_mut() {
                callback(progress);
            }
        }

        if cancelled {
            info!(completed = completed_tasks, total = total_tasks, "Scan cancelled");
            for handle in &handles {
                handle.abort();
            }
        } else {
            let joined = futures::future::join_all(handles).await;
            for result in joined {
                if let Err(e) = result {
                    error!(error = %e, "Scan task panicked");
                }
            }
        }

        self.emit(PipelineEvent::ScanFinished {
            total_records: results.total_records(),
            cancelled,
        });

        Ok(ScanOutcome {
            results,
            warnings,
            managers,
            total_tasks,
            completed_tasks,
            cancelled,
        })
    }
}

fn build_tasks(manager_dirs: &[PathBuf], clients: &[String]) -> Vec<ScanTask> {
    let mut tasks = Vec::with_capacity(manager_dirs.len() * clients.len());
    for manager_dir in manager_dirs {
        for client in clients {
            tasks.push(ScanTask {
                id: tasks.len(),
                manager: manager_name(manager_dir),
                manager_dir: manager_dir.clone(),
                client: client.clone(),
            });
        }
    }
    tasks
}

async fn run_task(task: &ScanTask, filter: Arc<WalkFilter>) -> Result<Vec<StatementRecord>, FinderError> {
    let manager_dir = task.manager_dir.clone();
    let client = task.client.clone();
    debug!(task = task.id, manager = %task.manager, client = %task.client, "Running scan task");

    let message = match tokio::task::spawn_blocking(move || walk_manager(&manager_dir, &client, &filter)).await {
        Ok(Ok(records)) => return Ok(records),
        Ok(Err(e)) => e.to_string(),
        Err(e) => format!("walker panicked: {e}"),
    };
    Err(FinderError::TaskFailed {
        manager: task.manager.clone(),
        client: task.client.clone(),
        message,
    })
}

fn manager_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn absolute_base_dir(base_dir: &Path) -> Result<PathBuf, FinderError> {
    if base_dir.is_absolute() {
        return Ok(base_dir.to_path_buf());
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(base_dir))
        .map_err(|source| FinderError::BaseDirectory {
            path: base_dir.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    fn request(base: &Path, clients: &[&str], types: &[&str]) -> ScanRequest {
        ScanRequest::new(
            base,
            None,
            None,
            clients.iter().map(|s| s.to_string()).collect(),
            types.iter().map(|s| s.to_string()).collect(),
            Some(4),
        )
    }

    #[test]
    fn test_discover_skips_zz_folders_and_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("Smith")).unwrap();
        std::fs::create_dir_all(dir.path().join("zzArchive")).unwrap();
        std::fs::create_dir_all(dir.path().join("ZZ_old")).unwrap();
        std::fs::create_dir_all(dir.path().join("Adams")).unwrap();
        std::fs::write(dir.path().join("readme.txt"), b"x").unwrap();

        let managers = discover_managers(dir.path()).unwrap();
        let names: Vec<_> = managers.iter().map(|p| manager_name(p)).collect();
        assert_eq!(names, vec!["Adams", "Smith"]);
    }

    #[test]
    fn test_discover_missing_base_is_fatal() {
        let dir = TempDir::new().unwrap();
        let err = discover_managers(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, FinderError::BaseDirectory { .. }));
    }

    #[test]
    fn test_build_tasks_is_cartesian() {
        let managers = vec![PathBuf::from("/b/A"), PathBuf::from("/b/B")];
        let clients = vec!["x".to_string(), "y".to_string(), String::new()];
        let tasks = build_tasks(&managers, &clients);
        assert_eq!(tasks.len(), 6);
        assert_eq!(tasks[5].manager, "B");
        assert_eq!(tasks[5].client, "");
        assert_eq!(tasks[5].id, 5);
    }

    #[tokio::test]
    async fn test_progress_reaches_hundred() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "A/2024/01-January/jones.pdf");
        touch(dir.path(), "B/2024/01-January/smith.pdf");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let outcome = ScanCoordinator::new(request(dir.path(), &["jones", "smith"], &[]))
            .with_progress(Box::new(move |p| sink.lock().unwrap().push(p)))
            .run()
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert!((seen[3] - 100.0).abs() < f64::EPSILON);
        assert_eq!(outcome.total_tasks, 4);
        assert_eq!(outcome.completed_tasks, 4);
        assert_eq!(outcome.results.get("jones").unwrap().len(), 1);
        assert_eq!(outcome.results.get("smith").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_events_stream_task_completion() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "A/2024/01-January/jones.pdf");
        let (tx, mut rx) = mpsc::unbounded_channel();

        ScanCoordinator::new(request(dir.path(), &["jones"], &[]))
            .with_event_channel(tx)
            .run()
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(matches!(events.first(), Some(PipelineEvent::ScanStarted { total_tasks: 1, .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, PipelineEvent::TaskCompleted { matched: 1, .. })));
        assert!(matches!(
            events.last(),
            Some(PipelineEvent::ScanFinished { total_records: 1, cancelled: false })
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_yields_empty_buckets() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "A/2024/01-January/jones.pdf");
        let token = CancellationToken::new();
        token.cancel();

        let outcome = ScanCoordinator::new(request(dir.path(), &["jones"], &[]))
            .with_cancel_token(token)
            .run()
            .await
            .unwrap();

        assert!(outcome.cancelled);
        assert!(outcome.results.contains("jones"));
        assert_eq!(outcome.results.total_records(), 0);
    }

    #[tokio::test]
    async fn test_failed_task_is_reported_and_run_continues() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "A/2024/01-January/jones.pdf");
        touch(dir.path(), "A/2024/01-January/smith.pdf");
        // discovered, then gone before its walk starts
        let managers = vec![dir.path().join("A"), dir.path().join("Gone")];

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let outcome = ScanCoordinator::new(request(dir.path(), &["jones", "smith"], &[]))
            .with_progress(Box::new(move |p| sink.lock().unwrap().push(p)))
            .with_event_channel(tx)
            .scan_managers(dir.path(), managers)
            .await
            .unwrap();

        assert_eq!(outcome.total_tasks, 4);
        assert_eq!(outcome.completed_tasks, 4);
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome.warnings.iter().all(|w| w.manager == "Gone"));
        assert!(outcome.warnings.iter().all(|w| w.error_type == "TaskFailure"));
        assert_eq!(outcome.results.get("jones").unwrap().len(), 1);
        assert_eq!(outcome.results.get("smith").unwrap().len(), 1);
        assert!(outcome.results.iter().flat_map(|(_, r)| r).all(|r| r.manager == "A"));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 4);
        assert!((seen[3] - 100.0).abs() < f64::EPSILON);

        let mut failed_events = 0;
        while let Ok(event) = rx.try_recv() {
            if let PipelineEvent::TaskFailed { manager, .. } = event {
                assert_eq!(manager, "Gone");
                failed_events += 1;
            }
        }
        assert_eq!(failed_events, 2);
    }
}
