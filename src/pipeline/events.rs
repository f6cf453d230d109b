use std::path::PathBuf;

/// Messages sent from a run to a CLI or other consumer for live display.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Manager discovery finished and tasks were scheduled
    ScanStarted {
        managers: usize,
        clients: usize,
        total_tasks: usize,
    },
    /// A manager x client task finished
    TaskCompleted {
        manager: String,
        client: String,
        matched: usize,
        /// Percentage of tasks completed, 0 to 100
        progress: f64,
    },
    /// A task failed; it still counts toward progress
    TaskFailed {
        manager: String,
        client: String,
        error: String,
        progress: f64,
    },
    /// All tasks finished (or the run was cancelled)
    ScanFinished {
        total_records: usize,
        cancelled: bool,
    },
    /// CSV and ZIP written for a client
    ClientExported {
        client: String,
        csv_path: PathBuf,
        rows: usize,
    },
    /// Nothing matched for a client; no files written
    ClientEmpty {
        client: String,
    },
    /// Writing a client's CSV or ZIP failed
    ExportFailed {
        client: String,
        error: String,
    },
}
