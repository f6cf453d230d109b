use std::path::PathBuf;
use std::time::Duration;
use serde::Serialize;
use crate::models::{ResultSet, ScanRequest};
use crate::reporting::ClientExport;
use crate::scan::TaskWarning;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub request: ScanRequest,
    pub output_dir: PathBuf,
}

impl PipelineConfig {
    pub fn new(request: ScanRequest, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            request,
            output_dir: output_dir.into(),
        }
    }
}

/// A client whose CSV or ZIP could not be written.
#[derive(Debug, Clone, Serialize)]
pub struct ExportFailure {
    pub client: String,
    pub error: String,
}

/// Everything a caller needs to report on a finished run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub results: ResultSet,
    pub exports: Vec<ClientExport>,
    /// Requested clients that matched nothing. Distinct from failures.
    pub zero_result_clients: Vec<String>,
    pub task_warnings: Vec<TaskWarning>,
    pub export_failures: Vec<ExportFailure>,
    pub managers_scanned: usize,
    pub total_tasks: usize,
    pub cancelled: bool,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn total_records(&self) -> usize {
        self.results.total_records()
    }

    /// True when every task and every export succeeded.
    pub fn is_clean(&self) -> bool {
        !self.cancelled && self.task_warnings.is_empty() && self.export_failures.is_empty()
    }
}
