use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use crate::audit::{ActivityEntry, ActivitySink};
use crate::errors::FinderError;
use crate::reporting::{ClientExport, Exporter};
use crate::scan::{ProgressCallback, ScanCoordinator};
use super::events::PipelineEvent;
use super::state::{ExportFailure, PipelineConfig, RunSummary};

/// Runs a scan, exports each client's matches and records the activity.
///
/// This is the single entry point shared by every front end. The activity
/// sink is supplied by the caller; nothing here touches global logging state
/// beyond `tracing` diagnostics.
pub struct FinderPipeline {
    config: PipelineConfig,
    activity: Arc<dyn ActivitySink>,
    cancel_token: CancellationToken,
    event_tx: Option<mpsc::UnboundedSender<PipelineEvent>>,
    progress: Option<ProgressCallback>,
}

impl FinderPipeline {
    pub fn new(config: PipelineConfig, activity: Arc<dyn ActivitySink>) -> Self {
        Self {
            config,
            activity,
            cancel_token: CancellationToken::new(),
            event_tx: None,
            progress: None,
        }
    }

    /// Replace the pipeline's cancel token with an external one (e.g. wired to Ctrl-C).
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    /// Attach an event channel for streaming progress to a CLI or other consumer.
    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Called with the completed percentage after every scan task.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    fn emit(&self, event: PipelineEvent) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }

    pub async fn run(mut self) -> Result<RunSummary, FinderError> {
        let start = Instant::now();
        let request = &self.config.request;
        info!(
            base_dir = %request.base_dir.display(),
            output_dir = %self.config.output_dir.display(),
            year = %request.year_label(),
            month = %request.month_label(),
            clients = request.clients.len(),
            types = %request.types.join(","),
            "Statement finder run started"
        );

        let mut coordinator = ScanCoordinator::new(request.clone())
            .with_cancel_token(self.cancel_token.clone());
        if let Some(ref tx) = self.event_tx {
            coordinator = coordinator.with_event_channel(tx.clone());
        }
        if let Some(callback) = self.progress.take() {
            coordinator = coordinator.with_progress(callback);
        }
        let outcome = coordinator.run().await?;

        let mut summary = RunSummary {
            zero_result_clients: outcome.results.empty_clients(),
            results: outcome.results,
            exports: Vec::new(),
            task_warnings: outcome.warnings,
            export_failures: Vec::new(),
            managers_scanned: outcome.managers.len(),
            total_tasks: outcome.total_tasks,
            cancelled: outcome.cancelled,
            elapsed: start.elapsed(),
        };

        if summary.cancelled {
            warn!("Run cancelled, skipping export");
            return Ok(summary);
        }

        let exporter = Exporter::new(&self.config.output_dir, &self.config.request);
        // csv path -> client that owns it; later clients never overwrite
        let mut claimed: HashMap<PathBuf, String> = HashMap::new();
        for (client, records) in summary.results.iter() {
            if records.is_empty() {
                info!(client = %client, "No statements matched");
                self.emit(PipelineEvent::ClientEmpty {
                    client: client.to_string(),
                });
                continue;
            }

            let (csv_path, _) = exporter.paths_for(client);
            if let Some(owner) = claimed.get(&csv_path) {
                let err = FinderError::export(
                    client,
                    format!(
                        "output name {} is already used by client '{}'",
                        csv_path.display(),
                        owner
                    ),
                );
                summary.export_failures.push(self.export_failed(client, err));
                continue;
            }
            claimed.insert(csv_path, client.to_string());

            match self.export_client(&exporter, client, records.to_vec()).await {
                Ok(export) => {
                    self.record_activity(&export).await;
                    self.emit(PipelineEvent::ClientExported {
                        client: export.client.clone(),
                        csv_path: export.csv_path.clone(),
                        rows: export.rows,
                    });
                    summary.exports.push(export);
                }
                Err(e) => summary.export_failures.push(self.export_failed(client, e)),
            }
        }

        summary.elapsed = start.elapsed();
        info!(
            records = summary.total_records(),
            exports = summary.exports.len(),
            empty = summary.zero_result_clients.len(),
            task_warnings = summary.task_warnings.len(),
            export_failures = summary.export_failures.len(),
            duration_ms = summary.elapsed.as_millis() as u64,
            "Statement finder run completed"
        );
        Ok(summary)
    }

    async fn export_client(
        &self,
        exporter: &Exporter,
        client: &str,
        records: Vec<crate::models::StatementRecord>,
    ) -> Result<ClientExport, FinderError> {
        let exporter = exporter.clone();
        let owned_client = client.to_string();
        tokio::task::spawn_blocking(move || exporter.export_client(&owned_client, &records))
            .await
            .map_err(|e| FinderError::export(client, format!("export task panicked: {e}")))?
    }

    fn export_failed(&self, client: &str, err: FinderError) -> ExportFailure {
        let class = err.classify();
        warn!(
            client = %client,
            error_type = class.error_type,
            recoverable = class.recoverable,
            error = %err,
            "Client export failed"
        );
        self.emit(PipelineEvent::ExportFailed {
            client: client.to_string(),
            error: err.to_string(),
        });
        ExportFailure {
            client: client.to_string(),
            error: err.to_string(),
        }
    }

    async fn record_activity(&self, export: &ClientExport) {
        let entry = ActivityEntry::new(&self.config.request, &export.client, &export.csv_path);
        if let Err(e) = self.activity.record(&entry).await {
            warn!(client = %export.client, error = %e, "Failed to write activity log entry");
        }
    }
}
