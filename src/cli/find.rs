use std::sync::Arc;
use console::style;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use statement_finder::audit::FileActivityLog;
use statement_finder::config::{self, FinderConfig};
use statement_finder::errors::FinderError;
use statement_finder::models::{split_list, ScanRequest};
use statement_finder::pipeline::{FinderPipeline, PipelineConfig, RunSummary};
use statement_finder::utils::formatting::{client_display, format_duration, pluralize};
use crate::cli::commands::FindArgs;
use crate::cli::progress::FindProgress;

pub async fn handle_find(args: FindArgs, quiet: bool) -> Result<(), FinderError> {
    let file_config = config::load_config(&args.config).await?;
    let (request, output_dir, log_file) = build_request(&args, &file_config);

    info!(
        base_dir = %request.base_dir.display(),
        output_dir = %output_dir.display(),
        log_file = %log_file.display(),
        workers = request.workers,
        "Resolved run settings"
    );

    let cancel_token = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let token = cancel_token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling scan");
                token.cancel();
            }
        }
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let hidden = quiet || args.json;
    let display = tokio::spawn(async move {
        let mut progress = FindProgress::new(hidden);
        while let Some(event) = rx.recv().await {
            progress.handle_event(&event);
        }
        progress.finish();
    });

    let result = FinderPipeline::new(
        PipelineConfig::new(request, output_dir),
        Arc::new(FileActivityLog::new(log_file)),
    )
    .with_cancel_token(cancel_token)
    .with_event_channel(tx)
    .run()
    .await;

    ctrl_c.abort();
    let _ = display.await;
    let summary = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if !quiet {
        print_summary(&summary);
    }

    if summary.cancelled {
        return Err(FinderError::Cancelled);
    }
    Ok(())
}

fn build_request(
    args: &FindArgs,
    file_config: &FinderConfig,
) -> (ScanRequest, std::path::PathBuf, std::path::PathBuf) {
    let base_dir = args.base_dir.clone().unwrap_or_else(|| file_config.base_directory.clone());
    let output_dir = args.output_dir.clone().unwrap_or_else(|| file_config.output_directory.clone());
    let log_file = args.log_file.clone().unwrap_or_else(|| file_config.log_file.clone());

    let request = ScanRequest::new(
        base_dir,
        Some(args.year.clone()),
        Some(args.month.clone()),
        split_list(&args.clients),
        split_list(&args.types),
        args.workers.or(file_config.workers),
    );
    (request, output_dir, log_file)
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!(
        "  {} {} across {} in {}",
        style("Found").bold(),
        pluralize(summary.total_records(), "statement", "statements"),
        pluralize(summary.managers_scanned, "manager", "managers"),
        format_duration(summary.elapsed.as_millis() as u64),
    );

    for export in &summary.exports {
        println!(
            "  {} {:<24} {:>5} rows  {}",
            style("✔").green(),
            client_display(&export.client),
            export.rows,
            style(export.csv_path.display()).dim(),
        );
        if export.skipped_missing > 0 {
            println!(
                "      {} not archived (no longer on disk)",
                pluralize(export.skipped_missing, "file", "files"),
            );
        }
    }

    for client in &summary.zero_result_clients {
        println!(
            "  {} {:<24} no statements found",
            style("-").dim(),
            client_display(client),
        );
    }

    for warning in &summary.task_warnings {
        println!(
            "  {} scan of {} for {} failed: {}",
            style("⚠").yellow(),
            warning.manager,
            client_display(&warning.client),
            warning.message,
        );
    }

    for failure in &summary.export_failures {
        println!(
            "  {} {:<24} export failed: {}",
            style("✗").red(),
            client_display(&failure.client),
            failure.error,
        );
    }
    println!();
}
