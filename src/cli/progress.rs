use indicatif::{ProgressBar, ProgressStyle};
use console::style;
use statement_finder::pipeline::PipelineEvent;
use statement_finder::utils::formatting::{client_display, format_duration};

/// Renders scan progress from pipeline events.
pub struct FindProgress {
    bar: ProgressBar,
    failed_tasks: usize,
    start_time: std::time::Instant,
}

impl FindProgress {
    pub fn new(hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new_spinner()
        };
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {msg}")
                .unwrap()
        );
        bar.set_message("Discovering managers...");
        bar.enable_steady_tick(std::time::Duration::from_millis(120));

        Self {
            bar,
            failed_tasks: 0,
            start_time: std::time::Instant::now(),
        }
    }

    /// Handle a pipeline event and update the bar accordingly.
    pub fn handle_event(&mut self, event: &PipelineEvent) {
        match event {
            PipelineEvent::ScanStarted { managers, clients, total_tasks } => {
                self.bar.set_length(*total_tasks as u64);
                self.bar.set_style(
                    ProgressStyle::default_bar()
                        .template("  {bar:30.cyan/dark_gray} {pos}/{len} tasks | {msg}")
                        .unwrap()
                        .progress_chars("█▓░")
                );
                self.bar.set_message(format!("{} managers x {} clients", managers, clients));
            }
            PipelineEvent::TaskCompleted { manager, client, matched, progress } => {
                self.bar.inc(1);
                self.bar.set_message(format!(
                    "{:.0}% | {} / {}: {} matched",
                    progress, manager, client_display(client), matched,
                ));
            }
            PipelineEvent::TaskFailed { manager, client, error, .. } => {
                self.failed_tasks += 1;
                self.bar.inc(1);
                self.bar.println(format!(
                    "  {} {} / {}: {}",
                    style("⚠").yellow(), manager, client_display(client), error,
                ));
            }
            PipelineEvent::ScanFinished { total_records, cancelled } => {
                let elapsed = format_duration(self.start_time.elapsed().as_millis() as u64);
                if *cancelled {
                    self.bar.abandon_with_message(format!("Cancelled after {}", elapsed));
                } else {
                    self.bar.finish_with_message(format!(
                        "Scan complete: {} records | {} failed tasks | {}",
                        total_records, self.failed_tasks, elapsed,
                    ));
                }
            }
            PipelineEvent::ExportFailed { client, error } => {
                self.bar.println(format!(
                    "  {} export for {} failed: {}",
                    style("✗").red(), client_display(client), error,
                ));
            }
            PipelineEvent::ClientExported { .. } | PipelineEvent::ClientEmpty { .. } => {}
        }
    }

    pub fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
