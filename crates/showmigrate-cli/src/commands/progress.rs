use indicatif::{ProgressBar, ProgressStyle};
use showmigrate_core::MigrationObserver;
use showmigrate_models::{ShowOutcome, ShowReport, WatchedShow};
use std::io::IsTerminal;

/// Progress bar over the watched catalogue; structured log lines when not on a terminal
pub struct MigrationProgress {
    bar: ProgressBar,
    interactive: bool,
}

impl MigrationProgress {
    pub fn new(show_bar: bool) -> Self {
        let interactive = show_bar && is_interactive();

        let bar = if interactive {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("█▉▊▋▌▍▎▏  "),
            );
            bar.set_message("Reading watch history...");
            bar
        } else {
            tracing::info!(
                operation = "ui_init",
                mode = "non_interactive",
                "Running in non-interactive mode - progress bar disabled, using structured logging"
            );
            ProgressBar::hidden()
        };

        Self { bar, interactive }
    }

    pub fn finish(&self) {
        if self.interactive {
            self.bar.finish_with_message("Done");
        }
    }

    /// Stop drawing without claiming the run completed
    pub fn abandon(&self) {
        if self.interactive {
            self.bar.abandon();
        }
    }
}

impl MigrationObserver for MigrationProgress {
    fn on_catalog(&self, total_shows: usize) {
        self.bar.set_length(total_shows as u64);
        self.bar.set_position(0);
    }

    fn on_show_start(&self, index: usize, show: &WatchedShow) {
        if self.interactive {
            self.bar.set_message(show.display_name());
        } else {
            tracing::debug!(
                operation = "progress",
                current = index + 1,
                show = %show.display_name(),
                "Starting show"
            );
        }
    }

    fn on_show_finish(&self, index: usize, report: &ShowReport) {
        self.bar.inc(1);
        if self.interactive {
            if let ShowOutcome::Failed { reason } = &report.outcome {
                self.bar.println(format!("✗ {}: {}", report.title, reason));
            }
        } else {
            let total = self.bar.length().unwrap_or(0);
            tracing::info!(
                operation = "progress",
                current = index + 1,
                total = total,
                percent = if total > 0 { ((index + 1) as f64 / total as f64 * 100.0) as u8 } else { 100 },
                show = %report.title,
                success = report.outcome.is_success(),
                "Migration progress update"
            );
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
