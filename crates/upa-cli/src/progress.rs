use colored::*;
use console::{style, Term};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io;
use std::path::Path;
use std::process;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use upa_core::error::EXIT_ABNORMAL;
use upa_core::{BatchResult, Confirm, OperationOutcome, ProgressObserver};

use crate::logging::ConsoleSettings;

/// The bar currently on screen, shared with the log writer.
pub type ProgressSlot = Arc<Mutex<Option<ProgressBar>>>;

const PROGRESS_BAR_WIDTH: usize = 42;

/// Console side of a task: progress bar, confirmation prompt and the
/// fatal/abnormal exits.
///
/// Every log line and every prompt first takes the bar off the screen.
pub struct ConsoleReporter {
    settings: ConsoleSettings,
    bar: ProgressSlot,
    log_guard: Mutex<Option<WorkerGuard>>,
}

impl ConsoleReporter {
    pub fn new(settings: ConsoleSettings) -> Self {
        Self {
            settings,
            bar: Arc::new(Mutex::new(None)),
            log_guard: Mutex::new(None),
        }
    }

    /// Keep the file log writer alive until [`ConsoleReporter::exit`].
    pub fn attach_log_guard(&self, guard: Option<WorkerGuard>) {
        if let Ok(mut slot) = self.log_guard.lock() {
            *slot = guard;
        }
    }

    /// Flush the file log and terminate with `code`.
    pub fn exit(&self, code: i32) -> ! {
        self.clear_progress();
        if let Ok(mut slot) = self.log_guard.lock() {
            slot.take();
        }
        process::exit(code)
    }

    pub fn slot(&self) -> ProgressSlot {
        self.bar.clone()
    }

    fn bar_enabled(&self) -> bool {
        self.settings.progress && !self.settings.is_quiet()
    }

    fn new_bar() -> ProgressBar {
        let pb = ProgressBar::with_draw_target(Some(1000), ProgressDrawTarget::stdout());
        pb.set_style(
            ProgressStyle::with_template(&format!("[{{bar:{}}}] {{msg}}", PROGRESS_BAR_WIDTH))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#."),
        );
        pb
    }

    /// Draw the bar at `fraction` (clamped to 0..=1). A final line stays on
    /// screen and is no longer tracked as visible.
    pub fn draw_progress(&self, fraction: f64, final_line: bool) {
        if !self.bar_enabled() {
            return;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        let pb = guard.get_or_insert_with(Self::new_bar);
        pb.set_position((fraction * 1000.0).round() as u64);
        pb.set_message(format!("{:5.1}%", fraction * 100.0));
        if final_line {
            pb.finish();
            guard.take();
        }
    }

    pub fn clear_progress(&self) {
        let pb = self.bar.lock().ok().and_then(|mut guard| guard.take());
        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
    }

    /// Report a fatal error and terminate.
    pub fn fatal(&self, message: &str, code: i32) -> ! {
        self.clear_progress();
        error!("Fatal Error: {}", message);
        self.exit(code)
    }

    /// Report an abnormal exit on the critical channel and terminate.
    pub fn abnormal_exit(&self, message: &str, code: i32) -> ! {
        self.clear_progress();
        error!("{}", message);
        self.exit(code)
    }
}

/// Reading of a confirmation answer; `None` for unrecognized input.
pub fn parse_answer(input: &str) -> Option<bool> {
    let token = input.split_whitespace().next().unwrap_or("");
    match token.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('y') => Some(true),
        Some('n') => Some(false),
        _ => None,
    }
}

impl Confirm for ConsoleReporter {
    fn confirm(&self, message: &str) -> bool {
        if self.settings.is_quiet() {
            self.fatal("required confirmation in quiet mode", EXIT_ABNORMAL);
        }
        self.clear_progress();

        let term = Term::stdout();
        let _ = term.write_str(&format!("{} [y/n] ", style(message).bold()));

        let mut input = String::new();
        if let Err(err) = io::stdin().read_line(&mut input) {
            warn!("Reading confirmation failed: {}", err);
            return false;
        }
        match parse_answer(&input) {
            Some(answer) => answer,
            None => {
                warn!("Unknown input \"{}\" - assuming no", input.trim());
                false
            }
        }
    }
}

impl ProgressObserver for ConsoleReporter {
    fn on_batch_start(&self, _total: usize) {
        self.draw_progress(0.0, false);
    }

    fn on_file_start(&self, pos: usize, total: usize, _source: &Path) {
        self.draw_progress((pos - 1) as f64 / total as f64, false);
    }

    fn on_file_done(&self, pos: usize, total: usize, source: &Path, outcome: &OperationOutcome) {
        if outcome.is_failure() {
            debug!("{:?} \"{}\"", outcome, source.display());
        }
        self.draw_progress(pos as f64 / total as f64, false);
    }

    fn on_retry_start(&self, _failed: usize) {
        self.clear_progress();
    }

    fn on_batch_done(&self, result: &BatchResult) {
        if result.is_complete() && result.total > 0 {
            self.draw_progress(1.0, true);
        } else {
            self.clear_progress();
        }
        if !result.skipped.is_empty() {
            info!(
                "{} file(s) skipped",
                format!("{}", result.skipped.len()).yellow()
            );
        }
        for (path, outcome) in &result.failed {
            warn!("{:?} \"{}\"", outcome, path.display());
        }
        info!(
            "{} completed ({} of {} file(s) {})!",
            result.kind.action(),
            format!("{}", result.succeeded).green(),
            result.total,
            result.kind.past(),
        );
    }
}
