//! Progress bar and Ctrl+C handling for CLI operations.

use std::sync::atomic::{AtomicBool, Ordering};

use indicatif::{ProgressBar, ProgressStyle};
use smpa::{ProgressAmount, ProgressCallback};

static CANCEL_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Records a Ctrl+C. Returns `true` if one was already pending.
pub fn request_cancel() -> bool {
    CANCEL_REQUESTED.swap(true, Ordering::SeqCst)
}

/// Returns whether Ctrl+C was pressed.
pub fn cancel_requested() -> bool {
    CANCEL_REQUESTED.load(Ordering::SeqCst)
}

/// Progress display fed by library progress notifications.
///
/// Cloning shares the underlying bar, so one clone can be handed to the
/// library while the command keeps another to finish the display.
#[derive(Clone)]
pub struct CliProgress {
    bar: ProgressBar,
    percent: bool,
}

impl CliProgress {
    /// Creates a byte-counting bar for reading `total` archive bytes.
    pub fn bytes(total: u64, quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {wide_msg}",
            ) {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        };
        Self {
            bar,
            percent: false,
        }
    }

    /// Creates a percentage bar for pack and delete operations.
    pub fn percent(quiet: bool) -> Self {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new(100);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {wide_msg}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb
        };
        Self { bar, percent: true }
    }

    /// Finishes the progress display
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Leaves the bar visible with an error message
    pub fn abandon(&self, msg: &str) {
        self.bar.abandon_with_message(msg.to_string());
    }
}

impl ProgressCallback for CliProgress {
    fn on_progress(&mut self, file_name: Option<&str>, amount: ProgressAmount) -> bool {
        if let Some(name) = file_name {
            // Truncate long names
            let display_name = if name.chars().count() > 40 {
                let tail: String = name.chars().rev().take(37).collect::<Vec<_>>().into_iter().rev().collect();
                format!("...{}", tail)
            } else {
                name.to_string()
            };
            self.bar.set_message(display_name);
        }
        // A percentage bar only follows percentages; byte ticks still poll
        // for cancellation.
        match amount {
            ProgressAmount::Bytes(n) if !self.percent => self.bar.inc(n),
            ProgressAmount::Percent(p) if self.percent => self.bar.set_position(u64::from(p)),
            _ => {}
        }
        !cancel_requested()
    }
}
