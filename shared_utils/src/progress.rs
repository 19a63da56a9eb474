//! Progress bar wrapper shared by the batch tools.
//!
//! One bar per run, drawn on stderr so stdout stays clean for the per-file
//! status lines. Status lines go through [`BatchProgress::println`] which
//! suspends the bar, keeping the two streams readable together.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

pub mod templates {
    pub const BATCH: &str = "{spinner:.green} {prefix:.cyan.bold} ▕{bar:35.green/black}▏ {percent:>3}% • {pos}/{len} • {elapsed_precise} • {msg}";
    pub const PROGRESS_CHARS: &str = "█▓░";
    pub const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
}

pub struct BatchProgress {
    bar: ProgressBar,
    finished: AtomicBool,
}

impl BatchProgress {
    pub fn new(total: u64, prefix: &str) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(templates::BATCH)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars(templates::PROGRESS_CHARS)
                .tick_chars(templates::SPINNER_CHARS),
        );
        bar.set_prefix(prefix.to_string());
        bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(20));
        bar.enable_steady_tick(Duration::from_millis(100));
        Self {
            bar,
            finished: AtomicBool::new(false),
        }
    }

    /// A bar that never draws; used when the caller wants plain output.
    pub fn hidden() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_draw_target(ProgressDrawTarget::hidden());
        Self {
            bar,
            finished: AtomicBool::new(false),
        }
    }

    pub fn inc(&self) {
        self.bar.inc(1);
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        self.bar.set_message(msg.into());
    }

    /// Print a status line to stdout without tearing the bar.
    pub fn println(&self, msg: &str) {
        self.bar.suspend(|| println!("{}", msg));
    }

    /// Run `f` with the bar hidden; used for the interactive overwrite prompt
    /// so the question is the only thing on screen.
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    pub fn finish_with_message(&self, msg: &str) {
        self.finished.store(true, Ordering::Relaxed);
        self.bar.finish_with_message(msg.to_string());
    }

    pub fn finish_and_clear(&self) {
        self.finished.store(true, Ordering::Relaxed);
        self.bar.finish_and_clear();
    }
}

impl Drop for BatchProgress {
    fn drop(&mut self) {
        if !self.finished.load(Ordering::Relaxed) {
            self.bar.finish_and_clear();
        }
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", duration.as_secs_f64())
    }
}
