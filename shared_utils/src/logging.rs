//! Logging setup shared by all tools.
//!
//! Every binary initialises tracing the same way: a compact stderr layer for
//! humans, plus a JSON file layer under the log directory with daily rotation.
//! `RUST_LOG` overrides the default filter.
//!
//! # Examples
//!
//! ```no_run
//! use shared_utils::logging::{LogConfig, init_logging};
//!
//! init_logging("img-jxl", LogConfig::default()).expect("logging init");
//! tracing::info!("started");
//! ```

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory for log files; defaults to the system temp dir.
    pub log_dir: PathBuf,
    /// How many rotated files to keep per tool.
    pub max_files: usize,
    /// Default level when RUST_LOG is unset.
    pub level: Level,
    /// Disable the file layer entirely (stderr only).
    pub stderr_only: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: std::env::temp_dir().join("media-shrink"),
            max_files: 5,
            level: Level::INFO,
            stderr_only: false,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.log_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_max_files(mut self, count: usize) -> Self {
        self.max_files = count;
        self
    }

    pub fn stderr_only(mut self) -> Self {
        self.stderr_only = true;
        self
    }

    /// Verbose flag from the CLI maps straight to DEBUG.
    pub fn from_verbosity(verbose: bool) -> Self {
        if verbose {
            Self::default().with_level(Level::DEBUG)
        } else {
            Self::default()
        }
    }
}

/// Initialise the global subscriber. Call once, early in `main`.
///
/// The file layer writes JSON lines to `{log_dir}/{tool_name}.log` with
/// daily rotation; stale rotations beyond `max_files` are removed.
pub fn init_logging(tool_name: &str, config: LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    if config.stderr_only {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
        return Ok(());
    }

    std::fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", config.log_dir))?;

    let log_file_name = format!("{}.log", tool_name);
    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, &log_file_name);

    let file_layer = fmt::layer()
        .json()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    tracing::debug!(
        tool = tool_name,
        log_dir = ?config.log_dir,
        level = ?config.level,
        "logging initialised"
    );

    cleanup_old_logs(&config.log_dir, tool_name, config.max_files)?;

    Ok(())
}

/// Keep only the most recent `max_files` rotations for one tool.
fn cleanup_old_logs(log_dir: &Path, tool_name: &str, max_files: usize) -> Result<()> {
    let entries = std::fs::read_dir(log_dir)
        .with_context(|| format!("Failed to read log directory: {:?}", log_dir))?;

    let mut log_files: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if !name.starts_with(tool_name) || !name.contains(".log") {
            continue;
        }
        if let Ok(modified) = entry.metadata().and_then(|m| m.modified()) {
            log_files.push((path, modified));
        }
    }

    if log_files.len() > max_files {
        log_files.sort_by(|a, b| b.1.cmp(&a.1));
        for (path, _) in log_files.iter().skip(max_files) {
            if let Err(e) = std::fs::remove_file(path) {
                tracing::warn!(path = ?path, error = %e, "failed to remove old log file");
            }
        }
    }

    Ok(())
}
