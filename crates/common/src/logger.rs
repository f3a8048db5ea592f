//! File-based logging for the wall canvas. Each run writes its messages to
//! `<base>/logs/{run_metadata}/log`, where `<base>` defaults to `~/.memorywall`.

use anyhow::{Context, Result};
use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Logger backing the `log` facade for the canvas crates.
pub struct WallLogger {
    level: LevelFilter,
    file: Arc<Mutex<File>>,
    run_id: String,
    log_path: PathBuf,
}

impl WallLogger {
    /// Create a new logger rooted at `base_dir`.
    ///
    /// This will create a log file at `<base_dir>/logs/{timestamp}_{uuid}/log`
    /// where `{timestamp}` is the current local time and `{uuid}` is a unique
    /// identifier for this run.
    pub fn new(level: LevelFilter, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let uuid_string = Uuid::new_v4().to_string();
        let uuid = uuid_string.split('-').next().unwrap_or("unknown");
        let run_id = format!("{timestamp}_{uuid}");

        let log_dir = base_dir.into().join("logs").join(&run_id);
        create_dir_all(&log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

        let log_path = log_dir.join("log");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

        Ok(Self {
            level,
            file: Arc::new(Mutex::new(file)),
            run_id,
            log_path,
        })
    }

    /// The default base directory, `~/.memorywall`.
    pub fn default_base_dir() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(".memorywall"))
    }

    /// Install a logger rooted at the default base directory as the global
    /// `log` backend. Returns the path of the log file for this run.
    pub fn init(level: LevelFilter) -> Result<PathBuf> {
        Self::init_at(level, Self::default_base_dir()?)
    }

    /// Install a logger rooted at `base_dir` as the global `log` backend.
    pub fn init_at(level: LevelFilter, base_dir: impl Into<PathBuf>) -> Result<PathBuf> {
        let logger = Self::new(level, base_dir)?;
        let run_id = logger.run_id.clone();
        let log_path = logger.log_path.clone();

        log::set_boxed_logger(Box::new(logger))
            .map(|()| log::set_max_level(level))
            .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))?;

        log::info!("Wall canvas logger initialized. Run ID: {}", run_id);
        log::info!("Log file: {}", log_path.display());
        Ok(log_path)
    }

    /// Unique identifier for this run.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Path of the log file this logger writes to.
    pub fn log_path(&self) -> &PathBuf {
        &self.log_path
    }
}

impl Log for WallLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string();
            let level = record.level();
            let target = record.target();
            let message = format!("{} {} [{}] {}", timestamp, level, target, record.args());

            if let Ok(mut file) = self.file.lock() {
                // Ignore write errors; logging must never take the canvas down
                let _ = writeln!(file, "{}", message);
                let _ = file.flush();
            }

            // Also print to stderr for visibility during development
            eprintln!("{}", message);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Creates a log entry that separates sections in the log file.
///
/// Useful for marking the beginning of a new operation or task.
pub fn log_section(name: &str) {
    let separator = "=".repeat(50);
    log::info!("{}", separator);
    log::info!("SECTION: {}", name);
    log::info!("{}", separator);
}
