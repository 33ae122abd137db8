//! Run history
//!
//! Append-only, human-readable record of batch runs, one line per run:
//! `<timestamp> <marker> <event> <mode> <details>`.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

const INFO_MARKER: &str = "🟢";
const ERROR_MARKER: &str = "🔴";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Error,
}

impl LogLevel {
    fn marker(&self) -> &'static str {
        match self {
            LogLevel::Info => INFO_MARKER,
            LogLevel::Error => ERROR_MARKER,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub mode: Option<String>,
    pub event: String,
    pub details: Option<String>,
}

impl LogEntry {
    fn render(&self) -> String {
        format!(
            "{} {} {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.level.marker(),
            self.event,
            self.mode.as_deref().unwrap_or("*"),
            self.details.as_deref().unwrap_or("")
        )
    }
}

pub struct ActivityLogger {
    log_path: PathBuf,
}

impl ActivityLogger {
    /// Logger writing to `~/.batchrun/activity.log`.
    pub fn new() -> Result<Self> {
        let user_dirs = directories::UserDirs::new()
            .ok_or_else(|| Error::storage("initialization", "could not determine home directory"))?;
        Self::at(user_dirs.home_dir().join(".batchrun").join("activity.log"))
    }

    /// Logger writing to an explicit file; parent directories are created.
    pub fn at(path: impl Into<PathBuf>) -> Result<Self> {
        let log_path = path.into();
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { log_path })
    }

    pub fn path(&self) -> &Path {
        &self.log_path
    }

    pub fn log(
        &self,
        level: LogLevel,
        mode: Option<&str>,
        event: &str,
        details: Option<&str>,
    ) -> Result<()> {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            mode: mode.map(|m| m.to_string()),
            event: event.to_string(),
            details: details.map(|d| d.to_string()),
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(file, "{}", entry.render().trim_end())?;

        Ok(())
    }

    /// Logged lines, newest first.
    pub fn read_logs(&self, mode_filter: Option<&str>, errors_only: bool) -> Result<Vec<String>> {
        if !self.log_path.exists() {
            return Ok(vec![]);
        }

        let file = fs::File::open(&self.log_path)?;
        let reader = BufReader::new(file);
        let mut matching_lines = Vec::new();

        for line in reader.lines() {
            let line = line?;

            if errors_only && !line.contains(ERROR_MARKER) {
                continue;
            }

            if let Some(mode) = mode_filter {
                if !line.split_whitespace().any(|word| word == mode) {
                    continue;
                }
            }

            matching_lines.push(line);
        }

        matching_lines.reverse();
        Ok(matching_lines)
    }

    pub fn info(&self, mode: Option<&str>, event: &str, details: Option<&str>) -> Result<()> {
        self.log(LogLevel::Info, mode, event, details)
    }

    pub fn error(&self, mode: Option<&str>, event: &str, details: Option<&str>) -> Result<()> {
        self.log(LogLevel::Error, mode, event, details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logger() -> (tempfile::TempDir, ActivityLogger) {
        let dir = tempfile::tempdir().unwrap();
        let logger = ActivityLogger::at(dir.path().join("nested").join("activity.log")).unwrap();
        (dir, logger)
    }

    #[test]
    fn missing_log_reads_empty() {
        let (_dir, logger) = logger();
        assert!(logger.read_logs(None, false).unwrap().is_empty());
    }

    #[test]
    fn lines_come_back_newest_first() {
        let (_dir, logger) = logger();
        logger
            .info(Some("settled"), "simulate", Some("succeeded in 12ms"))
            .unwrap();
        logger
            .error(Some("all-or-fail"), "simulate", Some("failed in 3ms"))
            .unwrap();

        let lines = logger.read_logs(None, false).unwrap();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("failed in 3ms"));
        assert!(lines[0].contains(ERROR_MARKER));
        assert!(lines[1].contains("succeeded in 12ms"));
        assert!(lines[1].contains(INFO_MARKER));
    }

    #[test]
    fn filters_by_level_and_mode() {
        let (_dir, logger) = logger();
        logger.info(Some("settled"), "simulate", Some("ok")).unwrap();
        logger.error(Some("all-or-fail"), "simulate", Some("bad")).unwrap();
        logger.info(None, "simulate", None).unwrap();

        let errors = logger.read_logs(None, true).unwrap();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("all-or-fail"));

        let settled = logger.read_logs(Some("settled"), false).unwrap();
        assert_eq!(settled.len(), 1);
        assert!(settled[0].ends_with("ok"));

        let wildcard = logger.read_logs(Some("*"), false).unwrap();
        assert_eq!(wildcard.len(), 1);
    }
}
