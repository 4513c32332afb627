//! Append-only operator log.
//!
//! Each entry is one line: `[YYYY-MM-DD HH:MM:SS] [SEVERITY] message`, with
//! local timestamps. Every write is mirrored to `tracing` at the matching
//! level whether or not it clears the sink's minimum severity.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use catsync_core::Severity;
use chrono::{Duration, Local, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(.+?)\] \[([A-Z]+)\] (.*)$").expect("valid regex"));

/// One parsed log line, newest first when returned by [`LogSink::recent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// `None` for lines that do not follow the entry format.
    pub timestamp: Option<String>,
    /// `UNKNOWN` for lines that do not follow the entry format.
    pub severity: String,
    pub message: String,
}

impl LogEntry {
    fn parse(line: &str) -> Self {
        match LINE_RE.captures(line) {
            Some(caps) => Self {
                timestamp: Some(caps[1].to_string()),
                severity: caps[2].to_string(),
                message: caps[3].to_string(),
            },
            None => Self {
                timestamp: None,
                severity: "UNKNOWN".to_string(),
                message: line.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub kept: usize,
    pub removed: usize,
}

pub struct LogSink {
    path: PathBuf,
    min_severity: Severity,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink")
            .field("path", &self.path)
            .field("min_severity", &self.min_severity)
            .finish_non_exhaustive()
    }
}

impl LogSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, min_severity: Severity) -> Self {
        Self {
            path: path.into(),
            min_severity,
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `message` at `severity`.
    ///
    /// Write failures are reported through `tracing` and otherwise ignored;
    /// logging never fails the operation that logs.
    pub async fn log(&self, severity: Severity, message: impl AsRef<str>) {
        let message = message.as_ref();
        match severity {
            Severity::Debug => tracing::debug!(target: "catsync::sink", "{message}"),
            Severity::Info => tracing::info!(target: "catsync::sink", "{message}"),
            Severity::Warning => tracing::warn!(target: "catsync::sink", "{message}"),
            Severity::Error => tracing::error!(target: "catsync::sink", "{message}"),
        }

        if severity < self.min_severity {
            return;
        }

        let line = format_line(&Local::now().naive_local(), severity, message);
        if let Err(e) = self.append(&line).await {
            tracing::error!(path = %self.path.display(), error = %e, "failed to append to log sink");
        }
    }

    pub async fn debug(&self, message: impl AsRef<str>) {
        self.log(Severity::Debug, message).await;
    }

    pub async fn info(&self, message: impl AsRef<str>) {
        self.log(Severity::Info, message).await;
    }

    pub async fn warning(&self, message: impl AsRef<str>) {
        self.log(Severity::Warning, message).await;
    }

    pub async fn error(&self, message: impl AsRef<str>) {
        self.log(Severity::Error, message).await;
    }

    async fn append(&self, line: &str) -> io::Result<()> {
        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }

    /// Up to `limit` most recent entries, newest first. Empty lines are
    /// skipped. A missing log file reads as empty.
    ///
    /// # Errors
    ///
    /// Returns any I/O error other than "not found" from reading the file.
    pub async fn recent(&self, limit: usize) -> io::Result<Vec<LogEntry>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        Ok(contents
            .lines()
            .rev()
            .filter(|line| !line.trim().is_empty())
            .take(limit)
            .map(LogEntry::parse)
            .collect())
    }

    /// Drop entries older than `retention_days` (relative to local now).
    ///
    /// # Errors
    ///
    /// See [`LogSink::prune_before`].
    pub async fn prune(&self, retention_days: u32) -> io::Result<PruneReport> {
        let cutoff = Local::now().naive_local() - Duration::days(i64::from(retention_days));
        self.prune_before(cutoff).await
    }

    /// Rewrite the file keeping only entries stamped at or after `cutoff`.
    /// Lines without a parseable timestamp are kept.
    ///
    /// # Errors
    ///
    /// Returns any I/O error from reading or rewriting the file. A missing
    /// file is not an error.
    pub async fn prune_before(&self, cutoff: NaiveDateTime) -> io::Result<PruneReport> {
        let _guard = self.write_lock.lock().await;
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(PruneReport::default()),
            Err(e) => return Err(e),
        };

        let mut report = PruneReport::default();
        let mut retained = String::with_capacity(contents.len());
        for line in contents.lines().filter(|line| !line.trim().is_empty()) {
            let stamped = LogEntry::parse(line)
                .timestamp
                .and_then(|ts| NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).ok());
            if stamped.is_some_and(|ts| ts < cutoff) {
                report.removed += 1;
            } else {
                report.kept += 1;
                retained.push_str(line);
                retained.push('\n');
            }
        }

        if report.removed > 0 {
            tokio::fs::write(&self.path, retained).await?;
        }
        Ok(report)
    }
}

/// Format one entry line, flattening embedded newlines so each entry stays
/// on a single line.
fn format_line(at: &NaiveDateTime, severity: Severity, message: &str) -> String {
    let flattened = message
        .lines()
        .map(str::trim_end)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" | ");
    format!(
        "[{}] [{}] {}\n",
        at.format(TIMESTAMP_FORMAT),
        severity.as_str(),
        flattened
    )
}
