//! Append-only audit log.
//!
//! One line per record: `[2024-05-01T12:00:00.000Z] INFO: message`. Writes are
//! best effort; a failed append is reported on the diagnostic stream and
//! counted, it never fails the operation being audited.

use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for AuditLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuditLevel::Info => "INFO",
            AuditLevel::Warn => "WARN",
            AuditLevel::Error => "ERROR",
        })
    }
}

#[derive(Debug)]
pub struct AuditLog {
    path: Option<PathBuf>,
    failed_writes: AtomicU64,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            failed_writes: AtomicU64::new(0),
        }
    }

    pub fn disabled() -> Self {
        Self {
            path: None,
            failed_writes: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of records that could not be appended since startup.
    pub fn failed_writes(&self) -> u64 {
        self.failed_writes.load(Ordering::Relaxed)
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(AuditLevel::Info, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(AuditLevel::Warn, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(AuditLevel::Error, message.as_ref());
    }

    pub fn log(&self, level: AuditLevel, message: &str) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = append_line(path, &format_record(level, message)) {
            self.failed_writes.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                event = "audit_write_failed",
                path = %path.display(),
                failed_writes = self.failed_writes(),
                "failed to write audit log: {}",
                e
            );
        }
    }
}

pub fn format_record(level: AuditLevel, message: &str) -> String {
    format!(
        "[{}] {}: {}\n",
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        level,
        message
    )
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    f.write_all(line.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_appends_formatted_lines() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("audit.log");
        let log = AuditLog::new(&path);

        log.info("Tool called: search_emails");
        log.error("Tool search_emails failed: boom");

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] INFO: Tool called: search_emails"));
        assert!(lines[1].contains("] ERROR: Tool search_emails failed: boom"));

        // `[YYYY-MM-DDTHH:MM:SS.mmmZ]`
        let ts = &lines[0][1..lines[0].find(']').unwrap()];
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
        assert!(ts.ends_with('Z'));
        assert_eq!(log.failed_writes(), 0);
    }

    #[test]
    fn test_write_failure_is_counted_not_raised() {
        let tmp = TempDir::new().unwrap();
        // Parent "directory" is a regular file, so create_dir_all fails.
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let log = AuditLog::new(blocker.join("audit.log"));

        log.info("first");
        log.warn("second");

        assert_eq!(log.failed_writes(), 2);
    }

    #[test]
    fn test_disabled_log_is_silent() {
        let log = AuditLog::disabled();
        log.info("nothing happens");
        assert_eq!(log.failed_writes(), 0);
        assert!(log.path().is_none());
    }
}
