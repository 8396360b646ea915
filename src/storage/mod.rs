//! Append-only JSON-lines log streams
//!
//! Stands in for a database: each accepted event becomes one line in one of
//! three files under the log directory.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    ContactSubmissions,
    NewsletterSignups,
    DemoBookings,
}

impl LogStream {
    pub fn file_name(&self) -> &'static str {
        match self {
            LogStream::ContactSubmissions => "contact_submissions.log",
            LogStream::NewsletterSignups => "newsletter_signups.log",
            LogStream::DemoBookings => "demo_bookings.log",
        }
    }
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Writer for the three log streams.
///
/// Each stream has its own lock, held for the whole open-write-flush of a
/// record, so concurrent requests never interleave partial lines.
#[derive(Debug)]
pub struct AppendLog {
    dir: PathBuf,
    contact: Mutex<()>,
    newsletter: Mutex<()>,
    bookings: Mutex<()>,
}

impl AppendLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            contact: Mutex::new(()),
            newsletter: Mutex::new(()),
            bookings: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, stream: LogStream) -> PathBuf {
        self.dir.join(stream.file_name())
    }

    /// Append one record as a single JSON line
    pub async fn append<T: Serialize>(&self, stream: LogStream, record: &T) -> Result<(), LogError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let path = self.path(stream);
        let io_err = |source: std::io::Error| LogError::Io {
            path: path.clone(),
            source,
        };

        let _guard = self.stream_lock(stream).lock().await;

        fs::create_dir_all(&self.dir).await.map_err(io_err)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(io_err)?;
        file.write_all(&line).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)?;

        Ok(())
    }

    fn stream_lock(&self, stream: LogStream) -> &Mutex<()> {
        match stream {
            LogStream::ContactSubmissions => &self.contact,
            LogStream::NewsletterSignups => &self.newsletter,
            LogStream::DemoBookings => &self.bookings,
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Fresh, unique log directory under the system temp dir
    pub fn temp_log_dir() -> PathBuf {
        std::env::temp_dir().join(format!("lodge-forms-test-{}", uuid::Uuid::new_v4()))
    }

    /// Lines currently in a stream; a missing file counts as empty
    pub fn read_lines(log: &AppendLog, stream: LogStream) -> Vec<serde_json::Value> {
        match std::fs::read_to_string(log.path(stream)) {
            Ok(content) => content
                .lines()
                .map(|l| serde_json::from_str(l).expect("log line is JSON"))
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_append_creates_directory_and_file() {
        let log = AppendLog::new(temp_log_dir().join("nested"));
        log.append(LogStream::NewsletterSignups, &json!({"email": "a@example.com"}))
            .await
            .unwrap();
        log.append(LogStream::NewsletterSignups, &json!({"email": "b@example.com"}))
            .await
            .unwrap();

        let lines = read_lines(&log, LogStream::NewsletterSignups);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["email"], "b@example.com");
        assert!(read_lines(&log, LogStream::ContactSubmissions).is_empty());
    }

    #[tokio::test]
    async fn test_records_stay_single_line() {
        let log = AppendLog::new(temp_log_dir());
        log.append(LogStream::ContactSubmissions, &json!({"message": "a\nb\nc"}))
            .await
            .unwrap();
        let content = std::fs::read_to_string(log.path(LogStream::ContactSubmissions)).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_appends_do_not_interleave() {
        let log = Arc::new(AppendLog::new(temp_log_dir()));
        let padding = "x".repeat(16 * 1024);

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let log = log.clone();
                let padding = padding.clone();
                tokio::spawn(async move {
                    log.append(LogStream::DemoBookings, &json!({"n": i, "padding": padding}))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let lines = read_lines(&log, LogStream::DemoBookings);
        assert_eq!(lines.len(), 32);
        let mut seen: Vec<i64> = lines.iter().map(|l| l["n"].as_i64().unwrap()).collect();
        seen.sort();
        assert_eq!(seen, (0..32).collect::<Vec<_>>());
    }
}
