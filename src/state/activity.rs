//! Bounded in-memory activity feed mirrored to an append-only text file. The
//! file is the only state that survives a restart.

use std::{collections::VecDeque, io, path::PathBuf, time::SystemTime};

use time::OffsetDateTime;
use tokio::{
    fs::{self, OpenOptions},
    io::AsyncWriteExt,
    sync::Mutex,
};
use tracing::warn;

/// Maximum number of entries retained in memory.
pub const MAX_LOG_ENTRIES: usize = 100;

/// Importance attached to an activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Routine bookkeeping.
    Info,
    /// A participant or host action that succeeded.
    Success,
    /// A failed or suspicious action.
    Error,
}

impl Severity {
    /// Wire spelling of the severity.
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

/// One activity feed entry.
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// When the entry was appended.
    pub timestamp: SystemTime,
    /// Human-readable description of what happened.
    pub message: String,
    /// Importance of the entry.
    pub severity: Severity,
}

/// Activity feed state: the bounded memory buffer plus the durable file mirror.
///
/// The buffer mutex also serializes file appends, so the file line order
/// always matches the in-memory order.
pub struct ActivityLog {
    path: PathBuf,
    entries: Mutex<VecDeque<LogEntry>>,
}

impl ActivityLog {
    /// Open the log at `path`, creating the parent directory when missing.
    /// The file itself is created lazily on the first append.
    pub async fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        Ok(Self {
            path,
            entries: Mutex::new(VecDeque::new()),
        })
    }

    /// Append an entry: memory first (evicting beyond [`MAX_LOG_ENTRIES`]),
    /// then one line in the file. A file failure is reported as a warning and
    /// the in-memory entry stays, so a full disk cannot fail the operation
    /// that produced the entry.
    pub async fn append(&self, severity: Severity, message: impl Into<String>) -> LogEntry {
        let entry = LogEntry {
            timestamp: SystemTime::now(),
            message: message.into(),
            severity,
        };

        let mut entries = self.entries.lock().await;
        entries.push_back(entry.clone());
        while entries.len() > MAX_LOG_ENTRIES {
            entries.pop_front();
        }

        if let Err(err) = self.append_line(&entry).await {
            warn!(
                path = %self.path.display(),
                error = %err,
                "failed to append activity log line"
            );
        }

        entry
    }

    /// Most recent `limit` entries, oldest first.
    pub async fn recent(&self, limit: usize) -> Vec<LogEntry> {
        let entries = self.entries.lock().await;
        let skip = entries.len().saturating_sub(limit);
        entries.iter().skip(skip).cloned().collect()
    }

    /// Truncate the file, then drop the buffered entries. Nothing is cleared
    /// when truncation fails.
    pub async fn clear(&self) -> io::Result<()> {
        let mut entries = self.entries.lock().await;
        fs::File::create(&self.path).await?;
        entries.clear();
        Ok(())
    }

    async fn append_line(&self, entry: &LogEntry) -> io::Result<()> {
        let line = format!("[{}] {}\n", file_timestamp(entry.timestamp), entry.message);
        let mut file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

/// Render the human-readable `YYYY-MM-DD HH:MM:SS` file prefix, in UTC.
fn file_timestamp(time: SystemTime) -> String {
    let moment = OffsetDateTime::from(time);
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        moment.year(),
        u8::from(moment.month()),
        moment.day(),
        moment.hour(),
        moment.minute(),
        moment.second()
    )
}
