//! Log source backed by a directory of log files

use super::traits::LogSource;
use crate::error::{Error, Result};
use crate::types::LogSegment;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads every `*.log` file in a directory as one log segment
///
/// Segments are ordered by file name and identified by it. Files that are not
/// valid UTF-8 are decoded lossily.
///
/// # Examples
///
/// ```no_run
/// use rageshake::providers::{DirectoryLogSource, LogSource};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = DirectoryLogSource::new("/var/log/riot");
/// for segment in source.logs_for_report().await? {
///     println!("{}: {} bytes", segment.id, segment.lines.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct DirectoryLogSource {
    dir: PathBuf,
}

impl DirectoryLogSource {
    /// Create a source reading from `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory logs are read from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn detect_log_files(&self) -> Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            Error::LogSource(format!("failed to read {}: {}", self.dir.display(), e))
        })?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::LogSource(format!("failed to read entry: {}", e)))?
        {
            let file_type = entry.file_type().await.map_err(|e| {
                Error::LogSource(format!("failed to stat {}: {}", entry.path().display(), e))
            })?;
            if file_type.is_dir() {
                continue;
            }
            let path = entry.path();
            if let Some(ext) = path.extension()
                && ext.to_string_lossy().eq_ignore_ascii_case("log")
            {
                files.push(path);
            }
        }

        files.sort();
        debug!(dir = ?self.dir, count = files.len(), "found log files");
        Ok(files)
    }
}

#[async_trait]
impl LogSource for DirectoryLogSource {
    async fn logs_for_report(&self) -> Result<Vec<LogSegment>> {
        let mut segments = Vec::new();
        for path in self.detect_log_files().await? {
            let bytes = tokio::fs::read(&path).await.map_err(|e| {
                Error::LogSource(format!("failed to read {}: {}", path.display(), e))
            })?;
            let id = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            segments.push(LogSegment::new(
                id,
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }
        Ok(segments)
    }

    fn name(&self) -> &'static str {
        "directory"
    }
}
