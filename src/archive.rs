//! Local download of a report as a tar archive
//!
//! Each compressed log is expanded back to text and stored as `log-<i>.log`,
//! with `i` counting blobs from zero in report order. All text fields are
//! written to a trailing `issue.txt` as `name = value` lines.

use crate::compression::gunzip;
use crate::config::{Config, FileCollisionAction};
use crate::error::{ArchiveError, Result};
use crate::types::{FieldValue, ProgressCallback, Report, progress};
use crate::utils::get_unique_path;
use async_trait::async_trait;
use base64::Engine;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the metadata entry in the archive
pub const ISSUE_ENTRY: &str = "issue.txt";

/// Archive bytes ready to be handed to the user
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalDownload {
    /// Suggested file name, e.g. `rageshake.tar`
    pub file_name: String,
    /// Raw tar bytes
    pub bytes: Vec<u8>,
}

impl LocalDownload {
    /// `data:` URL carrying the archive, base64 encoded
    pub fn data_url(&self) -> String {
        format!(
            "data:application/octet-stream;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Destination that presents a finished archive to the user
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Hand over the archive
    async fn deliver(&self, download: LocalDownload) -> Result<()>;
}

/// Saves archives into a directory
///
/// Existing files are handled per the configured [`FileCollisionAction`].
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    collision: FileCollisionAction,
}

impl DirectorySink {
    /// Save into `dir`, renaming on collision
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            collision: FileCollisionAction::default(),
        }
    }

    /// Save into `dir`, handling collisions per `config.download_collision`
    pub fn from_config(dir: impl Into<PathBuf>, config: &Config) -> Self {
        Self::new(dir).with_collision_action(config.download_collision)
    }

    /// Use `collision` when the target file already exists
    pub fn with_collision_action(mut self, collision: FileCollisionAction) -> Self {
        self.collision = collision;
        self
    }

    /// Directory archives are saved into
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `download` and return the path it was written to
    pub async fn save(&self, download: &LocalDownload) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = get_unique_path(&self.dir.join(&download.file_name), self.collision).await?;
        tokio::fs::write(&path, &download.bytes).await?;
        info!(path = ?path, bytes = download.bytes.len(), "bug report saved");
        Ok(path)
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn deliver(&self, download: LocalDownload) -> Result<()> {
        self.save(&download).await.map(|_| ())
    }
}

/// Pack `report` into an in-memory tar archive
///
/// Logs are expanded one at a time, in order, so entry names are stable.
pub async fn build_archive(report: Report) -> Result<Vec<u8>> {
    let mut tape = tar::Builder::new(Vec::new());
    let mtime = u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0);
    let mut metadata = String::new();
    let mut index = 0usize;

    for field in report.into_fields() {
        match field.value {
            FieldValue::Blob { file_name, bytes } => {
                let expanded = tokio::task::spawn_blocking(move || gunzip(&bytes))
                    .await
                    .map_err(|e| ArchiveError::Task(e.to_string()))?
                    .map_err(|source| ArchiveError::Decompress {
                        file_name: file_name.clone(),
                        source,
                    })?;
                let entry = format!("log-{}.log", index);
                index += 1;
                debug!(entry = %entry, source = %file_name, bytes = expanded.len(), "adding log");
                append_entry(&mut tape, &entry, &expanded, mtime)?;
            }
            FieldValue::Text(value) => {
                metadata.push_str(&format!("{} = {}\n", field.name, value));
            }
        }
    }

    append_entry(&mut tape, ISSUE_ENTRY, metadata.as_bytes(), mtime)?;

    let bytes = tape.into_inner().map_err(|source| ArchiveError::Append {
        entry: "<end of archive>".to_string(),
        source,
    })?;
    debug!(logs = index, bytes = bytes.len(), "archive built");
    Ok(bytes)
}

fn append_entry(
    tape: &mut tar::Builder<Vec<u8>>,
    name: &str,
    data: &[u8],
    mtime: u64,
) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_mtime(mtime);
    header.set_entry_type(tar::EntryType::Regular);
    tape.append_data(&mut header, name, data)
        .map_err(|source| ArchiveError::Append {
            entry: name.to_string(),
            source,
        })?;
    Ok(())
}

/// Archive `report` and hand it to `sink` as `file_name`
pub async fn download_locally(
    report: Report,
    progress: Option<&ProgressCallback>,
    sink: &dyn DownloadSink,
    file_name: &str,
) -> Result<()> {
    if let Some(callback) = progress {
        callback.call(progress::DOWNLOADING);
    }
    let bytes = build_archive(report).await?;
    sink.deliver(LocalDownload {
        file_name: file_name.to_string(),
        bytes,
    })
    .await
}
