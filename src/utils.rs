//! Path helpers for saving downloaded reports

use crate::config::FileCollisionAction;
use crate::error::{ArchiveError, Result};
use std::path::{Path, PathBuf};

/// Give up renaming after this many numbered candidates
const MAX_RENAME_ATTEMPTS: u32 = 9999;

async fn is_taken(path: &Path) -> Result<bool> {
    Ok(tokio::fs::try_exists(path).await?)
}

/// Resolve where a download named `path` should be written
///
/// `Overwrite` always writes to `path`. `Skip` refuses when `path` is taken.
/// `Rename` picks the first free `name (n).ext`, counting from 1.
///
/// # Examples
///
/// ```no_run
/// use rageshake::config::FileCollisionAction;
/// use rageshake::utils::get_unique_path;
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> rageshake::Result<()> {
/// let target =
///     get_unique_path(Path::new("/tmp/rageshake.tar"), FileCollisionAction::Rename).await?;
/// println!("saving to {}", target.display());
/// # Ok(())
/// # }
/// ```
pub async fn get_unique_path(path: &Path, action: FileCollisionAction) -> Result<PathBuf> {
    match action {
        FileCollisionAction::Overwrite => Ok(path.to_path_buf()),
        FileCollisionAction::Skip if is_taken(path).await? => Err(ArchiveError::FileCollision {
            path: path.to_path_buf(),
            reason: "a file with this name already exists".to_string(),
        }
        .into()),
        FileCollisionAction::Skip => Ok(path.to_path_buf()),
        FileCollisionAction::Rename => {
            if !is_taken(path).await? {
                return Ok(path.to_path_buf());
            }

            let invalid = |reason: &str| ArchiveError::InvalidPath {
                path: path.to_path_buf(),
                reason: reason.to_string(),
            };
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .ok_or_else(|| invalid("no usable file name"))?;
            let parent = path.parent().ok_or_else(|| invalid("no parent directory"))?;
            let extension = path.extension().and_then(|e| e.to_str());

            for n in 1..=MAX_RENAME_ATTEMPTS {
                let candidate = parent.join(match extension {
                    Some(ext) => format!("{stem} ({n}).{ext}"),
                    None => format!("{stem} ({n})"),
                });
                if !is_taken(&candidate).await? {
                    return Ok(candidate);
                }
            }

            Err(ArchiveError::FileCollision {
                path: path.to_path_buf(),
                reason: format!("no free name after {MAX_RENAME_ATTEMPTS} attempts"),
            }
            .into())
        }
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_get_unique_path_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rageshake.tar");

        for action in [
            FileCollisionAction::Rename,
            FileCollisionAction::Overwrite,
            FileCollisionAction::Skip,
        ] {
            assert_eq!(get_unique_path(&path, action).await.unwrap(), path);
        }
    }

    #[tokio::test]
    async fn test_get_unique_path_rename_sequential() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rageshake.tar");
        fs::write(&path, "original").unwrap();

        let unique = get_unique_path(&path, FileCollisionAction::Rename).await.unwrap();
        assert_eq!(unique, temp_dir.path().join("rageshake (1).tar"));

        fs::write(&unique, "first").unwrap();
        let unique2 = get_unique_path(&path, FileCollisionAction::Rename).await.unwrap();
        assert_eq!(unique2, temp_dir.path().join("rageshake (2).tar"));
    }

    #[tokio::test]
    async fn test_get_unique_path_rename_without_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rageshake");
        fs::write(&path, "original").unwrap();

        let unique = get_unique_path(&path, FileCollisionAction::Rename).await.unwrap();
        assert_eq!(unique, temp_dir.path().join("rageshake (1)"));
    }

    #[tokio::test]
    async fn test_get_unique_path_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rageshake.tar");
        fs::write(&path, "original").unwrap();

        let result = get_unique_path(&path, FileCollisionAction::Overwrite).await.unwrap();
        assert_eq!(result, path);
    }

    #[tokio::test]
    async fn test_get_unique_path_skip_existing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("rageshake.tar");
        fs::write(&path, "original").unwrap();

        match get_unique_path(&path, FileCollisionAction::Skip).await {
            Err(Error::Archive(ArchiveError::FileCollision { path: p, .. })) => {
                assert_eq!(p, path);
            }
            other => panic!("expected FileCollision error, got {other:?}"),
        }
    }
}
