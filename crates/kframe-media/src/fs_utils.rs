//! Filesystem utilities for durable output files.

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{MediaError, MediaResult};

/// Write `bytes` to `path` atomically.
///
/// Data is written to a temporary sibling file, flushed, then renamed over
/// `path`, so readers never observe a partially written file. The parent
/// directory is created if needed.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the write or
/// rename fails. The temporary file is removed on failure.
pub async fn write_atomic(path: impl AsRef<Path>, bytes: &[u8]) -> MediaResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let tmp = temp_sibling(path)?;

    let write_result = async {
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = write_result {
        // Best effort cleanup
        let _ = fs::remove_file(&tmp).await;
        tracing::error!(
            "Failed to write file atomically: {}: {}",
            path.display(),
            e
        );
        return Err(MediaError::from(e));
    }

    Ok(())
}

/// `.<name>.<uuid>.tmp` next to `path`.
fn temp_sibling(path: &Path) -> MediaResult<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| MediaError::internal(format!("not a file path: {}", path.display())))?;
    let tmp_name = format!(
        ".{}.{}.tmp",
        name.to_string_lossy(),
        uuid::Uuid::new_v4().simple()
    );
    Ok(path.with_file_name(tmp_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_atomic_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a/b/out.json");

        write_atomic(&path, b"{\"ok\":true}").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"{\"ok\":true}");
    }

    #[tokio::test]
    async fn test_write_atomic_replaces_and_leaves_no_temp() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out.bin");

        write_atomic(&path, b"first").await.unwrap();
        write_atomic(&path, b"second").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"second");
        let entries: Vec<_> = std::fs::read_dir(temp.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_write_atomic_rejects_dir_path() {
        let result = write_atomic(Path::new("/"), b"x").await;
        assert!(result.is_err());
    }
}
