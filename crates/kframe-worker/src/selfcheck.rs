//! Environment checks run by the `worker-selfcheck` binary.

use std::path::{Path, PathBuf};

use kframe_media::{check_ffmpeg, check_ffprobe};

use crate::config::WorkerConfig;

/// Resolved external tool locations.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

/// Verify `path` exists (creating it if needed) and accepts writes.
pub async fn ensure_output_dir(path: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path).await?;

    let marker = path.join(".selfcheck");
    tokio::fs::write(&marker, b"ok")
        .await
        .map_err(|e| anyhow::anyhow!("output dir {} not writable: {}", path.display(), e))?;
    tokio::fs::remove_file(&marker).await?;
    Ok(())
}

/// Locate `ffmpeg` and `ffprobe` on `PATH`.
pub fn ensure_tools() -> anyhow::Result<ToolPaths> {
    Ok(ToolPaths {
        ffmpeg: check_ffmpeg()?,
        ffprobe: check_ffprobe()?,
    })
}

/// Run every check against `config`.
pub async fn run(config: &WorkerConfig) -> anyhow::Result<ToolPaths> {
    ensure_output_dir(&config.output_dir).await?;
    let tools = ensure_tools()?;
    config
        .defaults
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid default processing config: {}", e))?;
    Ok(tools)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_output_dir_created_and_left_clean() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested/out");

        ensure_output_dir(&dir).await.unwrap();

        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_output_dir_under_a_file_fails() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("plain");
        std::fs::write(&file, b"x").unwrap();

        assert!(ensure_output_dir(&file.join("out")).await.is_err());
    }

    #[test]
    fn test_tools_resolved_through_media_helpers() {
        match ensure_tools() {
            Ok(tools) => {
                assert_eq!(tools.ffmpeg, check_ffmpeg().unwrap());
                assert_eq!(tools.ffprobe, check_ffprobe().unwrap());
            }
            Err(e) => {
                let missing = check_ffmpeg().is_err() || check_ffprobe().is_err();
                assert!(missing, "unexpected failure: {e}");
                assert!(e.to_string().contains("not found"));
            }
        }
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_defaults_or_missing_tools() {
        let temp = TempDir::new().unwrap();
        let mut config = WorkerConfig {
            output_dir: temp.path().to_path_buf(),
            ..Default::default()
        };
        config.defaults.max_frames = 0;

        assert!(run(&config).await.is_err());
    }
}
