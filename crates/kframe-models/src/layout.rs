//! On-disk layout of one run's outputs.
//!
//! ```text
//! <output_dir>/video-<video_id>/
//!   keyframes/frame_{idx:05}_t{ts:.2}s.jpg
//!   metadata.json
//!   processing.json
//! ```

use std::path::{Path, PathBuf};

use crate::video::VideoId;

pub const KEYFRAMES_DIR: &str = "keyframes";
pub const METADATA_FILE: &str = "metadata.json";
pub const PROCESSING_FILE: &str = "processing.json";

/// Paths belonging to a single video's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoLayout {
    root: PathBuf,
}

impl VideoLayout {
    pub fn new(output_dir: impl AsRef<Path>, video_id: &VideoId) -> Self {
        Self {
            root: output_dir.as_ref().join(format!("video-{}", video_id)),
        }
    }

    /// `<output_dir>/video-<video_id>`
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn keyframes_dir(&self) -> PathBuf {
        self.root.join(KEYFRAMES_DIR)
    }

    pub fn keyframe_path(&self, filename: &str) -> PathBuf {
        self.keyframes_dir().join(filename)
    }

    /// Per-extraction metadata record.
    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    /// Run-level metadata record.
    pub fn processing_path(&self) -> PathBuf {
        self.root.join(PROCESSING_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = VideoLayout::new("/data/out", &VideoId::from("abc"));
        assert_eq!(layout.root(), Path::new("/data/out/video-abc"));
        assert_eq!(
            layout.keyframe_path("frame_00001_t0.03s.jpg"),
            PathBuf::from("/data/out/video-abc/keyframes/frame_00001_t0.03s.jpg")
        );
        assert_eq!(
            layout.metadata_path(),
            PathBuf::from("/data/out/video-abc/metadata.json")
        );
        assert_eq!(
            layout.processing_path(),
            PathBuf::from("/data/out/video-abc/processing.json")
        );
    }
}
