//! Keyframe extraction: turns a detection stream into a small ranked set of
//! deduplicated still images plus a metadata record.

pub mod candidate;
pub mod dedup;
pub mod error;
pub mod extractor;
pub mod materializer;
pub mod metadata;
pub mod scorer;
pub mod selector;

pub use candidate::collect_candidates;
pub use dedup::deduplicate;
pub use error::{ExtractResult, ExtractionError, InvalidCandidate};
pub use extractor::{ExtractionResult, ExtractionSettings, KeyframeExtractor};
pub use materializer::{FrameMaterializer, FrameProgress, DEFAULT_SEEK_THRESHOLD_FRAMES};
pub use metadata::{read_metadata, write_metadata};
pub use scorer::{FrameScorer, ScoreBreakdown};
pub use selector::select_top;
