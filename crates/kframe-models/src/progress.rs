//! Stage-scoped progress events.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage a progress event or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Detection,
    Extraction,
    Complete,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Detection => "detection",
            Stage::Extraction => "extraction",
            Stage::Complete => "complete",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A progress report: `percent` of `stage` is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub percent: u8,
}

impl ProgressEvent {
    /// Create an event, clamping `percent` to 100.
    pub fn new(stage: Stage, percent: u8) -> Self {
        Self {
            stage,
            percent: percent.min(100),
        }
    }

    pub fn started(stage: Stage) -> Self {
        Self::new(stage, 0)
    }

    pub fn finished(stage: Stage) -> Self {
        Self::new(stage, 100)
    }

    pub fn is_terminal(&self) -> bool {
        self.percent == 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::Detection.as_str(), "detection");
        assert_eq!(
            serde_json::to_string(&Stage::Extraction).unwrap(),
            "\"extraction\""
        );
    }

    #[test]
    fn test_event_clamps_percent() {
        let e = ProgressEvent::new(Stage::Detection, 150);
        assert_eq!(e.percent, 100);
        assert!(e.is_terminal());
        assert!(!ProgressEvent::started(Stage::Detection).is_terminal());
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(ProgressEvent::finished(Stage::Complete)).unwrap();
        assert_eq!(json, serde_json::json!({"stage": "complete", "percent": 100}));
    }
}
