//! Caller-facing envelope around a detection outcome.

use serde::Serialize;

use crate::detector::{DetectError, DetectionResult};

/// `{ success, totalProducts, duplicateGroups, totalDuplicates, duplicates }`
/// on success, `{ success: false, error }` on failure.
#[derive(Debug, Serialize)]
pub struct DetectionResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: Option<DetectionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetectionResponse {
    #[must_use]
    pub fn from_outcome(outcome: Result<DetectionResult, DetectError>) -> Self {
        match outcome {
            Ok(result) => Self {
                success: true,
                result: Some(result),
                error: None,
            },
            Err(e) => Self {
                success: false,
                result: None,
                error: Some(e.to_string()),
            },
        }
    }
}
