use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure body shape returned by the prediction service. The `detail` field
/// is optional on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ServiceErrorBody {
    /// Human-readable message, falling back when the service sent no detail.
    pub fn detail_or_unknown(self) -> String {
        self.detail
            .filter(|detail| !detail.trim().is_empty())
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

/// A 2xx response body that lacks one of the contract fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MissingResponseField {
    #[error("response is missing Risk_Score")]
    RiskScore,
    #[error("response is missing Prediction_Label")]
    PredictionLabel,
    #[error("response is missing Recommendations")]
    Recommendations,
}
