//! UI/backend events and error modeling for the dashboard controller.

use client_core::PredictionError;
use shared::protocol::PredictionOutcome;

pub enum UiEvent {
    Info(String),
    PredictionReady {
        seq: u64,
        outcome: PredictionOutcome,
    },
    PredictionFailed {
        seq: u64,
        error: UiError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Service,
    Transport,
    Malformed,
    Validation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    message: String,
}

impl UiError {
    pub fn from_prediction_error(err: &PredictionError) -> Self {
        let category = match err {
            PredictionError::Service { .. } => UiErrorCategory::Service,
            PredictionError::Transport(_) => UiErrorCategory::Transport,
            PredictionError::MalformedResponse(_) => UiErrorCategory::Malformed,
            PredictionError::InvalidBaseUrl { .. } => UiErrorCategory::Validation,
        };
        Self {
            category,
            message: err.to_string(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Short label for the error view heading.
    pub fn headline(&self) -> &'static str {
        match self.category {
            UiErrorCategory::Service => "The prediction service rejected the request",
            UiErrorCategory::Transport => "Could not reach the prediction service",
            UiErrorCategory::Malformed => "The prediction service answered unexpectedly",
            UiErrorCategory::Validation => "The service URL is not usable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::{ServiceStatusCode, BACKEND_UNREACHABLE_MESSAGE};

    #[test]
    fn service_errors_keep_the_detail_as_the_message() {
        let err = UiError::from_prediction_error(&PredictionError::Service {
            status: ServiceStatusCode::UNPROCESSABLE_ENTITY,
            detail: "age_at_enrollment must be >= 17".to_string(),
        });
        assert_eq!(err.category(), UiErrorCategory::Service);
        assert_eq!(err.message(), "age_at_enrollment must be >= 17");
    }

    #[test]
    fn malformed_responses_are_their_own_category() {
        let err = UiError::from_prediction_error(&PredictionError::MalformedResponse(
            "response is missing Risk_Score".to_string(),
        ));
        assert_eq!(err.category(), UiErrorCategory::Malformed);
        assert!(err.message().contains("Risk_Score"));
    }

    #[test]
    fn transport_failures_use_the_fixed_backend_message() {
        assert_eq!(
            BACKEND_UNREACHABLE_MESSAGE,
            "Network error. Is the backend running on port 8000?"
        );
        let err = UiError {
            category: UiErrorCategory::Transport,
            message: BACKEND_UNREACHABLE_MESSAGE.to_string(),
        };
        assert_eq!(err.headline(), "Could not reach the prediction service");
    }
}
