use chrono::Utc;
use reqwest::{Client, StatusCode};
use shared::{
    error::ServiceErrorBody,
    protocol::{PredictionOutcome, PredictionRequest, PredictionResponseBody},
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub use reqwest::StatusCode as ServiceStatusCode;

/// Endpoint path on the prediction service.
pub const PREDICT_ENDPOINT: &str = "predict-and-recommend";

/// Fixed user-facing message for transport-level failures, naming the
/// backend the dashboard expects to find locally.
pub const BACKEND_UNREACHABLE_MESSAGE: &str =
    "Network error. Is the backend running on port 8000?";

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("invalid prediction service URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    /// The service answered with a non-success status. `detail` is the
    /// message from the failure body, or "Unknown error" when absent.
    #[error("{detail}")]
    Service { status: StatusCode, detail: String },
    /// The call never completed: connection refused, DNS failure, timeout at
    /// the transport layer, or the connection dropped mid-response.
    #[error("{}", BACKEND_UNREACHABLE_MESSAGE)]
    Transport(#[source] reqwest::Error),
    /// The service answered 2xx but the body is undecodable or missing a
    /// contract field.
    #[error("prediction service returned an unusable response: {0}")]
    MalformedResponse(String),
}

/// HTTP client for the prediction service. One outbound call per
/// [`PredictionClient::predict_and_recommend`]; no retries, no caching.
pub struct PredictionClient {
    http: Client,
    base_url: Url,
}

impl PredictionClient {
    /// Validates and normalizes the base URL. A scheme and host are required;
    /// a trailing slash is tolerated.
    pub fn new(base_url: &str) -> Result<Self, PredictionError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        let parsed = Url::parse(trimmed).map_err(|source| PredictionError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        if !parsed.has_host() {
            return Err(PredictionError::InvalidBaseUrl {
                url: base_url.to_string(),
                source: url::ParseError::EmptyHost,
            });
        }
        Ok(Self {
            http: Client::new(),
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Submits the payload and maps the outcome into the error taxonomy:
    /// non-2xx -> [`PredictionError::Service`], transport failure ->
    /// [`PredictionError::Transport`], incomplete success body ->
    /// [`PredictionError::MalformedResponse`].
    pub async fn predict_and_recommend(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionOutcome, PredictionError> {
        let endpoint = format!(
            "{}/{PREDICT_ENDPOINT}",
            self.base_url.as_str().trim_end_matches('/')
        );
        debug!(student_id = %request.student_id, %endpoint, "submitting prediction request");

        let response = self
            .http
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(PredictionError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            // The failure body is read best-effort: an unreadable body still
            // surfaces as a service failure with the fallback detail.
            let body: ServiceErrorBody = response.json().await.unwrap_or_default();
            let detail = body.detail_or_unknown();
            warn!(%status, %detail, "prediction service reported failure");
            return Err(PredictionError::Service { status, detail });
        }

        let body: PredictionResponseBody = response
            .json()
            .await
            .map_err(|err| PredictionError::MalformedResponse(err.to_string()))?;
        let outcome = body
            .into_outcome(Utc::now())
            .map_err(|err| PredictionError::MalformedResponse(err.to_string()))?;
        debug!(risk_score = outcome.risk_score, "prediction received");
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
