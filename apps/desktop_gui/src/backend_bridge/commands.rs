//! Backend commands queued from UI to backend worker.

use shared::protocol::PredictionRequest;

pub enum BackendCommand {
    /// Submit one prediction request. `seq` identifies the submission so the
    /// UI can discard responses that arrive after it moved on.
    Predict {
        seq: u64,
        server_url: String,
        request: PredictionRequest,
    },
}
