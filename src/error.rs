use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoutingError {
    /// The service answered with a non-zero status.
    #[error("routing service error (status {status}): {message}")]
    Service { status: i64, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse routing response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed routing response: {0}")]
    MalformedResponse(String),

    /// The transport dropped the request without answering.
    #[error("transport hung up before delivering a response")]
    Disconnected,
}
