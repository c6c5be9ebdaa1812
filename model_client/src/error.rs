use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("request to model service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model service returned error {status}: {body}")]
    Status { status: u16, body: String },

    /// The reply did not carry a `message.content` text.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),
}
