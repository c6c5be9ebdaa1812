use axum::{
    extract::multipart::MultipartError,
    extract::rejection::{JsonRejection, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use frame_sampler::SampleError;
use model_client::ModelError;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data
    #[error("{message}")]
    BadRequest { message: String },

    /// A question arrived before any video was analysed
    #[error("No video analyzed yet. Please upload a video first.")]
    NoVideoAnalyzed,

    /// The multipart body could not be read, including oversized uploads
    #[error("Failed to read upload: {0}")]
    Upload(#[from] MultipartError),

    /// The video opened but produced no frames
    #[error("No frames could be extracted from the uploaded video.")]
    NoFrames,

    #[error("Failed to decode the uploaded video: {0}")]
    Extraction(#[from] SampleError),

    #[error("Model backend request failed: {0}")]
    Model(#[from] ModelError),

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl Error {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } | Error::NoVideoAnalyzed => StatusCode::BAD_REQUEST,
            Error::Upload(err) => err.status(),
            Error::NoFrames => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Extraction(_) | Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Model(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Error::BadRequest { .. } => "bad_request",
            Error::NoVideoAnalyzed => "no_video_analyzed",
            Error::Upload(_) => "upload_failed",
            Error::NoFrames => "no_frames",
            Error::Extraction(_) => "extraction_failed",
            Error::Model(_) => "model_failed",
            Error::Internal { .. } => "internal",
        }
    }
}

// Extractor rejections are client errors and use the same JSON body as
// every other error.
impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for Error {
    fn from(rejection: MultipartRejection) -> Self {
        Error::bad_request(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        } else {
            tracing::debug!("Client error: {self}");
        }

        let body = ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::NoVideoAnalyzed.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(Error::NoFrames.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            Error::from(SampleError::NoVideoStream).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::from(ModelError::MalformedResponse("empty".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_messages_are_explicit() {
        assert_eq!(
            Error::from(SampleError::NoVideoStream).to_string(),
            "Failed to decode the uploaded video: no video stream found in container"
        );
        assert_eq!(
            Error::NoVideoAnalyzed.to_string(),
            "No video analyzed yet. Please upload a video first."
        );
    }
}
