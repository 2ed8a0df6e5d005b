//! Main Crate Error

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;
use tracing::error;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] sq_config::error::Error),

    #[error(transparent)]
    Publisher(#[from] sq_publisher::error::Error),

    #[error("Unknown job '{0}'")]
    UnknownJob(String),

    #[error("Unknown build '{0}'")]
    UnknownBuild(uuid::Uuid),

    #[error("No test list published for job '{0}'")]
    NoTestList(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        error!("Creating API error response for error: {:?}", self);
        let (status, message) = match &self {
            Error::UnknownJob(_) => (StatusCode::NOT_FOUND, "Unknown job"),
            Error::UnknownBuild(_) => (StatusCode::NOT_FOUND, "Unknown build"),
            Error::NoTestList(_) => (StatusCode::NOT_FOUND, "No test list published"),
            Error::Publisher(sq_publisher::error::Error::Adaptation { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "TA wrapper misconfigured for this build",
            ),
            Error::Publisher(sq_publisher::error::Error::PostFailures { .. }) => {
                (StatusCode::BAD_GATEWAY, "Posting to TM server(s) failed")
            }
            Error::IO(_) | Error::Config(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": {
                "message": message,
                "status": status.as_u16()
            }
        }));
        (status, body).into_response()
    }
}
