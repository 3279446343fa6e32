use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Signature mismatch")]
    InvalidSignature,

    #[error("Missing x-hub-signature header")]
    MissingSignature,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Error {0}")]
    Store(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InvalidSignature | AppError::MissingSignature => StatusCode::FORBIDDEN,
            AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.to_string()).into_response()
    }
}
