use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error. Please check your connection and try again.")]
    Network(#[source] reqwest::Error),

    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error("Malformed response from server")]
    Decode(#[source] reqwest::Error),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Status carried by an `Api` error, if that is what this is.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            AppError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Fallback message for an error status when the server did not supply one.
pub fn default_status_message(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "Invalid request. Please check your input and try again.",
        401 => "Invalid credentials. Please check your username and password.",
        403 => "You do not have permission to perform this action.",
        404 => "Resource not found",
        500 => "Server error. Please try again later",
        _ => "An error occurred",
    }
}

pub type AppResult<T> = Result<T, AppError>;
