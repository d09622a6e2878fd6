pub use crate::http::{
    send_delete_request, send_get_request, send_patch_request, send_post_request, Client,
    DEFAULT_BASE_URL,
};
pub use crate::responses::*;

pub mod http;
pub mod responses;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("Reqwest error: {0}")]
    Reqwest(reqwest::Error),
    #[error("JSON serialization/deserialization failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The first entry of a non-success response's error list.
    #[error("{error}")]
    Api { status: u16, error: ApiError },
    #[error("an unknown API error has occurred (HTTP {status})")]
    UnknownApi { status: u16 },
}

impl ClientError {
    /// HTTP status of a non-success API response, if this error came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } | ClientError::UnknownApi { status } => Some(*status),
            _ => None,
        }
    }

    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api { error, .. } => Some(error),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
