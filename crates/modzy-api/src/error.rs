use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Error payload returned by the API alongside a non-success status code.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: String,
}

impl ApiErrorBody {
    /// Parse an error body, keeping the raw text as the message when it is not the expected JSON.
    pub fn from_text(text: &str) -> Self {
        serde_json::from_str::<ApiErrorBody>(text).unwrap_or_else(|_| ApiErrorBody {
            message: text.trim().to_string(),
            ..Default::default()
        })
    }
}

impl Default for ApiErrorBody {
    fn default() -> Self {
        ApiErrorBody {
            status_code: None,
            status: None,
            message: "An unknown error occurred".to_string(),
        }
    }
}

impl Display for ApiErrorBody {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.status {
            Some(status) => write!(f, "{status}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Resource not found: {0}")]
    NotFound(ApiErrorBody),
    #[error("Unauthorized access")]
    Unauthorized,
    #[error("Forbidden access")]
    Forbidden,
    #[error("Internal server error: {0}")]
    InternalServerError(ApiErrorBody),
    #[error("Api error {status}: {body}")]
    ApiError {
        status: StatusCode,
        body: ApiErrorBody,
    },
    #[error("Request failed: {0}")]
    Transport(String),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("Unknown Error: {0}")]
    UnknownError(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => ClientError::ApiError {
                status,
                body: ApiErrorBody {
                    message: error.to_string(),
                    ..Default::default()
                },
            },
            None if error.is_decode() => ClientError::UnknownError(error.to_string()),
            None => ClientError::Transport(error.to_string()),
        }
    }
}

impl ClientError {
    /// Build the error matching a non-success status code and its response text.
    pub fn from_status(status: StatusCode, text: &str) -> Self {
        match status {
            StatusCode::NOT_FOUND => ClientError::NotFound(ApiErrorBody::from_text(text)),
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
            StatusCode::FORBIDDEN => ClientError::Forbidden,
            StatusCode::INTERNAL_SERVER_ERROR => {
                ClientError::InternalServerError(ApiErrorBody::from_text(text))
            }
            _ => ClientError::ApiError {
                status,
                body: ApiErrorBody::from_text(text),
            },
        }
    }

    /// The HTTP status behind this error, if the request reached the server.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::NotFound(_) => Some(StatusCode::NOT_FOUND),
            ClientError::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            ClientError::Forbidden => Some(StatusCode::FORBIDDEN),
            ClientError::InternalServerError(_) => Some(StatusCode::INTERNAL_SERVER_ERROR),
            ClientError::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_login_error(&self) -> bool {
        matches!(self, ClientError::Unauthorized | ClientError::Forbidden)
    }
}
