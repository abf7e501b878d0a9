//! Error types for editor traffic with the backend.

use miette::Diagnostic;

/// Failure of a single request/response exchange with the backend.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    #[diagnostic(code(minicourse::api::network))]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("HTTP error! status: {status}, message: {message}")]
    #[diagnostic(code(minicourse::api::status))]
    Status { status: u16, message: String },

    /// A 2xx response that lacks a field the editor needs.
    #[error("response is missing `{0}`")]
    #[diagnostic(code(minicourse::api::missing_field))]
    MissingField(&'static str),

    /// Serialization/deserialization error
    #[error(transparent)]
    #[diagnostic_source]
    Serde(#[from] SerDeError),

    /// The configured endpoint, or a path joined onto it, is not a valid URL.
    #[error("invalid url `{url}`: {reason}")]
    #[diagnostic(
        code(minicourse::api::invalid_url),
        help("the endpoint must be an absolute http(s) URL")
    )]
    InvalidUrl { url: String, reason: String },
}

impl ApiError {
    /// The message shown to the user for this failure.
    ///
    /// Status errors surface the backend's own `error`/`message` text.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serde(SerDeError::Json(err))
    }
}

/// Serialization/deserialization errors
#[derive(thiserror::Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SerDeError {
    #[error(transparent)]
    #[diagnostic(code(minicourse::serde::json))]
    Json(#[from] serde_json::Error),
}
