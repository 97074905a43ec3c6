use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, SonarError>;

#[derive(Debug, Error)]
pub enum SonarError {
    #[error("transport failure during {context}: HTTP {status}")]
    Transport { status: u16, context: String },

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Serializable failure envelope for callers that relay errors as messages.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub operation: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_key: Option<String>,
}

impl SonarError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "TRANSPORT_ERROR",
            Self::InvalidBaseUrl(_) => "INVALID_BASE_URL",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Http(_) => "HTTP_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_payload(
        &self,
        operation: impl Into<String>,
        component_key: Option<String>,
    ) -> ErrorPayload {
        ErrorPayload {
            code: self.code().to_string(),
            message: self.to_string(),
            operation: operation.into(),
            trace_id: Uuid::new_v4().to_string(),
            component_key,
        }
    }
}
