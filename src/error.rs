// letter-rendering-service/src/error.rs

use crate::models::RequestStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LetterError>;

#[derive(Error, Debug)]
pub enum LetterError {
    #[error("Template error: {0}")]
    TemplateError(#[from] handlebars::TemplateError),

    #[error("Rendering error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    #[error("Cannot {action} a request in status {from}")]
    InvalidTransition {
        from: RequestStatus,
        action: &'static str,
    },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Render task failed: {0}")]
    TaskFailed(String),
}

impl LetterError {
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            error_type: match self {
                LetterError::TemplateError(_) => "template_error",
                LetterError::RenderError(_) => "render_error",
                LetterError::InvalidTransition { .. } => "invalid_transition",
                LetterError::MissingField(_) => "missing_field",
                LetterError::TaskFailed(_) => "task_failed",
            }
            .to_string(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
}
