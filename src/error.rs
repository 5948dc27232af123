use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")] Database(#[from] sea_orm::DbErr),

    #[error("{message}")] Validation {
        message: String,
        field: Option<String>,
    },

    #[error("{0} not found")] NotFound(String),

    #[error("{0}")] InvalidState(String),

    #[error("Unauthorized: {0}")] Unauthorized(String),

    #[error("Notification error: {0}")] Notification(String),

    #[error("Configuration error: {0}")] Config(String),

    #[error("Internal error: {0}")] Internal(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(serde::Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation { message: message.into(), field: None }
    }

    pub fn validation_field(field: &str, message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }

    /// Attach a field name to a validation error, e.g. after enum parsing.
    pub fn with_field(self, field: &str) -> Self {
        match self {
            AppError::Validation { message, .. } => AppError::validation_field(field, message),
            other => other,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let (code, message, field) = match self {
            AppError::Database(e) => ("DATABASE_ERROR", e.to_string(), None),
            AppError::Validation { message, field } =>
                ("VALIDATION_ERROR", message.clone(), field.clone()),
            AppError::NotFound(what) => ("NOT_FOUND", format!("{} not found", what), None),
            AppError::InvalidState(msg) => ("INVALID_STATE", msg.clone(), None),
            AppError::Unauthorized(msg) => ("UNAUTHORIZED", msg.clone(), None),
            AppError::Notification(msg) => ("NOTIFICATION_ERROR", msg.clone(), None),
            AppError::Config(msg) => ("CONFIG_ERROR", msg.clone(), None),
            AppError::Internal(msg) => ("INTERNAL_ERROR", msg.clone(), None),
        };

        ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field,
            },
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::NotFound(_) => axum::http::StatusCode::NOT_FOUND,
            AppError::Validation { .. } | AppError::InvalidState(_) => {
                axum::http::StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => axum::http::StatusCode::UNAUTHORIZED,
            _ => axum::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        let response = self.to_error_response();
        (status, axum::Json(response)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
