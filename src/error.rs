use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::extract::body_error_field;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{message}")]
    InvalidBody {
        message: String,
        field: Option<String>,
    },

    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("Internal error: {0}")]
    Internal(anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{what} not found"))
    }

    pub fn forbidden() -> Self {
        AppError::Forbidden("You do not have access to this resource".into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::InvalidBody { .. } | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        let (code, constraint) = match &e {
            sqlx::Error::RowNotFound => return AppError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db) => (
                db.code().map(|c| c.into_owned()),
                db.constraint().map(str::to_owned),
            ),
            _ => (None, None),
        };

        match code.as_deref() {
            // unique_violation
            Some("23505") => AppError::Conflict(conflict_message(constraint.as_deref())),
            // foreign_key_violation
            Some("23503") => AppError::BadRequest("Referenced record does not exist".into()),
            _ => AppError::Internal(e.into()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        let field = match &rejection {
            JsonRejection::JsonDataError(_) => body_error_field(&message),
            _ => None,
        };
        AppError::InvalidBody { message, field }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<sqlx::Error>() {
            Ok(db) => db.into(),
            Err(e) => AppError::Internal(e),
        }
    }
}

fn conflict_message(constraint: Option<&str>) -> String {
    match constraint {
        Some(c) if c.contains("email") => "Email already registered".into(),
        Some(c) if c.contains("username") => "Username already taken".into(),
        _ => "Resource already exists".into(),
    }
}

/// Flattens nested validation errors into `path.to[0].field -> [messages]`.
fn flatten_validation(
    prefix: &str,
    errors: &ValidationErrors,
    out: &mut serde_json::Map<String, serde_json::Value>,
) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                let messages: Vec<String> = errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                out.insert(path, json!(messages));
            }
            ValidationErrorsKind::Struct(inner) => flatten_validation(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    flatten_validation(&format!("{path}[{idx}]"), inner, out);
                }
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let reason = status.canonical_reason().unwrap_or("Error");

        let body = match &self {
            AppError::Validation(errors) => {
                let mut fields = serde_json::Map::new();
                flatten_validation("", errors, &mut fields);
                json!({
                    "statusCode": status.as_u16(),
                    "error": reason,
                    "message": self.to_string(),
                    "fields": fields,
                })
            }
            AppError::InvalidBody {
                message,
                field: Some(field),
            } => json!({
                "statusCode": status.as_u16(),
                "error": reason,
                "message": message,
                "fields": { field.as_str(): [message] },
            }),
            AppError::Internal(e) => {
                error!(error = ?e, "internal error");
                json!({
                    "statusCode": status.as_u16(),
                    "error": reason,
                    "message": "Internal server error",
                })
            }
            other => json!({
                "statusCode": status.as_u16(),
                "error": reason,
                "message": other.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
