use std::borrow::Cow;

use actix_multipart::MultipartError;
use actix_web::{
    error::{JsonPayloadError, PayloadError, ResponseError},
    http::{header::ContentType, StatusCode},
    HttpResponse
};
use derive_more::Display;
use serde::Serialize;
use validator::ValidationErrors;

/// Every failure the API can report. Each variant maps to one HTTP status and
/// one stable `error` kind in the response body.
#[derive(Debug, Display)]
pub enum AppError {
    #[display("validation error: {}", join_field_errors(_0))]
    ValidationError(Vec<FieldError>),

    #[display("Bad request: {_0}")]
    BadRequest(String),

    #[display("No file uploaded under field '{_0}'")]
    MissingFile(String),

    #[display("Unauthorized access")]
    UnauthorizedAccess,

    #[display("Not found: {_0}")]
    NotFound(String),

    #[display("Project {_0} not found")]
    ProjectNotFound(i64),

    #[display("Message {_0} not found")]
    MessageNotFound(i64),

    #[display("Resume not found: {_0}")]
    ResumeNotFound(String),

    #[display("Project {_0} is synced from GitHub and cannot be deleted")]
    GithubSyncedProject(i64),

    #[display("Conflict: {_0}")]
    Conflict(String),

    #[display("File too large: {_0}")]
    PayloadTooLarge(String),

    #[display("Invalid file type: {_0}")]
    InvalidFileType(String),

    #[display("Too many requests, retry after {_0}s")]
    RateLimited(u64),

    #[display("Database error: {_0}")]
    DatabaseError(String),

    #[display("Failed to fetch projects: {_0}")]
    ProjectsUnavailable(String),

    #[display("IO error: {_0}")]
    IoError(String),

    #[display("Internal server error: {_0}")]
    InternalError(String),

    #[display("GitHub API unavailable: {_0}")]
    GithubUnavailable(String),

    #[display("Message could not be stored or delivered")]
    ContactDeliveryFailed,
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors.iter()
        .map(|e| format!("{}:{}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl AppError {
    /// Stable, machine-readable kind reported as the `error` field.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::BadRequest(_) => "bad_request",
            AppError::MissingFile(_) => "missing_file",
            AppError::UnauthorizedAccess => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::ProjectNotFound(_) => "project_not_found",
            AppError::MessageNotFound(_) => "message_not_found",
            AppError::ResumeNotFound(_) => "resume_not_found",
            AppError::GithubSyncedProject(_) => "github_synced_project",
            AppError::Conflict(_) => "conflict",
            AppError::PayloadTooLarge(_) => "file_too_large",
            AppError::InvalidFileType(_) => "invalid_file_type",
            AppError::RateLimited(_) => "rate_limited",
            AppError::DatabaseError(_) => "database_error",
            AppError::ProjectsUnavailable(_) => "projects_unavailable",
            AppError::IoError(_) => "io_error",
            AppError::InternalError(_) => "internal_error",
            AppError::GithubUnavailable(_) => "github_unavailable",
            AppError::ContactDeliveryFailed => "contact_delivery_failed",
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let mut body = serde_json::json!({
            "success": false,
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let AppError::ValidationError(errors) = self {
            body["details"] = serde_json::json!(errors);
        }

        let mut builder = HttpResponse::build(self.status_code());
        builder.insert_header(ContentType::json());
        if let AppError::RateLimited(retry_after) = self {
            builder.insert_header(("Retry-After", retry_after.to_string()));
        }
        builder.json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::MissingFile(_) => StatusCode::BAD_REQUEST,
            AppError::UnauthorizedAccess => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_)
            | AppError::ProjectNotFound(_)
            | AppError::MessageNotFound(_)
            | AppError::ResumeNotFound(_) => StatusCode::NOT_FOUND,
            AppError::GithubSyncedProject(_) | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::InvalidFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::DatabaseError(_)
            | AppError::ProjectsUnavailable(_)
            | AppError::IoError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::GithubUnavailable(_) | AppError::ContactDeliveryFailed => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(|e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string()),
                })
            })
            .collect();

        AppError::ValidationError(field_errors)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(e) if e.code() == Some(Cow::Borrowed("23505")) => {
                AppError::Conflict("Database conflict occurred".into())
            }
            sqlx::Error::RowNotFound => AppError::NotFound("Database row not found".into()),
            _ => AppError::DatabaseError(err.to_string())
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        match err {
            MultipartError::ContentTypeMissing
            | MultipartError::ContentTypeParse
            | MultipartError::ContentTypeIncompatible => {
                AppError::BadRequest("Request must be multipart/form-data".to_string())
            }
            MultipartError::Payload(PayloadError::Overflow) => {
                AppError::PayloadTooLarge("Upload exceeds the allowed size".to_string())
            }
            _ => AppError::BadRequest(err.to_string()),
        }
    }
}

impl From<JsonPayloadError> for AppError {
    fn from(err: JsonPayloadError) -> Self {
        match err {
            JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
                AppError::PayloadTooLarge("JSON body is too large".to_string())
            }
            JsonPayloadError::ContentType => {
                AppError::BadRequest("Content type must be application/json".to_string())
            }
            other => AppError::BadRequest(format!("Invalid JSON payload: {other}")),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
