use crate::webhook_models::ReceivedField;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::fmt;

/// Application-specific error types.
///
/// Every variant becomes a JSON response; none of them take the process down.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Body was not valid JSON.
    InvalidJson(String),
    /// No shape matcher found a question list.
    NoQuestions { raw_body: Value },
    /// The configured domain question is absent or blank.
    DomainMissing {
        domain_field_id: String,
        received_fields: Vec<ReceivedField>,
    },
    /// Neither explicit nor automatic mapping produced a value.
    NothingToUpdate { received_fields: Vec<ReceivedField> },
    /// No company matches the domain.
    CompanyNotFound { domain: String },
    /// The company exists but has no entry in the configured list.
    ListEntryNotFound { domain: String, company_id: String },
    /// Webhook route called with an unsupported method.
    MethodNotAllowed,
    /// Error interacting with the Attio API.
    ExternalApiError(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InvalidJson(msg) => write!(f, "Invalid JSON body: {}", msg),
            AppError::NoQuestions { .. } => write!(f, "No questions found in the payload"),
            AppError::DomainMissing {
                domain_field_id, ..
            } => write!(f, "No domain field found with ID: {}", domain_field_id),
            AppError::NothingToUpdate { .. } => {
                write!(f, "No fields to update were found in the form")
            }
            AppError::CompanyNotFound { domain } => {
                write!(f, "No company found with domain: {}", domain)
            }
            AppError::ListEntryNotFound { domain, .. } => write!(
                f,
                "No list entry found for the company with domain: {}",
                domain
            ),
            AppError::MethodNotAllowed => write!(f, "Method not allowed"),
            AppError::ExternalApiError(msg) => write!(f, "{}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidJson(_)
            | AppError::NoQuestions { .. }
            | AppError::DomainMissing { .. }
            | AppError::NothingToUpdate { .. } => StatusCode::BAD_REQUEST,
            AppError::CompanyNotFound { .. } | AppError::ListEntryNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::ExternalApiError(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::WithContext { source, .. } => source.status_code(),
        }
    }
}

impl IntoResponse for AppError {
    /// Maps each variant to its status code and JSON body.
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        let body = match self {
            AppError::InvalidJson(_) => json!({
                "error": "Invalid JSON",
                "message": message,
            }),
            AppError::NoQuestions { raw_body } => {
                tracing::warn!("⚠️  No questions found in the Fillout payload");
                json!({
                    "error": "No questions in payload",
                    "message": message,
                    "rawBody": raw_body,
                })
            }
            AppError::DomainMissing {
                received_fields, ..
            } => json!({
                "error": "Domain not provided",
                "message": message,
                "receivedFields": received_fields,
            }),
            AppError::NothingToUpdate { received_fields } => {
                tracing::warn!("❌ No fields to update");
                json!({
                    "error": "No fields to update",
                    "message": message,
                    "receivedFields": received_fields,
                })
            }
            AppError::CompanyNotFound { .. } => {
                tracing::info!("❌ Company not found");
                json!({
                    "error": "Company not found",
                    "message": message,
                })
            }
            AppError::ListEntryNotFound { company_id, .. } => {
                tracing::info!("❌ Entry not found in list");
                json!({
                    "error": "List entry not found",
                    "message": message,
                    "companyId": company_id,
                    "hint": "Check that an entry in your list is linked to this company",
                })
            }
            AppError::MethodNotAllowed => json!({ "error": message }),
            AppError::WithContext { source, context }
                if status != StatusCode::INTERNAL_SERVER_ERROR =>
            {
                // Client-facing errors keep their own body
                tracing::debug!("Error with context: {} -> {}", context, source);
                return (*source).into_response();
            }
            AppError::ExternalApiError(_)
            | AppError::InternalError(_)
            | AppError::WithContext { .. } => {
                tracing::error!("❌ Error processing webhook: {}", message);
                json!({
                    "success": false,
                    "error": message,
                    "timestamp": chrono::Utc::now()
                        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                })
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::ExternalApiError(format!("Attio request failed: {}", err))
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}
