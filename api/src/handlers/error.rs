//! HTTP rendering of verification and request errors

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::collections::BTreeMap;
use std::fmt;
use validator::ValidationErrors;

use hq_core::errors::{Guidance, VerificationError};
use hq_shared::ErrorResponse;

/// Map a verification error to its HTTP status
pub fn status_for(error: &VerificationError) -> StatusCode {
    match error {
        VerificationError::AlreadyVerified | VerificationError::DuplicateEmail => StatusCode::CONFLICT,
        VerificationError::NoPendingChallenge => StatusCode::NOT_FOUND,
        VerificationError::ChallengeExpired => StatusCode::GONE,
        VerificationError::CodeMismatch => StatusCode::BAD_REQUEST,
        VerificationError::InvalidEmail | VerificationError::InvalidHandle => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        VerificationError::StoreUnavailable { .. }
        | VerificationError::DeliveryFailed { .. }
        | VerificationError::GrantFailed { .. } => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Text shown to the caller
///
/// Backend details stay in the logs.
fn public_message(error: &VerificationError) -> String {
    match error {
        VerificationError::StoreUnavailable { .. } => {
            "Verification is temporarily unavailable. Please try again shortly.".to_string()
        }
        VerificationError::DeliveryFailed { .. } => {
            "The verification code could not be sent. Please ask for a new one.".to_string()
        }
        VerificationError::GrantFailed { .. } => {
            "Your email is verified but access could not be granted yet.".to_string()
        }
        other => other.to_string(),
    }
}

/// Error returned by handlers and extractors
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn from_verification(error: &VerificationError, request_id: &str) -> Self {
        Self {
            status: status_for(error),
            body: ErrorResponse::new(error.code(), public_message(error), error.guidance().as_str())
                .retryable(error.is_retryable())
                .with_request_id(request_id),
        }
    }

    /// Missing or wrong gateway/admin credentials
    pub fn unauthorized(message: impl Into<String>, request_id: &str) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            body: ErrorResponse::new("unauthorized", message, Guidance::ContactSupport.as_str())
                .with_request_id(request_id),
        }
    }

    /// Request body failed field validation
    pub fn validation(errors: &ValidationErrors, request_id: &str) -> Self {
        let fields: BTreeMap<_, _> = errors.field_errors().into_iter().collect();
        let names: Vec<&str> = fields.keys().copied().collect();
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ErrorResponse::new(
                "validation_error",
                format!("Invalid request fields: {}", names.join(", ")),
                Guidance::FixInput.as_str(),
            )
            .with_request_id(request_id),
        }
    }

    /// Body could not be parsed as the expected JSON
    pub fn malformed_body(detail: &str, request_id: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorResponse::new(
                "malformed_request",
                format!("Request body could not be read: {}", detail),
                Guidance::FixInput.as_str(),
            )
            .with_request_id(request_id),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorResponse {
        &self.body
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.body.error, self.body.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(&self.body)
    }
}
