//! Sender authentication for gateway and admin requests
//!
//! The chat gateway resolves the platform sender and forwards it in
//! `X-Platform-Handle`. That header is only trusted when the request also
//! carries the shared gateway secret, so a client talking to the API directly
//! cannot claim someone else's handle.

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use constant_time_eq::constant_time_eq;
use std::future::{ready, Ready};
use tracing::warn;

use hq_core::errors::VerificationError;
use hq_shared::validation::is_valid_handle;

use crate::handlers::ApiError;
use crate::middleware::request_id::RequestIdExt;

pub const GATEWAY_TOKEN_HEADER: &str = "X-Gateway-Token";
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";
pub const PLATFORM_HANDLE_HEADER: &str = "X-Platform-Handle";

/// Shared secrets checked by the extractors
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub gateway_token: String,
    pub admin_token: String,
}

impl AuthTokens {
    pub fn new(gateway_token: impl Into<String>, admin_token: impl Into<String>) -> Self {
        Self {
            gateway_token: gateway_token.into(),
            admin_token: admin_token.into(),
        }
    }
}

/// An empty configured secret never matches
fn token_matches(expected: &str, presented: Option<&str>) -> bool {
    match presented {
        Some(presented) if !expected.is_empty() => {
            constant_time_eq(expected.as_bytes(), presented.as_bytes())
        }
        _ => false,
    }
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
}

fn configured_tokens(req: &HttpRequest) -> Option<&AuthTokens> {
    req.app_data::<web::Data<AuthTokens>>().map(|data| data.get_ref())
}

/// Authenticated platform sender
#[derive(Debug, Clone)]
pub struct PlatformSender {
    pub handle: String,
}

fn extract_sender(req: &HttpRequest) -> Result<PlatformSender, ApiError> {
    let request_id = req.request_id();
    let Some(tokens) = configured_tokens(req) else {
        return Err(ApiError::unauthorized("Gateway authentication is not configured", &request_id));
    };

    if !token_matches(&tokens.gateway_token, header(req, GATEWAY_TOKEN_HEADER)) {
        warn!(path = req.path(), event = "gateway_auth_failed", "Rejected request without a valid gateway token");
        return Err(ApiError::unauthorized("Missing or invalid gateway token", &request_id));
    }

    match header(req, PLATFORM_HANDLE_HEADER) {
        Some(handle) if is_valid_handle(handle) => Ok(PlatformSender {
            handle: handle.to_string(),
        }),
        _ => Err(ApiError::from_verification(
            &VerificationError::InvalidHandle,
            &request_id,
        )),
    }
}

impl FromRequest for PlatformSender {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract_sender(req))
    }
}

/// Marker for requests carrying the admin secret
#[derive(Debug, Clone, Copy)]
pub struct AdminAccess;

impl FromRequest for AdminAccess {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let authorized = configured_tokens(req)
            .map(|tokens| token_matches(&tokens.admin_token, header(req, ADMIN_TOKEN_HEADER)))
            .unwrap_or(false);

        if authorized {
            ready(Ok(AdminAccess))
        } else {
            warn!(path = req.path(), event = "admin_auth_failed", "Rejected admin request");
            ready(Err(ApiError::unauthorized(
                "Missing or invalid admin token",
                &req.request_id(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test as actix_test;

    fn request() -> actix_test::TestRequest {
        actix_test::TestRequest::default().app_data(web::Data::new(AuthTokens::new("gw-secret", "admin-secret")))
    }

    #[test]
    fn test_token_matches() {
        assert!(token_matches("secret", Some("secret")));
        assert!(!token_matches("secret", Some("secreT")));
        assert!(!token_matches("secret", None));
        assert!(!token_matches("", Some("")));
    }

    #[test]
    fn test_sender_requires_gateway_token() {
        let req = request()
            .insert_header((PLATFORM_HANDLE_HEADER, "jsmith01"))
            .to_http_request();
        let err = extract_sender(&req).unwrap_err();
        assert_eq!(err.status(), actix_web::http::StatusCode::UNAUTHORIZED);

        let req = request()
            .insert_header((GATEWAY_TOKEN_HEADER, "gw-secret"))
            .insert_header((PLATFORM_HANDLE_HEADER, "jsmith01"))
            .to_http_request();
        assert_eq!(extract_sender(&req).unwrap().handle, "jsmith01");
    }

    #[test]
    fn test_sender_requires_handle() {
        let req = request()
            .insert_header((GATEWAY_TOKEN_HEADER, "gw-secret"))
            .to_http_request();
        let err = extract_sender(&req).unwrap_err();
        assert_eq!(err.body().error, "invalid_handle");
    }

    #[test]
    fn test_sender_rejected_without_configuration() {
        let req = actix_test::TestRequest::default()
            .insert_header((GATEWAY_TOKEN_HEADER, ""))
            .insert_header((PLATFORM_HANDLE_HEADER, "jsmith01"))
            .to_http_request();
        assert!(extract_sender(&req).is_err());
    }
}
