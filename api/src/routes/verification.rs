//! Verification endpoints for the authenticated platform sender

use actix_web::{web, HttpRequest, HttpResponse};
use tracing::{info, warn};
use validator::Validate;

use hq_shared::validation::mask_email;

use crate::app::AppState;
use crate::dto::{
    BeginVerificationRequest, BeginVerificationResponse, RespondRequest, RespondResponse,
    StatusResponse,
};
use crate::handlers::ApiError;
use crate::middleware::{PlatformSender, RequestIdExt};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/verification")
            .route("/begin", web::post().to(begin))
            .route("/respond", web::post().to(respond))
            .route("/status", web::get().to(status)),
    );
}

/// Handler for POST /api/v1/verification/begin
///
/// # Request Body
///
/// ```json
/// { "email": "jsmith01@example.edu" }
/// ```
///
/// ## Success (202 Accepted)
/// ```json
/// { "status": "pending", "email": "jsmith01@example.edu", "expires_at": "2024-03-02T12:00:00Z" }
/// ```
pub async fn begin(
    req: HttpRequest,
    state: web::Data<AppState>,
    sender: PlatformSender,
    body: web::Json<BeginVerificationRequest>,
) -> Result<HttpResponse, ApiError> {
    let request_id = req.request_id();

    if let Err(errors) = body.validate() {
        warn!(request_id = %request_id, handle = %sender.handle, "Invalid begin request");
        return Err(ApiError::validation(&errors, &request_id));
    }

    info!(
        request_id = %request_id,
        handle = %sender.handle,
        email = %mask_email(body.email.trim()),
        "Processing begin verification request"
    );

    let outcome = state
        .verification
        .begin_verification(&sender.handle, &body.email)
        .await
        .map_err(|e| ApiError::from_verification(&e, &request_id))?;

    Ok(HttpResponse::Accepted().json(BeginVerificationResponse::from(outcome)))
}

/// Handler for POST /api/v1/verification/respond
///
/// ## Success (200 OK)
/// ```json
/// { "status": "verified", "email": "jsmith01@example.edu", "verified_at": "...", "grant": "granted" }
/// ```
pub async fn respond(
    req: HttpRequest,
    state: web::Data<AppState>,
    sender: PlatformSender,
    body: web::Json<RespondRequest>,
) -> Result<HttpResponse, ApiError> {
    let request_id = req.request_id();

    if let Err(errors) = body.validate() {
        return Err(ApiError::validation(&errors, &request_id));
    }

    let outcome = state
        .verification
        .validate_response(&sender.handle, &body.code)
        .await
        .map_err(|e| ApiError::from_verification(&e, &request_id))?;

    Ok(HttpResponse::Ok().json(RespondResponse::from(outcome)))
}

/// Handler for GET /api/v1/verification/status
pub async fn status(
    req: HttpRequest,
    state: web::Data<AppState>,
    sender: PlatformSender,
) -> Result<HttpResponse, ApiError> {
    let identity_state = state
        .verification
        .status(&sender.handle)
        .await
        .map_err(|e| ApiError::from_verification(&e, &req.request_id()))?;

    Ok(HttpResponse::Ok().json(StatusResponse {
        handle: sender.handle,
        state: identity_state,
    }))
}
