//! Administrative endpoints

use actix_web::{web, HttpRequest, HttpResponse};
use tracing::info;

use hq_core::domain::Key;
use hq_core::errors::VerificationError;

use crate::app::AppState;
use crate::dto::RevokeRequest;
use crate::handlers::ApiError;
use crate::middleware::{AdminAccess, RequestIdExt};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/admin").route("/revoke", web::post().to(revoke)));
}

/// Handler for POST /api/v1/admin/revoke
///
/// ```json
/// { "key": { "kind": "email", "value": "jsmith01@example.edu" } }
/// ```
///
/// Answers 204 whether or not a challenge existed.
pub async fn revoke(
    req: HttpRequest,
    state: web::Data<AppState>,
    _admin: AdminAccess,
    body: web::Json<RevokeRequest>,
) -> Result<HttpResponse, ApiError> {
    let request_id = req.request_id();
    let body = body.into_inner();

    if !body.is_valid() {
        let error = match body.key {
            Key::Email(_) => VerificationError::InvalidEmail,
            Key::Handle(_) => VerificationError::InvalidHandle,
        };
        return Err(ApiError::from_verification(&error, &request_id));
    }

    state
        .verification
        .revoke(&body.key)
        .await
        .map_err(|e| ApiError::from_verification(&e, &request_id))?;

    info!(request_id = %request_id, kind = body.key.kind(), "Challenge revoked by admin");
    Ok(HttpResponse::NoContent().finish())
}
