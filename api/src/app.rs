//! Application state and factory

use actix_web::{middleware::Logger, web, App, HttpResponse};
use std::sync::Arc;

use hq_core::repositories::{ChallengeStore, VerifiedStore};
use hq_core::services::{AccessGrantPort, NotificationPort, VerificationService};
use hq_infra::{DatabasePool, RedisClient};

use crate::handlers::ApiError;
use crate::middleware::{AuthTokens, RequestIdExt, RequestIdMiddleware};
use crate::routes;

/// Verification service with every backend behind a trait object
pub type DynVerificationService = VerificationService<
    dyn ChallengeStore,
    dyn VerifiedStore,
    dyn NotificationPort,
    dyn AccessGrantPort,
>;

/// State shared by all workers
pub struct AppState {
    pub verification: Arc<DynVerificationService>,
    /// Checked by `/health` when MySQL backs a store
    pub database: Option<DatabasePool>,
    /// Checked by `/health` when Redis backs the challenge store
    pub cache: Option<RedisClient>,
}

impl AppState {
    pub fn new(verification: Arc<DynVerificationService>) -> Self {
        Self {
            verification,
            database: None,
            cache: None,
        }
    }

    pub fn with_database(mut self, database: DatabasePool) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_cache(mut self, cache: RedisClient) -> Self {
        self.cache = Some(cache);
        self
    }
}

/// Build the application with routes, middleware and shared state
pub fn create_app(
    state: web::Data<AppState>,
    tokens: web::Data<AuthTokens>,
    max_payload_size: usize,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .app_data(tokens)
        .app_data(
            web::JsonConfig::default()
                .limit(max_payload_size)
                .error_handler(|err, req| {
                    ApiError::malformed_body(&err.to_string(), &req.request_id()).into()
                }),
        )
        // Last wrap runs first: the logger sees the request ID header
        .wrap(RequestIdMiddleware)
        .wrap(Logger::new("%a \"%r\" %s %b %Dms %{x-request-id}o"))
        .route("/health", web::get().to(routes::health::health_check))
        .service(
            web::scope("/api/v1")
                .configure(routes::verification::configure)
                .configure(routes::admin::configure),
        )
        .default_service(web::route().to(not_found))
}

/// Default 404 handler
async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(serde_json::json!({
        "error": "not_found",
        "message": "The requested resource was not found"
    }))
}
