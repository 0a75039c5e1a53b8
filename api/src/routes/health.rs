use actix_web::{web, HttpResponse};
use std::collections::BTreeMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::warn;

use hq_infra::InfrastructureError;

use crate::app::AppState;
use crate::dto::{HealthResponse, HealthStatus, ServiceHealth};

const CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Health check endpoint handler
///
/// Pings every external backend the service was built with. Any failure
/// turns the response into a 503 so load balancers stop routing here.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let mut services = BTreeMap::new();

    if let Some(database) = &state.database {
        let health = check("mysql", database.health_check()).await;
        services.insert(
            "mysql".to_string(),
            health.with_pool(database.statistics().into()),
        );
    }

    if let Some(cache) = &state.cache {
        services.insert("redis".to_string(), check("redis", cache.health_check()).await);
    }

    let response = HealthResponse::new(services);
    match response.status {
        HealthStatus::Healthy => HttpResponse::Ok().json(response),
        HealthStatus::Unhealthy => HttpResponse::ServiceUnavailable().json(response),
    }
}

async fn check<F>(name: &str, ping: F) -> ServiceHealth
where
    F: Future<Output = Result<bool, InfrastructureError>>,
{
    let started = Instant::now();
    let outcome = timeout(CHECK_TIMEOUT, ping).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(Ok(true)) => ServiceHealth::healthy(elapsed_ms),
        Ok(Ok(false)) => {
            warn!(backend = name, "Health check got an unexpected reply");
            ServiceHealth::unhealthy("unexpected reply", elapsed_ms)
        }
        Ok(Err(e)) => {
            warn!(backend = name, error = %e, "Health check failed");
            ServiceHealth::unhealthy(e.to_string(), elapsed_ms)
        }
        Err(_) => {
            warn!(backend = name, "Health check timed out");
            ServiceHealth::unhealthy("timed out", elapsed_ms)
        }
    }
}
