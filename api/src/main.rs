use actix_web::HttpServer;
use anyhow::Context;
use tracing::{info, warn};

use hq_api::{create_app, telemetry, Application};
use hq_shared::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init_tracing(&config.logging);

    info!(
        environment = %config.environment,
        "Starting Harlequin verification service"
    );

    if config.server.gateway_token.is_empty() {
        warn!("GATEWAY_TOKEN is empty; every verification request will be rejected");
    }

    let application = Application::build(&config).await?;

    let state = application.state.clone();
    let tokens = application.tokens.clone();
    let max_payload_size = config.server.max_payload_size;
    let bind_address = config.server.bind_address();

    let mut server = HttpServer::new(move || create_app(state.clone(), tokens.clone(), max_payload_size));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    info!("Server will bind to: {}", bind_address);
    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await
        .context("server error")?;

    application.shutdown().await;
    info!("Harlequin stopped");
    Ok(())
}
