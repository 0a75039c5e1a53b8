//! Wiring of stores, ports and background tasks from configuration

use actix_web::web;
use anyhow::Context;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

use hq_core::repositories::{
    ChallengeStore, InMemoryChallengeStore, InMemoryVerifiedStore, VerifiedStore,
};
use hq_core::services::{
    ChallengeSweepConfig, ChallengeSweepService, GrantRetryConfig, GrantRetryService,
    SystemClock, VerificationService, VerificationServiceConfig,
};
use hq_infra::database::ensure_schema;
use hq_infra::{
    create_access_grant, create_notifier, DatabasePool, MySqlChallengeStore, MySqlVerifiedStore,
    RedisChallengeStore, RedisClient,
};
use hq_shared::{AppConfig, ChallengeBackend, VerifiedBackend};

use crate::app::AppState;
use crate::middleware::AuthTokens;

/// Everything the HTTP server and the binary need
pub struct Application {
    pub state: web::Data<AppState>,
    pub tokens: web::Data<AuthTokens>,
    pub background_tasks: Vec<JoinHandle<()>>,
    pub database: Option<DatabasePool>,
}

impl Application {
    /// Connect the configured backends and start maintenance tasks
    pub async fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let database = if config.storage.needs_database() {
            let pool = DatabasePool::new(config.database.clone())
                .await
                .context("failed to connect to MySQL")?;
            if config.database.auto_migrate {
                ensure_schema(pool.get_pool())
                    .await
                    .context("failed to create tables")?;
            }
            Some(pool)
        } else {
            None
        };

        let cache = if config.storage.challenges == ChallengeBackend::Redis {
            let client = RedisClient::new(config.cache.clone())
                .await
                .context("failed to connect to Redis")?;
            Some(client)
        } else {
            None
        };

        let challenges: Arc<dyn ChallengeStore> = match config.storage.challenges {
            ChallengeBackend::Memory => Arc::new(InMemoryChallengeStore::new()),
            ChallengeBackend::Mysql => {
                let pool = database.as_ref().context("MySQL pool missing")?;
                Arc::new(MySqlChallengeStore::new(pool.get_pool().clone()))
            }
            ChallengeBackend::Redis => {
                let client = cache.as_ref().context("Redis client missing")?;
                Arc::new(RedisChallengeStore::new(
                    client.clone(),
                    chrono::Duration::hours(config.verification.expired_challenge_retention_hours),
                ))
            }
        };

        let verified: Arc<dyn VerifiedStore> = match config.storage.verified {
            VerifiedBackend::Memory => Arc::new(InMemoryVerifiedStore::new()),
            VerifiedBackend::Mysql => {
                let pool = database.as_ref().context("MySQL pool missing")?;
                Arc::new(MySqlVerifiedStore::new(pool.get_pool().clone()))
            }
        };

        info!(
            challenges = ?config.storage.challenges,
            verified = ?config.storage.verified,
            "Storage backends ready"
        );

        let notifier = create_notifier(&config.notification).context("invalid notification settings")?;
        let access = create_access_grant(&config.grant).context("invalid grant settings")?;

        let service = VerificationService::new(
            challenges.clone(),
            verified.clone(),
            notifier,
            access.clone(),
            VerificationServiceConfig::from(&config.verification),
        );

        let mut background_tasks = Vec::new();

        let retry = Arc::new(GrantRetryService::new(
            verified,
            access,
            service.grant_retry_queue(),
            GrantRetryConfig::from(&config.verification),
        ));
        background_tasks.extend(retry.start_background_task());

        let sweep = Arc::new(ChallengeSweepService::new(
            challenges,
            Arc::new(SystemClock),
            ChallengeSweepConfig::from(&config.verification),
        ));
        background_tasks.extend(sweep.start_background_task());

        let mut state = AppState::new(Arc::new(service));
        if let Some(database) = &database {
            state = state.with_database(database.clone());
        }
        if let Some(cache) = cache {
            state = state.with_cache(cache);
        }

        Ok(Self {
            state: web::Data::new(state),
            tokens: web::Data::new(AuthTokens::new(
                config.server.gateway_token.clone(),
                config.server.admin_token.clone(),
            )),
            background_tasks,
            database,
        })
    }

    /// Stop background tasks and close connections
    pub async fn shutdown(self) {
        for task in &self.background_tasks {
            task.abort();
        }
        if let Some(database) = &self.database {
            database.close().await;
        }
    }
}
