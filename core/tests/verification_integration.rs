//! End-to-end verification flows through the public core API

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use hq_core::{
    AccessGrantPort, ChallengeStore, ChallengeSweepConfig, ChallengeSweepService, Clock,
    CodeGenerator, GrantRetryConfig, GrantRetryQueue, GrantRetryService, GrantStatus,
    InMemoryChallengeStore, InMemoryGrantRetryQueue, InMemoryVerifiedStore, Key,
    NotificationPort, VerificationError, VerificationService, VerificationServiceConfig,
    VerifiedStore,
};

struct FixedCode(&'static str);

impl CodeGenerator for FixedCode {
    fn generate(&self) -> String {
        self.0.to_string()
    }
}

struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    fn new() -> Self {
        Self(Mutex::new(Utc.with_ymd_and_hms(2024, 9, 2, 8, 30, 0).unwrap()))
    }

    fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl NotificationPort for Outbox {
    async fn send_code(&self, email: &str, code: &str) -> Result<(), String> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

#[derive(Default)]
struct Roles {
    grants: Mutex<HashMap<String, usize>>,
    failing: Mutex<bool>,
}

impl Roles {
    fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    fn count(&self, handle: &str) -> usize {
        self.grants.lock().unwrap().get(handle).copied().unwrap_or(0)
    }
}

#[async_trait]
impl AccessGrantPort for Roles {
    async fn grant(&self, handle: &str) -> Result<(), String> {
        if *self.failing.lock().unwrap() {
            return Err("role service returned 502".to_string());
        }
        *self
            .grants
            .lock()
            .unwrap()
            .entry(handle.to_string())
            .or_insert(0) += 1;
        Ok(())
    }
}

struct World {
    service: VerificationService<InMemoryChallengeStore, InMemoryVerifiedStore, Outbox, Roles>,
    challenges: Arc<InMemoryChallengeStore>,
    verified: Arc<InMemoryVerifiedStore>,
    outbox: Arc<Outbox>,
    roles: Arc<Roles>,
    clock: Arc<TestClock>,
    queue: Arc<InMemoryGrantRetryQueue>,
}

fn world(code: &'static str) -> World {
    let challenges = Arc::new(InMemoryChallengeStore::new());
    let verified = Arc::new(InMemoryVerifiedStore::new());
    let outbox = Arc::new(Outbox::default());
    let roles = Arc::new(Roles::default());
    let clock = Arc::new(TestClock::new());
    let queue = Arc::new(InMemoryGrantRetryQueue::new());

    let service = VerificationService::new(
        challenges.clone(),
        verified.clone(),
        outbox.clone(),
        roles.clone(),
        VerificationServiceConfig::default(),
    )
    .with_code_generator(Arc::new(FixedCode(code)))
    .with_clock(clock.clone())
    .with_grant_retry_queue(queue.clone());

    World {
        service,
        challenges,
        verified,
        outbox,
        roles,
        clock,
        queue,
    }
}

#[tokio::test]
async fn test_jsmith01_walkthrough() {
    let w = world("482193");
    let start = w.clock.now();

    w.service
        .begin_verification("jsmith01", "jsmith01@example.edu")
        .await
        .unwrap();

    let challenge = w.challenges.get("jsmith01").await.unwrap().unwrap();
    assert_eq!(challenge.email, "jsmith01@example.edu");
    assert_eq!(challenge.handle, "jsmith01");
    assert_eq!(challenge.code, "482193");
    assert_eq!(challenge.expires_at, start + Duration::hours(24));
    assert_eq!(
        w.outbox.sent.lock().unwrap().clone(),
        vec![("jsmith01@example.edu".to_string(), "482193".to_string())]
    );

    w.clock.advance(Duration::hours(23));
    let outcome = w
        .service
        .validate_response("jsmith01", "482193")
        .await
        .unwrap();

    assert_eq!(outcome.grant, GrantStatus::Granted);
    assert!(w.verified.is_verified("jsmith01@example.edu").await.unwrap());
    assert!(w.challenges.get("jsmith01").await.unwrap().is_none());
    assert_eq!(w.roles.count("jsmith01"), 1);
}

#[tokio::test]
async fn test_late_correct_code_is_expired() {
    let w = world("482193");
    w.service
        .begin_verification("jsmith01", "jsmith01@example.edu")
        .await
        .unwrap();

    w.clock.advance(Duration::hours(25));
    assert_eq!(
        w.service
            .validate_response("jsmith01", "482193")
            .await
            .unwrap_err(),
        VerificationError::ChallengeExpired
    );

    // A fresh challenge gets the user through
    w.service
        .begin_verification("jsmith01", "jsmith01@example.edu")
        .await
        .unwrap();
    assert!(w
        .service
        .validate_response("jsmith01", "482193")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_already_verified_regardless_of_handle() {
    let w = world("000042");
    w.service
        .begin_verification("jsmith01", "jsmith01@example.edu")
        .await
        .unwrap();
    w.service
        .validate_response("jsmith01", "000042")
        .await
        .unwrap();

    for handle in ["jsmith01", "impostor"] {
        assert_eq!(
            w.service
                .begin_verification(handle, "JSMITH01@example.edu")
                .await
                .unwrap_err(),
            VerificationError::AlreadyVerified
        );
    }
}

#[tokio::test]
async fn test_revoke_then_respond() {
    let w = world("482193");
    w.service
        .begin_verification("jsmith01", "jsmith01@example.edu")
        .await
        .unwrap();

    w.service.revoke(&Key::handle("jsmith01")).await.unwrap();

    assert_eq!(
        w.service
            .validate_response("jsmith01", "482193")
            .await
            .unwrap_err(),
        VerificationError::NoPendingChallenge
    );
}

#[tokio::test]
async fn test_deferred_grant_completed_by_retry_worker() {
    let w = world("482193");
    w.roles.set_failing(true);

    w.service
        .begin_verification("jsmith01", "jsmith01@example.edu")
        .await
        .unwrap();
    let outcome = w
        .service
        .validate_response("jsmith01", "482193")
        .await
        .unwrap();
    assert_eq!(outcome.grant, GrantStatus::Deferred);
    assert_eq!(w.queue.len().await, 1);

    w.roles.set_failing(false);
    let worker = GrantRetryService::new(
        w.verified.clone(),
        w.roles.clone(),
        w.service.grant_retry_queue(),
        GrantRetryConfig::default(),
    );
    let pass = worker.run_pass().await;

    assert_eq!(pass.granted, 1);
    assert_eq!(w.roles.count("jsmith01"), 1);
    assert!(w.queue.is_empty().await);
}

#[tokio::test]
async fn test_sweep_removes_abandoned_challenges() {
    let w = world("482193");
    w.service
        .begin_verification("jsmith01", "jsmith01@example.edu")
        .await
        .unwrap();

    w.clock.advance(Duration::days(3));

    let sweep = ChallengeSweepService::new(
        w.challenges.clone(),
        w.clock.clone(),
        ChallengeSweepConfig::default(),
    );
    assert_eq!(sweep.run_sweep().await.unwrap(), 1);
    assert!(w.challenges.is_empty().await);
    assert!(w.outbox.sent.lock().unwrap().len() == 1);
}
