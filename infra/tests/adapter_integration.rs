//! Verification flows running against the shipped adapters

use std::sync::Arc;
use std::time::Duration;

use hq_core::{
    CodeGenerator, GrantStatus, InMemoryChallengeStore, InMemoryVerifiedStore, VerificationError,
    VerificationService, VerificationServiceConfig,
};
use hq_infra::{LogAccessGrant, LogNotifier, WebhookNotifier};

struct FixedCode;

impl CodeGenerator for FixedCode {
    fn generate(&self) -> String {
        "482193".to_string()
    }
}

fn config() -> VerificationServiceConfig {
    VerificationServiceConfig {
        notify_timeout: Duration::from_secs(2),
        grant_timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_log_adapters_complete_a_verification() {
    let notifier = Arc::new(LogNotifier::new());
    let access = Arc::new(LogAccessGrant::new("verified"));
    let service = VerificationService::new(
        Arc::new(InMemoryChallengeStore::new()),
        Arc::new(InMemoryVerifiedStore::new()),
        notifier.clone(),
        access.clone(),
        config(),
    )
    .with_code_generator(Arc::new(FixedCode));

    service
        .begin_verification("jsmith01", "jsmith01@example.edu")
        .await
        .unwrap();
    assert_eq!(notifier.sent_count(), 1);

    let outcome = service.validate_response("jsmith01", "482193").await.unwrap();
    assert_eq!(outcome.grant, GrantStatus::Granted);
    assert!(access.is_granted("jsmith01"));
}

#[tokio::test]
async fn test_unreachable_mailer_reports_delivery_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/send", listener.local_addr().unwrap());
    drop(listener);

    let challenges = Arc::new(InMemoryChallengeStore::new());
    let service = VerificationService::new(
        challenges.clone(),
        Arc::new(InMemoryVerifiedStore::new()),
        Arc::new(WebhookNotifier::new(url, None, Duration::from_secs(1)).unwrap()),
        Arc::new(LogAccessGrant::new("verified")),
        config(),
    )
    .with_code_generator(Arc::new(FixedCode));

    let err = service
        .begin_verification("jsmith01", "jsmith01@example.edu")
        .await
        .unwrap_err();
    assert!(matches!(err, VerificationError::DeliveryFailed { .. }));

    // The challenge survives a failed delivery
    assert_eq!(challenges.len().await, 1);
    assert!(service.validate_response("jsmith01", "482193").await.is_ok());
}
