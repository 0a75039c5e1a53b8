//! Unit tests for verification service

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::domain::entities::{Challenge, IdentityKey, Key, CODE_LENGTH};
use crate::errors::VerificationError;
use crate::repositories::{
    ChallengeStore, InMemoryChallengeStore, InMemoryVerifiedStore, VerifiedStore,
};
use crate::services::clock::Clock;
use crate::services::maintenance::{GrantRetryQueue, InMemoryGrantRetryQueue};
use crate::services::verification::{
    GrantStatus, IdentityState, VerificationService, VerificationServiceConfig,
};

use super::mocks::{
    Harness, ManualClock, MockAccessGrant, MockNotifier, ReadOnlyVerifiedStore,
    ReissuingChallengeStore, SequenceCodeGenerator, UnavailableChallengeStore,
};

const HANDLE: &str = "jsmith01";
const EMAIL: &str = "jsmith01@example.edu";

#[tokio::test]
async fn test_begin_verification_success() {
    let h = Harness::new();

    let outcome = h.service.begin_verification(HANDLE, EMAIL).await.unwrap();
    assert_eq!(outcome.handle, HANDLE);
    assert_eq!(outcome.email, EMAIL);
    assert_eq!(outcome.expires_at - outcome.issued_at, Duration::hours(24));

    let stored = h.challenges.get(HANDLE).await.unwrap().unwrap();
    assert_eq!(stored.code.len(), CODE_LENGTH);
    assert_eq!(h.notifier.last_code(EMAIL), Some(stored.code));
}

#[tokio::test]
async fn test_begin_verification_normalizes_email() {
    let h = Harness::new();

    let outcome = h
        .service
        .begin_verification(HANDLE, " JSmith01@Example.EDU ")
        .await
        .unwrap();
    assert_eq!(outcome.email, EMAIL);
    assert_eq!(h.notifier.send_count(EMAIL), 1);
}

#[tokio::test]
async fn test_begin_verification_rejects_invalid_input() {
    let h = Harness::new();

    assert_eq!(
        h.service.begin_verification(HANDLE, "not-an-email").await.unwrap_err(),
        VerificationError::InvalidEmail
    );
    assert_eq!(
        h.service.begin_verification("", EMAIL).await.unwrap_err(),
        VerificationError::InvalidHandle
    );
    assert!(h.challenges.is_empty().await);
}

#[tokio::test]
async fn test_begin_verification_already_verified_has_no_side_effects() {
    let h = Harness::new();
    h.service.begin_verification(HANDLE, EMAIL).await.unwrap();
    let code = h.notifier.last_code(EMAIL).unwrap();
    h.service.validate_response(HANDLE, &code).await.unwrap();

    let err = h
        .service
        .begin_verification("someone_else", EMAIL)
        .await
        .unwrap_err();
    assert_eq!(err, VerificationError::AlreadyVerified);
    assert!(h.challenges.get("someone_else").await.unwrap().is_none());
    assert_eq!(h.notifier.send_count(EMAIL), 1);
}

#[tokio::test]
async fn test_delivery_failure_keeps_challenge() {
    let h = Harness::with_ports(MockNotifier::new(true), MockAccessGrant::new(false));

    let err = h.service.begin_verification(HANDLE, EMAIL).await.unwrap_err();
    assert!(matches!(err, VerificationError::DeliveryFailed { .. }));
    assert!(err.is_retryable());
    assert!(h.challenges.get(HANDLE).await.unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_delivery_timeout_keeps_challenge() {
    let h = Harness::with_ports(
        MockNotifier::slow(std::time::Duration::from_secs(30)),
        MockAccessGrant::new(false),
    );

    match h.service.begin_verification(HANDLE, EMAIL).await.unwrap_err() {
        VerificationError::DeliveryFailed { message } => assert!(message.contains("timed out")),
        other => panic!("Expected DeliveryFailed, got {:?}", other),
    }
    assert!(h.challenges.get(HANDLE).await.unwrap().is_some());
}

#[tokio::test]
async fn test_validate_response_success() {
    let h = Harness::new();
    h.service.begin_verification(HANDLE, EMAIL).await.unwrap();
    let code = h.notifier.last_code(EMAIL).unwrap();

    let outcome = h.service.validate_response(HANDLE, &code).await.unwrap();
    assert_eq!(outcome.grant, GrantStatus::Granted);
    assert_eq!(outcome.record.email, EMAIL);
    assert_eq!(outcome.record.handle, HANDLE);

    assert!(h.verified.is_verified(EMAIL).await.unwrap());
    assert!(h.challenges.get(HANDLE).await.unwrap().is_none());
    assert_eq!(h.access.grant_count(HANDLE), 1);
}

#[tokio::test]
async fn test_validate_response_trims_submitted_code() {
    let h = Harness::new();
    h.service.begin_verification(HANDLE, EMAIL).await.unwrap();
    let code = h.notifier.last_code(EMAIL).unwrap();

    let padded = format!("  {}\n", code);
    assert!(h.service.validate_response(HANDLE, &padded).await.is_ok());
}

#[tokio::test]
async fn test_code_mismatch_keeps_challenge() {
    let h = Harness::new();
    let service = h
        .service
        .with_code_generator(Arc::new(SequenceCodeGenerator::new(&["482193"])));
    service.begin_verification(HANDLE, EMAIL).await.unwrap();

    assert_eq!(
        service.validate_response(HANDLE, "482194").await.unwrap_err(),
        VerificationError::CodeMismatch
    );
    assert_eq!(
        service.validate_response(HANDLE, "not a code").await.unwrap_err(),
        VerificationError::CodeMismatch
    );

    // The right code still works afterwards
    assert!(service.validate_response(HANDLE, "482193").await.is_ok());
}

#[tokio::test]
async fn test_no_pending_challenge() {
    let h = Harness::new();
    assert_eq!(
        h.service.validate_response(HANDLE, "123456").await.unwrap_err(),
        VerificationError::NoPendingChallenge
    );
}

#[tokio::test]
async fn test_expired_challenge_is_reported_then_removed() {
    let h = Harness::new();
    h.service.begin_verification(HANDLE, EMAIL).await.unwrap();
    let code = h.notifier.last_code(EMAIL).unwrap();

    h.clock.advance(Duration::hours(24) + Duration::seconds(1));

    assert_eq!(
        h.service.validate_response(HANDLE, &code).await.unwrap_err(),
        VerificationError::ChallengeExpired
    );
    assert!(h.challenges.get(HANDLE).await.unwrap().is_none());
    assert!(!h.verified.is_verified(EMAIL).await.unwrap());
    assert_eq!(h.access.total_grants(), 0);
}

#[tokio::test]
async fn test_code_accepted_at_exact_expiry() {
    let h = Harness::new();
    h.service.begin_verification(HANDLE, EMAIL).await.unwrap();
    let code = h.notifier.last_code(EMAIL).unwrap();

    h.clock.advance(Duration::hours(24));
    assert!(h.service.validate_response(HANDLE, &code).await.is_ok());
}

#[tokio::test]
async fn test_reissue_replaces_code() {
    let h = Harness::new();
    let service = h
        .service
        .with_code_generator(Arc::new(SequenceCodeGenerator::new(&["111111", "222222"])));

    service.begin_verification(HANDLE, EMAIL).await.unwrap();
    service.begin_verification(HANDLE, EMAIL).await.unwrap();

    assert_eq!(
        service.validate_response(HANDLE, "111111").await.unwrap_err(),
        VerificationError::CodeMismatch
    );
    assert!(service.validate_response(HANDLE, "222222").await.is_ok());
}

#[tokio::test]
async fn test_reissue_with_different_email_targets_new_address() {
    let h = Harness::new();
    h.service
        .begin_verification(HANDLE, "old@example.edu")
        .await
        .unwrap();
    h.service
        .begin_verification(HANDLE, "new@example.edu")
        .await
        .unwrap();

    let code = h.notifier.last_code("new@example.edu").unwrap();
    let outcome = h.service.validate_response(HANDLE, &code).await.unwrap();
    assert_eq!(outcome.record.email, "new@example.edu");
    assert!(!h.verified.is_verified("old@example.edu").await.unwrap());
}

#[tokio::test]
async fn test_grant_failure_defers_without_rollback() {
    let h = Harness::with_ports(MockNotifier::new(false), MockAccessGrant::new(true));
    h.service.begin_verification(HANDLE, EMAIL).await.unwrap();
    let code = h.notifier.last_code(EMAIL).unwrap();

    let outcome = h.service.validate_response(HANDLE, &code).await.unwrap();
    assert_eq!(outcome.grant, GrantStatus::Deferred);

    assert!(h.verified.is_verified(EMAIL).await.unwrap());
    assert!(h.challenges.get(HANDLE).await.unwrap().is_none());

    let queued = h.queue.snapshot().await;
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].handle, HANDLE);
    assert_eq!(queued[0].attempts, 0);
}

#[tokio::test]
async fn test_duplicate_email_race_denies_second_handle() {
    let h = Harness::new();
    let service = h
        .service
        .with_code_generator(Arc::new(SequenceCodeGenerator::new(&["111111", "222222"])));

    // Both handles hold challenges for the same email before either finishes
    service.begin_verification("alice", EMAIL).await.unwrap();
    service.begin_verification("bob", EMAIL).await.unwrap();

    service.validate_response("alice", "111111").await.unwrap();
    assert_eq!(
        service.validate_response("bob", "222222").await.unwrap_err(),
        VerificationError::AlreadyVerified
    );

    // Bob's code is spent
    assert!(h.challenges.get("bob").await.unwrap().is_none());
    let record = h.verified.find_by_email(EMAIL).await.unwrap().unwrap();
    assert_eq!(record.handle, "alice");
    assert_eq!(h.access.grant_count("bob"), 0);
}

#[tokio::test]
async fn test_revoke_by_handle() {
    let h = Harness::new();
    h.service.begin_verification(HANDLE, EMAIL).await.unwrap();
    let code = h.notifier.last_code(EMAIL).unwrap();

    h.service.revoke(&Key::handle(HANDLE)).await.unwrap();

    assert_eq!(
        h.service.validate_response(HANDLE, &code).await.unwrap_err(),
        VerificationError::NoPendingChallenge
    );
}

#[tokio::test]
async fn test_revoke_by_email_is_normalized_and_idempotent() {
    let h = Harness::new();
    h.service.begin_verification(HANDLE, EMAIL).await.unwrap();

    let key = Key::Email("JSMITH01@example.edu".to_string());
    h.service.revoke(&key).await.unwrap();
    h.service.revoke(&key).await.unwrap();

    assert!(h.challenges.get(HANDLE).await.unwrap().is_none());
}

#[tokio::test]
async fn test_revoke_never_unverifies() {
    let h = Harness::new();
    h.service.begin_verification(HANDLE, EMAIL).await.unwrap();
    let code = h.notifier.last_code(EMAIL).unwrap();
    h.service.validate_response(HANDLE, &code).await.unwrap();

    h.service.revoke(&Key::email(EMAIL)).await.unwrap();
    h.service.revoke(&Key::handle(HANDLE)).await.unwrap();

    assert!(h.verified.is_verified(EMAIL).await.unwrap());
}

#[tokio::test]
async fn test_status_transitions() {
    let h = Harness::new();
    assert_eq!(h.service.status(HANDLE).await.unwrap(), IdentityState::Unverified);

    let outcome = h.service.begin_verification(HANDLE, EMAIL).await.unwrap();
    assert_eq!(
        h.service.status(HANDLE).await.unwrap(),
        IdentityState::Pending {
            expires_at: outcome.expires_at
        }
    );

    let code = h.notifier.last_code(EMAIL).unwrap();
    h.service.validate_response(HANDLE, &code).await.unwrap();
    assert_eq!(
        h.service.status(HANDLE).await.unwrap(),
        IdentityState::Verified {
            email: EMAIL.to_string()
        }
    );
}

#[tokio::test]
async fn test_status_ignores_expired_challenge() {
    let h = Harness::new();
    h.service.begin_verification(HANDLE, EMAIL).await.unwrap();
    h.clock.advance(Duration::days(2));

    assert_eq!(h.service.status(HANDLE).await.unwrap(), IdentityState::Unverified);
}

#[tokio::test]
async fn test_store_unavailable_is_not_treated_as_absent() {
    let service = VerificationService::new(
        Arc::new(UnavailableChallengeStore),
        Arc::new(InMemoryVerifiedStore::new()),
        Arc::new(MockNotifier::new(false)),
        Arc::new(MockAccessGrant::new(false)),
        VerificationServiceConfig::default(),
    );

    let err = service.validate_response(HANDLE, "123456").await.unwrap_err();
    assert!(matches!(err, VerificationError::StoreUnavailable { .. }));
    assert!(err.is_retryable());

    let err = service.begin_verification(HANDLE, EMAIL).await.unwrap_err();
    assert!(matches!(err, VerificationError::StoreUnavailable { .. }));

    let err = service.revoke(&Key::handle(HANDLE)).await.unwrap_err();
    assert!(matches!(err, VerificationError::StoreUnavailable { .. }));
}

#[tokio::test]
async fn test_finalize_failure_keeps_challenge_and_queues_reconciliation() {
    let challenges = Arc::new(InMemoryChallengeStore::new());
    let notifier = Arc::new(MockNotifier::new(false));
    let access = Arc::new(MockAccessGrant::new(false));
    let queue = Arc::new(InMemoryGrantRetryQueue::new());

    let service = VerificationService::new(
        challenges.clone(),
        Arc::new(ReadOnlyVerifiedStore {
            inner: InMemoryVerifiedStore::new(),
        }),
        notifier.clone(),
        access.clone(),
        VerificationServiceConfig::default(),
    )
    .with_clock(Arc::new(ManualClock::fixed()))
    .with_grant_retry_queue(queue.clone());

    service.begin_verification(HANDLE, EMAIL).await.unwrap();
    let code = notifier.last_code(EMAIL).unwrap();

    let err = service.validate_response(HANDLE, &code).await.unwrap_err();
    assert!(matches!(err, VerificationError::StoreUnavailable { .. }));

    assert!(challenges.get(HANDLE).await.unwrap().is_some());
    assert_eq!(queue.len().await, 1);
    assert_eq!(access.total_grants(), 0);
}

fn reissued_to_second_address(issued_at: DateTime<Utc>) -> Challenge {
    let identity = IdentityKey::new(HANDLE, "second@example.edu").unwrap();
    Challenge::issue(&identity, "999999".to_string(), issued_at, Duration::hours(24))
}

#[tokio::test]
async fn test_expired_cleanup_spares_challenge_reissued_after_read() {
    let clock = Arc::new(ManualClock::fixed());
    let inner = Arc::new(InMemoryChallengeStore::new());
    let stale = Challenge::issue(
        &IdentityKey::new(HANDLE, EMAIL).unwrap(),
        "111111".to_string(),
        clock.now() - Duration::hours(25),
        Duration::hours(24),
    );
    inner.put(stale).await.unwrap();

    let reissued = reissued_to_second_address(clock.now());
    let service = VerificationService::new(
        Arc::new(ReissuingChallengeStore::new(inner.clone(), reissued.clone())),
        Arc::new(InMemoryVerifiedStore::new()),
        Arc::new(MockNotifier::new(false)),
        Arc::new(MockAccessGrant::new(false)),
        VerificationServiceConfig::default(),
    )
    .with_clock(clock.clone());

    assert_eq!(
        service.validate_response(HANDLE, "111111").await.unwrap_err(),
        VerificationError::ChallengeExpired
    );
    assert_eq!(inner.get(HANDLE).await.unwrap(), Some(reissued));
}

#[tokio::test]
async fn test_success_cleanup_spares_challenge_reissued_after_read() {
    let clock = Arc::new(ManualClock::fixed());
    let inner = Arc::new(InMemoryChallengeStore::new());
    let current = Challenge::issue(
        &IdentityKey::new(HANDLE, EMAIL).unwrap(),
        "111111".to_string(),
        clock.now(),
        Duration::hours(24),
    );
    inner.put(current).await.unwrap();

    let reissued = reissued_to_second_address(clock.now() + Duration::seconds(1));
    let verified = Arc::new(InMemoryVerifiedStore::new());
    let service = VerificationService::new(
        Arc::new(ReissuingChallengeStore::new(inner.clone(), reissued.clone())),
        verified.clone(),
        Arc::new(MockNotifier::new(false)),
        Arc::new(MockAccessGrant::new(false)),
        VerificationServiceConfig::default(),
    )
    .with_clock(clock.clone());

    service.validate_response(HANDLE, "111111").await.unwrap();
    assert!(verified.is_verified(EMAIL).await.unwrap());
    assert_eq!(inner.get(HANDLE).await.unwrap(), Some(reissued));
}
