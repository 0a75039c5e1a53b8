//! Main verification service implementation

use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use hq_shared::validation::{is_valid_handle, mask_email};

use crate::domain::entities::{Challenge, IdentityKey, Key, VerifiedRecord};
use crate::errors::{StoreError, VerificationError, VerificationResult};
use crate::repositories::{ChallengeStore, VerifiedStore};
use crate::services::clock::{Clock, SystemClock};
use crate::services::code_generator::{CodeGenerator, OsRngCodeGenerator};
use crate::services::maintenance::{GrantRetryQueue, InMemoryGrantRetryQueue};

use super::config::VerificationServiceConfig;
use super::traits::{AccessGrantPort, NotificationPort};
use super::types::{BeginOutcome, GrantStatus, IdentityState, VerifyOutcome};

/// Coordinates challenge issuance, response validation and revocation
///
/// The service keeps no state of its own. Per-identity ordering comes from
/// the stores: atomic replace on [`ChallengeStore::put`] and atomic
/// check-and-insert on [`VerifiedStore::put`]. Several instances may run
/// against the same stores.
pub struct VerificationService<C, V, N, G>
where
    C: ChallengeStore + ?Sized,
    V: VerifiedStore + ?Sized,
    N: NotificationPort + ?Sized,
    G: AccessGrantPort + ?Sized,
{
    challenges: Arc<C>,
    verified: Arc<V>,
    notifier: Arc<N>,
    access: Arc<G>,
    code_generator: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
    grant_retries: Arc<dyn GrantRetryQueue>,
    config: VerificationServiceConfig,
}

impl<C, V, N, G> VerificationService<C, V, N, G>
where
    C: ChallengeStore + ?Sized,
    V: VerifiedStore + ?Sized,
    N: NotificationPort + ?Sized,
    G: AccessGrantPort + ?Sized,
{
    /// Create a new verification service
    ///
    /// Uses the OS random generator, the system clock and a process-local
    /// grant retry queue; see the `with_*` methods to replace them.
    pub fn new(
        challenges: Arc<C>,
        verified: Arc<V>,
        notifier: Arc<N>,
        access: Arc<G>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            challenges,
            verified,
            notifier,
            access,
            code_generator: Arc::new(OsRngCodeGenerator),
            clock: Arc::new(SystemClock),
            grant_retries: Arc::new(InMemoryGrantRetryQueue::new()),
            config,
        }
    }

    pub fn with_code_generator(mut self, code_generator: Arc<dyn CodeGenerator>) -> Self {
        self.code_generator = code_generator;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_grant_retry_queue(mut self, queue: Arc<dyn GrantRetryQueue>) -> Self {
        self.grant_retries = queue;
        self
    }

    /// Queue shared with the grant retry worker
    pub fn grant_retry_queue(&self) -> Arc<dyn GrantRetryQueue> {
        self.grant_retries.clone()
    }

    pub fn config(&self) -> &VerificationServiceConfig {
        &self.config
    }

    /// Issue a challenge for `email` on behalf of `handle` and send the code
    ///
    /// Any previous challenge for the handle is replaced, so its code stops
    /// working. If delivery fails the new challenge stays stored and the
    /// caller may simply ask again.
    ///
    /// # Errors
    ///
    /// * `InvalidHandle` / `InvalidEmail` - malformed input, nothing stored
    /// * `AlreadyVerified` - the email already has a verified record
    /// * `StoreUnavailable` - a store could not be reached
    /// * `DeliveryFailed` - the challenge is stored but the code was not sent
    pub async fn begin_verification(
        &self,
        handle: &str,
        email: &str,
    ) -> VerificationResult<BeginOutcome> {
        let identity = IdentityKey::new(handle, email)?;
        let masked = mask_email(identity.email());

        if self.verified.is_verified(identity.email()).await? {
            warn!(
                handle = identity.handle(),
                email = %masked,
                event = "already_verified",
                "Verification requested for an email that is already verified"
            );
            return Err(VerificationError::AlreadyVerified);
        }

        let code = self.code_generator.generate();
        let challenge = Challenge::issue(
            &identity,
            code.clone(),
            self.clock.now(),
            self.config.challenge_ttl,
        );
        let outcome = BeginOutcome::from(&challenge);

        self.challenges.put(challenge).await?;

        info!(
            handle = identity.handle(),
            email = %masked,
            expires_at = %outcome.expires_at,
            event = "challenge_issued",
            "Verification challenge issued"
        );

        let delivery = match timeout(
            self.config.notify_timeout,
            self.notifier.send_code(identity.email(), &code),
        )
        .await
        {
            Ok(delivery) => delivery,
            Err(_) => Err(format!(
                "notification timed out after {}ms",
                self.config.notify_timeout.as_millis()
            )),
        };

        if let Err(message) = delivery {
            error!(
                handle = identity.handle(),
                email = %masked,
                error = %message,
                event = "delivery_failed",
                "Failed to deliver verification code"
            );
            return Err(VerificationError::DeliveryFailed { message });
        }

        debug!(handle = identity.handle(), event = "code_sent", "Verification code sent");
        Ok(outcome)
    }

    /// Check a submitted code and finalize the verification on a match
    ///
    /// On success the verified record is written, the challenge is consumed
    /// and the privilege is granted. A failed grant never rolls back the
    /// verification: it is queued for retry and reported as
    /// [`GrantStatus::Deferred`].
    ///
    /// # Errors
    ///
    /// * `InvalidHandle` - malformed handle
    /// * `NoPendingChallenge` - nothing was issued, or it was already used
    /// * `ChallengeExpired` - submitted after expiry, whatever the code
    /// * `CodeMismatch` - wrong code; the challenge stays valid
    /// * `AlreadyVerified` - the email was verified concurrently
    /// * `StoreUnavailable` - a store could not be reached
    pub async fn validate_response(
        &self,
        handle: &str,
        code: &str,
    ) -> VerificationResult<VerifyOutcome> {
        if !is_valid_handle(handle) {
            return Err(VerificationError::InvalidHandle);
        }

        let challenge = match self.challenges.get(handle).await? {
            Some(challenge) => challenge,
            None => {
                info!(handle = handle, event = "no_pending_challenge", "Response without a pending challenge");
                return Err(VerificationError::NoPendingChallenge);
            }
        };

        let now = self.clock.now();
        if challenge.is_expired_at(now) {
            info!(
                handle = handle,
                expired_at = %challenge.expires_at,
                event = "challenge_expired",
                "Response submitted after expiry"
            );
            self.discard_challenge(&challenge).await;
            return Err(VerificationError::ChallengeExpired);
        }

        // Expiry is checked first so a late correct code reads as expired
        if !challenge.matches(code.trim()) {
            warn!(handle = handle, event = "code_mismatch", "Submitted code does not match");
            return Err(VerificationError::CodeMismatch);
        }

        let record = VerifiedRecord::new(challenge.email.clone(), handle, now);
        let masked = mask_email(&record.email);

        match self.verified.put(record.clone()).await {
            Ok(()) => {}
            Err(StoreError::DuplicateEmail) => {
                warn!(
                    handle = handle,
                    email = %masked,
                    event = "duplicate_email",
                    "Email was verified concurrently, denying second record"
                );
                self.discard_challenge(&challenge).await;
                return Err(VerificationError::AlreadyVerified);
            }
            Err(e) => {
                // The insert may have landed; let the retry worker settle it
                error!(
                    handle = handle,
                    error = %e,
                    event = "finalize_failed",
                    "Could not record verification"
                );
                self.grant_retries
                    .schedule(handle, "verified record outcome unknown")
                    .await;
                return Err(e.into());
            }
        }

        info!(
            handle = handle,
            email = %masked,
            event = "verification_completed",
            "Email ownership verified"
        );

        self.discard_challenge(&challenge).await;
        let grant = self.grant_access(handle).await;

        Ok(VerifyOutcome { record, grant })
    }

    /// Cancel any pending challenge for a handle or email
    ///
    /// Idempotent. Verified records are never touched.
    pub async fn revoke(&self, key: &Key) -> VerificationResult<()> {
        let key = key.clone().normalized();
        self.challenges.delete(&key).await?;

        info!(kind = key.kind(), event = "challenge_revoked", "Pending challenge revoked");
        Ok(())
    }

    /// Current verification state of a handle
    ///
    /// An unexpired challenge reports `Pending` even if the handle already
    /// verified another address.
    pub async fn status(&self, handle: &str) -> VerificationResult<IdentityState> {
        if !is_valid_handle(handle) {
            return Err(VerificationError::InvalidHandle);
        }

        if let Some(challenge) = self.challenges.get(handle).await? {
            if !challenge.is_expired_at(self.clock.now()) {
                return Ok(IdentityState::Pending {
                    expires_at: challenge.expires_at,
                });
            }
        }

        let records = self.verified.find_by_handle(handle).await?;
        Ok(match records.into_iter().max_by_key(|r| r.verified_at) {
            Some(record) => IdentityState::Verified {
                email: record.email,
            },
            None => IdentityState::Unverified,
        })
    }

    /// Best-effort removal of a consumed challenge
    ///
    /// A challenge re-issued for the handle since it was read is left alone.
    async fn discard_challenge(&self, challenge: &Challenge) {
        match self.challenges.delete_if_current(challenge).await {
            Ok(true) => {}
            Ok(false) => debug!(
                handle = %challenge.handle,
                event = "challenge_superseded",
                "Challenge was replaced before cleanup, keeping the new one"
            ),
            Err(e) => warn!(
                handle = %challenge.handle,
                error = %e,
                event = "challenge_delete_failed",
                "Failed to delete challenge"
            ),
        }
    }

    async fn grant_access(&self, handle: &str) -> GrantStatus {
        let outcome = match timeout(self.config.grant_timeout, self.access.grant(handle)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(format!(
                "grant timed out after {}ms",
                self.config.grant_timeout.as_millis()
            )),
        };

        match outcome {
            Ok(()) => {
                info!(handle = handle, event = "access_granted", "Verified privilege granted");
                GrantStatus::Granted
            }
            Err(message) => {
                let err = VerificationError::GrantFailed { message };
                warn!(
                    handle = handle,
                    error = %err,
                    event = "grant_deferred",
                    "Access grant failed, scheduling retry"
                );
                self.grant_retries.schedule(handle, &err.to_string()).await;
                GrantStatus::Deferred
            }
        }
    }
}
