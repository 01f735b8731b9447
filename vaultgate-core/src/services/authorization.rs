//! Login authorization gate.
//!
//! [`AuthorizationGate`] decides whether a credential submission earns a session
//! token. Checks run in a fixed order and the first failing check ends the
//! evaluation:
//!
//! 1. both username and password are present
//! 2. the account exists
//! 3. the account is active
//! 4. the account is not locked out
//! 5. the password verifies
//! 6. no second factor is pending
//!
//! Only then is the failure counter cleared and a token issued. Every terminal
//! outcome is reported to the audit logger before the call returns.
//!
//! Policy rejections come back as `Ok(AuthorizationOutcome)`. `Err` means either
//! a collaborator failed (propagated as-is, never retried) or the caller broke
//! the calling contract ([`ContractError`]).

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    Account, Error,
    audit::{AuditLogger, UNKNOWN_USERNAME, tags},
    error::ContractError,
    login::{AuthorizationOutcome, CredentialSubmission, SecondFactorSubmission, reasons},
    password::PasswordVerifier,
    repositories::AccountRepository,
    services::{
        account_lock::AccountLocks,
        lockout::{LockoutConfig, LockoutPolicy},
    },
    token::TokenIssuer,
    two_factor::TwoFactorValidator,
};

/// The collaborators an [`AuthorizationGate`] consults.
#[derive(Clone)]
pub struct Collaborators {
    pub accounts: Arc<dyn AccountRepository>,
    pub passwords: Arc<dyn PasswordVerifier>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub two_factor: Arc<dyn TwoFactorValidator>,
    pub audit: Arc<dyn AuditLogger>,
}

/// Evaluates credential and second-factor submissions against account policy.
///
/// Clones share one set of per-account locks, so concurrent attempts for the
/// same username through any clone are applied one at a time. Gates built
/// separately over the same store do not coordinate.
#[derive(Clone)]
pub struct AuthorizationGate {
    collaborators: Collaborators,
    lockout: LockoutPolicy,
    locks: Arc<AccountLocks>,
}

impl AuthorizationGate {
    pub fn new(collaborators: Collaborators, lockout_config: LockoutConfig) -> Self {
        Self {
            collaborators,
            lockout: LockoutPolicy::new(lockout_config),
            locks: Arc::new(AccountLocks::default()),
        }
    }

    pub fn lockout_policy(&self) -> &LockoutPolicy {
        &self.lockout
    }

    /// Evaluate a username/password submission.
    ///
    /// Passing `None` is a contract violation and fails with
    /// [`ContractError::MissingSubmission`].
    pub async fn authorize<'a>(
        &self,
        submission: impl Into<Option<&'a CredentialSubmission>>,
    ) -> Result<AuthorizationOutcome, Error> {
        let submission = submission
            .into()
            .ok_or(ContractError::MissingSubmission)?;
        let audit = &self.collaborators.audit;

        let (username, password) = match (submission.username(), submission.password()) {
            (Some(username), Some(password)) => (username, password),
            (username, _) => {
                let username = username.unwrap_or(UNKNOWN_USERNAME);
                tracing::debug!(username = %username, "Rejecting incomplete credentials");
                audit
                    .record_failed_attempt(username, tags::INVALID_INPUT)
                    .await?;
                return Ok(AuthorizationOutcome::rejected(
                    reasons::CREDENTIALS_REQUIRED,
                ));
            }
        };

        let _guard = self.locks.acquire(username).await;

        let Some(mut account) = self
            .collaborators
            .accounts
            .find_by_username(username)
            .await?
        else {
            tracing::debug!(username = %username, "Login for unknown user");
            audit
                .record_failed_attempt(username, tags::USER_NOT_FOUND)
                .await?;
            return Ok(AuthorizationOutcome::rejected(reasons::INVALID_CREDENTIALS));
        };

        if !account.is_active {
            tracing::debug!(username = %username, "Login for inactive account");
            audit
                .record_failed_attempt(username, tags::ACCOUNT_INACTIVE)
                .await?;
            return Ok(AuthorizationOutcome::rejected(reasons::ACCOUNT_INACTIVE));
        }

        let status = self.lockout.status(&account, Utc::now());
        if status.is_locked {
            tracing::warn!(
                username = %username,
                failed_attempts = status.failed_attempts,
                locked_until = ?status.locked_until,
                "Login for locked account"
            );
            audit
                .record_failed_attempt(username, tags::ACCOUNT_LOCKED)
                .await?;
            return Ok(AuthorizationOutcome::rejected(reasons::ACCOUNT_LOCKED));
        }

        let verified = self
            .collaborators
            .passwords
            .verify(password, &account.password_hash)
            .await?;

        if !verified {
            account.record_failure(Utc::now());
            self.collaborators.accounts.save(&account).await?;
            tracing::debug!(
                username = %username,
                failed_attempts = account.failed_attempts,
                "Password verification failed"
            );
            audit
                .record_failed_attempt(username, tags::INVALID_PASSWORD)
                .await?;
            return Ok(AuthorizationOutcome::rejected(reasons::INVALID_CREDENTIALS));
        }

        if account.two_factor_enabled {
            tracing::debug!(username = %username, "Password accepted, awaiting second factor");
            audit
                .record_attempt(username, false, Some(tags::AWAITING_SECOND_FACTOR))
                .await?;
            return Ok(AuthorizationOutcome::second_factor_required());
        }

        let (token, expires_at) = self.finalize(&mut account).await?;
        Ok(AuthorizationOutcome::granted(token, expires_at))
    }

    /// Complete a login that is waiting on a second factor.
    ///
    /// A rejected code does not count against the account's failed-attempt
    /// counter. A valid code for an account that no longer exists is rejected
    /// without an audit event.
    pub async fn complete_second_factor<'a>(
        &self,
        submission: impl Into<Option<&'a SecondFactorSubmission>>,
    ) -> Result<AuthorizationOutcome, Error> {
        let submission = submission
            .into()
            .ok_or(ContractError::MissingSubmission)?;

        let (Some(username), Some(code)) = (submission.username(), submission.code()) else {
            return Ok(AuthorizationOutcome::rejected(
                reasons::SECOND_FACTOR_FIELDS_REQUIRED,
            ));
        };

        let valid = self
            .collaborators
            .two_factor
            .validate(username, code)
            .await?;

        if !valid {
            tracing::debug!(username = %username, "Second factor rejected");
            self.collaborators
                .audit
                .record_failed_attempt(username, tags::INVALID_SECOND_FACTOR)
                .await?;
            return Ok(AuthorizationOutcome::rejected(
                reasons::INVALID_TWO_FACTOR_CODE,
            ));
        }

        let _guard = self.locks.acquire(username).await;

        let Some(mut account) = self
            .collaborators
            .accounts
            .find_by_username(username)
            .await?
        else {
            tracing::warn!(username = %username, "Valid second factor for missing account");
            return Ok(AuthorizationOutcome::rejected(reasons::USER_NOT_FOUND));
        };

        let (token, expires_at) = self.finalize(&mut account).await?;
        Ok(AuthorizationOutcome::granted(token, expires_at))
    }

    /// Clear the failure counter, persist, issue a token and audit the success.
    async fn finalize(&self, account: &mut Account) -> Result<(String, DateTime<Utc>), Error> {
        account.record_success(Utc::now());
        self.collaborators.accounts.save(account).await?;

        let tokens = &self.collaborators.tokens;
        let token = tokens.generate(&account.username).await?;
        let expires_at = tokens.expiry(&token).await?;

        self.collaborators
            .audit
            .record_attempt(&account.username, true, None)
            .await?;
        tracing::info!(username = %account.username, %expires_at, "Issued session token");

        Ok((token, expires_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audit::{AuditEventKind, MemoryAuditLog},
        error::StorageError,
    };
    use async_trait::async_trait;
    use chrono::Duration;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockAccounts {
        accounts: Mutex<HashMap<String, Account>>,
        finds: AtomicUsize,
        saves: Mutex<Vec<Account>>,
        fail_lookup: bool,
    }

    impl MockAccounts {
        fn with(account: Account) -> Self {
            let repo = Self::default();
            repo.accounts
                .lock()
                .unwrap()
                .insert(account.username.clone(), account);
            repo
        }

        fn stored(&self, username: &str) -> Account {
            self.accounts.lock().unwrap()[username].clone()
        }
    }

    #[async_trait]
    impl AccountRepository for MockAccounts {
        async fn find_by_username(&self, username: &str) -> Result<Option<Account>, Error> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            if self.fail_lookup {
                return Err(StorageError::Connection("database unavailable".into()).into());
            }
            Ok(self.accounts.lock().unwrap().get(username).cloned())
        }

        async fn save(&self, account: &Account) -> Result<(), Error> {
            self.saves.lock().unwrap().push(account.clone());
            self.accounts
                .lock()
                .unwrap()
                .insert(account.username.clone(), account.clone());
            Ok(())
        }
    }

    /// Accepts exactly the password equal to the stored hash.
    #[derive(Default)]
    struct PlainVerifier {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PasswordVerifier for PlainVerifier {
        async fn verify(&self, password: &str, password_hash: &str) -> Result<bool, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(password == password_hash)
        }
    }

    #[derive(Default)]
    struct CountingTokens {
        generated: AtomicUsize,
    }

    #[async_trait]
    impl TokenIssuer for CountingTokens {
        async fn generate(&self, username: &str) -> Result<String, Error> {
            let n = self.generated.fetch_add(1, Ordering::SeqCst);
            Ok(format!("token-{username}-{n}"))
        }

        async fn expiry(&self, _token: &str) -> Result<DateTime<Utc>, Error> {
            Ok(Utc::now() + Duration::minutes(30))
        }
    }

    struct FixedCode {
        code: &'static str,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TwoFactorValidator for FixedCode {
        async fn validate(&self, _username: &str, code: &str) -> Result<bool, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(code == self.code)
        }
    }

    struct Harness {
        gate: AuthorizationGate,
        accounts: Arc<MockAccounts>,
        passwords: Arc<PlainVerifier>,
        tokens: Arc<CountingTokens>,
        two_factor: Arc<FixedCode>,
        audit: MemoryAuditLog,
    }

    fn harness(accounts: MockAccounts) -> Harness {
        let accounts = Arc::new(accounts);
        let passwords = Arc::new(PlainVerifier::default());
        let tokens = Arc::new(CountingTokens::default());
        let two_factor = Arc::new(FixedCode {
            code: "123456",
            calls: AtomicUsize::new(0),
        });
        let audit = MemoryAuditLog::new();

        let gate = AuthorizationGate::new(
            Collaborators {
                accounts: accounts.clone(),
                passwords: passwords.clone(),
                tokens: tokens.clone(),
                two_factor: two_factor.clone(),
                audit: Arc::new(audit.clone()),
            },
            LockoutConfig::default(),
        );

        Harness {
            gate,
            accounts,
            passwords,
            tokens,
            two_factor,
            audit,
        }
    }

    fn account() -> crate::account::AccountBuilder {
        Account::builder().username("alice").password_hash("s3cret")
    }

    #[tokio::test]
    async fn test_missing_submission_is_contract_error() {
        let h = harness(MockAccounts::default());

        let err = h.gate.authorize(None::<&CredentialSubmission>).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Contract(ContractError::MissingSubmission)
        ));

        let err = h.gate
            .complete_second_factor(None::<&SecondFactorSubmission>)
            .await.unwrap_err();
        assert!(err.is_contract_error());
        assert!(h.audit.is_empty());
    }

    #[tokio::test]
    async fn test_blank_fields_rejected_without_lookup() {
        let h = harness(MockAccounts::with(account().build().unwrap()));

        let cases = [
            CredentialSubmission::new("", "s3cret"),
            CredentialSubmission::new("alice", "   "),
            CredentialSubmission::default(),
        ];
        for submission in &cases {
            let outcome = h.gate.authorize(submission).await.unwrap();
            assert!(!outcome.success);
            assert_eq!(outcome.reason(), Some(reasons::CREDENTIALS_REQUIRED));
        }

        assert_eq!(h.accounts.finds.load(Ordering::SeqCst), 0);

        let events = h.audit.events();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.kind == AuditEventKind::FailedAttempt
            && e.reason.as_deref() == Some(tags::INVALID_INPUT)));
        assert_eq!(events[0].username, UNKNOWN_USERNAME);
        assert_eq!(events[1].username, "alice");
        assert_eq!(events[2].username, UNKNOWN_USERNAME);
    }

    #[tokio::test]
    async fn test_unknown_user_gets_generic_reason() {
        let h = harness(MockAccounts::default());

        let outcome = h
            .gate
            .authorize(&CredentialSubmission::new("mallory", "guess"))
            .await
            .unwrap();

        assert_eq!(outcome.reason(), Some(reasons::INVALID_CREDENTIALS));
        let last = h.audit.last().unwrap();
        assert_eq!(last.reason.as_deref(), Some(tags::USER_NOT_FOUND));
        assert_eq!(h.passwords.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_inactive_account_rejected_idempotently() {
        let h = harness(MockAccounts::with(
            account().is_active(false).failed_attempts(1).build().unwrap(),
        ));
        let submission = CredentialSubmission::new("alice", "s3cret");

        let first = h.gate.authorize(&submission).await.unwrap();
        let second = h.gate.authorize(&submission).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.reason(), Some(reasons::ACCOUNT_INACTIVE));
        assert_eq!(h.accounts.stored("alice").failed_attempts, 1);
        assert!(h.accounts.saves.lock().unwrap().is_empty());
        assert_eq!(h.passwords.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_locked_account_skips_password_check() {
        let h = harness(MockAccounts::with(
            account()
                .failed_attempts(5)
                .last_attempt_at(Some(Utc::now() - Duration::minutes(5)))
                .build()
                .unwrap(),
        ));

        let outcome = h
            .gate
            .authorize(&CredentialSubmission::new("alice", "s3cret"))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.reason().unwrap().contains("temporarily locked"));
        assert_eq!(h.passwords.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            h.audit.last().unwrap().reason.as_deref(),
            Some(tags::ACCOUNT_LOCKED)
        );
    }

    #[tokio::test]
    async fn test_lock_without_timestamp_never_expires() {
        let h = harness(MockAccounts::with(
            account().failed_attempts(5).last_attempt_at(None).build().unwrap(),
        ));
        let submission = CredentialSubmission::new("alice", "s3cret");

        for _ in 0..3 {
            let outcome = h.gate.authorize(&submission).await.unwrap();
            assert_eq!(outcome.reason(), Some(reasons::ACCOUNT_LOCKED));
        }

        let stored = h.accounts.stored("alice");
        assert!(stored.last_attempt_at.is_none());
        assert_eq!(stored.failed_attempts, 5);
        assert!(h.accounts.saves.lock().unwrap().is_empty());
        assert_eq!(h.passwords.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_lock_allows_login_and_resets() {
        let h = harness(MockAccounts::with(
            account()
                .failed_attempts(5)
                .last_attempt_at(Some(Utc::now() - Duration::minutes(20)))
                .build()
                .unwrap(),
        ));

        let outcome = h
            .gate
            .authorize(&CredentialSubmission::new("alice", "s3cret"))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(h.accounts.stored("alice").failed_attempts, 0);
    }

    #[tokio::test]
    async fn test_wrong_password_increments_by_one() {
        let h = harness(MockAccounts::with(account().build().unwrap()));
        let submission = CredentialSubmission::new("alice", "wrong");

        for expected in 1..=3 {
            let before = Utc::now();
            let outcome = h.gate.authorize(&submission).await.unwrap();
            assert_eq!(outcome.reason(), Some(reasons::INVALID_CREDENTIALS));

            let stored = h.accounts.stored("alice");
            assert_eq!(stored.failed_attempts, expected);
            assert!(stored.last_attempt_at.unwrap() >= before);
        }

        assert_eq!(h.accounts.saves.lock().unwrap().len(), 3);
        assert_eq!(
            h.audit.last().unwrap().reason.as_deref(),
            Some(tags::INVALID_PASSWORD)
        );
        assert_eq!(h.tokens.generated.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fifth_failure_locks_next_attempt() {
        let h = harness(MockAccounts::with(account().failed_attempts(4).build().unwrap()));

        h.gate
            .authorize(&CredentialSubmission::new("alice", "wrong"))
            .await
            .unwrap();
        let outcome = h
            .gate
            .authorize(&CredentialSubmission::new("alice", "s3cret"))
            .await
            .unwrap();

        assert_eq!(outcome.reason(), Some(reasons::ACCOUNT_LOCKED));
        assert_eq!(h.passwords.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_resets_counter_and_issues_token() {
        let h = harness(MockAccounts::with(account().failed_attempts(2).build().unwrap()));

        let outcome = h
            .gate
            .authorize(&CredentialSubmission::new("alice", "s3cret"))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.token.as_deref(), Some("token-alice-0"));
        assert!(outcome.expires_at.is_some());
        assert!(outcome.reason.is_none());

        let saves = h.accounts.saves.lock().unwrap();
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].failed_attempts, 0);
        assert!(saves[0].last_attempt_at.is_some());

        let last = h.audit.last().unwrap();
        assert_eq!(last.kind, AuditEventKind::Attempt);
        assert!(last.success);
    }

    #[tokio::test]
    async fn test_second_factor_required_withholds_token() {
        let h = harness(MockAccounts::with(
            account().two_factor_enabled(true).failed_attempts(2).build().unwrap(),
        ));

        let outcome = h
            .gate
            .authorize(&CredentialSubmission::new("alice", "s3cret"))
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.requires_second_factor);
        assert_eq!(outcome.reason(), Some(reasons::TWO_FACTOR_REQUIRED));
        assert!(outcome.token.is_none());
        assert_eq!(h.tokens.generated.load(Ordering::SeqCst), 0);
        assert!(h.accounts.saves.lock().unwrap().is_empty());
        assert_eq!(h.accounts.stored("alice").failed_attempts, 2);

        let last = h.audit.last().unwrap();
        assert_eq!(last.kind, AuditEventKind::Attempt);
        assert!(!last.success);
        assert_eq!(last.reason.as_deref(), Some(tags::AWAITING_SECOND_FACTOR));
    }

    #[tokio::test]
    async fn test_complete_second_factor_success() {
        let h = harness(MockAccounts::with(
            account().two_factor_enabled(true).failed_attempts(2).build().unwrap(),
        ));

        let outcome = h
            .gate
            .complete_second_factor(&SecondFactorSubmission::new("alice", "123456"))
            .await
            .unwrap();

        assert!(outcome.success);
        assert!(outcome.token.is_some());
        assert!(outcome.expires_at.is_some());
        assert_eq!(h.accounts.stored("alice").failed_attempts, 0);
        assert!(h.audit.last().unwrap().success);
    }

    #[tokio::test]
    async fn test_invalid_second_factor_leaves_counter() {
        let h = harness(MockAccounts::with(
            account().two_factor_enabled(true).failed_attempts(2).build().unwrap(),
        ));

        let outcome = h
            .gate
            .complete_second_factor(&SecondFactorSubmission::new("alice", "000000"))
            .await
            .unwrap();

        assert_eq!(outcome.reason(), Some(reasons::INVALID_TWO_FACTOR_CODE));
        assert_eq!(h.accounts.stored("alice").failed_attempts, 2);
        assert!(h.accounts.saves.lock().unwrap().is_empty());
        assert_eq!(h.accounts.finds.load(Ordering::SeqCst), 0);
        assert_eq!(
            h.audit.last().unwrap().reason.as_deref(),
            Some(tags::INVALID_SECOND_FACTOR)
        );
    }

    #[tokio::test]
    async fn test_second_factor_blank_fields_make_no_calls() {
        let h = harness(MockAccounts::default());

        let outcome = h
            .gate
            .complete_second_factor(&SecondFactorSubmission::new("alice", " "))
            .await
            .unwrap();

        assert_eq!(outcome.reason(), Some(reasons::SECOND_FACTOR_FIELDS_REQUIRED));
        assert_eq!(h.two_factor.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.accounts.finds.load(Ordering::SeqCst), 0);
        assert!(h.audit.is_empty());
    }

    #[tokio::test]
    async fn test_second_factor_for_missing_account_is_not_audited() {
        let h = harness(MockAccounts::default());

        let outcome = h
            .gate
            .complete_second_factor(&SecondFactorSubmission::new("ghost", "123456"))
            .await
            .unwrap();

        assert_eq!(outcome.reason(), Some(reasons::USER_NOT_FOUND));
        assert!(h.audit.is_empty());
        assert_eq!(h.tokens.generated.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let h = harness(MockAccounts {
            fail_lookup: true,
            ..MockAccounts::default()
        });

        let err = h
            .gate
            .authorize(&CredentialSubmission::new("alice", "s3cret"))
            .await
            .unwrap_err();

        assert!(err.is_storage_error());
        assert!(h.audit.is_empty());
    }
}
