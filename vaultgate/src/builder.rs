//! Builder for constructing [`AuthorizationGate`] instances
//!
//! Every collaborator must be supplied before [`GateBuilder::build`] succeeds. A
//! missing collaborator is a wiring mistake, reported as
//! [`ContractError::MissingCollaborator`] rather than surfacing later as a
//! failed login.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vaultgate::{GateBuilder, InMemoryAccountRepository, InMemoryTwoFactorCodes};
//!
//! # fn example() -> Result<(), vaultgate::GateBuilderError> {
//! let gate = GateBuilder::new()
//!     .with_defaults()
//!     .with_accounts(Arc::new(InMemoryAccountRepository::new()))
//!     .with_two_factor(Arc::new(InMemoryTwoFactorCodes::default()))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use chrono::Duration;
use vaultgate_core::{
    AccountRepository, Argon2PasswordVerifier, AuditLogger, AuthorizationGate, Collaborators,
    LockoutConfig, OpaqueTokenIssuer, PasswordVerifier, TokenConfig, TokenIssuer,
    TracingAuditLogger, TwoFactorValidator, error::ContractError,
};

/// Errors that can occur when building an [`AuthorizationGate`].
#[derive(Debug, thiserror::Error)]
pub enum GateBuilderError {
    /// A required collaborator was never supplied
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// A builder for [`AuthorizationGate`].
///
/// # Defaults
///
/// - Lockout: enabled, 5 attempts, 15 minute period
/// - Token expiry: 30 minutes (applies to the opaque issuer selected by
///   [`with_defaults`](Self::with_defaults))
/// - No collaborators
#[derive(Default)]
pub struct GateBuilder {
    accounts: Option<Arc<dyn AccountRepository>>,
    passwords: Option<Arc<dyn PasswordVerifier>>,
    tokens: Option<Arc<dyn TokenIssuer>>,
    two_factor: Option<Arc<dyn TwoFactorValidator>>,
    audit: Option<Arc<dyn AuditLogger>>,
    default_tokens: bool,
    lockout_config: LockoutConfig,
    token_config: TokenConfig,
}

impl GateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the bundled argon2 verifier, opaque token issuer and tracing
    /// audit logger for any of those not yet set.
    ///
    /// The opaque issuer is created by [`build`](Self::build), so it picks up
    /// [`with_token_expiry`](Self::with_token_expiry) whenever that is called.
    /// The account store and second-factor validator are deployment specific
    /// and must still be supplied.
    pub fn with_defaults(mut self) -> Self {
        if self.passwords.is_none() {
            self.passwords = Some(Arc::new(Argon2PasswordVerifier));
        }
        self.default_tokens = true;
        if self.audit.is_none() {
            self.audit = Some(Arc::new(TracingAuditLogger));
        }
        self
    }

    pub fn with_accounts(mut self, accounts: Arc<dyn AccountRepository>) -> Self {
        self.accounts = Some(accounts);
        self
    }

    pub fn with_password_verifier(mut self, passwords: Arc<dyn PasswordVerifier>) -> Self {
        self.passwords = Some(passwords);
        self
    }

    pub fn with_token_issuer(mut self, tokens: Arc<dyn TokenIssuer>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn with_two_factor(mut self, two_factor: Arc<dyn TwoFactorValidator>) -> Self {
        self.two_factor = Some(two_factor);
        self
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_lockout_config(mut self, config: LockoutConfig) -> Self {
        self.lockout_config = config;
        self
    }

    /// Set the lifetime of tokens from the default opaque issuer.
    pub fn with_token_expiry(mut self, duration: Duration) -> Self {
        self.token_config = self.token_config.expires_in(duration);
        self
    }

    pub fn build(self) -> Result<AuthorizationGate, GateBuilderError> {
        if self.lockout_config.enabled && self.lockout_config.max_failed_attempts == 0 {
            return Err(GateBuilderError::InvalidConfiguration(
                "max_failed_attempts must be at least 1".to_string(),
            ));
        }
        if self.lockout_config.lockout_period <= Duration::zero() {
            return Err(GateBuilderError::InvalidConfiguration(
                "lockout_period must be positive".to_string(),
            ));
        }

        let collaborators = Collaborators {
            accounts: self
                .accounts
                .ok_or(ContractError::MissingCollaborator("account repository"))?,
            passwords: self
                .passwords
                .ok_or(ContractError::MissingCollaborator("password verifier"))?,
            tokens: match self.tokens {
                Some(tokens) => tokens,
                None if self.default_tokens => {
                    Arc::new(OpaqueTokenIssuer::new(self.token_config))
                }
                None => return Err(ContractError::MissingCollaborator("token issuer").into()),
            },
            two_factor: self
                .two_factor
                .ok_or(ContractError::MissingCollaborator("two-factor validator"))?,
            audit: self
                .audit
                .ok_or(ContractError::MissingCollaborator("audit logger"))?,
        };

        tracing::debug!(
            lockout_enabled = self.lockout_config.enabled,
            max_failed_attempts = self.lockout_config.max_failed_attempts,
            "Built authorization gate"
        );

        Ok(AuthorizationGate::new(collaborators, self.lockout_config))
    }
}
