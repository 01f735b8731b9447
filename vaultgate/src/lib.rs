//! # Vaultgate
//!
//! Vaultgate is the login authorization gate for a banking application. Given a
//! username and password, and optionally a second-factor code, it decides
//! whether to issue a session token while enforcing account protection:
//!
//! - lockout after repeated failed password checks
//! - mandatory second factor for accounts that enable it
//! - rejection of inactive accounts
//! - an audit event for every terminal outcome
//!
//! Storage, password hashing, token issuance and second-factor codes are
//! collaborators supplied by the application. In-memory versions ship with
//! [`vaultgate_core`] for tests and embedded use.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vaultgate::{
//!     Account, CredentialSubmission, GateBuilder, InMemoryAccountRepository,
//!     InMemoryTwoFactorCodes, hash_password,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let accounts = Arc::new(InMemoryAccountRepository::new());
//!     accounts.insert(
//!         Account::builder()
//!             .username("alice")
//!             .password_hash(hash_password("correct horse"))
//!             .build()?,
//!     )?;
//!
//!     let gate = GateBuilder::new()
//!         .with_defaults()
//!         .with_accounts(accounts)
//!         .with_two_factor(Arc::new(InMemoryTwoFactorCodes::default()))
//!         .build()?;
//!
//!     let outcome = gate
//!         .authorize(&CredentialSubmission::new("alice", "correct horse"))
//!         .await?;
//!     assert!(outcome.success);
//!     Ok(())
//! }
//! ```

mod builder;

pub use builder::{GateBuilder, GateBuilderError};

/// Re-export core types from vaultgate_core
pub use vaultgate_core::{
    Account, AccountBuilder, AccountId, AccountRepository, Argon2PasswordVerifier, AuditEvent,
    AuditEventKind, AuditLogger, AuthorizationGate, AuthorizationOutcome, CredentialSubmission,
    InMemoryAccountRepository, InMemoryTwoFactorCodes, LockoutConfig, LockoutStatus,
    MemoryAuditLog, OpaqueTokenIssuer, PasswordVerifier, SecondFactorSubmission, TokenConfig,
    TokenIssuer, TracingAuditLogger, TwoFactorValidator,
};

pub use vaultgate_core::audit::{AuditFanout, UNKNOWN_USERNAME, tags};
pub use vaultgate_core::error::{self, ContractError, Error};
pub use vaultgate_core::login::reasons;
pub use vaultgate_core::password::hash_password;
