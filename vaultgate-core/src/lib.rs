//! Core functionality for the vaultgate project
//!
//! This crate contains the login authorization policy: the [`AuthorizationGate`]
//! state machine, the lockout rules it applies, and the collaborator traits it
//! consumes ([`AccountRepository`], [`PasswordVerifier`], [`TokenIssuer`],
//! [`TwoFactorValidator`] and [`AuditLogger`]).
//!
//! In-memory implementations of each collaborator are included so the gate can
//! be embedded or tested without external services.
//!
//! See [`Account`] for the account record and [`AuthorizationOutcome`] for the
//! result of an authorization attempt.
pub mod account;
pub mod audit;
pub mod crypto;
pub mod error;
pub mod id;
pub mod login;
pub mod password;
pub mod repositories;
pub mod services;
pub mod token;
pub mod two_factor;

pub use account::{Account, AccountBuilder, AccountId};
pub use audit::{AuditEvent, AuditEventKind, AuditLogger, MemoryAuditLog, TracingAuditLogger};
pub use error::Error;
pub use login::{AuthorizationOutcome, CredentialSubmission, SecondFactorSubmission};
pub use password::{Argon2PasswordVerifier, PasswordVerifier};
pub use repositories::{AccountRepository, InMemoryAccountRepository};
pub use services::{AuthorizationGate, Collaborators, LockoutConfig, LockoutStatus};
pub use token::{OpaqueTokenIssuer, TokenConfig, TokenIssuer};
pub use two_factor::{InMemoryTwoFactorCodes, TwoFactorValidator};
