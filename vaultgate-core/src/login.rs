//! Login requests and their outcomes
//!
//! A [`CredentialSubmission`] or [`SecondFactorSubmission`] is built per call and
//! never persisted. Every policy decision the gate makes is reported through an
//! [`AuthorizationOutcome`]; errors are reserved for broken contracts and
//! collaborator failures.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User-facing failure reasons.
pub mod reasons {
    pub const CREDENTIALS_REQUIRED: &str = "Username and password are required";
    pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
    pub const ACCOUNT_INACTIVE: &str = "User account is inactive";
    pub const ACCOUNT_LOCKED: &str =
        "Account is temporarily locked due to too many failed attempts";
    pub const TWO_FACTOR_REQUIRED: &str = "Two-factor authentication required";
    pub const SECOND_FACTOR_FIELDS_REQUIRED: &str = "Username and 2FA code are required";
    pub const INVALID_TWO_FACTOR_CODE: &str = "Invalid two-factor code";
    pub const USER_NOT_FOUND: &str = "User not found";
}

/// Username, password and an optional second-factor code.
///
/// Fields are optional so that an incomplete request from the caller is still
/// representable; the gate rejects blank fields as a policy outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSubmission {
    pub username: Option<String>,
    pub password: Option<String>,
    pub two_factor_code: Option<String>,
}

impl CredentialSubmission {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            password: Some(password.into()),
            two_factor_code: None,
        }
    }

    pub fn with_two_factor_code(mut self, code: impl Into<String>) -> Self {
        self.two_factor_code = Some(code.into());
        self
    }

    /// The trimmed username, or `None` when absent or blank.
    pub fn username(&self) -> Option<&str> {
        non_blank(self.username.as_deref())
    }

    /// The password, or `None` when absent or blank.
    ///
    /// Only blankness is judged on the trimmed value; a non-blank password is
    /// returned exactly as submitted.
    pub fn password(&self) -> Option<&str> {
        self.password
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }
}

/// Username and second-factor code for completing a pending login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondFactorSubmission {
    pub username: Option<String>,
    pub code: Option<String>,
}

impl SecondFactorSubmission {
    pub fn new(username: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            code: Some(code.into()),
        }
    }

    pub fn username(&self) -> Option<&str> {
        non_blank(self.username.as_deref())
    }

    pub fn code(&self) -> Option<&str> {
        non_blank(self.code.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The terminal result of an authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationOutcome {
    pub success: bool,
    pub token: Option<String>,
    pub reason: Option<String>,
    pub requires_second_factor: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl AuthorizationOutcome {
    pub fn granted(token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            success: true,
            token: Some(token),
            reason: None,
            requires_second_factor: false,
            expires_at: Some(expires_at),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            token: None,
            reason: Some(reason.into()),
            requires_second_factor: false,
            expires_at: None,
        }
    }

    pub fn second_factor_required() -> Self {
        Self {
            requires_second_factor: true,
            ..Self::rejected(reasons::TWO_FACTOR_REQUIRED)
        }
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}
