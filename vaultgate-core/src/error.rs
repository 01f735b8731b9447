use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Contract violation: {0}")]
    Contract(#[from] ContractError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Programmer errors: a caller broke the gate's calling contract.
///
/// These are never policy outcomes and must not be shown to an end user as a
/// login failure.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Submission is required")]
    MissingSubmission,

    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Record not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token not found")]
    NotFound,
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Random number generation failed: {0}")]
    Rng(String),
}

impl Error {
    pub fn is_contract_error(&self) -> bool {
        matches!(self, Error::Contract(_))
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    pub fn is_token_error(&self) -> bool {
        matches!(self, Error::Token(_))
    }

    pub fn is_crypto_error(&self) -> bool {
        matches!(self, Error::Crypto(_))
    }
}
