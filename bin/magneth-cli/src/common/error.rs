use alloy_primitives::hex::FromHexError;
use magneth::{FactoryError, InitCodeError, OwnerSetError, SaltError, SignatureError};

/// Error types for the magneth CLI commands
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Failed to read file
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Invalid hex string
    #[error("Invalid hex string: {0}")]
    InvalidHex(#[from] FromHexError),

    /// Invalid JSON configuration
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid private key
    #[error("Invalid private key")]
    InvalidKey,

    /// Signature error
    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    /// Invalid owner set
    #[error("Invalid owner set: {0}")]
    Owners(#[from] OwnerSetError),

    /// Invalid wallet init code
    #[error("Invalid init code: {0}")]
    InitCode(#[from] InitCodeError),

    /// Invalid salt
    #[error("Invalid salt: {0}")]
    Salt(#[from] SaltError),

    /// Deployment error
    #[error("Deployment failed: {0}")]
    Factory(#[from] FactoryError),
}

/// Result type for the magneth CLI commands
pub type Result<T> = std::result::Result<T, CliError>;
