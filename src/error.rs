//! Error types for the proximity monitor library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[cfg(feature = "opencv")]
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Extent was negative or not a finite number
    #[error("Invalid extent: {0}")]
    InvalidExtent(String),

    /// Caller broke the contract of a component
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    /// Classifier refused further input after an earlier contract violation
    #[error("Classifier is poisoned by an earlier contract violation")]
    Poisoned,

    /// Unknown trend policy or invalid policy parameters
    #[error("Policy error: {0}")]
    PolicyError(String),

    /// Measurement source produced malformed input
    #[error("Source error: {0}")]
    SourceError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Whether this error is a contract violation that poisons a classifier
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::InvalidExtent(_) | Self::ContractViolation(_))
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
