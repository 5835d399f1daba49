//! Common error types shared across crates.

use thiserror::Error;

/// Top-level engine error type.
///
/// Variants classify failures for the host application:
/// - [`EngineError::NotReady`] — recoverable by generating or importing a key
/// - [`EngineError::Validation`] — recoverable by supplying a different key file
/// - [`EngineError::Authentication`] / [`EngineError::Crypto`] — the supplied
///   input is bad; retrying with the same input cannot succeed
/// - [`EngineError::Application`] — an internal invariant broke
#[derive(Debug, Error)]
pub enum EngineError {
    /// An operation requiring key material was attempted before any was loaded.
    #[error("engine is not initialized: no key material loaded")]
    NotReady,

    /// An imported key representation is malformed or semantically invalid.
    #[error("invalid key representation: {0}")]
    Validation(String),

    /// Ciphertext or associated data failed the integrity check during decryption.
    #[error("ciphertext or associated data failed authentication")]
    Authentication,

    /// The cryptographic primitive rejected the input.
    #[error("cryptographic operation failed: {0}")]
    Crypto(String),

    /// An unexpected internal error occurred.
    #[error("internal error: {0}")]
    Application(String),
}

impl EngineError {
    /// Returns `true` when the user can recover by changing their own input,
    /// i.e. by loading key material or choosing a different key file.
    pub fn user_recoverable(&self) -> bool {
        matches!(self, EngineError::NotReady | EngineError::Validation(_))
    }

    /// Construct an [`EngineError::Validation`] from any message.
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }
}
