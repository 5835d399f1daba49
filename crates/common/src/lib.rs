//! Common types shared between the encryption engine and its host application.

pub mod algorithm;
pub mod error;
pub mod jwk;
pub mod naming;

pub use algorithm::Algorithm;
pub use error::EngineError;
pub use jwk::{ExportedKey, ExtendedJwk};
