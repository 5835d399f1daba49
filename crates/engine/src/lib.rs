//! File encryption engine.
//!
//! Lets a host application encrypt or decrypt an arbitrary binary payload
//! with one of two interchangeable algorithms — AES-256-GCM or RSA-OAEP —
//! and generate, export, and re-import the key material in a portable JSON
//! key format.
//!
//! A caller picks an [`Algorithm`], builds an engine through
//! [`registry::create`], and drives it behind the [`Engine`] trait:
//! `generate` → export, or `import_key` → `encrypt`/`decrypt`. Key-state
//! transitions are observable through [`Engine::subscribe`]. Switching the
//! active algorithm means discarding the engine instance and creating a new
//! one; key material never migrates between instances.

pub mod codec;
pub mod contract;
pub mod registry;
pub mod variants;

pub use common::{Algorithm, EngineError, ExportedKey, ExtendedJwk};
pub use contract::{ChangeEvent, ChangeNotifier, Engine};
pub use variants::aes_gcm::AesGcmVariant;
pub use variants::rsa_oaep::RsaOaepVariant;
