//! Construction of engine instances by algorithm tag.
//!
//! The registry carries no cryptographic logic. It exists so the host
//! application can switch the active engine by name: look the tag up with
//! [`Algorithm::from_name`], build a fresh engine with [`create`], and drop
//! the previous instance — key material never migrates across engines.

use common::Algorithm;

use crate::contract::Engine;
use crate::variants::aes_gcm::AesGcmVariant;
use crate::variants::rsa_oaep::RsaOaepVariant;

/// All selectable algorithms, in presentation order.
pub fn algorithms() -> &'static [Algorithm] {
    &Algorithm::ALL
}

/// Build a fresh, not-ready engine for `algorithm`, drawing randomness from
/// the OS CSPRNG.
pub fn create(algorithm: Algorithm) -> Box<dyn Engine> {
    match algorithm {
        Algorithm::RsaOaep => Box::new(RsaOaepVariant::new()),
        Algorithm::AesGcm => Box::new(AesGcmVariant::new()),
    }
}
