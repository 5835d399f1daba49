//! RSA-OAEP variant: asymmetric encryption with SHA-256 padding.
//!
//! Generation yields a 2048-bit key pair exported as two independent key
//! files, `"public"` then `"private"`; the generating engine keeps the pair
//! and serves both directions. An imported key file declares exactly one
//! key operation and locks the engine to that direction — a caller needing
//! both directions runs two engines. Associated data is not part of
//! RSA-OAEP; supplying it logs a warning and the data is not bound.

use async_trait::async_trait;
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use rsa::{BigUint, Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::{debug, warn};

use common::jwk::{PRIVATE_KEY_NAME, PUBLIC_KEY_NAME};
use common::{Algorithm, EngineError, ExportedKey, ExtendedJwk};

use crate::codec::{self, RsaKeyHalf};
use crate::contract::{ChangeEvent, ChangeNotifier, Engine};

/// RSA modulus size in bits.
pub const MODULUS_BITS: usize = 2048;

/// Fixed public exponent (F4).
pub const PUBLIC_EXPONENT: u64 = 65537;

/// Key material owned by a ready [`RsaOaepVariant`].
enum RsaKeyMaterial {
    /// Imported public half; encrypt only.
    Public(RsaPublicKey),
    /// Imported private half; decrypt only.
    Private(RsaPrivateKey),
    /// Locally generated pair; serves both directions.
    Pair(RsaPrivateKey),
}

impl RsaKeyMaterial {
    fn encryption_key(&self) -> Result<RsaPublicKey, EngineError> {
        match self {
            RsaKeyMaterial::Public(key) => Ok(key.clone()),
            RsaKeyMaterial::Pair(pair) => Ok(pair.to_public_key()),
            RsaKeyMaterial::Private(_) => Err(EngineError::Crypto(
                "the imported key does not permit encryption".into(),
            )),
        }
    }

    fn decryption_key(&self) -> Result<&RsaPrivateKey, EngineError> {
        match self {
            RsaKeyMaterial::Private(key) | RsaKeyMaterial::Pair(key) => Ok(key),
            RsaKeyMaterial::Public(_) => Err(EngineError::Crypto(
                "the imported key does not permit decryption".into(),
            )),
        }
    }
}

impl std::fmt::Debug for RsaKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        let role = match self {
            RsaKeyMaterial::Public(_) => "Public",
            RsaKeyMaterial::Private(_) => "Private",
            RsaKeyMaterial::Pair(_) => "Pair",
        };
        write!(f, "RsaKeyMaterial::{role}([REDACTED])")
    }
}

/// Asymmetric encryption implementation of [`Engine`].
///
/// Generic over its randomness source, used both for key generation and for
/// the OAEP encryption padding; engines built through the registry draw
/// from the OS CSPRNG.
#[derive(Debug)]
pub struct RsaOaepVariant<R = OsRng> {
    material: RwLock<Option<RsaKeyMaterial>>,
    rng: Mutex<R>,
    notifier: ChangeNotifier,
}

impl RsaOaepVariant<OsRng> {
    /// Create an empty (not ready) engine drawing randomness from the OS.
    pub fn new() -> Self {
        Self::with_rng(OsRng)
    }
}

impl Default for RsaOaepVariant<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng + Send> RsaOaepVariant<R> {
    /// Create an empty engine with an explicit randomness source.
    pub fn with_rng(rng: R) -> Self {
        Self {
            material: RwLock::new(None),
            rng: Mutex::new(rng),
            notifier: ChangeNotifier::new(),
        }
    }
}

#[async_trait]
impl<R: RngCore + CryptoRng + Send> Engine for RsaOaepVariant<R> {
    fn algorithm(&self) -> Algorithm {
        Algorithm::RsaOaep
    }

    async fn ready(&self) -> bool {
        self.material.read().await.is_some()
    }

    async fn generate(&self) -> Result<Vec<ExportedKey>, EngineError> {
        let private = {
            let mut rng = self.rng.lock().await;
            let mut key = RsaPrivateKey::new_with_exp(
                &mut *rng,
                MODULUS_BITS,
                &BigUint::from(PUBLIC_EXPONENT),
            )
            .map_err(|err| EngineError::Crypto(format!("RSA key generation failed: {err}")))?;
            key.precompute()
                .map_err(|err| EngineError::Crypto(format!("RSA key generation failed: {err}")))?;
            key
        };
        let public_jwk = codec::encode_rsa_public(&private.to_public_key());
        let private_jwk = codec::encode_rsa_private(&private);

        let mut slot = self.material.write().await;
        *slot = Some(RsaKeyMaterial::Pair(private));
        drop(slot);
        self.notifier.notify(true);
        debug!(algorithm = %Algorithm::RsaOaep, "generated fresh RSA key pair");

        Ok(vec![
            ExportedKey {
                name: PUBLIC_KEY_NAME,
                representation: public_jwk,
            },
            ExportedKey {
                name: PRIVATE_KEY_NAME,
                representation: private_jwk,
            },
        ])
    }

    async fn import_key(&self, representation: ExtendedJwk) -> Result<(), EngineError> {
        let material = match codec::decode_rsa(&representation)? {
            RsaKeyHalf::Encrypt(key) => RsaKeyMaterial::Public(key),
            RsaKeyHalf::Decrypt(key) => RsaKeyMaterial::Private(key),
        };

        let mut slot = self.material.write().await;
        *slot = Some(material);
        drop(slot);
        self.notifier.notify(true);
        debug!(algorithm = %Algorithm::RsaOaep, "imported RSA key material");
        Ok(())
    }

    async fn drop_key(&self) {
        let mut slot = self.material.write().await;
        *slot = None;
        drop(slot);
        self.notifier.notify(false);
        debug!(algorithm = %Algorithm::RsaOaep, "dropped key material");
    }

    async fn encrypt(
        &self,
        plaintext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, EngineError> {
        if associated_data.is_some() {
            warn!("associated data is not supported by RSA-OAEP and is omitted");
        }
        let key = {
            let guard = self.material.read().await;
            guard.as_ref().ok_or(EngineError::NotReady)?.encryption_key()?
        };
        let mut rng = self.rng.lock().await;
        key.encrypt(&mut *rng, Oaep::new::<Sha256>(), plaintext)
            .map_err(|err| EngineError::Crypto(format!("RSA-OAEP encryption failed: {err}")))
    }

    async fn decrypt(
        &self,
        ciphertext: &[u8],
        _associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, EngineError> {
        let guard = self.material.read().await;
        let key = guard.as_ref().ok_or(EngineError::NotReady)?.decryption_key()?;
        key.decrypt(Oaep::new::<Sha256>(), ciphertext)
            .map_err(|err| EngineError::Crypto(format!("RSA-OAEP decryption failed: {err}")))
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.notifier.subscribe()
    }
}
