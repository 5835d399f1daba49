//! AES-256-GCM variant: symmetric authenticated encryption.
//!
//! The initialization vector is drawn once, together with the key, and is
//! carried in the exported key file (`initv`). Every message encrypted
//! under that key reuses the same IV, so encryption is deterministic for a
//! given key, plaintext, and associated data.
//!
//! **Caveat:** reusing a GCM IV across distinct messages under one key
//! compromises both confidentiality and authentication once two different
//! plaintexts are encrypted. The key-file format stores a single IV with
//! the key, so per-message IV rotation would change the exported
//! representation and break decryption of existing files.

use aes_gcm::{
    aead::{Aead, Payload},
    Aes256Gcm, Key, KeyInit, Nonce,
};
use async_trait::async_trait;
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use tokio::sync::{broadcast, Mutex, RwLock};
use tracing::debug;

use common::jwk::SYMMETRIC_KEY_NAME;
use common::{Algorithm, EngineError, ExportedKey, ExtendedJwk};

use crate::codec;
use crate::contract::{ChangeEvent, ChangeNotifier, Engine};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM initialization vector (12 bytes = 96 bits).
pub const IV_LEN: usize = 12;

/// Key and IV owned by a ready [`AesGcmVariant`].
///
/// When this value is dropped, the memory is overwritten with zeroes to
/// minimise the window during which plaintext key material lives in RAM.
struct SymmetricKeyMaterial {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

impl Drop for SymmetricKeyMaterial {
    fn drop(&mut self) {
        self.key.iter_mut().for_each(|b| *b = 0);
        self.iv.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for SymmetricKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("SymmetricKeyMaterial([REDACTED])")
    }
}

/// Symmetric authenticated-encryption implementation of [`Engine`].
///
/// Generic over its randomness source so key and IV generation can be made
/// deterministic in tests; engines built through the registry draw from the
/// OS CSPRNG.
#[derive(Debug)]
pub struct AesGcmVariant<R = OsRng> {
    material: RwLock<Option<SymmetricKeyMaterial>>,
    rng: Mutex<R>,
    notifier: ChangeNotifier,
}

impl AesGcmVariant<OsRng> {
    /// Create an empty (not ready) engine drawing randomness from the OS.
    pub fn new() -> Self {
        Self::with_rng(OsRng)
    }
}

impl Default for AesGcmVariant<OsRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore + CryptoRng + Send> AesGcmVariant<R> {
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
impl<R: RngCore + CryptoRng + Send> Engine for AesGcmVariant<R> {
    fn algorithm(&self) -> Algorithm {
        Algorithm::AesGcm
    }

    async fn ready(&self) -> bool {
        self.material.read().await.is_some()
    }

    async fn generate(&self) -> Result<Vec<ExportedKey>, EngineError> {
        let fresh = {
            let mut rng = self.rng.lock().await;
            let mut key = [0u8; KEY_LEN];
            let mut iv = [0u8; IV_LEN];
            rng.fill_bytes(&mut key);
            rng.fill_bytes(&mut iv);
            SymmetricKeyMaterial { key, iv }
        };
        let representation = codec::encode_symmetric(&fresh.key, &fresh.iv);

        let mut slot = self.material.write().await;
        *slot = Some(fresh);
        drop(slot);
        self.notifier.notify(true);
        debug!(algorithm = %Algorithm::AesGcm, "generated fresh symmetric key material");

        Ok(vec![ExportedKey {
            name: SYMMETRIC_KEY_NAME,
            representation,
        }])
    }

    async fn import_key(&self, representation: ExtendedJwk) -> Result<(), EngineError> {
        let (key, iv) = codec::decode_symmetric(&representation)?;

        let mut slot = self.material.write().await;
        *slot = Some(SymmetricKeyMaterial { key, iv });
        drop(slot);
        self.notifier.notify(true);
        debug!(algorithm = %Algorithm::AesGcm, "imported symmetric key material");
        Ok(())
    }

    async fn drop_key(&self) {
        let mut slot = self.material.write().await;
        *slot = None;
        drop(slot);
        self.notifier.notify(false);
        debug!(algorithm = %Algorithm::AesGcm, "dropped key material");
    }

    async fn encrypt(
        &self,
        plaintext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, EngineError> {
        let guard = self.material.read().await;
        let material = guard.as_ref().ok_or(EngineError::NotReady)?;
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&material.key));
        cipher
            .encrypt(
                Nonce::from_slice(&material.iv),
                Payload {
                    msg: plaintext,
                    aad: associated_data.unwrap_or_default(),
                },
            )
            .map_err(|_| EngineError::Crypto("AES-GCM encryption failed".into()))
    }

    async fn decrypt(
        &self,
        ciphertext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, EngineError> {
        let guard = self.material.read().await;
        let material = guard.as_ref().ok_or(EngineError::NotReady)?;
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&material.key));
        cipher
            .decrypt(
                Nonce::from_slice(&material.iv),
                Payload {
                    msg: ciphertext,
                    aad: associated_data.unwrap_or_default(),
                },
            )
            .map_err(|_| EngineError::Authentication)
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.notifier.subscribe()
    }
}
