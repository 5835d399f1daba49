//! The engine capability contract and its change-notification protocol.

use async_trait::async_trait;
use tokio::sync::broadcast;

use common::{Algorithm, EngineError, ExportedKey, ExtendedJwk};

/// Capacity of each engine's notification channel.
///
/// Key-state transitions are driven by one user flow at a time; a small
/// buffer absorbs a briefly inattentive subscriber.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Notification sent after every successful key-state mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Readiness of the engine after the mutation.
    pub ready: bool,
}

/// Owner of the subscription list for one engine instance.
///
/// Exactly one event is sent per successful `generate`, `import_key` or
/// `drop_key` call, after the mutation has completed; failed calls send
/// nothing. Subscribers that fall further behind than the channel capacity
/// observe a lag error on their receiver rather than blocking the engine.
#[derive(Debug)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Open a new subscription. Only events sent after this call are seen.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    /// Publish a key-state change. Having no subscribers is not an error.
    pub fn notify(&self, ready: bool) {
        let _ = self.tx.send(ChangeEvent { ready });
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared capability interface implemented by every algorithm variant.
///
/// An engine owns zero or one piece of key material. It is created empty
/// (not ready), becomes ready through [`Engine::generate`] or
/// [`Engine::import_key`], and is cleared by [`Engine::drop_key`]. The key
/// slot is only ever replaced whole: a failed operation leaves the previous
/// state fully intact.
#[async_trait]
pub trait Engine: Send + Sync {
    /// The algorithm this engine implements.
    fn algorithm(&self) -> Algorithm;

    /// `true` iff the engine holds everything required for both
    /// [`Engine::encrypt`] and [`Engine::decrypt`]. Never fails.
    async fn ready(&self) -> bool;

    /// Create fresh key material, make the engine ready, and return the
    /// exportable representation(s) in a fixed order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Crypto`] if the underlying primitive fails;
    /// the previous key material, if any, is left untouched and no
    /// notification is sent.
    async fn generate(&self) -> Result<Vec<ExportedKey>, EngineError>;

    /// Validate and load `representation` as this engine's key material.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for a malformed or semantically
    /// invalid representation; the previous state is left unchanged and no
    /// notification is sent.
    async fn import_key(&self, representation: ExtendedJwk) -> Result<(), EngineError>;

    /// Clear the key material. Idempotent; a notification is sent even when
    /// the engine was already empty.
    async fn drop_key(&self);

    /// Encrypt `plaintext`, binding `associated_data` into the
    /// authentication check where the algorithm supports it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotReady`] if no key material is loaded, or
    /// [`EngineError::Crypto`] if the primitive rejects the input.
    async fn encrypt(
        &self,
        plaintext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, EngineError>;

    /// Mirror of [`Engine::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotReady`] if no key material is loaded,
    /// [`EngineError::Authentication`] if ciphertext or associated data were
    /// tampered with (AES-GCM), or [`EngineError::Crypto`] on malformed
    /// input (RSA-OAEP).
    async fn decrypt(
        &self,
        ciphertext: &[u8],
        associated_data: Option<&[u8]>,
    ) -> Result<Vec<u8>, EngineError>;

    /// Subscribe to key-state change notifications.
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent>;
}
