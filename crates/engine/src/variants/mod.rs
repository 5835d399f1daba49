//! Algorithm variants implementing the [`Engine`](crate::contract::Engine)
//! contract.

pub mod aes_gcm;
pub mod rsa_oaep;
