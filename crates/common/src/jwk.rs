//! Extended JSON Web Key types exchanged with the host application.
//!
//! A key file is UTF-8 JSON holding one [`ExtendedJwk`]: the standard JWK
//! fields used by the supported algorithms plus the non-standard `initv`
//! field carrying the AES-GCM initialization vector. Byte-valued JWK fields
//! (`k`, `n`, `e`, ...) are base64url without padding; `initv` is standard
//! base64 with padding.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Export name of the single AES-GCM key entry.
pub const SYMMETRIC_KEY_NAME: &str = "symmetric";

/// Export name of the RSA public-half entry.
pub const PUBLIC_KEY_NAME: &str = "public";

/// Export name of the RSA private-half entry.
pub const PRIVATE_KEY_NAME: &str = "private";

/// JSON Web Key augmented with an optional initialization-vector field.
///
/// Optional fields are omitted from the serialized JSON when absent, so a
/// public RSA key file carries no private components and a symmetric key
/// file carries no RSA fields.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedJwk {
    /// Key type: `"oct"` (symmetric) or `"RSA"`.
    pub kty: String,

    /// Algorithm hint, e.g. `"A256GCM"` or `"RSA-OAEP-256"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Symmetric key bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub k: Option<String>,

    /// RSA modulus.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// RSA public exponent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,

    /// RSA private exponent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,

    /// RSA first prime factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub p: Option<String>,

    /// RSA second prime factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,

    /// RSA first CRT exponent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,

    /// RSA second CRT exponent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,

    /// RSA CRT coefficient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,

    /// Permitted key operations. RSA key halves declare exactly one of
    /// `"encrypt"` or `"decrypt"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_ops: Option<Vec<String>>,

    /// Extractability marker carried over from the generating runtime.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<bool>,

    /// AES-GCM initialization vector, standard base64. Absent for RSA keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initv: Option<String>,
}

impl fmt::Debug for ExtendedJwk {
    // Never print secret key material — not even in debug builds.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redacted(value: &Option<String>) -> &'static str {
            match value {
                Some(_) => "[REDACTED]",
                None => "None",
            }
        }
        f.debug_struct("ExtendedJwk")
            .field("kty", &self.kty)
            .field("alg", &self.alg)
            .field("key_ops", &self.key_ops)
            .field("ext", &self.ext)
            .field("n", &self.n)
            .field("e", &self.e)
            .field("k", &redacted(&self.k))
            .field("d", &redacted(&self.d))
            .field("p", &redacted(&self.p))
            .field("q", &redacted(&self.q))
            .field("dp", &redacted(&self.dp))
            .field("dq", &redacted(&self.dq))
            .field("qi", &redacted(&self.qi))
            .field("initv", &self.initv)
            .finish()
    }
}

/// A single exportable key produced by a generation call.
///
/// Generation returns these in a fixed order: one `"symmetric"` entry for
/// AES-GCM, or a `"public"` entry followed by a `"private"` entry for RSA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedKey {
    /// `"symmetric"`, `"public"` or `"private"`.
    pub name: &'static str,
    /// The key material in extended-JWK form.
    pub representation: ExtendedJwk,
}

impl ExportedKey {
    /// Serialize the representation to the JSON written into a key file.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Application`] if serialization fails: a freshly
    /// generated key that cannot be serialized indicates a bug, not bad input.
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(&self.representation)
            .map_err(|e| EngineError::Application(format!("error exporting the key: {e}")))
    }

    /// File name under which this key is saved: `{timestamp}.{name}.json`.
    pub fn file_name(&self, timestamp_millis: u64) -> String {
        crate::naming::key_file_name(timestamp_millis, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symmetric_jwk() -> ExtendedJwk {
        ExtendedJwk {
            kty: "oct".into(),
            alg: Some("A256GCM".into()),
            k: Some("AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8".into()),
            key_ops: Some(vec!["encrypt".into(), "decrypt".into()]),
            ext: Some(true),
            initv: Some("AAAAAAAAAAAAAAAA".into()),
            ..ExtendedJwk::default()
        }
    }

    #[test]
    fn serde_round_trip() {
        let jwk = symmetric_jwk();
        let json = serde_json::to_string(&jwk).unwrap();
        let decoded: ExtendedJwk = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, jwk);
    }

    #[test]
    fn absent_fields_are_omitted() {
        let json = serde_json::to_string(&symmetric_jwk()).unwrap();
        assert!(json.contains("\"initv\""));
        assert!(!json.contains("\"n\""));
        assert!(!json.contains("\"d\""));
    }

    #[test]
    fn unknown_extra_fields_are_tolerated() {
        let decoded: ExtendedJwk =
            serde_json::from_str(r#"{"kty":"oct","k":"YQ","initv":"YQ==","use":"enc"}"#).unwrap();
        assert_eq!(decoded.kty, "oct");
        assert_eq!(decoded.initv.as_deref(), Some("YQ=="));
    }

    #[test]
    fn debug_redacts_secret_fields() {
        let jwk = ExtendedJwk {
            d: Some("c2VjcmV0".into()),
            ..symmetric_jwk()
        };
        let printed = format!("{jwk:?}");
        assert!(printed.contains("[REDACTED]"));
        assert!(!printed.contains("c2VjcmV0"));
        assert!(!printed.contains("AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8"));
    }

    #[test]
    fn exported_key_to_json_and_file_name() {
        let exported = ExportedKey {
            name: SYMMETRIC_KEY_NAME,
            representation: symmetric_jwk(),
        };
        let json = exported.to_json().unwrap();
        assert!(json.contains("\"kty\":\"oct\""));
        assert_eq!(exported.file_name(1700000000000), "1700000000000.symmetric.json");
    }
}
