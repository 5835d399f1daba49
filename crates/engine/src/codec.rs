//! Codec between raw key material and the extended-JWK key-file format.
//!
//! All import validation lives here: a representation that decodes
//! successfully carries everything its variant needs. Byte-valued JWK
//! fields use base64url without padding; `initv` uses standard base64 with
//! padding, which is what the exporting side of the format has always
//! written.

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};

use common::{EngineError, ExtendedJwk};

use crate::variants::aes_gcm::{IV_LEN, KEY_LEN};

/// JWK `alg` value written for AES-256-GCM keys.
pub const ALG_A256GCM: &str = "A256GCM";

/// JWK `alg` value written for RSA-OAEP-SHA256 keys.
pub const ALG_RSA_OAEP_256: &str = "RSA-OAEP-256";

const KTY_OCT: &str = "oct";
const KTY_RSA: &str = "RSA";

const OP_ENCRYPT: &str = "encrypt";
const OP_DECRYPT: &str = "decrypt";

/// One directional half of an RSA key pair, as declared by its `key_ops`.
#[derive(Clone)]
pub enum RsaKeyHalf {
    /// Public half; permits encryption only.
    Encrypt(RsaPublicKey),
    /// Private half; permits decryption only.
    Decrypt(RsaPrivateKey),
}

impl std::fmt::Debug for RsaKeyHalf {
    // Never print key material — not even in debug builds.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let direction = match self {
            RsaKeyHalf::Encrypt(_) => "Encrypt",
            RsaKeyHalf::Decrypt(_) => "Decrypt",
        };
        write!(f, "RsaKeyHalf::{direction}([REDACTED])")
    }
}

// ---------------------------------------------------------------------------
// Symmetric (AES-GCM)
// ---------------------------------------------------------------------------

/// Encode a symmetric key and its initialization vector as an extended JWK.
pub fn encode_symmetric(key: &[u8; KEY_LEN], iv: &[u8; IV_LEN]) -> ExtendedJwk {
    ExtendedJwk {
        kty: KTY_OCT.into(),
        alg: Some(ALG_A256GCM.into()),
        k: Some(URL_SAFE_NO_PAD.encode(key)),
        key_ops: Some(vec![OP_ENCRYPT.into(), OP_DECRYPT.into()]),
        ext: Some(true),
        initv: Some(STANDARD.encode(iv)),
        ..ExtendedJwk::default()
    }
}

/// Decode a symmetric extended JWK into its key and initialization vector.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] if the key type is not `"oct"`, the
/// key bytes are missing or the wrong length, or `initv` is missing, not
/// valid base64, or not exactly [`IV_LEN`] bytes.
pub fn decode_symmetric(jwk: &ExtendedJwk) -> Result<([u8; KEY_LEN], [u8; IV_LEN]), EngineError> {
    if jwk.kty != KTY_OCT {
        return Err(EngineError::validation(format!(
            "expected a symmetric (kty \"oct\") key, got kty \"{}\"",
            jwk.kty
        )));
    }

    let k = jwk
        .k
        .as_deref()
        .ok_or_else(|| EngineError::validation("key file has no \"k\" field"))?;
    let key_bytes = URL_SAFE_NO_PAD
        .decode(k)
        .map_err(|_| EngineError::validation("\"k\" is not valid base64url"))?;
    let key: [u8; KEY_LEN] = key_bytes
        .as_slice()
        .try_into()
        .map_err(|_| EngineError::validation(format!("\"k\" must decode to {KEY_LEN} bytes")))?;

    let initv = jwk.initv.as_deref().ok_or_else(|| {
        EngineError::validation("there is no valid initialization vector in key file")
    })?;
    let iv_bytes = STANDARD
        .decode(initv)
        .map_err(|_| EngineError::validation("\"initv\" is not valid base64"))?;
    let iv: [u8; IV_LEN] = iv_bytes
        .as_slice()
        .try_into()
        .map_err(|_| EngineError::validation(format!("\"initv\" must decode to {IV_LEN} bytes")))?;

    Ok((key, iv))
}

// ---------------------------------------------------------------------------
// Asymmetric (RSA-OAEP)
// ---------------------------------------------------------------------------

/// Encode the public half of an RSA key pair. Declares `key_ops: ["encrypt"]`.
pub fn encode_rsa_public(key: &RsaPublicKey) -> ExtendedJwk {
    ExtendedJwk {
        kty: KTY_RSA.into(),
        alg: Some(ALG_RSA_OAEP_256.into()),
        n: Some(encode_uint(key.n())),
        e: Some(encode_uint(key.e())),
        key_ops: Some(vec![OP_ENCRYPT.into()]),
        ext: Some(true),
        ..ExtendedJwk::default()
    }
}

/// Encode the private half of an RSA key pair. Declares `key_ops: ["decrypt"]`
/// and includes the CRT hints when the key has them precomputed.
pub fn encode_rsa_private(key: &RsaPrivateKey) -> ExtendedJwk {
    let primes = key.primes();
    ExtendedJwk {
        kty: KTY_RSA.into(),
        alg: Some(ALG_RSA_OAEP_256.into()),
        n: Some(encode_uint(key.n())),
        e: Some(encode_uint(key.e())),
        d: Some(encode_uint(key.d())),
        p: primes.first().map(encode_uint),
        q: primes.get(1).map(encode_uint),
        dp: key.dp().map(encode_uint),
        dq: key.dq().map(encode_uint),
        qi: key.crt_coefficient().map(|qi| encode_uint(&qi)),
        key_ops: Some(vec![OP_DECRYPT.into()]),
        ext: Some(true),
        ..ExtendedJwk::default()
    }
}

/// Decode an RSA extended JWK into the directional key half it declares.
///
/// # Errors
///
/// Returns [`EngineError::Validation`] ("wrong key") unless `key_ops`
/// declares exactly one of `"encrypt"` or `"decrypt"`, and the fields that
/// direction requires are present and well formed: `n` and `e` for
/// encryption, plus `d`, `p` and `q` for decryption.
pub fn decode_rsa(jwk: &ExtendedJwk) -> Result<RsaKeyHalf, EngineError> {
    if jwk.kty != KTY_RSA {
        return Err(EngineError::validation(format!(
            "expected an RSA key, got kty \"{}\"",
            jwk.kty
        )));
    }

    let ops = jwk.key_ops.as_deref().unwrap_or(&[]);
    let op = match ops {
        [single] if single.as_str() == OP_ENCRYPT || single.as_str() == OP_DECRYPT => {
            single.as_str()
        }
        _ => {
            return Err(EngineError::validation(
                "wrong key: key_ops must declare exactly one of \"encrypt\" or \"decrypt\"",
            ))
        }
    };

    let n = decode_uint("n", jwk.n.as_deref())?;
    let e = decode_uint("e", jwk.e.as_deref())?;

    if op == OP_ENCRYPT {
        if jwk.d.is_some() {
            return Err(EngineError::validation(
                "wrong key: private key material cannot be imported for encryption",
            ));
        }
        let key = RsaPublicKey::new(n, e)
            .map_err(|err| EngineError::validation(format!("invalid RSA public key: {err}")))?;
        Ok(RsaKeyHalf::Encrypt(key))
    } else {
        let d = decode_uint("d", jwk.d.as_deref())?;
        let p = decode_uint("p", jwk.p.as_deref())?;
        let q = decode_uint("q", jwk.q.as_deref())?;
        let mut key = RsaPrivateKey::from_components(n, e, d, vec![p, q])
            .map_err(|err| EngineError::validation(format!("invalid RSA private key: {err}")))?;
        key.precompute()
            .map_err(|err| EngineError::validation(format!("invalid RSA private key: {err}")))?;
        Ok(RsaKeyHalf::Decrypt(key))
    }
}

fn encode_uint(value: &BigUint) -> String {
    URL_SAFE_NO_PAD.encode(value.to_bytes_be())
}

fn decode_uint(field: &str, value: Option<&str>) -> Result<BigUint, EngineError> {
    let value = value
        .ok_or_else(|| EngineError::validation(format!("key file has no \"{field}\" field")))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|_| EngineError::validation(format!("\"{field}\" is not valid base64url")))?;
    Ok(BigUint::from_bytes_be(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    // Small modulus keeps prime generation fast; component sizes are not
    // validated on import, only field presence and encoding.
    fn test_key() -> RsaPrivateKey {
        let mut rng = StdRng::seed_from_u64(7);
        RsaPrivateKey::new(&mut rng, 512).unwrap()
    }

    #[test]
    fn symmetric_encode_decode_round_trip() {
        let key = [0x42u8; KEY_LEN];
        let iv = [0x17u8; IV_LEN];
        let jwk = encode_symmetric(&key, &iv);
        assert_eq!(jwk.kty, "oct");
        assert_eq!(jwk.alg.as_deref(), Some(ALG_A256GCM));
        let (decoded_key, decoded_iv) = decode_symmetric(&jwk).unwrap();
        assert_eq!(decoded_key, key);
        assert_eq!(decoded_iv, iv);
    }

    #[test]
    fn initv_uses_standard_base64() {
        let jwk = encode_symmetric(&[0u8; KEY_LEN], &[0xFFu8; IV_LEN]);
        // The standard alphabet uses '/', which base64url never emits.
        assert_eq!(jwk.initv.as_deref(), Some("////////////////"));
        assert!(jwk.k.unwrap().chars().all(|c| c != '+' && c != '/' && c != '='));
    }

    #[test]
    fn symmetric_decode_rejects_missing_initv() {
        let mut jwk = encode_symmetric(&[0u8; KEY_LEN], &[0u8; IV_LEN]);
        jwk.initv = None;
        let err = decode_symmetric(&jwk).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert!(err.to_string().contains("initialization vector"));
    }

    #[test]
    fn symmetric_decode_rejects_short_initv() {
        let mut jwk = encode_symmetric(&[0u8; KEY_LEN], &[0u8; IV_LEN]);
        jwk.initv = Some(STANDARD.encode([0u8; 8]));
        assert!(matches!(
            decode_symmetric(&jwk),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn symmetric_decode_rejects_bad_base64() {
        let mut jwk = encode_symmetric(&[0u8; KEY_LEN], &[0u8; IV_LEN]);
        jwk.initv = Some("!!!".into());
        assert!(matches!(
            decode_symmetric(&jwk),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn symmetric_decode_rejects_wrong_key_length() {
        let mut jwk = encode_symmetric(&[0u8; KEY_LEN], &[0u8; IV_LEN]);
        jwk.k = Some(URL_SAFE_NO_PAD.encode([0u8; 16]));
        assert!(matches!(
            decode_symmetric(&jwk),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn symmetric_decode_rejects_rsa_kty() {
        let mut jwk = encode_symmetric(&[0u8; KEY_LEN], &[0u8; IV_LEN]);
        jwk.kty = "RSA".into();
        assert!(matches!(
            decode_symmetric(&jwk),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn rsa_halves_encode_their_direction() {
        let key = test_key();
        let public = encode_rsa_public(&key.to_public_key());
        assert_eq!(public.key_ops.as_deref(), Some(&["encrypt".to_string()][..]));
        assert!(public.d.is_none());
        assert!(public.initv.is_none());

        let private = encode_rsa_private(&key);
        assert_eq!(private.key_ops.as_deref(), Some(&["decrypt".to_string()][..]));
        assert!(private.d.is_some());
        assert!(private.p.is_some());
        assert!(private.q.is_some());
    }

    #[test]
    fn rsa_decode_round_trip() {
        let key = test_key();
        let public = decode_rsa(&encode_rsa_public(&key.to_public_key())).unwrap();
        assert!(matches!(public, RsaKeyHalf::Encrypt(_)));

        match decode_rsa(&encode_rsa_private(&key)).unwrap() {
            RsaKeyHalf::Decrypt(decoded) => assert_eq!(decoded.n(), key.n()),
            RsaKeyHalf::Encrypt(_) => panic!("private JWK decoded as public"),
        }
    }

    #[test]
    fn rsa_decode_rejects_bad_key_ops() {
        let key = test_key();
        let mut jwk = encode_rsa_public(&key.to_public_key());

        jwk.key_ops = Some(vec!["encrypt".into(), "decrypt".into()]);
        assert!(matches!(decode_rsa(&jwk), Err(EngineError::Validation(_))));

        jwk.key_ops = Some(vec![]);
        assert!(matches!(decode_rsa(&jwk), Err(EngineError::Validation(_))));

        jwk.key_ops = None;
        assert!(matches!(decode_rsa(&jwk), Err(EngineError::Validation(_))));

        jwk.key_ops = Some(vec!["sign".into()]);
        let err = decode_rsa(&jwk).unwrap_err();
        assert!(err.to_string().contains("wrong key"));
    }

    #[test]
    fn rsa_decode_rejects_private_material_for_encryption() {
        let key = test_key();
        let mut jwk = encode_rsa_private(&key);
        jwk.key_ops = Some(vec!["encrypt".into()]);
        assert!(matches!(decode_rsa(&jwk), Err(EngineError::Validation(_))));
    }

    #[test]
    fn rsa_decode_rejects_missing_private_fields() {
        let key = test_key();
        let mut jwk = encode_rsa_private(&key);
        jwk.p = None;
        let err = decode_rsa(&jwk).unwrap_err();
        assert!(err.to_string().contains("\"p\""));
    }
}
