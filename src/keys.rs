//! Signing material: keys, credentials, and candidate-key matching.
//!
//! Keys are always owned. Symmetric key bytes are copied on ingress and
//! egress so callers never observe aliased buffers, and are zeroized on
//! drop.

use sha1::Sha1;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::base64url;
use crate::error::Error;
use crate::header::KeyHints;

/// A key used to seed an HMAC signature.
///
/// Owns its bytes and zeroizes them on drop. Construction rejects empty key
/// material.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey {
    key: Vec<u8>,
    #[zeroize(skip)]
    key_id: Option<String>,
}

impl SymmetricKey {
    /// Copy the given bytes into a new key.
    pub fn new(key: impl AsRef<[u8]>) -> Result<Self, Error> {
        let key = key.as_ref();
        if key.is_empty() {
            return Err(Error::ArgumentMissing("symmetric key bytes"));
        }
        Ok(Self {
            key: key.to_vec(),
            key_id: None,
        })
    }

    /// Attach a key identifier used for `kid` matching.
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// The key identifier, if any.
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// A fresh copy of the key bytes.
    pub fn key_bytes(&self) -> Vec<u8> {
        self.key.clone()
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("len", &self.key.len())
            .field("key_id", &self.key_id)
            .finish()
    }
}

/// An RSA key: always a public half, optionally the private half needed for
/// signing.
#[derive(Debug, Clone)]
pub struct RsaKey {
    public: rsa::RsaPublicKey,
    private: Option<rsa::RsaPrivateKey>,
    key_id: Option<String>,
}

impl RsaKey {
    /// A verification-only key.
    pub fn public(public: rsa::RsaPublicKey) -> Self {
        Self {
            public,
            private: None,
            key_id: None,
        }
    }

    /// A signing key; the public half is derived from it.
    pub fn private(private: rsa::RsaPrivateKey) -> Self {
        Self {
            public: private.to_public_key(),
            private: Some(private),
            key_id: None,
        }
    }

    /// Attach a key identifier used for `kid` matching.
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// The key identifier, if any.
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// The public half.
    pub fn public_key(&self) -> &rsa::RsaPublicKey {
        &self.public
    }

    /// The private half, when this key can sign.
    pub fn private_key(&self) -> Option<&rsa::RsaPrivateKey> {
        self.private.as_ref()
    }
}

/// An X.509 certificate key: the DER bytes plus the certificate's RSA
/// public key.
///
/// Certificate parsing and chain validation are delegated to the caller;
/// this type computes the SHA-1 and SHA-256 thumbprints the key-identifier
/// matching protocol compares against `x5t` / `x5t#S256` header hints.
#[derive(Debug, Clone)]
pub struct X509Key {
    der: Vec<u8>,
    public: rsa::RsaPublicKey,
    key_id: Option<String>,
    private: Option<rsa::RsaPrivateKey>,
}

impl X509Key {
    /// Wrap a certificate's DER encoding and its RSA public key.
    pub fn new(der: impl Into<Vec<u8>>, public: rsa::RsaPublicKey) -> Result<Self, Error> {
        let der = der.into();
        if der.is_empty() {
            return Err(Error::ArgumentMissing("certificate DER bytes"));
        }
        Ok(Self {
            der,
            public,
            key_id: None,
            private: None,
        })
    }

    /// Attach a key identifier used for `kid` matching.
    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    /// Attach the certificate's private key so the key can sign.
    pub fn with_private_key(mut self, private: rsa::RsaPrivateKey) -> Self {
        self.private = Some(private);
        self
    }

    /// The key identifier, if any.
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    /// The certificate DER bytes.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// The certificate's RSA public key.
    pub fn public_key(&self) -> &rsa::RsaPublicKey {
        &self.public
    }

    /// The certificate's private key, when this key can sign.
    pub fn private_key(&self) -> Option<&rsa::RsaPrivateKey> {
        self.private.as_ref()
    }

    /// Base64url SHA-1 thumbprint of the DER encoding (the `x5t` form).
    pub fn thumbprint(&self) -> String {
        base64url::encode(Sha1::digest(&self.der))
    }

    /// Base64url SHA-256 thumbprint of the DER encoding (the `x5t#S256`
    /// form).
    pub fn thumbprint_sha256(&self) -> String {
        base64url::encode(Sha256::digest(&self.der))
    }
}

/// A key usable for signing or verification.
#[derive(Debug, Clone)]
pub enum SecurityKey {
    /// Shared-secret key material for the HMAC family.
    Symmetric(SymmetricKey),
    /// An RSA key pair or public key.
    Rsa(RsaKey),
    /// An X.509 certificate and its RSA key.
    X509(X509Key),
}

impl SecurityKey {
    /// The key identifier, if the key carries one.
    pub fn key_id(&self) -> Option<&str> {
        match self {
            SecurityKey::Symmetric(key) => key.key_id(),
            SecurityKey::Rsa(key) => key.key_id(),
            SecurityKey::X509(key) => key.key_id(),
        }
    }

    /// A short diagnostic label naming the key without exposing material.
    pub(crate) fn label(&self) -> String {
        let kind = match self {
            SecurityKey::Symmetric(_) => "symmetric",
            SecurityKey::Rsa(_) => "rsa",
            SecurityKey::X509(_) => "x509",
        };
        match self.key_id() {
            Some(kid) => format!("{kind} key (kid {kid:?})"),
            None => format!("{kind} key (no kid)"),
        }
    }

    /// Decide whether this key is a match for the header's key-identifier
    /// hints.
    ///
    /// X.509 keys match when any clause the certificate supports agrees:
    /// `kid` against the key identifier, `x5t` against the SHA-1
    /// thumbprint, `x5t#S256` against the SHA-256 thumbprint. Other key
    /// types match on `kid` equality when they carry an identifier. A
    /// header with no hints matches nothing.
    pub fn matches(&self, hints: KeyHints<'_>) -> bool {
        if hints.is_empty() {
            return false;
        }
        match self {
            SecurityKey::X509(key) => {
                let kid_match = match (hints.kid, key.key_id()) {
                    (Some(hint), Some(kid)) => hint == kid,
                    _ => false,
                };
                kid_match
                    || hints.x5t.is_some_and(|hint| hint == key.thumbprint())
                    || hints
                        .x5t_s256
                        .is_some_and(|hint| hint == key.thumbprint_sha256())
            }
            _ => match (hints.kid, self.key_id()) {
                (Some(hint), Some(kid)) => hint == kid,
                _ => false,
            },
        }
    }
}

impl From<SymmetricKey> for SecurityKey {
    fn from(key: SymmetricKey) -> Self {
        SecurityKey::Symmetric(key)
    }
}

impl From<RsaKey> for SecurityKey {
    fn from(key: RsaKey) -> Self {
        SecurityKey::Rsa(key)
    }
}

impl From<X509Key> for SecurityKey {
    fn from(key: X509Key) -> Self {
        SecurityKey::X509(key)
    }
}

/// A key bound to the internal name of the algorithm it signs with.
#[derive(Debug, Clone)]
pub struct SigningCredentials {
    /// The signing key.
    pub key: SecurityKey,
    /// Internal algorithm name, e.g. [`HMAC_SHA256`][crate::algorithms::HMAC_SHA256].
    pub algorithm: String,
}

impl SigningCredentials {
    /// Bind a key to an algorithm.
    pub fn new(key: impl Into<SecurityKey>, algorithm: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            algorithm: algorithm.into(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::header::JwtHeader;
    use serde_json::json;

    fn hints(header: serde_json::Value) -> JwtHeader {
        serde_json::from_value(header).unwrap()
    }

    #[test]
    fn symmetric_key_rejects_empty_material() {
        assert!(matches!(
            SymmetricKey::new([]),
            Err(Error::ArgumentMissing(_))
        ));
    }

    #[test]
    fn symmetric_key_copies_bytes() {
        let mut source = vec![1u8, 2, 3];
        let key = SymmetricKey::new(&source).unwrap();
        source[0] = 99;
        assert_eq!(key.key_bytes(), vec![1, 2, 3]);
    }

    #[test]
    fn debug_never_prints_key_bytes() {
        let key = SymmetricKey::new([0xAA; 32]).unwrap().with_key_id("v1");
        let rendered = format!("{key:?}");
        assert!(!rendered.contains("170"));
        assert!(rendered.contains("v1"));
    }

    #[test]
    fn kid_matching_for_symmetric_keys() {
        let key = SecurityKey::from(SymmetricKey::new([0u8; 32]).unwrap().with_key_id("v1"));
        let header = hints(json!({"kid": "v1"}));
        assert!(key.matches(header.key_hints()));

        let header = hints(json!({"kid": "v2"}));
        assert!(!key.matches(header.key_hints()));

        let header = hints(json!({}));
        assert!(!key.matches(header.key_hints()));

        let anonymous = SecurityKey::from(SymmetricKey::new([0u8; 32]).unwrap());
        let header = hints(json!({"kid": "v1"}));
        assert!(!anonymous.matches(header.key_hints()));
    }

    #[test]
    fn x509_matches_on_any_supported_clause() {
        let private = test_rsa_key();
        let key = X509Key::new(vec![0x30, 0x82, 0x01, 0x0a], private.to_public_key()).unwrap();
        let x5t = key.thumbprint();
        let x5t_s256 = key.thumbprint_sha256();
        let key = SecurityKey::from(key.with_key_id("cert-1"));

        let header = hints(json!({"x5t": x5t}));
        assert!(key.matches(header.key_hints()));

        let header = hints(json!({"x5t#S256": x5t_s256}));
        assert!(key.matches(header.key_hints()));

        let header = hints(json!({"kid": "cert-1"}));
        assert!(key.matches(header.key_hints()));

        let header = hints(json!({"x5t": "AAAA"}));
        assert!(!key.matches(header.key_hints()));
    }

    pub(crate) fn test_rsa_key() -> rsa::RsaPrivateKey {
        crate::providers::test_support::rfc7515_a2_key()
    }
}
