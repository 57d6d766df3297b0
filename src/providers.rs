//! Signature providers: the capability that signs and verifies raw
//! signing-input bytes under a `(key, algorithm)` pair.
//!
//! Providers are resolved through [`ProviderFactory`], borrowed for a
//! single operation, and handed back through
//! [`release`][ProviderFactory::release] on every exit path. The factory is
//! stateless and therefore thread-safe; providers themselves are not
//! required to be.

use digest::const_oid::AssociatedOid;
use digest::core_api::BlockSizeUser;
use digest::Digest;
use hmac::{Mac, SimpleHmac};
use rsa::pkcs1v15;
use sha2::{Sha256, Sha384, Sha512};
use signature::{SignatureEncoding, Signer, Verifier};

use crate::algorithms::{self, Family, Sha2};
use crate::keys::{RsaKey, SecurityKey, SymmetricKey, X509Key};

/// Sign and verify bytes under one `(key, algorithm)` pair.
///
/// `input` is the exact ASCII byte sequence `base64url(header) "." base64url(payload)`.
pub trait SignatureProvider: Send {
    /// Produce a signature over the signing input.
    fn sign(&self, input: &[u8]) -> Result<Vec<u8>, signature::Error>;

    /// Check a signature over the signing input.
    fn verify(&self, input: &[u8], signature: &[u8]) -> Result<(), signature::Error>;
}

/// HMAC over any SHA-2 digest, carrying an owned copy of the key bytes.
pub struct HmacProvider<D>
where
    D: Digest + BlockSizeUser,
{
    key: Vec<u8>,
    _digest: std::marker::PhantomData<D>,
}

impl<D> HmacProvider<D>
where
    D: Digest + BlockSizeUser,
{
    fn new(key: &SymmetricKey) -> Self {
        Self {
            key: key.key_bytes(),
            _digest: std::marker::PhantomData,
        }
    }

    fn mac(&self) -> SimpleHmac<D> {
        SimpleHmac::new_from_slice(&self.key).expect("HMAC accepts keys of any length")
    }
}

impl<D> Drop for HmacProvider<D>
where
    D: Digest + BlockSizeUser,
{
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.key.zeroize();
    }
}

impl<D> SignatureProvider for HmacProvider<D>
where
    D: Digest + BlockSizeUser + Send,
{
    fn sign(&self, input: &[u8]) -> Result<Vec<u8>, signature::Error> {
        let mut mac = self.mac();
        mac.update(input);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    fn verify(&self, input: &[u8], signature: &[u8]) -> Result<(), signature::Error> {
        let mut mac = self.mac();
        mac.update(input);
        mac.verify_slice(signature)
            .map_err(signature::Error::from_source)
    }
}

/// RSASSA-PKCS1-v1_5 over any SHA-2 digest.
///
/// Holds the verifying key always and the signing key only when the
/// [`SecurityKey`] carried a private half.
pub struct RsaProvider<D>
where
    D: Digest + AssociatedOid,
{
    signing: Option<pkcs1v15::SigningKey<D>>,
    verifying: pkcs1v15::VerifyingKey<D>,
}

impl<D> RsaProvider<D>
where
    D: Digest + AssociatedOid,
{
    fn new(public: &rsa::RsaPublicKey, private: Option<&rsa::RsaPrivateKey>) -> Self {
        Self {
            signing: private.cloned().map(pkcs1v15::SigningKey::new),
            verifying: pkcs1v15::VerifyingKey::new(public.clone()),
        }
    }
}

impl<D> SignatureProvider for RsaProvider<D>
where
    D: Digest + AssociatedOid + Send,
{
    fn sign(&self, input: &[u8]) -> Result<Vec<u8>, signature::Error> {
        let signing = self.signing.as_ref().ok_or_else(signature::Error::new)?;
        Ok(signing.try_sign(input)?.to_vec())
    }

    fn verify(&self, input: &[u8], signature: &[u8]) -> Result<(), signature::Error> {
        let signature = pkcs1v15::Signature::try_from(signature)?;
        self.verifying.verify(input, &signature)
    }
}

/// Whether a provider is being resolved to sign or to verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderIntent {
    /// The provider will produce signatures; private key material required.
    Sign,
    /// The provider will check signatures; public material suffices.
    Verify,
}

/// Resolves `(key, algorithm, intent)` to a [`SignatureProvider`].
///
/// The factory is a stateless value: resolution allocates a provider and
/// [`release`][Self::release] drops it. A pooling factory could stand behind
/// the same surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderFactory;

impl ProviderFactory {
    /// Resolve a provider, or `None` when the combination is unsupported:
    /// the algorithm is outside the RSA/HMAC SHA-2 family, the key type
    /// does not fit the family, or signing was requested from a key with no
    /// private material.
    pub fn provider(
        &self,
        key: &SecurityKey,
        algorithm: &str,
        intent: ProviderIntent,
    ) -> Option<Box<dyn SignatureProvider>> {
        match (algorithms::family(algorithm)?, key) {
            (Family::Hmac(sha), SecurityKey::Symmetric(key)) => Some(hmac_provider(key, sha)),
            (Family::RsaPkcs1(sha), SecurityKey::Rsa(key)) => rsa_provider(key, sha, intent),
            (Family::RsaPkcs1(sha), SecurityKey::X509(key)) => x509_provider(key, sha, intent),
            _ => None,
        }
    }

    /// Shorthand for [`provider`][Self::provider] with [`ProviderIntent::Sign`].
    pub fn signer(&self, key: &SecurityKey, algorithm: &str) -> Option<Box<dyn SignatureProvider>> {
        self.provider(key, algorithm, ProviderIntent::Sign)
    }

    /// Shorthand for [`provider`][Self::provider] with [`ProviderIntent::Verify`].
    pub fn verifier(
        &self,
        key: &SecurityKey,
        algorithm: &str,
    ) -> Option<Box<dyn SignatureProvider>> {
        self.provider(key, algorithm, ProviderIntent::Verify)
    }

    /// Return a borrowed provider. Providers are scoped to one operation;
    /// the current factory reclaims them by dropping.
    pub fn release(&self, provider: Box<dyn SignatureProvider>) {
        drop(provider);
    }
}

fn hmac_provider(key: &SymmetricKey, sha: Sha2) -> Box<dyn SignatureProvider> {
    match sha {
        Sha2::Sha256 => Box::new(HmacProvider::<Sha256>::new(key)),
        Sha2::Sha384 => Box::new(HmacProvider::<Sha384>::new(key)),
        Sha2::Sha512 => Box::new(HmacProvider::<Sha512>::new(key)),
    }
}

fn rsa_parts(
    public: &rsa::RsaPublicKey,
    private: Option<&rsa::RsaPrivateKey>,
    sha: Sha2,
    intent: ProviderIntent,
) -> Option<Box<dyn SignatureProvider>> {
    if intent == ProviderIntent::Sign && private.is_none() {
        return None;
    }
    Some(match sha {
        Sha2::Sha256 => Box::new(RsaProvider::<Sha256>::new(public, private)),
        Sha2::Sha384 => Box::new(RsaProvider::<Sha384>::new(public, private)),
        Sha2::Sha512 => Box::new(RsaProvider::<Sha512>::new(public, private)),
    })
}

fn rsa_provider(key: &RsaKey, sha: Sha2, intent: ProviderIntent) -> Option<Box<dyn SignatureProvider>> {
    rsa_parts(key.public_key(), key.private_key(), sha, intent)
}

fn x509_provider(key: &X509Key, sha: Sha2, intent: ProviderIntent) -> Option<Box<dyn SignatureProvider>> {
    rsa_parts(key.public_key(), key.private_key(), sha, intent)
}
