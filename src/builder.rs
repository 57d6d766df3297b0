//! Token creation: descriptor in, signed compact token out.

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use crate::algorithms;
use crate::base64url;
use crate::config::CryptoConfig;
use crate::error::Error;
use crate::header::JwtHeader;
use crate::identity::ClaimsIdentity;
use crate::keys::SigningCredentials;
use crate::payload::{names, JwtPayload};
use crate::providers::ProviderFactory;
use crate::token::{Jwt, RawParts};

/// Lifetime applied when a descriptor names no expiration.
pub fn default_token_lifetime() -> Duration {
    Duration::minutes(60)
}

/// Everything a token is assembled from.
///
/// The descriptor is read-only input: assembly copies claims out of it and
/// never mutates the subject identity or claim collection.
#[derive(Debug, Default)]
pub struct TokenDescriptor {
    /// The `iss` claim.
    pub issuer: Option<String>,
    /// The `aud` claim.
    pub audience: Option<String>,
    /// The subject whose claims (and optional actor) populate the payload.
    pub subject: Option<ClaimsIdentity>,
    /// Further claims merged into the payload after the subject's.
    pub claims: Map<String, Value>,
    /// The `nbf` claim; defaults to now.
    pub not_before: Option<DateTime<Utc>>,
    /// The `exp` claim; defaults to now plus [`default_token_lifetime`].
    pub expires: Option<DateTime<Utc>>,
    /// The `iat` claim; omitted unless set.
    pub issued_at: Option<DateTime<Utc>>,
    /// Signing material; omit to produce an unsigned token.
    pub signing_credentials: Option<SigningCredentials>,
}

impl TokenDescriptor {
    /// An empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the `iss` claim.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Set the `aud` claim.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Set the subject identity.
    pub fn with_subject(mut self, subject: ClaimsIdentity) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Add one payload claim.
    pub fn with_claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.claims.insert(name.into(), value.into());
        self
    }

    /// Set the validity window.
    pub fn with_lifetime(mut self, not_before: DateTime<Utc>, expires: DateTime<Utc>) -> Self {
        self.not_before = Some(not_before);
        self.expires = Some(expires);
        self
    }

    /// Sign with the given credentials.
    pub fn with_signing_credentials(mut self, credentials: SigningCredentials) -> Self {
        self.signing_credentials = Some(credentials);
        self
    }
}

/// Assemble (and sign, when credentials are present) a token from a
/// descriptor.
pub(crate) fn create_token(
    descriptor: &TokenDescriptor,
    config: &CryptoConfig,
    factory: &ProviderFactory,
) -> Result<Jwt, Error> {
    let (alg, kid) = match &descriptor.signing_credentials {
        Some(credentials) => (
            config.resolve_outbound(&credentials.algorithm),
            credentials.key.key_id(),
        ),
        None => (algorithms::NONE, None),
    };
    let header = JwtHeader::for_token(alg, kid);

    let now = Utc::now();
    let mut payload = JwtPayload::new();
    if let Some(issuer) = &descriptor.issuer {
        payload.set(names::ISS, issuer.as_str());
    }
    if let Some(audience) = &descriptor.audience {
        payload.set(names::AUD, audience.as_str());
    }
    payload.set_date(names::NBF, descriptor.not_before.unwrap_or(now));
    payload.set_date(
        names::EXP,
        descriptor
            .expires
            .unwrap_or_else(|| now + default_token_lifetime()),
    );
    if let Some(issued_at) = descriptor.issued_at {
        payload.set_date(names::IAT, issued_at);
    }

    if let Some(subject) = &descriptor.subject {
        for claim in &subject.claims {
            payload.add_claim(&claim.claim_type, claim.value.as_str());
        }
        if let Some(actor) = &subject.actor {
            payload.set(names::ACTORT, actor_value(actor)?);
        }
    }
    for (name, value) in &descriptor.claims {
        payload.add_claim(name, value.clone());
    }

    sign_token(header, payload, descriptor.signing_credentials.as_ref(), factory)
}

/// Serialize, sign, and attach the wire form.
fn sign_token(
    header: JwtHeader,
    payload: JwtPayload,
    credentials: Option<&SigningCredentials>,
    factory: &ProviderFactory,
) -> Result<Jwt, Error> {
    let header_b64 = base64url::encode(header.to_json()?);
    let payload_b64 = base64url::encode(payload.to_json()?);
    let signing_input = format!("{header_b64}.{payload_b64}");

    let (signature_b64, signature) = match credentials {
        Some(credentials) => {
            let provider = factory
                .signer(&credentials.key, &credentials.algorithm)
                .ok_or_else(|| Error::UnsupportedAlgorithm {
                    algorithm: credentials.algorithm.clone(),
                })?;
            let outcome = provider.sign(signing_input.as_bytes());
            factory.release(provider);
            let signature = outcome.map_err(Error::Signing)?;
            (base64url::encode(&signature), Bytes::from(signature))
        }
        None => (String::new(), Bytes::new()),
    };

    let mut jwt = Jwt::new(header, payload);
    jwt.attach_raw(
        RawParts {
            header: header_b64,
            payload: payload_b64,
            signature: signature_b64,
        },
        signature,
    );
    Ok(jwt)
}

/// The `actort` claim value for a subject's actor identity.
///
/// An identity carrying a bootstrap token contributes it verbatim (it is
/// already a compact JWT). Otherwise a fresh unsigned token is built from
/// the actor's claims, recursively when the actor has an actor of its
/// own.
fn actor_value(actor: &ClaimsIdentity) -> Result<String, Error> {
    if let Some(bootstrap) = &actor.bootstrap_token {
        return Ok(bootstrap.clone());
    }

    let header = JwtHeader::for_token(algorithms::NONE, None);
    let mut payload = JwtPayload::new();
    for claim in &actor.claims {
        payload.add_claim(&claim.claim_type, claim.value.as_str());
    }
    if let Some(nested) = &actor.actor {
        payload.set(names::ACTORT, actor_value(nested)?);
    }

    let header_b64 = base64url::encode(header.to_json()?);
    let payload_b64 = base64url::encode(payload.to_json()?);
    Ok(format!("{header_b64}.{payload_b64}."))
}
