//! Error taxonomy for token creation and validation.
//!
//! Every failure a caller can branch on is a distinct variant of [`Error`].
//! The validation pipeline fails with exactly one category per attempt; the
//! distinction between [`Error::InvalidSignature`] and
//! [`Error::SigningKeyNotFound`] is part of the contract: the latter is the
//! single signal that the caller's key set is likely stale and should be
//! refreshed before retrying.

/// Errors produced while creating, parsing, or validating a token.
///
/// Diagnostic text accumulated across key attempts names keys by their
/// identifiers and algorithms only; key material never appears in messages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required argument was empty or missing.
    #[error("argument missing or empty: {0}")]
    ArgumentMissing(&'static str),

    /// The raw token exceeds the configured size cap.
    #[error("token of {length} bytes exceeds the {limit} byte limit")]
    TokenTooLarge {
        /// Byte length of the rejected input.
        length: usize,
        /// The configured cap.
        limit: usize,
    },

    /// The token failed structural, base64url, UTF-8, or JSON decoding.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// No signature provider exists for the key and algorithm combination.
    #[error("no provider for algorithm {algorithm:?}")]
    UnsupportedAlgorithm {
        /// The resolved algorithm name that no provider covers.
        algorithm: String,
    },

    /// The token carries no signature but the policy requires one.
    #[error("token is unsigned and signed tokens are required")]
    SignatureRequired,

    /// No candidate key verified the signature, and none of them matched the
    /// header's key identifier.
    #[error("signature verification failed: {diagnostics}")]
    InvalidSignature {
        /// Per-key failure text accumulated across every attempted key.
        diagnostics: String,
    },

    /// At least one candidate key matched the header's key identifier but
    /// none verified the signature. The key set is likely stale; refresh it
    /// and retry.
    #[error("a key matched the token's key identifier but did not verify it: {diagnostics}")]
    SigningKeyNotFound {
        /// Per-key failure text accumulated across every attempted key.
        diagnostics: String,
        /// The first verification failure captured during the key loop.
        #[source]
        cause: Option<signature::Error>,
    },

    /// The token has no `exp` claim and the policy requires one.
    #[error("token has no expiration time and one is required")]
    NoExpiration,

    /// The `nbf` claim lies in the future beyond the allowed clock skew.
    #[error("token is not valid before {not_before} (checked at {now})")]
    NotYetValid {
        /// The token's `nbf` instant.
        not_before: chrono::DateTime<chrono::Utc>,
        /// The wall-clock instant of the check.
        now: chrono::DateTime<chrono::Utc>,
    },

    /// The `exp` claim lies in the past beyond the allowed clock skew.
    #[error("token expired at {expires} (checked at {now})")]
    Expired {
        /// The token's `exp` instant.
        expires: chrono::DateTime<chrono::Utc>,
        /// The wall-clock instant of the check.
        now: chrono::DateTime<chrono::Utc>,
    },

    /// The token's audience set does not intersect the allowed audiences.
    #[error("audience {audiences:?} is not among the valid audiences")]
    InvalidAudience {
        /// The audiences the token carried.
        audiences: Vec<String>,
    },

    /// The token's issuer is absent or not among the allowed issuers.
    #[error("issuer {issuer:?} is not among the valid issuers")]
    InvalidIssuer {
        /// The issuer the token carried, if any.
        issuer: Option<String>,
    },

    /// Validation of the nested actor token failed.
    #[error("actor token rejected: {0}")]
    InvalidActor(#[source] Box<Error>),

    /// Nested actor tokens recursed past the configured depth bound.
    #[error("actor nesting exceeds the depth bound of {limit}")]
    ActorDepthExceeded {
        /// The configured recursion bound.
        limit: usize,
    },

    /// The key that verified the signature was rejected by the signing-key
    /// policy (for X.509 keys, the certificate validator).
    #[error("signing key rejected by policy: {0}")]
    InvalidSigningKey(String),

    /// A header or payload value could not be serialized as JSON.
    #[error("serializing: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The signature primitive failed while producing a signature.
    #[error("signing: {0}")]
    Signing(#[source] signature::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
