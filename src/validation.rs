//! The validation pipeline.
//!
//! [`ValidationParameters`] is the whole policy: allowed issuers and
//! audiences, key material, lifetime and signing rules, and optional
//! replacement validators for individual steps. Behavior is composed by
//! setting fields, not by subclassing; the pipeline shape itself is fixed.
//!
//! The nine steps run in a fixed order and each is a gate: pre-checks,
//! parse, signature, lifetime, audience, issuer, actor, signing-key policy,
//! principal. Earlier failures mask later ones by design, so the order is
//! observable and must not change.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::compact::{self, DEFAULT_MAX_TOKEN_SIZE};
use crate::config::CryptoConfig;
use crate::error::Error;
use crate::identity::{
    claims_identity, ClaimsPrincipal, DEFAULT_AUTHENTICATION_TYPE, DEFAULT_NAME_CLAIM_TYPE,
    DEFAULT_ROLE_CLAIM_TYPE,
};
use crate::keys::{SecurityKey, X509Key};
use crate::providers::ProviderFactory;
use crate::token::Jwt;

/// Replaces the issuer step: receives the token's `iss` claim (if any) and
/// returns the authoritative issuer string, or the error to fail with.
pub type IssuerValidator =
    Box<dyn Fn(Option<&str>, &Jwt, &ValidationParameters) -> Result<String, Error> + Send + Sync>;

/// Replaces the audience step: receives the token's audience set.
pub type AudienceValidator =
    Box<dyn Fn(&[&str], &Jwt, &ValidationParameters) -> Result<(), Error> + Send + Sync>;

/// Replaces the lifetime step: receives the token's `nbf` and `exp`.
pub type LifetimeValidator = Box<
    dyn Fn(
            Option<DateTime<Utc>>,
            Option<DateTime<Utc>>,
            &Jwt,
            &ValidationParameters,
        ) -> Result<(), Error>
        + Send
        + Sync,
>;

/// Produces candidate signing keys for a raw token. Invoked only when the
/// token actually carries a signature, so a retriever that performs I/O
/// pays nothing for unsigned or pre-rejected tokens.
pub type KeyRetriever =
    Box<dyn Fn(&str) -> Box<dyn Iterator<Item = SecurityKey> + Send> + Send + Sync>;

/// The delegated X.509 policy check for a signing key that verified a
/// token. A returned error string becomes [`Error::InvalidSigningKey`].
pub type CertificateValidator = Box<dyn Fn(&X509Key) -> Result<(), String> + Send + Sync>;

/// Chooses a claim type per token, overriding the static configured value.
pub type ClaimTypeRetriever = Box<dyn Fn(&Jwt) -> String + Send + Sync>;

/// Policy inputs for one validation call.
///
/// Immutable for the duration of the call; keys are borrowed for the call's
/// scope and the key bound into the validated token is an owned copy.
pub struct ValidationParameters {
    /// Issuers accepted by the default issuer step.
    pub valid_issuers: HashSet<String>,
    /// Replaces the issuer step when set.
    pub issuer_validator: Option<IssuerValidator>,

    /// Audiences accepted by the default audience step.
    pub valid_audiences: HashSet<String>,
    /// Whether the audience step runs at all.
    pub validate_audience: bool,
    /// Replaces the audience step when set.
    pub audience_validator: Option<AudienceValidator>,

    /// A single candidate signing key, tried after retrieved keys.
    pub issuer_signing_key: Option<SecurityKey>,
    /// Further candidate signing keys, tried last.
    pub issuer_signing_keys: Vec<SecurityKey>,
    /// Lazily invoked source of candidate keys, tried first.
    pub issuer_signing_key_retriever: Option<KeyRetriever>,

    /// Whether the lifetime step runs at all.
    pub validate_lifetime: bool,
    /// Replaces the lifetime step when set.
    pub lifetime_validator: Option<LifetimeValidator>,
    /// Symmetric tolerance applied to both `nbf` and `exp`.
    pub clock_skew: Duration,
    /// Reject tokens with no `exp` claim.
    pub require_expiration_time: bool,

    /// Reject tokens that carry no signature.
    pub require_signed_tokens: bool,

    /// Recursively validate the `actort` claim.
    pub validate_actor: bool,
    /// How deep `actort` nesting may recurse.
    pub max_actor_depth: usize,

    /// Run the signing-key policy step on the key that verified the token.
    pub validate_issuer_signing_key: bool,
    /// The X.509 policy check consulted by the signing-key step.
    pub certificate_validator: Option<CertificateValidator>,

    /// Claim type the built identity resolves names through.
    pub name_claim_type: String,
    /// Claim type the built identity resolves roles through.
    pub role_claim_type: String,
    /// Per-token override for [`name_claim_type`][Self::name_claim_type].
    pub name_claim_type_retriever: Option<ClaimTypeRetriever>,
    /// Per-token override for [`role_claim_type`][Self::role_claim_type].
    pub role_claim_type_retriever: Option<ClaimTypeRetriever>,

    /// Attach the raw compact string to the built identity.
    pub save_signin_token: bool,
    /// Authentication type recorded on the built identity.
    pub authentication_type: String,

    /// Size cap applied to the raw token (and to nested actor tokens).
    pub max_token_size: usize,
}

impl Default for ValidationParameters {
    fn default() -> Self {
        Self {
            valid_issuers: HashSet::new(),
            issuer_validator: None,
            valid_audiences: HashSet::new(),
            validate_audience: true,
            audience_validator: None,
            issuer_signing_key: None,
            issuer_signing_keys: Vec::new(),
            issuer_signing_key_retriever: None,
            validate_lifetime: true,
            lifetime_validator: None,
            clock_skew: Duration::minutes(5),
            require_expiration_time: true,
            require_signed_tokens: true,
            validate_actor: false,
            max_actor_depth: 1,
            validate_issuer_signing_key: false,
            certificate_validator: None,
            name_claim_type: DEFAULT_NAME_CLAIM_TYPE.to_owned(),
            role_claim_type: DEFAULT_ROLE_CLAIM_TYPE.to_owned(),
            name_claim_type_retriever: None,
            role_claim_type_retriever: None,
            save_signin_token: false,
            authentication_type: DEFAULT_AUTHENTICATION_TYPE.to_owned(),
            max_token_size: DEFAULT_MAX_TOKEN_SIZE,
        }
    }
}

impl std::fmt::Debug for ValidationParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationParameters")
            .field("valid_issuers", &self.valid_issuers)
            .field("valid_audiences", &self.valid_audiences)
            .field("validate_audience", &self.validate_audience)
            .field("validate_lifetime", &self.validate_lifetime)
            .field("clock_skew", &self.clock_skew)
            .field("require_expiration_time", &self.require_expiration_time)
            .field("require_signed_tokens", &self.require_signed_tokens)
            .field("validate_actor", &self.validate_actor)
            .field("max_actor_depth", &self.max_actor_depth)
            .field(
                "validate_issuer_signing_key",
                &self.validate_issuer_signing_key,
            )
            .field("signing_keys", &self.issuer_signing_keys.len())
            .field(
                "has_key_retriever",
                &self.issuer_signing_key_retriever.is_some(),
            )
            .field("max_token_size", &self.max_token_size)
            .finish_non_exhaustive()
    }
}

impl ValidationParameters {
    /// The defaults: signed tokens required, lifetime and audience checked,
    /// five minutes of clock skew.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept this issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.valid_issuers.insert(issuer.into());
        self
    }

    /// Accept this audience.
    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.valid_audiences.insert(audience.into());
        self
    }

    /// Use this key as the primary signature candidate.
    pub fn with_signing_key(mut self, key: impl Into<SecurityKey>) -> Self {
        self.issuer_signing_key = Some(key.into());
        self
    }

    /// Add a further signature candidate.
    pub fn with_additional_signing_key(mut self, key: impl Into<SecurityKey>) -> Self {
        self.issuer_signing_keys.push(key.into());
        self
    }

    /// Set the symmetric clock-skew tolerance.
    pub fn with_clock_skew(mut self, skew: Duration) -> Self {
        self.clock_skew = skew;
        self
    }

    /// Require or waive the `exp` claim.
    pub fn with_require_expiration(mut self, required: bool) -> Self {
        self.require_expiration_time = required;
        self
    }

    /// Require or waive a signature.
    pub fn with_require_signed(mut self, required: bool) -> Self {
        self.require_signed_tokens = required;
        self
    }
}

/// Run the pipeline at a given actor depth. Depth 0 is the caller's token;
/// nested `actort` validation re-enters here one level deeper.
pub(crate) fn validate_token(
    raw: &str,
    params: &ValidationParameters,
    config: &CryptoConfig,
    factory: &ProviderFactory,
    depth: usize,
) -> Result<(Jwt, ClaimsPrincipal), Error> {
    // Step 1: pre-checks, cheapest first.
    if raw.trim().is_empty() {
        return Err(Error::ArgumentMissing("token"));
    }
    if raw.len() > params.max_token_size {
        return Err(Error::TokenTooLarge {
            length: raw.len(),
            limit: params.max_token_size,
        });
    }
    if !compact::is_compact_form(raw, params.max_token_size) {
        return Err(Error::MalformedToken(
            "input is not in JWS compact form".into(),
        ));
    }

    // Step 2: parse. Raw segments are retained for verification.
    let mut jwt = Jwt::parse(raw, params.max_token_size)?;

    // Step 3: signature.
    if jwt.is_unsigned() {
        if params.require_signed_tokens {
            return Err(Error::SignatureRequired);
        }
        debug!("accepting unsigned token; signature requirement waived");
    } else {
        verify_signature(&mut jwt, raw, params, config, factory)?;
    }

    // Step 4: lifetime.
    if params.validate_lifetime {
        validate_lifetime(&jwt, params)?;
    }

    // Step 5: audience.
    if params.validate_audience {
        validate_audience(&jwt, params)?;
    }

    // Step 6: issuer. The matched issuer stamps every claim of the built
    // identity.
    let issuer = validate_issuer(&jwt, params)?;

    // Step 7: actor.
    if params.validate_actor {
        if let Some(actor_token) = jwt.payload().actor_token().filter(|t| !t.is_empty()) {
            if depth + 1 > params.max_actor_depth {
                return Err(Error::ActorDepthExceeded {
                    limit: params.max_actor_depth,
                });
            }
            validate_token(actor_token, params, config, factory, depth + 1).map_err(
                |err| match err {
                    depth_err @ Error::ActorDepthExceeded { .. } => depth_err,
                    other => Error::InvalidActor(Box::new(other)),
                },
            )?;
        }
    }

    // Step 8: signing-key policy.
    if params.validate_issuer_signing_key {
        validate_signing_key(&jwt, params)?;
    }

    // Step 9: principal.
    let identity = claims_identity(&jwt, &issuer, params, config, depth);
    debug!(issuer = %issuer, claims = identity.claims.len(), "token validated");
    Ok((jwt, ClaimsPrincipal::new(identity)))
}

/// Step 3 for signed tokens: the candidate-key loop.
///
/// Keys matching the header's key-identifier hints are tried first. Per-key
/// failures accumulate into a diagnostic string (identifiers and algorithm
/// names only, never key material) instead of unwinding, and every borrowed
/// provider is released on every path. The terminal error distinguishes
/// "a key with the right identifier exists but did not verify" (the
/// rollover signal) from a plain signature mismatch.
fn verify_signature(
    jwt: &mut Jwt,
    raw: &str,
    params: &ValidationParameters,
    config: &CryptoConfig,
    factory: &ProviderFactory,
) -> Result<(), Error> {
    let algorithm = config
        .resolve_inbound(jwt.header().algorithm().unwrap_or_default())
        .to_owned();
    let signing_input = jwt
        .raw()
        .expect("parsed token retains its wire segments")
        .signing_input();
    let signature = jwt.signature().to_vec();

    let mut candidates: Vec<SecurityKey> = Vec::new();
    if let Some(retrieve) = &params.issuer_signing_key_retriever {
        candidates.extend(retrieve(raw));
    }
    candidates.extend(params.issuer_signing_key.iter().cloned());
    candidates.extend(params.issuer_signing_keys.iter().cloned());

    let hints = jwt.header().key_hints();
    let (matched, unmatched): (Vec<_>, Vec<_>) =
        candidates.into_iter().partition(|key| key.matches(hints));
    let any_kid_match = !matched.is_empty();

    let mut diagnostics = String::new();
    let mut first_cause: Option<signature::Error> = None;
    let mut note = |line: String| {
        if !diagnostics.is_empty() {
            diagnostics.push_str("; ");
        }
        diagnostics.push_str(&line);
    };

    if matched.is_empty() && unmatched.is_empty() {
        note("no candidate signing keys were available".into());
    }

    for key in matched.into_iter().chain(unmatched) {
        let Some(provider) = factory.verifier(&key, &algorithm) else {
            note(format!(
                "{}: no provider for algorithm {algorithm:?}",
                key.label()
            ));
            continue;
        };
        let outcome = provider.verify(&signing_input, &signature);
        factory.release(provider);
        match outcome {
            Ok(()) => {
                debug!(key = %key.label(), "signature verified");
                jwt.bind_signing_key(key);
                return Ok(());
            }
            Err(err) => {
                note(format!("{}: {err}", key.label()));
                first_cause.get_or_insert(err);
            }
        }
    }

    if any_kid_match {
        warn!(%diagnostics, "keys matched the token's key identifier but none verified; key set may be stale");
        Err(Error::SigningKeyNotFound {
            diagnostics,
            cause: first_cause,
        })
    } else {
        warn!(%diagnostics, "signature verification failed");
        Err(Error::InvalidSignature { diagnostics })
    }
}

/// Step 4: `nbf`/`exp` against the wall clock with symmetric skew.
fn validate_lifetime(jwt: &Jwt, params: &ValidationParameters) -> Result<(), Error> {
    let not_before = jwt.payload().not_before();
    let expires = jwt.payload().expiration();

    if let Some(validator) = &params.lifetime_validator {
        return validator(not_before, expires, jwt, params);
    }

    if params.require_expiration_time && expires.is_none() {
        return Err(Error::NoExpiration);
    }

    let now = Utc::now();
    if let Some(not_before) = not_before {
        if not_before > now + params.clock_skew {
            return Err(Error::NotYetValid { not_before, now });
        }
    }
    if let Some(expires) = expires {
        if now - params.clock_skew >= expires {
            return Err(Error::Expired { expires, now });
        }
    }
    Ok(())
}

/// Step 5: the token's audience set must intersect the allowed set.
fn validate_audience(jwt: &Jwt, params: &ValidationParameters) -> Result<(), Error> {
    let audiences = jwt.payload().audiences();

    if let Some(validator) = &params.audience_validator {
        return validator(&audiences, jwt, params);
    }

    if audiences
        .iter()
        .any(|aud| params.valid_audiences.contains(*aud))
    {
        return Ok(());
    }
    Err(Error::InvalidAudience {
        audiences: audiences.into_iter().map(str::to_owned).collect(),
    })
}

/// Step 6: `iss` must be present and allowed; the matched string is
/// authoritative for claim stamping.
fn validate_issuer(jwt: &Jwt, params: &ValidationParameters) -> Result<String, Error> {
    let issuer = jwt.payload().issuer();

    if let Some(validator) = &params.issuer_validator {
        return validator(issuer, jwt, params);
    }

    match issuer {
        Some(issuer) if params.valid_issuers.contains(issuer) => Ok(issuer.to_owned()),
        other => Err(Error::InvalidIssuer {
            issuer: other.map(str::to_owned),
        }),
    }
}

/// Step 8: policy over the key that verified the signature. X.509 keys are
/// referred to the certificate validator; other key types pass by default.
fn validate_signing_key(jwt: &Jwt, params: &ValidationParameters) -> Result<(), Error> {
    let Some(key) = jwt.signing_key() else {
        return Ok(());
    };
    if let SecurityKey::X509(certificate) = key {
        if let Some(validator) = &params.certificate_validator {
            validator(certificate).map_err(|reason| {
                warn!(key = %key.label(), %reason, "signing key rejected by certificate policy");
                Error::InvalidSigningKey(reason)
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::base64url;
    use serde_json::json;

    fn unsigned_token(payload: serde_json::Value) -> String {
        format!(
            "{}.{}.",
            base64url::encode(serde_json::to_vec(&json!({"alg": "none"})).unwrap()),
            base64url::encode(serde_json::to_vec(&payload).unwrap()),
        )
    }

    fn permissive() -> ValidationParameters {
        ValidationParameters::new()
            .with_require_signed(false)
            .with_require_expiration(false)
            .with_issuer("https://issuer")
            .with_audience("api")
    }

    fn run(token: &str, params: &ValidationParameters) -> Result<(Jwt, ClaimsPrincipal), Error> {
        validate_token(
            token,
            params,
            &CryptoConfig::default(),
            &ProviderFactory,
            0,
        )
    }

    fn now() -> i64 {
        Utc::now().timestamp()
    }

    #[test]
    fn unsigned_token_passes_when_requirement_waived() {
        let token = unsigned_token(json!({"iss": "https://issuer", "aud": "api"}));
        let (jwt, principal) = run(&token, &permissive()).unwrap();
        assert!(jwt.is_unsigned());
        assert_eq!(principal.identity().find("iss").unwrap().value, "https://issuer");
    }

    #[test]
    fn unsigned_token_fails_by_default() {
        let token = unsigned_token(json!({"iss": "https://issuer", "aud": "api"}));
        let params = ValidationParameters::new()
            .with_issuer("https://issuer")
            .with_audience("api");
        assert!(matches!(run(&token, &params), Err(Error::SignatureRequired)));
    }

    #[test]
    fn pre_checks_precede_parsing() {
        assert!(matches!(
            run("   ", &permissive()),
            Err(Error::ArgumentMissing(_))
        ));

        let mut tiny = permissive();
        tiny.max_token_size = 4;
        assert!(matches!(
            run("aaaaa.bbbbb.", &tiny),
            Err(Error::TokenTooLarge { .. })
        ));

        assert!(matches!(
            run("no-dots-here", &permissive()),
            Err(Error::MalformedToken(_))
        ));
    }

    #[test]
    fn missing_expiration_is_rejected_when_required() {
        let token = unsigned_token(json!({"iss": "https://issuer", "aud": "api"}));
        let params = permissive().with_require_expiration(true);
        assert!(matches!(run(&token, &params), Err(Error::NoExpiration)));
    }

    #[test]
    fn clock_skew_is_symmetric() {
        // Expired two minutes ago and valid one minute from now: both
        // inside a five-minute skew.
        let token = unsigned_token(json!({
            "iss": "https://issuer",
            "aud": "api",
            "exp": now() - 120,
            "nbf": now() + 60,
        }));
        assert!(run(&token, &permissive()).is_ok());

        let strict = permissive().with_clock_skew(Duration::zero());
        assert!(matches!(run(&token, &strict), Err(Error::Expired { .. })));

        let future = unsigned_token(json!({
            "iss": "https://issuer",
            "aud": "api",
            "nbf": now() + 600,
        }));
        assert!(matches!(
            run(&future, &permissive()),
            Err(Error::NotYetValid { .. })
        ));
    }

    #[test]
    fn lifetime_failure_masks_audience_failure() {
        // Wrong audience AND expired: the lifetime gate runs first.
        let token = unsigned_token(json!({
            "iss": "https://issuer",
            "aud": "other",
            "exp": now() - 600,
        }));
        let params = permissive().with_clock_skew(Duration::zero());
        assert!(matches!(run(&token, &params), Err(Error::Expired { .. })));
    }

    #[test]
    fn audience_intersection_with_array_aud() {
        let token = unsigned_token(json!({
            "iss": "https://issuer",
            "aud": ["other", "api"],
        }));
        assert!(run(&token, &permissive()).is_ok());

        let token = unsigned_token(json!({"iss": "https://issuer", "aud": ["other"]}));
        assert!(matches!(
            run(&token, &permissive()),
            Err(Error::InvalidAudience { .. })
        ));

        let token = unsigned_token(json!({"iss": "https://issuer"}));
        assert!(matches!(
            run(&token, &permissive()),
            Err(Error::InvalidAudience { .. })
        ));
    }

    #[test]
    fn issuer_must_be_present_and_allowed() {
        let token = unsigned_token(json!({"iss": "https://evil", "aud": "api"}));
        assert!(matches!(
            run(&token, &permissive()),
            Err(Error::InvalidIssuer {
                issuer: Some(issuer)
            }) if issuer == "https://evil"
        ));

        let token = unsigned_token(json!({"aud": "api"}));
        assert!(matches!(
            run(&token, &permissive()),
            Err(Error::InvalidIssuer { issuer: None })
        ));
    }

    #[test]
    fn replacement_validators_are_authoritative() {
        let token = unsigned_token(json!({"aud": "nobody", "exp": now() - 9000}));
        let mut params = permissive();
        params.lifetime_validator = Some(Box::new(|_, _, _, _| Ok(())));
        params.audience_validator = Some(Box::new(|_, _, _| Ok(())));
        params.issuer_validator =
            Some(Box::new(|_, _, _| Ok("https://override".to_owned())));

        let (_, principal) = run(&token, &params).unwrap();
        assert_eq!(
            principal.identity().find("aud").unwrap().issuer,
            "https://override"
        );
    }

    #[test]
    fn actor_validation_recurses_and_wraps_failures() {
        let good_actor = unsigned_token(json!({"iss": "https://issuer", "aud": "api"}));
        let token = unsigned_token(json!({
            "iss": "https://issuer",
            "aud": "api",
            "actort": good_actor,
        }));
        let mut params = permissive();
        params.validate_actor = true;
        let (_, principal) = run(&token, &params).unwrap();
        assert!(principal.identity().actor.is_some());

        let bad_actor = unsigned_token(json!({"iss": "https://evil", "aud": "api"}));
        let token = unsigned_token(json!({
            "iss": "https://issuer",
            "aud": "api",
            "actort": bad_actor,
        }));
        match run(&token, &params) {
            Err(Error::InvalidActor(cause)) => {
                assert!(matches!(*cause, Error::InvalidIssuer { .. }))
            }
            other => panic!("expected InvalidActor, got {other:?}"),
        }
    }

    #[test]
    fn retrieved_keys_are_tried_before_configured_keys() {
        use crate::builder::TokenDescriptor;
        use crate::keys::{SigningCredentials, SymmetricKey};

        let signing = SymmetricKey::new([3u8; 32]).unwrap();
        let descriptor = TokenDescriptor::new()
            .with_issuer("https://issuer")
            .with_audience("api")
            .with_signing_credentials(SigningCredentials::new(
                signing.clone(),
                crate::algorithms::HMAC_SHA256,
            ));
        let token = crate::builder::create_token(
            &descriptor,
            &CryptoConfig::default(),
            &ProviderFactory,
        )
        .unwrap()
        .encode()
        .unwrap();

        // Only the retriever holds the right key.
        let mut params = permissive();
        params.issuer_signing_key = Some(SymmetricKey::new([4u8; 32]).unwrap().into());
        params.issuer_signing_key_retriever = Some(Box::new(move |_raw| {
            let key: SecurityKey = signing.clone().into();
            Box::new(std::iter::once(key))
        }));
        let (jwt, _) = run(&token, &params).unwrap();
        assert!(matches!(
            jwt.signing_key(),
            Some(SecurityKey::Symmetric(_))
        ));
    }

    #[test]
    fn certificate_policy_gates_x509_signing_keys() {
        use crate::builder::TokenDescriptor;
        use crate::keys::{SigningCredentials, X509Key};

        let private = crate::providers::test_support::rfc7515_a2_key();
        let certificate = X509Key::new(vec![0x30, 0x82, 0x05, 0x39], private.to_public_key())
            .unwrap()
            .with_key_id("cert-1")
            .with_private_key(private);

        let descriptor = TokenDescriptor::new()
            .with_issuer("https://issuer")
            .with_audience("api")
            .with_signing_credentials(SigningCredentials::new(
                certificate.clone(),
                crate::algorithms::RSA_SHA256,
            ));
        let token = crate::builder::create_token(
            &descriptor,
            &CryptoConfig::default(),
            &ProviderFactory,
        )
        .unwrap()
        .encode()
        .unwrap();

        let mut params = permissive().with_signing_key(certificate);
        params.validate_issuer_signing_key = true;

        // No certificate validator configured: the default policy accepts.
        assert!(run(&token, &params).is_ok());

        params.certificate_validator =
            Some(Box::new(|_cert| Err("certificate chain is untrusted".into())));
        assert!(matches!(
            run(&token, &params),
            Err(Error::InvalidSigningKey(reason)) if reason.contains("untrusted")
        ));
    }

    #[test]
    fn actor_nesting_is_depth_bounded() {
        let inner = unsigned_token(json!({"iss": "https://issuer", "aud": "api"}));
        let middle = unsigned_token(json!({
            "iss": "https://issuer",
            "aud": "api",
            "actort": inner,
        }));
        let outer = unsigned_token(json!({
            "iss": "https://issuer",
            "aud": "api",
            "actort": middle,
        }));

        let mut params = permissive();
        params.validate_actor = true;
        assert!(matches!(
            run(&outer, &params),
            Err(Error::ActorDepthExceeded { limit: 1 })
        ));

        params.max_actor_depth = 2;
        assert!(run(&outer, &params).is_ok());
    }
}
