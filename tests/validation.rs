//! End-to-end validation behavior over the public API.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jute::algorithms::HMAC_SHA256;
use jute::providers::ProviderFactory;
use jute::{
    Error, JwtHandler, SecurityKey, SigningCredentials, SymmetricKey, TokenDescriptor,
    ValidationParameters,
};

fn zero_key() -> SymmetricKey {
    SymmetricKey::new([0u8; 32]).unwrap()
}

fn at(timestamp: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(timestamp, 0).unwrap()
}

fn descriptor(not_before: DateTime<Utc>, expires: DateTime<Utc>) -> TokenDescriptor {
    TokenDescriptor::new()
        .with_issuer("https://issuer")
        .with_audience("api")
        .with_lifetime(not_before, expires)
        .with_signing_credentials(SigningCredentials::new(zero_key(), HMAC_SHA256))
}

fn params() -> ValidationParameters {
    ValidationParameters::new()
        .with_issuer("https://issuer")
        .with_audience("api")
        .with_signing_key(zero_key())
}

#[test]
fn hs256_round_trip_carries_reserved_claims() {
    let handler = JwtHandler::new();
    let now = Utc::now();
    let compact = handler
        .write_descriptor(&descriptor(now, now + Duration::seconds(600)))
        .unwrap();

    let (token, principal) = handler.validate(&compact, &params()).unwrap();

    assert_eq!(token.header().algorithm(), Some("HS256"));
    assert!(token.signing_key().is_some());
    let identity = principal.identity();
    assert_eq!(identity.find("iss").unwrap().value, "https://issuer");
    assert_eq!(identity.find("aud").unwrap().value, "api");
    assert!(identity.find("exp").is_some());
    assert!(identity.find("nbf").is_some());
    assert_eq!(identity.find("iss").unwrap().issuer, "https://issuer");
}

#[test]
fn expired_token_is_rejected_without_skew() {
    let handler = JwtHandler::new();
    let now = Utc::now();
    let compact = handler
        .write_descriptor(&descriptor(
            now - Duration::seconds(600),
            now - Duration::seconds(10),
        ))
        .unwrap();

    let params = params().with_clock_skew(Duration::zero());
    assert!(matches!(
        handler.validate(&compact, &params),
        Err(Error::Expired { .. })
    ));
}

#[test]
fn audience_mismatch_is_rejected() {
    let handler = JwtHandler::new();
    let now = Utc::now();
    let compact = handler
        .write_descriptor(
            &TokenDescriptor::new()
                .with_issuer("https://issuer")
                .with_audience("other")
                .with_lifetime(now, now + Duration::seconds(600))
                .with_signing_credentials(SigningCredentials::new(zero_key(), HMAC_SHA256)),
        )
        .unwrap();

    assert!(matches!(
        handler.validate(&compact, &params()),
        Err(Error::InvalidAudience { audiences }) if audiences == ["other"]
    ));
}

#[test]
fn tampered_payload_fails_signature_verification() {
    let handler = JwtHandler::new();
    let now = Utc::now();
    let compact = handler
        .write_descriptor(&descriptor(now, now + Duration::seconds(600)))
        .unwrap();

    // Re-encode the payload with one claim value changed; the JSON stays
    // valid, the signature no longer covers it.
    let mut segments: Vec<&str> = compact.split('.').collect();
    let payload = jute::base64url::decode(segments[1]).unwrap();
    let tampered = String::from_utf8(payload)
        .unwrap()
        .replace("\"aud\":\"api\"", "\"aud\":\"sts\"");
    let tampered = jute::base64url::encode(tampered);
    segments[1] = &tampered;
    let tampered = segments.join(".");

    assert!(matches!(
        handler.validate(&tampered, &params()),
        Err(Error::InvalidSignature { .. })
    ));
}

#[test]
fn matching_kid_with_different_key_bytes_signals_rollover() {
    let handler = JwtHandler::new();
    let now = Utc::now();
    let signing = SymmetricKey::new([1u8; 32]).unwrap().with_key_id("v1");
    let stale = SymmetricKey::new([2u8; 32]).unwrap().with_key_id("v1");

    let compact = handler
        .write_descriptor(
            &TokenDescriptor::new()
                .with_issuer("https://issuer")
                .with_audience("api")
                .with_lifetime(now, now + Duration::seconds(600))
                .with_signing_credentials(SigningCredentials::new(signing, HMAC_SHA256)),
        )
        .unwrap();

    let params = ValidationParameters::new()
        .with_issuer("https://issuer")
        .with_audience("api")
        .with_signing_key(stale);

    // The rollover signal implies a key-identifier match existed.
    match handler.validate(&compact, &params) {
        Err(Error::SigningKeyNotFound { diagnostics, .. }) => {
            assert!(diagnostics.contains("v1"));
        }
        other => panic!("expected SigningKeyNotFound, got {other:?}"),
    }
}

#[test]
fn algorithm_remapping_follows_the_inbound_map() {
    let now = Utc::now();
    let writer = JwtHandler::with_config(
        jute::CryptoConfig::default().with_outbound_algorithm(HMAC_SHA256, "foo"),
    );
    let compact = writer
        .write_descriptor(&descriptor(now, now + Duration::seconds(600)))
        .unwrap();
    let token = writer.read_token(&compact).unwrap();
    assert_eq!(token.header().algorithm(), Some("foo"));

    // Default inbound map does not know "foo": no provider resolves and no
    // kid matched, so this is a plain signature failure.
    let default_handler = JwtHandler::new();
    assert!(matches!(
        default_handler.validate(&compact, &params()),
        Err(Error::InvalidSignature { .. })
    ));

    // Teaching the inbound map "foo" restores verification.
    let reader = JwtHandler::with_config(
        jute::CryptoConfig::default().with_inbound_algorithm("foo", HMAC_SHA256),
    );
    assert!(reader.validate(&compact, &params()).is_ok());
}

#[test]
fn unsigned_token_requires_waiver() {
    let handler = JwtHandler::new();
    let now = Utc::now();
    let unsigned = TokenDescriptor::new()
        .with_issuer("https://issuer")
        .with_audience("api")
        .with_lifetime(now, now + Duration::seconds(600));
    let compact = handler.write_descriptor(&unsigned).unwrap();

    // Unsigned tokens fail closed.
    assert!(matches!(
        handler.validate(&compact, &params()),
        Err(Error::SignatureRequired)
    ));

    let waived = params().with_require_signed(false);
    let (token, _) = handler.validate(&compact, &waived).unwrap();
    assert!(token.is_unsigned());
}

#[test]
fn every_segment_bit_flip_is_detected() {
    let handler = JwtHandler::new();
    let now = Utc::now();
    let compact = handler
        .write_descriptor(&descriptor(now, now + Duration::seconds(600)))
        .unwrap();

    // Flipping any sampled character of the signing input or the
    // signature segment makes validation fail (the category depends on
    // whether the flip still decodes).
    let bytes = compact.as_bytes();
    for position in (0..compact.len()).step_by(7) {
        if bytes[position] == b'.' {
            continue;
        }
        let mut tampered = compact.clone().into_bytes();
        tampered[position] = if tampered[position] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(tampered).unwrap();
        if tampered == compact {
            continue;
        }
        assert!(
            handler.validate(&tampered, &params()).is_err(),
            "flip at {position} went undetected"
        );
    }
}

#[test]
fn verification_runs_over_the_received_bytes() {
    // A token assembled externally, with JSON member order this crate
    // would never produce, still verifies: the pipeline consumes the
    // original segments, not a re-serialization.
    let header = br#"{"kid":"v1","alg":"HS256","typ":"JWT"}"#;
    let exp = (Utc::now() + Duration::seconds(600)).timestamp();
    let payload = format!(r#"{{"aud":"api","iss":"https://issuer","exp":{exp}}}"#);

    let signing_input = format!(
        "{}.{}",
        jute::base64url::encode(header),
        jute::base64url::encode(payload.as_bytes()),
    );
    let key: SecurityKey = zero_key().into();
    let factory = ProviderFactory;
    let provider = factory.signer(&key, HMAC_SHA256).unwrap();
    let signature = provider.sign(signing_input.as_bytes()).unwrap();
    factory.release(provider);
    let compact = format!("{signing_input}.{}", jute::base64url::encode(signature));

    let handler = JwtHandler::new();
    let (token, _) = handler.validate(&compact, &params()).unwrap();
    assert_eq!(token.raw().unwrap().compact(), compact);
}

#[test]
fn round_trip_is_stable() {
    // write(read(write(t))) reproduces write(t).
    let handler = JwtHandler::new();
    let now = Utc::now();
    let first = handler
        .write_descriptor(&descriptor(at(now.timestamp()), at(now.timestamp() + 600)))
        .unwrap();
    let reread = handler.read_token(&first).unwrap();
    assert_eq!(handler.write_token(&reread).unwrap(), first);
}

#[test]
fn oversize_input_is_rejected_before_parsing() {
    let handler = JwtHandler::new();
    let mut params = params();
    params.max_token_size = 64;
    let long = format!("{}.{}.{}", "a".repeat(40), "b".repeat(40), "c".repeat(40));
    assert!(matches!(
        handler.validate(&long, &params),
        Err(Error::TokenTooLarge { limit: 64, .. })
    ));
    assert!(matches!(
        handler.validate("", &params),
        Err(Error::ArgumentMissing(_))
    ));
}
