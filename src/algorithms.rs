//! Signature algorithm names ([RFC 7518][RFC7518], the RSA and HMAC SHA-2
//! family).
//!
//! Algorithms have two spellings: the short wire name carried in the JOSE
//! `alg` header (`HS256`, `RS256`, ...) and a longer internal URI used by
//! signing credentials and the provider factory. The two are translated by
//! the inbound/outbound maps on [`CryptoConfig`][crate::config::CryptoConfig];
//! a lookup that misses falls through to the raw name so unknown algorithms
//! travel unchanged and fail later, at provider resolution.
//!
//! [RFC7518]: https://tools.ietf.org/html/rfc7518

/// HMAC using SHA-256 (wire name `HS256`).
pub const HMAC_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#hmac-sha256";
/// HMAC using SHA-384 (wire name `HS384`).
pub const HMAC_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#hmac-sha384";
/// HMAC using SHA-512 (wire name `HS512`).
pub const HMAC_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#hmac-sha512";

/// RSASSA-PKCS1-v1_5 using SHA-256 (wire name `RS256`).
pub const RSA_SHA256: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";
/// RSASSA-PKCS1-v1_5 using SHA-384 (wire name `RS384`).
pub const RSA_SHA384: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha384";
/// RSASSA-PKCS1-v1_5 using SHA-512 (wire name `RS512`).
pub const RSA_SHA512: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512";

/// The unsigned marker algorithm.
pub const NONE: &str = "none";

/// `(wire name, internal URI)` for every supported signing algorithm.
pub(crate) const SUPPORTED: [(&str, &str); 6] = [
    ("HS256", HMAC_SHA256),
    ("HS384", HMAC_SHA384),
    ("HS512", HMAC_SHA512),
    ("RS256", RSA_SHA256),
    ("RS384", RSA_SHA384),
    ("RS512", RSA_SHA512),
];

/// The SHA-2 digest an algorithm binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Sha2 {
    Sha256,
    Sha384,
    Sha512,
}

/// The cryptographic family an algorithm belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Family {
    Hmac(Sha2),
    RsaPkcs1(Sha2),
}

/// Classify an algorithm name, accepting either spelling.
///
/// Returns `None` for `"none"` and for anything outside the supported
/// family; the caller treats that as an unsupported algorithm.
pub(crate) fn family(alg: &str) -> Option<Family> {
    match alg {
        "HS256" | HMAC_SHA256 => Some(Family::Hmac(Sha2::Sha256)),
        "HS384" | HMAC_SHA384 => Some(Family::Hmac(Sha2::Sha384)),
        "HS512" | HMAC_SHA512 => Some(Family::Hmac(Sha2::Sha512)),
        "RS256" | RSA_SHA256 => Some(Family::RsaPkcs1(Sha2::Sha256)),
        "RS384" | RSA_SHA384 => Some(Family::RsaPkcs1(Sha2::Sha384)),
        "RS512" | RSA_SHA512 => Some(Family::RsaPkcs1(Sha2::Sha512)),
        _ => None,
    }
}
