//! JOSE header ([RFC 7515][rfc7515]).
//!
//! [`JwtHeader`] is a typed view over the header JSON object. The object is
//! kept as received: unknown members are preserved, member order is
//! preserved, and re-serializing a parsed header reproduces the same JSON
//! text. Verification never re-serializes at all; it runs over the original
//! base64url segment retained by [`Jwt`][crate::token::Jwt].
//!
//! [rfc7515]: https://tools.ietf.org/html/rfc7515

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// Registered header member names this crate interprets.
pub mod names {
    /// Signing algorithm.
    pub const ALG: &str = "alg";
    /// Token type, typically `"JWT"`.
    pub const TYP: &str = "typ";
    /// Key identifier hint.
    pub const KID: &str = "kid";
    /// SHA-1 thumbprint of the signing certificate.
    pub const X5T: &str = "x5t";
    /// SHA-256 thumbprint of the signing certificate.
    pub const X5T_S256: &str = "x5t#S256";
    /// JWK Set URL (informational).
    pub const JKU: &str = "jku";
    /// Certificate URL (informational).
    pub const X5U: &str = "x5u";
}

/// The JOSE header: a JSON object with typed accessors over the registered
/// members.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JwtHeader(Map<String, Value>);

impl JwtHeader {
    /// An empty header.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the header for a fresh token: `typ` of `"JWT"`, the given wire
    /// algorithm name, and the key identifier when the key carries one.
    pub(crate) fn for_token(alg: &str, kid: Option<&str>) -> Self {
        let mut map = Map::new();
        map.insert(names::TYP.to_owned(), Value::from("JWT"));
        map.insert(names::ALG.to_owned(), Value::from(alg));
        if let Some(kid) = kid {
            map.insert(names::KID.to_owned(), Value::from(kid));
        }
        Self(map)
    }

    fn str_member(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// The `alg` member.
    pub fn algorithm(&self) -> Option<&str> {
        self.str_member(names::ALG)
    }

    /// The `typ` member.
    pub fn token_type(&self) -> Option<&str> {
        self.str_member(names::TYP)
    }

    /// The `kid` member.
    pub fn key_id(&self) -> Option<&str> {
        self.str_member(names::KID)
    }

    /// The `x5t` member: base64url SHA-1 certificate thumbprint.
    pub fn thumbprint(&self) -> Option<&str> {
        self.str_member(names::X5T)
    }

    /// The `x5t#S256` member: base64url SHA-256 certificate thumbprint.
    pub fn thumbprint_sha256(&self) -> Option<&str> {
        self.str_member(names::X5T_S256)
    }

    /// The `jku` member parsed as a URL. Informational only.
    pub fn jwk_set_url(&self) -> Option<Url> {
        self.str_member(names::JKU).and_then(|s| Url::parse(s).ok())
    }

    /// The `x5u` member parsed as a URL. Informational only.
    pub fn certificate_url(&self) -> Option<Url> {
        self.str_member(names::X5U).and_then(|s| Url::parse(s).ok())
    }

    /// The key-identifier hints for candidate-key matching.
    pub fn key_hints(&self) -> KeyHints<'_> {
        KeyHints {
            kid: self.key_id(),
            x5t: self.thumbprint(),
            x5t_s256: self.thumbprint_sha256(),
        }
    }

    /// Read an arbitrary member.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Set an arbitrary member, replacing any existing value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// The underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Serialize to the exact JSON text used as the first compact segment.
    pub(crate) fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.0)
    }
}

impl From<Map<String, Value>> for JwtHeader {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// The key-identifier hints a header can carry, extracted once per
/// validation so key matching does not re-walk the header.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyHints<'a> {
    /// The `kid` member.
    pub kid: Option<&'a str>,
    /// The `x5t` member.
    pub x5t: Option<&'a str>,
    /// The `x5t#S256` member.
    pub x5t_s256: Option<&'a str>,
}

impl KeyHints<'_> {
    /// True when no hint is present.
    pub fn is_empty(&self) -> bool {
        self.kid.is_none() && self.x5t.is_none() && self.x5t_s256.is_none()
    }
}
