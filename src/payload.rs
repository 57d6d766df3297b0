//! JWT claim set ([RFC 7519][rfc7519] §4).
//!
//! [`JwtPayload`] is a typed view over the payload JSON object, with
//! accessors for the reserved claims the validator interprets. Everything
//! else is opaque and preserved as received, in order.
//!
//! [rfc7519]: https://tools.ietf.org/html/rfc7519

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::numeric_date;

/// Reserved claim names the validator interprets.
pub mod names {
    /// Issuer.
    pub const ISS: &str = "iss";
    /// Subject.
    pub const SUB: &str = "sub";
    /// Audience: a string or an array of strings.
    pub const AUD: &str = "aud";
    /// Expiration time (NumericDate).
    pub const EXP: &str = "exp";
    /// Not-before time (NumericDate).
    pub const NBF: &str = "nbf";
    /// Issued-at time (NumericDate).
    pub const IAT: &str = "iat";
    /// Token identifier.
    pub const JTI: &str = "jti";
    /// Nested actor token (compact JWT).
    pub const ACTORT: &str = "actort";
}

/// The claim set: a JSON object with typed accessors over reserved claims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JwtPayload(Map<String, Value>);

impl JwtPayload {
    /// An empty claim set.
    pub fn new() -> Self {
        Self::default()
    }

    fn str_claim(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    fn date_claim(&self, name: &str) -> Option<DateTime<Utc>> {
        self.0.get(name).and_then(numeric_date::parse)
    }

    /// The `iss` claim.
    pub fn issuer(&self) -> Option<&str> {
        self.str_claim(names::ISS)
    }

    /// The `sub` claim.
    pub fn subject(&self) -> Option<&str> {
        self.str_claim(names::SUB)
    }

    /// The `aud` claim as a set: a single string reads as a one-element
    /// set, an array contributes each of its string elements.
    pub fn audiences(&self) -> Vec<&str> {
        match self.0.get(names::AUD) {
            Some(Value::String(aud)) => vec![aud.as_str()],
            Some(Value::Array(auds)) => auds.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// The `exp` claim.
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.date_claim(names::EXP)
    }

    /// The `nbf` claim.
    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.date_claim(names::NBF)
    }

    /// The `iat` claim.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.date_claim(names::IAT)
    }

    /// The `jti` claim.
    pub fn token_id(&self) -> Option<&str> {
        self.str_claim(names::JTI)
    }

    /// The `actort` claim: a nested compact JWT carrying a delegated
    /// identity.
    pub fn actor_token(&self) -> Option<&str> {
        self.str_claim(names::ACTORT)
    }

    /// Read an arbitrary claim.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Set a claim, replacing any existing value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Set a NumericDate claim.
    pub fn set_date(&mut self, name: impl Into<String>, date: DateTime<Utc>) {
        self.0.insert(name.into(), numeric_date::to_value(date));
    }

    /// Add a claim value, merging with any existing value for the same name
    /// into an array. Used on the creation path where an identity may carry
    /// several claims of one type.
    pub fn add_claim(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.0.get_mut(name) {
            None => {
                self.0.insert(name.to_owned(), value);
            }
            Some(Value::Array(existing)) => existing.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
        }
    }

    /// Enumerate every claim as `(name, value-text)` pairs in member order,
    /// flattening array values to one entry per element. Scalars render
    /// without JSON quoting; objects stay as JSON text.
    pub fn claim_entries(&self) -> Vec<(&str, String)> {
        let mut entries = Vec::with_capacity(self.0.len());
        for (name, value) in &self.0 {
            match value {
                Value::Array(values) => {
                    for value in values {
                        entries.push((name.as_str(), claim_text(value)));
                    }
                }
                value => entries.push((name.as_str(), claim_text(value))),
            }
        }
        entries
    }

    /// The underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Serialize to the exact JSON text used as the second compact segment.
    pub(crate) fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.0)
    }
}

impl From<Map<String, Value>> for JwtPayload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn claim_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
