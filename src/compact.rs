//! The compact serialization: `base64url(header) "." base64url(payload) "." base64url(signature)`.
//!
//! Splitting and structural recognition are pure string operations; segment
//! decoding is where untrusted bytes first become JSON, so every failure
//! maps to [`Error::MalformedToken`].

use serde_json::{Map, Value};

use crate::base64url;
use crate::error::Error;

/// Default cap on the raw token's byte length, applied before any parsing.
pub const DEFAULT_MAX_TOKEN_SIZE: usize = 256 * 1024;

/// The three raw segments of a compact token, as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segments<'a> {
    /// The base64url header segment.
    pub header: &'a str,
    /// The base64url payload segment.
    pub payload: &'a str,
    /// The base64url signature segment; empty for unsigned tokens.
    pub signature: &'a str,
}

/// Split a compact token into its three segments.
///
/// Enforces exactly two `.` separators and the base64url alphabet on every
/// segment; only the signature segment may be empty.
pub fn split(token: &str) -> Result<Segments<'_>, Error> {
    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::MalformedToken(
            "compact form requires exactly two '.' separators".into(),
        ));
    };

    if header.is_empty() || !base64url::is_alphabet(header) {
        return Err(Error::MalformedToken("invalid header segment".into()));
    }
    if payload.is_empty() || !base64url::is_alphabet(payload) {
        return Err(Error::MalformedToken("invalid payload segment".into()));
    }
    if !base64url::is_alphabet(signature) {
        return Err(Error::MalformedToken("invalid signature segment".into()));
    }

    Ok(Segments {
        header,
        payload,
        signature,
    })
}

/// Decode one base64url JSON-object segment.
pub fn decode_json_segment(segment: &str) -> Result<Map<String, Value>, Error> {
    let bytes = base64url::decode(segment)?;
    let text = std::str::from_utf8(&bytes)
        .map_err(|_| Error::MalformedToken("segment is not UTF-8".into()))?;
    match serde_json::from_str(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Error::MalformedToken("segment is not a JSON object".into())),
        Err(err) => Err(Error::MalformedToken(format!("segment is not JSON: {err}"))),
    }
}

/// Structural recognition: true iff the string could be a compact JWT this
/// crate reads.
///
/// `len × 2 ≤ max_size` and the shape `^[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]*$`.
/// Pure; allocates no parsed state.
pub fn is_compact_form(token: &str, max_size: usize) -> bool {
    if token.is_empty() || token.len() * 2 > max_size {
        return false;
    }
    split(token).is_ok()
}
