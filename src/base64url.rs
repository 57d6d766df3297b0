//! Base64url encoding as used by the compact serialization: the URL-safe
//! alphabet (`A-Z a-z 0-9 - _`), no `=` padding.

use base64ct::{Base64UrlUnpadded, Encoding};

use crate::error::Error;

/// Encode bytes with the URL-safe alphabet and no padding.
pub fn encode(data: impl AsRef<[u8]>) -> String {
    Base64UrlUnpadded::encode_string(data.as_ref())
}

/// Decode a base64url string.
///
/// Any character outside the alphabet, and any length that cannot have been
/// produced by unpadded encoding, is rejected as [`Error::MalformedToken`].
pub fn decode(value: &str) -> Result<Vec<u8>, Error> {
    Base64UrlUnpadded::decode_vec(value)
        .map_err(|_| Error::MalformedToken(format!("invalid base64url segment ({} chars)", value.len())))
}

/// True when every character of `value` belongs to the base64url alphabet.
pub(crate) fn is_alphabet(value: &str) -> bool {
    value
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
