//! The parsed JWT value.
//!
//! A [`Jwt`] parsed from the wire retains the raw base64url segments it was
//! received with. Signature verification runs over those original bytes,
//! never over a re-serialization, so a semantically equal but differently
//! ordered JSON rendering cannot change the verification outcome.

use bytes::Bytes;

use crate::base64url;
use crate::compact::{self, Segments};
use crate::error::Error;
use crate::header::JwtHeader;
use crate::keys::SecurityKey;
use crate::payload::JwtPayload;

/// The raw wire material a parsed token was received with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawParts {
    /// The base64url header segment as received.
    pub header: String,
    /// The base64url payload segment as received.
    pub payload: String,
    /// The base64url signature segment as received; empty when unsigned.
    pub signature: String,
}

impl RawParts {
    /// The full compact string.
    pub fn compact(&self) -> String {
        format!("{}.{}.{}", self.header, self.payload, self.signature)
    }

    /// The ASCII bytes of `header "." payload`, the exact signing input.
    pub fn signing_input(&self) -> Vec<u8> {
        let mut input = Vec::with_capacity(self.header.len() + 1 + self.payload.len());
        input.extend_from_slice(self.header.as_bytes());
        input.push(b'.');
        input.extend_from_slice(self.payload.as_bytes());
        input
    }
}

/// A JSON Web Token: header, claim set, and (when parsed from or signed
/// into the wire form) the raw segments and signature bytes.
#[derive(Debug, Clone, Default)]
pub struct Jwt {
    header: JwtHeader,
    payload: JwtPayload,
    raw: Option<RawParts>,
    signature: Bytes,
    signing_key: Option<SecurityKey>,
}

impl Jwt {
    /// Assemble a token from parts. Used by the builder; parsed tokens come
    /// from [`Jwt::parse`].
    pub fn new(header: JwtHeader, payload: JwtPayload) -> Self {
        Self {
            header,
            payload,
            raw: None,
            signature: Bytes::new(),
            signing_key: None,
        }
    }

    /// Parse a compact string without any validation beyond structure.
    ///
    /// The size cap applies to the raw string before anything else.
    pub fn parse(token: &str, max_size: usize) -> Result<Self, Error> {
        if token.trim().is_empty() {
            return Err(Error::ArgumentMissing("token"));
        }
        if token.len() > max_size {
            return Err(Error::TokenTooLarge {
                length: token.len(),
                limit: max_size,
            });
        }

        let Segments {
            header,
            payload,
            signature,
        } = compact::split(token)?;

        let signature_bytes = if signature.is_empty() {
            Bytes::new()
        } else {
            let decoded = base64url::decode(signature)?;
            if decoded.is_empty() {
                return Err(Error::MalformedToken(
                    "signature segment decodes to zero bytes".into(),
                ));
            }
            Bytes::from(decoded)
        };

        Ok(Self {
            header: JwtHeader::from(compact::decode_json_segment(header)?),
            payload: JwtPayload::from(compact::decode_json_segment(payload)?),
            raw: Some(RawParts {
                header: header.to_owned(),
                payload: payload.to_owned(),
                signature: signature.to_owned(),
            }),
            signature: signature_bytes,
            signing_key: None,
        })
    }

    /// The header.
    pub fn header(&self) -> &JwtHeader {
        &self.header
    }

    /// The claim set.
    pub fn payload(&self) -> &JwtPayload {
        &self.payload
    }

    /// The raw wire material, when this token came from (or was signed
    /// into) the compact form.
    pub fn raw(&self) -> Option<&RawParts> {
        self.raw.as_ref()
    }

    /// The decoded signature bytes; empty for unsigned tokens.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// True when the token carries no signature.
    pub fn is_unsigned(&self) -> bool {
        self.signature.is_empty()
    }

    /// The key that verified this token's signature, bound by the
    /// validator.
    pub fn signing_key(&self) -> Option<&SecurityKey> {
        self.signing_key.as_ref()
    }

    pub(crate) fn bind_signing_key(&mut self, key: SecurityKey) {
        self.signing_key = Some(key);
    }

    pub(crate) fn attach_raw(&mut self, raw: RawParts, signature: Bytes) {
        self.raw = Some(raw);
        self.signature = signature;
    }

    /// Render the compact form.
    ///
    /// A token with retained wire material reproduces it byte for byte;
    /// otherwise the header and payload are serialized fresh and the token
    /// is rendered unsigned.
    pub fn encode(&self) -> Result<String, Error> {
        if let Some(raw) = &self.raw {
            return Ok(raw.compact());
        }
        let header = base64url::encode(self.header.to_json()?);
        let payload = base64url::encode(self.payload.to_json()?);
        Ok(format!("{header}.{payload}."))
    }
}

impl std::fmt::Display for Jwt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.encode() {
            Ok(compact) => f.write_str(&compact),
            Err(_) => Err(std::fmt::Error),
        }
    }
}
