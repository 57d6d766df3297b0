#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod algorithms;
pub mod base64url;
pub mod builder;
pub mod compact;
pub mod config;
pub mod error;
pub mod handler;
pub mod header;
pub mod identity;
pub mod keys;
mod numeric_date;
pub mod payload;
pub mod providers;
pub mod token;
pub mod validation;

pub use builder::TokenDescriptor;
pub use config::CryptoConfig;
pub use error::{Error, Result};
pub use handler::JwtHandler;
pub use header::JwtHeader;
pub use identity::{Claim, ClaimsIdentity, ClaimsPrincipal};
pub use keys::{RsaKey, SecurityKey, SigningCredentials, SymmetricKey, X509Key};
pub use payload::JwtPayload;
pub use token::Jwt;
pub use validation::ValidationParameters;
