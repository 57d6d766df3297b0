//! The token handler: the crate's public entry points.

use crate::builder::{self, TokenDescriptor};
use crate::compact::{self, DEFAULT_MAX_TOKEN_SIZE};
use crate::config::CryptoConfig;
use crate::error::Error;
use crate::identity::ClaimsPrincipal;
use crate::providers::ProviderFactory;
use crate::token::Jwt;
use crate::validation::{self, ValidationParameters};

/// Creates, reads, writes, and validates compact JWTs.
///
/// A handler owns a snapshot of its [`CryptoConfig`], so concurrent calls
/// observe stable maps and tests never couple through process state.
/// Handlers are cheap to construct and safe to share across threads.
#[derive(Debug, Clone)]
pub struct JwtHandler {
    config: CryptoConfig,
    factory: ProviderFactory,
    max_token_size: usize,
}

impl Default for JwtHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl JwtHandler {
    /// A handler with the default configuration.
    pub fn new() -> Self {
        Self {
            config: CryptoConfig::default(),
            factory: ProviderFactory,
            max_token_size: DEFAULT_MAX_TOKEN_SIZE,
        }
    }

    /// A handler with a custom configuration snapshot.
    pub fn with_config(config: CryptoConfig) -> Self {
        Self {
            config,
            ..Self::new()
        }
    }

    /// Cap the raw byte length of tokens this handler reads.
    pub fn with_max_token_size(mut self, max_token_size: usize) -> Self {
        self.max_token_size = max_token_size;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &CryptoConfig {
        &self.config
    }

    /// The raw-size cap.
    pub fn max_token_size(&self) -> usize {
        self.max_token_size
    }

    /// Structural recognition: true iff `token` has the compact shape and
    /// twice its length fits the size cap. Pure; parses nothing.
    pub fn can_read(&self, token: &str) -> bool {
        compact::is_compact_form(token, self.max_token_size)
    }

    /// Decode a compact token without validating anything beyond structure.
    pub fn read_token(&self, token: &str) -> Result<Jwt, Error> {
        Jwt::parse(token, self.max_token_size)
    }

    /// Run the full validation pipeline and build the claims principal.
    pub fn validate(
        &self,
        token: &str,
        params: &ValidationParameters,
    ) -> Result<(Jwt, ClaimsPrincipal), Error> {
        validation::validate_token(token, params, &self.config, &self.factory, 0)
    }

    /// Assemble (and sign, when the descriptor carries credentials) a
    /// token.
    pub fn create_token(&self, descriptor: &TokenDescriptor) -> Result<Jwt, Error> {
        builder::create_token(descriptor, &self.config, &self.factory)
    }

    /// Render a token's compact form.
    pub fn write_token(&self, token: &Jwt) -> Result<String, Error> {
        token.encode()
    }

    /// Assemble a token from a descriptor and render its compact form.
    pub fn write_descriptor(&self, descriptor: &TokenDescriptor) -> Result<String, Error> {
        self.create_token(descriptor)?.encode()
    }
}
