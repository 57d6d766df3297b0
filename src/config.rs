//! Crypto and claim-mapping configuration.
//!
//! The maps that translate algorithm names and claim types are plain data on
//! a [`CryptoConfig`] value. A handler clones the process default (or a
//! caller-built config) at construction, so concurrent validations read a
//! consistent snapshot and tests stay hermetic.

use std::collections::{HashMap, HashSet};

use crate::algorithms;

/// The side-property key under which the identity adapter records a claim's
/// pre-mapping short name.
pub const SHORT_CLAIM_TYPE_PROPERTY: &str = "orig_claim";

/// The claim type whose value is a nested compact JWT carrying a delegated
/// (actor) identity.
pub const ACTOR_CLAIM_TYPE: &str = "actort";

/// Name and translation tables consulted while reading and writing tokens.
#[derive(Debug, Clone)]
pub struct CryptoConfig {
    /// Wire `alg` name → internal algorithm name, applied when reading.
    pub inbound_algorithms: HashMap<String, String>,
    /// Internal algorithm name → wire `alg` name, applied when writing.
    pub outbound_algorithms: HashMap<String, String>,
    /// Short claim name → claim type, applied while building identities.
    pub inbound_claims: HashMap<String, String>,
    /// Claim types dropped entirely while building identities.
    pub inbound_claim_filter: HashSet<String>,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        let mut inbound_algorithms = HashMap::new();
        let mut outbound_algorithms = HashMap::new();
        for (wire, internal) in algorithms::SUPPORTED {
            inbound_algorithms.insert(wire.to_owned(), internal.to_owned());
            outbound_algorithms.insert(internal.to_owned(), wire.to_owned());
        }

        Self {
            inbound_algorithms,
            outbound_algorithms,
            inbound_claims: HashMap::new(),
            inbound_claim_filter: HashSet::new(),
        }
    }
}

impl CryptoConfig {
    /// Translate a wire `alg` name to its internal name.
    ///
    /// A name with no mapping falls through unchanged.
    pub fn resolve_inbound<'a>(&'a self, alg: &'a str) -> &'a str {
        self.inbound_algorithms.get(alg).map(String::as_str).unwrap_or(alg)
    }

    /// Translate an internal algorithm name to its wire `alg` name.
    ///
    /// A name with no mapping falls through unchanged.
    pub fn resolve_outbound<'a>(&'a self, alg: &'a str) -> &'a str {
        self.outbound_algorithms.get(alg).map(String::as_str).unwrap_or(alg)
    }

    /// Translate a short claim name to its claim type, falling through to
    /// the raw name. Returns the mapped type and whether a mapping fired.
    pub fn resolve_claim_type<'a>(&'a self, claim: &'a str) -> (&'a str, bool) {
        match self.inbound_claims.get(claim) {
            Some(mapped) => (mapped.as_str(), true),
            None => (claim, false),
        }
    }

    /// Add an inbound algorithm mapping.
    pub fn with_inbound_algorithm(mut self, wire: impl Into<String>, internal: impl Into<String>) -> Self {
        self.inbound_algorithms.insert(wire.into(), internal.into());
        self
    }

    /// Add an outbound algorithm mapping.
    pub fn with_outbound_algorithm(mut self, internal: impl Into<String>, wire: impl Into<String>) -> Self {
        self.outbound_algorithms.insert(internal.into(), wire.into());
        self
    }

    /// Add an inbound claim-type mapping.
    pub fn with_inbound_claim(mut self, short: impl Into<String>, claim_type: impl Into<String>) -> Self {
        self.inbound_claims.insert(short.into(), claim_type.into());
        self
    }

    /// Drop a claim type while building identities.
    pub fn with_claim_filter(mut self, claim_type: impl Into<String>) -> Self {
        self.inbound_claim_filter.insert(claim_type.into());
        self
    }
}
