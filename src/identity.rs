//! Claims principals: the validated-identity view of a token.
//!
//! The adapter in this module maps a validated [`Jwt`] into a
//! [`ClaimsPrincipal`] under the claim filter and claim-type map of the
//! active [`CryptoConfig`], stamping every claim with the validated issuer.

use std::collections::HashMap;

use crate::config::{CryptoConfig, ACTOR_CLAIM_TYPE, SHORT_CLAIM_TYPE_PROPERTY};
use crate::token::Jwt;
use crate::validation::ValidationParameters;

/// Authentication type recorded on identities when the caller does not
/// choose one.
pub const DEFAULT_AUTHENTICATION_TYPE: &str = "federated";

/// Claim type consulted by [`ClaimsIdentity::name`] by default.
pub const DEFAULT_NAME_CLAIM_TYPE: &str = "name";

/// Claim type consulted by [`ClaimsIdentity::roles`] by default.
pub const DEFAULT_ROLE_CLAIM_TYPE: &str = "role";

/// A single statement about a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    /// The claim type, after inbound mapping.
    pub claim_type: String,
    /// The claim value as text.
    pub value: String,
    /// The issuer this claim was validated against.
    pub issuer: String,
    /// The issuer that originally asserted the claim.
    pub original_issuer: String,
    /// Side properties, e.g. the pre-mapping short name under
    /// [`SHORT_CLAIM_TYPE_PROPERTY`].
    pub properties: HashMap<String, String>,
}

impl Claim {
    /// A claim with no side properties.
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
            issuer: String::new(),
            original_issuer: String::new(),
            properties: HashMap::new(),
        }
    }
}

/// A set of claims describing one subject, with optional delegated (actor)
/// identity.
#[derive(Debug, Clone, Default)]
pub struct ClaimsIdentity {
    /// How the subject authenticated; `None` for unauthenticated claim
    /// sets assembled locally.
    pub authentication_type: Option<String>,
    /// Claim type consulted by [`name`][Self::name].
    pub name_claim_type: String,
    /// Claim type consulted by [`roles`][Self::roles].
    pub role_claim_type: String,
    /// The claims, in token order.
    pub claims: Vec<Claim>,
    /// The delegated identity, when the token carried one.
    pub actor: Option<Box<ClaimsIdentity>>,
    /// The compact token this identity was built from, attached when the
    /// validation policy asks for a bootstrap context.
    pub bootstrap_token: Option<String>,
}

impl ClaimsIdentity {
    /// An empty identity with the default claim types.
    pub fn new() -> Self {
        Self {
            authentication_type: None,
            name_claim_type: DEFAULT_NAME_CLAIM_TYPE.to_owned(),
            role_claim_type: DEFAULT_ROLE_CLAIM_TYPE.to_owned(),
            claims: Vec::new(),
            actor: None,
            bootstrap_token: None,
        }
    }

    /// An identity carrying the given claims.
    pub fn with_claims(claims: impl IntoIterator<Item = Claim>) -> Self {
        Self {
            claims: claims.into_iter().collect(),
            ..Self::new()
        }
    }

    /// The first claim of the given type.
    pub fn find(&self, claim_type: &str) -> Option<&Claim> {
        self.claims.iter().find(|c| c.claim_type == claim_type)
    }

    /// Every claim of the given type.
    pub fn find_all<'a>(&'a self, claim_type: &'a str) -> impl Iterator<Item = &'a Claim> {
        self.claims.iter().filter(move |c| c.claim_type == claim_type)
    }

    /// The subject's name: the first claim of the name claim type.
    pub fn name(&self) -> Option<&str> {
        self.find(&self.name_claim_type).map(|c| c.value.as_str())
    }

    /// The subject's roles: every claim of the role claim type.
    pub fn roles(&self) -> Vec<&str> {
        self.find_all(&self.role_claim_type)
            .map(|c| c.value.as_str())
            .collect()
    }
}

/// The validated principal: an authenticated identity.
#[derive(Debug, Clone, Default)]
pub struct ClaimsPrincipal {
    identity: ClaimsIdentity,
}

impl ClaimsPrincipal {
    /// Wrap an identity.
    pub fn new(identity: ClaimsIdentity) -> Self {
        Self { identity }
    }

    /// The principal's identity.
    pub fn identity(&self) -> &ClaimsIdentity {
        &self.identity
    }

    /// The subject's name, per the identity's name claim type.
    pub fn name(&self) -> Option<&str> {
        self.identity.name()
    }

    /// True when the principal holds a claim of the role claim type with
    /// this value.
    pub fn is_in_role(&self, role: &str) -> bool {
        self.identity.roles().contains(&role)
    }
}

/// Map a validated token to an identity: filter, map, stamp, recurse on
/// the actor claim.
pub(crate) fn claims_identity(
    jwt: &Jwt,
    validated_issuer: &str,
    params: &ValidationParameters,
    config: &CryptoConfig,
    depth: usize,
) -> ClaimsIdentity {
    let name_claim_type = params
        .name_claim_type_retriever
        .as_ref()
        .map(|retrieve| retrieve(jwt))
        .unwrap_or_else(|| params.name_claim_type.clone());
    let role_claim_type = params
        .role_claim_type_retriever
        .as_ref()
        .map(|retrieve| retrieve(jwt))
        .unwrap_or_else(|| params.role_claim_type.clone());

    let mut identity = ClaimsIdentity {
        authentication_type: Some(params.authentication_type.clone()),
        name_claim_type,
        role_claim_type,
        claims: Vec::new(),
        actor: None,
        bootstrap_token: None,
    };

    for (short_type, value) in jwt.payload().claim_entries() {
        if config.inbound_claim_filter.contains(short_type) {
            continue;
        }
        let (claim_type, mapped) = config.resolve_claim_type(short_type);

        if claim_type == ACTOR_CLAIM_TYPE && identity.actor.is_none() {
            if depth < params.max_actor_depth {
                if let Ok(actor_jwt) = Jwt::parse(&value, params.max_token_size) {
                    let actor =
                        claims_identity(&actor_jwt, validated_issuer, params, config, depth + 1);
                    identity.actor = Some(Box::new(actor));
                    continue;
                }
            }
            // Not a parseable token (or nesting exhausted): keep the
            // literal claim below.
        }

        let mut claim = Claim {
            claim_type: claim_type.to_owned(),
            value,
            issuer: validated_issuer.to_owned(),
            original_issuer: validated_issuer.to_owned(),
            properties: HashMap::new(),
        };
        if mapped {
            claim
                .properties
                .insert(SHORT_CLAIM_TYPE_PROPERTY.to_owned(), short_type.to_owned());
        }
        identity.claims.push(claim);
    }

    if params.save_signin_token {
        identity.bootstrap_token = jwt.raw().map(|raw| raw.compact());
    }

    identity
}
