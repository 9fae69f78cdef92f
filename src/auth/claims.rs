// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decoded token claims and the read-only context handed to handlers.

use std::collections::BTreeSet;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// The `aud` claim, which Auth0 issues either as a string or as a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    Single(String),
    Multiple(Vec<String>),
}

impl Default for Audience {
    fn default() -> Self {
        Audience::Multiple(Vec::new())
    }
}

impl Audience {
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Audience::Single(aud) => aud == audience,
            Audience::Multiple(auds) => auds.iter().any(|aud| aud == audience),
        }
    }
}

/// Claims of a verified access token.
///
/// Only `TokenVerifier::verify` produces these from a credential, after
/// signature, expiry, audience and issuer all pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user or client ID)
    pub sub: String,

    /// Issuer (`https://{domain}/`). Defaulted so that a missing value is
    /// reported by claim validation rather than as a parse failure.
    #[serde(default)]
    pub iss: String,

    /// Audience
    #[serde(default)]
    pub aud: Audience,

    /// Expiration timestamp
    pub exp: i64,

    /// Issued at timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Authorized party
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azp: Option<String>,

    /// Space separated OAuth scopes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// RBAC permissions. `None` when the claim is absent, which is a
    /// different failure from an empty set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<BTreeSet<String>>,
}

/// Verified claims as seen by a protected operation.
///
/// Cheap to clone; there is no way to mutate the claims through it.
#[derive(Debug, Clone)]
pub struct AuthContext {
    claims: Arc<Claims>,
}

impl AuthContext {
    pub(crate) fn new(claims: Claims) -> Self {
        Self {
            claims: Arc::new(claims),
        }
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    /// Permissions granted to the caller, sorted.
    pub fn permissions(&self) -> impl Iterator<Item = &str> {
        self.claims
            .permissions
            .iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.claims
            .permissions
            .as_ref()
            .is_some_and(|set| set.contains(permission))
    }
}

impl Deref for AuthContext {
    type Target = Claims;

    fn deref(&self) -> &Claims {
        &self.claims
    }
}
