// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The authorization gate: one decision per protected call.
//!
//! ```text
//! START → HEADER_EXTRACTED → KEY_RESOLVED → SIGNATURE_VERIFIED
//!       → CLAIMS_VALIDATED → PERMISSION_CHECKED → ALLOWED
//! ```
//!
//! Any step may end in `DENIED(reason)`. Nothing is retried.

use std::fmt;
use std::sync::Arc;

use axum::http::HeaderMap;
use tracing::{debug, info};

use super::header::extract_bearer;
use super::jwks::{HttpKeySource, KeySetCache};
use super::permissions::{self, Operation, PermissionTable};
use super::{AuthContext, AuthError, TokenVerifier};
use crate::config::AuthSettings;

/// Outcome of [`AuthorizationGate::authorize`].
#[derive(Debug, Clone)]
#[must_use]
pub enum Decision {
    Allowed(AuthContext),
    Denied(AuthError),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed(_))
    }

    pub fn into_result(self) -> Result<AuthContext, AuthError> {
        match self {
            Decision::Allowed(context) => Ok(context),
            Decision::Denied(error) => Err(error),
        }
    }
}

/// Last state a request reached before being denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    HeaderExtracted,
    KeyResolved,
    SignatureVerified,
    ClaimsValidated,
}

impl Stage {
    fn reached_before(error: &AuthError) -> Stage {
        match error {
            AuthError::MissingAuthorization | AuthError::MalformedAuthorization(_) => Stage::Start,
            AuthError::InvalidHeader(_) | AuthError::KeySetUnavailable(_) => {
                Stage::HeaderExtracted
            }
            AuthError::MalformedToken => Stage::KeyResolved,
            AuthError::TokenExpired | AuthError::InvalidClaims => Stage::SignatureVerified,
            AuthError::PermissionsClaimMissing | AuthError::Forbidden => Stage::ClaimsValidated,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Start => "start",
            Stage::HeaderExtracted => "header_extracted",
            Stage::KeyResolved => "key_resolved",
            Stage::SignatureVerified => "signature_verified",
            Stage::ClaimsValidated => "claims_validated",
        })
    }
}

/// Composes extraction, key resolution, verification and the permission
/// check. Shared by all requests.
pub struct AuthorizationGate {
    keys: Arc<KeySetCache>,
    verifier: TokenVerifier,
    permissions: PermissionTable,
}

impl AuthorizationGate {
    pub fn new(keys: Arc<KeySetCache>, verifier: TokenVerifier, permissions: PermissionTable) -> Self {
        Self {
            keys,
            verifier,
            permissions,
        }
    }

    /// Build the production gate: HTTP key source, cache and verifier as
    /// configured.
    pub fn from_settings(settings: &AuthSettings) -> Result<Self, AuthError> {
        let source = HttpKeySource::new(settings.jwks_url.clone(), settings.fetch_timeout)?;
        let keys = KeySetCache::new(Arc::new(source))
            .with_cache_ttl(settings.cache_ttl)
            .with_fetch_timeout(settings.fetch_timeout)
            .with_min_refresh_interval(settings.min_refresh_interval);
        let verifier = TokenVerifier::new(&settings.issuer, &settings.audience)
            .with_algorithms(settings.algorithms.clone())
            .with_leeway(settings.leeway);

        Ok(Self::new(
            Arc::new(keys),
            verifier,
            settings.permission_table(),
        ))
    }

    pub fn keys(&self) -> &Arc<KeySetCache> {
        &self.keys
    }

    pub fn permissions(&self) -> &PermissionTable {
        &self.permissions
    }

    /// Decide whether the caller behind `headers` may perform `operation`.
    pub async fn authorize_operation(&self, operation: Operation, headers: &HeaderMap) -> Decision {
        let required = self.permissions.required(operation);
        self.decide(operation.name(), required, headers).await
    }

    /// Decide whether the caller behind `headers` holds `required`.
    pub async fn authorize(&self, required: &str, headers: &HeaderMap) -> Decision {
        self.decide("", required, headers).await
    }

    async fn decide(&self, operation: &str, required: &str, headers: &HeaderMap) -> Decision {
        match self.evaluate(required, headers).await {
            Ok(context) => {
                debug!(operation, sub = context.subject(), "Request authorized");
                Decision::Allowed(context)
            }
            Err(error) => {
                info!(
                    operation,
                    required,
                    stage = %Stage::reached_before(&error),
                    code = error.error_code(),
                    status = error.status_code().as_u16(),
                    detail = %error,
                    "Request denied"
                );
                Decision::Denied(error)
            }
        }
    }

    async fn evaluate(&self, required: &str, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let credential = extract_bearer(headers)?;
        let kid = TokenVerifier::key_id(credential)?;
        let keys = self.keys.keys_for(&kid).await?;
        let claims = self.verifier.verify(credential, &keys)?;
        permissions::check(required, &claims)?;
        Ok(AuthContext::new(claims))
    }
}
