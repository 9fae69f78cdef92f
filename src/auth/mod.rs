// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authorization Module
//!
//! Auth0 bearer-token authorization for the Casting API.
//!
//! ## Flow
//!
//! 1. Client sends `Authorization: Bearer <Auth0 access token>`
//! 2. Server:
//!    - Extracts the bearer credential from the header
//!    - Reads `kid` from the unverified token header
//!    - Resolves the signing key from the cached JWKS (refetching on miss)
//!    - Verifies signature, expiry, issuer and audience
//!    - Checks the `permissions` claim against the route's requirement
//! 3. On success the handler receives the verified claims; on failure it
//!    never runs and the caller gets a 401/403 envelope
//!
//! ## Security
//!
//! - JWKS is fetched via HTTPS and cached with a TTL
//! - Only RSA algorithms from the configured allow-list are accepted
//! - Required permissions live in one table ([`PermissionTable`])

pub mod claims;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod header;
pub mod jwks;
pub mod middleware;
pub mod permissions;
pub mod refresher;
pub mod verifier;

#[cfg(test)]
pub(crate) mod testing;

pub use claims::{AuthContext, Claims};
pub use error::AuthError;
pub use extractor::Authorized;
pub use gate::{AuthorizationGate, Decision};
pub use jwks::{KeySetCache, SigningKeySet};
pub use middleware::{require_permission, RouteGuard};
pub use permissions::{Operation, PermissionTable};
pub use refresher::KeySetRefresher;
pub use verifier::TokenVerifier;
