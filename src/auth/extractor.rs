// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authorization context.
//!
//! Use the `Authorized` extractor in handlers behind a `require_permission`
//! route guard:
//!
//! ```rust,ignore
//! async fn my_handler(Authorized(context): Authorized) -> impl IntoResponse {
//!     // context.subject(), context.permissions()
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::error;

use super::{AuthContext, AuthError};

/// Verified caller of a guarded route.
pub struct Authorized(pub AuthContext);

impl<S> FromRequestParts<S> for Authorized
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<AuthContext>() {
            Some(context) => Ok(Authorized(context.clone())),
            None => {
                // route registered without a guard: fail closed
                error!(path = %parts.uri.path(), "Authorized extractor used on unguarded route");
                Err(AuthError::MissingAuthorization)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use serde_json::json;

    fn parts() -> Parts {
        Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn reads_context_from_extensions() {
        let mut parts = parts();
        let claims = serde_json::from_value(json!({
            "sub": "auth0|from-guard",
            "iss": "https://casting.test.auth0.com/",
            "aud": "casting",
            "exp": 1700003600,
            "permissions": []
        }))
        .unwrap();
        parts.extensions.insert(AuthContext::new(claims));

        let Authorized(context) = Authorized::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(context.subject(), "auth0|from-guard");
    }

    #[tokio::test]
    async fn unguarded_route_fails_closed() {
        let mut parts = parts();
        let result = Authorized::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::MissingAuthorization)));
    }
}
