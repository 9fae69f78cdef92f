// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Caller profile endpoint.

use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{AuthContext, Authorized};
use crate::error::ErrorBody;

/// Response for GET /me
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub success: bool,
    /// Token subject (Auth0 user id)
    pub subject: String,
    /// Granted permissions, sorted
    pub permissions: Vec<String>,
}

impl From<&AuthContext> for ProfileResponse {
    fn from(context: &AuthContext) -> Self {
        Self {
            success: true,
            subject: context.subject().to_string(),
            permissions: context.permissions().map(str::to_string).collect(),
        }
    }
}

/// Identity and permissions carried by the caller's token.
///
/// Requires a valid token only; no permission is checked.
#[utoipa::path(
    get,
    path = "/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
    )
)]
pub async fn get_profile(Authorized(context): Authorized) -> Json<ProfileResponse> {
    Json(ProfileResponse::from(&context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing;
    use crate::auth::Claims;

    #[test]
    fn profile_lists_permissions_in_order() {
        let claims: Claims =
            serde_json::from_value(testing::claims_with(&["post:movies", "get:actors"])).unwrap();
        let response = ProfileResponse::from(&AuthContext::new(claims));
        assert!(response.success);
        assert_eq!(response.subject, testing::SUBJECT);
        assert_eq!(response.permissions, vec!["get:actors", "post:movies"]);
    }
}
