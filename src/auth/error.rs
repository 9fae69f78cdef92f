// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization errors.
//!
//! Every denial produced by the gate is one of these variants. Each carries a
//! machine-readable code, a client-facing description and an HTTP status.
//! Detail strings (fetch errors and the like) only reach the logs.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::ErrorBody;

/// Which part of the token header was unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderDefect {
    /// The unverified header has no `kid`.
    MissingKeyId,
    /// No key in the signing key set carries this `kid`.
    UnknownKeyId(String),
}

/// Authorization error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header on the request
    #[error("authorization header is missing")]
    MissingAuthorization,
    /// Header present but not `Bearer <token>`
    #[error("authorization header is malformed: {0}")]
    MalformedAuthorization(&'static str),
    /// Token header lacks a usable key identifier
    #[error("token header is invalid: {0:?}")]
    InvalidHeader(HeaderDefect),
    /// Signing keys could not be fetched
    #[error("signing key set unavailable: {0}")]
    KeySetUnavailable(String),
    /// `exp` is in the past
    #[error("token has expired")]
    TokenExpired,
    /// Audience or issuer mismatch
    #[error("token audience or issuer is invalid")]
    InvalidClaims,
    /// Any other decode or signature failure
    #[error("token is malformed")]
    MalformedToken,
    /// Verified token carries no `permissions` claim
    #[error("permissions claim is missing")]
    PermissionsClaimMissing,
    /// Required permission not granted
    #[error("permission not granted")]
    Forbidden,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization => "authorization_header_missing",
            AuthError::MalformedAuthorization(_) => "authorization_header_malformed",
            AuthError::InvalidHeader(_) => "invalid_header",
            AuthError::KeySetUnavailable(_) => "key_set_unavailable",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims => "invalid_claims",
            AuthError::MalformedToken => "malformed_token",
            AuthError::PermissionsClaimMissing => "permissions_missing",
            AuthError::Forbidden => "forbidden",
        }
    }

    /// Client-facing description. Never includes internal detail.
    pub fn description(&self) -> &'static str {
        match self {
            AuthError::MissingAuthorization => "Authorization header is expected.",
            AuthError::MalformedAuthorization(reason) => *reason,
            AuthError::InvalidHeader(HeaderDefect::MissingKeyId) => "Authorization malformed.",
            AuthError::InvalidHeader(HeaderDefect::UnknownKeyId(_)) => {
                "Unable to find the appropriate key."
            }
            AuthError::KeySetUnavailable(_) => "Unable to fetch signing keys.",
            AuthError::TokenExpired => "Token expired.",
            AuthError::InvalidClaims => {
                "Incorrect claims. Please, check the audience and issuer."
            }
            AuthError::MalformedToken => "Unable to parse authentication token.",
            AuthError::PermissionsClaimMissing => "Permissions not included in token.",
            AuthError::Forbidden => "Permission not found.",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthorization
            | AuthError::MalformedAuthorization(_)
            | AuthError::InvalidHeader(HeaderDefect::MissingKeyId)
            | AuthError::TokenExpired
            | AuthError::InvalidClaims => StatusCode::UNAUTHORIZED,
            AuthError::InvalidHeader(HeaderDefect::UnknownKeyId(_))
            | AuthError::MalformedToken
            | AuthError::PermissionsClaimMissing => StatusCode::BAD_REQUEST,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::KeySetUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Whether a caller may retry later with the same credential.
    ///
    /// Only a key set outage is transient; every other variant is a defect
    /// of the credential itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::KeySetUnavailable(_))
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorBody::new(status, self.description()));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(error: AuthError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body_bytes).unwrap())
    }

    #[tokio::test]
    async fn missing_auth_returns_401_envelope() {
        let (status, body) = body_of(AuthError::MissingAuthorization).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], 401);
        assert_eq!(body["message"], "Authorization header is expected.");
    }

    #[tokio::test]
    async fn forbidden_returns_403() {
        let (status, body) = body_of(AuthError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], 403);
    }

    #[tokio::test]
    async fn key_set_detail_is_not_leaked() {
        let error = AuthError::KeySetUnavailable("connection refused (10.0.0.7:443)".into());
        assert!(error.to_string().contains("connection refused"));

        let (status, body) = body_of(error).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["message"], "Unable to fetch signing keys.");
    }

    #[test]
    fn invalid_header_status_depends_on_defect() {
        assert_eq!(
            AuthError::InvalidHeader(HeaderDefect::MissingKeyId).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidHeader(HeaderDefect::UnknownKeyId("k9".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn only_key_set_outage_is_retryable() {
        assert!(AuthError::KeySetUnavailable("timeout".into()).is_retryable());
        assert!(!AuthError::TokenExpired.is_retryable());
        assert!(!AuthError::Forbidden.is_retryable());
        assert!(!AuthError::MalformedToken.is_retryable());
    }
}
