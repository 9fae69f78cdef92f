// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer credential extraction from request headers.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::AuthError;

/// Pull the raw bearer token out of the `Authorization` header.
///
/// The value must be exactly `<scheme> <token>` (one space between the
/// two) where the scheme is `bearer` in any case.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let mut values = headers.get_all(AUTHORIZATION).iter();
    let value = values.next().ok_or(AuthError::MissingAuthorization)?;
    if values.next().is_some() {
        return Err(AuthError::MalformedAuthorization(
            "Only one Authorization header is allowed.",
        ));
    }

    let value = value.to_str().map_err(|_| {
        AuthError::MalformedAuthorization("Authorization header must be bearer token.")
    })?;

    // single spaces only: a doubled space, tab or leading space is a third part
    let mut parts = value.split(' ');
    let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AuthError::MalformedAuthorization(
            "Authorization header must be bearer token.",
        ));
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedAuthorization(
            "Authorization header must start with \"Bearer\".",
        ));
    }

    if token.is_empty() {
        return Err(AuthError::MalformedAuthorization(
            "Authorization header must be bearer token.",
        ));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn missing_header_is_rejected() {
        assert_eq!(
            extract_bearer(&HeaderMap::new()),
            Err(AuthError::MissingAuthorization)
        );
    }

    #[test]
    fn bearer_token_is_returned() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer(&headers), Ok("abc.def.ghi"));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert_eq!(extract_bearer(&headers_with("bearer tok")), Ok("tok"));
        assert_eq!(extract_bearer(&headers_with("BEARER tok")), Ok("tok"));
    }

    #[test]
    fn wrong_shapes_are_malformed() {
        for value in [
            "Bearer",
            "Bearer ",
            "Bearer a b",
            "Basic dXNlcjpwYXNz",
            "Token abc",
            "abc.def.ghi",
            "",
            "Bearer  tok",
            "Bearer\ttok",
            " Bearer tok",
        ] {
            let headers = headers_with(value);
            let result = extract_bearer(&headers);
            assert!(
                matches!(result, Err(AuthError::MalformedAuthorization(_))),
                "{value:?} should be malformed, got {result:?}"
            );
        }
    }

    #[test]
    fn duplicate_headers_are_malformed() {
        let mut headers = headers_with("Bearer one");
        headers.append(AUTHORIZATION, HeaderValue::from_static("Bearer two"));
        assert!(matches!(
            extract_bearer(&headers),
            Err(AuthError::MalformedAuthorization(_))
        ));
    }

    #[test]
    fn non_ascii_value_is_malformed() {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfftoken").unwrap(),
        );
        assert!(matches!(
            extract_bearer(&headers),
            Err(AuthError::MalformedAuthorization(_))
        ));
    }
}
