// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signature and standard-claim verification of bearer tokens.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};

use super::error::{AuthError, HeaderDefect};
use super::jwks::SigningKeySet;
use super::Claims;

/// Verifies tokens issued by one identity provider for one API.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    issuer: String,
    audience: String,
    algorithms: Vec<Algorithm>,
    leeway: u64,
}

impl TokenVerifier {
    /// Create a verifier accepting `RS256` tokens for `audience` from `issuer`.
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            algorithms: vec![Algorithm::RS256],
            leeway: 0,
        }
    }

    /// Replace the algorithm allow-list. An empty list is ignored.
    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        if !algorithms.is_empty() {
            self.algorithms = algorithms;
        }
        self
    }

    /// Seconds of clock skew tolerated on `exp`.
    pub fn with_leeway(mut self, leeway: u64) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn algorithms(&self) -> &[Algorithm] {
        &self.algorithms
    }

    /// Read `kid` from the token header without checking the signature.
    pub fn key_id(credential: &str) -> Result<String, AuthError> {
        let header = decode_header(credential).map_err(|_| AuthError::MalformedToken)?;
        header
            .kid
            .ok_or(AuthError::InvalidHeader(HeaderDefect::MissingKeyId))
    }

    /// Verify `credential` against `keys` and return its claims.
    pub fn verify(&self, credential: &str, keys: &SigningKeySet) -> Result<Claims, AuthError> {
        let kid = Self::key_id(credential)?;
        let jwk = keys
            .find(&kid)
            .ok_or_else(|| AuthError::InvalidHeader(HeaderDefect::UnknownKeyId(kid.clone())))?;
        let decoding_key = rsa_decoding_key(jwk)?;

        let token_data = decode::<Claims>(credential, &decoding_key, &self.validation())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer => AuthError::InvalidClaims,
                ErrorKind::MissingRequiredClaim(claim) if claim == "aud" || claim == "iss" => {
                    AuthError::InvalidClaims
                }
                _ => AuthError::MalformedToken,
            })?;

        Ok(token_data.claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithms[0]);
        validation.algorithms = self.algorithms.clone();
        validation.leeway = self.leeway;
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        validation.set_audience(&[&self.audience]);
        validation.set_issuer(&[&self.issuer]);
        validation
    }
}

/// Convert an RSA JWK to a DecodingKey. Other key types cannot verify the
/// accepted algorithms.
fn rsa_decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            DecodingKey::from_rsa_components(&rsa.n, &rsa.e).map_err(|_| AuthError::MalformedToken)
        }
        _ => Err(AuthError::MalformedToken),
    }
}
