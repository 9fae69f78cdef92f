// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! typed settings loaded from them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH0_DOMAIN` | Auth0 tenant domain | Required |
//! | `API_AUDIENCE` | Expected JWT audience claim | Required |
//! | `AUTH_ALGORITHMS` | Accepted signing algorithms (comma separated) | `RS256` |
//! | `JWKS_URL` | JWKS endpoint override | `https://{domain}/.well-known/jwks.json` |
//! | `JWKS_CACHE_TTL_SECS` | Key set cache TTL | `300` |
//! | `JWKS_FETCH_TIMEOUT_SECS` | Key set fetch timeout | `3` |
//! | `JWKS_MIN_REFRESH_SECS` | Minimum key set age before a `kid` miss refetches | `10` |
//! | `CLOCK_SKEW_LEEWAY_SECS` | Tolerance on `exp` | `0` |
//! | `PERMISSION_OVERRIDES` | `operation=permission` pairs (comma separated) | None |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | Serve HTTPS with this PEM pair | HTTP |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use url::Url;

use crate::auth::jwks::{DEFAULT_CACHE_TTL, DEFAULT_FETCH_TIMEOUT, DEFAULT_MIN_REFRESH_INTERVAL};
use crate::auth::{Operation, PermissionTable};

pub const AUTH0_DOMAIN_ENV: &str = "AUTH0_DOMAIN";
pub const API_AUDIENCE_ENV: &str = "API_AUDIENCE";
pub const AUTH_ALGORITHMS_ENV: &str = "AUTH_ALGORITHMS";
pub const JWKS_URL_ENV: &str = "JWKS_URL";
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECS";
pub const JWKS_FETCH_TIMEOUT_ENV: &str = "JWKS_FETCH_TIMEOUT_SECS";
pub const JWKS_MIN_REFRESH_ENV: &str = "JWKS_MIN_REFRESH_SECS";
pub const CLOCK_SKEW_LEEWAY_ENV: &str = "CLOCK_SKEW_LEEWAY_SECS";
pub const PERMISSION_OVERRIDES_ENV: &str = "PERMISSION_OVERRIDES";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

fn invalid(var: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.into(),
    }
}

/// Token verification settings.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Auth0 tenant domain, e.g. `casting.eu.auth0.com`
    pub domain: String,
    /// Expected `aud`
    pub audience: String,
    /// Expected `iss`: `https://{domain}/`
    pub issuer: String,
    pub jwks_url: Url,
    pub algorithms: Vec<Algorithm>,
    pub cache_ttl: Duration,
    pub fetch_timeout: Duration,
    pub min_refresh_interval: Duration,
    /// Seconds
    pub leeway: u64,
    pub permission_overrides: Vec<(Operation, String)>,
}

impl AuthSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let lookup = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let domain = lookup(AUTH0_DOMAIN_ENV).ok_or(ConfigError::Missing(AUTH0_DOMAIN_ENV))?;
        let domain = normalize_domain(&domain)?;
        let audience = lookup(API_AUDIENCE_ENV).ok_or(ConfigError::Missing(API_AUDIENCE_ENV))?;
        let issuer = format!("https://{domain}/");

        let jwks_url = match lookup(JWKS_URL_ENV) {
            Some(url) => parse_jwks_url(&url)?,
            None => Url::parse(&issuer)
                .and_then(|base| base.join(".well-known/jwks.json"))
                .map_err(|e| invalid(AUTH0_DOMAIN_ENV, e.to_string()))?,
        };

        let algorithms = match lookup(AUTH_ALGORITHMS_ENV) {
            Some(list) => parse_algorithms(&list)?,
            None => vec![Algorithm::RS256],
        };

        let permission_overrides = match lookup(PERMISSION_OVERRIDES_ENV) {
            Some(list) => parse_overrides(&list)?,
            None => Vec::new(),
        };

        Ok(Self {
            domain,
            audience: audience.trim().to_string(),
            issuer,
            jwks_url,
            algorithms,
            cache_ttl: seconds(&lookup, JWKS_CACHE_TTL_ENV, DEFAULT_CACHE_TTL)?,
            fetch_timeout: seconds(&lookup, JWKS_FETCH_TIMEOUT_ENV, DEFAULT_FETCH_TIMEOUT)?,
            min_refresh_interval: seconds(
                &lookup,
                JWKS_MIN_REFRESH_ENV,
                DEFAULT_MIN_REFRESH_INTERVAL,
            )?,
            leeway: seconds(&lookup, CLOCK_SKEW_LEEWAY_ENV, Duration::ZERO)?.as_secs(),
            permission_overrides,
        })
    }

    /// Default catalog with configured overrides applied.
    pub fn permission_table(&self) -> PermissionTable {
        self.permission_overrides
            .iter()
            .fold(PermissionTable::default(), |table, (operation, permission)| {
                table.require(*operation, permission.clone())
            })
    }
}

/// Accept `tenant.auth0.com`, `https://tenant.auth0.com` or `https://tenant.auth0.com/`.
fn normalize_domain(raw: &str) -> Result<String, ConfigError> {
    let domain = raw.trim();
    let domain = domain.strip_prefix("https://").unwrap_or(domain);
    let domain = domain.trim_end_matches('/');

    if domain.is_empty() || domain.contains(['/', ' ', '?', '#']) || domain.contains("://") {
        return Err(invalid(AUTH0_DOMAIN_ENV, format!("`{raw}` is not a bare domain")));
    }
    Ok(domain.to_string())
}

/// HTTPS only, except plain HTTP to the loopback host.
fn parse_jwks_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| invalid(JWKS_URL_ENV, e.to_string()))?;
    match (url.scheme(), url.host_str()) {
        ("https", Some(_)) => Ok(url),
        ("http", Some("localhost" | "127.0.0.1" | "[::1]")) => Ok(url),
        _ => Err(invalid(
            JWKS_URL_ENV,
            "must use https (http is only allowed for localhost)",
        )),
    }
}

/// RSA family only; the key set carries RSA keys.
fn parse_algorithms(list: &str) -> Result<Vec<Algorithm>, ConfigError> {
    let mut algorithms = Vec::new();
    for name in list.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let algorithm = Algorithm::from_str(name)
            .map_err(|_| invalid(AUTH_ALGORITHMS_ENV, format!("unknown algorithm `{name}`")))?;
        if !matches!(
            algorithm,
            Algorithm::RS256
                | Algorithm::RS384
                | Algorithm::RS512
                | Algorithm::PS256
                | Algorithm::PS384
                | Algorithm::PS512
        ) {
            return Err(invalid(
                AUTH_ALGORITHMS_ENV,
                format!("`{name}` is not an RSA algorithm"),
            ));
        }
        if !algorithms.contains(&algorithm) {
            algorithms.push(algorithm);
        }
    }
    if algorithms.is_empty() {
        return Err(invalid(AUTH_ALGORITHMS_ENV, "no algorithms listed"));
    }
    Ok(algorithms)
}

fn parse_overrides(list: &str) -> Result<Vec<(Operation, String)>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (operation, permission) = entry.split_once('=').ok_or_else(|| {
                invalid(
                    PERMISSION_OVERRIDES_ENV,
                    format!("`{entry}` is not operation=permission"),
                )
            })?;
            let operation = operation
                .trim()
                .parse::<Operation>()
                .map_err(|e| invalid(PERMISSION_OVERRIDES_ENV, e.to_string()))?;
            Ok((operation, permission.trim().to_string()))
        })
        .collect()
}

fn seconds(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| invalid(var, format!("`{value}` is not a whole number of seconds"))),
        None => Ok(default),
    }
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// HTTP listener settings.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub addr: SocketAddr,
    /// Certificate and key PEM paths
    pub tls: Option<(PathBuf, PathBuf)>,
    pub log_format: LogFormat,
}

impl ServerSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup(HOST_ENV).unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup(PORT_ENV) {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .map_err(|_| invalid(PORT_ENV, format!("`{port}` is not a port number")))?,
            None => 8080,
        };
        let addr: SocketAddr = format!("{host}:{port}")
            .parse()
            .map_err(|_| invalid(HOST_ENV, format!("`{host}` is not an IP address")))?;

        let tls = match (lookup(TLS_CERT_PATH_ENV), lookup(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some((PathBuf::from(cert), PathBuf::from(key))),
            (None, None) => None,
            _ => {
                return Err(invalid(
                    TLS_CERT_PATH_ENV,
                    "TLS_CERT_PATH and TLS_KEY_PATH must be set together",
                ))
            }
        };

        let log_format = match lookup(LOG_FORMAT_ENV).as_deref().map(str::trim) {
            Some("json") => LogFormat::Json,
            Some("pretty") | None => LogFormat::Pretty,
            Some(other) => return Err(invalid(LOG_FORMAT_ENV, format!("unknown format `{other}`"))),
        };

        Ok(Self {
            addr,
            tls,
            log_format,
        })
    }
}
