// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Test fixtures: RSA keys from `testdata/`, token minting and key sources.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderValue, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use url::Url;

use super::jwks::{KeySetCache, KeySource};
use super::permissions::PermissionTable;
use super::{AuthError, AuthorizationGate, TokenVerifier};

pub const ISSUER: &str = "https://casting.test.auth0.com/";
pub const AUDIENCE: &str = "casting";
pub const SUBJECT: &str = "auth0|executive-producer";
pub const PRIMARY_KID: &str = "casting-primary";
pub const ROTATED_KID: &str = "casting-rotated";

const PRIMARY_PEM: &[u8] = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/primary.pem"));
const ROTATED_PEM: &[u8] = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/rotated.pem"));

const PRIMARY_N: &str = "qshsaDnyRWverkF88yhyDMrUuJw7oR_0RP0AXnr0tt-pjpfh3VA4GQmLkNv3eMYKVnH9R25fDoNXZn91OnhcWryhheSBiTJDqZeAuT1BEC3HtwyfgYXGUWHZsut3OMPGytPvbKrB1g3MrqlV7f-a1XKzFqs3skiaSGZPznOXavkfucUi14AhXG20Au9H0YBh4SnMWDDJ8IHstcgtsGufE-IT85bRw2noI8IUlt8KCuX0WsKjR7otQGeycVs1XU7Q1gxM5VKt07POPZo0Bk4M91eAsTO2qDZSBg5b87Vvgo_PYzDTiX0IYLEOHWlPoCgDh1QLvWwzP4FbF4m_oYSshQ";
const ROTATED_N: &str = "k_4hWpejbxTCMHqpIMQraCBlJe8bEtTF7tEzMshaEfRiDY9wFukfGL0iyi0FVfFvddAWyw7a1VVN0JGtaByt15Ij2EzyHzF3OwvlwTWoVqZoEXYOpeVc8AVrncjrfWY5SSb0GyeIykEnJNHLYK46u3F9EQ8DAtBCQiT9OtV30ixYdHweWZayB9C6pSwUty0tIOfl3nzZnsBdQrBM0KG9dV6UWlTFTFh4SxOiO6gPJdcO7MDCfaOmb4TzJOxw_xxmJy7Ue4rPlQpBKhF0NQIkO77-eozFbGSwGfsVaytq9MuaQN5nzv6oducz21hF47fQynnq7M00DUbSCmd9rc3JaQ";
const EXPONENT: &str = "AQAB";

#[derive(Debug, Clone, Copy)]
pub enum TestKey {
    Primary,
    Rotated,
}

fn rsa_jwk(kid: &str, n: &str) -> Jwk {
    serde_json::from_value(json!({
        "kty": "RSA",
        "kid": kid,
        "use": "sig",
        "alg": "RS256",
        "n": n,
        "e": EXPONENT,
    }))
    .expect("valid RSA JWK")
}

pub fn primary_jwk() -> Jwk {
    rsa_jwk(PRIMARY_KID, PRIMARY_N)
}

pub fn rotated_jwk() -> Jwk {
    rsa_jwk(ROTATED_KID, ROTATED_N)
}

pub fn jwk_set(keys: &[Jwk]) -> JwkSet {
    JwkSet {
        keys: keys.to_vec(),
    }
}

/// Valid claims for the test audience, expiring in an hour.
pub fn claims_with(permissions: &[&str]) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "sub": SUBJECT,
        "iss": ISSUER,
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 3600,
        "permissions": permissions,
    })
}

pub fn sign(key: TestKey, kid: Option<&str>, claims: &Value) -> String {
    let pem = match key {
        TestKey::Primary => PRIMARY_PEM,
        TestKey::Rotated => ROTATED_PEM,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(pem).expect("valid RSA PEM");
    encode(&header, claims, &key).expect("token signs")
}

/// Primary-key token carrying `permissions`.
pub fn token_with(permissions: &[&str]) -> String {
    sign(TestKey::Primary, Some(PRIMARY_KID), &claims_with(permissions))
}

pub fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("header value"),
    );
    headers
}

pub fn verifier() -> TokenVerifier {
    TokenVerifier::new(ISSUER, AUDIENCE)
}

/// Gate over `source` that refetches on every `kid` miss.
pub fn gate_over(source: &Arc<StaticKeySource>) -> AuthorizationGate {
    let keys = KeySetCache::new(source.clone()).with_min_refresh_interval(Duration::ZERO);
    AuthorizationGate::new(Arc::new(keys), verifier(), PermissionTable::default())
}

/// In-memory key source that counts fetches.
pub struct StaticKeySource {
    published: Mutex<Option<JwkSet>>,
    fetches: AtomicUsize,
    delay_ms: AtomicU64,
}

impl StaticKeySource {
    pub fn new(set: JwkSet) -> Arc<Self> {
        Arc::new(Self {
            published: Mutex::new(Some(set)),
            fetches: AtomicUsize::new(0),
            delay_ms: AtomicU64::new(0),
        })
    }

    /// A source whose endpoint is down.
    pub fn failing() -> Arc<Self> {
        let source = Self::new(JwkSet { keys: Vec::new() });
        source.go_offline();
        source
    }

    pub fn with_delay(self: Arc<Self>, delay: Duration) -> Arc<Self> {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
        self
    }

    pub fn publish(&self, set: JwkSet) {
        *self.published.lock().unwrap() = Some(set);
    }

    pub fn go_offline(&self) {
        *self.published.lock().unwrap() = None;
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.published
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AuthError::KeySetUnavailable("source offline".to_string()))
    }

    fn location(&self) -> &str {
        "memory://jwks"
    }
}

/// Local HTTP server standing in for the discovery endpoint.
pub struct JwksServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl JwksServer {
    async fn start(app: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, task }
    }

    pub async fn serving(set: JwkSet) -> Self {
        let app = Router::new().route(
            "/.well-known/jwks.json",
            get(move || {
                let set = set.clone();
                async move { Json(set) }
            }),
        );
        Self::start(app).await
    }

    pub async fn failing() -> Self {
        let app = Router::new().route(
            "/.well-known/jwks.json",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
        );
        Self::start(app).await
    }

    pub async fn garbage() -> Self {
        let app = Router::new().route(
            "/.well-known/jwks.json",
            get(|| async { "<html>definitely not a key set</html>" }),
        );
        Self::start(app).await
    }

    pub fn url(&self) -> Url {
        Url::parse(&format!("http://{}/.well-known/jwks.json", self.addr)).unwrap()
    }
}

impl Drop for JwksServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// URL of a local port nothing listens on.
pub async fn unreachable_url() -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}/.well-known/jwks.json")).unwrap()
}
