// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::time::Duration;

use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use casting_gate::api::router;
use casting_gate::auth::{AuthorizationGate, KeySetRefresher};
use casting_gate::config::{AuthSettings, LogFormat, ServerSettings, DEFAULT_LOG_FILTER};
use casting_gate::state::AppState;
use casting_gate::store::InMemoryStore;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Time allowed for in-flight requests after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let server = ServerSettings::from_env()?;
    init_tracing(server.log_format);

    // Install the ring crypto provider for rustls (before any TLS use)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "failed to install rustls crypto provider")?;

    let auth = AuthSettings::from_env()?;
    info!(
        issuer = %auth.issuer,
        audience = %auth.audience,
        jwks_url = %auth.jwks_url,
        "Authorization configured"
    );

    let gate = AuthorizationGate::from_settings(&auth)?;
    for (operation, permission) in gate.permissions().entries() {
        info!(%operation, permission, "Route permission");
    }

    let shutdown = CancellationToken::new();
    let refresher = tokio::spawn(KeySetRefresher::new(gate.keys().clone()).run(shutdown.clone()));

    let state = AppState::new(gate, InMemoryStore::new());
    let app = router(state);

    let handle = Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutdown signal received");
            shutdown.cancel();
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    match &server.tls {
        Some((cert, key)) => {
            let tls = RustlsConfig::from_pem_file(cert, key).await?;
            info!(addr = %server.addr, "Casting gate listening on https (docs at /docs)");
            axum_server::bind_rustls(server.addr, tls)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            info!(addr = %server.addr, "Casting gate listening on http (docs at /docs)");
            axum_server::bind(server.addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    shutdown.cancel();
    refresher.await?;
    info!("Server stopped");
    Ok(())
}
