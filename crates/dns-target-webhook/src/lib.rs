pub mod admission_request;
pub mod admission_response;
pub mod api;
mod certs;
pub mod cli;
pub mod config;
pub mod errors;
pub mod mutation;
pub mod tracing;

#[cfg(test)]
mod test_utils;

use ::tracing::info;
use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tower_http::trace::TraceLayer;

use crate::api::{
    handlers::{healthz_handler, mutate_handler},
    state::ApiServerState,
};
use crate::config::Config;
use crate::mutation::MutationEngine;

/// Time given to in-flight admission reviews once a shutdown is requested
const GRACEFUL_SHUTDOWN_PERIOD: Duration = Duration::from_secs(10);

pub struct WebhookServer {
    router: Router,
    tls_config: RustlsConfig,
    addr: SocketAddr,
}

impl WebhookServer {
    pub async fn new_from_config(config: Config) -> Result<Self> {
        let engine = MutationEngine::new(config.target);
        let router = router(engine);

        let tls_config =
            certs::create_tls_config(config.namespace.as_deref(), &config.tls_secret).await?;

        Ok(Self {
            router,
            tls_config,
            addr: config.addr,
        })
    }

    pub async fn run(self) -> Result<()> {
        let handle = Handle::new();
        tokio::spawn(shutdown_on_signal(handle.clone()));

        info!(address = self.addr.to_string().as_str(), "started HTTPS server");
        axum_server::bind_rustls(self.addr, self.tls_config)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;
        info!("HTTPS server stopped");

        Ok(())
    }
}

/// Build the router exposing the admission endpoint, backed by the given engine.
pub fn router(engine: MutationEngine) -> Router {
    let state = Arc::new(ApiServerState { engine });

    Router::new()
        .route("/webhook", post(mutate_handler))
        .route("/healthz", get(healthz_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn shutdown_on_signal(handle: Handle) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            ::tracing::error!(error = %e, "cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                ::tracing::error!(error = %e, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down");
    handle.graceful_shutdown(Some(GRACEFUL_SHUTDOWN_PERIOD));
}
