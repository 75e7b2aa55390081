//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, accounting)
//! - Bind server to listener and shut down gracefully

use std::time::Duration;

use axum::{body::Body, middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::GatewayConfig;
use crate::http::{handlers, request};
use crate::lookup::{LookupGateway, ResilientClient, SetupError};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: LookupGateway,
    pub strict_validation: bool,
}

/// HTTP server for the lookup gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server backed by the upstream described in `config`.
    pub fn new(config: GatewayConfig) -> Result<Self, SetupError> {
        let client = ResilientClient::from_config(&config)?;
        Ok(Self::with_gateway(config, LookupGateway::new(client)))
    }

    /// Create a server around an existing gateway.
    pub fn with_gateway(config: GatewayConfig, gateway: LookupGateway) -> Self {
        let state = AppState {
            gateway,
            strict_validation: config.validation.strict,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/infocep/{cep}", get(handlers::lookup_address))
            .route("/health", get(handlers::health))
            .route("/status", get(handlers::status))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TraceLayer::new_for_http().make_span_with(request::make_span::<Body>))
                    .layer(middleware::from_fn(request::track_requests))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
