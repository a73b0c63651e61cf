//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing)
//! - Bind server to a plain or TLS listener
//! - Drain in-flight requests on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::error::StartupError;
use crate::http::proxy::WebsiteProxy;
use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::lifecycle::shutdown::signalled;
use crate::net::tls::load_rustls_config;
use crate::observability::metrics;

/// Grace period for in-flight requests once shutdown starts (TLS listener).
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<WebsiteProxy>,
}

/// HTTP server for the mirror proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        let proxy = Arc::new(WebsiteProxy::new(&config)?);
        tracing::info!(upstream = %proxy.upstream().base(), "Upstream configured");

        let router = Self::build_router(AppState { proxy });
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            let request_id = request
                .headers()
                .get(&X_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown");
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
                request_id = %request_id
            )
        });

        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(trace)
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// The fully layered router, for embedding or in-process tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(signalled(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Bind the configured address and serve, with TLS when configured.
    pub async fn serve(self, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
        let bind_address = self.config.listener.bind_address.clone();

        let Some(tls) = self.config.listener.tls.clone() else {
            let listener = TcpListener::bind(&bind_address).await?;
            return Ok(self.run(listener, shutdown).await?);
        };

        let addr: SocketAddr = bind_address
            .parse()
            .map_err(|_| StartupError::BindAddress(bind_address.clone()))?;
        let rustls = load_rustls_config(&tls).await?;

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            signalled(shutdown).await;
            drain.graceful_shutdown(Some(DRAIN_TIMEOUT));
        });

        tracing::info!(address = %addr, "HTTPS server starting");
        axum_server::bind_rustls(addr, rustls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Catch-all handler: every method, every path goes through the proxy.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();

    let response = state.proxy.handle(request).await;

    metrics::record_request(method.as_str(), response.status().as_u16(), start_time);
    response
}
