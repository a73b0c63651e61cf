//! The request handler: preflight check, forward, transform.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, Response},
    response::IntoResponse,
};

use crate::config::ProxyConfig;
use crate::error::{ProxyError, StartupError};
use crate::http::cors;
use crate::http::request::OriginResolver;
use crate::http::response;
use crate::observability::metrics;
use crate::rewrite::{HtmlRewriter, PatternRewriter};
use crate::upstream::{Forwarder, Upstream};

/// Stateless handler mapping one inbound request to one response.
///
/// Nothing is shared between requests except read-only configuration and
/// the upstream connection pool, so any host layer able to hand over a
/// `Request<Body>` can drive it.
#[derive(Clone)]
pub struct WebsiteProxy {
    forwarder: Forwarder,
    rewriter: Arc<dyn HtmlRewriter>,
    origins: OriginResolver,
}

impl WebsiteProxy {
    pub fn new(config: &ProxyConfig) -> Result<Self, StartupError> {
        let upstream = Arc::new(Upstream::parse(&config.upstream.base_url)?);
        let rewriter = Arc::new(PatternRewriter::new(&upstream));
        let forwarder = Forwarder::new(upstream, &config.upstream, &config.timeouts)?;
        Ok(Self::with_rewriter(
            forwarder,
            rewriter,
            OriginResolver::from_config(&config.listener),
        ))
    }

    /// Assemble a handler around a custom HTML rewriter.
    pub fn with_rewriter(
        forwarder: Forwarder,
        rewriter: Arc<dyn HtmlRewriter>,
        origins: OriginResolver,
    ) -> Self {
        Self {
            forwarder,
            rewriter,
            origins,
        }
    }

    pub fn upstream(&self) -> &Upstream {
        self.forwarder.upstream()
    }

    /// Handle one request. Failures become error responses, never panics.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        if cors::is_preflight(request.method()) {
            tracing::debug!(path = %request.uri().path(), "Answering CORS preflight");
            return cors::preflight_response();
        }

        match self.proxy(request).await {
            Ok(response) => response,
            Err(e) => {
                match &e {
                    ProxyError::Upstream(_) | ProxyError::Timeout(_) => {
                        metrics::record_upstream_failure()
                    }
                    ProxyError::Body(_) => {
                        tracing::error!(error = %e, "Failed to transform upstream response")
                    }
                }
                e.into_response()
            }
        }
    }

    async fn proxy(&self, request: Request<Body>) -> Result<Response<Body>, ProxyError> {
        let origin = self.origins.resolve(&request);
        let upstream = self.forwarder.forward(request).await?;
        response::transform(upstream, &origin, self.rewriter.as_ref()).await
    }
}
