//! Inbound request inspection.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the client sent none
//! - Work out the proxy's own public origin for an inbound request
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - `X-Forwarded-Proto` is ignored unless explicitly trusted

use axum::http::{header, HeaderName, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::config::ListenerConfig;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        id.parse().ok().map(RequestId::new)
    }
}

/// Scheme and host under which clients reach the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyOrigin {
    pub scheme: String,
    pub host: String,
}

impl ProxyOrigin {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
        }
    }

    /// `<scheme>://<host>`.
    pub fn base(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }
}

/// Derives the [`ProxyOrigin`] of each inbound request.
#[derive(Debug, Clone)]
pub struct OriginResolver {
    listener_scheme: &'static str,
    fallback_host: String,
    trust_forwarded_proto: bool,
}

impl OriginResolver {
    pub fn from_config(listener: &ListenerConfig) -> Self {
        Self {
            listener_scheme: listener.scheme(),
            fallback_host: listener.bind_address.clone(),
            trust_forwarded_proto: listener.trust_forwarded_proto,
        }
    }

    pub fn resolve<B>(&self, request: &Request<B>) -> ProxyOrigin {
        let uri = request.uri();
        let headers = request.headers();

        let scheme = uri
            .scheme_str()
            .map(str::to_string)
            .or_else(|| {
                self.trust_forwarded_proto
                    .then(|| headers.get(X_FORWARDED_PROTO))
                    .flatten()
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.split(',').next())
                    .map(|v| v.trim().to_ascii_lowercase())
                    .filter(|v| v == "http" || v == "https")
            })
            .unwrap_or_else(|| self.listener_scheme.to_string());

        let host = uri
            .authority()
            .map(|a| a.as_str().to_string())
            .or_else(|| {
                headers
                    .get(header::HOST)
                    .and_then(|v| v.to_str().ok())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| self.fallback_host.clone());

        ProxyOrigin { scheme, host }
    }
}
