//! The fixed upstream origin and target URL derivation.

use axum::http::Uri;
use thiserror::Error;
use url::Url;

/// Reasons a configured upstream base URL is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("unsupported scheme '{0}', expected http or https")]
    Scheme(String),

    #[error("URL has no host")]
    MissingHost,

    #[error("upstream must be a bare origin, found {0}")]
    NotAnOrigin(&'static str),
}

/// The single origin all traffic is forwarded to.
///
/// Both the absolute base (`https://host[:port]`) and the bare authority
/// (`host[:port]`) derive from one configured URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    base: String,
    authority: String,
}

impl Upstream {
    /// Parse a configured base URL such as `https://example.com`.
    pub fn parse(base_url: &str) -> Result<Self, UpstreamError> {
        let url = Url::parse(base_url)?;

        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(UpstreamError::Scheme(scheme.to_string()));
        }
        let host = url.host_str().ok_or(UpstreamError::MissingHost)?;
        if !url.username().is_empty() || url.password().is_some() {
            return Err(UpstreamError::NotAnOrigin("credentials"));
        }
        if url.path() != "/" {
            return Err(UpstreamError::NotAnOrigin("a path"));
        }
        if url.query().is_some() {
            return Err(UpstreamError::NotAnOrigin("a query"));
        }
        if url.fragment().is_some() {
            return Err(UpstreamError::NotAnOrigin("a fragment"));
        }

        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        };

        Ok(Self {
            base: format!("{scheme}://{authority}"),
            authority,
        })
    }

    /// `<scheme>://<authority>`, never with a trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// `<host>[:port]`.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Upstream URL for an inbound request: base + path + query.
    pub fn target_url(&self, uri: &Uri) -> String {
        match uri.query() {
            Some(query) if !query.is_empty() => format!("{}{}?{}", self.base, uri.path(), query),
            _ => format!("{}{}", self.base, uri.path()),
        }
    }
}
