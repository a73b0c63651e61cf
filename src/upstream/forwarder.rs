//! Request forwarding to the upstream origin.
//!
//! # Responsibilities
//! - Derive the target URL from the inbound path and query
//! - Strip identity headers and present a browser-like identity
//! - Send the request once; transport failures are returned, never retried
//!
//! # Design Decisions
//! - One pooled `reqwest::Client` shared by all requests
//! - GET and HEAD never carry a body upstream
//! - Other bodies are streamed through without buffering
//! - Redirects are followed upstream when the request can be replayed; a
//!   307/308 answering a streamed body reaches the client as-is
//! - The request deadline covers the response headers only, streamed bodies
//!   run as long as the upstream keeps sending

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Method, Request},
};
use reqwest::Client;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::error::{ProxyError, StartupError};
use crate::security::headers::{copy_except, REQUEST_DENYLIST};
use crate::upstream::Upstream;

/// Header values that make the proxy look like a desktop browser.
#[derive(Debug, Clone)]
pub struct BrowserHeaders {
    pub user_agent: HeaderValue,
    pub accept: HeaderValue,
    pub accept_language: HeaderValue,
}

impl BrowserHeaders {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, StartupError> {
        Ok(Self {
            user_agent: header_value("user-agent", &config.user_agent)?,
            accept: header_value("accept", &config.accept)?,
            accept_language: header_value("accept-language", &config.accept_language)?,
        })
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, StartupError> {
    HeaderValue::from_str(value).map_err(|_| StartupError::HeaderValue {
        name,
        value: value.to_string(),
    })
}

/// Build the header set sent upstream for an inbound header map.
pub fn outbound_request_headers(inbound: &HeaderMap, browser: &BrowserHeaders) -> HeaderMap {
    let mut headers = copy_except(inbound, REQUEST_DENYLIST);
    headers.insert(header::USER_AGENT, browser.user_agent.clone());
    headers.insert(header::ACCEPT, browser.accept.clone());
    headers.insert(header::ACCEPT_LANGUAGE, browser.accept_language.clone());
    headers
}

/// Drop framing headers describing a body that will not be sent.
fn strip_body_framing(headers: &mut HeaderMap) {
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::TRANSFER_ENCODING);
}

/// Whether a request with this method may carry a body upstream.
pub fn forwards_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::HEAD
}

/// Forwards inbound requests to the configured upstream.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    upstream: Arc<Upstream>,
    browser: BrowserHeaders,
    response_timeout: Duration,
}

impl Forwarder {
    pub fn new(
        upstream: Arc<Upstream>,
        config: &UpstreamConfig,
        timeouts: &TimeoutConfig,
    ) -> Result<Self, StartupError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(StartupError::Client)?;

        Ok(Self {
            client,
            upstream,
            browser: BrowserHeaders::from_config(config)?,
            response_timeout: Duration::from_secs(timeouts.request_secs),
        })
    }

    pub fn upstream(&self) -> &Upstream {
        &self.upstream
    }

    /// Send `request` upstream and return the raw upstream response.
    pub async fn forward(&self, request: Request<Body>) -> Result<reqwest::Response, ProxyError> {
        let (parts, body) = request.into_parts();
        let target_url = self.upstream.target_url(&parts.uri);

        tracing::info!(
            method = %parts.method,
            target = %target_url,
            "Proxying request"
        );

        let mut headers = outbound_request_headers(&parts.headers, &self.browser);
        let body = if forwards_body(&parts.method) {
            Some(reqwest::Body::wrap_stream(body.into_data_stream()))
        } else {
            strip_body_framing(&mut headers);
            None
        };

        let mut upstream_request = self
            .client
            .request(parts.method.clone(), &target_url)
            .headers(headers);
        if let Some(body) = body {
            upstream_request = upstream_request.body(body);
        }

        let sent = tokio::time::timeout(self.response_timeout, upstream_request.send()).await;
        match sent {
            Err(_) => {
                tracing::error!(
                    target = %target_url,
                    timeout_secs = self.response_timeout.as_secs(),
                    "Upstream response timed out"
                );
                Err(ProxyError::Timeout(self.response_timeout))
            }
            Ok(Ok(response)) => {
                tracing::info!(
                    status = response.status().as_u16(),
                    target = %target_url,
                    "Proxy response status"
                );
                Ok(response)
            }
            Ok(Err(e)) => {
                tracing::error!(error = %e, target = %target_url, "Proxy request failed");
                Err(ProxyError::Upstream(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{DEFAULT_ACCEPT, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_USER_AGENT};

    fn browser() -> BrowserHeaders {
        BrowserHeaders::from_config(&UpstreamConfig::default()).unwrap()
    }

    #[test]
    fn strips_identity_headers_and_keeps_the_rest() {
        let mut inbound = HeaderMap::new();
        inbound.insert("Host", HeaderValue::from_static("x"));
        inbound.insert("Origin", HeaderValue::from_static("y"));
        inbound.insert("Referer", HeaderValue::from_static("z"));
        inbound.insert("X-Custom", HeaderValue::from_static("w"));
        inbound.insert(header::COOKIE, HeaderValue::from_static("session=abc"));

        let headers = outbound_request_headers(&inbound, &browser());

        assert_eq!(headers["x-custom"], "w");
        assert_eq!(headers[header::COOKIE], "session=abc");
        assert!(!headers.contains_key(header::HOST));
        assert!(!headers.contains_key(header::ORIGIN));
        assert!(!headers.contains_key(header::REFERER));
    }

    #[test]
    fn browser_identity_overrides_client_values() {
        let mut inbound = HeaderMap::new();
        inbound.insert("user-agent", HeaderValue::from_static("curl/8.0"));
        inbound.append("USER-AGENT", HeaderValue::from_static("second"));
        inbound.insert(header::ACCEPT, HeaderValue::from_static("*/*"));

        let headers = outbound_request_headers(&inbound, &browser());

        assert_eq!(headers.get_all(header::USER_AGENT).iter().count(), 1);
        assert_eq!(headers[header::USER_AGENT], DEFAULT_USER_AGENT);
        assert_eq!(headers[header::ACCEPT], DEFAULT_ACCEPT);
        assert_eq!(headers[header::ACCEPT_LANGUAGE], DEFAULT_ACCEPT_LANGUAGE);
    }

    #[test]
    fn custom_browser_identity_is_used() {
        let config = UpstreamConfig {
            user_agent: "MirrorBot/1.0".into(),
            ..UpstreamConfig::default()
        };
        let browser = BrowserHeaders::from_config(&config).unwrap();
        let headers = outbound_request_headers(&HeaderMap::new(), &browser);
        assert_eq!(headers[header::USER_AGENT], "MirrorBot/1.0");
    }

    #[test]
    fn rejects_illegal_header_values() {
        let config = UpstreamConfig {
            accept_language: "en\r\nX-Injected: 1".into(),
            ..UpstreamConfig::default()
        };
        let err = BrowserHeaders::from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            StartupError::HeaderValue { name: "accept-language", .. }
        ));
    }

    #[test]
    fn body_framing_is_removed_with_the_body() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from_static("7"));
        headers.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        strip_body_framing(&mut headers);

        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(header::CONTENT_TYPE));
    }

    #[test]
    fn only_get_and_head_drop_the_body() {
        assert!(!forwards_body(&Method::GET));
        assert!(!forwards_body(&Method::HEAD));
        assert!(forwards_body(&Method::POST));
        assert!(forwards_body(&Method::PUT));
        assert!(forwards_body(&Method::DELETE));
        assert!(forwards_body(&Method::PATCH));
    }
}
