//! Error types for request handling and startup.

use std::error::Error as StdError;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Failures while serving a single request.
///
/// No kind is retried; each ends the request with an HTTP response.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The upstream could not be reached (DNS, connect, TLS, connect timeout).
    #[error("Proxy Error: {}", describe(.0))]
    Upstream(reqwest::Error),

    /// The upstream accepted the request but sent no response headers in time.
    #[error("Proxy Error: upstream sent no response within {}s", .0.as_secs())]
    Timeout(Duration),

    /// The upstream body could not be read for rewriting.
    #[error("failed to read upstream body: {}", describe(.0))]
    Body(reqwest::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Upstream(_) | ProxyError::Timeout(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Body(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut response = (status, self.to_string()).into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        response
    }
}

/// Render an error together with its source chain.
///
/// `reqwest` keeps the useful part ("connection refused", "dns error") in
/// the sources, not in its own `Display`.
fn describe(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.contains(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}

/// Failures while assembling the server.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid upstream: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("invalid value for header {name}: {value:?}")]
    HeaderValue { name: &'static str, value: String },

    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to load TLS material: {0}")]
    Tls(#[source] std::io::Error),

    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Layer(&'static str, Option<Box<Layer>>);

    impl fmt::Display for Layer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl StdError for Layer {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.1.as_deref().map(|l| l as &(dyn StdError + 'static))
        }
    }

    fn builder_error() -> reqwest::Error {
        reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err()
    }

    #[test]
    fn every_error_response_allows_any_origin() {
        let errors = [
            ProxyError::Upstream(builder_error()),
            ProxyError::Timeout(Duration::from_secs(1)),
            ProxyError::Body(builder_error()),
        ];
        for error in errors {
            let response = error.into_response();
            assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
            assert_eq!(
                response.headers()[header::CONTENT_TYPE],
                "text/plain; charset=utf-8"
            );
        }
    }

    #[test]
    fn timeouts_are_bad_gateways() {
        let error = ProxyError::Timeout(Duration::from_secs(30));
        assert_eq!(error.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            error.to_string(),
            "Proxy Error: upstream sent no response within 30s"
        );
        assert_eq!(
            ProxyError::Body(builder_error()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn describe_walks_the_source_chain() {
        let error = Layer(
            "error sending request",
            Some(Box::new(Layer(
                "client error (Connect)",
                Some(Box::new(Layer("Connection refused (os error 111)", None))),
            ))),
        );
        assert_eq!(
            describe(&error),
            "error sending request: client error (Connect): Connection refused (os error 111)"
        );
    }

    #[test]
    fn describe_skips_repeated_messages() {
        let error = Layer(
            "operation timed out",
            Some(Box::new(Layer("timed out", None))),
        );
        assert_eq!(describe(&error), "operation timed out");
    }
}
