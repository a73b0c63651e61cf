//! Response handling and transformation.
//!
//! # Responsibilities
//! - Transform the upstream response for the client
//! - Drop framing headers, add CORS headers
//! - Rewrite URLs in HTML bodies, stream everything else
//!
//! # Design Decisions
//! - Non-HTML responses are streamed without buffering
//! - HTML is buffered whole, then rewritten
//! - The HTML check is a case-sensitive substring match on `Content-Type`
//! - Rewritten HTML is sent as UTF-8 whatever charset the upstream declared,
//!   and its `Content-Type` says so

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Response},
};

use crate::error::ProxyError;
use crate::http::cors::apply_proxied_cors;
use crate::http::request::ProxyOrigin;
use crate::rewrite::HtmlRewriter;
use crate::security::headers::{copy_except, RESPONSE_DENYLIST};

/// Whether the upstream declared an HTML body.
pub fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/html"))
}

/// The declared media type with its charset parameter replaced by UTF-8.
fn utf8_content_type(declared: &HeaderValue) -> Option<HeaderValue> {
    let declared = declared.to_str().ok()?;
    let mut parts: Vec<&str> = declared
        .split(';')
        .map(str::trim)
        .filter(|p| {
            !p.is_empty()
                && !p
                    .get(..8)
                    .is_some_and(|name| name.eq_ignore_ascii_case("charset="))
        })
        .collect();
    parts.push("charset=utf-8");
    HeaderValue::from_str(&parts.join("; ")).ok()
}

/// Turn an upstream response into the response sent to the client.
pub async fn transform(
    upstream: reqwest::Response,
    origin: &ProxyOrigin,
    rewriter: &dyn HtmlRewriter,
) -> Result<Response<Body>, ProxyError> {
    let status = upstream.status();
    let mut headers = copy_except(upstream.headers(), RESPONSE_DENYLIST);
    apply_proxied_cors(&mut headers);

    let body = if is_html(upstream.headers()) {
        let html = upstream.text().await.map_err(ProxyError::Body)?;
        tracing::debug!(bytes = html.len(), origin = %origin.base(), "Rewriting HTML");
        if let Some(content_type) = headers.get(header::CONTENT_TYPE).and_then(utf8_content_type) {
            headers.insert(header::CONTENT_TYPE, content_type);
        }
        Body::from(rewriter.rewrite(&html, origin))
    } else {
        Body::from_stream(upstream.bytes_stream())
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
