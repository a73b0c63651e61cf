//! Cross-origin headers.
//!
//! Every response leaving the proxy allows any origin. Preflight requests
//! are answered locally and never reach the upstream.

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Method, Response, StatusCode},
};

const ANY: &str = "*";
const PROXIED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

pub fn is_preflight(method: &Method) -> bool {
    *method == Method::OPTIONS
}

/// Empty 200 allowing any origin, method and header.
pub fn preflight_response() -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ANY));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ANY));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ANY));
    response
}

/// Overlay the CORS headers sent with every proxied response.
pub fn apply_proxied_cors(headers: &mut HeaderMap) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static(ANY));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(PROXIED_METHODS));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ANY));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_options_is_a_preflight() {
        assert!(is_preflight(&Method::OPTIONS));
        assert!(!is_preflight(&Method::GET));
        assert!(!is_preflight(&Method::POST));
    }

    #[tokio::test]
    async fn preflight_is_empty_and_permissive() {
        let response = preflight_response();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "*");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[test]
    fn proxied_cors_replaces_upstream_values() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("https://robot-sms.xyz"),
        );
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/css"));

        apply_proxied_cors(&mut headers);

        assert_eq!(headers.get_all(header::ACCESS_CONTROL_ALLOW_ORIGIN).iter().count(), 1);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PUT, DELETE, OPTIONS"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "*");
        assert_eq!(headers[header::CONTENT_TYPE], "text/css");
    }
}
