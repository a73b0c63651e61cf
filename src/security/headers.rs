//! Header filtering shared by both proxy directions.
//!
//! # Responsibilities
//! - Copy a header map minus a fixed denylist
//! - Keep every value of multi-valued headers (`Set-Cookie`, `Vary`)
//!
//! # Design Decisions
//! - Denylists are `HeaderName`s, so matching is case-insensitive by construction
//! - A fresh map is built per direction; the source map is never mutated

use axum::http::{header, HeaderMap, HeaderName};

/// Inbound headers never forwarded upstream: they would leak the proxy's
/// identity or get the request rejected by the origin.
pub const REQUEST_DENYLIST: &[HeaderName] = &[header::HOST, header::ORIGIN, header::REFERER];

/// Upstream headers never returned to the client. Framing is recomputed by
/// the serving layer once the body may have been rewritten.
pub const RESPONSE_DENYLIST: &[HeaderName] = &[
    header::CONTENT_ENCODING,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
];

/// Copy `source` into a new map, skipping every header named in `denylist`.
pub fn copy_except(source: &HeaderMap, denylist: &[HeaderName]) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(source.len());
    for (name, value) in source {
        if !denylist.contains(name) {
            headers.append(name.clone(), value.clone());
        }
    }
    headers
}
