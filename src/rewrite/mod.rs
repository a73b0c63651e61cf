//! HTML URL rewriting.
//!
//! Keeps navigation inside the proxy by pointing upstream URLs embedded in
//! HTML back at the proxy's own origin. Only HTML is rewritten; CSS and
//! JavaScript bodies pass through unchanged.

pub mod html;

pub use html::PatternRewriter;

use crate::http::request::ProxyOrigin;

/// Turns an upstream HTML document into one that links back through the proxy.
///
/// Implementations are pure: no I/O and no state between calls.
pub trait HtmlRewriter: Send + Sync {
    fn rewrite(&self, html: &str, origin: &ProxyOrigin) -> String;
}
