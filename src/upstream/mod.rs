//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → target.rs (upstream base + inbound path + query)
//!     → forwarder.rs (filter headers, browser identity, single send)
//!     → reqwest::Response handed to http::response
//! ```

pub mod forwarder;
pub mod target;

pub use forwarder::{BrowserHeaders, Forwarder};
pub use target::{Upstream, UpstreamError};
