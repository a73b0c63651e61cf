//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request:
//!     → headers.rs (drop Host/Origin/Referer before forwarding)
//! Upstream response:
//!     → headers.rs (drop framing headers before returning)
//! ```

pub mod headers;
