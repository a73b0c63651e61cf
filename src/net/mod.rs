//! Network layer subsystem.
//!
//! Plain TCP listeners come straight from tokio; TLS is optional and
//! terminated by rustls before requests reach the HTTP layer.

pub mod tls;
