//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + CLI overrides
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → consumed once by HttpServer::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the upstream origin never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ensure_valid, parse_config, read_config, ConfigError};
pub use schema::ListenerConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::ProxyConfig;
pub use schema::TimeoutConfig;
pub use schema::TlsConfig;
pub use schema::UpstreamConfig;
pub use validation::{validate_config, ValidationError};
