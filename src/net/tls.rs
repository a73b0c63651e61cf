//! TLS termination for the inbound listener.

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsConfig;
use crate::error::StartupError;

/// Load the PEM certificate chain and private key named in `tls`.
pub async fn load_rustls_config(tls: &TlsConfig) -> Result<RustlsConfig, StartupError> {
    let config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
        .await
        .map_err(StartupError::Tls)?;
    tracing::info!(cert = %tls.cert_path, "TLS certificate loaded");
    Ok(config)
}
