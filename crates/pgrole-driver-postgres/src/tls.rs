//! PostgreSQL TLS Support
//!
//! Builds the native-tls connector handed to tokio-postgres for every mode
//! except `disable`.

use native_tls::{Certificate, TlsConnector};
use pgrole_core::{PgRoleError, TlsMode};
use postgres_native_tls::MakeTlsConnector;
use std::fs;
use std::path::Path;
use tokio_postgres::config::SslMode;

/// Error types for TLS operations
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    /// Failed to load CA certificate
    #[error("Failed to load CA certificate from {path}: {source}")]
    CaCertLoadFailed {
        path: String,
        source: std::io::Error,
    },

    /// Invalid CA certificate format
    #[error("Invalid CA certificate format: {0}")]
    InvalidCaCert(String),

    /// TLS mode needs a CA certificate that was not configured
    #[error("ssl_mode {0} requires ssl_ca_cert")]
    MissingCaCert(&'static str),

    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    ConfigurationError(String),
}

impl From<TlsError> for PgRoleError {
    fn from(error: TlsError) -> Self {
        PgRoleError::Configuration(error.to_string())
    }
}

/// Map a TLS mode onto the modes tokio-postgres negotiates.
///
/// Certificate and hostname verification happen in the connector, so the
/// verifying modes only need tokio-postgres to insist on TLS.
pub fn ssl_mode_for(mode: TlsMode) -> SslMode {
    match mode {
        TlsMode::Disable => SslMode::Disable,
        TlsMode::Prefer => SslMode::Prefer,
        TlsMode::Require | TlsMode::VerifyCa | TlsMode::VerifyFull => SslMode::Require,
    }
}

/// Build a TLS connector for `mode`, or `None` when TLS is disabled.
///
/// `prefer` and `require` accept any server certificate, `verify-ca` checks
/// the chain against `ca_cert`, and `verify-full` additionally checks the
/// hostname.
pub fn build_tls_connector(
    mode: TlsMode,
    ca_cert: Option<&Path>,
) -> Result<Option<MakeTlsConnector>, TlsError> {
    if mode == TlsMode::Disable {
        return Ok(None);
    }

    if mode.requires_ca_verification() && ca_cert.is_none() {
        return Err(TlsError::MissingCaCert(mode.as_str()));
    }

    tracing::debug!(mode = mode.as_str(), "building PostgreSQL TLS connector");

    let mut builder = TlsConnector::builder();

    if let Some(path) = ca_cert {
        let pem = fs::read(path).map_err(|source| TlsError::CaCertLoadFailed {
            path: path.display().to_string(),
            source,
        })?;
        let certificate =
            Certificate::from_pem(&pem).map_err(|e| TlsError::InvalidCaCert(e.to_string()))?;
        builder.add_root_certificate(certificate);
    }

    builder.danger_accept_invalid_certs(!mode.requires_ca_verification());
    builder.danger_accept_invalid_hostnames(!mode.requires_hostname_verification());

    let connector = builder
        .build()
        .map_err(|e| TlsError::ConfigurationError(e.to_string()))?;

    Ok(Some(MakeTlsConnector::new(connector)))
}
