//! PostgreSQL driver implementation

use pgrole_core::{
    Connection, ConnectionConfig, ConnectionProvider, DEFAULT_POSTGRES_PORT, DatabaseDriver,
    PgRoleError, Result, TlsMode,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::PostgresConnection;
use crate::tls::ssl_mode_for;

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_APPLICATION_NAME: &str = "pgrole";

/// Resolved settings for opening a PostgreSQL connection
#[derive(Debug, Clone)]
pub struct PostgresSettings {
    pub config: tokio_postgres::Config,
    pub tls_mode: TlsMode,
    pub ca_cert: Option<PathBuf>,
}

impl PostgresSettings {
    /// Resolve a generic connection configuration into tokio-postgres settings
    pub fn from_config(config: &ConnectionConfig) -> Result<Self> {
        let host = config
            .get_string("host")
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "localhost".to_string());
        let database = config
            .get_string("database")
            .unwrap_or_else(|| "postgres".to_string());
        let application_name = config
            .get_string("application_name")
            .unwrap_or_else(|| DEFAULT_APPLICATION_NAME.to_string());

        let connect_timeout = match config.get_string("connect_timeout") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                PgRoleError::Configuration(format!("Invalid connect_timeout: {}", raw))
            })?,
            None => DEFAULT_CONNECT_TIMEOUT_SECS,
        };

        let tls_mode = match config.get_string("ssl_mode") {
            Some(raw) => raw.parse::<TlsMode>()?,
            None => TlsMode::default(),
        };

        let mut pg = tokio_postgres::Config::new();
        pg.host(&host)
            .port(config.port_or(DEFAULT_POSTGRES_PORT))
            .dbname(&database)
            .application_name(&application_name)
            .ssl_mode(ssl_mode_for(tls_mode));

        // Zero means wait indefinitely, like libpq.
        if connect_timeout > 0 {
            pg.connect_timeout(Duration::from_secs(connect_timeout));
        }
        if let Some(user) = config.get_string("user") {
            pg.user(&user);
        }
        if let Some(password) = config.get_string("password") {
            pg.password(password);
        }

        Ok(Self {
            config: pg,
            tls_mode,
            ca_cert: config.get_string("ssl_ca_cert").map(PathBuf::from),
        })
    }
}

/// PostgreSQL database driver
pub struct PostgresDriver;

impl PostgresDriver {
    /// Create a new PostgreSQL driver instance
    pub fn new() -> Self {
        tracing::debug!("PostgreSQL driver initialized");
        Self
    }
}

impl Default for PostgresDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseDriver for PostgresDriver {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn display_name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn default_port(&self) -> Option<u16> {
        Some(DEFAULT_POSTGRES_PORT)
    }

    #[tracing::instrument(skip(self, config), fields(host = config.get_string("host").as_deref(), database = config.get_string("database").as_deref()))]
    fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        let settings = PostgresSettings::from_config(config)?;
        let conn = PostgresConnection::connect(&settings).map_err(|e| {
            tracing::error!(error = %e, "failed to connect to PostgreSQL database");
            e
        })?;

        tracing::info!(ssl = settings.tls_mode.as_str(), "PostgreSQL connection created");
        Ok(Arc::new(conn))
    }

    #[tracing::instrument(skip(self, config))]
    fn test_connection(&self, config: &ConnectionConfig) -> Result<()> {
        tracing::debug!("testing PostgreSQL connection");
        let conn = self.connect(config)?;
        conn.query("SELECT 1", &[])?;
        conn.close()
    }

    /// Connection string with the password masked
    fn build_connection_string(&self, config: &ConnectionConfig) -> String {
        let host = config
            .get_string("host")
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| "localhost".to_string());
        let port = config.port_or(DEFAULT_POSTGRES_PORT);
        let database = config
            .get_string("database")
            .unwrap_or_else(|| "postgres".to_string());

        let mut conn_str = String::from("postgresql://");

        if let Some(user) = config.get_string("user") {
            conn_str.push_str(&user);
            if config.get_string("password").is_some() {
                conn_str.push_str(":****");
            }
            conn_str.push('@');
        }

        conn_str.push_str(&format!("{}:{}/{}", host, port, database));
        conn_str
    }
}

/// Opens a fresh PostgreSQL connection each time it is asked for one.
///
/// Hand it to a consumer that memoizes its connection, such as `RoleAdmin`,
/// to get lazy connect-on-first-use.
#[derive(Debug, Clone)]
pub struct PostgresConnector {
    config: ConnectionConfig,
}

impl PostgresConnector {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    /// Build a connector from a `postgres://` URL
    pub fn from_url(url: &str) -> Result<Self> {
        Ok(Self::new(ConnectionConfig::from_url(url)?))
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

impl ConnectionProvider for PostgresConnector {
    fn connection(&self) -> Result<Arc<dyn Connection>> {
        PostgresDriver.connect(&self.config)
    }
}
