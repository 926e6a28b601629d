//! Database driver trait definition

use crate::{Connection, ConnectionConfig, Result};
use std::sync::Arc;

/// A database driver: turns a [`ConnectionConfig`] into an open [`Connection`]
pub trait DatabaseDriver: Send + Sync {
    /// Get the driver identifier (e.g., "postgres")
    fn name(&self) -> &'static str;

    /// Get the human-readable driver name
    fn display_name(&self) -> &'static str {
        self.name()
    }

    /// Get the default port for this database
    fn default_port(&self) -> Option<u16> {
        None
    }

    /// Open a connection
    fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>>;

    /// Open a connection, run a trivial query and drop it
    fn test_connection(&self, config: &ConnectionConfig) -> Result<()>;

    /// Render the configuration as a connection string, with the password masked
    fn build_connection_string(&self, config: &ConnectionConfig) -> String;
}
