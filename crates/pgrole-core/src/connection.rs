//! Connection and connection-provider traits

use crate::{QueryResult, Result, StatementResult, Value};
use std::sync::Arc;

/// An open database connection.
///
/// Every call blocks the calling thread until the server has answered.
/// Implementations are `Send + Sync`, but a single connection serializes its
/// statements; use one connection per thread for parallel work.
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "postgresql")
    fn driver_name(&self) -> &str;

    /// Execute a statement that does not return rows
    ///
    /// `params` bind to the positional placeholders `$1`, `$2`, ... in `sql`.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult>;

    /// Execute a query that returns rows
    fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Quote `name` for use as a SQL identifier.
    ///
    /// Returns `None` when the name cannot be represented as an identifier
    /// (empty, or containing characters the server rejects). The default
    /// follows the SQL standard double-quote convention.
    fn quote_identifier(&self, name: &str) -> Option<String> {
        crate::quote_identifier(name)
    }

    /// Close the connection
    fn close(&self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;
}

/// Something that can supply an open connection on demand.
///
/// Hosts hand a provider to the components that need database access instead
/// of those components reaching into the host for one. Closures returning a
/// connection are providers:
///
/// ```
/// use std::sync::Arc;
/// use pgrole_core::{Connection, ConnectionProvider, PgRoleError, Result};
///
/// let provider = || -> Result<Arc<dyn Connection>> {
///     Err(PgRoleError::Connection("no database configured".into()))
/// };
/// assert!(provider.connection().is_err());
/// ```
pub trait ConnectionProvider: Send + Sync {
    /// Produce a connection. Called at most once per successful resolution
    /// by consumers that memoize the result.
    fn connection(&self) -> Result<Arc<dyn Connection>>;
}

impl<F> ConnectionProvider for F
where
    F: Fn() -> Result<Arc<dyn Connection>> + Send + Sync,
{
    fn connection(&self) -> Result<Arc<dyn Connection>> {
        self()
    }
}
