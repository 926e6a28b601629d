//! PostgreSQL driver implementation
//!
//! tokio-postgres runs on a dedicated runtime owned by this crate; the public
//! surface is blocking, so callers need no async runtime of their own.

mod connection;
mod driver;
mod params;
mod tls;

pub use connection::PostgresConnection;
pub use driver::{PostgresConnector, PostgresDriver, PostgresSettings};
pub use tls::{TlsError, build_tls_connector, ssl_mode_for};
