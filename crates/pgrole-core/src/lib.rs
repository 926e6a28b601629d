//! pgrole Core - Connection abstractions shared by the pgrole crates
//!
//! This crate defines the seams the rest of the workspace is built on:
//!
//! - `Connection` - Trait for an open, synchronous database connection
//! - `ConnectionProvider` - Trait for anything that can hand out a connection
//! - `DatabaseDriver` - Trait for turning a `ConnectionConfig` into a connection
//! - Common types like `Value`, `Row`, `QueryResult`
//! - Identifier and literal quoting for PostgreSQL-compatible servers

mod config;
mod connection;
mod driver;
mod error;
pub mod quoting;
pub mod tls;
mod types;

pub use config::*;
pub use connection::*;
pub use driver::*;
pub use error::*;
pub use quoting::{quote_identifier, quote_literal};
pub use tls::TlsMode;
pub use types::*;
