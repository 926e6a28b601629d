//! Role management module
//!
//! Creating and dropping roles, granting and revoking role membership, and
//! switching the session role on PostgreSQL-compatible servers.

mod admin;
pub mod statements;


pub use admin::*;
