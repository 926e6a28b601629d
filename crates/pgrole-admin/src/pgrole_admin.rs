//! pgrole Admin - Role administration for PostgreSQL-compatible servers
//!
//! This crate provides:
//! - `RoleAdmin` for creating, dropping, and linking roles over a lazily
//!   resolved connection
//! - Statement builders for previewing the SQL it issues
//! - The legacy md5 password digest used by `RoleAdmin::check_user`

pub mod credential;
pub mod role;

pub use credential::md5_password;
pub use role::*;
