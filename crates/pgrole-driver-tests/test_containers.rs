//! Docker container management for integration tests.
//!
//! A single PostgreSQL container is started the first time a test asks for
//! one and shared by every test in the process. Tests isolate themselves
//! through unique role names rather than separate servers.
//!
//! The blocking testcontainers runner is used because everything under test
//! is synchronous.

use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex};
use testcontainers::{Container, runners::SyncRunner};
use testcontainers_modules::postgres::Postgres;

/// Information about a running test container
#[derive(Debug, Clone)]
pub struct ContainerInfo {
    /// Host address (typically 127.0.0.1)
    pub host: String,
    /// Port number (randomly assigned by testcontainers)
    pub port: u16,
    /// Database name
    pub database: String,
    /// Superuser name
    pub username: String,
    /// Superuser password
    pub password: String,
}

struct PostgresContainer {
    #[allow(dead_code)]
    inner: Container<Postgres>,
    info: ContainerInfo,
}

/// Global Postgres container instance
static POSTGRES_CONTAINER: Lazy<Arc<Mutex<Option<PostgresContainer>>>> =
    Lazy::new(|| Arc::new(Mutex::new(None)));

/// Get the shared PostgreSQL container, starting it on first use.
///
/// The lock is held while the container starts so concurrent tests do not
/// start more than one.
pub fn postgres_container() -> anyhow::Result<ContainerInfo> {
    let mut guard = POSTGRES_CONTAINER
        .lock()
        .map_err(|e| anyhow::anyhow!("failed to lock postgres container: {}", e))?;

    if let Some(ref container) = *guard {
        return Ok(container.info.clone());
    }

    tracing::info!("starting PostgreSQL test container");

    let container = Postgres::default()
        .start()
        .map_err(|e| anyhow::anyhow!("failed to start postgres container: {}", e))?;

    let port = container
        .get_host_port_ipv4(5432)
        .map_err(|e| anyhow::anyhow!("failed to get postgres port: {}", e))?;

    // testcontainers-modules Postgres defaults: postgres user/password with "postgres" database
    let info = ContainerInfo {
        host: "127.0.0.1".to_string(),
        port,
        database: "postgres".to_string(),
        username: "postgres".to_string(),
        password: "postgres".to_string(),
    };

    tracing::info!(port = info.port, "PostgreSQL test container started");

    *guard = Some(PostgresContainer {
        inner: container,
        info: info.clone(),
    });

    Ok(info)
}
