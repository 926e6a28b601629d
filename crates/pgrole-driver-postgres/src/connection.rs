//! PostgreSQL connection implementation

use once_cell::sync::OnceCell;
use pgrole_core::{Connection, PgRoleError, QueryResult, Result, Row, StatementResult, Value};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;
use tokio_postgres::{
    Client, NoTls, Socket,
    tls::MakeTlsConnect,
    types::ToSql,
};

use crate::driver::PostgresSettings;
use crate::params::{PgValue, bind_params, inline_params, is_plannable, postgres_to_value};
use crate::tls::build_tls_connector;

/// Dedicated Tokio runtime for PostgreSQL operations.
///
/// tokio-postgres needs a Tokio runtime for networking; callers of this crate
/// are synchronous, so every call blocks on this runtime.
fn postgres_runtime() -> Result<&'static tokio::runtime::Runtime> {
    static RUNTIME: OnceCell<tokio::runtime::Runtime> = OnceCell::new();
    RUNTIME
        .get_or_try_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .thread_name("pgrole-postgres-runtime")
                .build()
        })
        .map_err(|e| {
            PgRoleError::Connection(format!(
                "Failed to create Tokio runtime for PostgreSQL driver: {}",
                e
            ))
        })
}

/// Run `future` to completion on the driver runtime.
///
/// Blocking inside another Tokio runtime would stall one of its workers (and
/// `block_on` refuses to nest), so that case is reported as an error.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(PgRoleError::NotSupported(
            "blocking PostgreSQL call from inside an async runtime; \
             run it on a blocking thread instead"
                .to_string(),
        ));
    }
    Ok(postgres_runtime()?.block_on(future))
}

pub(crate) fn format_postgres_error(error: &tokio_postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let code = db_error.code();
    let mut message = db_error.message().to_string();

    if let Some(detail) = db_error.detail()
        && !detail.trim().is_empty()
    {
        message.push_str(&format!(" (detail: {})", detail));
    }

    if let Some(hint) = db_error.hint()
        && !hint.trim().is_empty()
    {
        message.push_str(&format!(" (hint: {})", hint));
    }

    match code.code() {
        "42710" => format!("object already exists: {}", message),
        "42704" => format!("object does not exist: {}", message),
        "2BP01" => format!("dependent objects still exist: {}", message),
        "42501" => format!("insufficient privilege: {}", message),
        "0LP01" => format!("invalid grant operation: {}", message),
        _ => format!("{} (code: {})", message, code.code()),
    }
}

fn query_error(context: &str, error: &tokio_postgres::Error) -> PgRoleError {
    PgRoleError::Query(format!("{}: {}", context, format_postgres_error(error)))
}

async fn open_client<T>(config: &tokio_postgres::Config, tls: T) -> Result<Client>
where
    T: MakeTlsConnect<Socket>,
    T::Stream: Send + 'static,
{
    let (client, connection) = config.connect(tls).await.map_err(|e| {
        PgRoleError::Connection(format!(
            "Failed to connect to PostgreSQL: {}",
            format_postgres_error(&e)
        ))
    })?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(error = %e, "PostgreSQL connection error");
        }
    });

    Ok(client)
}

/// Blocking PostgreSQL connection
///
/// Statements on one connection are serialized through an internal lock.
pub struct PostgresConnection {
    client: Arc<Mutex<Client>>,
    closed: AtomicBool,
}

impl PostgresConnection {
    /// Connect to a PostgreSQL database
    #[tracing::instrument(skip(settings), fields(tls = settings.tls_mode.as_str()))]
    pub fn connect(settings: &PostgresSettings) -> Result<Self> {
        tracing::info!("connecting to PostgreSQL database");

        let tls = build_tls_connector(settings.tls_mode, settings.ca_cert.as_deref())?;
        let client = match tls {
            Some(tls) => block_on(open_client(&settings.config, tls))??,
            None => block_on(open_client(&settings.config, NoTls))??,
        };

        tracing::info!("PostgreSQL connection established");
        Ok(Self {
            client: Arc::new(Mutex::new(client)),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(PgRoleError::Connection(
                "PostgreSQL connection is closed".to_string(),
            ));
        }
        Ok(())
    }
}

impl Connection for PostgresConnection {
    fn driver_name(&self) -> &str {
        "postgresql"
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>(), params = params.len()))]
    fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.ensure_open()?;

        block_on(async {
            let client = self.client.lock().await;

            let rows_affected = if params.is_empty() || is_plannable(sql) {
                let statement = client
                    .prepare(sql)
                    .await
                    .map_err(|e| query_error("Failed to prepare statement", &e))?;
                let pg_params = bind_params(params, statement.params());
                let param_refs: Vec<&(dyn ToSql + Sync)> =
                    pg_params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

                client
                    .execute(&statement, &param_refs)
                    .await
                    .map_err(|e| query_error("Failed to execute statement", &e))?
            } else {
                // The inlined text carries the bound values; never log it.
                let inlined = inline_params(sql, params)?;
                client
                    .execute(inlined.as_str(), &[])
                    .await
                    .map_err(|e| query_error("Failed to execute statement", &e))?
            };

            tracing::debug!(affected_rows = rows_affected, "statement executed");
            Ok(StatementResult {
                affected_rows: rows_affected,
            })
        })?
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>(), params = params.len()))]
    fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.ensure_open()?;
        let start_time = std::time::Instant::now();

        block_on(async {
            let client = self.client.lock().await;

            let statement = client
                .prepare(sql)
                .await
                .map_err(|e| query_error("Failed to prepare query", &e))?;
            let pg_params: Vec<PgValue> = bind_params(params, statement.params());
            let param_refs: Vec<&(dyn ToSql + Sync)> =
                pg_params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();

            let pg_rows = client
                .query(&statement, &param_refs)
                .await
                .map_err(|e| query_error("Failed to execute query", &e))?;

            let columns: Vec<String> = statement
                .columns()
                .iter()
                .map(|col| col.name().to_string())
                .collect();

            let rows = pg_rows
                .iter()
                .map(|pg_row| {
                    Row::new(
                        (0..columns.len())
                            .map(|idx| postgres_to_value(pg_row, idx))
                            .collect(),
                    )
                })
                .collect::<Vec<_>>();

            tracing::debug!(
                row_count = rows.len(),
                execution_time_ms = start_time.elapsed().as_millis() as u64,
                "query executed successfully"
            );

            Ok(QueryResult { columns, rows })
        })?
    }

    fn close(&self) -> Result<()> {
        tracing::info!("closing PostgreSQL connection");
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
            || self
                .client
                .try_lock()
                .map(|client| client.is_closed())
                .unwrap_or(false)
    }
}
