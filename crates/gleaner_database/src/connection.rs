//! Database connection utilities.

use gleaner_error::{GleanerResult, LedgerError, LedgerErrorKind};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};

/// A pooled PostgreSQL connection set.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Establish a single connection to the PostgreSQL database.
///
/// Reads the `DATABASE_URL` environment variable (loading a `.env` file if
/// one is present) to determine the connection string.
///
/// # Errors
///
/// Returns an error if:
/// - `DATABASE_URL` environment variable is not set
/// - Connection to the database fails
pub fn establish_connection() -> GleanerResult<PgConnection> {
    let database_url = database_url()?;

    PgConnection::establish(&database_url)
        .map_err(|e| LedgerError::new(LedgerErrorKind::Connection(e.to_string())).into())
}

/// Build an r2d2 connection pool of the given size.
///
/// Every worker task checks its connections out of the pool; blocking Diesel
/// work then runs on the Tokio blocking thread pool.
///
/// # Errors
///
/// Returns an error if `DATABASE_URL` is unset or the pool cannot reach the
/// database.
pub fn establish_pool(pool_size: u32) -> GleanerResult<PgPool> {
    let database_url = database_url()?;
    let manager = ConnectionManager::<PgConnection>::new(database_url);

    Pool::builder()
        .max_size(pool_size)
        .build(manager)
        .map_err(|e| LedgerError::new(LedgerErrorKind::Pool(e.to_string())).into())
}

/// Run pending migrations, creating the credential and ledger tables.
pub fn run_migrations(conn: &mut PgConnection) -> GleanerResult<()> {
    use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|e| LedgerError::new(LedgerErrorKind::Migration(e.to_string())).into())
}

fn database_url() -> GleanerResult<String> {
    dotenvy::dotenv().ok();
    std::env::var("DATABASE_URL").map_err(|_| {
        LedgerError::new(LedgerErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
        .into()
    })
}
