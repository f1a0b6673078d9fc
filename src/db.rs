use std::sync::Arc;

use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel::{prelude::*, sql_query};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use crate::errors::{DatabaseError, Result};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Creates the connection pool and runs pending migrations.
pub fn init(db_path: &str) -> Result<Arc<DbPool>> {
    let pool = create_pool(db_path)?;
    run_migrations(&pool)?;
    Ok(pool)
}

pub fn create_pool(db_path: &str) -> Result<Arc<DbPool>> {
    let manager = ConnectionManager::<SqliteConnection>::new(db_path);
    let pool = Pool::builder()
        .build(manager)
        .map_err(DatabaseError::PoolCreationFailed)?;

    // Enable foreign key constraint enforcement
    let mut conn = pool.get().map_err(DatabaseError::PoolCreationFailed)?;
    sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .map_err(DatabaseError::QueryFailed)?;

    Ok(Arc::new(pool))
}

fn run_migrations(pool: &Arc<DbPool>) -> Result<()> {
    let mut conn = pool.get().map_err(DatabaseError::PoolCreationFailed)?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
    Ok(())
}

/// Fetches a pooled connection.
pub fn get_connection(pool: &Arc<DbPool>) -> Result<DbConnection> {
    pool.get()
        .map_err(|e| DatabaseError::PoolCreationFailed(e).into())
}
