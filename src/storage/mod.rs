//! SQLite store.
//!
//! `Store` owns the connection pool for one run and exposes the two operations the
//! pipeline needs: writing a record set to a table and running read-only queries.

mod pool;
mod query;
#[cfg(test)]
mod test_helpers;
mod write;

use std::path::{Path, PathBuf};

use sqlx::SqlitePool;

use crate::config::StoreMode;
use crate::error_handling::{DatabaseError, QueryError, StoreWriteError};
use crate::models::RecordSet;

pub use pool::{init_db_pool_with_path, init_memory_pool};
pub use query::run_query;
pub use write::write_records;

/// An open SQLite database, exclusively held by one pipeline run.
#[derive(Debug)]
pub struct Store {
    pool: SqlitePool,
    path: Option<PathBuf>,
}

impl Store {
    /// Opens (creating if needed) the database file at `path`.
    pub async fn open(path: &Path) -> Result<Self, DatabaseError> {
        let pool = init_db_pool_with_path(path).await?;
        Ok(Self {
            pool,
            path: Some(path.to_path_buf()),
        })
    }

    /// Opens a private in-memory database.
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        let pool = init_memory_pool().await?;
        Ok(Self { pool, path: None })
    }

    /// Database file path, `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Writes `records` to `table` in the given mode. See [`write_records`].
    pub async fn write_records(
        &self,
        table: &str,
        records: &RecordSet,
        mode: StoreMode,
    ) -> Result<u64, StoreWriteError> {
        write_records(&self.pool, table, records, mode).await
    }

    /// Runs a read-only statement. See [`run_query`].
    pub async fn run_query(&self, statement: &str) -> Result<RecordSet, QueryError> {
        run_query(&self.pool, statement).await
    }

    /// Column names of `table`, `None` if it does not exist.
    pub async fn table_columns(&self, table: &str) -> Result<Option<Vec<String>>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        write::table_columns(&mut *conn, table).await
    }

    /// Closes the pool, waiting for the connection to be released.
    pub async fn close(self) {
        self.pool.close().await;
        log::debug!("Store closed");
    }
}
