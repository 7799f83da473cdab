//! Table writes (Replace and Append).
//!
//! Every write runs in one transaction. A Replace drops and recreates the table
//! inside that transaction, so readers see either the old table or the new one.

use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use crate::config::{StoreMode, MAX_BIND_PARAMS};
use crate::error_handling::{SchemaMismatchError, StoreWriteError};
use crate::models::{RecordSet, Schema, Value};
use crate::utils::quote_ident;

/// Column names of an existing table, `None` if the table does not exist.
pub(crate) async fn table_columns(
    conn: &mut SqliteConnection,
    table: &str,
) -> Result<Option<Vec<String>>, sqlx::Error> {
    let sql = format!("PRAGMA table_info({})", quote_ident(table));
    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;
    if rows.is_empty() {
        return Ok(None);
    }
    Ok(Some(
        rows.iter()
            .map(|row| row.get::<String, _>("name"))
            .collect(),
    ))
}

fn create_table_sql(table: &str, schema: &Schema) -> String {
    let columns: Vec<String> = schema
        .columns()
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.kind.sql_type()))
        .collect();
    format!("CREATE TABLE {} ({})", quote_ident(table), columns.join(", "))
}

/// Writes all records to `table` and returns the number of rows inserted.
///
/// # Errors
///
/// - `SchemaMismatch` in Append mode when the existing columns differ (the table is untouched)
/// - `Database` for any SQL failure (the transaction is rolled back)
pub async fn write_records(
    pool: &SqlitePool,
    table: &str,
    records: &RecordSet,
    mode: StoreMode,
) -> Result<u64, StoreWriteError> {
    let mut tx = pool.begin().await?;

    match mode {
        StoreMode::Replace => {
            let drop_sql = format!("DROP TABLE IF EXISTS {}", quote_ident(table));
            sqlx::query(&drop_sql).execute(&mut *tx).await?;
            let create_sql = create_table_sql(table, records.schema());
            sqlx::query(&create_sql).execute(&mut *tx).await?;
        }
        StoreMode::Append => match table_columns(&mut *tx, table).await? {
            None => {
                log::info!("Table {table} does not exist yet, creating it for append");
                let create_sql = create_table_sql(table, records.schema());
                sqlx::query(&create_sql).execute(&mut *tx).await?;
            }
            Some(existing) if existing != records.schema().names() => {
                return Err(SchemaMismatchError {
                    table: Some(table.to_string()),
                    expected: existing,
                    found: records.schema().names(),
                }
                .into());
            }
            Some(_) => {}
        },
    }

    let column_list: Vec<String> = records
        .schema()
        .columns()
        .iter()
        .map(|c| quote_ident(&c.name))
        .collect();
    let rows_per_chunk = (MAX_BIND_PARAMS / records.schema().len().max(1)).max(1);

    let mut inserted = 0u64;
    for chunk in records.records().chunks(rows_per_chunk) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "INSERT INTO {} ({}) ",
            quote_ident(table),
            column_list.join(", ")
        ));
        builder.push_values(chunk, |mut row, record| {
            for value in record.values() {
                match value {
                    Value::Text(s) => {
                        row.push_bind(s.clone());
                    }
                    Value::Integer(i) => {
                        row.push_bind(*i);
                    }
                    Value::Decimal(d) => {
                        row.push_bind(*d);
                    }
                    Value::Null => {
                        row.push_bind(None::<String>);
                    }
                }
            }
        });
        inserted += builder.build().execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;
    log::debug!("Wrote {inserted} rows to {table} ({mode:?})");
    Ok(inserted)
}
