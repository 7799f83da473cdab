//! Read-only queries against the store.

use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::{Column as _, Executor, Row, SqlitePool, Statement, TypeInfo, ValueRef};

use crate::error_handling::QueryError;
use crate::models::{Column, Record, RecordSet, Schema, Value, ValueKind};

/// Leading keywords that could end the read-only session or leave state behind
/// on the pooled connection.
const REJECTED_KEYWORDS: &[&str] = &[
    "BEGIN", "COMMIT", "END", "ROLLBACK", "SAVEPOINT", "RELEASE", "PRAGMA", "ATTACH", "DETACH",
    "VACUUM",
];

/// Runs a statement and returns its rows as a record set, in the store's order.
///
/// The connection is switched to `PRAGMA query_only` for the duration of the
/// statement, so any write fails inside SQLite and nothing is kept.
///
/// # Errors
///
/// - `Malformed` for an empty statement, a syntax error, a transaction-control or
///   pragma statement, or a statement that tries to write
/// - `UnknownTableOrColumn` when SQLite reports a missing table or column
pub async fn run_query(pool: &SqlitePool, statement: &str) -> Result<RecordSet, QueryError> {
    let sql = statement.trim();
    if sql.is_empty() {
        return Err(QueryError::Malformed {
            statement: statement.to_string(),
            reason: "empty statement".to_string(),
        });
    }
    if let Some(keyword) = leading_keywords(sql)
        .into_iter()
        .find(|k| REJECTED_KEYWORDS.contains(&k.as_str()))
    {
        return Err(QueryError::Malformed {
            statement: statement.to_string(),
            reason: format!("{keyword} statements are not allowed in queries"),
        });
    }

    let mut conn = pool.acquire().await?;
    sqlx::query("PRAGMA query_only = ON")
        .execute(&mut *conn)
        .await?;
    let fetched = fetch_read_only(&mut conn, sql).await;
    sqlx::query("PRAGMA query_only = OFF")
        .execute(&mut *conn)
        .await?;
    let (names, rows) = fetched?;

    log::debug!("Query {sql:?} returned {} rows", rows.len());
    build_record_set(names, &rows)
}

async fn fetch_read_only(
    conn: &mut SqliteConnection,
    sql: &str,
) -> Result<(Vec<String>, Vec<SqliteRow>), QueryError> {
    let prepared = (&mut *conn)
        .prepare(sql)
        .await
        .map_err(|e| classify(sql, e))?;
    let names: Vec<String> = prepared
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    let rows = prepared
        .query()
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| classify(sql, e))?;
    Ok((names, rows))
}

/// First keyword of every `;`-separated statement, upper-cased.
///
/// Separators inside quoted strings or identifiers do not split.
pub(super) fn leading_keywords(sql: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    for c in sql.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '\'' || c == '"' || c == '`' => quote = Some(c),
            None if c == '[' => quote = Some(']'),
            None if c == ';' => {
                pieces.push(std::mem::take(&mut current));
                continue;
            }
            None => {}
        }
        current.push(c);
    }
    pieces.push(current);

    pieces
        .iter()
        .filter_map(|piece| {
            let word: String = piece
                .trim_start()
                .chars()
                .take_while(|c| c.is_ascii_alphabetic())
                .collect();
            (!word.is_empty()).then(|| word.to_ascii_uppercase())
        })
        .collect()
}

/// Maps SQLite errors onto the query error taxonomy.
fn classify(statement: &str, error: sqlx::Error) -> QueryError {
    match error {
        sqlx::Error::Database(db) => {
            let reason = db.message().to_string();
            if reason.contains("no such table") || reason.contains("no such column") {
                QueryError::UnknownTableOrColumn {
                    statement: statement.to_string(),
                    reason,
                }
            } else {
                QueryError::Malformed {
                    statement: statement.to_string(),
                    reason,
                }
            }
        }
        other => QueryError::Database(other),
    }
}

fn read_value(row: &SqliteRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let storage_class = raw.type_info().name().to_string();
    Ok(match storage_class.as_str() {
        "INTEGER" => Value::Integer(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" => Value::Decimal(row.try_get_unchecked::<f64, _>(index)?),
        "BLOB" => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            Value::Text(String::from_utf8_lossy(&bytes).into_owned())
        }
        _ => Value::Text(row.try_get_unchecked::<String, _>(index)?),
    })
}

/// Picks one kind per column from the values SQLite returned.
///
/// SQLite columns can mix storage classes: integers next to reals become decimals,
/// anything mixed with text becomes text.
fn infer_column(name: String, values: &mut [Value]) -> Column {
    let mut has_integer = false;
    let mut has_decimal = false;
    let mut has_text = false;
    let mut nullable = false;
    for value in values.iter() {
        match value.kind() {
            Some(ValueKind::Integer) => has_integer = true,
            Some(ValueKind::Decimal) => has_decimal = true,
            Some(ValueKind::Text) => has_text = true,
            None => nullable = true,
        }
    }

    let kind = if has_text || !(has_integer || has_decimal) {
        ValueKind::Text
    } else if has_decimal {
        ValueKind::Decimal
    } else {
        ValueKind::Integer
    };

    for value in values.iter_mut() {
        let widened = match (&*value, kind) {
            (Value::Integer(i), ValueKind::Decimal) => Some(Value::Decimal(*i as f64)),
            (Value::Integer(_) | Value::Decimal(_), ValueKind::Text) => {
                Some(Value::Text(value.to_string()))
            }
            _ => None,
        };
        if let Some(widened) = widened {
            *value = widened;
        }
    }

    Column {
        name,
        kind,
        nullable,
    }
}

fn build_record_set(names: Vec<String>, rows: &[SqliteRow]) -> Result<RecordSet, QueryError> {
    let mut cells: Vec<Vec<Value>> = rows
        .iter()
        .map(|row| {
            (0..names.len())
                .map(|i| read_value(row, i))
                .collect::<Result<Vec<Value>, sqlx::Error>>()
        })
        .collect::<Result<_, _>>()?;

    let mut columns = Vec::with_capacity(names.len());
    for (index, name) in names.into_iter().enumerate() {
        let mut column_values: Vec<Value> = cells
            .iter_mut()
            .map(|row| std::mem::replace(&mut row[index], Value::Null))
            .collect();
        columns.push(infer_column(name, &mut column_values));
        for (row, value) in cells.iter_mut().zip(column_values) {
            row[index] = value;
        }
    }

    // Result sets may repeat a column name (e.g. a join); keep them apart.
    let mut seen: Vec<String> = Vec::with_capacity(columns.len());
    for column in columns.iter_mut() {
        let base = column.name.clone();
        let mut suffix = 1;
        while seen.contains(&column.name) {
            column.name = format!("{base}_{suffix}");
            suffix += 1;
        }
        seen.push(column.name.clone());
    }

    let schema = Schema::new(columns).map_err(|e| QueryError::Malformed {
        statement: String::new(),
        reason: e.to_string(),
    })?;
    RecordSet::from_records(schema, cells.into_iter().map(Record::new).collect()).map_err(|e| {
        QueryError::Malformed {
            statement: String::new(),
            reason: e.to_string(),
        }
    })
}
