//! Shared test helpers for storage module tests.

use crate::models::{Column, Record, RecordSet, Schema, Value, ValueKind};
use crate::storage::Store;

/// Opens an in-memory store.
pub async fn create_test_store() -> Store {
    Store::open_in_memory()
        .await
        .expect("Failed to open in-memory store")
}

/// Bank-shaped record set: `Name` (text) and `MC_USD_Billion` (decimal).
pub fn bank_records(rows: &[(&str, f64)]) -> RecordSet {
    let schema = Schema::new(vec![
        Column::new("Name", ValueKind::Text),
        Column::new("MC_USD_Billion", ValueKind::Decimal),
    ])
    .expect("valid schema");
    RecordSet::from_records(
        schema,
        rows.iter()
            .map(|(name, mc)| Record::new(vec![Value::Text(name.to_string()), Value::Decimal(*mc)]))
            .collect(),
    )
    .expect("records match schema")
}

/// Names of the `Name` column, in row order.
pub fn names(set: &RecordSet) -> Vec<String> {
    set.column_values("Name")
        .expect("Name column")
        .into_iter()
        .map(|v| v.to_string())
        .collect()
}
