//! Record model shared by every pipeline stage.
//!
//! A `RecordSet` owns a `Schema` and a list of `Record`s. Every record pushed into
//! a set is checked against the schema, so a set is always homogeneous.

use std::fmt;

use serde::Deserialize;

use crate::error_handling::SchemaMismatchError;

/// Semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// UTF-8 text
    Text,
    /// 64-bit signed integer
    Integer,
    /// 64-bit float
    Decimal,
}

impl ValueKind {
    /// SQLite column type used when creating a table for this kind.
    pub fn sql_type(self) -> &'static str {
        match self {
            ValueKind::Text => "TEXT",
            ValueKind::Integer => "INTEGER",
            ValueKind::Decimal => "REAL",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_type())
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Decimal(f64),
    /// Only produced by query results
    Null,
}

impl Value {
    /// Kind of this value, `None` for `Null`.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Text(_) => Some(ValueKind::Text),
            Value::Integer(_) => Some(ValueKind::Integer),
            Value::Decimal(_) => Some(ValueKind::Decimal),
            Value::Null => None,
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Text view of the value, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Formats a decimal the way the flat-file sink writes it.
///
/// Shortest representation that round-trips, with a trailing `.0` for integral values
/// (`80.0`, `432.92`, `1.23`).
pub fn format_decimal(value: f64) -> String {
    format!("{value:?}")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Decimal(d) => f.write_str(&format_decimal(*d)),
            Value::Null => f.write_str("NULL"),
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ValueKind,
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            nullable: false,
        }
    }

    fn describe(&self) -> String {
        if self.nullable {
            format!("{} {} NULL", self.name, self.kind)
        } else {
            format!("{} {}", self.name, self.kind)
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match value.kind() {
            Some(kind) => kind == self.kind,
            None => self.nullable,
        }
    }
}

/// Ordered column list with unique names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Builds a schema, rejecting duplicate column names.
    pub fn new(columns: Vec<Column>) -> Result<Self, SchemaMismatchError> {
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(SchemaMismatchError {
                    table: None,
                    expected: vec!["unique column names".to_string()],
                    found: columns.iter().map(|c| c.name.clone()).collect(),
                });
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    fn descriptions(&self) -> Vec<String> {
        self.columns.iter().map(Column::describe).collect()
    }
}

/// One row, aligned with the schema of the set that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub(crate) fn set(&mut self, index: usize, value: Value) {
        self.values[index] = value;
    }

    pub(crate) fn push(&mut self, value: Value) {
        self.values.push(value);
    }
}

/// Ordered, schema-homogeneous rows for one table and one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSet {
    schema: Schema,
    records: Vec<Record>,
}

impl RecordSet {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            records: Vec::new(),
        }
    }

    /// Builds a set from rows, validating each one.
    pub fn from_records(schema: Schema, records: Vec<Record>) -> Result<Self, SchemaMismatchError> {
        let mut set = Self::new(schema);
        for record in records {
            set.push(record)?;
        }
        Ok(set)
    }

    /// Appends a record after checking its arity and value kinds.
    pub fn push(&mut self, record: Record) -> Result<(), SchemaMismatchError> {
        let fits = record.values.len() == self.schema.len()
            && self
                .schema
                .columns
                .iter()
                .zip(&record.values)
                .all(|(column, value)| column.accepts(value));
        if !fits {
            return Err(SchemaMismatchError {
                table: None,
                expected: self.schema.descriptions(),
                found: record
                    .values
                    .iter()
                    .map(|v| match v.kind() {
                        Some(kind) => format!("{v} {kind}"),
                        None => "NULL".to_string(),
                    })
                    .collect(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Values of one column, in row order.
    pub fn column_values(&self, name: &str) -> Option<Vec<&Value>> {
        let index = self.schema.index_of(name)?;
        Some(self.records.iter().map(|r| &r.values[index]).collect())
    }

    /// Splits the set into its parts; used by stages that rebuild the schema.
    pub(crate) fn into_parts(self) -> (Schema, Vec<Record>) {
        (self.schema, self.records)
    }
}
