//! HTML table row extraction.
//!
//! Walks the rows of a located table, pulls one cell per declared column and
//! drops every row that is incomplete. Values stay text; numeric interpretation
//! belongs to the transformer.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::config::{ColumnConfig, ExtractionRule, PipelineConfig};
use crate::error_handling::ExtractionError;
use crate::models::{Column, Record, RecordSet, Schema, Value, ValueKind};
use crate::parse::locator::TableLocator;
use crate::utils::{parse_selector_unsafe, parse_selector_with_fallback};

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("tr", "ROW_SELECTOR"));

/// Column, row-skip and sentinel settings for one table.
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub columns: Vec<ColumnConfig>,
    pub skip_rows: usize,
    pub sentinels: Vec<String>,
}

impl TableSpec {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            columns: config.columns.clone(),
            skip_rows: config.skip_rows,
            sentinels: config.sentinels.clone(),
        }
    }

    /// Cell index a column reads from.
    pub(crate) fn cell_index(&self, position: usize) -> usize {
        self.columns[position].cell.unwrap_or(position)
    }

    /// True when the value is empty or carries a "no data" marker.
    pub(crate) fn is_blank(&self, value: &str) -> bool {
        value.is_empty()
            || self
                .sentinels
                .iter()
                .any(|s| !s.is_empty() && value.contains(s.as_str()))
    }

    /// Schema with every column declared as the given kind.
    pub(crate) fn schema_with(
        &self,
        kind: impl Fn(&ColumnConfig) -> ValueKind,
    ) -> Result<Schema, ExtractionError> {
        Schema::new(
            self.columns
                .iter()
                .map(|c| Column::new(c.name.clone(), kind(c)))
                .collect(),
        )
        .map_err(|e| ExtractionError::MalformedRow {
            line: 0,
            reason: e.to_string(),
        })
    }
}

/// A column rule with its selector compiled once per extraction.
enum CompiledRule {
    Text,
    FirstLine,
    Nested(Selector),
    Child(usize),
}

impl CompiledRule {
    fn compile(column: &ColumnConfig) -> Self {
        match &column.rule {
            ExtractionRule::Text => CompiledRule::Text,
            ExtractionRule::FirstLine => CompiledRule::FirstLine,
            ExtractionRule::Nested(selector) => CompiledRule::Nested(
                parse_selector_with_fallback(selector, &format!("column {}", column.name)),
            ),
            ExtractionRule::Child(index) => CompiledRule::Child(*index),
        }
    }

    /// Applies the rule to a cell; `None` when the cell lacks the expected structure.
    fn apply(&self, cell: ElementRef<'_>) -> Option<String> {
        match self {
            CompiledRule::Text => Some(element_text(cell)),
            CompiledRule::FirstLine => cell
                .text()
                .find(|t| !t.trim().is_empty())
                .and_then(|t| t.trim_start().split('\n').next())
                .map(|line| line.trim().to_string()),
            CompiledRule::Nested(selector) => cell.select(selector).next().map(element_text),
            CompiledRule::Child(index) => cell
                .children()
                .filter_map(ElementRef::wrap)
                .nth(*index)
                .map(element_text),
        }
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Whether `row`'s closest enclosing table is `table` (rows of nested tables are skipped).
fn belongs_to(row: ElementRef<'_>, table: ElementRef<'_>) -> bool {
    row.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "table")
        .is_some_and(|owner| owner.id() == table.id())
}

/// Extracts one record per usable row of the located table.
///
/// # Errors
///
/// - `TableNotFound` if the locator does not match
/// - `NoRowsMatched` if every row was skipped or dropped
pub fn extract_table(
    document: &Html,
    locator: &dyn TableLocator,
    spec: &TableSpec,
) -> Result<RecordSet, ExtractionError> {
    let table = locator.locate(document)?;
    log::debug!("Located {}", locator.describe());

    let rules: Vec<CompiledRule> = spec.columns.iter().map(CompiledRule::compile).collect();
    let mut records = RecordSet::new(spec.schema_with(|_| ValueKind::Text)?);

    let rows: Vec<ElementRef<'_>> = table
        .select(&ROW_SELECTOR)
        .filter(|row| belongs_to(*row, table))
        .skip(spec.skip_rows)
        .collect();

    for (row_number, row) in rows.iter().enumerate() {
        let cells: Vec<ElementRef<'_>> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == "td")
            .collect();

        let mut values = Vec::with_capacity(rules.len());
        for (position, rule) in rules.iter().enumerate() {
            let value = cells
                .get(spec.cell_index(position))
                .and_then(|cell| rule.apply(*cell))
                .filter(|v| !spec.is_blank(v));
            match value {
                Some(v) => values.push(Value::Text(v)),
                None => break,
            }
        }

        if values.len() != rules.len() {
            log::debug!(
                "Dropping row {} (column {} missing, empty or no data)",
                row_number + spec.skip_rows,
                spec.columns[values.len()].name
            );
            continue;
        }

        records
            .push(Record::new(values))
            .map_err(|e| ExtractionError::MalformedRow {
                line: (row_number + spec.skip_rows) as u64,
                reason: e.to_string(),
            })?;
    }

    if records.is_empty() {
        return Err(ExtractionError::NoRowsMatched {
            rows_seen: rows.len(),
        });
    }

    log::debug!(
        "Kept {} of {} rows from {}",
        records.len(),
        rows.len(),
        locator.describe()
    );
    Ok(records)
}
