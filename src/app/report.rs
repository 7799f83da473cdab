//! Terminal rendering of query results and run summaries.

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use crate::models::RecordSet;
use crate::run::RunReport;

/// Renders a record set as a table, one header cell per column.
pub fn render_record_set(records: &RecordSet) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            records
                .schema()
                .columns()
                .iter()
                .map(|c| {
                    Cell::new(&c.name)
                        .fg(Color::Cyan)
                        .add_attribute(comfy_table::Attribute::Bold)
                })
                .collect::<Vec<_>>(),
        );
    for record in records.records() {
        table.add_row(record.values().iter().map(|v| Cell::new(v.to_string())));
    }
    table.to_string()
}

/// Prints every query with its result, then a one-line summary.
pub fn print_report(report: &RunReport) {
    for outcome in &report.queries {
        println!("{}", outcome.statement);
        println!("{}", render_record_set(&outcome.result));
    }
    println!(
        "{} rows extracted, {} rows written to table {} and {}",
        report.rows_extracted,
        report.rows_written,
        report.table,
        report.csv_path.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, Record, Schema, Value, ValueKind};

    #[test]
    fn test_render_record_set() {
        let schema = Schema::new(vec![
            Column::new("Name", ValueKind::Text),
            Column::new("MC_EUR_Billion", ValueKind::Decimal),
        ])
        .unwrap();
        let set = RecordSet::from_records(
            schema,
            vec![Record::new(vec![
                Value::Text("JPMorgan Chase".into()),
                Value::Decimal(402.62),
            ])],
        )
        .unwrap();

        let rendered = render_record_set(&set);
        assert!(rendered.contains("MC_EUR_Billion"));
        assert!(rendered.contains("JPMorgan Chase"));
        assert!(rendered.contains("402.62"));
    }
}
