// Pipeline driver tests.

use super::*;
use crate::app::ProgressLog;
use crate::config::PipelineConfig;
use crate::error_handling::{EtlError, ExtractionError, SinkError, SinkKind, TransformError};
use crate::models::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct MemoryLog(Arc<Mutex<Vec<String>>>);

impl ProgressLog for MemoryLog {
    fn log_progress(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

impl MemoryLog {
    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

const BANKS_HTML: &str = r#"<html><body>
<h2>By market capitalization</h2>
<table>
  <tr><th>Rank</th><th>Bank name</th><th>Market cap (US$ billion)</th></tr>
  <tr><td>1</td><td><span class="flag"></span><a href="/jpm">JPMorgan Chase</a></td><td>432.92
</td></tr>
  <tr><td>2</td><td><span class="flag"></span><a href="/boa">Bank of America</a></td><td>231.52
</td></tr>
  <tr><td>3</td><td><span class="flag"></span><a href="/icbc">Industrial and Commercial Bank of China</a></td><td>194.56
</td></tr>
</table>
</body></html>"#;

fn write_fixture(dir: &Path) {
    std::fs::write(dir.join("banks.html"), BANKS_HTML).unwrap();
    std::fs::write(
        dir.join("exchange_rate.csv"),
        "Currency,Rate\nEUR,0.93\nGBP,0.8\nINR,82.95\n",
    )
    .unwrap();
}

fn banks_config(dir: &Path, extra: &str) -> PipelineConfig {
    let text = format!(
        r#"
        table_name = "Largest_banks"
        output_csv = "{dir}/Largest_banks_data.csv"
        db_path = "{dir}/Banks.db"
        log_file = "{dir}/code_log.txt"
        exchange_rates = "{dir}/exchange_rate.csv"
        skip_rows = 1
        locator = {{ heading = "By market capitalization" }}
        queries = [
            "SELECT * FROM Largest_banks",
            "SELECT AVG(MC_GBP_Billion) FROM Largest_banks",
            "SELECT Name FROM Largest_banks LIMIT 5",
        ]
        {extra}

        [source]
        kind = "html_file"
        path = "{dir}/banks.html"

        [[columns]]
        name = "Name"
        cell = 1
        rule = {{ child = 1 }}

        [[columns]]
        name = "MC_USD_Billion"
        cell = 2
        rule = "first_line"

        [[transform]]
        step = "numeric"
        column = "MC_USD_Billion"

        [[transform]]
        step = "convert_currency"
        source = "MC_USD_Billion"
        target = "MC_GBP_Billion"
        currency = "GBP"
        "#,
        dir = dir.display()
    );
    PipelineConfig::from_toml_str(&text).unwrap()
}

#[tokio::test]
async fn test_run_banks_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let log = MemoryLog::default();

    let driver =
        PipelineDriver::with_progress_log(banks_config(dir.path(), ""), Box::new(log.clone()));
    let report = driver.run().await.unwrap();

    assert_eq!(report.rows_extracted, 3);
    assert_eq!(report.rows_written, 3);
    assert_eq!(report.table, "Largest_banks");
    assert_eq!(report.queries.len(), 3);

    let all = &report.queries[0].result;
    assert_eq!(
        all.schema().names(),
        vec!["Name", "MC_USD_Billion", "MC_GBP_Billion"]
    );
    assert_eq!(
        all.records()[0].values(),
        &[
            Value::Text("JPMorgan Chase".into()),
            Value::Decimal(432.92),
            Value::Decimal(346.34),
        ]
    );

    let csv = std::fs::read_to_string(&report.csv_path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some(",Name,MC_USD_Billion,MC_GBP_Billion")
    );
    assert_eq!(lines.next(), Some("0,JPMorgan Chase,432.92,346.34"));

    assert_eq!(
        log.entries(),
        vec![
            "Preliminaries complete. Initiating ETL process",
            "Data extraction complete. Initiating Transformation process",
            "Data transformation complete. Initiating Loading process",
            "Data saved to CSV file",
            "SQL Connection initiated",
            "Data loaded to Database as a table, Executing queries",
            "Executed query: SELECT * FROM Largest_banks",
            "Executed query: SELECT AVG(MC_GBP_Billion) FROM Largest_banks",
            "Executed query: SELECT Name FROM Largest_banks LIMIT 5",
            "Queries successfully executed",
            "Process Complete",
            "Server Connection closed",
        ]
    );
}

#[tokio::test]
async fn test_missing_rate_fails_after_extraction() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    std::fs::write(dir.path().join("exchange_rate.csv"), "Currency,Rate\nEUR,0.93\n").unwrap();
    let log = MemoryLog::default();

    let config = banks_config(dir.path(), "");
    let csv_path = config.output_csv.clone();
    let err = PipelineDriver::with_progress_log(config, Box::new(log.clone()))
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.last_completed, Stage::Extracting);
    assert!(matches!(
        err.source,
        EtlError::Transform(TransformError::MissingAuxiliaryKey { ref key }) if key == "GBP"
    ));
    assert!(!csv_path.exists());

    let entries = log.entries();
    let last = entries.last().unwrap();
    assert!(last.starts_with("Pipeline failed after Extracting: Missing auxiliary key: GBP"));
}

#[tokio::test]
async fn test_wrong_locator_fails_before_any_stage() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let log = MemoryLog::default();

    let mut config = banks_config(dir.path(), "");
    config.locator = Some(crate::config::LocatorConfig::Index(5));
    let err = PipelineDriver::with_progress_log(config, Box::new(log.clone()))
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.last_completed, Stage::Idle);
    assert!(matches!(
        err.source,
        EtlError::Extraction(ExtractionError::TableNotFound { tables_found: 1, .. })
    ));
    assert!(err.to_string().starts_with("Pipeline failed after stage Idle"));
    assert_eq!(log.entries().len(), 2);
}

#[tokio::test]
async fn test_bad_query_fails_after_store_load_and_closes_store() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let log = MemoryLog::default();

    let mut config = banks_config(dir.path(), "");
    config.queries = vec!["SELECT * FROM nowhere".into()];
    let err = PipelineDriver::with_progress_log(config, Box::new(log.clone()))
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.last_completed, Stage::LoadingStore);
    assert!(matches!(err.source, EtlError::Query(_)));
    assert_eq!(log.entries().last().unwrap(), "Server Connection closed");
}

#[tokio::test]
async fn test_literal_rows_are_appended() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let config = banks_config(
        dir.path(),
        r#"append_rows = [["Test Bank", 1, 0.8]]"#,
    );
    let report = PipelineDriver::with_progress_log(config, Box::new(MemoryLog::default()))
        .run()
        .await
        .unwrap();

    assert_eq!(report.rows_extracted, 3);
    assert_eq!(report.rows_written, 4);
    let all = &report.queries[0].result;
    assert_eq!(all.len(), 4);
    assert_eq!(
        all.records()[3].values(),
        &[
            Value::Text("Test Bank".into()),
            Value::Decimal(1.0),
            Value::Decimal(0.8),
        ]
    );

    // The flat file only holds the extracted rows.
    let csv = std::fs::read_to_string(&report.csv_path).unwrap();
    assert_eq!(csv.lines().count(), 4);
}

#[tokio::test]
async fn test_literal_row_with_wrong_shape_is_schema_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());

    let config = banks_config(dir.path(), r#"append_rows = [["Test Bank", "n/a"]]"#);
    let err = PipelineDriver::with_progress_log(config, Box::new(MemoryLog::default()))
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.last_completed, Stage::LoadingFile);
    assert!(matches!(err.source, EtlError::SchemaMismatch(_)));
    // Literal rows are checked before the store is opened.
    assert!(!dir.path().join("Banks.db").exists());
}

#[tokio::test]
async fn test_store_open_failure_is_partial_write() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let log = MemoryLog::default();

    let mut config = banks_config(dir.path(), "");
    config.db_path = dir.path().join("missing").join("Banks.db");
    let csv_path = config.output_csv.clone();
    let err = PipelineDriver::with_progress_log(config, Box::new(log.clone()))
        .run()
        .await
        .unwrap_err();

    assert_eq!(err.last_completed, Stage::LoadingFile);
    assert!(matches!(
        err.source,
        EtlError::Sink(SinkError::PartialWrite {
            succeeded: SinkKind::File,
            ..
        })
    ));
    assert!(csv_path.exists());
    let entries = log.entries();
    assert!(entries
        .last()
        .unwrap()
        .starts_with("Pipeline failed after Loading(File): Partial write (file sink written)"));
    assert!(!entries.iter().any(|e| e == "SQL Connection initiated"));
}

#[tokio::test]
async fn test_run_pipeline_writes_progress_file() {
    let dir = tempfile::tempdir().unwrap();
    write_fixture(dir.path());
    let config = banks_config(dir.path(), "");
    let log_path = config.log_file.clone();

    run_pipeline(config).await.unwrap();

    let content = std::fs::read_to_string(log_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 12);
    for line in lines {
        let (timestamp, _) = line.split_once(',').unwrap();
        assert_eq!(timestamp.split('-').count(), 4);
    }
}
