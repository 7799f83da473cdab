//! Pipeline driver.
//!
//! Sequences extraction, transformation, the two sinks and the post-load queries
//! for one run. Every completed stage leaves one entry in the progress log; the
//! first error stops the run.

use std::path::PathBuf;

use log::{error, info};
use scraper::Html;

use crate::app::{FileProgressLog, ProgressLog};
use crate::config::{LiteralValue, PipelineConfig, Source};
use crate::error_handling::{
    ConfigError, EtlError, InitializationError, PipelineError, SchemaMismatchError,
};
use crate::export::{append_literal_rows, open_store, write_file, write_store};
use crate::fetch::{fetch_html, read_html_file};
use crate::initialization::init_client;
use crate::models::{format_decimal, Record, RecordSet, Schema, Value};
use crate::parse::{extract_csv_file, extract_table, locator_from_config, TableSpec};
use crate::storage::Store;
use crate::transform::{transform, ExchangeRates};

use super::Stage;

/// One post-load query and the rows it returned.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub statement: String,
    pub result: RecordSet,
}

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Rows that survived extraction
    pub rows_extracted: usize,
    /// Rows inserted into the store, literal append rows included
    pub rows_written: u64,
    /// Flat file that was written
    pub csv_path: PathBuf,
    /// Store table that was written
    pub table: String,
    /// Post-load queries, in configuration order
    pub queries: Vec<QueryOutcome>,
}

/// Runs one pipeline configuration.
///
/// `run` consumes the driver, so a finished run cannot be restarted.
pub struct PipelineDriver {
    config: PipelineConfig,
    progress: Box<dyn ProgressLog>,
    current: Stage,
    last_completed: Stage,
}

impl PipelineDriver {
    /// Driver that writes progress entries to the configured log file.
    pub fn new(config: PipelineConfig) -> Self {
        let progress = Box::new(FileProgressLog::new(config.log_file.clone()));
        Self::with_progress_log(config, progress)
    }

    pub fn with_progress_log(config: PipelineConfig, progress: Box<dyn ProgressLog>) -> Self {
        Self {
            config,
            progress,
            current: Stage::Idle,
            last_completed: Stage::Idle,
        }
    }

    /// Runs every stage in order.
    ///
    /// The store, if it was opened, is closed whether the run succeeds or fails.
    ///
    /// # Errors
    ///
    /// Returns the first component error together with the last completed stage.
    pub async fn run(mut self) -> Result<RunReport, PipelineError> {
        self.progress.log_progress(Stage::Idle.completion_message());

        let mut store = None;
        let result = self.execute(&mut store).await;

        let result = match result {
            Ok(report) => {
                self.current = Stage::Done;
                self.progress.log_progress(Stage::Done.completion_message());
                info!(
                    "Pipeline complete: {} rows extracted, {} rows written to {}",
                    report.rows_extracted, report.rows_written, report.table
                );
                Ok(report)
            }
            Err(source) => {
                self.current = Stage::Failed;
                let message = format!("Pipeline failed after {}: {source}", self.last_completed);
                error!("{message}");
                self.progress.log_progress(&message);
                Err(PipelineError {
                    last_completed: self.last_completed,
                    source,
                })
            }
        };

        if let Some(store) = store.take() {
            store.close().await;
            self.progress.log_progress("Server Connection closed");
        }
        result
    }

    async fn execute(&mut self, store_slot: &mut Option<Store>) -> Result<RunReport, EtlError> {
        self.config.validate()?;

        self.advance();
        let records = self.extract().await?;
        let rows_extracted = records.len();
        info!(
            "Extracted {rows_extracted} rows from {}",
            self.config.source.describe()
        );
        self.complete();

        self.advance();
        let rates = match &self.config.exchange_rates {
            Some(path) => Some(ExchangeRates::load(path)?),
            None => None,
        };
        let records = transform(records, &self.config.transform, rates.as_ref())?;
        self.complete();

        self.advance();
        write_file(&records, &self.config.output_csv)?;
        self.complete();

        self.advance();
        let table = self.config.table_name.as_str();
        let extra = literal_rows(&self.config.append_rows, records.schema(), table)?;
        let store = store_slot.insert(open_store(&self.config.db_path, table).await?);
        self.progress.log_progress("SQL Connection initiated");
        let mut rows_written =
            write_store(&records, store, table, self.config.store_mode).await?;
        if let Some(extra) = extra {
            rows_written += append_literal_rows(&extra, store, table, rows_written).await?;
            info!("Appended {} literal rows to {table}", extra.len());
        }
        self.complete();

        self.advance();
        let mut queries = Vec::with_capacity(self.config.queries.len());
        for statement in &self.config.queries {
            let result = store.run_query(statement).await?;
            self.progress
                .log_progress(&format!("Executed query: {statement}"));
            queries.push(QueryOutcome {
                statement: statement.clone(),
                result,
            });
        }
        self.complete();

        Ok(RunReport {
            rows_extracted,
            rows_written,
            csv_path: self.config.output_csv.clone(),
            table: self.config.table_name.clone(),
            queries,
        })
    }

    async fn extract(&self) -> Result<RecordSet, EtlError> {
        let spec = TableSpec::from_config(&self.config);
        match &self.config.source {
            Source::CsvFile { path } => Ok(extract_csv_file(path, &spec)?),
            Source::HtmlFile { path } => {
                let html = read_html_file(path)?;
                self.extract_html(&html, &spec)
            }
            Source::Url { url } => {
                let client = init_client(self.config.timeout_seconds, &self.config.user_agent)
                    .map_err(InitializationError::from)?;
                let html = fetch_html(&client, url).await?;
                self.extract_html(&html, &spec)
            }
        }
    }

    fn extract_html(&self, html: &str, spec: &TableSpec) -> Result<RecordSet, EtlError> {
        let locator = self
            .config
            .locator
            .as_ref()
            .map(locator_from_config)
            .ok_or_else(|| ConfigError::Invalid("HTML sources need a table locator".into()))?;
        let document = Html::parse_document(html);
        Ok(extract_table(&document, locator.as_ref(), spec)?)
    }

    fn advance(&mut self) {
        self.current = self.current.next();
        log::debug!("Entering stage {}", self.current);
    }

    fn complete(&mut self) {
        self.progress
            .log_progress(self.current.completion_message());
        self.last_completed = self.current;
    }
}

/// Builds the configured literal rows against the transformed schema.
fn literal_rows(
    rows: &[Vec<LiteralValue>],
    schema: &Schema,
    table: &str,
) -> Result<Option<RecordSet>, SchemaMismatchError> {
    if rows.is_empty() {
        return Ok(None);
    }

    let mut records = RecordSet::new(schema.clone());
    for row in rows {
        let values: Option<Vec<Value>> = if row.len() == schema.len() {
            row.iter()
                .zip(schema.columns())
                .map(|(literal, column)| literal.to_value(column.kind))
                .collect()
        } else {
            None
        };
        let values = values.ok_or_else(|| SchemaMismatchError {
            table: Some(table.to_string()),
            expected: schema
                .columns()
                .iter()
                .map(|c| format!("{} {}", c.name, c.kind))
                .collect(),
            found: row.iter().map(describe_literal).collect(),
        })?;
        records.push(Record::new(values))?;
    }
    Ok(Some(records))
}

fn describe_literal(literal: &LiteralValue) -> String {
    match literal {
        LiteralValue::Integer(i) => format!("{i} INTEGER"),
        LiteralValue::Decimal(d) => format!("{} REAL", format_decimal(*d)),
        LiteralValue::Text(s) => format!("{s:?} TEXT"),
    }
}

/// Runs a pipeline with progress entries going to `config.log_file`.
pub async fn run_pipeline(config: PipelineConfig) -> Result<RunReport, PipelineError> {
    PipelineDriver::new(config).run().await
}
