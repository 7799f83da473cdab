//! Command-line options.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::types::{LogFormat, LogLevel};

/// Scrape a table, transform it, and load it into CSV and SQLite.
#[derive(Debug, Parser)]
#[command(name = "table_etl", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value = "plain", global = true)]
    pub log_format: LogFormat,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the pipeline described by a TOML config file
    Run {
        /// Pipeline config file
        config: PathBuf,
    },
    /// Run read-only SQL statements against a database
    Query {
        /// SQLite database file
        #[arg(long)]
        db_path: PathBuf,

        /// Statements to run, in order
        #[arg(required = true)]
        statements: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from(["table_etl", "run", "demos/banks.toml"]);
        assert!(matches!(cli.command, Command::Run { ref config } if config == &PathBuf::from("demos/banks.toml")));
        assert!(matches!(cli.log_level, LogLevel::Info));
        assert!(matches!(cli.log_format, LogFormat::Plain));
    }

    #[test]
    fn test_parse_query_with_global_flags() {
        let cli = Cli::parse_from([
            "table_etl",
            "query",
            "--db-path",
            "Banks.db",
            "SELECT * FROM Largest_banks",
            "SELECT COUNT(*) FROM Largest_banks",
            "--log-format",
            "json",
        ]);
        match cli.command {
            Command::Query {
                db_path,
                statements,
            } => {
                assert_eq!(db_path, PathBuf::from("Banks.db"));
                assert_eq!(statements.len(), 2);
            }
            other => panic!("expected query, got {other:?}"),
        }
        assert!(matches!(cli.log_format, LogFormat::Json));
    }

    #[test]
    fn test_query_requires_statement() {
        assert!(Cli::try_parse_from(["table_etl", "query", "--db-path", "x.db"]).is_err());
    }
}
