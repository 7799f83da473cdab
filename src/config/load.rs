//! Loading and validating pipeline configuration files.

use std::collections::HashSet;
use std::path::Path;

use crate::config::types::{PipelineConfig, Source, TransformStep};
use crate::error_handling::ConfigError;

impl PipelineConfig {
    /// Reads and validates a TOML pipeline configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parses and validates a TOML pipeline configuration.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the constraints serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns.is_empty() {
            return Err(ConfigError::Invalid("at least one column is required".into()));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if column.name.trim().is_empty() {
                return Err(ConfigError::Invalid("column names must not be empty".into()));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate column name: {}",
                    column.name
                )));
            }
        }

        if self.table_name.trim().is_empty() {
            return Err(ConfigError::Invalid("table_name must not be empty".into()));
        }

        if self.source.is_html() && self.locator.is_none() {
            return Err(ConfigError::Invalid(
                "HTML sources need a table locator".into(),
            ));
        }

        if let Source::Url { url } = &self.source {
            let parsed = url::Url::parse(url)
                .map_err(|e| ConfigError::Invalid(format!("invalid source url {url:?}: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(format!(
                    "unsupported url scheme {:?}, expected http or https",
                    parsed.scheme()
                )));
            }
        }

        let converts_currency = self
            .transform
            .iter()
            .any(|step| matches!(step, TransformStep::ConvertCurrency { .. }));
        if converts_currency && self.exchange_rates.is_none() {
            return Err(ConfigError::Invalid(
                "convert_currency steps need an exchange_rates file".into(),
            ));
        }

        Ok(())
    }
}
