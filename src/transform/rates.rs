//! Exchange-rate reference table.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error_handling::TransformError;

#[derive(Debug, Deserialize)]
struct RateRow {
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Rate")]
    rate: f64,
}

/// Currency code → rate against the source currency. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExchangeRates {
    rates: HashMap<String, f64>,
}

impl ExchangeRates {
    /// Loads a `Currency,Rate` CSV file.
    pub fn load(path: &Path) -> Result<Self, TransformError> {
        let file = std::fs::File::open(path).map_err(|e| TransformError::AuxiliaryLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_reader(file).map_err(|reason| TransformError::AuxiliaryLoad {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn from_reader<R: Read>(reader: R) -> Result<Self, String> {
        let mut reader = csv::Reader::from_reader(reader);
        let mut rates = HashMap::new();
        for row in reader.deserialize::<RateRow>() {
            let row = row.map_err(|e| e.to_string())?;
            rates.insert(row.currency.trim().to_string(), row.rate);
        }
        log::debug!("Loaded {} exchange rates", rates.len());
        Ok(Self { rates })
    }

    /// Rate for a currency code; a missing code is an error, never a default.
    pub fn rate(&self, currency: &str) -> Result<f64, TransformError> {
        self.rates
            .get(currency)
            .copied()
            .ok_or_else(|| TransformError::MissingAuxiliaryKey {
                key: currency.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ExchangeRates {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
