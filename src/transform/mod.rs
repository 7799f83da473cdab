//! Record transformation.
//!
//! Applies the configured `TransformStep`s to a record set. Transformation is a
//! pure function of its inputs: same rows in, same bytes out, no I/O.
//!
//! Derived values are rounded to two places with round-half-to-even applied to
//! `x * 100` in f64, which reproduces numpy's `round(x, 2)` exactly.

mod rates;

pub use rates::ExchangeRates;

use crate::config::{TransformStep, DECIMAL_PLACES, THOUSANDS_SEPARATOR};
use crate::error_handling::TransformError;
use crate::models::{Column, Record, RecordSet, Schema, Value, ValueKind};

/// Parses a numeric string after stripping thousands separators and whitespace.
///
/// Returns `None` for anything that is not a finite number.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != THOUSANDS_SEPARATOR && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Rounds to `DECIMAL_PLACES` with ties going to the even neighbour.
pub fn round_decimal(value: f64) -> f64 {
    let scale = 10f64.powi(DECIMAL_PLACES);
    (value * scale).round_ties_even() / scale
}

/// Applies transform steps, in order, with optional exchange rates.
pub struct RecordTransformer<'a> {
    steps: &'a [TransformStep],
    rates: Option<&'a ExchangeRates>,
}

impl<'a> RecordTransformer<'a> {
    pub fn new(steps: &'a [TransformStep], rates: Option<&'a ExchangeRates>) -> Self {
        Self { steps, rates }
    }

    /// Transforms a record set. Row count and order never change.
    ///
    /// # Errors
    ///
    /// - `UnknownColumn` if a step names a column the set lacks
    /// - `NonNumeric` if a source value does not parse
    /// - `MissingAuxiliaryKey` if a currency has no rate (or no rate table was given)
    pub fn transform(&self, records: RecordSet) -> Result<RecordSet, TransformError> {
        let (schema, rows) = records.into_parts();
        let mut columns = schema.columns().to_vec();
        let mut rows = rows;

        for step in self.steps {
            self.apply(step, &mut columns, &mut rows)?;
        }

        let schema = Schema::new(columns)?;
        Ok(RecordSet::from_records(schema, rows)?)
    }

    fn apply(
        &self,
        step: &TransformStep,
        columns: &mut Vec<Column>,
        rows: &mut [Record],
    ) -> Result<(), TransformError> {
        let (source, target, factor, round) = match step {
            TransformStep::Numeric { column } => (column, column, 1.0, false),
            TransformStep::Scale {
                source,
                target,
                factor,
            } => (source, target, *factor, true),
            TransformStep::ConvertCurrency {
                source,
                target,
                currency,
            } => {
                let rate = self
                    .rates
                    .ok_or_else(|| TransformError::MissingAuxiliaryKey {
                        key: currency.clone(),
                    })?
                    .rate(currency)?;
                (source, target, rate, true)
            }
        };

        let source_index = columns
            .iter()
            .position(|c| &c.name == source)
            .ok_or_else(|| TransformError::UnknownColumn(source.clone()))?;
        let target_index = columns.iter().position(|c| &c.name == target);

        let mut derived = Vec::with_capacity(rows.len());
        for (row_number, row) in rows.iter().enumerate() {
            let value = numeric_value(row.get(source_index), source, row_number)?;
            let value = value * factor;
            derived.push(if round { round_decimal(value) } else { value });
        }

        match target_index {
            Some(index) => {
                columns[index].kind = ValueKind::Decimal;
                for (row, value) in rows.iter_mut().zip(derived) {
                    row.set(index, Value::Decimal(value));
                }
            }
            None => {
                columns.push(Column::new(target.clone(), ValueKind::Decimal));
                for (row, value) in rows.iter_mut().zip(derived) {
                    row.push(Value::Decimal(value));
                }
            }
        }
        Ok(())
    }
}

fn numeric_value(value: Option<&Value>, column: &str, row: usize) -> Result<f64, TransformError> {
    let non_numeric = |text: String| TransformError::NonNumeric {
        column: column.to_string(),
        row,
        value: text,
    };
    match value {
        Some(Value::Text(text)) => parse_number(text).ok_or_else(|| non_numeric(text.clone())),
        Some(v) => v.as_f64().ok_or_else(|| non_numeric(v.to_string())),
        None => Err(non_numeric(String::new())),
    }
}

/// Convenience wrapper around `RecordTransformer`.
pub fn transform(
    records: RecordSet,
    steps: &[TransformStep],
    rates: Option<&ExchangeRates>,
) -> Result<RecordSet, TransformError> {
    RecordTransformer::new(steps, rates).transform(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_set(columns: &[&str], rows: &[&[&str]]) -> RecordSet {
        let schema = Schema::new(
            columns
                .iter()
                .map(|c| Column::new(*c, ValueKind::Text))
                .collect(),
        )
        .unwrap();
        RecordSet::from_records(
            schema,
            rows.iter()
                .map(|r| Record::new(r.iter().map(|v| Value::Text(v.to_string())).collect()))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_number_strips_separators() {
        assert_eq!(parse_number("1,234.00"), Some(1234.0));
        assert_eq!(parse_number(" 26,854,599 "), Some(26854599.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_round_decimal_half_even() {
        assert_eq!(round_decimal(1.234), 1.23);
        assert_eq!(round_decimal(0.125), 0.12);
        assert_eq!(round_decimal(0.375), 0.38);
        assert_eq!(round_decimal(80.0), 80.0);
    }

    #[test]
    fn test_scale_millions_to_billions_in_place() {
        let set = text_set(&["Country", "GDP_USD_billions"], &[&["X", "1,234.00"]]);
        let steps = vec![TransformStep::Scale {
            source: "GDP_USD_billions".into(),
            target: "GDP_USD_billions".into(),
            factor: 0.001,
        }];
        let out = transform(set, &steps, None).unwrap();
        assert_eq!(out.schema().names(), vec!["Country", "GDP_USD_billions"]);
        assert_eq!(out.schema().columns()[1].kind, ValueKind::Decimal);
        assert_eq!(out.records()[0].values()[1], Value::Decimal(1.23));
    }

    #[test]
    fn test_currency_conversion_adds_column() {
        let set = text_set(&["Name", "MC_USD_Billion"], &[&["Bank", "100"]]);
        let rates: ExchangeRates = [("GBP", 0.8)].into_iter().collect();
        let steps = vec![
            TransformStep::Numeric {
                column: "MC_USD_Billion".into(),
            },
            TransformStep::ConvertCurrency {
                source: "MC_USD_Billion".into(),
                target: "MC_GBP_Billion".into(),
                currency: "GBP".into(),
            },
        ];
        let out = transform(set, &steps, Some(&rates)).unwrap();
        assert_eq!(
            out.schema().names(),
            vec!["Name", "MC_USD_Billion", "MC_GBP_Billion"]
        );
        assert_eq!(
            out.records()[0].values(),
            &[
                Value::Text("Bank".into()),
                Value::Decimal(100.0),
                Value::Decimal(80.0)
            ]
        );
        assert_eq!(out.records()[0].values()[2].to_string(), "80.0");
    }

    #[test]
    fn test_missing_rate_fails() {
        let set = text_set(&["Name", "MC_USD_Billion"], &[&["Bank", "100"]]);
        let rates: ExchangeRates = [("GBP", 0.8)].into_iter().collect();
        let steps = vec![TransformStep::ConvertCurrency {
            source: "MC_USD_Billion".into(),
            target: "MC_EUR_Billion".into(),
            currency: "EUR".into(),
        }];
        let err = transform(set.clone(), &steps, Some(&rates)).unwrap_err();
        assert!(matches!(err, TransformError::MissingAuxiliaryKey { key } if key == "EUR"));

        let err = transform(set, &steps, None).unwrap_err();
        assert!(matches!(err, TransformError::MissingAuxiliaryKey { .. }));
    }

    #[test]
    fn test_non_numeric_fails() {
        let set = text_set(&["Country", "GDP"], &[&["X", "10"], &["Y", "n/a"]]);
        let steps = vec![TransformStep::Numeric {
            column: "GDP".into(),
        }];
        let err = transform(set, &steps, None).unwrap_err();
        match err {
            TransformError::NonNumeric { column, row, value } => {
                assert_eq!(column, "GDP");
                assert_eq!(row, 1);
                assert_eq!(value, "n/a");
            }
            other => panic!("expected NonNumeric, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_column_fails() {
        let set = text_set(&["Country"], &[&["X"]]);
        let steps = vec![TransformStep::Numeric {
            column: "GDP".into(),
        }];
        assert!(matches!(
            transform(set, &steps, None),
            Err(TransformError::UnknownColumn(c)) if c == "GDP"
        ));
    }

    #[test]
    fn test_transform_is_deterministic() {
        let set = text_set(
            &["Name", "MC_USD_Billion"],
            &[&["A", "432.92"], &["B", "231.52"], &["C", "1,000.005"]],
        );
        let rates: ExchangeRates = [("GBP", 0.8), ("EUR", 0.93), ("INR", 82.95)]
            .into_iter()
            .collect();
        let steps: Vec<TransformStep> = ["GBP", "EUR", "INR"]
            .iter()
            .map(|c| TransformStep::ConvertCurrency {
                source: "MC_USD_Billion".into(),
                target: format!("MC_{c}_Billion"),
                currency: (*c).into(),
            })
            .collect();

        let first = transform(set.clone(), &steps, Some(&rates)).unwrap();
        let second = transform(set, &steps, Some(&rates)).unwrap();
        assert_eq!(first, second);
        let render = |s: &RecordSet| -> Vec<String> {
            s.records()
                .iter()
                .flat_map(|r| r.values().iter().map(|v| v.to_string()))
                .collect()
        };
        assert_eq!(render(&first), render(&second));
        assert_eq!(first.len(), 3);
    }
}
