//! Currency codes, rate tables and conversion queries

use crate::core::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid currency code: {0:?}")]
pub struct CurrencyCodeError(pub String);

/// A three letter ISO 4217 style code, always stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn usd() -> Self {
        CurrencyCode("USD".to_string())
    }

    pub fn brl() -> Self {
        CurrencyCode("BRL".to_string())
    }
}

impl FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(CurrencyCode(trimmed.to_ascii_uppercase()))
        } else {
            Err(CurrencyCodeError(s.to_string()))
        }
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unvalidated rate data as returned by a provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatePayload {
    pub base: Option<String>,
    pub rates: Option<HashMap<String, f64>>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// Validated exchange rates where `1 base = rates[code] code`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, f64>,
    last_updated: Option<DateTime<Utc>>,
}

impl RateTable {
    /// Validates a candidate payload fetched for `requested`.
    ///
    /// The payload's own base code wins over `requested` when present. Any
    /// bad entry rejects the whole payload.
    pub fn from_payload(
        requested: &CurrencyCode,
        payload: RatePayload,
    ) -> Result<Self, ValidationError> {
        let raw_rates = match payload.rates {
            Some(rates) if !rates.is_empty() => rates,
            _ => return Err(ValidationError::MissingRates),
        };

        let base = match payload.base {
            Some(code) => code
                .parse()
                .map_err(|_| ValidationError::InvalidCurrencyCode(code))?,
            None => requested.clone(),
        };

        let mut rates = BTreeMap::new();
        for (key, rate) in raw_rates {
            let code: CurrencyCode = key
                .parse()
                .map_err(|_| ValidationError::InvalidCurrencyCode(key.clone()))?;
            if !rate.is_finite() || rate <= 0.0 {
                return Err(ValidationError::InvalidRate { code, rate });
            }
            // "BRL" and "brl" parse to the same code
            if rates.insert(code, rate).is_some() {
                return Err(ValidationError::InvalidCurrencyCode(key));
            }
        }

        Ok(RateTable {
            base,
            rates,
            last_updated: payload.last_updated,
        })
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn rate(&self, code: &CurrencyCode) -> Option<f64> {
        self.rates.get(code).copied()
    }

    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.rates.contains_key(code)
    }

    pub fn ensure_contains(&self, code: &CurrencyCode) -> Result<(), ValidationError> {
        if self.contains(code) {
            Ok(())
        } else {
            Err(ValidationError::MissingCurrency(code.clone()))
        }
    }

    pub fn currencies(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.rates.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, f64)> {
        self.rates.iter().map(|(code, rate)| (code, *rate))
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }
}

/// The user's current selections.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionQuery {
    pub source: CurrencyCode,
    pub target: CurrencyCode,
    pub multiplier: f64,
}

impl ConversionQuery {
    pub fn new(source: CurrencyCode, target: CurrencyCode) -> Self {
        Self {
            source,
            target,
            multiplier: 1.0,
        }
    }
}

impl Default for ConversionQuery {
    fn default() -> Self {
        Self::new(CurrencyCode::usd(), CurrencyCode::brl())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionResult {
    pub converted_value: f64,
    pub unit_rate: f64,
}

impl ConversionResult {
    /// Returns `None` when the query's target is not in the table.
    pub fn compute(table: &RateTable, query: &ConversionQuery) -> Option<Self> {
        let rate = table.rate(&query.target)?;
        Some(ConversionResult {
            converted_value: round2(query.multiplier * rate),
            unit_rate: rate,
        })
    }
}

/// Rounds half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        // Too large to carry cents anyway
        return value;
    }
    let rounded = scaled.round() / 100.0;
    // -0.0 would render as "-0.00"
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Parses multiplier text typed by the user.
///
/// Empty, non-numeric and non-finite input all read as `0`.
pub fn parse_multiplier(input: &str) -> f64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => {
            debug!(input = %input, "Multiplier is not a finite number, using 0");
            0.0
        }
    }
}
