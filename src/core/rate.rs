//! Raw provider values and price normalization.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// A value returned by the rate provider for one monitor query.
///
/// The provider has changed its response shape across versions: a bare
/// number, a regionally formatted string, a single monitor record, or a map
/// of monitor identifiers to records, sometimes wrapped in an envelope
/// object. The untagged decode accepts any JSON document and
/// [`RawRate::normalize`] collapses it into a single price.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawRate {
    Number(f64),
    Text(String),
    Record(MonitorRecord),
    Mapping(BTreeMap<String, RawRate>),
    Other(serde_json::Value),
}

/// A monitor entry exposing its price directly. Extra provider fields
/// (last update, change, symbol) are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MonitorRecord {
    pub price: Box<RawRate>,
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("no price entry in provider response")]
    MissingPrice,
    #[error("unparseable price text: {0:?}")]
    BadFormat(String),
    #[error("price is not a finite number: {0}")]
    NotFinite(f64),
    #[error("unsupported value shape in provider response")]
    UnsupportedShape,
}

impl RawRate {
    /// Collapse a raw provider value into a price in bolivars.
    ///
    /// Numbers pass through unchanged, text is parsed from the provider's
    /// regional format, records yield their `price` field, and mappings are
    /// searched for a `price` entry directly or one level deep (iteration
    /// order decides ties between nested monitors).
    pub fn normalize(&self) -> Result<f64, NormalizeError> {
        match self {
            RawRate::Number(value) if value.is_finite() => Ok(*value),
            RawRate::Number(value) => Err(NormalizeError::NotFinite(*value)),
            RawRate::Text(text) => parse_regional(text),
            RawRate::Record(record) => record.price.normalize(),
            RawRate::Mapping(map) => map
                .get("price")
                .or_else(|| map.values().find_map(RawRate::price_entry))
                .ok_or(NormalizeError::MissingPrice)?
                .normalize(),
            RawRate::Other(_) => Err(NormalizeError::UnsupportedShape),
        }
    }

    /// Fallback variant of [`RawRate::normalize`]: any failure to interpret
    /// the value yields `0.0` instead of an error.
    pub fn normalize_or_zero(&self) -> f64 {
        self.normalize().unwrap_or(0.0)
    }

    /// Resolve a provider monitor identifier (`"bcv"`, `"binance"`) against
    /// this value: a direct mapping entry first, then one level of nested
    /// mappings, since some provider versions wrap the monitor map in an
    /// envelope object.
    pub fn lookup(&self, key: &str) -> Option<&RawRate> {
        let RawRate::Mapping(map) = self else {
            return None;
        };
        map.get(key).or_else(|| {
            map.values().find_map(|value| match value {
                RawRate::Mapping(inner) => inner.get(key),
                _ => None,
            })
        })
    }

    fn price_entry(&self) -> Option<&RawRate> {
        match self {
            RawRate::Record(record) => Some(&record.price),
            RawRate::Mapping(map) => map.get("price"),
            _ => None,
        }
    }
}

/// Parse a price in the provider's regional format: an optional `Bs.`
/// currency prefix, `.` as the thousands separator and `,` as the decimal
/// separator. Dotted-decimal strings (`"105.25"`) parse unchanged.
fn parse_regional(text: &str) -> Result<f64, NormalizeError> {
    let stripped = text.trim();
    let stripped = stripped.strip_prefix("Bs.").unwrap_or(stripped).trim();

    let canonical = if stripped.contains(',') {
        stripped.replace('.', "").replace(',', ".")
    } else {
        stripped.to_string()
    };

    canonical
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite())
        .ok_or_else(|| NormalizeError::BadFormat(text.to_string()))
}
