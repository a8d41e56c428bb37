//! Row types read from the dashboard CSV files.

use serde::{Deserialize, Deserializer};
use std::fmt;

/// A nesting key: years are numeric, everything else is text.
///
/// Numbers sort before text, so a table keyed by year iterates
/// chronologically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Num(i64),
    Text(String),
}

impl Key {
    pub fn as_num(&self) -> Option<i64> {
        match self {
            Key::Num(n) => Some(*n),
            Key::Text(_) => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Num(n) => write!(f, "{}", n),
            Key::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Num(n)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Text(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Text(s)
    }
}

/// One indicator value for a country and year (water and GDP files).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WaterRow {
    #[serde(rename = "Year", deserialize_with = "lenient_year")]
    pub year: Option<i64>,
    #[serde(rename = "Country")]
    pub country: String,
    /// GDP, Rural, Urban or Total.
    #[serde(rename = "Identifier")]
    pub identifier: String,
    #[serde(rename = "Value", deserialize_with = "lenient_number")]
    pub value: f64,
}

/// One trade flow of a commodity for a country and year.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TradeRow {
    #[serde(rename = "Year", deserialize_with = "lenient_year")]
    pub year: Option<i64>,
    #[serde(rename = "Commodity")]
    pub commodity: String,
    #[serde(rename = "Country")]
    pub country: String,
    /// Import or Export.
    #[serde(rename = "Flow")]
    pub flow: String,
    #[serde(rename = "Quantity", deserialize_with = "lenient_number")]
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContinentRow {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Continent")]
    pub continent: String,
}

/// Text that does not parse as a number becomes NaN and is dropped later
/// by the nester, never rejected here.
fn lenient_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    Ok(trimmed.parse::<f64>().unwrap_or(f64::NAN))
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Some(n));
    }
    // "2012.0" style years from spreadsheet exports
    Ok(trimmed
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64))
}
