//! CSV loading for the dashboard datasets.
//!
//! Every dashboard needs several files before it can draw anything. The
//! `read_*` functions take the whole set of paths and fail as a unit: if any
//! file is unreadable or malformed, nothing is returned.

use crate::record::{ContinentRow, TradeRow, WaterRow};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed CSV in {name}: {source}")]
    Csv {
        name: String,
        #[source]
        source: csv::Error,
    },
}

/// Parse CSV text with a header row into typed records.
pub fn parse_csv<T: DeserializeOwned>(name: &str, text: &str) -> Result<Vec<T>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .flexible(false)
        .from_reader(text.as_bytes());

    reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| LoadError::Csv {
            name: name.to_string(),
            source,
        })
}

/// Water access rows merged with GDP rows; both files share one layout.
pub fn load_water(water_csv: &str, gdp_csv: &str) -> Result<Vec<WaterRow>, LoadError> {
    let mut rows: Vec<WaterRow> = parse_csv("water", water_csv)?;
    rows.extend(parse_csv::<WaterRow>("gdp", gdp_csv)?);
    let rows = drop_yearless(rows, |r| r.year.is_some(), |r| r.country.as_str());
    tracing::info!(rows = rows.len(), "water data loaded");
    Ok(rows)
}

pub fn load_trade(trade_csv: &str) -> Result<Vec<TradeRow>, LoadError> {
    let rows: Vec<TradeRow> = parse_csv("trade", trade_csv)?;
    let rows = drop_yearless(rows, |r| r.year.is_some(), |r| r.country.as_str());
    tracing::info!(rows = rows.len(), "trade data loaded");
    Ok(rows)
}

pub fn load_continents(continents_csv: &str) -> Result<Vec<ContinentRow>, LoadError> {
    let rows: Vec<ContinentRow> = parse_csv("continents", continents_csv)?;
    tracing::info!(rows = rows.len(), "continent data loaded");
    Ok(rows)
}

fn drop_yearless<T>(rows: Vec<T>, has_year: impl Fn(&T) -> bool, name: impl Fn(&T) -> &str) -> Vec<T> {
    rows.into_iter()
        .filter(|row| {
            let keep = has_year(row);
            if !keep {
                tracing::debug!(country = name(row), "skipping row without a numeric year");
            }
            keep
        })
        .collect()
}

/// Read a set of files, all or nothing.
pub fn read_all<const N: usize>(paths: [&Path; N]) -> Result<[String; N], LoadError> {
    let mut texts: [String; N] = std::array::from_fn(|_| String::new());
    for (slot, path) in texts.iter_mut().zip(paths) {
        *slot = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(texts)
}

/// Load the three water dashboard files.
pub fn read_water(
    water: &Path,
    gdp: &Path,
    continents: &Path,
) -> Result<(Vec<WaterRow>, Vec<ContinentRow>), LoadError> {
    let [water, gdp, continents] = read_all([water, gdp, continents])?;
    Ok((load_water(&water, &gdp)?, load_continents(&continents)?))
}

/// Load the two trade dashboard files.
pub fn read_trade(
    trade: &Path,
    continents: &Path,
) -> Result<(Vec<TradeRow>, Vec<ContinentRow>), LoadError> {
    let [trade, continents] = read_all([trade, continents])?;
    Ok((load_trade(&trade)?, load_continents(&continents)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_water_merges_files() {
        let water = "Year,Country,Identifier,Value\n2012,A,Rural,80\n2012,A,Urban,90\n";
        let gdp = "Year,Country,Identifier,Value\n2012,A,GDP,100\n";
        let rows = load_water(water, gdp).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].identifier, "GDP");
    }

    #[test]
    fn test_load_skips_rows_without_year() {
        let trade = "Year,Commodity,Country,Flow,Quantity\n2012,Tin,A,Import,5\n,Tin,B,Import,3\n";
        let rows = load_trade(trade).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].country, "A");
    }

    #[test]
    fn test_missing_column_is_error() {
        let err = load_continents("Country\nFrance\n").unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }));
        assert!(err.to_string().contains("continents"));
    }

    #[test]
    fn test_read_all_fails_as_unit() {
        let missing = Path::new("/nonexistent/dashsvg/continents.csv");
        let err = read_trade(Path::new("Cargo.toml"), missing).unwrap_err();
        match err {
            LoadError::Io { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {}", other),
        }
    }
}
