// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Adapters that turn provider exports into normalized series and ledgers.

pub mod ledger;
pub mod quotes;

use crate::config::ValuationConfig;
use crate::engine::MarketData;
use crate::models::{FxSeries, PriceSeries, Warning};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// A parsed value plus the rows that had to be skipped on the way.
#[derive(Debug, Clone, Default)]
pub struct Loaded<T> {
    pub value: T,
    pub warnings: Vec<Warning>,
}

/// Field name (lower-cased) to raw cell text; empty cells are absent.
pub type RawRow = HashMap<String, String>;

#[derive(Debug, Clone, Default)]
pub struct RawRows {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

pub(crate) fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

pub(crate) fn read_csv_rows(path: &Path) -> Result<RawRows> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path.display()))?;
    let columns: Vec<String> = rdr
        .headers()
        .with_context(|| format!("Read CSV header {}", path.display()))?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let rec = result.with_context(|| format!("Read CSV {}", path.display()))?;
        let row: RawRow = columns
            .iter()
            .zip(rec.iter())
            .map(|(k, v)| (k.clone(), v.trim().to_string()))
            .filter(|(_, v)| !v.is_empty())
            .collect();
        rows.push(row);
    }
    Ok(RawRows { columns, rows })
}

pub(crate) fn json_cell(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        other => Some(other.to_string()),
    }
}

pub(crate) fn read_json_rows(path: &Path) -> Result<RawRows> {
    let text = fs::read_to_string(path).with_context(|| format!("Read {}", path.display()))?;
    let doc: Value =
        serde_json::from_str(&text).with_context(|| format!("Parse JSON {}", path.display()))?;
    let items = doc
        .as_array()
        .ok_or_else(|| anyhow!("{} must hold a JSON array", path.display()))?;
    let mut columns = BTreeSet::new();
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        let mut row = RawRow::new();
        if let Some(obj) = item.as_object() {
            for (k, v) in obj {
                let key = k.trim().to_lowercase();
                columns.insert(key.clone());
                if let Some(cell) = json_cell(v) {
                    row.insert(key, cell);
                }
            }
        }
        rows.push(row);
    }
    Ok(RawRows {
        columns: columns.into_iter().collect(),
        rows,
    })
}

/// Anything that can hand the engine normalized price and FX series.
pub trait PriceSource {
    fn price_series(&self, symbol: &str) -> Result<Option<Loaded<PriceSeries>>>;

    /// Series of `local` units per one `reporting` unit.
    fn fx_series(&self, reporting: &str, local: &str) -> Result<Option<Loaded<FxSeries>>>;
}

/// Series already held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub prices: BTreeMap<String, PriceSeries>,
    pub fx: BTreeMap<String, FxSeries>,
}

impl PriceSource for MemorySource {
    fn price_series(&self, symbol: &str) -> Result<Option<Loaded<PriceSeries>>> {
        Ok(self.prices.get(symbol).cloned().map(|value| Loaded {
            value,
            warnings: Vec::new(),
        }))
    }

    fn fx_series(&self, _reporting: &str, local: &str) -> Result<Option<Loaded<FxSeries>>> {
        Ok(self.fx.get(local).cloned().map(|value| Loaded {
            value,
            warnings: Vec::new(),
        }))
    }
}

/// Collects price series for `symbols` and an FX series for every non
/// reporting currency among them. Missing series are left out; the engine
/// reports them.
pub fn gather_market(
    source: &dyn PriceSource,
    config: &ValuationConfig,
    symbols: &BTreeSet<String>,
) -> Result<Loaded<MarketData>> {
    let mut market = MarketData::default();
    let mut warnings = Vec::new();

    for symbol in symbols {
        if let Some(loaded) = source.price_series(symbol)? {
            debug!(%symbol, rows = loaded.value.len(), "loaded price series");
            warnings.extend(loaded.warnings);
            market.prices.insert(symbol.clone(), loaded.value);
        }
    }

    let foreign: BTreeSet<&str> = symbols
        .iter()
        .map(|s| config.currency_of(s))
        .filter(|ccy| *ccy != config.reporting_currency)
        .collect();
    for ccy in foreign {
        if let Some(loaded) = source.fx_series(&config.reporting_currency, ccy)? {
            debug!(currency = %ccy, rows = loaded.value.len(), "loaded FX series");
            warnings.extend(loaded.warnings);
            market.fx.insert(ccy.to_string(), loaded.value);
        }
    }

    info!(
        priced = market.prices.len(),
        requested = symbols.len(),
        fx = market.fx.len(),
        "gathered market data"
    );
    Ok(Loaded {
        value: market,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PriceSeries;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn gathers_prices_and_needed_fx_only() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut source = MemorySource::default();
        source
            .prices
            .insert("AAPL".into(), PriceSeries::from_pairs([(date, dec!(190))]));
        source
            .prices
            .insert("TCS.NS".into(), PriceSeries::from_pairs([(date, dec!(3800))]));
        source
            .fx
            .insert("INR".into(), PriceSeries::from_pairs([(date, dec!(83))]));
        source
            .fx
            .insert("EUR".into(), PriceSeries::from_pairs([(date, dec!(0.9))]));

        let cfg = ValuationConfig::new("USD", dec!(1000)).unwrap();
        let symbols: BTreeSet<String> = ["AAPL", "TCS.NS", "GONE"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let loaded = gather_market(&source, &cfg, &symbols).unwrap();
        assert_eq!(loaded.value.prices.len(), 2);
        assert_eq!(loaded.value.fx.keys().collect::<Vec<_>>(), vec!["INR"]);
    }
}
