// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Loaded, PriceSource, is_csv, json_cell};
use crate::models::{FxSeries, PricePoint, PriceSeries, Warning, WarningKind};
use crate::utils::{parse_date, parse_decimal};
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

const EXTENSIONS: &[&str] = &["json", "csv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// Closing prices; zero is allowed.
    Close,
    /// Exchange rates; must be strictly positive.
    Rate,
}

/// Reads one `date, close` series. JSON holds an array of `{date, close}`
/// objects (or `[date, close]` pairs); CSV uses its first two columns.
pub fn load_series(path: &Path, kind: SeriesKind) -> Result<Loaded<PriceSeries>> {
    let label = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("series")
        .to_string();
    let cells = if is_csv(path) {
        csv_cells(path)?
    } else {
        json_cells(path)?
    };
    Ok(build_series(&label, cells, kind))
}

fn csv_cells(path: &Path) -> Result<Vec<(Option<String>, Option<String>)>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path.display()))?;
    let mut out = Vec::new();
    for result in rdr.records() {
        let rec = result.with_context(|| format!("Read CSV {}", path.display()))?;
        let cell = |i: usize| {
            rec.get(i)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        out.push((cell(0), cell(1)));
    }
    Ok(out)
}

fn json_cells(path: &Path) -> Result<Vec<(Option<String>, Option<String>)>> {
    let text = fs::read_to_string(path).with_context(|| format!("Read {}", path.display()))?;
    let doc: Value =
        serde_json::from_str(&text).with_context(|| format!("Parse JSON {}", path.display()))?;
    let items = doc
        .as_array()
        .ok_or_else(|| anyhow!("{} must hold a JSON array", path.display()))?;
    Ok(items
        .iter()
        .map(|item| match item {
            Value::Object(obj) => {
                let field = |name: &str| {
                    obj.iter()
                        .find(|(k, _)| k.eq_ignore_ascii_case(name))
                        .and_then(|(_, v)| json_cell(v))
                };
                (field("date"), field("close"))
            }
            Value::Array(pair) => (
                pair.first().and_then(json_cell),
                pair.get(1).and_then(json_cell),
            ),
            _ => (None, None),
        })
        .collect())
}

fn parse_point(
    date: Option<String>,
    close: Option<String>,
    kind: SeriesKind,
) -> Result<(NaiveDate, Decimal)> {
    let date = parse_date(&date.ok_or_else(|| anyhow!("date missing"))?)?;
    let close = parse_decimal(&close.ok_or_else(|| anyhow!("close missing"))?)?;
    let valid = match kind {
        SeriesKind::Close => !close.is_sign_negative() || close.is_zero(),
        SeriesKind::Rate => close > Decimal::ZERO,
    };
    if !valid {
        return Err(anyhow!("out of range value {}", close));
    }
    Ok((date, close))
}

fn build_series(
    label: &str,
    cells: Vec<(Option<String>, Option<String>)>,
    kind: SeriesKind,
) -> Loaded<PriceSeries> {
    let mut by_date: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    let mut warnings = Vec::new();
    for (idx, (date, close)) in cells.into_iter().enumerate() {
        match parse_point(date, close, kind) {
            Ok((date, close)) => match by_date.entry(date) {
                Entry::Vacant(e) => {
                    e.insert(close);
                }
                Entry::Occupied(mut e) => {
                    let detail = format!(
                        "{} row {}: repeated date {}, keeping the later row",
                        label,
                        idx + 1,
                        date
                    );
                    warn!("{}", detail);
                    warnings.push(Warning::new(WarningKind::DuplicateDate, detail));
                    e.insert(close);
                }
            },
            Err(e) => {
                let detail = format!("{} row {}: {}", label, idx + 1, e);
                warn!("{}", detail);
                warnings.push(Warning::new(WarningKind::MalformedRow, detail));
            }
        }
    }
    Loaded {
        value: PriceSeries::new(
            by_date
                .into_iter()
                .map(|(date, close)| PricePoint { date, close }),
        ),
        warnings,
    }
}

/// A directory of per-symbol exports: `<dir>/<SYMBOL>.json` or `.csv`, also
/// matching the sheet-tab style name with dots as underscores
/// (`COALINDIA.NS` -> `COALINDIA_NS`). FX series live next to them as
/// `<REPORTING><LOCAL>` (`USDINR`) unless mapped explicitly.
#[derive(Debug, Clone)]
pub struct QuoteDir {
    dir: PathBuf,
    fx_files: BTreeMap<String, PathBuf>,
}

impl QuoteDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            fx_files: BTreeMap::new(),
        }
    }

    pub fn with_fx_file(mut self, currency: &str, path: impl Into<PathBuf>) -> Self {
        self.fx_files.insert(currency.to_uppercase(), path.into());
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn find(&self, stem: &str) -> Option<PathBuf> {
        let tab = stem.to_uppercase().replace('.', "_");
        [stem.to_string(), tab]
            .iter()
            .flat_map(|s| EXTENSIONS.iter().map(move |ext| self.dir.join(format!("{}.{}", s, ext))))
            .find(|p| p.is_file())
    }

    pub fn fx_path(&self, reporting: &str, local: &str) -> Option<PathBuf> {
        match self.fx_files.get(&local.to_uppercase()) {
            Some(path) => Some(path.clone()),
            None => self.find(&format!("{}{}", reporting, local)),
        }
    }
}

impl PriceSource for QuoteDir {
    fn price_series(&self, symbol: &str) -> Result<Option<Loaded<PriceSeries>>> {
        match self.find(symbol) {
            Some(path) => load_series(&path, SeriesKind::Close)
                .with_context(|| format!("Load quotes for {}", symbol))
                .map(Some),
            None => Ok(None),
        }
    }

    fn fx_series(&self, reporting: &str, local: &str) -> Result<Option<Loaded<FxSeries>>> {
        match self.fx_path(reporting, local) {
            Some(path) => load_series(&path, SeriesKind::Rate)
                .with_context(|| format!("Load {}{} FX", reporting, local))
                .map(Some),
            None => Ok(None),
        }
    }
}
