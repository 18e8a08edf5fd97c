// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// Closing prices for one symbol in its local currency, ascending by date
/// with at most one observation per date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

/// Local-currency units per one unit of the reporting currency.
pub type FxSeries = PriceSeries;

impl PriceSeries {
    /// Sorts the input and keeps the last observation for a repeated date.
    pub fn new(points: impl IntoIterator<Item = PricePoint>) -> Self {
        let by_date: BTreeMap<NaiveDate, Decimal> =
            points.into_iter().map(|p| (p.date, p.close)).collect();
        Self {
            points: by_date
                .into_iter()
                .map(|(date, close)| PricePoint { date, close })
                .collect(),
        }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (NaiveDate, Decimal)>) -> Self {
        Self::new(pairs.into_iter().map(|(date, close)| PricePoint { date, close }))
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Closest observation on or before `date`.
    pub fn value_on_or_before(&self, date: NaiveDate) -> Option<Decimal> {
        let idx = self.points.partition_point(|p| p.date <= date);
        idx.checked_sub(1).map(|i| self.points[i].close)
    }
}

/// How a ledger row states its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Size {
    /// Signed quantity: positive buys, negative sells.
    Units(Decimal),
    /// Amount deployed in the reporting currency; quantity is derived from
    /// the converted price on the transaction date.
    Notional(Decimal),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub symbol: String,
    pub size: Size,
    pub price_local: Decimal,
}

impl Transaction {
    pub fn units(date: NaiveDate, symbol: &str, quantity: Decimal, price_local: Decimal) -> Self {
        Self {
            date,
            symbol: symbol.to_string(),
            size: Size::Units(quantity),
            price_local,
        }
    }

    pub fn notional(date: NaiveDate, symbol: &str, amount: Decimal, price_local: Decimal) -> Self {
        Self {
            date,
            symbol: symbol.to_string(),
            size: Size::Notional(amount),
            price_local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStatus {
    /// Symbol already trades in the reporting currency.
    Native,
    /// Converted through an FX series.
    Converted,
    /// No FX series; local values used as-is.
    Unconverted,
}

impl ConversionStatus {
    pub fn is_degraded(self) -> bool {
        matches!(self, ConversionStatus::Unconverted)
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConversionStatus::Native => "native",
            ConversionStatus::Converted => "converted",
            ConversionStatus::Unconverted => "unconverted",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolConversion {
    pub symbol: String,
    pub currency: String,
    pub status: ConversionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavPoint {
    pub date: NaiveDate,
    pub nav: Decimal,
    pub cash: Decimal,
    pub holdings_value: Decimal,
    pub invested: Decimal,
    pub nav_index: Option<Decimal>,
    pub pnl_abs: Option<Decimal>,
    pub pnl_pct: Option<Decimal>,
    /// Set on every point when any symbol in the run lacks an FX series.
    pub fx_degraded: bool,
    /// A holding value or invested amount on this date is an unconverted
    /// local value.
    pub unconverted_holdings: bool,
    /// Some held symbol had no reporting price yet and contributed nothing.
    pub unpriced: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestSnapshot {
    pub date: NaiveDate,
    pub nav: Decimal,
    pub cash: Decimal,
    pub holdings_value: Decimal,
    pub invested: Decimal,
    pub pnl_abs: Option<Decimal>,
    pub pnl_pct: Option<Decimal>,
}

impl From<&NavPoint> for LatestSnapshot {
    fn from(p: &NavPoint) -> Self {
        Self {
            date: p.date,
            nav: p.nav,
            cash: p.cash,
            holdings_value: p.holdings_value,
            invested: p.invested,
            pnl_abs: p.pnl_abs,
            pnl_pct: p.pnl_pct,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavSummary {
    pub reporting_currency: String,
    pub starting_cash: Decimal,
    pub inception_date: Option<NaiveDate>,
    pub latest: LatestSnapshot,
    pub fx_degraded_symbols: Vec<String>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Position {
    pub symbol: String,
    pub currency: String,
    pub buy_date: NaiveDate,
    pub buy_price_local: Decimal,
    pub buy_price_reporting: Decimal,
    pub quantity: Decimal,
    pub cost_local: Decimal,
    pub cost_reporting: Decimal,
    pub last_price: Option<Decimal>,
    pub market_value: Option<Decimal>,
    pub unrealized_pnl: Option<Decimal>,
    pub conversion: ConversionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    MalformedRow,
    DuplicateDate,
    DegradedConversion,
    MissingPrices,
    ClippedTransaction,
    LateTransaction,
    UndefinedIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub detail: String,
}

impl Warning {
    pub fn new(kind: WarningKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.detail)
    }
}
