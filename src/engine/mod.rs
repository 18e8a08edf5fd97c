// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Portfolio valuation: date axis, price alignment and conversion, ledger
//! replay and NAV composition.

pub mod axis;
pub mod fx;
pub mod holdings;
pub mod nav;
pub mod positions;
pub mod series;

use crate::config::ValuationConfig;
use crate::error::ValuationError;
use crate::models::{
    FxSeries, LatestSnapshot, NavPoint, NavSummary, Position, PriceSeries, SymbolConversion,
    Transaction, Warning, WarningKind,
};
use axis::DateAxis;
use chrono::NaiveDate;
use fx::Converter;
use nav::{Anchor, PricedSymbol};
use rayon::prelude::*;
use rust_decimal::Decimal;
use series::AlignedSeries;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Normalized market inputs, independent of where they were fetched from.
#[derive(Debug, Clone, Default)]
pub struct MarketData {
    /// Local-currency closes keyed by symbol.
    pub prices: BTreeMap<String, PriceSeries>,
    /// Local units per reporting unit, keyed by local currency.
    pub fx: BTreeMap<String, FxSeries>,
}

#[derive(Debug, Clone)]
pub struct Valuation {
    pub reporting_currency: String,
    pub starting_cash: Decimal,
    pub axis: DateAxis,
    pub points: Vec<NavPoint>,
    pub anchor: Anchor,
    pub conversions: Vec<SymbolConversion>,
    pub positions: Vec<Position>,
    pub warnings: Vec<Warning>,
}

impl Valuation {
    pub fn inception(&self) -> Option<NaiveDate> {
        self.anchor.inception()
    }

    pub fn latest(&self) -> &NavPoint {
        // The axis is never empty, so neither are the points.
        &self.points[self.points.len() - 1]
    }

    pub fn degraded_symbols(&self) -> Vec<String> {
        self.conversions
            .iter()
            .filter(|c| c.status.is_degraded())
            .map(|c| c.symbol.clone())
            .collect()
    }

    pub fn add_warnings(&mut self, warnings: impl IntoIterator<Item = Warning>) {
        self.warnings.extend(warnings);
    }

    pub fn summary(&self) -> NavSummary {
        NavSummary {
            reporting_currency: self.reporting_currency.clone(),
            starting_cash: self.starting_cash,
            inception_date: self.inception(),
            latest: LatestSnapshot::from(self.latest()),
            fx_degraded_symbols: self.degraded_symbols(),
            warnings: self.warnings.clone(),
        }
    }
}

/// Runs one full valuation pass. Deterministic for identical inputs.
pub fn value_portfolio(
    config: &ValuationConfig,
    ledger: &[Transaction],
    market: &MarketData,
) -> Result<Valuation, ValuationError> {
    let axis = DateAxis::from_series(market.prices.values())?;
    info!(
        dates = axis.len(),
        symbols = market.prices.len(),
        transactions = ledger.len(),
        first = %axis.first(),
        last = %axis.last(),
        "building valuation"
    );

    let converter = Converter::new(config, &market.fx, &axis);
    let mut warnings = Vec::new();

    let inputs: Vec<(&String, &PriceSeries)> = market.prices.iter().collect();
    let priced: Vec<PricedSymbol> = inputs
        .par_iter()
        .map(|(symbol, series)| {
            let currency = config.currency_of(symbol).to_string();
            let aligned = AlignedSeries::align(series, &axis);
            let converted = converter.to_reporting(&aligned, &currency);
            PricedSymbol {
                symbol: (*symbol).clone(),
                currency,
                converted,
            }
        })
        .collect();

    let ledger_symbols: BTreeSet<&str> = ledger.iter().map(|tx| tx.symbol.as_str()).collect();
    for symbol in &ledger_symbols {
        if !market.prices.contains_key(*symbol) {
            let detail = format!("{} has transactions but no price series; valued at 0", symbol);
            warn!("{}", detail);
            warnings.push(Warning::new(WarningKind::MissingPrices, detail));
        }
    }

    let all_symbols: BTreeSet<&str> = market
        .prices
        .keys()
        .map(String::as_str)
        .chain(ledger_symbols.iter().copied())
        .collect();
    let conversions: Vec<SymbolConversion> = all_symbols
        .into_iter()
        .map(|symbol| {
            let currency = config.currency_of(symbol);
            SymbolConversion {
                symbol: symbol.to_string(),
                currency: currency.to_string(),
                status: converter.status_for(currency),
            }
        })
        .collect();
    for c in conversions.iter().filter(|c| c.status.is_degraded()) {
        let detail = format!(
            "no {}{} FX series; {} values left in {}",
            config.reporting_currency, c.currency, c.symbol, c.currency
        );
        warn!("{}", detail);
        warnings.push(Warning::new(WarningKind::DegradedConversion, detail));
    }

    let fx_degraded = conversions.iter().any(|c| c.status.is_degraded());

    let acc = holdings::accumulate(ledger, &axis, &converter)?;
    let comp = nav::compose(&axis, &priced, &acc, config.starting_cash, fx_degraded)?;
    let positions =
        positions::summarize(&acc.fills, &priced, |s| config.currency_of(s).to_string());

    warnings.extend(acc.warnings);
    warnings.extend(comp.warnings);

    Ok(Valuation {
        reporting_currency: config.reporting_currency.clone(),
        starting_cash: config.starting_cash,
        axis,
        points: comp.points,
        anchor: comp.anchor,
        conversions,
        positions,
        warnings,
    })
}
