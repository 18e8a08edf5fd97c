// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::holdings::Fill;
use super::nav::PricedSymbol;
use crate::models::{ConversionStatus, Position};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Per-symbol cost and latest mark, one row per symbol that appears in the
/// ledger. `fills` must be in replay order.
pub fn summarize(
    fills: &[Fill],
    priced: &[PricedSymbol],
    currency_of: impl Fn(&str) -> String,
) -> Vec<Position> {
    let mut by_symbol: BTreeMap<&str, Vec<&Fill>> = BTreeMap::new();
    for fill in fills {
        by_symbol.entry(fill.symbol.as_str()).or_default().push(fill);
    }

    by_symbol
        .into_iter()
        .filter_map(|(symbol, fills)| {
            let first = fills.first()?;
            let quantity: Decimal = fills.iter().map(|f| f.quantity).sum();
            let cost_local: Decimal = fills.iter().map(|f| f.quantity * f.price_local).sum();
            let cost_reporting: Decimal = fills.iter().map(|f| f.cost_reporting()).sum();
            let priced_entry = priced.iter().find(|p| p.symbol == symbol);
            let last_price = priced_entry.and_then(|p| p.converted.prices.last());
            let market_value = last_price.map(|px| (px * quantity).round_dp(2));
            let conversion = fills
                .iter()
                .map(|f| f.status)
                .find(|s| s.is_degraded())
                .unwrap_or(first.status);
            Some(Position {
                symbol: symbol.to_string(),
                currency: currency_of(symbol),
                buy_date: first.date,
                buy_price_local: first.price_local.round_dp(6),
                buy_price_reporting: first.price_reporting.round_dp(6),
                quantity: quantity.round_dp(6),
                cost_local: cost_local.round_dp(2),
                cost_reporting: cost_reporting.round_dp(2),
                last_price: last_price.map(|px| px.round_dp(6)),
                unrealized_pnl: market_value.map(|mv| (mv - cost_reporting).round_dp(2)),
                market_value,
                conversion,
            })
        })
        .collect()
}

impl Position {
    pub fn is_degraded(&self) -> bool {
        self.conversion == ConversionStatus::Unconverted
    }
}
