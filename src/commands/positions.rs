// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::run_valuation;
use crate::utils::{fmt_opt, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let valuation = run_valuation(m)?;
    let positions = &valuation.positions;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), positions)? {
        return Ok(());
    }

    let rows = positions
        .iter()
        .map(|p| {
            vec![
                p.symbol.clone(),
                p.currency.clone(),
                p.buy_date.to_string(),
                format!("{:.4}", p.quantity),
                format!("{:.2}", p.cost_reporting),
                fmt_opt(p.last_price, 2),
                fmt_opt(p.market_value, 2),
                fmt_opt(p.unrealized_pnl, 2),
                p.conversion.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Ticker", "CCY", "First Buy", "Qty", "Cost", "Price", "Value", "P&L", "FX"],
            rows
        )
    );
    Ok(())
}
