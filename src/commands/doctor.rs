// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{RunInputs, load_inputs};
use crate::sources::PriceSource;
use crate::utils::pretty_table;
use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let inputs = load_inputs(m)?;
    let rows = diagnose(&inputs)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// One `[issue, detail]` row per problem found in the inputs.
pub fn diagnose(inputs: &RunInputs) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let cfg = &inputs.config;

    // 1) Rows the loader had to skip
    for w in &inputs.warnings {
        rows.push(vec!["malformed_row".into(), w.detail.clone()]);
    }

    // 2) Symbols without any quotes, and first quote date per symbol
    let mut first_quote: BTreeMap<&str, Option<NaiveDate>> = BTreeMap::new();
    for symbol in &inputs.symbols {
        let first = match inputs.quotes.price_series(symbol)? {
            Some(loaded) => {
                for w in loaded.warnings {
                    rows.push(vec!["bad_quote_row".into(), w.detail]);
                }
                loaded.value.first_date()
            }
            None => None,
        };
        if first.is_none() {
            rows.push(vec!["missing_quotes".into(), symbol.clone()]);
        }
        first_quote.insert(symbol.as_str(), first);
    }

    // 3) FX coverage per foreign currency
    let mut fx_start: BTreeMap<String, Option<NaiveDate>> = BTreeMap::new();
    for symbol in &inputs.symbols {
        let ccy = cfg.currency_of(symbol).to_string();
        if ccy == cfg.reporting_currency || fx_start.contains_key(&ccy) {
            continue;
        }
        let start = inputs
            .quotes
            .fx_series(&cfg.reporting_currency, &ccy)?
            .and_then(|loaded| loaded.value.first_date());
        if start.is_none() {
            rows.push(vec![
                "missing_fx".into(),
                format!("{}{} (values stay in {})", cfg.reporting_currency, ccy, ccy),
            ]);
        }
        fx_start.insert(ccy, start);
    }

    // 4) Ledger rows outside quote or FX history
    for tx in &inputs.ledger {
        if let Some(Some(first)) = first_quote.get(tx.symbol.as_str()) {
            if tx.date < *first {
                rows.push(vec![
                    "predates_quotes".into(),
                    format!("{} {} (quotes start {})", tx.date, tx.symbol, first),
                ]);
            }
        }
        let ccy = cfg.currency_of(&tx.symbol);
        if let Some(Some(start)) = fx_start.get(ccy) {
            if tx.date < *start {
                rows.push(vec![
                    "fx_gap".into(),
                    format!("{} {} (FX starts {})", tx.date, tx.symbol, start),
                ]);
            }
        }
    }

    Ok(rows)
}
