// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod build;
pub mod doctor;
pub mod positions;

use crate::config::{CurrencyMap, ValuationConfig};
use crate::engine::{Valuation, value_portfolio};
use crate::models::{Transaction, Warning};
use crate::sources::gather_market;
use crate::sources::ledger::load_ledger;
use crate::sources::quotes::QuoteDir;
use crate::utils::{parse_decimal, parse_key_value};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Everything a command needs before valuation starts.
pub struct RunInputs {
    pub config: ValuationConfig,
    pub ledger: Vec<Transaction>,
    pub quotes: QuoteDir,
    pub symbols: BTreeSet<String>,
    pub warnings: Vec<Warning>,
}

fn many<'a>(m: &'a clap::ArgMatches, id: &str) -> impl Iterator<Item = &'a String> {
    m.get_many::<String>(id).into_iter().flatten()
}

pub fn config_from_args(m: &clap::ArgMatches) -> Result<ValuationConfig> {
    let base = m.get_one::<String>("base").unwrap().trim();
    let cash_raw = m.get_one::<String>("starting-cash").unwrap();
    let starting_cash = parse_decimal(cash_raw).context("Invalid --starting-cash")?;
    let config = ValuationConfig::new(base, starting_cash)?;

    let mut currencies = CurrencyMap::with_default_suffixes(&config.reporting_currency);
    for raw in many(m, "suffix") {
        let (suffix, ccy) = parse_key_value(raw)?;
        currencies.add_suffix(&suffix, &ccy)?;
    }
    for raw in many(m, "currency") {
        let (symbol, ccy) = parse_key_value(raw)?;
        currencies.set_symbol(&symbol, &ccy)?;
    }
    Ok(config.with_currencies(currencies))
}

pub fn load_inputs(m: &clap::ArgMatches) -> Result<RunInputs> {
    let config = config_from_args(m)?;
    let ledger_path = PathBuf::from(m.get_one::<String>("ledger").unwrap().trim());
    let quotes_dir = PathBuf::from(m.get_one::<String>("quotes").unwrap().trim());

    let mut quotes = QuoteDir::new(quotes_dir);
    for raw in many(m, "fx") {
        let (ccy, path) = parse_key_value(raw)?;
        quotes = quotes.with_fx_file(&ccy, path);
    }

    let loaded = load_ledger(&ledger_path, &config.reporting_currency)
        .with_context(|| format!("Load ledger {}", ledger_path.display()))?;
    let symbols: BTreeSet<String> = loaded
        .value
        .iter()
        .map(|tx| tx.symbol.clone())
        .chain(many(m, "symbol").map(|s| s.trim().to_string()))
        .filter(|s| !s.is_empty())
        .collect();

    Ok(RunInputs {
        config,
        ledger: loaded.value,
        quotes,
        symbols,
        warnings: loaded.warnings,
    })
}

pub fn run_valuation(m: &clap::ArgMatches) -> Result<Valuation> {
    let inputs = load_inputs(m)?;
    let market = gather_market(&inputs.quotes, &inputs.config, &inputs.symbols)?;
    let mut valuation = value_portfolio(&inputs.config, &inputs.ledger, &market.value)?;
    let mut warnings = inputs.warnings;
    warnings.extend(market.warnings);
    warnings.extend(std::mem::take(&mut valuation.warnings));
    valuation.add_warnings(warnings);
    Ok(valuation)
}
