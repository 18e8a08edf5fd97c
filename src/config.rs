// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ValuationError;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

static CURRENCY_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());

pub const DEFAULT_REPORTING_CURRENCY: &str = "USD";
pub const DEFAULT_STARTING_CASH: &str = "10000000";

/// Exchange suffixes whose listings trade in a known currency.
pub const DEFAULT_SUFFIX_RULES: &[(&str, &str)] = &[(".NS", "INR"), (".BO", "INR")];

pub fn validate_currency(code: &str) -> Result<String, ValuationError> {
    let upper = code.trim().to_uppercase();
    if CURRENCY_CODE.is_match(&upper) {
        Ok(upper)
    } else {
        Err(ValuationError::InvalidCurrency(code.to_string()))
    }
}

/// Resolves a symbol to the currency it is quoted in.
///
/// Lookup order: explicit per-symbol override, longest matching suffix rule,
/// then the fallback (normally the reporting currency).
#[derive(Debug, Clone)]
pub struct CurrencyMap {
    overrides: BTreeMap<String, String>,
    suffixes: Vec<(String, String)>,
    fallback: String,
}

impl CurrencyMap {
    pub fn new(fallback: &str) -> Self {
        Self {
            overrides: BTreeMap::new(),
            suffixes: Vec::new(),
            fallback: fallback.to_string(),
        }
    }

    pub fn with_default_suffixes(fallback: &str) -> Self {
        let mut map = Self::new(fallback);
        for (suffix, ccy) in DEFAULT_SUFFIX_RULES {
            map.suffixes.push((suffix.to_string(), ccy.to_string()));
        }
        map
    }

    pub fn set_symbol(&mut self, symbol: &str, currency: &str) -> Result<(), ValuationError> {
        let ccy = validate_currency(currency)?;
        self.overrides.insert(symbol.trim().to_uppercase(), ccy);
        Ok(())
    }

    pub fn add_suffix(&mut self, suffix: &str, currency: &str) -> Result<(), ValuationError> {
        let ccy = validate_currency(currency)?;
        let suffix = suffix.trim().to_uppercase();
        self.suffixes.retain(|(s, _)| s != &suffix);
        self.suffixes.push((suffix, ccy));
        Ok(())
    }

    pub fn currency_of(&self, symbol: &str) -> &str {
        let upper = symbol.to_uppercase();
        if let Some(ccy) = self.overrides.get(&upper) {
            return ccy;
        }
        self.suffixes
            .iter()
            .filter(|(suffix, _)| upper.ends_with(suffix.as_str()))
            .max_by_key(|(suffix, _)| suffix.len())
            .map(|(_, ccy)| ccy.as_str())
            .unwrap_or(&self.fallback)
    }
}

/// Everything that influences valuation semantics. Built explicitly by the
/// caller and passed into the engine.
#[derive(Debug, Clone)]
pub struct ValuationConfig {
    pub reporting_currency: String,
    pub starting_cash: Decimal,
    pub currencies: CurrencyMap,
}

impl ValuationConfig {
    pub fn new(reporting_currency: &str, starting_cash: Decimal) -> Result<Self, ValuationError> {
        let reporting_currency = validate_currency(reporting_currency)?;
        if starting_cash.is_sign_negative() && !starting_cash.is_zero() {
            return Err(ValuationError::NegativeStartingCash(starting_cash));
        }
        Ok(Self {
            currencies: CurrencyMap::with_default_suffixes(&reporting_currency),
            reporting_currency,
            starting_cash,
        })
    }

    pub fn with_currencies(mut self, currencies: CurrencyMap) -> Self {
        self.currencies = currencies;
        self
    }

    pub fn currency_of(&self, symbol: &str) -> &str {
        self.currencies.currency_of(symbol)
    }
}
