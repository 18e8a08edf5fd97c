// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::axis::DateAxis;
use super::series::AlignedSeries;
use crate::config::ValuationConfig;
use crate::error::ValuationError;
use crate::models::{ConversionStatus, FxSeries};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Local price divided by local-units-per-reporting-unit. Every conversion
/// in the engine goes through here.
fn convert_point(local: Decimal, fx: Decimal) -> Option<Decimal> {
    local.checked_div(fx)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedSeries {
    pub prices: AlignedSeries,
    pub status: ConversionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointConversion {
    pub price: Decimal,
    pub status: ConversionStatus,
}

/// Converts local-currency prices into the reporting currency, both as
/// whole axis-aligned series and as single transaction-date prices.
pub struct Converter<'a> {
    config: &'a ValuationConfig,
    fx: &'a BTreeMap<String, FxSeries>,
    aligned_fx: BTreeMap<String, AlignedSeries>,
}

impl<'a> Converter<'a> {
    /// `fx` is keyed by local currency code.
    pub fn new(
        config: &'a ValuationConfig,
        fx: &'a BTreeMap<String, FxSeries>,
        axis: &DateAxis,
    ) -> Self {
        let aligned_fx = fx
            .iter()
            .filter(|(_, series)| !series.is_empty())
            .map(|(ccy, series)| (ccy.clone(), AlignedSeries::align(series, axis)))
            .collect();
        Self {
            config,
            fx,
            aligned_fx,
        }
    }

    pub fn reporting_currency(&self) -> &str {
        &self.config.reporting_currency
    }

    pub fn currency_of(&self, symbol: &str) -> &str {
        self.config.currency_of(symbol)
    }

    pub fn status_for(&self, currency: &str) -> ConversionStatus {
        if currency == self.config.reporting_currency {
            ConversionStatus::Native
        } else if self.aligned_fx.contains_key(currency) {
            ConversionStatus::Converted
        } else {
            ConversionStatus::Unconverted
        }
    }

    pub fn to_reporting(&self, aligned: &AlignedSeries, local_currency: &str) -> ConvertedSeries {
        let status = self.status_for(local_currency);
        let prices = match (status, self.aligned_fx.get(local_currency)) {
            (ConversionStatus::Converted, Some(fx)) => aligned.zip_with(fx, convert_point),
            _ => aligned.clone(),
        };
        ConvertedSeries { prices, status }
    }

    pub fn tx_price_to_reporting(
        &self,
        symbol: &str,
        price_local: Decimal,
        date: NaiveDate,
    ) -> Result<PointConversion, ValuationError> {
        let currency = self.currency_of(symbol);
        let status = self.status_for(currency);
        if status != ConversionStatus::Converted {
            return Ok(PointConversion {
                price: price_local,
                status,
            });
        }
        let missing = || ValuationError::MissingFxRate {
            symbol: symbol.to_string(),
            currency: currency.to_string(),
            date,
        };
        let rate = self
            .fx
            .get(currency)
            .and_then(|series| series.value_on_or_before(date))
            .ok_or_else(missing)?;
        let price = convert_point(price_local, rate).ok_or_else(missing)?;
        Ok(PointConversion { price, status })
    }
}
