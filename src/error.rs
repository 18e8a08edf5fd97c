// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Conditions under which no valuation can be produced at all.
#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("no price data for any symbol; the date axis is empty")]
    NoPriceData,

    #[error("ledger is missing required field '{0}'")]
    MissingField(String),

    #[error("no {currency} FX rate on or before {date} to convert {symbol}")]
    MissingFxRate {
        symbol: String,
        currency: String,
        date: NaiveDate,
    },

    #[error("cannot derive quantity for {symbol} on {date} from reporting price {price}")]
    UnsizeableTransaction {
        symbol: String,
        date: NaiveDate,
        price: Decimal,
    },

    #[error("value of {symbol} on {date} is outside the representable decimal range")]
    ArithmeticOverflow { symbol: String, date: NaiveDate },

    #[error("invalid currency code '{0}', expected three upper-case letters")]
    InvalidCurrency(String),

    #[error("starting cash must be non-negative, got {0}")]
    NegativeStartingCash(Decimal),
}
