// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::axis::DateAxis;
use super::fx::Converter;
use super::series::{Deltas, StepCurve};
use crate::error::ValuationError;
use crate::models::{ConversionStatus, Size, Transaction, Warning, WarningKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A ledger row after sizing and conversion at its own date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    pub date: NaiveDate,
    pub symbol: String,
    pub quantity: Decimal,
    pub price_local: Decimal,
    pub price_reporting: Decimal,
    pub status: ConversionStatus,
    /// Axis position the fill takes effect at; `None` when dated after the axis.
    pub axis_index: Option<usize>,
}

impl Fill {
    pub fn cost_reporting(&self) -> Decimal {
        self.quantity * self.price_reporting
    }
}

#[derive(Debug, Clone)]
pub struct Accumulation {
    pub holdings: BTreeMap<String, StepCurve>,
    pub invested: StepCurve,
    /// Fills in replay order (date ascending, ledger order on ties).
    pub fills: Vec<Fill>,
    /// First axis position whose invested capital includes an unconverted price.
    pub degraded_from: Option<usize>,
    pub warnings: Vec<Warning>,
}

/// Replays the ledger into per-symbol quantity curves and one invested
/// capital curve in the reporting currency.
pub fn accumulate(
    ledger: &[Transaction],
    axis: &DateAxis,
    converter: &Converter<'_>,
) -> Result<Accumulation, ValuationError> {
    let mut ordered: Vec<&Transaction> = ledger.iter().collect();
    ordered.sort_by_key(|tx| tx.date);

    let mut holding_deltas: BTreeMap<String, Deltas> = BTreeMap::new();
    let mut invested = Deltas::new(axis.len());
    let mut fills = Vec::with_capacity(ordered.len());
    let mut degraded_from: Option<usize> = None;
    let mut warnings = Vec::new();

    for tx in ordered {
        let conv = converter.tx_price_to_reporting(&tx.symbol, tx.price_local, tx.date)?;
        let quantity = match tx.size {
            Size::Units(q) => q,
            Size::Notional(amount) => {
                let sized = if conv.price > Decimal::ZERO {
                    amount.checked_div(conv.price)
                } else {
                    None
                };
                sized.ok_or_else(|| ValuationError::UnsizeableTransaction {
                    symbol: tx.symbol.clone(),
                    date: tx.date,
                    price: conv.price,
                })?
            }
        };
        let cost = quantity
            .checked_mul(conv.price)
            .ok_or_else(|| ValuationError::ArithmeticOverflow {
                symbol: tx.symbol.clone(),
                date: tx.date,
            })?;

        if tx.date < axis.first() {
            let detail = format!(
                "{} on {} predates price history; applied at {}",
                tx.symbol,
                tx.date,
                axis.first()
            );
            warn!("{}", detail);
            warnings.push(Warning::new(WarningKind::ClippedTransaction, detail));
        }

        let axis_index = axis.index_on_or_after(tx.date);
        let deltas = holding_deltas
            .entry(tx.symbol.clone())
            .or_insert_with(|| Deltas::new(axis.len()));
        match axis_index {
            Some(idx) => {
                deltas.add(idx, quantity);
                invested.add(idx, cost);
                if conv.status.is_degraded() {
                    degraded_from = Some(degraded_from.map_or(idx, |cur| cur.min(idx)));
                }
            }
            None => {
                let detail = format!(
                    "{} on {} is after the last priced date {}; not reflected",
                    tx.symbol,
                    tx.date,
                    axis.last()
                );
                warn!("{}", detail);
                warnings.push(Warning::new(WarningKind::LateTransaction, detail));
            }
        }

        debug!(
            symbol = %tx.symbol,
            date = %tx.date,
            %quantity,
            price = %conv.price,
            status = %conv.status,
            "replayed transaction"
        );
        fills.push(Fill {
            date: tx.date,
            symbol: tx.symbol.clone(),
            quantity,
            price_local: tx.price_local,
            price_reporting: conv.price,
            status: conv.status,
            axis_index,
        });
    }

    Ok(Accumulation {
        holdings: holding_deltas
            .into_iter()
            .map(|(symbol, deltas)| (symbol, deltas.into_curve()))
            .collect(),
        invested: invested.into_curve(),
        fills,
        degraded_from,
        warnings,
    })
}
