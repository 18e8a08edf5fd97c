// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::axis::DateAxis;
use super::fx::ConvertedSeries;
use super::holdings::Accumulation;
use crate::error::ValuationError;
use crate::models::{NavPoint, Warning, WarningKind};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

pub const NAV_DP: u32 = 4;
pub const INDEX_DP: u32 = 4;
pub const PNL_ABS_DP: u32 = 2;
pub const PNL_PCT_DP: u32 = 3;

/// A symbol's reporting-currency prices on the axis.
#[derive(Debug, Clone)]
pub struct PricedSymbol {
    pub symbol: String,
    pub currency: String,
    pub converted: ConvertedSeries,
}

/// Chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Anchored { inception: NaiveDate, base: Decimal },
    Unanchored,
}

impl Anchor {
    pub fn inception(&self) -> Option<NaiveDate> {
        match self {
            Anchor::Anchored { inception, .. } => Some(*inception),
            Anchor::Unanchored => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Composition {
    pub points: Vec<NavPoint>,
    pub anchor: Anchor,
    pub warnings: Vec<Warning>,
}

fn overflow(symbol: &str, date: NaiveDate) -> ValuationError {
    ValuationError::ArithmeticOverflow {
        symbol: symbol.to_string(),
        date,
    }
}

struct Level {
    holdings_value: Decimal,
    cash: Decimal,
    nav: Decimal,
    invested: Decimal,
    invested_raw: Decimal,
    unconverted_holdings: bool,
    unpriced: bool,
}

/// Marks holdings to market, adds floored cash, then anchors the index.
/// `priced` must be ordered by symbol. `fx_degraded` is the run-level
/// degraded-conversion flag and is copied onto every point.
pub fn compose(
    axis: &DateAxis,
    priced: &[PricedSymbol],
    acc: &Accumulation,
    starting_cash: Decimal,
    fx_degraded: bool,
) -> Result<Composition, ValuationError> {
    let mut warnings = Vec::new();

    let levels = (0..axis.len())
        .map(|idx| {
            let date = axis.dates()[idx];
            let mut holdings_value = Decimal::ZERO;
            let mut unconverted_holdings =
                acc.degraded_from.is_some_and(|start| idx >= start);
            let mut unpriced = false;
            for (symbol, curve) in &acc.holdings {
                let qty = curve.get(idx);
                if qty.is_zero() {
                    continue;
                }
                let entry = priced
                    .binary_search_by(|p| p.symbol.as_str().cmp(symbol.as_str()))
                    .ok()
                    .map(|pos| &priced[pos]);
                match entry.and_then(|p| p.converted.prices.get(idx).map(|px| (p, px))) {
                    Some((p, px)) => {
                        holdings_value = px
                            .checked_mul(qty)
                            .and_then(|value| holdings_value.checked_add(value))
                            .ok_or_else(|| overflow(symbol, date))?;
                        unconverted_holdings |= p.converted.status.is_degraded();
                    }
                    None => unpriced = true,
                }
            }
            let invested_raw = acc.invested.get(idx);
            let cash = (starting_cash - invested_raw).max(Decimal::ZERO);
            let holdings_value = holdings_value.round_dp(NAV_DP);
            let cash = cash.round_dp(NAV_DP);
            let nav = holdings_value
                .checked_add(cash)
                .ok_or_else(|| overflow("portfolio", date))?;
            Ok(Level {
                nav,
                holdings_value,
                cash,
                invested: invested_raw.round_dp(NAV_DP),
                invested_raw,
                unconverted_holdings,
                unpriced,
            })
        })
        .collect::<Result<Vec<Level>, ValuationError>>()?;

    let inception_idx = levels
        .iter()
        .position(|l| l.invested_raw > Decimal::ZERO)
        .or_else(|| levels.iter().position(|l| l.nav > Decimal::ZERO));

    let anchor = match inception_idx {
        Some(idx) if levels[idx].nav.is_zero() => {
            let detail = format!(
                "NAV is zero at inception candidate {}; index and P&L left undefined",
                axis.dates()[idx]
            );
            warn!("{}", detail);
            warnings.push(Warning::new(WarningKind::UndefinedIndex, detail));
            Anchor::Unanchored
        }
        Some(idx) => Anchor::Anchored {
            inception: axis.dates()[idx],
            base: levels[idx].nav,
        },
        None => {
            let detail = "no date with invested capital or positive NAV; index and P&L undefined";
            warn!("{}", detail);
            warnings.push(Warning::new(WarningKind::UndefinedIndex, detail));
            Anchor::Unanchored
        }
    };

    if let Anchor::Anchored { inception, base } = anchor {
        info!(%inception, %base, "anchored performance index");
    }

    let points = axis
        .dates()
        .iter()
        .zip(levels)
        .map(|(date, level)| {
            let (nav_index, pnl_abs, pnl_pct) = match anchor {
                Anchor::Anchored { base, .. } => {
                    let ratio = level
                        .nav
                        .checked_div(base)
                        .ok_or_else(|| overflow("portfolio", *date))?;
                    (
                        Some((ratio * Decimal::ONE_HUNDRED).round_dp(INDEX_DP)),
                        Some((level.nav - base).round_dp(PNL_ABS_DP)),
                        Some(
                            ((ratio - Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(PNL_PCT_DP),
                        ),
                    )
                }
                Anchor::Unanchored => (None, None, None),
            };
            Ok(NavPoint {
                date: *date,
                nav: level.nav,
                cash: level.cash,
                holdings_value: level.holdings_value,
                invested: level.invested,
                nav_index,
                pnl_abs,
                pnl_pct,
                fx_degraded,
                unconverted_holdings: level.unconverted_holdings,
                unpriced: level.unpriced,
            })
        })
        .collect::<Result<Vec<NavPoint>, ValuationError>>()?;

    Ok(Composition {
        points,
        anchor,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::series::{AlignedSeries, StepCurve};
    use crate::models::ConversionStatus;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    fn empty_acc(len: usize) -> Accumulation {
        Accumulation {
            holdings: BTreeMap::new(),
            invested: StepCurve::zeros(len),
            fills: Vec::new(),
            degraded_from: None,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn zero_cash_and_no_positions_is_unanchored() {
        let axis = DateAxis::from_dates([d(1), d(2)]).unwrap();
        let comp = compose(&axis, &[], &empty_acc(2), Decimal::ZERO, false).unwrap();
        assert_eq!(comp.anchor, Anchor::Unanchored);
        assert!(comp.points.iter().all(|p| p.nav_index.is_none()
            && p.pnl_abs.is_none()
            && p.pnl_pct.is_none()));
        assert_eq!(comp.warnings[0].kind, WarningKind::UndefinedIndex);
    }

    #[test]
    fn unpriced_holding_contributes_nothing() {
        let axis = DateAxis::from_dates([d(1), d(2)]).unwrap();
        let mut deltas = crate::engine::series::Deltas::new(2);
        deltas.add(0, dec!(10));
        let mut acc = empty_acc(2);
        acc.holdings.insert("NEW".to_string(), deltas.into_curve());
        let priced = vec![PricedSymbol {
            symbol: "NEW".to_string(),
            currency: "USD".to_string(),
            converted: ConvertedSeries {
                prices: AlignedSeries::from_values(vec![None, Some(dec!(3))]),
                status: ConversionStatus::Native,
            },
        }];
        let comp = compose(&axis, &priced, &acc, dec!(100), false).unwrap();
        assert!(comp.points[0].unpriced);
        assert_eq!(comp.points[0].holdings_value, dec!(0));
        assert!(!comp.points[1].unpriced);
        assert_eq!(comp.points[1].holdings_value, dec!(30));
        assert_eq!(comp.points[1].nav, dec!(130));
    }

    #[test]
    fn percentages_round_to_fixed_places() {
        let axis = DateAxis::from_dates([d(1), d(2)]).unwrap();
        let mut deltas = crate::engine::series::Deltas::new(2);
        deltas.add(0, dec!(3));
        let mut invested = crate::engine::series::Deltas::new(2);
        invested.add(0, dec!(300));
        let acc = Accumulation {
            holdings: BTreeMap::from([("A".to_string(), deltas.into_curve())]),
            invested: invested.into_curve(),
            fills: Vec::new(),
            degraded_from: None,
            warnings: Vec::new(),
        };
        let priced = vec![PricedSymbol {
            symbol: "A".to_string(),
            currency: "USD".to_string(),
            converted: ConvertedSeries {
                prices: AlignedSeries::from_values(vec![
                    Some(dec!(100)),
                    Some(dec!(100.33333)),
                ]),
                status: ConversionStatus::Native,
            },
        }];
        let comp = compose(&axis, &priced, &acc, dec!(0), false).unwrap();
        let last = &comp.points[1];
        assert_eq!(last.holdings_value, dec!(301.0000));
        assert_eq!(last.nav, dec!(301));
        assert_eq!(last.pnl_abs, Some(dec!(1.00)));
        assert_eq!(last.pnl_pct, Some(dec!(0.333)));
        assert_eq!(last.nav_index, Some(dec!(100.3333)));
    }

    #[test]
    fn run_level_degradation_marks_every_point() {
        let axis = DateAxis::from_dates([d(1), d(2), d(3)]).unwrap();
        let mut deltas = crate::engine::series::Deltas::new(3);
        deltas.add(2, dec!(1));
        let mut acc = empty_acc(3);
        acc.holdings.insert("B.NS".to_string(), deltas.into_curve());
        acc.degraded_from = Some(2);
        let priced = vec![PricedSymbol {
            symbol: "B.NS".to_string(),
            currency: "INR".to_string(),
            converted: ConvertedSeries {
                prices: AlignedSeries::from_values(vec![Some(dec!(5)); 3]),
                status: ConversionStatus::Unconverted,
            },
        }];
        let comp = compose(&axis, &priced, &acc, dec!(100), true).unwrap();
        assert!(comp.points.iter().all(|p| p.fx_degraded));
        let exposure: Vec<bool> = comp.points.iter().map(|p| p.unconverted_holdings).collect();
        assert_eq!(exposure, vec![false, false, true]);
    }

    #[test]
    fn oversized_holding_value_is_an_error() {
        let axis = DateAxis::from_dates([d(1)]).unwrap();
        let mut deltas = crate::engine::series::Deltas::new(1);
        deltas.add(0, Decimal::MAX);
        let mut acc = empty_acc(1);
        acc.holdings.insert("BIG".to_string(), deltas.into_curve());
        let priced = vec![PricedSymbol {
            symbol: "BIG".to_string(),
            currency: "USD".to_string(),
            converted: ConvertedSeries {
                prices: AlignedSeries::from_values(vec![Some(dec!(2))]),
                status: ConversionStatus::Native,
            },
        }];
        let err = compose(&axis, &priced, &acc, dec!(0), false).unwrap_err();
        match err {
            ValuationError::ArithmeticOverflow { symbol, .. } => assert_eq!(symbol, "BIG"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
