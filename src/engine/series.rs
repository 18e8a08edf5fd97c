// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Axis-aligned series: forward-filled observations and step curves built
//! from sparse deltas.

use super::axis::DateAxis;
use crate::models::{PricePoint, PriceSeries};
use rust_decimal::Decimal;

/// A sparse series reindexed onto a [`DateAxis`]. Positions before the first
/// observation are `None`; later gaps carry the last known value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignedSeries {
    values: Vec<Option<Decimal>>,
}

impl AlignedSeries {
    pub fn align(series: &PriceSeries, axis: &DateAxis) -> Self {
        let points = series.points();
        let mut values = Vec::with_capacity(axis.len());
        let mut next = 0;
        let mut last = None;
        for date in axis.dates() {
            while next < points.len() && points[next].date <= *date {
                last = Some(points[next].close);
                next += 1;
            }
            values.push(last);
        }
        Self { values }
    }

    pub fn from_values(values: Vec<Option<Decimal>>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Option<Decimal>] {
        &self.values
    }

    pub fn get(&self, idx: usize) -> Option<Decimal> {
        self.values.get(idx).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<Decimal> {
        self.values.last().copied().flatten()
    }

    /// Pointwise combination; a `None` on either side stays `None`.
    pub fn zip_with<F>(&self, other: &AlignedSeries, f: F) -> AlignedSeries
    where
        F: Fn(Decimal, Decimal) -> Option<Decimal>,
    {
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| match (a, b) {
                (Some(a), Some(b)) => f(*a, *b),
                _ => None,
            })
            .collect();
        AlignedSeries { values }
    }

    /// Back to a plain series over the defined axis positions.
    pub fn to_price_series(&self, axis: &DateAxis) -> PriceSeries {
        PriceSeries::new(
            axis.dates()
                .iter()
                .zip(&self.values)
                .filter_map(|(date, v)| v.map(|close| PricePoint { date: *date, close })),
        )
    }
}

/// Sparse per-position increments waiting to be accumulated.
#[derive(Debug, Clone)]
pub struct Deltas {
    deltas: Vec<Decimal>,
}

impl Deltas {
    pub fn new(len: usize) -> Self {
        Self {
            deltas: vec![Decimal::ZERO; len],
        }
    }

    pub fn add(&mut self, idx: usize, amount: Decimal) {
        self.deltas[idx] += amount;
    }

    pub fn into_curve(self) -> StepCurve {
        let mut running = Decimal::ZERO;
        let values = self
            .deltas
            .into_iter()
            .map(|delta| {
                running += delta;
                running
            })
            .collect();
        StepCurve { values }
    }
}

/// Cumulative value per axis position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepCurve {
    values: Vec<Decimal>,
}

impl StepCurve {
    pub fn zeros(len: usize) -> Self {
        Deltas::new(len).into_curve()
    }

    pub fn values(&self) -> &[Decimal] {
        &self.values
    }

    pub fn get(&self, idx: usize) -> Decimal {
        self.values[idx]
    }

    pub fn last(&self) -> Decimal {
        self.values.last().copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
