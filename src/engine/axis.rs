// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::ValuationError;
use crate::models::PriceSeries;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Sorted union of every date seen in any price series. All derived curves
/// are indexed by position on this axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateAxis {
    dates: Vec<NaiveDate>,
}

impl DateAxis {
    pub fn from_series<'a, I>(series: I) -> Result<Self, ValuationError>
    where
        I: IntoIterator<Item = &'a PriceSeries>,
    {
        let union: BTreeSet<NaiveDate> = series.into_iter().flat_map(|s| s.dates()).collect();
        Self::from_dates(union)
    }

    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Result<Self, ValuationError> {
        let union: BTreeSet<NaiveDate> = dates.into_iter().collect();
        if union.is_empty() {
            return Err(ValuationError::NoPriceData);
        }
        Ok(Self {
            dates: union.into_iter().collect(),
        })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// First axis position whose date is `>= date`; `None` past the end.
    pub fn index_on_or_after(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.dates.partition_point(|d| *d < date);
        (idx < self.dates.len()).then_some(idx)
    }

    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }
}
