// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{Loaded, RawRow, is_csv, read_csv_rows, read_json_rows};
use crate::error::ValuationError;
use crate::models::{Size, Transaction, Warning, WarningKind};
use crate::utils::{parse_date, parse_decimal};
use anyhow::{Result, anyhow};
use std::path::Path;
use tracing::{info, warn};

const REQUIRED: &[&str] = &["symbol", "date", "price_local"];
const QUANTITY_KEYS: &[&str] = &["quantity", "qty"];

/// Reads the transaction ledger from JSON (array of objects) or CSV with a
/// header row. Quantity may be given as `quantity`/`qty`, or as a notional
/// `amount` / `amount_<ccy>` in the reporting currency.
pub fn load_ledger(path: &Path, reporting_currency: &str) -> Result<Loaded<Vec<Transaction>>> {
    let rows = if is_csv(path) {
        read_csv_rows(path)?
    } else {
        read_json_rows(path)?
    };
    let loaded = parse_ledger(&rows.rows, &rows.columns, reporting_currency)?;
    info!(
        path = %path.display(),
        transactions = loaded.value.len(),
        skipped = loaded.warnings.len(),
        "loaded ledger"
    );
    Ok(loaded)
}

pub fn parse_ledger(
    rows: &[RawRow],
    columns: &[String],
    reporting_currency: &str,
) -> Result<Loaded<Vec<Transaction>>> {
    let amount_keys = [
        "amount".to_string(),
        format!("amount_{}", reporting_currency.to_lowercase()),
    ];
    if !rows.is_empty() || !columns.is_empty() {
        let has = |key: &str| columns.iter().any(|c| c == key);
        for field in REQUIRED {
            if !has(*field) {
                return Err(ValuationError::MissingField(field.to_string()).into());
            }
        }
        if !QUANTITY_KEYS.iter().any(|k| has(*k)) && !amount_keys.iter().any(|k| has(k.as_str())) {
            return Err(ValuationError::MissingField("quantity".to_string()).into());
        }
    }

    let mut txs = Vec::with_capacity(rows.len());
    let mut warnings = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        match parse_row(row, &amount_keys) {
            Ok(tx) => txs.push(tx),
            Err(e) => {
                let detail = format!("ledger row {}: {}", idx + 1, e);
                warn!("{}", detail);
                warnings.push(Warning::new(WarningKind::MalformedRow, detail));
            }
        }
    }
    Ok(Loaded {
        value: txs,
        warnings,
    })
}

fn parse_row(row: &RawRow, amount_keys: &[String]) -> Result<Transaction> {
    let symbol = row
        .get("symbol")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow!("symbol missing"))?;
    let date = parse_date(row.get("date").ok_or_else(|| anyhow!("date missing"))?)?;
    let price_local =
        parse_decimal(row.get("price_local").ok_or_else(|| anyhow!("price_local missing"))?)?;
    if price_local.is_sign_negative() && !price_local.is_zero() {
        return Err(anyhow!("negative price_local {}", price_local));
    }

    let quantity = QUANTITY_KEYS.iter().find_map(|k| row.get(*k));
    let amount = amount_keys.iter().find_map(|k| row.get(k.as_str()));
    let size = match (quantity, amount) {
        (Some(q), _) => Size::Units(parse_decimal(q)?),
        (None, Some(a)) => Size::Notional(parse_decimal(a)?),
        (None, None) => return Err(anyhow!("neither quantity nor amount given")),
    };

    Ok(Transaction {
        date,
        symbol: symbol.to_string(),
        size,
        price_local,
    })
}
