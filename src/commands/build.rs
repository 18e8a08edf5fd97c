// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::run_valuation;
use crate::engine::Valuation;
use crate::models::NavPoint;
use crate::utils::{fmt_money, fmt_opt, maybe_print_json, pretty_table};
use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::Path;
use tracing::info;

pub fn handle(m: &clap::ArgMatches) -> Result<()> {
    let fmt = m.get_one::<String>("format").unwrap().trim().to_lowercase();
    if fmt != "json" && fmt != "csv" {
        return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
    }
    let out = Path::new(m.get_one::<String>("out").unwrap().trim());

    let valuation = run_valuation(m)?;
    write_outputs(&valuation, out, &fmt)?;

    let summary = valuation.summary();
    if !maybe_print_json(m.get_flag("json"), false, &summary)? {
        print_summary(&valuation);
    }
    Ok(())
}

pub fn write_outputs(valuation: &Valuation, out: &Path, fmt: &str) -> Result<()> {
    fs::create_dir_all(out).with_context(|| format!("Create {}", out.display()))?;

    match fmt {
        "csv" => write_nav_csv(&valuation.points, &out.join("nav.csv"))?,
        _ => {
            let path = out.join("nav.json");
            fs::write(&path, serde_json::to_string(&valuation.points)?)
                .with_context(|| format!("Write {}", path.display()))?;
        }
    }

    let summary_path = out.join("nav_summary.json");
    fs::write(&summary_path, serde_json::to_string_pretty(&valuation.summary())?)
        .with_context(|| format!("Write {}", summary_path.display()))?;

    let positions_path = out.join("positions.json");
    fs::write(&positions_path, serde_json::to_string_pretty(&valuation.positions)?)
        .with_context(|| format!("Write {}", positions_path.display()))?;

    info!(out = %out.display(), rows = valuation.points.len(), "wrote NAV outputs");
    Ok(())
}

fn write_nav_csv(points: &[NavPoint], path: &Path) -> Result<()> {
    let opt = |v: Option<rust_decimal::Decimal>| v.map(|d| d.to_string()).unwrap_or_default();
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("Create {}", path.display()))?;
    wtr.write_record([
        "date",
        "nav",
        "cash",
        "holdings_value",
        "invested",
        "nav_index",
        "pnl_abs",
        "pnl_pct",
        "fx_degraded",
        "unconverted_holdings",
        "unpriced",
    ])?;
    for p in points {
        wtr.write_record([
            p.date.to_string(),
            p.nav.to_string(),
            p.cash.to_string(),
            p.holdings_value.to_string(),
            p.invested.to_string(),
            opt(p.nav_index),
            opt(p.pnl_abs),
            opt(p.pnl_pct),
            p.fx_degraded.to_string(),
            p.unconverted_holdings.to_string(),
            p.unpriced.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn print_summary(valuation: &Valuation) {
    let ccy = valuation.reporting_currency.as_str();
    let latest = valuation.latest();
    let inception = valuation
        .inception()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    let rows = vec![
        vec!["Date".to_string(), latest.date.to_string()],
        vec!["Inception".to_string(), inception],
        vec!["NAV".to_string(), fmt_money(&latest.nav, ccy)],
        vec!["Holdings".to_string(), fmt_money(&latest.holdings_value, ccy)],
        vec!["Cash".to_string(), fmt_money(&latest.cash, ccy)],
        vec!["Invested".to_string(), fmt_money(&latest.invested, ccy)],
        vec!["Index".to_string(), fmt_opt(latest.nav_index, 4)],
        vec!["P&L".to_string(), fmt_opt(latest.pnl_abs, 2)],
        vec!["P&L %".to_string(), fmt_opt(latest.pnl_pct, 3)],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));

    let degraded = valuation.degraded_symbols();
    if !degraded.is_empty() {
        println!(
            "FX missing, values left in local currency for: {}",
            degraded.join(", ")
        );
    }
    if !valuation.warnings.is_empty() {
        println!("{} warning(s); see nav_summary.json", valuation.warnings.len());
    }
}
