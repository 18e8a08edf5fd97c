// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use paperfolio::commands::{self, build, doctor};
use paperfolio::{cli, models::ConversionStatus};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let quotes = dir.path().join("quotes");
        fs::create_dir_all(&quotes).unwrap();
        fs::write(
            quotes.join("AAPL.json"),
            r#"[
                {"date": "2025-03-03", "close": 100},
                {"date": "2025-03-04", "close": 105},
                {"date": "2025-03-05", "close": 110}
            ]"#,
        )
        .unwrap();
        fs::write(
            quotes.join("TCS_NS.csv"),
            "Date,Close\n2025-03-04,4000\n2025-03-05,4400\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("ledger.json"),
            r#"[
                {"symbol": "AAPL", "date": "2025-03-03", "qty": 10, "price_local": 100},
                {"symbol": "TCS.NS", "date": "2025-03-04", "amount_usd": 500, "price_local": 4000}
            ]"#,
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).to_string_lossy().to_string()
    }

    fn with_fx(&self) {
        fs::write(
            self.dir.path().join("quotes").join("USDINR.csv"),
            "date,rate\n2025-03-01,80\n2025-03-05,88\n",
        )
        .unwrap();
    }

    fn args(&self, sub: &str, extra: &[&str]) -> Vec<String> {
        let mut args = vec![
            "paperfolio".to_string(),
            sub.to_string(),
            "--ledger".to_string(),
            self.path("ledger.json"),
            "--quotes".to_string(),
            self.path("quotes"),
            "--base".to_string(),
            "USD".to_string(),
            "--starting-cash".to_string(),
            "10000".to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        args
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn build_writes_nav_summary_and_positions() {
    let fx = Fixture::new();
    fx.with_fx();
    let out = fx.path("out");

    let matches = cli::build_cli().get_matches_from(fx.args("build", &["--out", out.as_str()]));
    if let Some(("build", m)) = matches.subcommand() {
        build::handle(m).unwrap();
    } else {
        panic!("no build subcommand");
    }

    let out = Path::new(&out);
    let nav = read_json(&out.join("nav.json"));
    let rows = nav.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["date"], "2025-03-03");
    assert_eq!(rows[0]["nav"].as_f64(), Some(10000.0));
    assert_eq!(rows[0]["nav_index"].as_f64(), Some(100.0));
    // day 3: AAPL 10 * 110 + TCS (500 / 50 units) * 4400 / 88
    assert_eq!(rows[2]["holdings_value"].as_f64(), Some(1600.0));
    assert_eq!(rows[2]["cash"].as_f64(), Some(8500.0));
    assert_eq!(rows[2]["nav"].as_f64(), Some(10100.0));
    assert_eq!(rows[2]["fx_degraded"], false);

    let summary = read_json(&out.join("nav_summary.json"));
    assert_eq!(summary["reporting_currency"], "USD");
    assert_eq!(summary["inception_date"], "2025-03-03");
    assert_eq!(summary["latest"]["nav"].as_f64(), Some(10100.0));
    assert_eq!(summary["latest"]["pnl_pct"].as_f64(), Some(1.0));
    assert!(summary["fx_degraded_symbols"].as_array().unwrap().is_empty());

    let positions = read_json(&out.join("positions.json"));
    let positions = positions.as_array().unwrap();
    assert_eq!(positions.len(), 2);
    assert_eq!(positions[1]["symbol"], "TCS.NS");
    assert_eq!(positions[1]["currency"], "INR");
    assert_eq!(positions[1]["quantity"].as_f64(), Some(10.0));
    assert_eq!(positions[1]["conversion"], "converted");
}

#[test]
fn build_csv_format_writes_nav_csv() {
    let fx = Fixture::new();
    fx.with_fx();
    let out = fx.path("out");

    let args = fx.args("build", &["--out", out.as_str(), "--format", "csv"]);
    let matches = cli::build_cli().get_matches_from(args);
    let (_, m) = matches.subcommand().unwrap();
    build::handle(m).unwrap();

    let out = Path::new(&out);
    assert!(!out.join("nav.json").exists());
    let mut rdr = csv::Reader::from_path(out.join("nav.csv")).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "date");
    assert_eq!(&headers[1], "nav");
    let records: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 3);
    assert_eq!(&records[0][0], "2025-03-03");
    assert!(out.join("nav_summary.json").exists());
}

#[test]
fn unknown_format_fails_before_writing() {
    let fx = Fixture::new();
    let out = fx.path("out");

    let args = fx.args("build", &["--out", out.as_str(), "--format", "xml"]);
    let matches = cli::build_cli().get_matches_from(args);
    let (_, m) = matches.subcommand().unwrap();
    let err = build::handle(m).unwrap_err();
    assert!(err.to_string().contains("Unknown format"));
    assert!(!Path::new(&out).exists());
}

#[test]
fn missing_fx_degrades_instead_of_failing() {
    let fx = Fixture::new();
    let matches = cli::build_cli().get_matches_from(fx.args("positions", &[]));
    let (_, m) = matches.subcommand().unwrap();

    let valuation = commands::run_valuation(m).unwrap();

    assert_eq!(valuation.degraded_symbols(), vec!["TCS.NS".to_string()]);
    let tcs = valuation
        .positions
        .iter()
        .find(|p| p.symbol == "TCS.NS")
        .unwrap();
    assert_eq!(tcs.conversion, ConversionStatus::Unconverted);
    assert!(valuation.points.iter().all(|p| p.fx_degraded));
    let exposure: Vec<bool> = valuation
        .points
        .iter()
        .map(|p| p.unconverted_holdings)
        .collect();
    assert_eq!(exposure, vec![false, true, true]);
}

#[test]
fn currency_override_and_extra_symbol() {
    let fx = Fixture::new();
    fs::write(
        fx.dir.path().join("quotes").join("VOD.L.csv"),
        "date,close\n2025-03-02,70\n",
    )
    .unwrap();
    let matches = cli::build_cli().get_matches_from(fx.args(
        "positions",
        &["--currency", "TCS.NS=USD", "--symbol", "VOD.L"],
    ));
    let (_, m) = matches.subcommand().unwrap();

    let valuation = commands::run_valuation(m).unwrap();

    assert!(valuation.degraded_symbols().is_empty());
    assert_eq!(valuation.axis.first().to_string(), "2025-03-02");
    assert_eq!(valuation.points.len(), 4);
}

#[test]
fn doctor_reports_missing_quotes_and_fx() {
    let fx = Fixture::new();
    fs::write(
        fx.dir.path().join("ledger.csv"),
        "symbol,date,qty,price_local\n\
         AAPL,2025-03-01,1,99\n\
         GHOST,2025-03-03,1,5\n\
         TCS.NS,2025-03-04,1,4000\n\
         BAD,not-a-date,1,1\n",
    )
    .unwrap();
    let mut args = fx.args("doctor", &[]);
    args[3] = fx.path("ledger.csv");
    let matches = cli::build_cli().get_matches_from(args);
    let (_, m) = matches.subcommand().unwrap();

    let inputs = commands::load_inputs(m).unwrap();
    let rows = doctor::diagnose(&inputs).unwrap();
    let issues: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();

    assert!(issues.contains(&"malformed_row"));
    assert!(issues.contains(&"missing_quotes"));
    assert!(issues.contains(&"missing_fx"));
    assert!(issues.contains(&"predates_quotes"));
    let missing: Vec<&str> = rows
        .iter()
        .filter(|r| r[0] == "missing_quotes")
        .map(|r| r[1].as_str())
        .collect();
    assert_eq!(missing, vec!["GHOST"]);
}
