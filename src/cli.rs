// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::config::{DEFAULT_REPORTING_CURRENCY, DEFAULT_STARTING_CASH};
use clap::{Arg, ArgAction, Command, crate_version};

pub fn build_cli() -> Command {
    Command::new("paperfolio")
        .version(crate_version!())
        .about("Daily NAV, performance index and P&L for a multi-currency paper portfolio")
        .subcommand(
            with_inputs(Command::new("build").about("Value the portfolio and write NAV files"))
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_name("DIR")
                        .default_value("data")
                        .help("Directory for nav, nav_summary and positions files"),
                )
                .arg(
                    Arg::new("format")
                        .long("format")
                        .value_name("FORMAT")
                        .default_value("json")
                        .help("Daily series format: json|csv"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            with_inputs(Command::new("positions").about("Show per-symbol cost and market value"))
                .arg(json_flag())
                .arg(jsonl_flag()),
        )
        .subcommand(with_inputs(
            Command::new("doctor").about("Check quotes, FX coverage and ledger rows"),
        ))
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn jsonl_flag() -> Arg {
    Arg::new("jsonl")
        .long("jsonl")
        .action(ArgAction::SetTrue)
        .help("Print one JSON object per line")
}

fn with_inputs(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("ledger")
            .long("ledger")
            .value_name("PATH")
            .required(true)
            .help("Transaction ledger (.json array or .csv with headers)"),
    )
    .arg(
        Arg::new("quotes")
            .long("quotes")
            .value_name("DIR")
            .required(true)
            .help("Directory of <SYMBOL>.json|csv price series"),
    )
    .arg(
        Arg::new("base")
            .long("base")
            .value_name("CCY")
            .env("BASE_CURRENCY")
            .default_value(DEFAULT_REPORTING_CURRENCY)
            .help("Reporting currency"),
    )
    .arg(
        Arg::new("starting-cash")
            .long("starting-cash")
            .value_name("AMOUNT")
            .env("STARTING_CASH")
            .default_value(DEFAULT_STARTING_CASH)
            .help("Starting cash in the reporting currency"),
    )
    .arg(
        Arg::new("fx")
            .long("fx")
            .value_name("CCY=PATH")
            .action(ArgAction::Append)
            .help("FX series for a local currency (local units per reporting unit)"),
    )
    .arg(
        Arg::new("currency")
            .long("currency")
            .value_name("SYMBOL=CCY")
            .action(ArgAction::Append)
            .help("Quote currency of a symbol"),
    )
    .arg(
        Arg::new("suffix")
            .long("suffix")
            .value_name("SUFFIX=CCY")
            .action(ArgAction::Append)
            .help("Quote currency for symbols ending in SUFFIX"),
    )
    .arg(
        Arg::new("symbol")
            .long("symbol")
            .value_name("SYMBOL")
            .action(ArgAction::Append)
            .help("Extra symbol to price even without transactions"),
    )
}
