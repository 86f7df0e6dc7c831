//! A-share data toolbox — code normalization, calendar queries, validation.
//!
//! Commands:
//! - `code` — normalize a raw stock code and report its board
//! - `calendar days` — list trading sessions in a date range
//! - `calendar check` — trading-day and trading-hours status for one date
//! - `calendar next` / `calendar prev` — step along the session axis
//! - `validate` — score a CSV-backed OHLCV series against the calendar

use anyhow::{bail, Context, Result};
use ashare_core::calendar::{HttpCalendarSource, TradingCalendar};
use ashare_core::domain::StockCode;
use ashare_core::provider::{CsvProvider, DataProvider, ProviderChain};
use ashare_core::validate::{DataValidator, ValidationOptions};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

const DEFAULT_CALENDAR_URL: &str = "https://query.example-quote.cn/trade_calendar";

#[derive(Parser)]
#[command(name = "ashare", about = "A-share data toolbox — codes, calendar, data quality")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a raw stock code and report exchange, board, and limit rate.
    Code {
        /// Raw code in any accepted spelling (600000, 600000.SH, sh600000).
        raw: String,
    },
    /// Trading-calendar queries.
    Calendar {
        #[command(subcommand)]
        action: CalendarAction,

        /// Calendar source endpoint.
        #[arg(long, default_value = DEFAULT_CALENDAR_URL)]
        source_url: String,

        /// Snapshot file reused across runs. Defaults to ./data/calendar.json.
        #[arg(long, default_value = "data/calendar.json")]
        snapshot: PathBuf,
    },
    /// Validate an OHLCV CSV series and print the scored report as JSON.
    Validate {
        /// Stock code in any accepted spelling.
        #[arg(long)]
        code: String,

        /// Directory holding `<CANONICAL>.csv` files.
        #[arg(long, default_value = "data")]
        csv_dir: PathBuf,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: String,

        /// Apply the 5% ST price limit instead of the board rate.
        #[arg(long, default_value_t = false)]
        st: bool,

        /// Apply the 44% first-sessions limit (overrides ST and board).
        #[arg(long, default_value_t = false)]
        newly_listed: bool,

        /// Calendar source endpoint.
        #[arg(long, default_value = DEFAULT_CALENDAR_URL)]
        source_url: String,

        /// Snapshot file reused across runs. Defaults to ./data/calendar.json.
        #[arg(long, default_value = "data/calendar.json")]
        snapshot: PathBuf,
    },
}

#[derive(Subcommand)]
enum CalendarAction {
    /// List trading sessions between two dates.
    Days {
        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: String,
    },
    /// Report trading-day status and session hours for one date.
    Check {
        /// Date (YYYY-MM-DD).
        date: String,
    },
    /// The n-th trading session at or after a date.
    Next {
        /// Date (YYYY-MM-DD).
        date: String,

        /// How many sessions to step.
        #[arg(long, default_value_t = 1)]
        n: usize,
    },
    /// The n-th trading session at or before a date.
    Prev {
        /// Date (YYYY-MM-DD).
        date: String,

        /// How many sessions to step.
        #[arg(long, default_value_t = 1)]
        n: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Code { raw } => run_code(&raw),
        Commands::Calendar {
            action,
            source_url,
            snapshot,
        } => run_calendar(action, &source_url, snapshot),
        Commands::Validate {
            code,
            csv_dir,
            start,
            end,
            st,
            newly_listed,
            source_url,
            snapshot,
        } => run_validate(
            &code,
            csv_dir,
            &start,
            &end,
            ValidationOptions { st, newly_listed },
            &source_url,
            snapshot,
        ),
    }
}

fn run_code(raw: &str) -> Result<()> {
    let Some(code) = StockCode::parse(raw) else {
        bail!("unrecognized stock code: {raw:?}");
    };
    let board = code.board();
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "input": raw,
            "canonical": code.canonical(),
            "exchange": code.exchange().as_str(),
            "board": board,
            "limit_rate": board.limit_rate(),
            "vendor_format": code.vendor_format(),
        }))?
    );
    Ok(())
}

fn run_calendar(action: CalendarAction, source_url: &str, snapshot: PathBuf) -> Result<()> {
    let mut cal = open_calendar(source_url, snapshot);

    match action {
        CalendarAction::Days { start, end } => {
            let (start, end) = (parse_date(&start)?, parse_date(&end)?);
            let days = cal.trading_days_between(start, end)?;
            println!("{}", serde_json::to_string_pretty(&days)?);
            eprintln!("{} trading session(s) in {start}..={end}", days.len());
        }
        CalendarAction::Check { date } => {
            let date = parse_date(&date)?;
            let hours = cal.trading_hours(date);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "date": date,
                    "is_trading_day": hours.is_some(),
                    "sessions": hours,
                    "current_trading_day": cal.current_trading_day(date),
                }))?
            );
        }
        CalendarAction::Next { date, n } => {
            let date = parse_date(&date)?;
            match cal.next_trading_day(date, n) {
                Some(day) => println!("{day}"),
                None => bail!("no trading session {n} step(s) at or after {date} in the covered span"),
            }
        }
        CalendarAction::Prev { date, n } => {
            let date = parse_date(&date)?;
            match cal.previous_trading_day(date, n) {
                Some(day) => println!("{day}"),
                None => bail!("no trading session {n} step(s) at or before {date} in the covered span"),
            }
        }
    }

    Ok(())
}

fn run_validate(
    raw_code: &str,
    csv_dir: PathBuf,
    start: &str,
    end: &str,
    options: ValidationOptions,
    source_url: &str,
    snapshot: PathBuf,
) -> Result<()> {
    let Some(code) = StockCode::parse(raw_code) else {
        bail!("unrecognized stock code: {raw_code:?}");
    };
    let (start, end) = (parse_date(start)?, parse_date(end)?);

    let chain = ProviderChain::new(vec![Box::new(CsvProvider::new(&csv_dir))]);
    let fetched = chain
        .fetch(&code, start, end)
        .with_context(|| format!("loading series for {}", code.canonical()))?;
    if fetched.bars.is_empty() {
        eprintln!(
            "WARNING: no rows for {} in {} — report will score 0",
            code.canonical(),
            csv_dir.display()
        );
    }

    let mut cal = open_calendar(source_url, snapshot);
    let report = DataValidator::new().report(&mut cal, &code, &fetched.bars, start, end, &options)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    eprintln!(
        "{}: score {:.1}, basic_valid {} (source: {})",
        code.canonical(),
        report.overall_score,
        report.basic_valid,
        fetched.source
    );
    Ok(())
}

fn open_calendar(source_url: &str, snapshot: PathBuf) -> TradingCalendar {
    TradingCalendar::with_snapshot(Box::new(HttpCalendarSource::new(source_url)), snapshot)
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("invalid date {s:?}"))
}
