use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nba_picks::config::PipelineConfig;
use nba_picks::odds_fetch::{SUPPORTED_BOOKS, Sport};
use nba_picks::pipeline::{self, RunOptions, selected_models};
use nba_picks::report::{OutputFormat, Report};

#[derive(Debug, Parser)]
#[command(name = "nba_picks", about = "Predict today's games with the trained models")]
struct Cli {
    /// Run with the XGBoost model
    #[arg(long)]
    xgb: bool,

    /// Run with the neural network model
    #[arg(long)]
    nn: bool,

    /// Run all models
    #[arg(short = 'A', long = "all")]
    all: bool,

    #[arg(long, value_name = "BOOK", help = odds_help())]
    odds: Option<String>,

    /// Date of the games to fetch (YYYY-MM-DD), omit for today
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,

    /// Sport (NBA, NFL, NHL, MLB, NCAAB)
    #[arg(long, default_value = "NBA", value_parser = Sport::parse_code)]
    sport: Sport,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Directory holding nn/ and xgb/ model files
    #[arg(long, value_name = "DIR")]
    models: Option<PathBuf>,
}

fn odds_help() -> String {
    format!("Sportsbook to fetch odds from ({})", SUPPORTED_BOOKS.join(", "))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = PipelineConfig::from_env();
    if let Some(dir) = cli.models {
        cfg.model_dir = dir;
    }

    let opts = RunOptions {
        models: selected_models(cli.nn, cli.xgb, cli.all),
        sportsbook: cli.odds,
        date: cli.date.unwrap_or_else(|| Local::now().date_naive()),
        sport: cli.sport,
        format: cli.format,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let json = opts.format == OutputFormat::Json;
    let report = match pipeline::run(&cfg, &opts, &mut out) {
        Ok(report) => report,
        Err(err) if json => {
            let date = opts.date.format("%Y-%m-%d").to_string();
            let mut report = Report::new(&date, opts.sport.code());
            report.fail(&format!("{err:#}"));
            write_report(&mut out, &report)?;
            return Err(err);
        }
        Err(err) => return Err(err),
    };

    if json {
        write_report(&mut out, &report)?;
    }
    Ok(())
}

fn write_report<W: Write>(out: &mut W, report: &Report) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report).context("failed writing report")?;
    writeln!(out)?;
    Ok(())
}
