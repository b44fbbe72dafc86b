use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "ethiofi",
    version,
    about = "Ethiopia financial inclusion forecasting and analysis tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the impact-adjusted forecast pipeline and write a JSON report
    Forecast(ForecastArgs),
    /// List events within a date range
    Timeline(TimelineArgs),
    /// Print dataset composition counts
    Summary(SummaryArgs),
    /// Backtest the model against held-out historical observations
    Backtest(BacktestArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum HorizonStep {
    Yearly,
    Monthly,
}

#[derive(Args, Debug, Clone)]
pub struct ForecastArgs {
    #[arg(long, default_value = "data/ethiopia_fi_unified.csv")]
    pub data_path: PathBuf,

    /// Indicator codes to forecast; defaults to the NFIS headline
    /// indicators when omitted
    #[arg(long = "indicator")]
    pub indicators: Vec<String>,

    #[arg(long, default_value_t = 2025)]
    pub start_year: i32,

    #[arg(long, default_value_t = 2027)]
    pub end_year: i32,

    #[arg(long, value_enum, default_value_t = HorizonStep::Yearly)]
    pub step: HorizonStep,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct TimelineArgs {
    #[arg(long, default_value = "data/ethiopia_fi_unified.csv")]
    pub data_path: PathBuf,

    /// Start of the range, inclusive
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// End of the range, exclusive
    #[arg(long)]
    pub to: Option<NaiveDate>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    #[arg(long, default_value = "data/ethiopia_fi_unified.csv")]
    pub data_path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct BacktestArgs {
    #[arg(long, default_value = "data/ethiopia_fi_unified.csv")]
    pub data_path: PathBuf,

    /// Observations dated before January 1 of this year train the
    /// baseline; the rest are held out for scoring
    #[arg(long, default_value_t = 2016)]
    pub cutoff_year: i32,

    #[arg(long = "indicator")]
    pub indicators: Vec<String>,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}
