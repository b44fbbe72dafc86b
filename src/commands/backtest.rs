use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::BacktestArgs;
use crate::dataset;
use crate::error::ModelError;
use crate::forecast::adjust::{self, MagnitudeScale};
use crate::forecast::baseline;
use crate::forecast::scenario::{self, ScenarioParams};
use crate::model::{Observation, Scenario};
use crate::util::{now_utc_string, write_json_pretty};

const DEFAULT_INDICATORS: [&str; 2] = ["ACC_OWNERSHIP", "USG_DIGITAL_PAYMENT"];

#[derive(Debug, Serialize)]
struct BacktestReport {
    manifest_version: u32,
    generated_at: String,
    dataset_path: String,
    cutoff_year: i32,
    results: Vec<BacktestResult>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct BacktestResult {
    indicator_code: String,
    train_points: usize,
    holdout_points: usize,
    trend_per_year: f64,
    mae: f64,
    mape_percent: f64,
    comparisons: Vec<Comparison>,
}

#[derive(Debug, Serialize)]
struct Comparison {
    date: NaiveDate,
    predicted: f64,
    actual: f64,
}

/// Fit the baseline on pre-cutoff observations only, project through the
/// held-out dates with event adjustments applied, and score the adjusted
/// base scenario against what actually happened.
pub fn run(args: BacktestArgs) -> Result<()> {
    let data = dataset::load(&args.data_path)?;
    let cutoff = NaiveDate::from_ymd_opt(args.cutoff_year, 1, 1)
        .ok_or_else(|| ModelError::InvalidConfiguration(format!(
            "cutoff year {} is out of range",
            args.cutoff_year
        )))?;

    let indicators: Vec<String> = if args.indicators.is_empty() {
        DEFAULT_INDICATORS.iter().map(|s| s.to_string()).collect()
    } else {
        args.indicators.clone()
    };

    let scale = MagnitudeScale::default();
    let mut results = Vec::new();
    let mut warnings = Vec::new();

    for indicator_code in &indicators {
        let series = data.store.series(indicator_code)?;
        let range = data.store.value_range(indicator_code)?;

        let (train, holdout): (Vec<Observation>, Vec<Observation>) = series
            .iter()
            .cloned()
            .partition(|obs| obs.date < cutoff);

        if train.len() < 2 || holdout.is_empty() {
            let note = format!(
                "skipping {indicator_code}: {} observations before {} and {} after",
                train.len(),
                cutoff,
                holdout.len()
            );
            warn!("{note}");
            warnings.push(note);
            continue;
        }

        let horizon: Vec<NaiveDate> = holdout.iter().map(|obs| obs.date).collect();
        let fc = baseline::fit(indicator_code, &train, range, &horizon)?;

        let links = data.registry.impact_links(indicator_code);
        let adjusted = adjust::apply(&fc, &links, &scale);
        let params = ScenarioParams::for_scenario(Scenario::Base);
        let predicted = scenario::compose(&adjusted, Scenario::Base, &params)?;

        let comparisons: Vec<Comparison> = predicted
            .iter()
            .zip(&holdout)
            .map(|(point, obs)| Comparison {
                date: obs.date,
                predicted: point.estimate,
                actual: obs.value,
            })
            .collect();

        let mae = comparisons
            .iter()
            .map(|c| (c.predicted - c.actual).abs())
            .sum::<f64>()
            / comparisons.len() as f64;

        let scored: Vec<f64> = comparisons
            .iter()
            .filter(|c| c.actual != 0.0)
            .map(|c| ((c.predicted - c.actual) / c.actual).abs())
            .collect();
        let mape_percent = if scored.is_empty() {
            f64::NAN
        } else {
            100.0 * scored.iter().sum::<f64>() / scored.len() as f64
        };

        info!(
            indicator = %indicator_code,
            cutoff_year = cutoff.year(),
            mae,
            mape_percent,
            "backtest scored"
        );

        results.push(BacktestResult {
            indicator_code: indicator_code.clone(),
            train_points: train.len(),
            holdout_points: holdout.len(),
            trend_per_year: fc.trend_per_year,
            mae,
            mape_percent,
            comparisons,
        });
    }

    let report = BacktestReport {
        manifest_version: 1,
        generated_at: now_utc_string(),
        dataset_path: args.data_path.display().to_string(),
        cutoff_year: args.cutoff_year,
        results,
        warnings,
    };

    let report_path = args
        .report_path
        .unwrap_or_else(|| "reports/backtest_summary.json".into());
    write_json_pretty(&report_path, &report)?;
    info!(path = %report_path.display(), results = report.results.len(), "wrote backtest report");

    Ok(())
}
