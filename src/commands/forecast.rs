use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::{ForecastArgs, HorizonStep};
use crate::dataset::{self, Dataset};
use crate::error::ModelError;
use crate::forecast::adjust::{self, MagnitudeScale};
use crate::forecast::scenario::{self, ScenarioParams};
use crate::forecast::{baseline, monthly_horizon, yearly_horizon};
use crate::model::{ForecastPoint, Scenario};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

/// NFIS headline indicators forecast when none are requested explicitly.
const DEFAULT_INDICATORS: [&str; 2] = ["ACC_OWNERSHIP", "USG_DIGITAL_PAYMENT"];

#[derive(Debug, Serialize)]
struct ForecastReport {
    manifest_version: u32,
    generated_at: String,
    dataset_path: String,
    dataset_sha256: String,
    observation_count: usize,
    event_count: usize,
    impact_link_count: usize,
    target_count: usize,
    skipped_rows: usize,
    horizon: Vec<NaiveDate>,
    indicators: Vec<IndicatorProjection>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct IndicatorProjection {
    indicator_code: String,
    last_observed: NaiveDate,
    trend_per_year: f64,
    typical_step: f64,
    baseline: Vec<ForecastPoint>,
    scenarios: Vec<ScenarioProjection>,
    gap_assessments: Vec<GapAssessment>,
}

#[derive(Debug, Serialize)]
struct ScenarioProjection {
    scenario: Scenario,
    points: Vec<ForecastPoint>,
}

#[derive(Debug, Serialize)]
struct GapAssessment {
    scenario: Scenario,
    target_value: f64,
    target_date: NaiveDate,
    reached_on: Option<NaiveDate>,
}

pub fn run(args: ForecastArgs) -> Result<()> {
    let data = dataset::load(&args.data_path)?;
    let dataset_sha256 = sha256_file(&args.data_path)?;

    let mut warnings = warn_inert_links(&data);

    let horizon = match args.step {
        HorizonStep::Yearly => yearly_horizon(args.start_year, args.end_year),
        HorizonStep::Monthly => monthly_horizon(args.start_year, args.end_year),
    };

    let indicators: Vec<String> = if args.indicators.is_empty() {
        DEFAULT_INDICATORS.iter().map(|s| s.to_string()).collect()
    } else {
        args.indicators.clone()
    };

    let scale = MagnitudeScale::default();
    let mut projections = Vec::new();

    for indicator_code in &indicators {
        let series = data.store.series(indicator_code)?;
        let range = data.store.value_range(indicator_code)?;

        let fc = match baseline::fit(indicator_code, series, range, &horizon) {
            Ok(fc) => fc,
            Err(err @ ModelError::InsufficientData { .. }) => {
                warn!(indicator = %indicator_code, "skipping forecast: {err}");
                warnings.push(err.to_string());
                continue;
            }
            Err(err) => return Err(err.into()),
        };

        let links = data.registry.impact_links(indicator_code);
        let adjusted = adjust::apply(&fc, &links, &scale);

        let mut scenarios = Vec::new();
        let mut gap_assessments = Vec::new();
        for scenario_tag in Scenario::ALL {
            let params = ScenarioParams::for_scenario(scenario_tag);
            let points = scenario::compose(&adjusted, scenario_tag, &params)?;

            for target in data
                .targets
                .iter()
                .filter(|target| &target.indicator_code == indicator_code)
            {
                gap_assessments.push(GapAssessment {
                    scenario: scenario_tag,
                    target_value: target.value,
                    target_date: target.date,
                    reached_on: scenario::gap_closing_date(&points, target),
                });
            }

            scenarios.push(ScenarioProjection {
                scenario: scenario_tag,
                points,
            });
        }

        info!(
            indicator = %indicator_code,
            links = links.len(),
            trend_per_year = fc.trend_per_year,
            "forecast complete"
        );

        projections.push(IndicatorProjection {
            indicator_code: indicator_code.clone(),
            last_observed: fc.last_observed,
            trend_per_year: fc.trend_per_year,
            typical_step: fc.typical_step,
            baseline: fc.clipped_points(),
            scenarios,
            gap_assessments,
        });
    }

    let report = ForecastReport {
        manifest_version: 1,
        generated_at: now_utc_string(),
        dataset_path: args.data_path.display().to_string(),
        dataset_sha256,
        observation_count: data.store.observation_count(),
        event_count: data.registry.event_count(),
        impact_link_count: data.link_count(),
        target_count: data.targets.len(),
        skipped_rows: data.skipped_rows,
        horizon,
        indicators: projections,
        warnings,
    };

    let report_path = args
        .report_path
        .unwrap_or_else(|| "reports/forecast_summary.json".into());
    write_json_pretty(&report_path, &report)?;
    info!(path = %report_path.display(), indicators = report.indicators.len(), "wrote forecast report");

    Ok(())
}

/// Impact links whose target indicator is absent from the series store are
/// inert: they contribute nothing and are surfaced here for visibility
/// rather than treated as errors.
fn warn_inert_links(data: &Dataset) -> Vec<String> {
    let mut warnings = Vec::new();
    for link in data.registry.links() {
        if !data.store.contains(&link.target_indicator) {
            warn!(
                link = %link.id,
                target = %link.target_indicator,
                "impact link targets an indicator with no series; link is inert"
            );
            warnings.push(format!(
                "inert impact link {}: no series for {}",
                link.id, link.target_indicator
            ));
        }
    }
    warnings
}
