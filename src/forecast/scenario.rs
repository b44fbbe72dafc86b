use chrono::NaiveDate;

use crate::error::ModelError;
use crate::forecast::adjust::AdjustedForecast;
use crate::model::{ForecastPoint, Provenance, Scenario, Target};

/// Scaling applied on top of the adjusted forecast for one named scenario.
#[derive(Debug, Clone, Copy)]
pub struct ScenarioParams {
    pub magnitude_scale: f64,
    pub band_scale: f64,
}

impl ScenarioParams {
    pub fn for_scenario(scenario: Scenario) -> Self {
        match scenario {
            Scenario::Base => Self {
                magnitude_scale: 1.0,
                band_scale: 1.0,
            },
            Scenario::Optimistic => Self {
                magnitude_scale: 1.3,
                band_scale: 0.8,
            },
            Scenario::Pessimistic => Self {
                magnitude_scale: 0.7,
                band_scale: 1.3,
            },
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for (name, value) in [
            ("magnitude_scale", self.magnitude_scale),
            ("band_scale", self.band_scale),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ModelError::InvalidConfiguration(format!(
                    "{name} must be a positive finite number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Compose one scenario view of an adjusted forecast.
///
/// Per-link deltas are scaled by the scenario's magnitude factor and summed
/// into the central estimate; scaled deltas join the baseline half-width in
/// quadrature (independent event effects treated as uncorrelated variance),
/// then the whole band is scaled by the scenario's band factor. Range
/// clipping is re-applied after scaling, so `lower <= estimate <= upper`
/// holds inside the indicator's valid range at every date.
pub fn compose(
    adjusted: &AdjustedForecast,
    scenario: Scenario,
    params: &ScenarioParams,
) -> Result<Vec<ForecastPoint>, ModelError> {
    params.validate()?;

    let points = adjusted
        .points
        .iter()
        .map(|point| {
            let scaled: Vec<f64> = point
                .contributions
                .iter()
                .map(|c| c.delta * params.magnitude_scale)
                .collect();

            let estimate = point.baseline_estimate + scaled.iter().sum::<f64>();
            let adjustment_var: f64 = scaled.iter().map(|d| d * d).sum();
            let half_width = params.band_scale
                * (point.baseline_half_width * point.baseline_half_width + adjustment_var).sqrt();

            let provenance = if point.contributions.is_empty() {
                Provenance::BaselineOnly
            } else {
                Provenance::EventAdjusted
            };

            ForecastPoint {
                indicator_code: adjusted.indicator_code.clone(),
                date: point.date,
                estimate: adjusted.range.clamp(estimate),
                lower: adjusted.range.clamp(estimate - half_width),
                upper: adjusted.range.clamp(estimate + half_width),
                scenario,
                provenance,
                contributing_links: point
                    .contributions
                    .iter()
                    .map(|c| c.link_id.clone())
                    .collect(),
            }
        })
        .collect();

    Ok(points)
}

/// Earliest horizon date whose central estimate reaches the target value,
/// or `None` when the target is not reached within the horizon.
pub fn gap_closing_date(points: &[ForecastPoint], target: &Target) -> Option<NaiveDate> {
    points
        .iter()
        .find(|point| point.estimate >= target.value)
        .map(|point| point.date)
}
