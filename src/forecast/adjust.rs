use chrono::NaiveDate;

use crate::forecast::BaselineForecast;
use crate::model::{Event, ImpactLink, MagnitudeClass, ValueRange};
use crate::util::add_months;

/// Months over which an event effect ramps from zero to full magnitude.
pub const RAMP_MONTHS: f64 = 6.0;

/// Exponential decay rate, per month past the peak, for transient events.
pub const DECAY_RATE_PER_MONTH: f64 = 0.1;

const AVG_DAYS_PER_MONTH: f64 = 30.44;

/// Magnitude-class multipliers, expressed as fractions of one typical
/// observed step in the target indicator's history. This is an injected
/// modeling constant, not something derivable from the data; it is kept
/// configurable for calibration.
#[derive(Debug, Clone, Copy)]
pub struct MagnitudeScale {
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Default for MagnitudeScale {
    fn default() -> Self {
        Self {
            low: 0.25,
            medium: 0.5,
            high: 1.0,
        }
    }
}

impl MagnitudeScale {
    pub fn multiplier(&self, class: MagnitudeClass) -> f64 {
        match class {
            MagnitudeClass::Low => self.low,
            MagnitudeClass::Medium => self.medium,
            MagnitudeClass::High => self.high,
        }
    }
}

/// One impact link's signed contribution at a single horizon date, in
/// indicator units, before scenario scaling.
#[derive(Debug, Clone)]
pub struct Contribution {
    pub link_id: String,
    pub delta: f64,
}

#[derive(Debug, Clone)]
pub struct AdjustedPoint {
    pub date: NaiveDate,
    pub baseline_estimate: f64,
    pub baseline_half_width: f64,
    pub contributions: Vec<Contribution>,
}

#[derive(Debug, Clone)]
pub struct AdjustedForecast {
    pub indicator_code: String,
    pub range: ValueRange,
    pub points: Vec<AdjustedPoint>,
}

/// Apply every impact link targeting the indicator to its baseline
/// forecast.
///
/// Each link becomes a time-shifted curve: zero before the effective date
/// (event date plus lag), a linear ramp to full magnitude over
/// [`RAMP_MONTHS`], then a hold — or, for transient event categories, an
/// exponential decay back toward zero. Direction flips the sign. A link
/// whose effective date falls past the horizon end simply contributes
/// nothing. With no links at all the output carries the baseline through
/// unchanged.
pub fn apply(
    baseline: &BaselineForecast,
    links: &[(&Event, &ImpactLink)],
    scale: &MagnitudeScale,
) -> AdjustedForecast {
    let points = baseline
        .points
        .iter()
        .map(|point| {
            let mut contributions = Vec::new();
            for (event, link) in links {
                let effective = add_months(event.date, link.lag_months);
                let fraction = effect_fraction(
                    months_between(effective, point.date),
                    event.category.is_transient(),
                );
                if fraction > 0.0 {
                    let delta = link.direction.sign()
                        * scale.multiplier(link.magnitude)
                        * baseline.typical_step
                        * fraction;
                    contributions.push(Contribution {
                        link_id: link.id.clone(),
                        delta,
                    });
                }
            }

            AdjustedPoint {
                date: point.date,
                baseline_estimate: point.estimate,
                baseline_half_width: point.half_width,
                contributions,
            }
        })
        .collect();

    AdjustedForecast {
        indicator_code: baseline.indicator_code.clone(),
        range: baseline.range,
        points,
    }
}

/// Fraction of full magnitude in effect `months_since` months after the
/// effective date. Negative input means the effect has not started.
fn effect_fraction(months_since: f64, transient: bool) -> f64 {
    if months_since < 0.0 {
        return 0.0;
    }
    if transient && months_since > RAMP_MONTHS {
        return (-DECAY_RATE_PER_MONTH * (months_since - RAMP_MONTHS)).exp();
    }
    (months_since / RAMP_MONTHS).min(1.0)
}

fn months_between(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / AVG_DAYS_PER_MONTH
}
