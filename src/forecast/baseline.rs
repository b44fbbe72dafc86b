use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::ModelError;
use crate::forecast::{BaselineForecast, BaselinePoint};
use crate::model::{Observation, ValueRange};
use crate::util::year_fraction;

/// 95% band on the trend residuals.
const CONFIDENCE_Z: f64 = 1.96;

/// Band growth per year in carry-forward mode with a single observation,
/// as a fraction of the observed level.
const FALLBACK_BAND_FRACTION_PER_YEAR: f64 = 0.10;
const FALLBACK_BAND_FLOOR_PER_YEAR: f64 = 1.0;

/// Fit a baseline trend to an indicator's history and project it over the
/// horizon, ignoring events.
///
/// With three or more observations this is an ordinary least-squares line
/// in fractional years; below that the last value is carried forward with
/// a linearly widening band. A horizon date that coincides with an actual
/// observation returns the historical value exactly, with a zero-width
/// band, so the forecast has no discontinuity against history. The band
/// half-width grows monotonically with distance from the last observation.
/// Clipping into the indicator's valid range is deferred to emission so
/// the adjuster can widen the band before clamping.
pub fn fit(
    indicator_code: &str,
    series: &[Observation],
    range: ValueRange,
    horizon: &[NaiveDate],
) -> Result<BaselineForecast, ModelError> {
    let Some(last) = series.last() else {
        return Err(ModelError::InsufficientData {
            indicator: indicator_code.to_string(),
        });
    };

    let observed: BTreeMap<NaiveDate, f64> =
        series.iter().map(|obs| (obs.date, obs.value)).collect();
    let last_x = year_fraction(last.date);

    let typical_step = typical_step(series);
    let trend = fit_trend(series);

    let points = horizon
        .iter()
        .map(|&date| {
            if let Some(&value) = observed.get(&date) {
                return BaselinePoint {
                    date,
                    estimate: value,
                    half_width: 0.0,
                };
            }

            let years_ahead = (year_fraction(date) - last_x).max(0.0);
            match trend {
                Trend::Linear {
                    slope,
                    intercept,
                    residual_std,
                } => BaselinePoint {
                    date,
                    estimate: intercept + slope * year_fraction(date),
                    half_width: CONFIDENCE_Z * residual_std * years_ahead.sqrt(),
                },
                Trend::CarryForward { band_per_year } => BaselinePoint {
                    date,
                    estimate: last.value,
                    half_width: band_per_year * years_ahead,
                },
            }
        })
        .collect();

    Ok(BaselineForecast {
        indicator_code: indicator_code.to_string(),
        range,
        last_observed: last.date,
        typical_step,
        trend_per_year: match trend {
            Trend::Linear { slope, .. } => slope,
            Trend::CarryForward { .. } => 0.0,
        },
        points,
    })
}

#[derive(Debug, Clone, Copy)]
enum Trend {
    Linear {
        slope: f64,
        intercept: f64,
        residual_std: f64,
    },
    CarryForward {
        band_per_year: f64,
    },
}

fn fit_trend(series: &[Observation]) -> Trend {
    if series.len() >= 3 {
        let xs: Vec<f64> = series.iter().map(|obs| year_fraction(obs.date)).collect();
        let ys: Vec<f64> = series.iter().map(|obs| obs.value).collect();
        let (slope, intercept, residual_std) = linear_fit(&xs, &ys);
        return Trend::Linear {
            slope,
            intercept,
            residual_std,
        };
    }

    let band_per_year = if series.len() == 2 {
        let span_years =
            (year_fraction(series[1].date) - year_fraction(series[0].date)).max(f64::EPSILON);
        ((series[1].value - series[0].value).abs() / span_years)
            .max(FALLBACK_BAND_FLOOR_PER_YEAR)
    } else {
        let level = series[0].value.abs();
        (level * FALLBACK_BAND_FRACTION_PER_YEAR).max(FALLBACK_BAND_FLOOR_PER_YEAR)
    };

    Trend::CarryForward { band_per_year }
}

/// Mean absolute change between consecutive observations. This is the
/// "one typical observed step" unit that magnitude classes scale against;
/// with fewer than two points it defaults to 1.0 indicator unit.
pub fn typical_step(series: &[Observation]) -> f64 {
    if series.len() < 2 {
        return 1.0;
    }

    let total: f64 = series
        .windows(2)
        .map(|pair| (pair[1].value - pair[0].value).abs())
        .sum();
    total / (series.len() - 1) as f64
}

fn linear_fit(xs: &[f64], ys: &[f64]) -> (f64, f64, f64) {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        cov += (x - mean_x) * (y - mean_y);
        var += (x - mean_x) * (x - mean_x);
    }

    let slope = if var > 0.0 { cov / var } else { 0.0 };
    let intercept = mean_y - slope * mean_x;

    let residual_sq: f64 = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| {
            let fitted = intercept + slope * x;
            (y - fitted) * (y - fitted)
        })
        .sum();
    let residual_std = (residual_sq / n).sqrt();

    (slope, intercept, residual_std)
}
