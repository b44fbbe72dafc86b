pub mod adjust;
pub mod baseline;
pub mod scenario;

#[cfg(test)]
mod tests;

use chrono::NaiveDate;

use crate::model::{ForecastPoint, Provenance, Scenario, ValueRange};

/// Yearly horizon dates, one mid-year point per year (the dataset's Findex
/// observations are reported mid-year).
pub fn yearly_horizon(start_year: i32, end_year: i32) -> Vec<NaiveDate> {
    (start_year..=end_year)
        .filter_map(|year| NaiveDate::from_ymd_opt(year, 6, 30))
        .collect()
}

/// Monthly horizon dates, first of each month from January of the start
/// year through December of the end year.
pub fn monthly_horizon(start_year: i32, end_year: i32) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for year in start_year..=end_year {
        for month in 1..=12 {
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) {
                dates.push(date);
            }
        }
    }
    dates
}

/// Baseline trend forecast for one indicator, before event adjustments.
/// Estimates and half-widths are kept unclipped; range clamping happens
/// when points are emitted.
#[derive(Debug, Clone)]
pub struct BaselineForecast {
    pub indicator_code: String,
    pub range: ValueRange,
    pub last_observed: NaiveDate,
    /// Mean absolute change between consecutive observations, the unit in
    /// which magnitude classes are expressed.
    pub typical_step: f64,
    pub trend_per_year: f64,
    pub points: Vec<BaselinePoint>,
}

#[derive(Debug, Clone, Copy)]
pub struct BaselinePoint {
    pub date: NaiveDate,
    pub estimate: f64,
    pub half_width: f64,
}

impl BaselineForecast {
    /// Emit the baseline as presentation-ready points, clamped into the
    /// indicator's valid range.
    pub fn clipped_points(&self) -> Vec<ForecastPoint> {
        self.points
            .iter()
            .map(|point| ForecastPoint {
                indicator_code: self.indicator_code.clone(),
                date: point.date,
                estimate: self.range.clamp(point.estimate),
                lower: self.range.clamp(point.estimate - point.half_width),
                upper: self.range.clamp(point.estimate + point.half_width),
                scenario: Scenario::Base,
                provenance: Provenance::BaselineOnly,
                contributing_links: Vec::new(),
            })
            .collect()
    }
}
