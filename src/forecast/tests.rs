use chrono::NaiveDate;

use super::adjust::{self, MagnitudeScale};
use super::scenario::{self, ScenarioParams};
use super::{baseline, yearly_horizon};
use crate::error::ModelError;
use crate::model::{
    Confidence, Direction, Event, EventCategory, ImpactLink, MagnitudeClass, Observation, Pillar,
    Scenario, Target, ValueRange,
};

fn total_delta(point: &adjust::AdjustedPoint) -> f64 {
    point.contributions.iter().map(|c| c.delta).sum()
}

fn date(s: &str) -> NaiveDate {
    s.parse().expect("valid test date")
}

fn obs(year: i32, value: f64) -> Observation {
    Observation {
        indicator_code: "ACC_OWNERSHIP".to_string(),
        pillar: Pillar::Access,
        value,
        date: NaiveDate::from_ymd_opt(year, 6, 30).unwrap(),
        unit: "percent_of_adults".to_string(),
        confidence: Confidence::High,
        source: "Global Findex".to_string(),
    }
}

/// The Findex account-ownership history used throughout the analysis.
fn findex_series() -> Vec<Observation> {
    vec![
        obs(2011, 14.0),
        obs(2014, 22.0),
        obs(2017, 35.0),
        obs(2021, 46.0),
        obs(2024, 49.0),
    ]
}

fn event(id: &str, date_str: &str, category: EventCategory) -> Event {
    Event {
        id: id.to_string(),
        date: date(date_str),
        category,
        description: String::new(),
        source: String::new(),
        confidence: Confidence::Medium,
    }
}

fn link(
    id: &str,
    event_id: &str,
    direction: Direction,
    magnitude: MagnitudeClass,
    lag_months: u32,
) -> ImpactLink {
    ImpactLink {
        id: id.to_string(),
        event_id: event_id.to_string(),
        target_indicator: "ACC_OWNERSHIP".to_string(),
        direction,
        magnitude,
        lag_months,
        evidence_basis: String::new(),
        comparable_country: None,
    }
}

#[test]
fn empty_series_is_insufficient_data() {
    let horizon = yearly_horizon(2025, 2027);
    let result = baseline::fit("ACC_OWNERSHIP", &[], ValueRange::PERCENT, &horizon);
    assert!(matches!(
        result,
        Err(ModelError::InsufficientData { .. })
    ));
}

#[test]
fn forecast_agrees_with_history_at_observed_dates() {
    let series = findex_series();
    let horizon = yearly_horizon(2021, 2027);
    let forecast =
        baseline::fit("ACC_OWNERSHIP", &series, ValueRange::PERCENT, &horizon).unwrap();

    let at_2021 = forecast
        .points
        .iter()
        .find(|p| p.date == date("2021-06-30"))
        .unwrap();
    assert_eq!(at_2021.estimate, 46.0);
    assert_eq!(at_2021.half_width, 0.0);

    let at_2024 = forecast
        .points
        .iter()
        .find(|p| p.date == date("2024-06-30"))
        .unwrap();
    assert_eq!(at_2024.estimate, 49.0);
    assert_eq!(at_2024.half_width, 0.0);
}

#[test]
fn band_width_is_non_decreasing_with_distance_from_last_observation() {
    let series = findex_series();
    let horizon = yearly_horizon(2025, 2035);
    let forecast =
        baseline::fit("ACC_OWNERSHIP", &series, ValueRange::PERCENT, &horizon).unwrap();

    for pair in forecast.points.windows(2) {
        assert!(
            pair[1].half_width >= pair[0].half_width,
            "band narrowed between {} and {}",
            pair[0].date,
            pair[1].date
        );
    }
}

#[test]
fn carry_forward_fallback_below_three_points() {
    let series = vec![obs(2021, 46.0), obs(2024, 49.0)];
    let horizon = yearly_horizon(2025, 2027);
    let forecast =
        baseline::fit("ACC_OWNERSHIP", &series, ValueRange::PERCENT, &horizon).unwrap();

    for point in &forecast.points {
        assert_eq!(point.estimate, 49.0);
    }
    assert!(forecast.points[0].half_width > 0.0);
    assert!(forecast.points[2].half_width > forecast.points[0].half_width);
}

#[test]
fn bounds_stay_within_percent_range_in_every_scenario() {
    let series = findex_series();
    let horizon = yearly_horizon(2025, 2060);
    let fc = baseline::fit("ACC_OWNERSHIP", &series, ValueRange::PERCENT, &horizon).unwrap();

    let events = [event("EVT_001", "2018-06-01", EventCategory::Policy)];
    let links_owned = [link(
        "IMP_001",
        "EVT_001",
        Direction::Increase,
        MagnitudeClass::High,
        24,
    )];
    let pairs: Vec<(&Event, &ImpactLink)> = vec![(&events[0], &links_owned[0])];
    let adjusted = adjust::apply(&fc, &pairs, &MagnitudeScale::default());

    for scenario in Scenario::ALL {
        let params = ScenarioParams::for_scenario(scenario);
        let points = scenario::compose(&adjusted, scenario, &params).unwrap();
        for point in points {
            assert!(point.lower <= point.estimate, "lower > estimate at {}", point.date);
            assert!(point.estimate <= point.upper, "estimate > upper at {}", point.date);
            assert!(point.lower >= 0.0 && point.upper <= 100.0);
        }
    }
}

#[test]
fn effective_date_past_horizon_contributes_nothing() {
    let series = findex_series();
    let horizon = yearly_horizon(2025, 2027);
    let fc = baseline::fit("ACC_OWNERSHIP", &series, ValueRange::PERCENT, &horizon).unwrap();

    // Event in 2027 with a 60-month lag lands well past the horizon end.
    let events = [event("EVT_009", "2027-01-01", EventCategory::Infrastructure)];
    let links_owned = [link(
        "IMP_009",
        "EVT_009",
        Direction::Increase,
        MagnitudeClass::High,
        60,
    )];
    let pairs: Vec<(&Event, &ImpactLink)> = vec![(&events[0], &links_owned[0])];
    let adjusted = adjust::apply(&fc, &pairs, &MagnitudeScale::default());

    for point in &adjusted.points {
        assert!(point.contributions.is_empty());
        assert_eq!(total_delta(point), 0.0);
    }
}

#[test]
fn opposite_equal_links_cancel_after_full_ramp() {
    let series = findex_series();
    let horizon = yearly_horizon(2025, 2027);
    let fc = baseline::fit("ACC_OWNERSHIP", &series, ValueRange::PERCENT, &horizon).unwrap();

    let events = [event("EVT_001", "2018-06-01", EventCategory::Policy)];
    let links_owned = [
        link("IMP_UP", "EVT_001", Direction::Increase, MagnitudeClass::Medium, 12),
        link("IMP_DOWN", "EVT_001", Direction::Decrease, MagnitudeClass::Medium, 12),
    ];
    let pairs: Vec<(&Event, &ImpactLink)> =
        vec![(&events[0], &links_owned[0]), (&events[0], &links_owned[1])];
    let adjusted = adjust::apply(&fc, &pairs, &MagnitudeScale::default());

    // Both links are at full magnitude throughout the horizon.
    for point in &adjusted.points {
        assert_eq!(point.contributions.len(), 2);
        assert!(total_delta(point).abs() < 1e-12);
    }
}

#[test]
fn zero_links_leaves_baseline_untouched() {
    let series = findex_series();
    let horizon = yearly_horizon(2025, 2027);
    let fc = baseline::fit("ACC_OWNERSHIP", &series, ValueRange::PERCENT, &horizon).unwrap();

    let adjusted = adjust::apply(&fc, &[], &MagnitudeScale::default());
    let params = ScenarioParams::for_scenario(Scenario::Base);
    let composed = scenario::compose(&adjusted, Scenario::Base, &params).unwrap();
    let baseline_points = fc.clipped_points();

    assert_eq!(composed.len(), baseline_points.len());
    for (got, expected) in composed.iter().zip(&baseline_points) {
        assert_eq!(got.date, expected.date);
        assert_eq!(got.estimate, expected.estimate);
        assert_eq!(got.lower, expected.lower);
        assert_eq!(got.upper, expected.upper);
        assert_eq!(got.provenance, crate::model::Provenance::BaselineOnly);
        assert!(got.contributing_links.is_empty());
    }
}

#[test]
fn transient_pricing_shock_decays_while_policy_effect_holds() {
    let series = findex_series();
    let horizon = yearly_horizon(2025, 2030);
    let fc = baseline::fit("ACC_OWNERSHIP", &series, ValueRange::PERCENT, &horizon).unwrap();

    let pricing = [event("EVT_PRICE", "2024-01-01", EventCategory::Pricing)];
    let pricing_link = [link(
        "IMP_PRICE",
        "EVT_PRICE",
        Direction::Decrease,
        MagnitudeClass::High,
        0,
    )];
    let pairs: Vec<(&Event, &ImpactLink)> = vec![(&pricing[0], &pricing_link[0])];
    let adjusted = adjust::apply(&fc, &pairs, &MagnitudeScale::default());

    let first = total_delta(adjusted.points.first().unwrap());
    let last = total_delta(adjusted.points.last().unwrap());
    assert!(first < 0.0);
    assert!(last.abs() < first.abs(), "pricing shock did not decay");

    let policy = [event("EVT_POL", "2024-01-01", EventCategory::Policy)];
    let policy_link = [link(
        "IMP_POL",
        "EVT_POL",
        Direction::Increase,
        MagnitudeClass::High,
        0,
    )];
    let pairs: Vec<(&Event, &ImpactLink)> = vec![(&policy[0], &policy_link[0])];
    let adjusted = adjust::apply(&fc, &pairs, &MagnitudeScale::default());

    let first = total_delta(adjusted.points.first().unwrap());
    let last = total_delta(adjusted.points.last().unwrap());
    assert!((first - last).abs() < 1e-12, "policy effect should hold");
}

#[test]
fn invalid_scenario_parameters_are_rejected_before_composition() {
    let series = findex_series();
    let horizon = yearly_horizon(2025, 2027);
    let fc = baseline::fit("ACC_OWNERSHIP", &series, ValueRange::PERCENT, &horizon).unwrap();
    let adjusted = adjust::apply(&fc, &[], &MagnitudeScale::default());

    for params in [
        ScenarioParams {
            magnitude_scale: -1.0,
            band_scale: 1.0,
        },
        ScenarioParams {
            magnitude_scale: 1.0,
            band_scale: 0.0,
        },
        ScenarioParams {
            magnitude_scale: f64::NAN,
            band_scale: 1.0,
        },
    ] {
        let result = scenario::compose(&adjusted, Scenario::Base, &params);
        assert!(matches!(result, Err(ModelError::InvalidConfiguration(_))));
    }
}

#[test]
fn end_to_end_findex_scenario_ordering() {
    let series = findex_series();
    let horizon = yearly_horizon(2025, 2027);
    let fc = baseline::fit("ACC_OWNERSHIP", &series, ValueRange::PERCENT, &horizon).unwrap();

    // Slowdown in the 2021-2024 stretch pulls the fitted trend below the
    // early-period growth rate.
    assert!(fc.trend_per_year > 0.0);
    assert!(fc.trend_per_year < 4.0);

    // Effective date 2020-06-01 precedes the horizon, so the increase link
    // is at full magnitude at every horizon date.
    let events = [event("EVT_001", "2018-06-01", EventCategory::Policy)];
    let links_owned = [link(
        "IMP_001",
        "EVT_001",
        Direction::Increase,
        MagnitudeClass::Medium,
        24,
    )];
    let pairs: Vec<(&Event, &ImpactLink)> = vec![(&events[0], &links_owned[0])];
    let adjusted = adjust::apply(&fc, &pairs, &MagnitudeScale::default());

    let baseline_points = fc.clipped_points();
    let mut by_scenario = Vec::new();
    for scenario in Scenario::ALL {
        let params = ScenarioParams::for_scenario(scenario);
        by_scenario.push(scenario::compose(&adjusted, scenario, &params).unwrap());
    }
    let [base, optimistic, pessimistic] = <[Vec<_>; 3]>::try_from(by_scenario).unwrap();

    for i in 0..horizon.len() {
        assert!(
            base[i].estimate >= baseline_points[i].estimate,
            "adjusted base fell below baseline at {}",
            base[i].date
        );
        assert!(optimistic[i].estimate >= base[i].estimate);
        assert!(base[i].estimate >= pessimistic[i].estimate);
        assert_eq!(base[i].contributing_links, vec!["IMP_001".to_string()]);
    }
}

#[test]
fn gap_closing_date_finds_first_reaching_point() {
    let series = findex_series();
    let horizon = yearly_horizon(2025, 2027);
    let fc = baseline::fit("ACC_OWNERSHIP", &series, ValueRange::PERCENT, &horizon).unwrap();
    let adjusted = adjust::apply(&fc, &[], &MagnitudeScale::default());
    let params = ScenarioParams::for_scenario(Scenario::Base);
    let points = scenario::compose(&adjusted, Scenario::Base, &params).unwrap();

    let modest = Target {
        indicator_code: "ACC_OWNERSHIP".to_string(),
        value: 50.0,
        date: date("2027-12-31"),
    };
    let nfis = Target {
        indicator_code: "ACC_OWNERSHIP".to_string(),
        value: 70.0,
        date: date("2027-12-31"),
    };

    assert!(scenario::gap_closing_date(&points, &modest).is_some());
    // The 70% NFIS target is out of reach on the baseline trend by 2027.
    assert_eq!(scenario::gap_closing_date(&points, &nfis), None);
}
