use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::ModelError;
use crate::model::{Event, ImpactLink, Observation, ValueRange};

/// Immutable per-indicator observation series, ascending by date.
///
/// No resampling happens here; irregular spacing (annual points, multi-year
/// gaps) is preserved for the baseline forecaster to deal with.
#[derive(Debug, Default)]
pub struct SeriesStore {
    series: BTreeMap<String, Vec<Observation>>,
}

impl SeriesStore {
    pub fn from_observations(observations: Vec<Observation>) -> Self {
        let mut series: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
        for obs in observations {
            series.entry(obs.indicator_code.clone()).or_default().push(obs);
        }
        for values in series.values_mut() {
            values.sort_by_key(|obs| obs.date);
        }
        Self { series }
    }

    /// Ordered observations for an indicator. Unknown codes are an error;
    /// a known indicator with zero observations returns an empty slice.
    pub fn series(&self, indicator_code: &str) -> Result<&[Observation], ModelError> {
        self.series
            .get(indicator_code)
            .map(Vec::as_slice)
            .ok_or_else(|| ModelError::NotFound(indicator_code.to_string()))
    }

    pub fn contains(&self, indicator_code: &str) -> bool {
        self.series.contains_key(indicator_code)
    }

    pub fn indicator_codes(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn observation_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    /// Sanity range for an indicator, derived from the unit of its
    /// observations: percentage series clip to [0, 100], everything else
    /// stays non-negative.
    pub fn value_range(&self, indicator_code: &str) -> Result<ValueRange, ModelError> {
        let series = self.series(indicator_code)?;
        let is_percent = series
            .first()
            .map(|obs| {
                let unit = obs.unit.trim().to_ascii_lowercase();
                unit == "%" || unit.contains("percent")
            })
            .unwrap_or(false);

        Ok(if is_percent {
            ValueRange::PERCENT
        } else {
            ValueRange::NON_NEGATIVE
        })
    }
}

/// Immutable registry of events and their modeled impact links.
#[derive(Debug, Default)]
pub struct EventRegistry {
    events: BTreeMap<String, Event>,
    links: Vec<ImpactLink>,
}

impl EventRegistry {
    pub fn new(events: Vec<Event>, links: Vec<ImpactLink>) -> Self {
        let events = events
            .into_iter()
            .map(|event| (event.id.clone(), event))
            .collect();
        Self { events, links }
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    pub fn links(&self) -> &[ImpactLink] {
        &self.links
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Impact links targeting an indicator, paired with their parent event
    /// and ordered by event date ascending. Links whose parent event is
    /// missing were rejected at load time, so the lookup cannot fail here.
    pub fn impact_links(&self, target_indicator: &str) -> Vec<(&Event, &ImpactLink)> {
        let mut matched: Vec<(&Event, &ImpactLink)> = self
            .links
            .iter()
            .filter(|link| link.target_indicator == target_indicator)
            .filter_map(|link| self.events.get(&link.event_id).map(|event| (event, link)))
            .collect();
        matched.sort_by_key(|(event, _)| event.date);
        matched
    }

    /// Events within the half-open interval [start, end), date ascending.
    pub fn events_in(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Event> {
        let mut matched: Vec<&Event> = self
            .events
            .values()
            .filter(|event| event.date >= start && event.date < end)
            .collect();
        matched.sort_by_key(|event| event.date);
        matched
    }
}
