use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::warn;

use crate::model::{
    Confidence, Direction, Event, EventCategory, ImpactLink, MagnitudeClass, Observation, Pillar,
    Target,
};
use crate::store::{EventRegistry, SeriesStore};

/// One row of the unified dataset CSV, before resolution into typed
/// entities. Every record type shares the same column set; the columns a
/// type does not use stay empty.
#[derive(Debug, Deserialize)]
struct RawRecord {
    record_id: String,
    record_type: String,
    #[serde(default)]
    parent_id: String,
    #[serde(default)]
    indicator_code: String,
    #[serde(default)]
    pillar: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    unit: String,
    #[serde(default)]
    confidence: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    impact_direction: String,
    #[serde(default)]
    impact_magnitude: String,
    #[serde(default)]
    lag_months: String,
    #[serde(default)]
    evidence_basis: String,
    #[serde(default)]
    comparable_country: String,
    #[serde(default)]
    target_value: String,
    #[serde(default)]
    target_date: String,
}

#[derive(Debug)]
pub struct Dataset {
    pub store: SeriesStore,
    pub registry: EventRegistry,
    pub targets: Vec<Target>,
    pub skipped_rows: usize,
}

impl Dataset {
    pub fn link_count(&self) -> usize {
        self.registry.links().len()
    }
}

pub fn load(path: &Path) -> Result<Dataset> {
    let file = File::open(path)
        .with_context(|| format!("failed to open dataset: {}", path.display()))?;
    parse(file).with_context(|| format!("failed to parse dataset: {}", path.display()))
}

pub fn parse<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut observations = Vec::new();
    let mut events = Vec::new();
    let mut links = Vec::new();
    let mut targets = Vec::new();
    let mut skipped_rows = 0_usize;

    for (index, record) in csv_reader.deserialize::<RawRecord>().enumerate() {
        // Header is line 1; data rows start at line 2.
        let line = index + 2;
        let record = record.with_context(|| format!("malformed row at line {line}"))?;

        match record.record_type.as_str() {
            "observation" => observations
                .push(resolve_observation(&record).with_context(|| format!("line {line}"))?),
            "event" => {
                events.push(resolve_event(&record).with_context(|| format!("line {line}"))?)
            }
            "impact_link" => {
                links.push(resolve_link(&record).with_context(|| format!("line {line}"))?)
            }
            "target" => {
                targets.push(resolve_target(&record).with_context(|| format!("line {line}"))?)
            }
            other => {
                warn!(line, record_type = other, "skipping row with unknown record type");
                skipped_rows += 1;
            }
        }
    }

    check_unique_observation_dates(&observations)?;
    check_link_parents(&events, &links)?;

    Ok(Dataset {
        store: SeriesStore::from_observations(observations),
        registry: EventRegistry::new(events, links),
        targets,
        skipped_rows,
    })
}

fn resolve_observation(record: &RawRecord) -> Result<Observation> {
    Ok(Observation {
        indicator_code: required(&record.indicator_code, "indicator_code")?,
        pillar: Pillar::parse(&record.pillar)
            .with_context(|| format!("invalid pillar: {:?}", record.pillar))?,
        value: parse_number(&record.value, "value")?,
        date: parse_date(&record.date, "date")?,
        unit: record.unit.clone(),
        confidence: parse_confidence(&record.confidence)?,
        source: record.source.clone(),
    })
}

fn resolve_event(record: &RawRecord) -> Result<Event> {
    Ok(Event {
        id: required(&record.record_id, "record_id")?,
        date: parse_date(&record.date, "date")?,
        category: EventCategory::parse(&record.category)
            .with_context(|| format!("invalid event category: {:?}", record.category))?,
        description: record.description.clone(),
        source: record.source.clone(),
        confidence: parse_confidence(&record.confidence)?,
    })
}

fn resolve_link(record: &RawRecord) -> Result<ImpactLink> {
    let lag_months: u32 = record
        .lag_months
        .parse()
        .with_context(|| format!("invalid lag_months: {:?}", record.lag_months))?;

    Ok(ImpactLink {
        id: required(&record.record_id, "record_id")?,
        event_id: required(&record.parent_id, "parent_id")?,
        target_indicator: required(&record.indicator_code, "indicator_code")?,
        direction: Direction::parse(&record.impact_direction)
            .with_context(|| format!("invalid impact_direction: {:?}", record.impact_direction))?,
        magnitude: MagnitudeClass::parse(&record.impact_magnitude)
            .with_context(|| format!("invalid impact_magnitude: {:?}", record.impact_magnitude))?,
        lag_months,
        evidence_basis: record.evidence_basis.clone(),
        comparable_country: optional(&record.comparable_country),
    })
}

fn resolve_target(record: &RawRecord) -> Result<Target> {
    Ok(Target {
        indicator_code: required(&record.indicator_code, "indicator_code")?,
        value: parse_number(&record.target_value, "target_value")?,
        date: parse_date(&record.target_date, "target_date")?,
    })
}

fn required(raw: &str, column: &str) -> Result<String> {
    if raw.is_empty() {
        bail!("missing required column: {column}");
    }
    Ok(raw.to_string())
}

fn optional(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

fn parse_number(raw: &str, column: &str) -> Result<f64> {
    raw.parse()
        .with_context(|| format!("invalid number in {column}: {raw:?}"))
}

fn parse_date(raw: &str, column: &str) -> Result<NaiveDate> {
    raw.parse()
        .with_context(|| format!("invalid date in {column}: {raw:?} (expected YYYY-MM-DD)"))
}

fn parse_confidence(raw: &str) -> Result<Confidence> {
    Confidence::parse(raw).with_context(|| format!("invalid confidence: {raw:?}"))
}

/// Observation dates must be unique per indicator; duplicates mean the
/// dataset was assembled incorrectly.
fn check_unique_observation_dates(observations: &[Observation]) -> Result<()> {
    let mut seen: HashSet<(&str, NaiveDate)> = HashSet::new();
    for obs in observations {
        if !seen.insert((obs.indicator_code.as_str(), obs.date)) {
            bail!(
                "duplicate observation for {} on {}",
                obs.indicator_code,
                obs.date
            );
        }
    }
    Ok(())
}

/// Every impact link must reference an event row that exists. A missing
/// target indicator is tolerated (the link is inert), but a dangling
/// parent event is a dataset bug.
fn check_link_parents(events: &[Event], links: &[ImpactLink]) -> Result<()> {
    let known: HashSet<&str> = events.iter().map(|event| event.id.as_str()).collect();
    for link in links {
        if !known.contains(link.event_id.as_str()) {
            bail!(
                "impact link {} references unknown event {}",
                link.id,
                link.event_id
            );
        }
    }
    Ok(())
}
