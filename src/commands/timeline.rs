use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::cli::TimelineArgs;
use crate::dataset;
use crate::model::EventCategory;

#[derive(Debug, Serialize)]
struct TimelineEntry<'a> {
    id: &'a str,
    date: NaiveDate,
    category: &'static str,
    description: &'a str,
    source: &'a str,
}

pub fn run(args: TimelineArgs) -> Result<()> {
    let data = dataset::load(&args.data_path)?;

    let category = args
        .category
        .as_deref()
        .map(|raw| {
            EventCategory::parse(raw)
                .with_context(|| format!("unknown event category: {raw:?}"))
        })
        .transpose()?;

    let first = data.registry.events().map(|event| event.date).min();
    let start = args
        .from
        .or(first)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid default date"));
    // Half-open range; default end is far enough out to include everything.
    let end = args
        .to
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(2100, 1, 1).expect("valid default date"));

    let entries: Vec<TimelineEntry> = data
        .registry
        .events_in(start, end)
        .into_iter()
        .filter(|event| category.is_none_or(|wanted| event.category == wanted))
        .map(|event| TimelineEntry {
            id: &event.id,
            date: event.date,
            category: event.category.as_str(),
            description: &event.description,
            source: &event.source,
        })
        .collect();

    if args.json {
        let rendered = serde_json::to_string_pretty(&entries)
            .context("failed to serialize timeline entries")?;
        println!("{rendered}");
    } else {
        println!("{:<10} {:<12} {:<16} DESCRIPTION", "ID", "DATE", "CATEGORY");
        for entry in &entries {
            println!(
                "{:<10} {:<12} {:<16} {}",
                entry.id, entry.date, entry.category, entry.description
            );
        }
    }

    info!(events = entries.len(), %start, %end, "timeline complete");
    Ok(())
}
