use std::collections::BTreeMap;

use anyhow::Result;
use tracing::info;

use crate::cli::SummaryArgs;
use crate::dataset;

pub fn run(args: SummaryArgs) -> Result<()> {
    let data = dataset::load(&args.data_path)?;

    println!("Dataset: {}", args.data_path.display());
    println!();
    println!("Records");
    println!("  observations : {}", data.store.observation_count());
    println!("  events       : {}", data.registry.event_count());
    println!("  impact links : {}", data.link_count());
    println!("  targets      : {}", data.targets.len());
    if data.skipped_rows > 0 {
        println!("  skipped rows : {}", data.skipped_rows);
    }

    let mut by_pillar: BTreeMap<&str, usize> = BTreeMap::new();
    let mut indicator_count = 0_usize;
    for code in data.store.indicator_codes() {
        indicator_count += 1;
        let series = data.store.series(code)?;
        for obs in series {
            *by_pillar.entry(obs.pillar.as_str()).or_default() += 1;
        }
    }

    println!();
    println!("Observations by pillar ({indicator_count} indicators)");
    for (pillar, count) in &by_pillar {
        println!("  {pillar:<14}: {count}");
    }

    let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
    for event in data.registry.events() {
        *by_category.entry(event.category.as_str()).or_default() += 1;
    }

    println!();
    println!("Events by category");
    for (category, count) in &by_category {
        println!("  {category:<14}: {count}");
    }

    let mut by_magnitude: BTreeMap<&str, usize> = BTreeMap::new();
    for link in data.registry.links() {
        *by_magnitude.entry(link.magnitude.as_str()).or_default() += 1;
    }

    println!();
    println!("Impact links by magnitude class");
    for (magnitude, count) in &by_magnitude {
        println!("  {magnitude:<14}: {count}");
    }

    info!("summary complete");
    Ok(())
}
