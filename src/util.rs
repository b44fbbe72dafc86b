use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Months, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = file
            .read(&mut buf)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    file.write_all(&data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}

/// Calendar-month addition, saturating at the far end of the date range.
pub fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

/// Continuous time axis for trend fitting, in fractional years.
pub fn year_fraction(date: NaiveDate) -> f64 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date");
    (date - epoch).num_days() as f64 / 365.25
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_months_handles_month_end_clamping() {
        let date: NaiveDate = "2020-01-31".parse().unwrap();
        assert_eq!(add_months(date, 1), "2020-02-29".parse::<NaiveDate>().unwrap());
        assert_eq!(add_months(date, 13), "2021-02-28".parse::<NaiveDate>().unwrap());
    }

    #[test]
    fn add_months_zero_is_identity() {
        let date: NaiveDate = "2018-06-01".parse().unwrap();
        assert_eq!(add_months(date, 0), date);
    }

    #[test]
    fn year_fraction_spans_one_year_across_365_days() {
        let a: NaiveDate = "2021-06-30".parse().unwrap();
        let b: NaiveDate = "2022-06-30".parse().unwrap();
        let span = year_fraction(b) - year_fraction(a);
        assert!((span - 1.0).abs() < 0.01);
    }
}
