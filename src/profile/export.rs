//! Csv export of the profiles. Scores are rounded to 4 decimals.
use crate::profile::result::{AggregationProfile, RegionSummary, ResultRow};
use crate::shared::utils::round_decimals;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const DECIMALS: i32 = 4;

const PROFILE_HEADER: [&str; 5] = [
    "uniprot_id",
    "position",
    "residue",
    "raw_score",
    "smoothed_score",
];

const REGIONS_HEADER: [&str; 6] = ["uniprot_id", "start", "end", "length", "mean_score", "segment"];

// The header is written by hand so that it is present even without any row.
pub fn write_profile_csv<W: Write>(writer: W, profiles: &[AggregationProfile]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(PROFILE_HEADER)?;
    for profile in profiles {
        for row in profile.rows() {
            wtr.serialize(ResultRow {
                raw_score: round_decimals(row.raw_score, DECIMALS),
                smoothed_score: round_decimals(row.smoothed_score, DECIMALS),
                ..row
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_regions_csv<W: Write>(writer: W, profiles: &[AggregationProfile]) -> Result<()> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(REGIONS_HEADER)?;
    for profile in profiles {
        for summary in profile.region_summaries() {
            wtr.serialize(RegionSummary {
                mean_score: round_decimals(summary.mean_score, DECIMALS),
                ..summary
            })?;
        }
    }
    wtr.flush()?;
    Ok(())
}

/// Write `<prefix>_profile.csv` and `<prefix>_regions.csv`
pub fn export_csv(prefix: &str, profiles: &[AggregationProfile]) -> Result<()> {
    let profile_path = format!("{}_profile.csv", prefix);
    let regions_path = format!("{}_regions.csv", prefix);
    let file = File::create(Path::new(&profile_path))
        .with_context(|| format!("Error creating {}", profile_path))?;
    write_profile_csv(file, profiles)?;
    let file = File::create(Path::new(&regions_path))
        .with_context(|| format!("Error creating {}", regions_path))?;
    write_regions_csv(file, profiles)?;
    Ok(())
}
