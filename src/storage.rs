use crate::models::{AlignedRecord, Observation};
use anyhow::Result;
use csv::WriterBuilder;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix cells that a spreadsheet would evaluate as a formula.
fn safe_cell(s: &str) -> String {
    if s.starts_with(['=', '+', '-', '@']) {
        format!("'{s}")
    } else {
        s.to_string()
    }
}

/// Save tidy observations as CSV with header.
pub fn save_series_csv<P: AsRef<Path>>(points: &[Observation], path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(["entity", "indicator", "year", "value"])?;
    for p in points {
        wtr.write_record([
            safe_cell(&p.entity),
            safe_cell(&p.indicator),
            p.year.to_string(),
            p.value.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save aligned records as CSV: `year` then one column per series, blank where
/// a series has no value.
pub fn save_records_csv<P: AsRef<Path>>(
    records: &[AlignedRecord],
    series: &[&str],
    path: P,
) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    let header: Vec<String> = std::iter::once("year".to_string())
        .chain(series.iter().map(|s| safe_cell(s)))
        .collect();
    wtr.write_record(&header)?;
    for r in records {
        let row: Vec<String> = std::iter::once(r.year.to_string())
            .chain(
                series
                    .iter()
                    .map(|s| r.get(s).map(|v| v.to_string()).unwrap_or_default()),
            )
            .collect();
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save tidy observations as a pretty JSON array.
pub fn save_series_json<P: AsRef<Path>>(points: &[Observation], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(points)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save aligned records as a pretty JSON array of flat objects.
pub fn save_records_json<P: AsRef<Path>>(records: &[AlignedRecord], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(records)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
