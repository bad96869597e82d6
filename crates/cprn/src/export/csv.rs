//! CSV export of search records and interval rows.
//!
//! Record rows get the fixed traversal columns first, then every facility
//! column that appears in any record (sorted). Missing cells are empty.

use crate::error::{CprnError, Result};
use crate::search::{IntervalRow, SearchRecord};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const TRAVERSAL_COLUMNS: [&str; 10] = [
    "vtx_start",
    "vtx_intvl_src",
    "vtx_intvl_tgt",
    "depth",
    "interval_weight",
    "cumulative_weight",
    "interval_edges",
    "cumulative_edges",
    "reach_max_depth",
    "reach_max_dist",
];

fn write_failed(e: std::io::Error) -> CprnError {
    CprnError::storage("Failed to write CSV", Some(e))
}

fn write_row<W: Write>(writer: &mut W, cells: impl IntoIterator<Item = String>) -> Result<()> {
    let line = cells.into_iter().map(|c| escape_csv(&c)).collect::<Vec<_>>().join(",");
    writeln!(writer, "{line}").map_err(write_failed)
}

/// Write search records as CSV.
pub fn write_records_csv<W: Write>(records: &[SearchRecord], writer: &mut W) -> Result<()> {
    let rows: Vec<_> = records.iter().map(SearchRecord::to_properties).collect();

    let facility_columns: BTreeSet<&String> = rows
        .iter()
        .flat_map(|row| row.keys())
        .filter(|key| !TRAVERSAL_COLUMNS.contains(&key.as_str()))
        .collect();
    let columns: Vec<&str> = TRAVERSAL_COLUMNS
        .iter()
        .copied()
        .chain(facility_columns.iter().map(|k| k.as_str()))
        .collect();

    write_row(writer, columns.iter().map(|c| c.to_string()))?;
    for row in &rows {
        write_row(
            writer,
            columns
                .iter()
                .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default()),
        )?;
    }
    writer.flush().map_err(write_failed)
}

/// Write interval rows as CSV, columns in [`IntervalRow::COLUMNS`] order.
pub fn write_intervals_csv<W: Write>(rows: &[IntervalRow], writer: &mut W) -> Result<()> {
    write_row(writer, IntervalRow::COLUMNS.iter().map(|c| c.to_string()))?;
    for row in rows {
        write_row(writer, row.cells())?;
    }
    writer.flush().map_err(write_failed)
}

/// Write search records to a CSV file.
pub fn export_records_csv(records: &[SearchRecord], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        CprnError::storage(format!("Failed to create CSV file: {}", path.display()), Some(e))
    })?;
    write_records_csv(records, &mut BufWriter::new(file))
}

/// Write interval rows to a CSV file.
pub fn export_intervals_csv(rows: &[IntervalRow], path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        CprnError::storage(format!("Failed to create CSV file: {}", path.display()), Some(e))
    })?;
    write_intervals_csv(rows, &mut BufWriter::new(file))
}

/// Escape CSV value (add quotes if contains comma, quote, or line break)
pub fn escape_csv(s: &str) -> String {
    if s.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
