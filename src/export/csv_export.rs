//! CSV tables for catalogs and intensity grids.
//!
//! Catalogs are written with the full column set of
//! [`CATALOG_COLUMNS`] and can be read back as writer input; intensity
//! tables are written with their own header.

use std::io::{Read, Write};
use std::path::Path;

use crate::core::event_record::{EventRecord, CATALOG_COLUMNS};
use crate::core::shakemap::{Cell, IntensityTable};
use crate::util::error::{ConversionError, Result};

fn csv_err(context: &str) -> impl Fn(csv::Error) -> ConversionError + '_ {
    move |e| ConversionError::Csv(format!("{context}: {e}"))
}

/// Write catalog rows as CSV to any writer.
///
/// The header is always written, so an empty catalog still carries the
/// column schema.
pub fn write_catalog_csv<W: Write>(events: &[EventRecord], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer
        .write_record(CATALOG_COLUMNS)
        .map_err(csv_err("Failed to write CSV header"))?;
    for event in events {
        writer
            .serialize(event)
            .map_err(csv_err("Failed to write CSV row"))?;
    }
    writer
        .flush()
        .map_err(|e| ConversionError::Export(format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

/// Export catalog rows to a CSV file at `path`.
///
/// # Errors
/// Returns [`ConversionError::Export`] if the file cannot be created, or
/// [`ConversionError::Csv`] if a row cannot be written.
pub fn export_catalog_csv(events: &[EventRecord], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .map_err(|e| ConversionError::Export(format!("Failed to create CSV file: {e}")))?;
    write_catalog_csv(events, std::io::BufWriter::new(file))?;

    tracing::info!("Exported {} events to CSV: {}", events.len(), path.display());
    Ok(())
}

/// Read catalog rows from CSV.
///
/// Columns are matched by header name. Unknown columns are ignored and
/// absent ones are treated as missing values; numeric cells that do not
/// parse become NaN.
pub fn read_catalog_csv<R: Read>(reader: R) -> Result<Vec<EventRecord>> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<EventRecord>, _>>()
        .map_err(csv_err("Failed to read CSV row"))
}

/// Read catalog rows from the CSV file at `path`.
pub fn import_catalog_csv(path: &Path) -> Result<Vec<EventRecord>> {
    let file = std::fs::File::open(path)?;
    let events = read_catalog_csv(std::io::BufReader::new(file))?;
    tracing::info!("Imported {} events from CSV: {}", events.len(), path.display());
    Ok(events)
}

/// Write an intensity table as CSV to any writer.
pub fn write_intensity_csv<W: Write>(table: &IntensityTable, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer
        .write_record(table.column_names())
        .map_err(csv_err("Failed to write CSV header"))?;

    let mut record = Vec::new();
    for row in (0..table.len()).filter_map(|i| table.row(i)) {
        record.clear();
        record.extend(row.into_iter().map(|cell| match cell {
            Cell::Number(v) => v.to_string(),
            Cell::Text(t) => t.to_owned(),
        }));
        writer
            .write_record(&record)
            .map_err(csv_err("Failed to write CSV row"))?;
    }
    writer
        .flush()
        .map_err(|e| ConversionError::Export(format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

/// Export an intensity table to a CSV file at `path`.
pub fn export_intensity_csv(table: &IntensityTable, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .map_err(|e| ConversionError::Export(format!("Failed to create CSV file: {e}")))?;
    write_intensity_csv(table, std::io::BufWriter::new(file))?;

    tracing::info!("Exported {} grid cells to CSV: {}", table.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_catalog_keeps_header() {
        let mut out = Vec::new();
        write_catalog_csv(&[], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.trim_end(), CATALOG_COLUMNS.join(","));
    }

    #[test]
    fn test_catalog_round_trip() {
        let event = EventRecord {
            event_id: "quakeml:quakeledger/1".into(),
            agency: Some("GFZ".into()),
            year: Some(2018),
            second: 5.5,
            magnitude: 8.5,
            ..Default::default()
        };
        let mut out = Vec::new();
        write_catalog_csv(std::slice::from_ref(&event), &mut out).unwrap();
        let back = read_catalog_csv(out.as_slice()).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].event_id, event.event_id);
        assert_eq!(back[0].agency, event.agency);
        assert_eq!(back[0].year, Some(2018));
        assert!(back[0].month.is_none());
        assert_eq!(back[0].magnitude, 8.5);
        assert!(back[0].depth.is_nan());
    }

    #[test]
    fn test_read_tolerates_missing_and_garbled_cells() {
        let csv = "eventID,year,month,depth,magnitude,extra\nA,2018.0,,abc,7,x\n";
        let events = read_catalog_csv(csv.as_bytes()).unwrap();
        let e = &events[0];
        assert_eq!(e.event_id, "A");
        assert_eq!(e.year, Some(2018));
        assert!(e.month.is_none());
        assert!(e.depth.is_nan());
        assert_eq!(e.magnitude, 7.0);
        assert!(e.probability.is_nan());
    }
}
