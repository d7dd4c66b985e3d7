//! JSON and GeoJSON output.
//!
//! Catalogs serialise as a pretty-printed JSON array of rows; catalogs and
//! intensity tables with geometry serialise as GeoJSON feature collections.
//! Missing values (NaN) become `null`.

use std::io::Write;
use std::path::Path;

use serde_json::{json, Map, Value};

use crate::core::event_record::EventRecord;
use crate::core::geometry::{catalog_points, Point};
use crate::core::shakemap::{Cell, IntensityTable};
use crate::util::error::{ConversionError, Result};

fn feature(point: &Point, properties: Map<String, Value>) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": [point.x, point.y],
        },
        "properties": properties,
    })
}

fn feature_collection(features: Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

/// Catalog rows as a GeoJSON feature collection, one point per event.
pub fn catalog_geojson(events: &[EventRecord]) -> Result<Value> {
    let features = events
        .iter()
        .zip(catalog_points(events))
        .map(|(event, point)| match serde_json::to_value(event) {
            Ok(Value::Object(properties)) => Ok(feature(&point, properties)),
            Ok(other) => Err(ConversionError::Export(format!(
                "Event serialised to non-object JSON: {other}"
            ))),
            Err(e) => Err(ConversionError::Export(format!(
                "Failed to serialise event: {e}"
            ))),
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(feature_collection(features))
}

/// Intensity table as a GeoJSON feature collection, one point per cell.
///
/// # Errors
/// Returns [`ConversionError::MissingColumn`] if the table lacks its
/// coordinate columns.
pub fn intensity_geojson(table: &IntensityTable) -> Result<Value> {
    let names = table.column_names();
    let features = table
        .points()?
        .iter()
        .enumerate()
        .filter_map(|(i, point)| {
            let row = table.row(i)?;
            let properties = names
                .iter()
                .cloned()
                .zip(row.into_iter().map(|cell| match cell {
                    Cell::Number(v) => Value::from(v),
                    Cell::Text(t) => Value::from(t),
                }))
                .collect::<Map<String, Value>>();
            Some(feature(point, properties))
        })
        .collect();
    Ok(feature_collection(features))
}

/// Write a JSON value to `path`, pretty-printed.
pub fn export_json_value(value: &Value, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .map_err(|e| ConversionError::Export(format!("Failed to create JSON file: {e}")))?;

    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| ConversionError::Export(format!("Failed to write JSON: {e}")))?;
    writer
        .flush()
        .map_err(|e| ConversionError::Export(format!("Failed to flush JSON output: {e}")))?;
    Ok(())
}

/// Export catalog rows as a JSON array to `path`.
pub fn export_catalog_json(events: &[EventRecord], path: &Path) -> Result<()> {
    let value = serde_json::to_value(events)
        .map_err(|e| ConversionError::Export(format!("Failed to serialise events: {e}")))?;
    export_json_value(&value, path)?;

    tracing::info!("Exported {} events to JSON: {}", events.len(), path.display());
    Ok(())
}
