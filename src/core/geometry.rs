//! Point geometry for tabular outputs.
//!
//! Geometry is computed alongside a table, never written into it: the
//! source rows are left untouched and a [`GeoTable`] pairs them with one
//! point per row.

use crate::core::event_record::EventRecord;
use crate::util::constants::CRS_EPSG_4326;

/// A geographic point, `x` = longitude and `y` = latitude.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Zip two coordinate columns into points.
pub fn points_from_xy(xs: &[f64], ys: &[f64]) -> Vec<Point> {
    xs.iter()
        .zip(ys)
        .map(|(&x, &y)| Point { x, y })
        .collect()
}

/// One point per catalog row, from `longitude` / `latitude`.
pub fn catalog_points(events: &[EventRecord]) -> Vec<Point> {
    events
        .iter()
        .map(|e| Point {
            x: e.longitude,
            y: e.latitude,
        })
        .collect()
}

/// A table paired with per-row point geometry in EPSG:4326.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoTable<T> {
    table: T,
    geometry: Vec<Point>,
}

impl<T> GeoTable<T> {
    pub fn new(table: T, geometry: Vec<Point>) -> Self {
        Self { table, geometry }
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn geometry(&self) -> &[Point] {
        &self.geometry
    }

    pub fn crs(&self) -> &'static str {
        CRS_EPSG_4326
    }

    pub fn into_parts(self) -> (T, Vec<Point>) {
        (self.table, self.geometry)
    }
}

/// Copy a catalog into a geo table; the input slice is not modified.
pub fn catalog_geo_table(events: &[EventRecord]) -> GeoTable<Vec<EventRecord>> {
    GeoTable::new(events.to_vec(), catalog_points(events))
}
