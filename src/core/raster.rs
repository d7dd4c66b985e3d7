//! Rasterisation of point grids.
//!
//! Works only for regular grids: the sorted distinct x values (and y
//! values) must be evenly spaced. Irregular input still produces a raster,
//! just not a meaningful one.

use crate::util::constants::CRS_EPSG_4326;
use crate::util::error::{ConversionError, Result};

/// Bounding box in source coordinate units.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

/// A 2-D grid of values with an affine geo-reference.
///
/// Row 0 is the northernmost row (largest y); cells without a source
/// point hold NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    values: Vec<f64>,
    x_cell_size: f64,
    y_cell_size: f64,
    bounds: Bounds,
}

impl Raster {
    /// Scatter `(x, y, value)` points into a raster.
    ///
    /// Cell sizes are the mean spacing of the distinct coordinates of each
    /// axis (NaN when an axis has fewer than two distinct values).
    ///
    /// # Errors
    /// Returns [`ConversionError::ColumnLength`] if the three columns differ
    /// in length.
    pub fn from_points(xs: &[f64], ys: &[f64], values: &[f64]) -> Result<Raster> {
        for column in [ys, values] {
            if column.len() != xs.len() {
                return Err(ConversionError::ColumnLength {
                    expected: xs.len(),
                    found: column.len(),
                });
            }
        }

        let unique_x = sorted_unique(xs);
        let unique_y = sorted_unique(ys);
        let (width, height) = (unique_x.len(), unique_y.len());

        let mut grid = vec![f64::NAN; width * height];
        for ((x, y), value) in xs.iter().zip(ys).zip(values) {
            let (Some(col), Some(rank_y)) = (rank(&unique_x, *x), rank(&unique_y, *y)) else {
                continue;
            };
            let row = height - 1 - rank_y;
            grid[row * width + col] = *value;
        }

        let raster = Raster {
            width,
            height,
            values: grid,
            x_cell_size: mean_step(&unique_x),
            y_cell_size: -mean_step(&unique_y),
            bounds: Bounds {
                min_x: xs.iter().copied().fold(f64::NAN, f64::min),
                min_y: ys.iter().copied().fold(f64::NAN, f64::min),
                max_x: xs.iter().copied().fold(f64::NAN, f64::max),
                max_y: ys.iter().copied().fold(f64::NAN, f64::max),
            },
        };
        tracing::info!(
            "Rasterised {} points into {}x{} cells",
            xs.len(),
            width,
            height
        );
        Ok(raster)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major cell values, row 0 first.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at `row` (from the top) and `col` (from the left).
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.values.get(row * self.width + col).copied()
    }

    /// Positive cell width.
    pub fn x_cell_size(&self) -> f64 {
        self.x_cell_size
    }

    /// Negative cell height: rows run from north to south.
    pub fn y_cell_size(&self) -> f64 {
        self.y_cell_size
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn crs(&self) -> &'static str {
        CRS_EPSG_4326
    }

    /// Six-parameter affine transform
    /// `(min x, x cell size, 0, max y, 0, y cell size)`.
    pub fn geo_transform(&self) -> [f64; 6] {
        [
            self.bounds.min_x,
            self.x_cell_size,
            0.0,
            self.bounds.max_y,
            0.0,
            self.y_cell_size,
        ]
    }
}

/// `-0.0` and `0.0` are the same coordinate.
fn normalize_zero(value: f64) -> f64 {
    value + 0.0
}

fn sorted_unique(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| !v.is_nan())
        .map(normalize_zero)
        .collect();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup_by(|a, b| a.total_cmp(b).is_eq());
    sorted
}

fn rank(sorted: &[f64], value: f64) -> Option<usize> {
    let value = normalize_zero(value);
    sorted.binary_search_by(|probe| probe.total_cmp(&value)).ok()
}

fn mean_step(sorted: &[f64]) -> f64 {
    if sorted.len() < 2 {
        return f64::NAN;
    }
    let total: f64 = sorted.windows(2).map(|w| w[1] - w[0]).sum();
    total / (sorted.len() - 1) as f64
}
