//! ESRI ASCII grid output for rasters.
//!
//! The header uses cell-centre anchoring (`xllcenter`/`yllcenter`) and
//! separate `dx`/`dy` sizes, since the grid coordinates are cell centres
//! and ShakeMap cells are not necessarily square.

use std::io::Write;
use std::path::Path;

use crate::core::raster::Raster;
use crate::util::error::{ConversionError, Result};

/// Value written for cells without data.
pub const NODATA_VALUE: f64 = -9999.0;

/// Write `raster` as an ESRI ASCII grid, top row first.
pub fn write_ascii_grid<W: Write>(raster: &Raster, mut writer: W) -> Result<()> {
    let bounds = raster.bounds();
    writeln!(writer, "ncols {}", raster.width())?;
    writeln!(writer, "nrows {}", raster.height())?;
    writeln!(writer, "xllcenter {}", bounds.min_x)?;
    writeln!(writer, "yllcenter {}", bounds.min_y)?;
    writeln!(writer, "dx {}", raster.x_cell_size())?;
    writeln!(writer, "dy {}", raster.y_cell_size().abs())?;
    writeln!(writer, "NODATA_value {NODATA_VALUE}")?;

    if raster.width() > 0 {
        for row in raster.values().chunks(raster.width()) {
            let line = row
                .iter()
                .map(|v| {
                    let v = if v.is_nan() { NODATA_VALUE } else { *v };
                    v.to_string()
                })
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(writer, "{line}")?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Export `raster` as an ESRI ASCII grid file at `path`.
pub fn export_ascii_grid(raster: &Raster, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .map_err(|e| ConversionError::Export(format!("Failed to create grid file: {e}")))?;
    write_ascii_grid(raster, std::io::BufWriter::new(file))?;

    tracing::info!(
        "Exported {}x{} raster to ASCII grid: {}",
        raster.width(),
        raster.height(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_grid_layout() {
        let raster =
            Raster::from_points(&[0.0, 1.0, 0.0], &[0.0, 0.0, 2.0], &[1.0, 2.0, 3.0]).unwrap();
        let mut out = Vec::new();
        write_ascii_grid(&raster, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ncols 2");
        assert_eq!(lines[1], "nrows 2");
        assert_eq!(lines[5], "dy 2");
        assert_eq!(lines[6], "NODATA_value -9999");
        assert_eq!(lines[7], "3 -9999");
        assert_eq!(lines[8], "1 2");
    }
}
