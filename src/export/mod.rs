//! File sinks and sources for converted tables, documents and rasters.

pub mod csv_export;
pub mod json_export;
pub mod raster_export;

use std::path::Path;

use crate::util::error::{ConversionError, Result};

/// Check that `path` can be created before doing any conversion work.
///
/// # Errors
/// Returns [`ConversionError::Export`] if the parent directory does not
/// exist or `path` names an existing directory.
pub fn validate_export_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Err(ConversionError::Export(format!(
            "Output path is a directory: {}",
            path.display()
        )));
    }
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => {
            Err(ConversionError::Export(format!(
                "Output directory does not exist: {}",
                parent.display()
            )))
        }
        _ => Ok(()),
    }
}
