//! Conversion options.

use crate::util::constants::{DEFAULT_X_COLUMN, DEFAULT_Y_COLUMN};

/// Names of the ShakeMap fields that carry the grid coordinates.
///
/// Coordinate fields keep their names in the intensity table; every other
/// field becomes a `value_<name>` column with a matching `unit_<name>`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShakemapOptions {
    /// Field holding the x coordinate (longitude).
    pub x_column: String,
    /// Field holding the y coordinate (latitude).
    pub y_column: String,
}

impl Default for ShakemapOptions {
    fn default() -> Self {
        Self {
            x_column: DEFAULT_X_COLUMN.to_owned(),
            y_column: DEFAULT_Y_COLUMN.to_owned(),
        }
    }
}

impl ShakemapOptions {
    /// Whether `name` is one of the two coordinate fields.
    pub fn is_coordinate(&self, name: &str) -> bool {
        name == self.x_column || name == self.y_column
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_columns() {
        let opts = ShakemapOptions::default();
        assert_eq!(opts.x_column, "LON");
        assert_eq!(opts.y_column, "LAT");
        assert!(opts.is_coordinate("LAT"));
        assert!(!opts.is_coordinate("PGA"));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let opts: ShakemapOptions = serde_json::from_str(r#"{"x_column":"X"}"#).unwrap();
        assert_eq!(opts.x_column, "X");
        assert_eq!(opts.y_column, "LAT");
    }
}
