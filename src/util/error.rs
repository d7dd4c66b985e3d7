//! Unified error types for quakeconv.
//!
//! All fallible operations throughout the codebase return `Result<T, ConversionError>`.
//! Structural problems (missing elements, bad timestamps, malformed grids)
//! surface here; individual numeric fields that fail to parse do not, they
//! degrade to NaN at the call site.

/// Unified error type used throughout quakeconv.
///
/// Each variant captures enough context to point at the offending part of
/// the input document or table.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    /// The input is not well-formed XML (or not valid UTF-8).
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// An element the converter relies on is absent.
    #[error("Missing <{child}> element in <{parent}>")]
    MissingElement {
        /// Local name of the element that was searched.
        parent: String,
        /// Local name of the child that was expected.
        child: String,
    },

    /// A required attribute is absent.
    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        /// Local name of the element carrying the attribute.
        element: String,
        /// Name of the missing attribute.
        attribute: String,
    },

    /// A timestamp could not be decoded.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// `preferredPlane` referenced something other than plane 1 or 2.
    #[error("Invalid preferred nodal plane: {0:?}")]
    InvalidNodalPlane(String),

    /// The grid data does not divide evenly into the declared fields.
    #[error("Grid data has {tokens} numeric tokens, not a multiple of {fields} fields")]
    GridShape {
        /// Number of numeric tokens found in `grid_data`.
        tokens: usize,
        /// Number of declared `grid_field` elements.
        fields: usize,
    },

    /// A grid field declaration carries an unusable `index`.
    #[error("Invalid grid field index: {0:?}")]
    InvalidGridIndex(String),

    /// A table lacks a column the operation needs.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Columns that must line up row by row differ in length.
    #[error("Column length mismatch: expected {expected} rows, found {found}")]
    ColumnLength {
        /// Rows in the reference column.
        expected: usize,
        /// Rows in the offending column.
        found: usize,
    },

    /// Reading a CSV table failed.
    #[error("CSV error: {0}")]
    Csv(String),

    /// Writing an output file or document failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Catch-all for I/O errors (file reads and writes).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConversionError>;

/// Build a [`ConversionError::MissingElement`] for `child` under `parent`.
pub fn missing_element(parent: impl Into<String>, child: impl Into<String>) -> ConversionError {
    ConversionError::MissingElement {
        parent: parent.into(),
        child: child.into(),
    }
}

/// Build a [`ConversionError::MissingAttribute`] for `attribute` on `element`.
pub fn missing_attribute(
    element: impl Into<String>,
    attribute: impl Into<String>,
) -> ConversionError {
    ConversionError::MissingAttribute {
        element: element.into(),
        attribute: attribute.into(),
    }
}
