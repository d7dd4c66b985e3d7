//! Crate-wide constants for quakeconv.
//!
//! Namespaces, identifier prefixes and the fixed tags stamped on written
//! documents live here so the reader and writer agree on them.

/// QuakeML 1.2 "bed" namespace used by every catalog element.
pub const QUAKEML_NS: &str = "http://quakeml.org/xmlns/bed/1.2";

/// Namespace of the optional `q:quakeml` wrapper element.
pub const QUAKEML_WRAPPER_NS: &str = "http://quakeml.org/xmlns/quakeml/1.2";

/// ShakeMap grid namespace.
pub const SHAKEMAP_NS: &str = "http://earthquake.usgs.gov/eqcenter/shakemap";

/// Prefix applied to every written `publicID` and id reference.
pub const ID_PREFIX: &str = "quakeml:quakeledger/";

/// Placeholder id (before prefixing) of the written `eventParameters` root.
pub const ROOT_PUBLIC_ID: &str = "0";

/// Magnitude type written for every event.
pub const MAGNITUDE_TYPE: &str = "MW";

/// Event type written for every event.
pub const EVENT_TYPE: &str = "earthquake";

/// Text written for a missing `xs:double` value.
pub const NAN_TEXT: &str = "NaN";

/// Coordinate reference attached to rasters and geometries.
pub const CRS_EPSG_4326: &str = "EPSG:4326";

/// Default name of the ShakeMap x (longitude) field.
pub const DEFAULT_X_COLUMN: &str = "LON";

/// Default name of the ShakeMap y (latitude) field.
pub const DEFAULT_Y_COLUMN: &str = "LAT";

/// Prefix of intensity value columns (`value_PGA`).
pub const VALUE_PREFIX: &str = "value_";

/// Prefix of intensity unit columns (`unit_PGA`).
pub const UNIT_PREFIX: &str = "unit_";

/// Application display name used in log lines.
pub const APP_NAME: &str = "quakeconv";

/// Application version string.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
