//! ShakeMap grid reader.
//!
//! A ShakeMap grid document declares its columns in `grid_field` elements
//! and stores the cells as one whitespace separated text blob:
//! ```xml
//! <shakemap_grid xmlns="http://earthquake.usgs.gov/eqcenter/shakemap" shakemap_event_type="ACTUAL">
//!   <event event_id="us1000chhc" event_network="us" magnitude="8.3" depth="22.4"
//!          lat="-31.57" lon="-71.67" event_timestamp="2015-09-16T22:54:32UTC"/>
//!   <grid_field index="1" name="LON" units="dd"/>
//!   <grid_field index="2" name="LAT" units="dd"/>
//!   <grid_field index="3" name="PGA" units="pctg"/>
//!   <grid_data>
//! -72.0 -31.0 0.52
//! ...
//!   </grid_data>
//! </shakemap_grid>
//! ```
//! The reader turns this into an [`IntensityTable`] with one row per cell
//! and, separately, a one-row event summary.

use std::sync::OnceLock;

use regex::Regex;
use roxmltree::{Document, Node};

use crate::core::event_record::EventRecord;
use crate::core::geometry::{points_from_xy, GeoTable, Point};
use crate::core::raster::Raster;
use crate::core::timestamp::parse_timestamp;
use crate::core::uncertain::as_float;
use crate::util::constants::{SHAKEMAP_NS, UNIT_PREFIX, VALUE_PREFIX};
use crate::util::error::{missing_attribute, missing_element, ConversionError, Result};
use crate::util::options::ShakemapOptions;

/// A `grid_field` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridField {
    /// 1-based position of the field within a grid row.
    pub index: usize,
    pub name: String,
    pub units: String,
}

/// One column of an intensity table.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityColumn {
    /// Field name as declared (`LON`, `PGA`).
    pub field: String,
    /// Unit of a value column; `None` for the coordinate columns.
    pub unit: Option<String>,
    pub values: Vec<f64>,
}

impl IntensityColumn {
    /// Table name of the value column: `LON` or `value_PGA`.
    pub fn column_name(&self) -> String {
        match self.unit {
            Some(_) => format!("{VALUE_PREFIX}{}", self.field),
            None => self.field.clone(),
        }
    }
}

/// A single table cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Number(f64),
    Text(&'a str),
}

/// Grid cells as rows of coordinates plus intensity values.
///
/// Columns follow the declared field order; each value column `value_X` is
/// followed by its broadcast unit column `unit_X`.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityTable {
    columns: Vec<IntensityColumn>,
    rows: usize,
    options: ShakemapOptions,
}

impl IntensityTable {
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn columns(&self) -> &[IntensityColumn] {
        &self.columns
    }

    pub fn options(&self) -> &ShakemapOptions {
        &self.options
    }

    /// Header of the table, unit columns included.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.columns.len() * 2);
        for column in &self.columns {
            names.push(column.column_name());
            if column.unit.is_some() {
                names.push(format!("{UNIT_PREFIX}{}", column.field));
            }
        }
        names
    }

    /// Values of a coordinate or value column.
    ///
    /// Value columns are found by table name (`value_PGA`) or by field
    /// name (`PGA`).
    pub fn values(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.field == name || c.column_name() == name)
            .map(|c| c.values.as_slice())
    }

    /// Unit of a value column, by field or table name.
    pub fn unit(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.field == name || c.column_name() == name)
            .and_then(|c| c.unit.as_deref())
    }

    /// The cells of row `index`, in [`IntensityTable::column_names`] order.
    pub fn row(&self, index: usize) -> Option<Vec<Cell<'_>>> {
        if index >= self.rows {
            return None;
        }
        let mut cells = Vec::with_capacity(self.columns.len() * 2);
        for column in &self.columns {
            cells.push(Cell::Number(column.values[index]));
            if let Some(unit) = &column.unit {
                cells.push(Cell::Text(unit));
            }
        }
        Some(cells)
    }

    fn require(&self, name: &str) -> Result<&[f64]> {
        self.values(name)
            .ok_or_else(|| ConversionError::MissingColumn(name.to_owned()))
    }

    /// Point geometry of every row from the configured x/y columns.
    pub fn points(&self) -> Result<Vec<Point>> {
        Ok(points_from_xy(
            self.require(&self.options.x_column)?,
            self.require(&self.options.y_column)?,
        ))
    }

    /// Rasterise one value column over the x/y grid.
    pub fn to_raster(&self, value_column: &str) -> Result<Raster> {
        Raster::from_points(
            self.require(&self.options.x_column)?,
            self.require(&self.options.y_column)?,
            self.require(value_column)?,
        )
    }
}

/// A parsed ShakeMap grid document.
#[derive(Debug)]
pub struct Shakemap<'input> {
    doc: Document<'input>,
    options: ShakemapOptions,
}

impl<'input> Shakemap<'input> {
    /// Parse ShakeMap XML with the default `LON`/`LAT` coordinate fields.
    ///
    /// # Errors
    /// Returns [`ConversionError::XmlParse`] if the text is not well-formed.
    pub fn parse(xml: &'input str) -> Result<Self> {
        Self::parse_with_options(xml, ShakemapOptions::default())
    }

    pub fn parse_with_options(xml: &'input str, options: ShakemapOptions) -> Result<Self> {
        let doc = Document::parse(xml)
            .map_err(|e| ConversionError::XmlParse(format!("Failed to parse ShakeMap: {e}")))?;
        Ok(Self::from_document(doc, options))
    }

    /// Wrap an already parsed document.
    pub fn from_document(doc: Document<'input>, options: ShakemapOptions) -> Self {
        Self { doc, options }
    }

    pub fn options(&self) -> &ShakemapOptions {
        &self.options
    }

    /// Decode the grid into an intensity table.
    pub fn intensity_table(&self) -> Result<IntensityTable> {
        read_intensity_table(&self.doc, &self.options)
    }

    /// Intensity table with point geometry attached.
    pub fn intensity_geo_table(&self) -> Result<GeoTable<IntensityTable>> {
        let table = self.intensity_table()?;
        let geometry = table.points()?;
        Ok(GeoTable::new(table, geometry))
    }

    /// Rasterise `value_column` (e.g. `value_PGA`) of the intensity table.
    pub fn intensity_raster(&self, value_column: &str) -> Result<Raster> {
        self.intensity_table()?.to_raster(value_column)
    }

    /// One-row event summary, or `None` if the document has no `event`.
    pub fn event(&self) -> Result<Option<EventRecord>> {
        read_event_summary(&self.doc)
    }
}

/// Children of the root that live in the root's namespace.
fn grid_children<'a, 'input>(
    root: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a {
    let namespace = root.tag_name().namespace();
    root.children().filter(move |n| {
        n.is_element() && n.tag_name().name() == name && n.tag_name().namespace() == namespace
    })
}

fn required_attribute<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str> {
    node.attribute(name)
        .ok_or_else(|| missing_attribute(node.tag_name().name(), name))
}

/// Read the `grid_field` declarations sorted by their `index`.
pub fn read_grid_fields(doc: &Document<'_>) -> Result<Vec<GridField>> {
    let mut fields = grid_children(doc.root_element(), "grid_field")
        .map(|node| {
            let raw_index = required_attribute(node, "index")?;
            let index = raw_index
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|i| *i >= 1)
                .ok_or_else(|| ConversionError::InvalidGridIndex(raw_index.to_owned()))?;
            Ok(GridField {
                index,
                name: required_attribute(node, "name")?.to_owned(),
                units: required_attribute(node, "units")?.to_owned(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    fields.sort_by_key(|f| f.index);
    Ok(fields)
}

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| {
        Regex::new(
            r"(?x)
            (?P<number>(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)
            | (?P<minus>-)
            | (?P<newline>\n)
            | (?P<word>[A-Za-z_]\w*)
            | (?P<other>\S)",
        )
        .expect("token pattern is valid")
    })
}

/// Extract the numbers of a `grid_data` blob.
///
/// A `-` token directly before a number (on the same line, spaces allowed)
/// negates it. Words and other punctuation are skipped.
pub fn tokenize_grid_data(text: &str) -> Vec<f64> {
    let mut numbers = Vec::new();
    let mut negate = false;
    for caps in token_regex().captures_iter(text) {
        if let Some(number) = caps.name("number") {
            if let Ok(value) = number.as_str().parse::<f64>() {
                numbers.push(if negate { -value } else { value });
            }
            negate = false;
        } else {
            negate = caps.name("minus").is_some();
        }
    }
    numbers
}

/// Decode the grid of a ShakeMap document into an intensity table.
///
/// # Errors
/// Fails if no fields are declared, a declaration is incomplete, the
/// `grid_data` element is missing, or the number count is not a multiple of
/// the field count.
pub fn read_intensity_table(doc: &Document<'_>, options: &ShakemapOptions) -> Result<IntensityTable> {
    let root = doc.root_element();
    if root.tag_name().namespace() != Some(SHAKEMAP_NS) {
        tracing::warn!(
            "ShakeMap root <{}> is not in the {SHAKEMAP_NS} namespace",
            root.tag_name().name()
        );
    }
    let fields = read_grid_fields(doc)?;
    let grid_data = grid_children(root, "grid_data")
        .next()
        .ok_or_else(|| missing_element(root.tag_name().name(), "grid_data"))?;

    let numbers = tokenize_grid_data(grid_data.text().unwrap_or(""));
    if fields.is_empty() || numbers.len() % fields.len() != 0 {
        return Err(ConversionError::GridShape {
            tokens: numbers.len(),
            fields: fields.len(),
        });
    }
    let rows = numbers.len() / fields.len();

    let mut columns: Vec<IntensityColumn> = fields
        .iter()
        .map(|field| {
            tracing::debug!("Grid field {} = {} [{}]", field.index, field.name, field.units);
            IntensityColumn {
                field: field.name.clone(),
                unit: (!options.is_coordinate(&field.name)).then(|| field.units.clone()),
                values: Vec::with_capacity(rows),
            }
        })
        .collect();
    for (i, value) in numbers.into_iter().enumerate() {
        columns[i % fields.len()].values.push(value);
    }

    for coordinate in [&options.x_column, &options.y_column] {
        if !fields.iter().any(|f| &f.name == coordinate) {
            tracing::warn!("ShakeMap declares no '{coordinate}' field");
        }
    }
    tracing::info!("Decoded {} grid cells x {} fields from ShakeMap", rows, fields.len());

    Ok(IntensityTable {
        columns,
        rows,
        options: options.clone(),
    })
}

/// Summarise the document's `event` element as a catalog row.
///
/// `event_id`, `event_network`, `event_timestamp`, `depth`, `magnitude`,
/// `lat` and `lon` are required; the root's `shakemap_event_type` becomes
/// the row's `type` when present.
///
/// # Errors
/// Fails on a missing attribute or an undecodable timestamp. A document
/// without an `event` element is not an error and yields `Ok(None)`.
pub fn read_event_summary(doc: &Document<'_>) -> Result<Option<EventRecord>> {
    let root = doc.root_element();
    let Some(event) = grid_children(root, "event").next() else {
        tracing::debug!("ShakeMap has no event element");
        return Ok(None);
    };

    let mut record = EventRecord {
        event_id: required_attribute(event, "event_id")?.to_owned(),
        agency: Some(required_attribute(event, "event_network")?.to_owned()),
        event_type: root.attribute("shakemap_event_type").map(str::to_owned),
        depth: as_float(Some(required_attribute(event, "depth")?)),
        magnitude: as_float(Some(required_attribute(event, "magnitude")?)),
        latitude: as_float(Some(required_attribute(event, "lat")?)),
        longitude: as_float(Some(required_attribute(event, "lon")?)),
        ..Default::default()
    };
    record.set_time(&parse_timestamp(required_attribute(event, "event_timestamp")?)?);

    Ok(Some(record))
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: &str = r#"<shakemap_grid xmlns="http://earthquake.usgs.gov/eqcenter/shakemap" shakemap_event_type="SCENARIO">
  <event event_id="quakeml:quakeledger/84945" event_network="us" magnitude="8.35" depth="20.9"
         lat="-30.9227" lon="-71.4203" event_timestamp="2015-09-16T22:54:32UTC"/>
  <grid_field index="3" name="PGA" units="g"/>
  <grid_field index="1" name="LON" units="dd"/>
  <grid_field index="2" name="LAT" units="dd"/>
  <grid_data>
-72.0 -31.0 0.5
-71.5 -31.0 1e-2
</grid_data>
</shakemap_grid>"#;

    #[test]
    fn test_fields_sorted_by_index() {
        let doc = Document::parse(GRID).unwrap();
        let names: Vec<String> = read_grid_fields(&doc)
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, ["LON", "LAT", "PGA"]);
    }

    #[test]
    fn test_intensity_table() {
        let table = Shakemap::parse(GRID).unwrap().intensity_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_names(), ["LON", "LAT", "value_PGA", "unit_PGA"]);
        assert_eq!(table.values("LON").unwrap(), [-72.0, -71.5]);
        assert_eq!(table.values("value_PGA").unwrap(), [0.5, 0.01]);
        assert_eq!(table.unit("PGA"), Some("g"));
        assert_eq!(table.unit("LON"), None);
        assert_eq!(
            table.row(1).unwrap(),
            [
                Cell::Number(-71.5),
                Cell::Number(-31.0),
                Cell::Number(0.01),
                Cell::Text("g")
            ]
        );
        assert!(table.row(2).is_none());
    }

    #[test]
    fn test_tokenize_detached_minus() {
        assert_eq!(tokenize_grid_data("- 1.5 2 -3"), [-1.5, 2.0, -3.0]);
        assert_eq!(tokenize_grid_data("1 -\n2"), [1.0, 2.0]);
        assert_eq!(tokenize_grid_data("abc 4 x5 .5"), [4.0, 0.5]);
    }

    #[test]
    fn test_uneven_token_count_fails() {
        let xml = GRID.replace("1e-2", "1e-2 7");
        let err = Shakemap::parse(&xml).unwrap().intensity_table().unwrap_err();
        assert!(matches!(err, ConversionError::GridShape { tokens: 7, fields: 3 }));
    }

    #[test]
    fn test_invalid_index() {
        let xml = GRID.replace(r#"index="3""#, r#"index="0""#);
        let err = Shakemap::parse(&xml).unwrap().intensity_table().unwrap_err();
        assert!(matches!(err, ConversionError::InvalidGridIndex(_)));
    }

    #[test]
    fn test_event_summary() {
        let event = Shakemap::parse(GRID).unwrap().event().unwrap().unwrap();
        assert_eq!(event.event_id, "quakeml:quakeledger/84945");
        assert_eq!(event.agency.as_deref(), Some("us"));
        assert_eq!(event.event_type.as_deref(), Some("SCENARIO"));
        assert_eq!(event.magnitude, 8.35);
        assert_eq!(event.latitude, -30.9227);
        assert_eq!((event.year, event.hour, event.minute), (Some(2015), Some(22), Some(54)));
        assert_eq!(event.second, 32.0);
    }

    #[test]
    fn test_foreign_namespace_still_decodes() {
        let xml = GRID.replace(SHAKEMAP_NS, "urn:example:grid");
        let table = Shakemap::parse(&xml).unwrap().intensity_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.values("LAT").unwrap(), [-31.0, -31.0]);
    }

    #[test]
    fn test_event_summary_absent() {
        let xml = GRID.replace("<event ", "<not_event ");
        assert!(Shakemap::parse(&xml).unwrap().event().unwrap().is_none());
    }

    #[test]
    fn test_event_summary_missing_attribute() {
        let xml = GRID.replace(r#"event_network="us""#, "");
        let err = Shakemap::parse(&xml).unwrap().event().unwrap_err();
        assert!(err.to_string().contains("event_network"));
    }
}
