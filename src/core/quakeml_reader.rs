//! QuakeML catalog reader.
//!
//! Converts a QuakeML 1.2 document into one [`EventRecord`] per `event`
//! element. Uses `roxmltree` for parsing.
//!
//! The reader is strict about structure and lenient about numbers: an
//! absent `origin` or `nodalPlanes` fails the whole call, a garbled
//! `<value>` just becomes NaN in its column.

use roxmltree::{Document, Node};

use crate::core::event_record::EventRecord;
use crate::core::timestamp::parse_timestamp;
use crate::core::uncertain::{as_float, child_text, find_child, read_uncertain, require_child};
use crate::util::constants::{QUAKEML_NS, QUAKEML_WRAPPER_NS};
use crate::util::error::{missing_attribute, missing_element, ConversionError, Result};

/// Parse QuakeML text into catalog rows, in document order.
///
/// The document root is either `eventParameters` or a `q:quakeml` wrapper
/// around it:
/// ```xml
/// <eventParameters xmlns="http://quakeml.org/xmlns/bed/1.2" publicID="...">
///   <event publicID="quakeml:quakeledger/CHOA_116">
///     <description><text>expert</text></description>
///     <origin>...</origin>
///     <magnitude>...</magnitude>
///     <focalMechanism>...</focalMechanism>
///   </event>
/// </eventParameters>
/// ```
///
/// # Errors
/// Returns [`ConversionError::XmlParse`] if the text is not well-formed, or
/// a structural error from [`read_catalog`].
pub fn parse_catalog(xml: &str) -> Result<Vec<EventRecord>> {
    let doc = Document::parse(xml)
        .map_err(|e| ConversionError::XmlParse(format!("Failed to parse QuakeML: {e}")))?;
    read_catalog(&doc)
}

/// Like [`parse_catalog`] for raw UTF-8 bytes.
pub fn parse_catalog_bytes(bytes: &[u8]) -> Result<Vec<EventRecord>> {
    let xml = std::str::from_utf8(bytes)
        .map_err(|e| ConversionError::XmlParse(format!("QuakeML is not UTF-8: {e}")))?;
    parse_catalog(xml)
}

/// Read every `event` child of an already parsed document.
///
/// An `eventParameters` element without events yields an empty catalog.
///
/// # Errors
/// Fails on the first event missing an element or attribute the catalog
/// needs; no partial catalog is returned.
pub fn read_catalog(doc: &Document<'_>) -> Result<Vec<EventRecord>> {
    let parameters = event_parameters(doc.root_element())?;

    let events = parameters
        .children()
        .filter(|n| n.is_element() && n.has_tag_name((QUAKEML_NS, "event")))
        .map(read_event)
        .collect::<Result<Vec<_>>>()?;

    tracing::info!("Decoded {} events from QuakeML", events.len());
    Ok(events)
}

/// Unwrap an optional `q:quakeml` root down to `eventParameters`.
fn event_parameters<'a, 'input>(root: Node<'a, 'input>) -> Result<Node<'a, 'input>> {
    if root.has_tag_name((QUAKEML_WRAPPER_NS, "quakeml")) {
        require_child(root, "eventParameters")
    } else {
        Ok(root)
    }
}

/// Decode a single `event` element.
pub fn read_event(event: Node<'_, '_>) -> Result<EventRecord> {
    let mut record = EventRecord {
        event_id: event
            .attribute("publicID")
            .ok_or_else(|| missing_attribute("event", "publicID"))?
            .to_owned(),
        ..Default::default()
    };

    record.event_type = child_text(require_child(event, "description")?, "text")
        .map(str::to_owned);

    // origin: time, position, author, uncertainty ellipse
    let origin = require_child(event, "origin")?;

    let time = require_child(origin, "time")?;
    let time_value = child_text(time, "value").ok_or_else(|| missing_element("time", "value"))?;
    record.set_time(&parse_timestamp(time_value)?);
    record.time_uncertainty = as_float(child_text(time, "uncertainty"));

    let latitude = read_uncertain(origin, "latitude")?;
    record.latitude = latitude.value;
    record.latitude_uncertainty = latitude.uncertainty;

    let longitude = read_uncertain(origin, "longitude")?;
    record.longitude = longitude.value;
    record.longitude_uncertainty = longitude.uncertainty;

    let depth = read_uncertain(origin, "depth")?;
    record.depth = depth.value;
    record.depth_uncertainty = depth.uncertainty;

    record.agency = child_text(require_child(origin, "creationInfo")?, "author")
        .map(str::to_owned);

    let ellipse = require_child(origin, "originUncertainty")?;
    record.horizontal_uncertainty = read_plain_double(ellipse, "horizontalUncertainty")?;
    record.min_horizontal_uncertainty = read_plain_double(ellipse, "minHorizontalUncertainty")?;
    record.max_horizontal_uncertainty = read_plain_double(ellipse, "maxHorizontalUncertainty")?;
    record.azimuth_max_horizontal_uncertainty =
        read_plain_double(ellipse, "azimuthMaxHorizontalUncertainty")?;

    let magnitude = read_uncertain(require_child(event, "magnitude")?, "mag")?;
    record.magnitude = magnitude.value;
    record.magnitude_uncertainty = magnitude.uncertainty;

    // focal mechanism: only the preferred plane is kept
    let plane = preferred_nodal_plane(event)?;
    let strike = read_uncertain(plane, "strike")?;
    record.strike = strike.value;
    record.strike_uncertainty = strike.uncertainty;
    let dip = read_uncertain(plane, "dip")?;
    record.dip = dip.value;
    record.dip_uncertainty = dip.uncertainty;
    let rake = read_uncertain(plane, "rake")?;
    record.rake = rake.value;
    record.rake_uncertainty = rake.uncertainty;

    tracing::debug!("Decoded event {}", record.event_id);
    Ok(record)
}

/// Read an origin-uncertainty double.
///
/// The schema makes these plain doubles (`<horizontalUncertainty>1.2</...>`),
/// but some producers wrap them like other quantities. A `value` child wins
/// when present.
fn read_plain_double(parent: Node<'_, '_>, name: &str) -> Result<f64> {
    let node = require_child(parent, name)?;
    let text = match find_child(node, "value") {
        Some(value) => value.text(),
        None => node.text(),
    };
    Ok(as_float(text))
}

/// Select `nodalPlane1` or `nodalPlane2` according to `preferredPlane`.
fn preferred_nodal_plane<'a, 'input>(event: Node<'a, 'input>) -> Result<Node<'a, 'input>> {
    let planes = require_child(require_child(event, "focalMechanism")?, "nodalPlanes")?;
    let preferred = planes
        .attribute("preferredPlane")
        .ok_or_else(|| missing_attribute("nodalPlanes", "preferredPlane"))?;
    let name = match preferred.trim() {
        "1" => "nodalPlane1",
        "2" => "nodalPlane2",
        other => return Err(ConversionError::InvalidNodalPlane(other.to_owned())),
    };
    require_child(planes, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_xml(ellipse: &str, planes: &str) -> String {
        format!(
            r#"<eventParameters xmlns="http://quakeml.org/xmlns/bed/1.2" publicID="quakeml:quakeledger/0">
  <event publicID="quakeml:quakeledger/peru_1">
    <description><text>historic</text></description>
    <origin publicID="quakeml:quakeledger/peru_1">
      <time><value>1868-08-13T21:30:00.500000UTC</value><uncertainty>2.5</uncertainty></time>
      <latitude><value>-18.5</value><uncertainty>0.1</uncertainty></latitude>
      <longitude><value>-71.0</value><uncertainty>garbage</uncertainty></longitude>
      <depth><value>25</value><uncertainty>NaN</uncertainty></depth>
      <creationInfo><author>GFZ</author></creationInfo>
      <originUncertainty>{ellipse}</originUncertainty>
    </origin>
    <magnitude publicID="quakeml:quakeledger/peru_1">
      <mag><value>8.8</value><uncertainty>0.2</uncertainty></mag>
      <type>MW</type>
    </magnitude>
    <focalMechanism publicID="quakeml:quakeledger/peru_1">
      {planes}
    </focalMechanism>
  </event>
</eventParameters>"#
        )
    }

    const ELLIPSE: &str = r#"
        <horizontalUncertainty>1.5</horizontalUncertainty>
        <minHorizontalUncertainty><value>0.5</value></minHorizontalUncertainty>
        <maxHorizontalUncertainty>2.5</maxHorizontalUncertainty>
        <azimuthMaxHorizontalUncertainty>45</azimuthMaxHorizontalUncertainty>"#;

    const PLANES: &str = r#"<nodalPlanes preferredPlane="2">
        <nodalPlane1>
          <strike><value>1</value></strike><dip><value>2</value></dip><rake><value>3</value></rake>
        </nodalPlane1>
        <nodalPlane2>
          <strike><value>350</value><uncertainty>5</uncertainty></strike>
          <dip><value>20</value><uncertainty>3</uncertainty></dip>
          <rake><value>95</value><uncertainty>7</uncertainty></rake>
        </nodalPlane2>
      </nodalPlanes>"#;

    #[test]
    fn test_parse_basic_event() {
        let events = parse_catalog(&event_xml(ELLIPSE, PLANES)).unwrap();
        assert_eq!(events.len(), 1);
        let e = &events[0];
        assert_eq!(e.event_id, "quakeml:quakeledger/peru_1");
        assert_eq!(e.event_type.as_deref(), Some("historic"));
        assert_eq!(e.agency.as_deref(), Some("GFZ"));
        assert_eq!((e.year, e.month, e.day), (Some(1868), Some(8), Some(13)));
        assert_eq!((e.hour, e.minute), (Some(21), Some(30)));
        assert_eq!(e.second, 0.5);
        assert_eq!(e.time_uncertainty, 2.5);
        assert_eq!(e.latitude, -18.5);
        assert_eq!(e.latitude_uncertainty, 0.1);
        assert!(e.longitude_uncertainty.is_nan());
        assert_eq!(e.depth, 25.0);
        assert_eq!(e.magnitude, 8.8);
        assert_eq!(e.magnitude_uncertainty, 0.2);
        assert!(e.identifier.is_none());
        assert!(e.probability.is_nan());
    }

    // Each ellipse field comes from its own element; the azimuth must not
    // overwrite horizontalUncertainty.
    #[test]
    fn test_origin_uncertainty_fields_are_not_aliased() {
        let e = &parse_catalog(&event_xml(ELLIPSE, PLANES)).unwrap()[0];
        assert_eq!(e.horizontal_uncertainty, 1.5);
        assert_eq!(e.min_horizontal_uncertainty, 0.5);
        assert_eq!(e.max_horizontal_uncertainty, 2.5);
        assert_eq!(e.azimuth_max_horizontal_uncertainty, 45.0);
    }

    #[test]
    fn test_preferred_plane_two_is_selected() {
        let e = &parse_catalog(&event_xml(ELLIPSE, PLANES)).unwrap()[0];
        assert_eq!((e.strike, e.dip, e.rake), (350.0, 20.0, 95.0));
        assert_eq!(e.strike_uncertainty, 5.0);
        assert_eq!(e.dip_uncertainty, 3.0);
        assert_eq!(e.rake_uncertainty, 7.0);
    }

    #[test]
    fn test_invalid_preferred_plane() {
        let planes = PLANES.replace("preferredPlane=\"2\"", "preferredPlane=\"3\"");
        let err = parse_catalog(&event_xml(ELLIPSE, &planes)).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidNodalPlane(ref p) if p == "3"));
    }

    #[test]
    fn test_missing_origin_uncertainty_element_fails() {
        let ellipse = "<horizontalUncertainty>1</horizontalUncertainty>";
        let err = parse_catalog(&event_xml(ellipse, PLANES)).unwrap_err();
        assert!(matches!(err, ConversionError::MissingElement { ref child, .. }
            if child == "minHorizontalUncertainty"));
    }

    #[test]
    fn test_quakeml_wrapper_is_accepted() {
        let inner = event_xml(ELLIPSE, PLANES);
        let wrapped = format!(
            r#"<q:quakeml xmlns:q="http://quakeml.org/xmlns/quakeml/1.2">{inner}</q:quakeml>"#
        );
        assert_eq!(parse_catalog(&wrapped).unwrap().len(), 1);
    }

    #[test]
    fn test_text_fields_are_kept_verbatim() {
        let xml = event_xml(ELLIPSE, PLANES)
            .replace("<text>historic</text>", "<text> historic </text>")
            .replace("<author>GFZ</author>", "<author>GFZ \n</author>");
        let e = &parse_catalog(&xml).unwrap()[0];
        assert_eq!(e.event_type.as_deref(), Some(" historic "));
        assert_eq!(e.agency.as_deref(), Some("GFZ \n"));
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_catalog("<eventParameters>").unwrap_err();
        assert!(matches!(err, ConversionError::XmlParse(_)));
    }

    #[test]
    fn test_bytes_entry_point() {
        let xml = event_xml(ELLIPSE, PLANES);
        assert_eq!(parse_catalog_bytes(xml.as_bytes()).unwrap().len(), 1);
        assert!(parse_catalog_bytes(&[0xff, 0xfe]).is_err());
    }
}
