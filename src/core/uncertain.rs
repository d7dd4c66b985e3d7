//! Uncertain-value codec.
//!
//! QuakeML quantities are written as a small structure:
//! ```xml
//! <depth>
//!   <value>32.0</value>
//!   <uncertainty>NaN</uncertainty>
//! </depth>
//! ```
//! Reading is strict about the wrapper element and lenient about the two
//! numbers: an absent or unparsable `value`/`uncertainty` becomes NaN.

use std::fmt;

use roxmltree::Node;

use crate::core::xml_builder::XmlElement;
use crate::util::constants::{NAN_TEXT, QUAKEML_NS};
use crate::util::error::{missing_element, Result};

/// A quantity paired with its measurement uncertainty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UncertainValue {
    pub value: f64,
    pub uncertainty: f64,
}

/// Text form of an `xs:double` cell: a number, or missing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum XsDouble {
    Number(f64),
    Missing,
}

impl From<f64> for XsDouble {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            XsDouble::Missing
        } else {
            XsDouble::Number(value)
        }
    }
}

impl From<Option<f64>> for XsDouble {
    fn from(value: Option<f64>) -> Self {
        value.map_or(XsDouble::Missing, XsDouble::from)
    }
}

impl fmt::Display for XsDouble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            XsDouble::Missing => f.write_str(NAN_TEXT),
            XsDouble::Number(v) if v == f64::INFINITY => f.write_str("INF"),
            XsDouble::Number(v) if v == f64::NEG_INFINITY => f.write_str("-INF"),
            XsDouble::Number(v) => write!(f, "{v}"),
        }
    }
}

/// Parse optional element text as a float, NaN on absence or failure.
pub fn as_float(text: Option<&str>) -> f64 {
    text.and_then(|t| t.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Find a direct QuakeML child element by local name.
pub fn find_child<'a, 'input>(parent: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    parent
        .children()
        .find(|n| n.is_element() && n.has_tag_name((QUAKEML_NS, name)))
}

/// Like [`find_child`] but absence is a structural error.
pub fn require_child<'a, 'input>(parent: Node<'a, 'input>, name: &str) -> Result<Node<'a, 'input>> {
    find_child(parent, name).ok_or_else(|| missing_element(parent.tag_name().name(), name))
}

/// Text of the QuakeML child `name`, if the child exists and has text.
pub fn child_text<'a>(parent: Node<'a, '_>, name: &str) -> Option<&'a str> {
    find_child(parent, name).and_then(|n| n.text())
}

/// Read `<tag><value/><uncertainty/></tag>` below `parent`.
///
/// # Errors
/// Returns [`crate::util::error::ConversionError::MissingElement`] if `tag`
/// itself is absent. Missing or garbled numbers inside it become NaN.
pub fn read_uncertain(parent: Node<'_, '_>, tag: &str) -> Result<UncertainValue> {
    let child = require_child(parent, tag)?;
    Ok(UncertainValue {
        value: as_float(child_text(child, "value")),
        uncertainty: as_float(child_text(child, "uncertainty")),
    })
}

/// Append `<tag><value>value</value><uncertainty>..</uncertainty></tag>` to
/// `parent`.
pub fn write_uncertain(parent: &mut XmlElement, tag: &str, value: &str, uncertainty: XsDouble) {
    let child = parent.append(tag);
    child.append_text("value", Some(value));
    child.append_text("uncertainty", Some(&uncertainty.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<origin xmlns="http://quakeml.org/xmlns/bed/1.2">
        <depth><value> 32.0 </value><uncertainty>NaN</uncertainty></depth>
        <latitude><value>abc</value></latitude>
    </origin>"#;

    #[test]
    fn test_read_uncertain() {
        let doc = roxmltree::Document::parse(DOC).unwrap();
        let depth = read_uncertain(doc.root_element(), "depth").unwrap();
        assert_eq!(depth.value, 32.0);
        assert!(depth.uncertainty.is_nan());
    }

    #[test]
    fn test_read_uncertain_degrades_to_nan() {
        let doc = roxmltree::Document::parse(DOC).unwrap();
        let lat = read_uncertain(doc.root_element(), "latitude").unwrap();
        assert!(lat.value.is_nan());
        assert!(lat.uncertainty.is_nan());
    }

    #[test]
    fn test_read_uncertain_missing_element_is_error() {
        let doc = roxmltree::Document::parse(DOC).unwrap();
        let err = read_uncertain(doc.root_element(), "longitude").unwrap_err();
        assert!(err.to_string().contains("longitude"));
    }

    #[test]
    fn test_xs_double_display() {
        assert_eq!(XsDouble::from(f64::NAN).to_string(), "NaN");
        assert_eq!(XsDouble::from(None).to_string(), "NaN");
        assert_eq!(XsDouble::from(43.0).to_string(), "43");
        assert_eq!(XsDouble::from(-29.9883).to_string(), "-29.9883");
        assert_eq!(XsDouble::from(f64::NEG_INFINITY).to_string(), "-INF");
    }

    #[test]
    fn test_write_uncertain() {
        let mut origin = XmlElement::new("origin");
        write_uncertain(&mut origin, "depth", "43", XsDouble::Missing);
        let depth = origin.child("depth").unwrap();
        assert_eq!(depth.child("value").unwrap().text(), Some("43"));
        assert_eq!(depth.child("uncertainty").unwrap().text(), Some("NaN"));
    }
}
