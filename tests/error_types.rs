//! Integration tests for error type construction and display.

use quakeconv::util::error::{missing_attribute, missing_element, ConversionError};

#[test]
fn missing_element_names_parent_and_child() {
    let err = missing_element("origin", "latitude");
    let msg = err.to_string();
    assert!(msg.contains("<latitude>"), "Should name the child: {msg}");
    assert!(msg.contains("<origin>"), "Should name the parent: {msg}");
}

#[test]
fn missing_attribute_names_attribute() {
    let err = missing_attribute("event", "publicID");
    let msg = err.to_string();
    assert!(msg.contains("'publicID'"), "Should name the attribute: {msg}");
    assert!(msg.contains("<event>"), "Should name the element: {msg}");
}

#[test]
fn xml_parse_error_preserves_message() {
    let err = ConversionError::XmlParse("unexpected EOF at line 42".into());
    let msg = err.to_string();
    assert!(
        msg.contains("unexpected EOF"),
        "Should contain detail: {msg}"
    );
}

#[test]
fn grid_shape_reports_counts() {
    let err = ConversionError::GridShape {
        tokens: 7,
        fields: 3,
    };
    let msg = err.to_string();
    assert!(msg.contains('7') && msg.contains('3'), "Should report counts: {msg}");
}

#[test]
fn export_error_preserves_message() {
    let err = ConversionError::Export("disk full".into());
    let msg = err.to_string();
    assert!(msg.contains("disk full"), "Should contain detail: {msg}");
}

#[test]
fn io_error_converts() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "no access");
    let err: ConversionError = io_err.into();
    let msg = err.to_string();
    assert!(msg.contains("no access"), "Should contain IO detail: {msg}");
    assert!(matches!(err, ConversionError::Io(_)));
}

#[test]
fn error_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ConversionError>();
}
