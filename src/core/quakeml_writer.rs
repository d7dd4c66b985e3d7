//! QuakeML catalog writer.
//!
//! Serialises catalog rows into a QuakeML 1.2 `eventParameters` document,
//! one `event` per row in row order. Written documents are always read back
//! by [`crate::core::quakeml_reader`]; the two stay structurally symmetric
//! except that only the preferred fault plane survives (as `nodalPlane1`).

use crate::core::event_record::EventRecord;
use crate::core::timestamp::format_timestamp;
use crate::core::uncertain::{write_uncertain, XsDouble};
use crate::core::xml_builder::XmlElement;
use crate::util::constants::{EVENT_TYPE, ID_PREFIX, MAGNITUDE_TYPE, QUAKEML_NS, ROOT_PUBLIC_ID};
use crate::util::error::Result;

/// Prefix `id` with `quakeml:quakeledger/` unless it already carries it.
pub fn add_id_prefix(id: &str) -> String {
    if id.starts_with(ID_PREFIX) {
        id.to_owned()
    } else {
        format!("{ID_PREFIX}{id}")
    }
}

/// Build the in-memory QuakeML document for `events`.
pub fn write_catalog(events: &[EventRecord]) -> XmlElement {
    let mut root = XmlElement::new("eventParameters")
        .with_attribute("xmlns", QUAKEML_NS)
        .with_attribute("publicID", add_id_prefix(ROOT_PUBLIC_ID));
    for event in events {
        write_event(&mut root, event);
    }
    tracing::info!("Encoded {} events as QuakeML", events.len());
    root
}

/// Build the QuakeML document for `events` and pretty-print it.
///
/// # Errors
/// Returns [`crate::util::error::ConversionError::Export`] if serialisation
/// fails.
pub fn write_catalog_string(events: &[EventRecord]) -> Result<String> {
    write_catalog(events).to_pretty_string()
}

fn number(value: f64) -> String {
    XsDouble::from(value).to_string()
}

fn write_event(root: &mut XmlElement, quake: &EventRecord) {
    let id = add_id_prefix(&quake.event_id);
    let agency = quake.agency.as_deref();

    let event = root.append("event");
    event.set_attribute("publicID", id.as_str());
    event.append_text("preferredOriginID", Some(&id));
    event.append_text("preferredMagnitudeID", Some(&id));
    event.append_text("type", Some(EVENT_TYPE));
    event
        .append("description")
        .append_text("text", quake.event_type.as_deref());

    let origin = event.append("origin");
    origin.set_attribute("publicID", id.as_str());
    write_uncertain(
        origin,
        "time",
        &format_timestamp(&quake.event_time()),
        quake.time_uncertainty.into(),
    );
    write_uncertain(
        origin,
        "latitude",
        &number(quake.latitude),
        quake.latitude_uncertainty.into(),
    );
    write_uncertain(
        origin,
        "longitude",
        &number(quake.longitude),
        quake.longitude_uncertainty.into(),
    );
    write_uncertain(
        origin,
        "depth",
        &number(quake.depth),
        quake.depth_uncertainty.into(),
    );
    origin.append("creationInfo").append_text("author", agency);

    let ellipse = origin.append("originUncertainty");
    ellipse.append_text(
        "horizontalUncertainty",
        Some(&number(quake.horizontal_uncertainty)),
    );
    ellipse.append_text(
        "minHorizontalUncertainty",
        Some(&number(quake.min_horizontal_uncertainty)),
    );
    ellipse.append_text(
        "maxHorizontalUncertainty",
        Some(&number(quake.max_horizontal_uncertainty)),
    );
    ellipse.append_text(
        "azimuthMaxHorizontalUncertainty",
        Some(&number(quake.azimuth_max_horizontal_uncertainty)),
    );

    let magnitude = event.append("magnitude");
    magnitude.set_attribute("publicID", id.as_str());
    write_uncertain(
        magnitude,
        "mag",
        &number(quake.magnitude),
        quake.magnitude_uncertainty.into(),
    );
    magnitude.append_text("type", Some(MAGNITUDE_TYPE));
    magnitude.append("creationInfo").append_text("author", agency);

    // fault plane only, never the auxiliary plane
    let mechanism = event.append("focalMechanism");
    mechanism.set_attribute("publicID", id.as_str());
    let planes = mechanism.append("nodalPlanes");
    planes.set_attribute("preferredPlane", "1");
    let plane = planes.append("nodalPlane1");
    write_uncertain(plane, "strike", &number(quake.strike), quake.strike_uncertainty.into());
    write_uncertain(plane, "dip", &number(quake.dip), quake.dip_uncertainty.into());
    write_uncertain(plane, "rake", &number(quake.rake), quake.rake_uncertainty.into());

    tracing::debug!("Encoded event {id}");
}
