//! Core conversion modules for quakeconv.
//!
//! Contains the catalog row model, the timestamp and uncertain-value
//! codecs, the QuakeML reader and writer, the ShakeMap grid reader, and the
//! geometry and raster derivations built on their tables.

pub mod event_record;
pub mod geometry;
pub mod quakeml_reader;
pub mod quakeml_writer;
pub mod raster;
pub mod shakemap;
pub mod timestamp;
pub mod uncertain;
pub mod xml_builder;
