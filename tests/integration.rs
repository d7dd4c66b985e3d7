//! Integration tests for quakeconv.
//!
//! These tests drive the public library API end to end against the XML
//! fixtures in `tests/fixtures/`, writing any output files to the system
//! temp directory.

mod error_types;
