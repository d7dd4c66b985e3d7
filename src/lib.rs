//! quakeconv library crate.
//!
//! Converts QuakeML event catalogs to flat tables and back, and ShakeMap
//! grids to intensity tables and rasters. The `quakeconv` binary in
//! `main.rs` is a thin command-line front end over these modules.

pub mod core;
pub mod export;
pub mod util;
