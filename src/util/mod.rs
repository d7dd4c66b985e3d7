//! Shared utilities: errors, constants and conversion options.

pub mod constants;
pub mod error;
pub mod options;
