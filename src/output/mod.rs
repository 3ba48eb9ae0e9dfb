//! Output formatting for CLI results
//!
//! Table and pretty output go through [`table`] and the display models;
//! JSON output wraps data in an envelope with version and session metadata.

pub mod formatters;
pub mod json;
pub mod table;
