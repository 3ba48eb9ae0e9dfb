//! Shared CLI argument types
//!
//! This module contains reusable argument structs that can be flattened
//! into commands using `#[command(flatten)]`.

mod common;
mod global;

pub use common::{OutputFormat, SessionArgs};
pub use global::GlobalOptions;
