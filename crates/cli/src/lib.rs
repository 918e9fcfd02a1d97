//! Report Extras CLI
//!
//! Command-line interface over the report extras library.

pub mod commands;
pub mod output;
pub mod spec;
