//! Content-specific parsers and pretty-printers used by the normalizer

pub mod csv;
pub mod json;
pub mod xml;
pub mod yaml;
