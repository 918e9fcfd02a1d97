//! CLI Commands

pub mod attach;
pub mod mime;
pub mod render;
