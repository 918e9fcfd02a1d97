//! JSON reformatting

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value;

use crate::error::ExtrasResult;

pub fn parse(text: &str) -> ExtrasResult<Value> {
    Ok(serde_json::from_str(text)?)
}

/// Serialize `value` with `indent` spaces per level, keeping key order.
pub fn pretty(value: &Value, indent: usize) -> ExtrasResult<String> {
    let indent = " ".repeat(indent);
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(indent.as_bytes()));
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
