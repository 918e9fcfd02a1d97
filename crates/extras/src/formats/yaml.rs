//! YAML reformatting
//!
//! `serde_yaml` always emits two-space indentation, so block layout is
//! produced here and `serde_yaml` is only used to parse and to render
//! single-line scalars with correct quoting. Sequences nested in a mapping
//! are not indented, and the first entry of a nested collection shares the
//! line of its `-` marker, padded to the indent width. Mapping keys are
//! emitted in sorted order.

use serde_yaml::Value;

use crate::error::{ExtrasError, ExtrasResult};

/// Narrowest indent that keeps `-` markers followed by a space
const MIN_INDENT: usize = 2;

pub fn parse(text: &str) -> ExtrasResult<Value> {
    Ok(serde_yaml::from_str(text)?)
}

/// Dump `value` with `indent` spaces per nesting level
pub fn pretty(value: &Value, indent: usize) -> ExtrasResult<String> {
    let emitter = Emitter {
        indent: indent.max(MIN_INDENT),
    };
    let mut out = String::new();
    match value {
        Value::Mapping(map) if !map.is_empty() => emitter.mapping(map, 0, &mut out)?,
        Value::Sequence(seq) if !seq.is_empty() => emitter.sequence(seq, 0, &mut out)?,
        other => {
            out.push_str(&emitter.scalar(other)?);
            out.push('\n');
        }
    }
    Ok(out)
}

struct Emitter {
    indent: usize,
}

impl Emitter {
    fn pad(&self, level: usize) -> String {
        " ".repeat(level * self.indent)
    }

    fn mapping(&self, map: &serde_yaml::Mapping, level: usize, out: &mut String) -> ExtrasResult<()> {
        let mut entries = map
            .iter()
            .map(|(key, value)| Ok((self.scalar(key)?, value)))
            .collect::<ExtrasResult<Vec<_>>>()?;
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (key, value) in entries {
            out.push_str(&self.pad(level));
            out.push_str(&key);
            out.push(':');
            match value {
                Value::Mapping(inner) if !inner.is_empty() => {
                    out.push('\n');
                    self.mapping(inner, level + 1, out)?;
                }
                Value::Sequence(inner) if !inner.is_empty() => {
                    out.push('\n');
                    self.sequence(inner, level, out)?;
                }
                scalar => {
                    out.push(' ');
                    out.push_str(&self.scalar(scalar)?);
                    out.push('\n');
                }
            }
        }
        Ok(())
    }

    fn sequence(&self, seq: &[Value], level: usize, out: &mut String) -> ExtrasResult<()> {
        for item in seq {
            match item {
                Value::Mapping(inner) if !inner.is_empty() => {
                    let mut nested = String::new();
                    self.mapping(inner, level + 1, &mut nested)?;
                    out.push_str(&self.with_marker(&nested, level));
                }
                Value::Sequence(inner) if !inner.is_empty() => {
                    let mut nested = String::new();
                    self.sequence(inner, level + 1, &mut nested)?;
                    out.push_str(&self.with_marker(&nested, level));
                }
                scalar => {
                    out.push_str(&self.pad(level));
                    out.push_str("- ");
                    out.push_str(&self.scalar(scalar)?);
                    out.push('\n');
                }
            }
        }
        Ok(())
    }

    /// Replace the leading padding of a nested block with a `-` marker
    fn with_marker(&self, nested: &str, level: usize) -> String {
        let width = (level + 1) * self.indent;
        let marker = format!("{}-{}", self.pad(level), " ".repeat(self.indent - 1));
        format!("{}{}", marker, &nested[width.min(nested.len())..])
    }

    fn scalar(&self, value: &Value) -> ExtrasResult<String> {
        match value {
            Value::Null => Ok("null".to_string()),
            Value::Mapping(map) if map.is_empty() => Ok("{}".to_string()),
            Value::Sequence(seq) if seq.is_empty() => Ok("[]".to_string()),
            Value::String(text) if text.contains('\n') => Ok(serde_json::to_string(text)?),
            Value::Tagged(tagged) => Ok(format!("{} {}", tagged.tag, self.scalar(&tagged.value)?)),
            Value::Mapping(_) | Value::Sequence(_) => Err(ExtrasError::Yaml(
                <serde_yaml::Error as serde::de::Error>::custom("collections cannot be used as keys"),
            )),
            other => Ok(serde_yaml::to_string(other)?.trim_end_matches('\n').to_string()),
        }
    }
}
