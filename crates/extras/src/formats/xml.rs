//! XML pretty-printing on top of `quick-xml`
//!
//! The input is flattened first (newlines and the indentation that follows
//! them are dropped) so documents mixing hand-written and generated
//! formatting come out with a single consistent layout. The document must be
//! well-formed: one root element, balanced tags and no text outside the root.

use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::{Reader, Writer};
use regex::Regex;

use crate::error::{ExtrasError, ExtrasResult};

static NEWLINE_INDENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s+").expect("valid regex"));
static COMMENT_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*<!--.*?-->\s*$").expect("valid regex"));

/// Collapse source formatting before reparsing
pub fn flatten(text: &str) -> String {
    NEWLINE_INDENT.replace_all(text, "").replace('\n', "")
}

/// Reparse and indent `text` with `indent` spaces per level
pub fn pretty(text: &str, indent: usize) -> ExtrasResult<String> {
    let flat = flatten(text);
    let mut reader = Reader::from_str(&flat);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', indent);

    let mut open: Vec<String> = Vec::new();
    let mut roots = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| {
            ExtrasError::Xml(format!("position {}: {}", reader.buffer_position(), e))
        })?;

        match &event {
            Event::Eof => break,
            Event::Start(start) => {
                if open.is_empty() {
                    roots += 1;
                }
                open.push(String::from_utf8_lossy(start.name().as_ref()).into_owned());
            }
            Event::Empty(_) => {
                if open.is_empty() {
                    roots += 1;
                }
            }
            Event::End(_) => {
                open.pop();
            }
            Event::Text(text) => {
                if text.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                if open.is_empty() {
                    return Err(ExtrasError::Xml("text outside of the root element".to_string()));
                }
            }
            Event::CData(_) if open.is_empty() => {
                return Err(ExtrasError::Xml("CDATA outside of the root element".to_string()));
            }
            _ => {}
        }

        if roots > 1 {
            return Err(ExtrasError::Xml("more than one root element".to_string()));
        }

        writer
            .write_event(event)
            .map_err(|e| ExtrasError::Xml(e.to_string()))?;
    }

    if let Some(name) = open.last() {
        return Err(ExtrasError::Xml(format!("unclosed element <{}>", name)));
    }
    if roots == 0 {
        return Err(ExtrasError::Xml("no root element".to_string()));
    }

    let written = writer.into_inner();
    let output = String::from_utf8_lossy(&written);
    Ok(output
        .lines()
        .filter(|line| !COMMENT_LINE.is_match(line))
        .collect::<Vec<_>>()
        .join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten() {
        assert_eq!(flatten("<a>\n    <b>1</b>\n</a>\n"), "<a><b>1</b></a>");
    }

    #[test]
    fn test_pretty_indents_children() {
        let out = pretty("<root><item>Hello</item><item>World</item></root>", 2).unwrap();
        assert_eq!(out, "<root>\n  <item>Hello</item>\n  <item>World</item>\n</root>");
    }

    #[test]
    fn test_comment_lines_removed() {
        let out = pretty("<root><!-- note --><item/></root>", 4).unwrap();
        assert!(!out.contains("<!--"));
        assert!(out.contains("<item/>"));
    }

    #[test]
    fn test_declaration_kept() {
        let out = pretty("<?xml version=\"1.0\"?><root><a>1</a></root>", 4).unwrap();
        assert!(out.starts_with("<?xml"));
        assert!(out.contains("    <a>1</a>"));
    }

    #[test]
    fn test_malformed_inputs() {
        assert!(pretty("not xml <", 4).is_err());
        assert!(pretty("<a><b></a>", 4).is_err());
        assert!(pretty("<a>", 4).is_err());
        assert!(pretty("<a/><b/>", 4).is_err());
        assert!(pretty("plain words", 4).is_err());
    }
}
