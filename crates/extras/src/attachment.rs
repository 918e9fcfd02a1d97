//! Canonical attachment value and the raw content it is built from

use std::fmt;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::mime::{Mime, MimeType};

/// Raw content handed to the normalizer
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Bytes(Vec<u8>),
    /// Already structured data (JSON attachments)
    Structured(serde_json::Value),
    /// A sequence of entries (URI lists)
    Lines(Vec<String>),
}

impl Content {
    /// Short name of the variant, used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Content::Text(_) => "text",
            Content::Bytes(_) => "bytes",
            Content::Structured(_) => "structured",
            Content::Lines(_) => "lines",
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Content::Text(text) => text.is_empty(),
            Content::Bytes(bytes) => bytes.is_empty(),
            Content::Structured(value) => value.is_null(),
            Content::Lines(lines) => lines.is_empty(),
        }
    }

    /// Lossy string form, used when a fallback message quotes the input
    pub fn to_display_string(&self) -> String {
        match self {
            Content::Text(text) => text.clone(),
            Content::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Content::Structured(value) => value.to_string(),
            Content::Lines(lines) => lines.join("\n"),
        }
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::Text(value)
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Content::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Content {
    fn from(value: Vec<u8>) -> Self {
        Content::Bytes(value)
    }
}

impl From<&[u8]> for Content {
    fn from(value: &[u8]) -> Self {
        Content::Bytes(value.to_vec())
    }
}

impl From<serde_json::Value> for Content {
    fn from(value: serde_json::Value) -> Self {
        Content::Structured(value)
    }
}

impl From<Vec<String>> for Content {
    fn from(value: Vec<String>) -> Self {
        Content::Lines(value)
    }
}

impl From<Vec<&str>> for Content {
    fn from(value: Vec<&str>) -> Self {
        Content::Lines(value.into_iter().map(str::to_string).collect())
    }
}

/// Normalized body of an attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Text(String),
    Bytes(Vec<u8>),
}

impl Body {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) => Some(text),
            Body::Bytes(_) => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Body::Text(text) => text.as_bytes(),
            Body::Bytes(bytes) => bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Render-ready representation of a piece of evidence attached to a test step.
///
/// Built once by the normalizer and read-only afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    body: Option<Body>,
    source: Option<PathBuf>,
    mime: Option<MimeType>,
    inner_html: Option<String>,
}

impl Attachment {
    pub(crate) fn new(
        body: Option<Body>,
        source: Option<PathBuf>,
        mime: Option<MimeType>,
        inner_html: Option<String>,
    ) -> Self {
        Self {
            body,
            source,
            mime,
            inner_html,
        }
    }

    /// Plain text attachment
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Some(Body::Text(text.into())), None, Some(Mime::Text.into()), None)
    }

    /// Plain text attachment describing a failure, quoting the original input
    pub(crate) fn error(prefix: &str, original: &str) -> Self {
        Self::text(format!("{}:\n{}", prefix, original))
    }

    pub(crate) fn with_text(mime: Mime, text: String) -> Self {
        Self::new(Some(Body::Text(text)), None, Some(mime.into()), None)
    }

    pub(crate) fn with_bytes(mime: MimeType, bytes: Vec<u8>) -> Self {
        Self::new(Some(Body::Bytes(bytes)), None, Some(mime), None)
    }

    pub(crate) fn with_markup(mime: Mime, text: String, inner_html: String) -> Self {
        Self::new(Some(Body::Text(text)), None, Some(mime.into()), Some(inner_html))
    }

    /// Download of unknown type: no mime, only a rendered link
    pub(crate) fn download(source: Option<PathBuf>, inner_html: String) -> Self {
        Self::new(None, source, None, Some(inner_html))
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn text_body(&self) -> Option<&str> {
        self.body.as_ref().and_then(Body::as_text)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn mime(&self) -> Option<&MimeType> {
        self.mime.as_ref()
    }

    pub fn inner_html(&self) -> Option<&str> {
        self.inner_html.as_deref()
    }

    /// Whether this is a downloadable file of unknown type
    pub fn is_download(&self) -> bool {
        self.mime.is_none() && self.inner_html.is_some()
    }

    /// Whether there is nothing to render
    pub fn is_blank(&self) -> bool {
        self.body.as_ref().map_or(true, Body::is_empty)
            && self.inner_html.as_deref().map_or(true, str::is_empty)
    }
}

fn abbreviate(value: &str) -> String {
    const LIMIT: usize = 50;
    if value.chars().count() < LIMIT {
        value.to_string()
    } else {
        let head: String = value.chars().take(LIMIT).collect();
        format!("{}....", head)
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self.body.as_ref().map(|body| match body {
            Body::Text(text) => abbreviate(text),
            Body::Bytes(bytes) => abbreviate(&STANDARD.encode(bytes)),
        });
        f.debug_struct("Attachment")
            .field("body", &body)
            .field("source", &self.source)
            .field("mime", &self.mime.as_ref().map(MimeType::as_str))
            .field("inner_html", &self.inner_html.as_deref().map(abbreviate))
            .finish()
    }
}
