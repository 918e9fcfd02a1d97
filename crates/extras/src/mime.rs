//! Mime type registry
//!
//! The set of content kinds the report knows how to preview is closed: every
//! [`Mime`] maps to one canonical mime string and, except for the URI list and
//! the `image/*` / `video/*` wildcards, to one file extension. Hints coming
//! from callers are resolved into a [`MimeType`], which keeps unknown values
//! around as [`MimeType::Custom`] so they can still be offered as downloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported content kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mime {
    Json,
    Xml,
    Yaml,
    Bmp,
    Gif,
    Jpeg,
    Png,
    Svg,
    /// `image/*` wildcard
    Image,
    Csv,
    Html,
    Text,
    Uri,
    /// `video/*` wildcard
    Video,
    Mp4,
    Ogg,
    Ogv,
    Webm,
}

impl Mime {
    pub const ALL: [Mime; 18] = [
        Mime::Json,
        Mime::Xml,
        Mime::Yaml,
        Mime::Bmp,
        Mime::Gif,
        Mime::Jpeg,
        Mime::Png,
        Mime::Svg,
        Mime::Image,
        Mime::Csv,
        Mime::Html,
        Mime::Text,
        Mime::Uri,
        Mime::Video,
        Mime::Mp4,
        Mime::Ogg,
        Mime::Ogv,
        Mime::Webm,
    ];

    /// Canonical mime string
    pub fn as_str(&self) -> &'static str {
        match self {
            Mime::Json => "application/json",
            Mime::Xml => "application/xml",
            Mime::Yaml => "application/yaml",
            Mime::Bmp => "image/bmp",
            Mime::Gif => "image/gif",
            Mime::Jpeg => "image/jpeg",
            Mime::Png => "image/png",
            Mime::Svg => "image/svg+xml",
            Mime::Image => "image/*",
            Mime::Csv => "text/csv",
            Mime::Html => "text/html",
            Mime::Text => "text/plain",
            Mime::Uri => "text/uri-list",
            Mime::Video => "video/*",
            Mime::Mp4 => "video/mp4",
            Mime::Ogg => "video/ogg",
            Mime::Ogv => "video/ogv",
            Mime::Webm => "video/webm",
        }
    }

    /// Look up a kind by its canonical mime string (case-insensitive).
    ///
    /// `text/xml` is accepted as an alias of `application/xml`.
    pub fn from_mime_str(value: &str) -> Option<Mime> {
        let value = value.trim().to_ascii_lowercase();
        if value == "text/xml" {
            return Some(Mime::Xml);
        }
        Mime::ALL.into_iter().find(|m| m.as_str() == value)
    }

    /// Look up a kind by a bare file extension (case-insensitive)
    pub fn from_extension(value: &str) -> Option<Mime> {
        let mime = match value.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" | "plain" => Mime::Text,
            "svg" => Mime::Svg,
            "uri" => Mime::Uri,
            "json" => Mime::Json,
            "xml" => Mime::Xml,
            "yaml" | "yml" => Mime::Yaml,
            "bmp" => Mime::Bmp,
            "gif" => Mime::Gif,
            "jpeg" | "jpg" => Mime::Jpeg,
            "png" => Mime::Png,
            "csv" => Mime::Csv,
            "html" => Mime::Html,
            "mp4" => Mime::Mp4,
            "ogg" => Mime::Ogg,
            "ogv" => Mime::Ogv,
            "webm" => Mime::Webm,
            _ => return None,
        };
        Some(mime)
    }

    /// Whether the kind is a concrete supported type (wildcards are not)
    pub fn is_supported(&self) -> bool {
        !matches!(self, Mime::Image | Mime::Video)
    }

    pub fn is_image(&self) -> bool {
        self.as_str().starts_with("image/")
    }

    /// Image stored as a binary blob; SVG is inline markup
    pub fn is_image_binary(&self) -> bool {
        self.is_image() && *self != Mime::Svg
    }

    pub fn is_video(&self) -> bool {
        self.as_str().starts_with("video/")
    }

    pub fn is_multimedia(&self) -> bool {
        self.is_image() || self.is_video()
    }

    /// File extension used when the content is written to disk
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Mime::Uri | Mime::Image | Mime::Video => None,
            Mime::Text => Some("txt"),
            Mime::Svg => Some("svg"),
            other => other.as_str().split_once('/').map(|(_, subtype)| subtype),
        }
    }
}

impl fmt::Display for Mime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved mime hint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MimeType {
    /// One of the supported kinds
    Known(Mime),
    /// Unsupported but accepted: an explicit custom mime string or the
    /// best-effort suffix of an unknown extension
    Custom(String),
}

impl MimeType {
    pub fn as_str(&self) -> &str {
        match self {
            MimeType::Known(mime) => mime.as_str(),
            MimeType::Custom(value) => value,
        }
    }

    pub fn known(&self) -> Option<Mime> {
        match self {
            MimeType::Known(mime) => Some(*mime),
            MimeType::Custom(_) => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.known().is_some_and(|m| m.is_supported())
    }

    pub fn is_image(&self) -> bool {
        self.as_str().starts_with("image/")
    }

    pub fn is_image_binary(&self) -> bool {
        self.is_image() && !self.as_str().starts_with("image/svg")
    }

    pub fn is_video(&self) -> bool {
        self.as_str().starts_with("video/")
    }

    pub fn is_audio(&self) -> bool {
        self.as_str().starts_with("audio/")
    }

    pub fn is_multimedia(&self) -> bool {
        self.is_image() || self.is_video()
    }

    /// Extension for files written with this type.
    ///
    /// Custom values yield the text after the last `.` or `/`, or the whole
    /// value when neither separator is present.
    pub fn extension(&self) -> Option<String> {
        match self {
            MimeType::Known(mime) => mime.extension().map(str::to_string),
            MimeType::Custom(value) => Some(last_segment(value).to_string()),
        }
    }
}

impl From<Mime> for MimeType {
    fn from(mime: Mime) -> Self {
        MimeType::Known(mime)
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MimeType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(resolve_or_custom(s))
    }
}

/// Resolve a mime string or a bare extension.
///
/// Returns `None` only for empty input. Unknown slash-containing values are
/// kept verbatim (lowercased); unknown bare tokens are reduced to their last
/// `.`-separated suffix.
pub fn resolve(value: &str) -> Option<MimeType> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some(resolve_or_custom(value))
}

fn resolve_or_custom(value: &str) -> MimeType {
    let lowered = value.trim().to_ascii_lowercase();
    if let Some(mime) = Mime::from_mime_str(&lowered).or_else(|| Mime::from_extension(&lowered)) {
        return MimeType::Known(mime);
    }
    if lowered.contains('/') {
        MimeType::Custom(lowered)
    } else {
        MimeType::Custom(last_segment(&lowered).to_string())
    }
}

fn last_segment(value: &str) -> &str {
    match value.rfind(['.', '/']) {
        Some(idx) => &value[idx + 1..],
        None => value,
    }
}

pub fn is_supported(mime: Option<&MimeType>) -> bool {
    mime.is_some_and(MimeType::is_supported)
}

pub fn is_image(mime: Option<&MimeType>) -> bool {
    mime.is_some_and(MimeType::is_image)
}

pub fn is_video(mime: Option<&MimeType>) -> bool {
    mime.is_some_and(MimeType::is_video)
}

pub fn is_multimedia(mime: Option<&MimeType>) -> bool {
    mime.is_some_and(MimeType::is_multimedia)
}
