//! Attachment normalization engine
//!
//! Turns raw content plus a mime hint into a canonical [`Attachment`].
//! Normalization never fails: every handler returns a `Result`, and the
//! dispatcher replaces an error with a plain-text attachment that names the
//! problem and quotes the original input.
//!
//! ```text
//! content ─┬─ empty? ──────────────────────────────► "Body or source is None or empty"
//!          ├─ lines? ──► URI list
//!          └─ hint ──► handler_for(Mime) ──► Ok(Attachment)
//!                                        └─► Err ──► text fallback
//! ```

use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::attachment::{Attachment, Content};
use crate::decorators;
use crate::error::{ExtrasError, ExtrasResult};
use crate::formats::{csv, json, xml, yaml};
use crate::mime::{Mime, MimeType};
use crate::persistence::{Category, Payload, PersistenceGateway};

/// Message of the attachment produced for empty input
pub const EMPTY_BODY_MESSAGE: &str = "Body or source is None or empty";

/// Formatting options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Spaces per level for JSON, XML and YAML
    pub indent: usize,
    pub csv_delimiter: char,
    /// Self-contained report: HTML pages become data URIs
    pub single_page: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            csv_delimiter: ',',
            single_page: false,
        }
    }
}

/// Handler for one content kind
type Handler = fn(&Normalizer, Content, Mime) -> ExtrasResult<Attachment>;

/// Dispatch table
fn handler_for(mime: Mime) -> (Handler, &'static str) {
    match mime {
        Mime::Json => (Normalizer::json as Handler, "Error formatting JSON"),
        Mime::Xml => (Normalizer::xml as Handler, "Error formatting XML"),
        Mime::Yaml => (Normalizer::yaml as Handler, "Error formatting YAML"),
        Mime::Csv => (Normalizer::csv as Handler, "Error formatting CSV"),
        Mime::Uri => (Normalizer::uri_list as Handler, "Error parsing uri-list body"),
        Mime::Html => (Normalizer::html as Handler, "Error encoding HTML body"),
        Mime::Text => (Normalizer::text as Handler, "Error parsing text body"),
        Mime::Svg => (Normalizer::svg as Handler, "Error parsing SVG body"),
        Mime::Bmp | Mime::Gif | Mime::Jpeg | Mime::Png | Mime::Image => {
            (Normalizer::multimedia as Handler, "Error parsing image bytes")
        }
        Mime::Mp4 | Mime::Ogg | Mime::Ogv | Mime::Webm | Mime::Video => {
            (Normalizer::multimedia as Handler, "Error parsing video bytes")
        }
    }
}

/// Builds attachments from raw content
#[derive(Clone)]
pub struct Normalizer {
    options: NormalizeOptions,
    gateway: Option<Arc<dyn PersistenceGateway>>,
}

impl Normalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self {
            options,
            gateway: None,
        }
    }

    /// Externalize HTML pages and unsupported content through `gateway`
    pub fn with_gateway(mut self, gateway: Arc<dyn PersistenceGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Normalize `content` declared as `mime`.
    ///
    /// An absent hint is treated as plain text. A custom (unsupported) hint
    /// turns the content into a downloadable file.
    pub fn normalize(&self, content: impl Into<Content>, mime: Option<&MimeType>) -> Attachment {
        let content = content.into();
        if content.is_empty() {
            return Attachment::text(EMPTY_BODY_MESSAGE);
        }

        let kind = match (&content, mime) {
            (Content::Lines(_), _) => MimeType::Known(Mime::Uri),
            (_, Some(mime)) => mime.clone(),
            (_, None) => MimeType::Known(Mime::Text),
        };
        debug!("Normalizing {} content as {}", content.kind(), kind);

        match kind {
            MimeType::Known(mime) => {
                let (handler, prefix) = handler_for(mime);
                let original = content.to_display_string();
                handler(self, content, mime).unwrap_or_else(|e| fallback(prefix, &original, e))
            }
            MimeType::Custom(custom) => {
                let original = content.to_display_string();
                self.download(content, &MimeType::Custom(custom))
                    .unwrap_or_else(|e| fallback("Error saving file", &original, e))
            }
        }
    }

    /// Normalize the file at `path`.
    ///
    /// Without a hint the file is copied into the downloads folder and
    /// linked; otherwise it is read and normalized like inline content.
    pub fn normalize_source(&self, path: &Path, mime: Option<&MimeType>) -> Attachment {
        let Some(mime) = mime else {
            return self.copy_download(path).unwrap_or_else(|e| {
                warn!("Error copying file {}: {}", path.display(), e);
                Attachment::text(format!("Error copying file: {}\n{}", path.display(), e))
            });
        };

        let read = if mime.is_image_binary() || mime.is_video() || mime.is_audio() {
            std::fs::read(path).map(Content::Bytes)
        } else {
            std::fs::read_to_string(path).map(Content::Text)
        };
        match read {
            Ok(content) => self.normalize(content, Some(mime)),
            Err(e) => {
                warn!("Error reading file {}: {}", path.display(), e);
                Attachment::text(format!("Error reading file: {}\n{}", path.display(), e))
            }
        }
    }

    fn gateway(&self) -> ExtrasResult<&Arc<dyn PersistenceGateway>> {
        self.gateway.as_ref().ok_or(ExtrasError::NoGateway)
    }

    fn json(&self, content: Content, _: Mime) -> ExtrasResult<Attachment> {
        let value = match content {
            Content::Structured(value) => value,
            other => json::parse(&decode_text(other)?)?,
        };
        Ok(Attachment::with_text(Mime::Json, json::pretty(&value, self.options.indent)?))
    }

    fn xml(&self, content: Content, _: Mime) -> ExtrasResult<Attachment> {
        let text = decode_text(content)?;
        Ok(Attachment::with_text(Mime::Xml, xml::pretty(&text, self.options.indent)?))
    }

    fn yaml(&self, content: Content, _: Mime) -> ExtrasResult<Attachment> {
        let text = decode_text(content)?;
        let value = yaml::parse(&text)?;
        Ok(Attachment::with_text(Mime::Yaml, yaml::pretty(&value, self.options.indent)?))
    }

    fn csv(&self, content: Content, _: Mime) -> ExtrasResult<Attachment> {
        let text = decode_text(content)?;
        let rows = csv::parse(&text, self.options.csv_delimiter);
        let table = decorators::render_table(&rows);
        Ok(Attachment::with_markup(Mime::Csv, text, table))
    }

    fn uri_list(&self, content: Content, _: Mime) -> ExtrasResult<Attachment> {
        let uris: Vec<String> = match content {
            Content::Text(text) => text.split('\n').map(|uri| uri.trim_end_matches('\r').to_string()).collect(),
            Content::Lines(lines) => lines,
            other => return Err(unexpected("text or a list of URIs", &other)),
        };
        let links = decorators::render_uri_list(uris.iter().map(String::as_str));
        Ok(Attachment::with_markup(Mime::Uri, uris.join("\n"), links))
    }

    fn html(&self, content: Content, _: Mime) -> ExtrasResult<Attachment> {
        let text = expect_text(content)?;
        let reference = match (&self.gateway, self.options.single_page) {
            (Some(gateway), false) => gateway.save(Payload::Text(&text), Some("html"), Category::Sources)?,
            _ => format!("data:text/html;base64,{}", STANDARD.encode(text.as_bytes())),
        };
        Ok(Attachment::with_markup(Mime::Html, text, reference))
    }

    fn text(&self, content: Content, _: Mime) -> ExtrasResult<Attachment> {
        Ok(Attachment::with_text(Mime::Text, expect_text(content)?))
    }

    fn svg(&self, content: Content, _: Mime) -> ExtrasResult<Attachment> {
        let markup = match content {
            Content::Text(text) => text,
            Content::Bytes(bytes) => String::from_utf8(bytes)
                .map_err(|_| ExtrasError::UnexpectedInput {
                    expected: "UTF-8 SVG markup",
                    found: "bytes",
                })?,
            other => return Err(unexpected("SVG markup", &other)),
        };
        Ok(Attachment::with_markup(Mime::Svg, markup.clone(), markup))
    }

    /// Binary images and videos: bytes as-is, strings base64-decoded
    fn multimedia(&self, content: Content, mime: Mime) -> ExtrasResult<Attachment> {
        let bytes = match content {
            Content::Bytes(bytes) => bytes,
            Content::Text(text) => decode_base64(&text)?,
            other => return Err(unexpected("bytes or a base64 string", &other)),
        };
        Ok(Attachment::with_bytes(mime.into(), bytes))
    }

    fn download(&self, content: Content, mime: &MimeType) -> ExtrasResult<Attachment> {
        let extension = mime.extension();
        let gateway = self.gateway()?;
        let reference = match &content {
            Content::Text(text) => gateway.save(Payload::Text(text), extension.as_deref(), Category::Downloads)?,
            Content::Bytes(bytes) => gateway.save(Payload::Bytes(bytes), extension.as_deref(), Category::Downloads)?,
            other => {
                let text = other.to_display_string();
                gateway.save(Payload::Text(&text), extension.as_deref(), Category::Downloads)?
            }
        };
        Ok(Attachment::download(None, decorators::render_uri(&reference)))
    }

    fn copy_download(&self, path: &Path) -> ExtrasResult<Attachment> {
        let reference = self.gateway()?.copy(path, None, Category::Downloads)?;
        Ok(Attachment::download(Some(path.to_path_buf()), decorators::render_uri(&reference)))
    }
}

/// Normalize without a persistence gateway
pub fn normalize(content: impl Into<Content>, mime: Option<&MimeType>, options: &NormalizeOptions) -> Attachment {
    Normalizer::new(options.clone()).normalize(content, mime)
}

/// Decode base64 text, ignoring line breaks and other ASCII whitespace
pub(crate) fn decode_base64(text: &str) -> ExtrasResult<Vec<u8>> {
    let compact: String = text.split_ascii_whitespace().collect();
    Ok(STANDARD.decode(compact)?)
}

fn expect_text(content: Content) -> ExtrasResult<String> {
    match content {
        Content::Text(text) => Ok(text),
        other => Err(unexpected("text", &other)),
    }
}

/// Text, or bytes holding UTF-8 text
fn decode_text(content: Content) -> ExtrasResult<String> {
    match content {
        Content::Bytes(bytes) => String::from_utf8(bytes).map_err(|_| ExtrasError::UnexpectedInput {
            expected: "UTF-8 text",
            found: "bytes",
        }),
        other => expect_text(other),
    }
}

fn unexpected(expected: &'static str, content: &Content) -> ExtrasError {
    ExtrasError::UnexpectedInput {
        expected,
        found: content.kind(),
    }
}

fn fallback(prefix: &str, original: &str, error: ExtrasError) -> Attachment {
    warn!("{}: {}", prefix, error);
    match error {
        ExtrasError::UnexpectedInput { found, .. } => {
            Attachment::text(format!("{} of type '{}'", prefix, found))
        }
        _ => Attachment::error(prefix, original),
    }
}
