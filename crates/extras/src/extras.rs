//! Per-test report facade
//!
//! A [`ReportSession`] owns the configuration and the persistence gateway for
//! a whole run. Each test gets a [`TestReport`] that records steps (comments,
//! screenshots, attachments, videos) and links, and finally renders the HTML
//! fragment appended to the test's entry in the report. An optional
//! [`ReportBackend`] receives a copy of every attachment and screenshot.

use std::path::Path;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::attachment::{Attachment, Body, Content};
use crate::backend::{self, ReportBackend};
use crate::config::{ExtrasConfig, ScreenshotStrategy};
use crate::decorators::escape_html_quoted;
use crate::error::{ExtrasError, ExtrasResult};
use crate::header::{self, Status, TestHeader};
use crate::link::{Link, LinkKind};
use crate::mime::{self, Mime, MimeType};
use crate::normalize::Normalizer;
use crate::persistence::{Category, FileStore, Payload, PersistenceGateway};
use crate::steps::{Step, StepLog};

/// Options of a screenshot step
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenshotOptions {
    /// Keep the page source even when sources are disabled globally
    pub page_source: bool,
    pub escape_html: bool,
}

/// State shared by every test of a run
pub struct ReportSession {
    config: ExtrasConfig,
    gateway: Option<Arc<dyn PersistenceGateway>>,
    backend: Option<Arc<dyn ReportBackend>>,
    store: Option<FileStore>,
    normalizer: Normalizer,
}

impl ReportSession {
    pub fn new(config: ExtrasConfig, gateway: Option<Arc<dyn PersistenceGateway>>) -> Self {
        let mut normalizer = Normalizer::new(config.normalize_options());
        if let Some(gateway) = &gateway {
            normalizer = normalizer.with_gateway(Arc::clone(gateway));
        }
        Self {
            config,
            gateway,
            backend: None,
            store: None,
            normalizer,
        }
    }

    /// Also send attachments and screenshots to `backend`
    pub fn with_backend(mut self, backend: Arc<dyn ReportBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Session writing assets under `config.report_dir`, cleared first
    pub fn open(config: ExtrasConfig) -> ExtrasResult<Self> {
        config.validate()?;
        let store = FileStore::new(&config.report_dir)?;
        store.prepare()?;
        let mut session = Self::new(config, Some(Arc::new(store.clone())));
        session.store = Some(store);
        Ok(session)
    }

    pub fn config(&self) -> &ExtrasConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub fn test_report(&self) -> TestReport<'_> {
        TestReport {
            session: self,
            steps: StepLog::new(),
            links: Vec::new(),
        }
    }

    /// Prune asset folders nothing was written to
    pub fn finish(&self) -> ExtrasResult<()> {
        if let Some(store) = &self.store {
            store.remove_empty_folders()?;
        }
        Ok(())
    }

    fn single_page(&self) -> bool {
        self.config.single_page
    }

    /// Reference of saved content, or a data URI in self-contained reports
    fn publish(&self, data: Payload<'_>, mime: &str, extension: Option<&str>, category: Category) -> ExtrasResult<String> {
        match (&self.gateway, self.single_page()) {
            (Some(gateway), false) => gateway.save(data, extension, category).map_err(|e| {
                warn!("Could not save {} asset: {}", category, e);
                e
            }),
            _ => Ok(format!("data:{};base64,{}", mime, STANDARD.encode(data.as_bytes()))),
        }
    }

    fn publish_source(&self, source: &str) -> Option<String> {
        self.publish(Payload::Text(source), "text/plain", Some("txt"), Category::Sources)
            .ok()
    }
}

/// Steps and links recorded by one test
pub struct TestReport<'s> {
    session: &'s ReportSession,
    steps: StepLog,
    links: Vec<Link>,
}

impl<'s> TestReport<'s> {
    /// Add a step with an attachment built from inline content.
    ///
    /// Images, videos and audio clips become media steps; anything else is
    /// shown below the comment.
    pub fn attach(&mut self, comment: &str, content: impl Into<Content>, mime: Option<&str>, escape: bool) {
        let mime = mime.and_then(mime::resolve);
        let content = content.into();
        if let Some(audio) = mime.as_ref().filter(|m| m.is_audio()) {
            self.add_audio(comment, content, audio, escape);
            return;
        }
        let attachment = self.session.normalizer.normalize(content, mime.as_ref());
        self.add_attachment_step(comment, attachment, escape);
    }

    /// Add a step with an attachment read from `path`.
    ///
    /// Without a mime hint the file is offered as a download.
    pub fn attach_file(&mut self, comment: &str, path: &Path, mime: Option<&str>, escape: bool) {
        let mime = mime.and_then(mime::resolve);
        let attachment = self.session.normalizer.normalize_source(path, mime.as_ref());
        self.add_attachment_step(comment, attachment, escape);
    }

    /// Add a screenshot step; skipped when only the final screenshot is kept
    pub fn screenshot(&mut self, comment: &str, png: &[u8], page_source: Option<&str>, options: ScreenshotOptions) {
        if !self.session.config.screenshots.keeps_intermediate() {
            debug!("Skipping screenshot '{}' ({} strategy)", comment, self.session.config.screenshots);
            return;
        }
        let source = page_source.filter(|_| self.session.config.sources || options.page_source);
        self.add_screenshot(comment, png, source, options.escape_html, None);
    }

    pub fn video(&mut self, comment: &str, bytes: Vec<u8>, mime: &str) {
        let mime = mime::resolve(mime)
            .filter(MimeType::is_video)
            .unwrap_or(MimeType::Known(Mime::Video));
        let attachment = self
            .session
            .normalizer
            .normalize(bytes, Some(&mime));
        self.add_attachment_step(comment, attachment, false);
    }

    /// Screenshot taken once the test is over, as the screenshot strategy
    /// dictates. Returns whether a step was added.
    pub fn final_screenshot(&mut self, status: Status, png: &[u8], page_source: Option<&str>) -> bool {
        let strategy = self.session.config.screenshots;
        let source = page_source.filter(|_| self.session.config.sources);

        if status.is_failure() {
            if strategy == ScreenshotStrategy::None {
                return false;
            }
            let comment = match status {
                Status::Failed => "Last screenshot before failure",
                Status::Xfailed => "Last screenshot before xfailure",
                Status::Skipped => "Last screenshot before skip",
                _ => "Last screenshot",
            };
            self.add_screenshot(comment, png, source, false, Some(status.comment_class()));
            true
        } else if strategy == ScreenshotStrategy::Last {
            self.add_screenshot("Last screenshot", png, source, false, None);
            true
        } else {
            false
        }
    }

    pub fn link(&mut self, url: &str, name: Option<&str>) {
        self.links.push(Link::new(url, name, LinkKind::Link));
    }

    /// Links to the issues named by comma-separated `keys`
    pub fn issue(&mut self, keys: &str) {
        let links = self.session.config.link_patterns().expand(keys, LinkKind::Issue);
        self.links.extend(links);
    }

    /// Links to the test cases named by comma-separated `keys`
    pub fn tms(&mut self, keys: &str) {
        let links = self.session.config.link_patterns().expand(keys, LinkKind::Tms);
        self.links.extend(links);
    }

    /// Store content in the downloads folder and return its reference
    pub fn add_to_downloads(&self, data: Payload<'_>) -> Option<String> {
        let gateway = self.session.gateway.as_ref()?;
        gateway
            .save(data, None, Category::Downloads)
            .map_err(|e| warn!("Could not add content to downloads: {}", e))
            .ok()
    }

    /// Copy a file into the downloads folder and return its reference
    pub fn add_file_to_downloads(&self, path: &Path) -> Option<String> {
        let gateway = self.session.gateway.as_ref()?;
        gateway
            .copy(path, None, Category::Downloads)
            .map_err(|e| warn!("Could not add {} to downloads: {}", path.display(), e))
            .ok()
    }

    pub fn steps(&self) -> &StepLog {
        &self.steps
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Header table, separator and steps table
    pub fn render(&self, header: &TestHeader) -> String {
        let mut header = header.clone();
        header.links.extend(self.links.iter().cloned());

        let links_column = self.session.config.links_column;
        let steps = self.steps.render_rows(self.session.single_page());
        let mut rows = header.render_rows(links_column);
        if steps.is_empty() {
            return format!(r#"<table class="extras_header">{}</table>"#, rows);
        }

        rows.push_str(&header::execution_row());
        format!(
            r#"<table class="extras_header">{}</table><hr class="extras_separator"><table style="width: 100%;">{}</table>"#,
            rows, steps
        )
    }

    fn comment(comment: &str, escape: bool) -> String {
        if escape {
            escape_html_quoted(comment)
        } else {
            comment.to_string()
        }
    }

    fn forward(&self, name: &str, attachment: &Attachment) {
        if let Some(backend) = &self.session.backend {
            backend::forward(backend.as_ref(), name, attachment);
        }
    }

    fn add_attachment_step(&mut self, comment: &str, attachment: Attachment, escape: bool) {
        let comment = Self::comment(comment, escape);
        self.forward(&comment, &attachment);
        let media = attachment
            .mime()
            .filter(|m| m.is_image() || m.is_video())
            .cloned();

        let Some(mime) = media else {
            self.steps.push(Step::comment(comment).with_attachment(attachment));
            return;
        };

        let category = if mime.is_video() { Category::Videos } else { Category::Images };
        let extension = mime.extension();
        let uri = match attachment.body() {
            Some(Body::Bytes(bytes)) => {
                self.session
                    .publish(Payload::Bytes(bytes), mime.as_str(), extension.as_deref(), category)
            }
            Some(Body::Text(text)) => {
                self.session
                    .publish(Payload::Text(text), mime.as_str(), extension.as_deref(), category)
            }
            None => {
                self.steps.push(Step::comment(comment).with_attachment(attachment));
                return;
            }
        };
        self.steps.push(media_step(comment, uri, attachment));
    }

    fn add_audio(&mut self, comment: &str, content: Content, mime: &MimeType, escape: bool) {
        let bytes = match content {
            Content::Bytes(bytes) => Ok(bytes),
            Content::Text(text) => crate::normalize::decode_base64(&text).map_err(|e| e.to_string()),
            other => Err(format!("unexpected {} content", other.kind())),
        };
        match bytes {
            Ok(bytes) if !bytes.is_empty() => {
                let comment = Self::comment(comment, escape);
                let extension = mime.extension();
                let uri = self
                    .session
                    .publish(Payload::Bytes(&bytes), mime.as_str(), extension.as_deref(), Category::Audio);
                let attachment = Attachment::with_bytes(mime.clone(), bytes);
                self.forward(&comment, &attachment);
                self.steps.push(media_step(comment, uri, attachment));
            }
            Ok(_) => self.add_attachment_step(comment, Attachment::text(crate::normalize::EMPTY_BODY_MESSAGE), escape),
            Err(e) => {
                warn!("Error parsing audio bytes: {}", e);
                self.add_attachment_step(comment, Attachment::text(format!("Error parsing audio bytes:\n{}", e)), escape);
            }
        }
    }

    fn add_screenshot(&mut self, comment: &str, png: &[u8], source: Option<&str>, escape: bool, class: Option<String>) {
        let comment = Self::comment(comment, escape);
        let image = if png.is_empty() {
            warn!("Empty screenshot for step '{}'", comment);
            None
        } else {
            if let Some(backend) = &self.session.backend {
                backend::forward_screenshot(backend.as_ref(), &comment, png, source);
            }
            Some(
                self.session
                    .publish(Payload::Bytes(png), Mime::Png.as_str(), Some("png"), Category::Images),
            )
        };
        let source = source.and_then(|s| self.session.publish_source(s));

        let mut step = match image {
            Some(Ok(uri)) => Step::comment(comment).with_multimedia(Some(uri)),
            Some(Err(e)) => Step::comment(comment).with_attachment(save_error(&e)),
            None => Step::comment(comment),
        }
        .with_source(source);
        if let Some(class) = class {
            step = step.with_class(class);
        }
        self.steps.push(step);
    }
}

/// Media step, or a text step naming the save error
fn media_step(comment: String, uri: ExtrasResult<String>, attachment: Attachment) -> Step {
    match uri {
        Ok(uri) => Step::comment(comment).with_multimedia(Some(uri)).with_attachment(attachment),
        Err(e) => Step::comment(comment).with_attachment(save_error(&e)),
    }
}

fn save_error(error: &ExtrasError) -> Attachment {
    Attachment::text(format!("Error saving file:\n{}", error))
}
