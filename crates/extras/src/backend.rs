//! Secondary reporting backends
//!
//! A [`ReportBackend`] receives every attachment, screenshot and page source
//! recorded for a test, alongside the HTML report. Backends that attach a
//! kind natively get the body and its mime; attachments that only exist as
//! a file on disk are forwarded by path.

use std::path::Path;

use tracing::warn;

use crate::attachment::{Attachment, Body};
use crate::error::ExtrasResult;
use crate::mime::{Mime, MimeType};

/// Name of the attachment reporting a failed forward
pub const BACKEND_ERROR_NAME: &str = "Error creating attachment";

/// Name of page sources forwarded with screenshots
pub const PAGE_SOURCE_NAME: &str = "page source";

pub trait ReportBackend: Send + Sync {
    /// Attach content held in memory
    fn attach(&self, body: &Body, name: &str, mime: &MimeType) -> ExtrasResult<()>;

    /// Attach a file by path
    fn attach_file(&self, path: &Path, name: &str) -> ExtrasResult<()>;
}

/// Forward a normalized attachment. Body first, then source.
///
/// A failure is reported to the backend itself as a text attachment.
pub(crate) fn forward(backend: &dyn ReportBackend, name: &str, attachment: &Attachment) {
    let result = match (attachment.body(), attachment.source()) {
        (Some(body), _) => {
            let text = MimeType::Known(Mime::Text);
            backend.attach(body, name, attachment.mime().unwrap_or(&text))
        }
        (None, Some(path)) => backend.attach_file(path, name),
        (None, None) => return,
    };
    if let Err(e) = result {
        report_failure(backend, name, &e.to_string());
    }
}

/// Forward a screenshot and its optional page source
pub(crate) fn forward_screenshot(backend: &dyn ReportBackend, name: &str, png: &[u8], source: Option<&str>) {
    let image = Body::Bytes(png.to_vec());
    if let Err(e) = backend.attach(&image, name, &MimeType::Known(Mime::Png)) {
        report_failure(backend, name, &e.to_string());
    }
    if let Some(source) = source {
        let source = Body::Text(source.to_string());
        if let Err(e) = backend.attach(&source, PAGE_SOURCE_NAME, &MimeType::Known(Mime::Text)) {
            report_failure(backend, PAGE_SOURCE_NAME, &e.to_string());
        }
    }
}

fn report_failure(backend: &dyn ReportBackend, name: &str, error: &str) {
    warn!("Could not forward '{}' to the reporting backend: {}", name, error);
    let body = Body::Text(error.to_string());
    if let Err(e) = backend.attach(&body, BACKEND_ERROR_NAME, &MimeType::Known(Mime::Text)) {
        warn!("Could not report forwarding error: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Mutex;

    use super::*;
    use crate::error::ExtrasError;

    #[derive(Default)]
    struct Recorder {
        reject: Option<&'static str>,
        entries: Mutex<Vec<(String, String)>>,
    }

    impl ReportBackend for Recorder {
        fn attach(&self, _: &Body, name: &str, mime: &MimeType) -> ExtrasResult<()> {
            if self.reject == Some(name) {
                return Err(ExtrasError::Persistence("backend offline".into()));
            }
            self.entries.lock().unwrap().push((name.to_string(), mime.as_str().to_string()));
            Ok(())
        }

        fn attach_file(&self, path: &Path, name: &str) -> ExtrasResult<()> {
            self.entries.lock().unwrap().push((name.to_string(), path.display().to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_forward_body_and_source() {
        let backend = Recorder::default();
        forward(&backend, "Data", &Attachment::text("hello"));
        let download = Attachment::download(Some(PathBuf::from("/tmp/logs.zip")), "<a></a>".into());
        forward(&backend, "Logs", &download);

        let entries = backend.entries.lock().unwrap();
        assert_eq!(entries[0], ("Data".to_string(), "text/plain".to_string()));
        assert_eq!(entries[1], ("Logs".to_string(), "/tmp/logs.zip".to_string()));
    }

    #[test]
    fn test_failure_reported_as_text() {
        let backend = Recorder {
            reject: Some("Home"),
            ..Recorder::default()
        };
        forward_screenshot(&backend, "Home", &[1, 2, 3], Some("<html/>"));

        let entries = backend.entries.lock().unwrap();
        assert_eq!(entries[0], (BACKEND_ERROR_NAME.to_string(), "text/plain".to_string()));
        assert_eq!(entries[1], (PAGE_SOURCE_NAME.to_string(), "text/plain".to_string()));
    }
}
