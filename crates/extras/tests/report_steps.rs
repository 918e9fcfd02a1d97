//! Report session tests
//!
//! Drives a whole test report through the public API against a real
//! report folder, against a gateway whose writes always fail and with a
//! secondary reporting backend attached.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use report_extras::backend::{BACKEND_ERROR_NAME, PAGE_SOURCE_NAME};
use report_extras::{
    Body, Category, ExtrasConfig, ExtrasError, ExtrasResult, MimeType, Mime, Payload, PersistenceGateway,
    ReportBackend, ReportSession, ScreenshotOptions, Status, TestHeader,
};
use tempfile::TempDir;

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Gateway that rejects every write
#[derive(Default)]
struct BrokenDisk {
    attempts: AtomicUsize,
}

impl PersistenceGateway for BrokenDisk {
    fn save(&self, _: Payload<'_>, _: Option<&str>, category: Category) -> ExtrasResult<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ExtrasError::Persistence(format!("{} is read-only", category)))
    }

    fn copy(&self, source: &Path, _: Option<&str>, _: Category) -> ExtrasResult<String> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ExtrasError::Persistence(format!("cannot copy {}", source.display())))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Forwarded {
    Body { name: String, mime: String, body: Body },
    File { name: String, path: PathBuf },
}

/// Backend keeping everything it receives; rejects JSON attachments
#[derive(Default)]
struct Recorder {
    received: Mutex<Vec<Forwarded>>,
}

impl Recorder {
    fn received(&self) -> Vec<Forwarded> {
        self.received.lock().unwrap().clone()
    }
}

impl ReportBackend for Recorder {
    fn attach(&self, body: &Body, name: &str, mime: &MimeType) -> ExtrasResult<()> {
        if mime == &MimeType::Known(Mime::Json) {
            return Err(ExtrasError::Persistence("json attachments disabled".into()));
        }
        self.received.lock().unwrap().push(Forwarded::Body {
            name: name.to_string(),
            mime: mime.as_str().to_string(),
            body: body.clone(),
        });
        Ok(())
    }

    fn attach_file(&self, path: &Path, name: &str) -> ExtrasResult<()> {
        self.received.lock().unwrap().push(Forwarded::File {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
        Ok(())
    }
}

fn open(tmp: &TempDir) -> ReportSession {
    ReportSession::open(ExtrasConfig {
        report_dir: tmp.path().join("report"),
        ..ExtrasConfig::default()
    })
    .unwrap()
}

#[test]
fn full_report_renders_every_step() {
    let tmp = TempDir::new().unwrap();
    let session = open(&tmp);
    let mut report = session.test_report();

    report.screenshot("Open login page", PNG, None, ScreenshotOptions::default());
    report.attach("Request", r#"{"user":"alice"}"#, Some("json"), false);
    report.attach("Rows", "a,b\n1,2", Some("text/csv"), false);
    report.attach("Links", vec!["https://a.example", "https://b.example"], None, false);
    report.attach("Page", "<h1>Welcome</h1>", Some("text/html"), false);
    report.final_screenshot(Status::Failed, PNG, None);

    assert_eq!(report.steps().len(), 6);
    let html = report.render(&TestHeader::new(Status::Failed));

    assert!(html.contains("extras_status_failed"));
    assert!(html.contains("Open login page"));
    assert!(html.contains("&quot;user&quot;") || html.contains("\"user\""));
    assert!(html.contains("<th>a</th>"));
    assert!(html.contains(r#"href="https://b.example""#));
    assert!(html.contains(r#"<iframe class="extras_iframe" src="sources/"#));
    assert!(html.contains("Last screenshot before failure"));
    assert!(html.contains("extras_color_failed"));

    let images = fs::read_dir(tmp.path().join("report/images")).unwrap().count();
    assert_eq!(images, 2);
}

#[test]
fn file_attachments_and_downloads() {
    let tmp = TempDir::new().unwrap();
    let session = open(&tmp);
    let mut report = session.test_report();

    let data = tmp.path().join("payload.yaml");
    fs::write(&data, "name: alice\nroles:\n  - admin\n").unwrap();
    let archive = tmp.path().join("logs.zip");
    fs::write(&archive, b"PK\x03\x04").unwrap();

    report.attach_file("Payload", &data, Some("yaml"), false);
    report.attach_file("Logs", &archive, None, false);
    report.attach_file("Missing", &tmp.path().join("missing.json"), Some("json"), false);

    let steps = report.steps().steps();
    let yaml = steps[0].attachment.as_ref().unwrap();
    assert_eq!(yaml.mime(), Some(&MimeType::Known(Mime::Yaml)));
    assert_eq!(yaml.text_body(), Some("name: alice\nroles:\n- admin\n"));

    let download = steps[1].attachment.as_ref().unwrap();
    assert!(download.is_download());
    assert_eq!(download.source(), Some(archive.as_path()));
    assert!(download.inner_html().unwrap().contains(".zip</a>"));

    let missing = steps[2].attachment.as_ref().unwrap().text_body().unwrap();
    assert!(missing.starts_with("Error reading file: "));

    session.finish().unwrap();
    assert!(tmp.path().join("report/downloads").exists());
    assert!(!tmp.path().join("report/videos").exists());
}

#[test]
fn failing_gateway_degrades_gracefully() {
    let gateway = Arc::new(BrokenDisk::default());
    let session = ReportSession::new(ExtrasConfig::default(), Some(gateway.clone()));
    let mut report = session.test_report();

    report.attach("Page", "<p>hi</p>", Some("html"), false);
    report.attach("Blob", "binary-ish", Some("application/x-blob"), false);
    report.screenshot("Home", PNG, None, ScreenshotOptions::default());

    let steps = report.steps().steps();
    let html = steps[0].attachment.as_ref().unwrap().text_body().unwrap();
    assert_eq!(html, "Error encoding HTML body:\n<p>hi</p>");
    let blob = steps[1].attachment.as_ref().unwrap().text_body().unwrap();
    assert_eq!(blob, "Error saving file:\nbinary-ish");
    assert!(steps[2].multimedia.is_none());

    assert_eq!(gateway.attempts.load(Ordering::SeqCst), 3);
    assert!(report.add_to_downloads(Payload::Bytes(b"x")).is_none());
}

#[test]
fn unsaved_media_becomes_error_text() {
    let gateway = Arc::new(BrokenDisk::default());
    let session = ReportSession::new(ExtrasConfig::default(), Some(gateway.clone()));
    let mut report = session.test_report();

    report.attach("Logo", PNG.to_vec(), Some("png"), false);
    report.video("Clip", vec![0, 0, 0, 0x18], "video/mp4");
    report.attach("Beep", vec![1u8, 2, 3], Some("audio/mpeg"), false);

    for step in report.steps().steps() {
        assert!(step.multimedia.is_none());
        let text = step.attachment.as_ref().unwrap().text_body().unwrap();
        assert!(text.starts_with("Error saving file:\nPersistence error: "), "{}", text);
    }

    let row = report.steps().steps()[0].render(false);
    assert_eq!(
        row,
        "<tr><td colspan=\"2\"><span class=\"extras_font extras_color_comment\">Logo</span>\
         <pre class=\"extras_pre\">Error saving file:\nPersistence error: images is read-only</pre></td></tr>"
    );
    assert_eq!(gateway.attempts.load(Ordering::SeqCst), 3);
}

#[test]
fn backend_receives_attachments_and_screenshots() {
    let tmp = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let session = ReportSession::open(ExtrasConfig {
        report_dir: tmp.path().join("report"),
        sources: true,
        ..ExtrasConfig::default()
    })
    .unwrap()
    .with_backend(recorder.clone());
    let mut report = session.test_report();

    let archive = tmp.path().join("logs.zip");
    fs::write(&archive, b"PK\x03\x04").unwrap();

    report.screenshot("Home", PNG, Some("<html></html>"), ScreenshotOptions::default());
    report.attach("Note", "plain words", None, false);
    report.attach_file("Logs", &archive, None, false);
    report.attach("Request", r#"{"a":1}"#, Some("json"), false);

    assert_eq!(
        recorder.received(),
        vec![
            Forwarded::Body {
                name: "Home".into(),
                mime: "image/png".into(),
                body: Body::Bytes(PNG.to_vec()),
            },
            Forwarded::Body {
                name: PAGE_SOURCE_NAME.into(),
                mime: "text/plain".into(),
                body: Body::Text("<html></html>".into()),
            },
            Forwarded::Body {
                name: "Note".into(),
                mime: "text/plain".into(),
                body: Body::Text("plain words".into()),
            },
            Forwarded::File {
                name: "Logs".into(),
                path: archive.clone(),
            },
            Forwarded::Body {
                name: BACKEND_ERROR_NAME.into(),
                mime: "text/plain".into(),
                body: Body::Text("Persistence error: json attachments disabled".into()),
            },
        ]
    );

    // the HTML report is unaffected by backend failures
    assert_eq!(report.steps().len(), 4);
    assert!(report.steps().steps()[3].attachment.as_ref().unwrap().text_body().unwrap().contains("\"a\": 1"));
}

#[test]
fn single_page_report_embeds_everything() {
    let tmp = TempDir::new().unwrap();
    let session = ReportSession::open(ExtrasConfig {
        report_dir: tmp.path().to_path_buf(),
        single_page: true,
        sources: true,
        ..ExtrasConfig::default()
    })
    .unwrap();
    let mut report = session.test_report();

    report.screenshot("Home", PNG, Some("<html></html>"), ScreenshotOptions::default());
    report.attach("Page", "<p>hi</p>", Some("html"), false);
    report.video("Clip", vec![0, 0, 0, 0x18], "video/mp4");

    let html = report.render(&TestHeader::new(Status::Passed));
    assert!(html.contains(r#"<img src="data:image/png;base64,"#));
    assert!(html.contains(r#"href="data:text/plain;base64,"#));
    assert!(html.contains(r#"src="data:text/html;base64,PHA+aGk8L3A+""#));
    assert!(html.contains(r#"<source src="data:video/mp4;base64,AAAAGA==" type="video/mp4">"#));
    assert_eq!(fs::read_dir(tmp.path().join("images")).unwrap().count(), 0);
}
