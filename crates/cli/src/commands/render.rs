//! Render a YAML report spec into an HTML fragment

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use report_extras::{Content, ExtrasConfig, Mime, MimeType, ReportSession, ScreenshotOptions, TestReport};
use tracing::{debug, warn};

use crate::output::{self, OutputFormat};
use crate::spec::{ReportSpec, StepSpec};

#[derive(Args)]
pub struct RenderArgs {
    /// YAML report spec
    #[arg(required = true)]
    pub spec: PathBuf,

    /// Write the fragment to this file instead of stdout
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Report folder receiving saved assets
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Embed media as data URIs
    #[arg(long)]
    pub single_page: bool,
}

pub fn execute(args: RenderArgs, mut config: ExtrasConfig, _format: OutputFormat) -> anyhow::Result<()> {
    if let Some(report_dir) = args.report_dir {
        config.report_dir = report_dir;
    }
    config.single_page |= args.single_page;

    let spec = ReportSpec::from_file(&args.spec)?;
    let session = ReportSession::open(config)?;
    let html = render_spec(&spec, &session);
    session.finish()?;

    match args.out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &html)?;
            output::print_success(&format!(
                "Rendered {} to {}",
                spec.name.bold(),
                path.display()
            ));
        }
        None => println!("{}", html),
    }
    Ok(())
}

/// Replay the spec's steps into a fresh test report and render it
pub fn render_spec(spec: &ReportSpec, session: &ReportSession) -> String {
    let mut report = session.test_report();

    for link in &spec.links {
        report.link(&link.url, link.name.as_deref());
    }
    if let Some(keys) = &spec.issues {
        report.issue(keys);
    }
    if let Some(keys) = &spec.tms {
        report.tms(keys);
    }

    for step in &spec.steps {
        replay(spec, &mut report, step);
    }

    if let Some(path) = &spec.final_screenshot {
        match std::fs::read(spec.resolve(path)) {
            Ok(png) => {
                report.final_screenshot(spec.status, &png, None);
            }
            Err(e) => warn!("Cannot read final screenshot {}: {}", path.display(), e),
        }
    }

    debug!("Rendering {} steps for {}", report.steps().len(), spec.name);
    report.render(&spec.header())
}

fn replay(spec: &ReportSpec, report: &mut TestReport<'_>, step: &StepSpec) {
    match step {
        StepSpec::Attach {
            comment,
            body: Some(body),
            mime,
            escape,
            ..
        } => {
            let content = content_from_yaml(body, mime.as_deref());
            report.attach(comment, content, mime.as_deref(), *escape);
        }
        StepSpec::Attach {
            comment,
            file: Some(file),
            mime,
            escape,
            ..
        } => report.attach_file(comment, &spec.resolve(file), mime.as_deref(), *escape),
        StepSpec::Attach { comment, escape, .. } => report.attach(comment, "", None, *escape),
        StepSpec::Screenshot {
            comment,
            file,
            page_source,
            escape,
        } => {
            let png = match std::fs::read(spec.resolve(file)) {
                Ok(png) => png,
                Err(e) => {
                    warn!("Cannot read screenshot {}: {}", file.display(), e);
                    Vec::new()
                }
            };
            let source = page_source
                .as_ref()
                .and_then(|p| std::fs::read_to_string(spec.resolve(p)).ok());
            let options = ScreenshotOptions {
                page_source: source.is_some(),
                escape_html: *escape,
            };
            report.screenshot(comment, &png, source.as_deref(), options);
        }
        StepSpec::Video { comment, file, mime } => match std::fs::read(spec.resolve(file)) {
            Ok(bytes) => report.video(comment, bytes, mime),
            Err(e) => warn!("Cannot read video {}: {}", file.display(), e),
        },
    }
}

/// Inline YAML body as attachment content.
///
/// Strings stay text; lists of strings are URI lists unless another kind is
/// requested; anything else is structured data.
fn content_from_yaml(body: &serde_yaml::Value, mime: Option<&str>) -> Content {
    let uri_list = mime
        .and_then(report_extras::mime::resolve)
        .map_or(true, |m| m == MimeType::Known(Mime::Uri));

    match body {
        serde_yaml::Value::String(text) => Content::Text(text.clone()),
        serde_yaml::Value::Sequence(items) if uri_list && items.iter().all(|i| i.is_string()) => {
            Content::Lines(items.iter().filter_map(|i| i.as_str().map(str::to_string)).collect())
        }
        other => match serde_json::to_value(other) {
            Ok(value) => Content::Structured(value),
            Err(e) => Content::Text(format!("{}", e)),
        },
    }
}
