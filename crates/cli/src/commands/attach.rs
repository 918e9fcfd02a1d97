//! Normalize a single file into a report step

use std::path::PathBuf;

use clap::Args;
use report_extras::{ExtrasConfig, ReportSession};
use serde::Serialize;
use tracing::info;

use crate::output::{self, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct AttachArgs {
    /// File to attach
    #[arg(required = true)]
    pub file: PathBuf,

    /// Mime string or extension; the file becomes a download when omitted
    #[arg(long)]
    pub mime: Option<String>,

    /// Step comment
    #[arg(long, default_value = "")]
    pub comment: String,

    /// Indent of JSON, XML and YAML documents
    #[arg(long)]
    pub indent: Option<usize>,

    /// CSV delimiter
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Embed media as data URIs
    #[arg(long)]
    pub single_page: bool,

    /// Report folder receiving saved assets
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct AttachOutput {
    pub file: String,
    pub mime: Option<String>,
    pub multimedia: Option<String>,
    pub html: String,
}

impl TableDisplay for AttachOutput {
    fn headers() -> Vec<&'static str> {
        vec!["File", "Mime", "Media", "HTML"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.file.clone(),
            self.mime.clone().unwrap_or_else(|| "download".to_string()),
            self.multimedia.clone().unwrap_or_else(|| "-".to_string()),
            self.html.clone(),
        ]
    }
}

pub fn execute(args: AttachArgs, mut config: ExtrasConfig, format: OutputFormat) -> anyhow::Result<()> {
    if let Some(indent) = args.indent {
        config.indent = indent;
    }
    if let Some(delimiter) = args.delimiter {
        config.csv_delimiter = delimiter;
    }
    if let Some(report_dir) = args.report_dir {
        config.report_dir = report_dir;
    }
    config.single_page |= args.single_page;

    let session = ReportSession::open(config)?;
    let mut report = session.test_report();
    report.attach_file(&args.comment, &args.file, args.mime.as_deref(), false);
    session.finish()?;

    let Some(step) = report.steps().last() else {
        anyhow::bail!("no step recorded for {}", args.file.display());
    };
    info!("Attached {}", args.file.display());

    let single_page = session.config().single_page;
    let out = AttachOutput {
        file: args.file.display().to_string(),
        mime: step
            .attachment
            .as_ref()
            .and_then(|a| a.mime())
            .map(|m| m.to_string()),
        multimedia: step.multimedia.clone(),
        html: step.render(single_page),
    };

    match format {
        OutputFormat::Plain => println!("{}", out.html),
        _ => output::print_item(&out, format)?,
    }
    Ok(())
}
