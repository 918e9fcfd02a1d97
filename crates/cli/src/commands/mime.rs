//! Mime hint resolution

use clap::Args;
use colored::Colorize;
use report_extras::mime;
use serde::Serialize;

use crate::output::{self, OutputFormat, TableDisplay};

#[derive(Args)]
pub struct MimeArgs {
    /// Mime strings or bare extensions to resolve
    #[arg(required = true)]
    pub values: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MimeRow {
    pub input: String,
    pub resolved: Option<String>,
    pub supported: bool,
    pub kind: &'static str,
    pub extension: Option<String>,
}

impl MimeRow {
    pub fn resolve(input: &str) -> Self {
        let resolved = mime::resolve(input);
        let kind = match &resolved {
            Some(m) if m.is_image() => "image",
            Some(m) if m.is_video() => "video",
            Some(m) if m.is_audio() => "audio",
            Some(_) => "document",
            None => "-",
        };
        Self {
            input: input.to_string(),
            supported: mime::is_supported(resolved.as_ref()),
            extension: resolved.as_ref().and_then(|m| m.extension()),
            resolved: resolved.map(|m| m.to_string()),
            kind,
        }
    }
}

impl TableDisplay for MimeRow {
    fn headers() -> Vec<&'static str> {
        vec!["Input", "Mime", "Supported", "Kind", "Extension"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.input.clone(),
            self.resolved.clone().unwrap_or_else(|| "-".to_string()),
            if self.supported {
                "yes".green().to_string()
            } else {
                "no".yellow().to_string()
            },
            self.kind.to_string(),
            self.extension.clone().unwrap_or_else(|| "-".to_string()),
        ]
    }
}

pub fn execute(args: MimeArgs, format: OutputFormat) -> anyhow::Result<()> {
    let rows: Vec<MimeRow> = args.values.iter().map(|v| MimeRow::resolve(v)).collect();
    output::print_list(&rows, format)
}
