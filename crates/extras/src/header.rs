//! Test header: status, description, parameters, exception and links

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decorators::escape_html;
use crate::error::ExtrasError;
use crate::link::{Link, LinksColumn};

/// Outcome of a test
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Passed,
    Failed,
    Skipped,
    Xfailed,
    Xpassed,
    Error,
    #[default]
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Passed => "passed",
            Status::Failed => "failed",
            Status::Skipped => "skipped",
            Status::Xfailed => "xfailed",
            Status::Xpassed => "xpassed",
            Status::Error => "error",
            Status::Unknown => "unknown",
        }
    }

    /// Anything but a plain pass
    pub fn is_failure(&self) -> bool {
        matches!(self, Status::Failed | Status::Xfailed | Status::Xpassed | Status::Skipped)
    }

    /// CSS classes of the final screenshot comment
    pub fn comment_class(&self) -> String {
        format!("extras_font extras_color_{}", self.as_str())
    }

    fn title(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ExtrasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passed" => Ok(Status::Passed),
            "failed" => Ok(Status::Failed),
            "skipped" => Ok(Status::Skipped),
            "xfailed" => Ok(Status::Xfailed),
            "xpassed" => Ok(Status::Xpassed),
            "error" => Ok(Status::Error),
            "unknown" => Ok(Status::Unknown),
            other => Err(ExtrasError::InvalidConfig(format!("unknown status '{}'", other))),
        }
    }
}

/// Exception raised by a test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExceptionInfo {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestHeader {
    pub status: Status,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<(String, String)>,
    #[serde(default)]
    pub exception: Option<ExceptionInfo>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl TestHeader {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// Rows of the header table, without the enclosing table
    pub fn render_rows(&self, links_column: LinksColumn) -> String {
        let mut rows = String::new();

        let reason = match self.reason.as_deref().filter(|r| !r.is_empty()) {
            Some(reason) => format!("Reason: {}", escape_html(reason)),
            None => String::new(),
        };
        rows.push_str(&format!(
            r#"<tr><td style="border: 0px"><span class="extras_status extras_status_{}">{}</span></td><td class="extras_header_middle" style="border: 0px"></td><td style="border: 0px" class="extras_status_reason">{}</td></tr>"#,
            self.status,
            self.status.title(),
            reason
        ));

        if let Some(description) = self.description.as_deref() {
            let description = escape_html(description).trim().replace('\n', "<br>");
            rows.push_str(&row(
                "Description",
                &format!(r#"<pre class="extras_description extras_code">{}</pre>"#, description),
            ));
        }

        if !self.parameters.is_empty() {
            let content: String = self
                .parameters
                .iter()
                .map(|(key, value)| {
                    format!(
                        r#"<span class="extras_params_key">{}</span><span class="extras_params_value">: {}</span><br>"#,
                        escape_html(key),
                        escape_html(value)
                    )
                })
                .collect();
            rows.push_str(&row("Parameters", &content));
        }

        if let Some(exception) = &self.exception {
            rows.push_str(&row(
                "Exception",
                &format!(
                    r#"<pre class="extras_code">{}</pre><br><pre class="extras_code">{}</pre>"#,
                    escape_html(&exception.kind),
                    escape_html(&exception.message)
                ),
            ));
        }

        let links: Vec<String> = self
            .links
            .iter()
            .filter(|link| links_column.shows(link.kind))
            .map(Link::render)
            .collect();
        if !links.is_empty() {
            rows.push_str(&row("Links", &links.join("<br>")));
        }

        rows
    }

    pub fn render(&self, links_column: LinksColumn) -> String {
        format!(r#"<table class="extras_header">{}</table>"#, self.render_rows(links_column))
    }
}

fn row(title: &str, content: &str) -> String {
    format!(
        r#"<tr><td style="border: 0px"><span class="extras_title">{}</span></td><td class="extras_header_middle" style="border: 0px"></td><td style="border: 0px">{}</td></tr>"#,
        title, content
    )
}

/// Row separating the header from the steps table
pub(crate) fn execution_row() -> String {
    row("Execution", "").replacen("<tr>", r#"<tr class="visibility_execution">"#, 1)
}
