//! Declarative YAML report specification
//!
//! A report spec describes one test: its outcome and the steps it recorded.
//! Relative file paths are resolved against the folder of the spec file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use report_extras::{ExceptionInfo, Status, TestHeader};
use serde::{Deserialize, Serialize};

/// A test report parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSpec {
    /// Name of the test
    pub name: String,

    #[serde(default)]
    pub status: Status,

    #[serde(default)]
    pub reason: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub parameters: Vec<(String, String)>,

    #[serde(default)]
    pub exception: Option<ExceptionInfo>,

    /// Plain links
    #[serde(default)]
    pub links: Vec<LinkSpec>,

    /// Comma-separated issue keys
    #[serde(default)]
    pub issues: Option<String>,

    /// Comma-separated test case keys
    #[serde(default)]
    pub tms: Option<String>,

    /// Steps in recording order
    #[serde(default)]
    pub steps: Vec<StepSpec>,

    /// Screenshot taken when the test ended
    #[serde(default)]
    pub final_screenshot: Option<PathBuf>,

    /// Folder relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A single recorded step
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepSpec {
    /// Inline content or the content of a file
    Attach {
        comment: String,
        #[serde(default)]
        body: Option<serde_yaml::Value>,
        #[serde(default)]
        file: Option<PathBuf>,
        #[serde(default)]
        mime: Option<String>,
        #[serde(default)]
        escape: bool,
    },

    /// PNG screenshot, optionally with the page source
    Screenshot {
        comment: String,
        file: PathBuf,
        #[serde(default)]
        page_source: Option<PathBuf>,
        #[serde(default)]
        escape: bool,
    },

    /// Video clip
    Video {
        comment: String,
        file: PathBuf,
        #[serde(default = "default_video_mime")]
        mime: String,
    },
}

fn default_video_mime() -> String {
    "video/mp4".to_string()
}

impl ReportSpec {
    /// Parse a report spec from YAML string
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a report spec from a YAML file
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading report spec {}", path.display()))?;
        let mut spec = Self::from_yaml(&content)
            .with_context(|| format!("parsing report spec {}", path.display()))?;
        spec.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(spec)
    }

    /// Resolve `path` against the spec folder
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn header(&self) -> TestHeader {
        TestHeader {
            status: self.status,
            reason: self.reason.clone(),
            description: self.description.clone(),
            parameters: self.parameters.clone(),
            exception: self.exception.clone(),
            links: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_spec() {
        let yaml = r#"
name: login-flow
status: failed
description: Logs in with a TOTP code
issues: BUG-1, BUG-2
links:
  - url: https://docs.example.com
    name: Docs
steps:
  - action: screenshot
    comment: Login form
    file: login.png
    page_source: login.html
  - action: attach
    comment: Response
    body:
      user: alice
      roles: [admin]
    mime: json
  - action: attach
    comment: Log
    file: out/run.log
  - action: video
    comment: Recording
    file: run.webm
    mime: video/webm
final_screenshot: last.png
"#;
        let spec = ReportSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.name, "login-flow");
        assert_eq!(spec.status, Status::Failed);
        assert_eq!(spec.steps.len(), 4);
        assert!(matches!(&spec.steps[1], StepSpec::Attach { body: Some(_), .. }));
        assert!(matches!(&spec.steps[3], StepSpec::Video { mime, .. } if mime == "video/webm"));
        assert_eq!(spec.header().description.as_deref(), Some("Logs in with a TOTP code"));
    }

    #[test]
    fn test_defaults() {
        let spec = ReportSpec::from_yaml("name: bare\n").unwrap();
        assert_eq!(spec.status, Status::Unknown);
        assert!(spec.steps.is_empty());
        assert!(spec.final_screenshot.is_none());
    }

    #[test]
    fn test_resolve_relative_to_spec() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("report.yaml");
        std::fs::write(&path, "name: t\n").unwrap();
        let spec = ReportSpec::from_file(&path).unwrap();
        assert_eq!(spec.resolve(Path::new("a.png")), tmp.path().join("a.png"));
        assert_eq!(spec.resolve(Path::new("/abs/a.png")), PathBuf::from("/abs/a.png"));
    }

    #[test]
    fn test_unknown_action_rejected() {
        let yaml = "name: t\nsteps:\n  - action: click\n    selector: '#go'\n";
        assert!(ReportSpec::from_yaml(yaml).is_err());
    }
}
