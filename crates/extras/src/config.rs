//! Report configuration

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ExtrasError, ExtrasResult};
use crate::link::{LinkPatterns, LinksColumn};
use crate::normalize::NormalizeOptions;

/// Prefix of environment variables overriding the configuration
pub const ENV_PREFIX: &str = "REPORT_EXTRAS_";

/// Which screenshots end up in the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotStrategy {
    /// Every screenshot taken by the test
    #[default]
    All,
    /// Only the final screenshot
    Last,
    /// Every screenshot, plus a final one on failure
    Fail,
    None,
}

impl ScreenshotStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenshotStrategy::All => "all",
            ScreenshotStrategy::Last => "last",
            ScreenshotStrategy::Fail => "fail",
            ScreenshotStrategy::None => "none",
        }
    }

    /// Whether screenshots taken during the test are kept
    pub fn keeps_intermediate(&self) -> bool {
        matches!(self, ScreenshotStrategy::All | ScreenshotStrategy::Fail)
    }
}

impl fmt::Display for ScreenshotStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScreenshotStrategy {
    type Err = ExtrasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ScreenshotStrategy::All),
            "last" => Ok(ScreenshotStrategy::Last),
            "fail" => Ok(ScreenshotStrategy::Fail),
            "none" => Ok(ScreenshotStrategy::None),
            other => Err(ExtrasError::InvalidConfig(format!("unknown screenshot strategy '{}'", other))),
        }
    }
}

/// Report configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrasConfig {
    /// Folder holding the report and its assets
    pub report_dir: PathBuf,

    /// Self-contained report with media embedded as data URIs
    pub single_page: bool,

    pub screenshots: ScreenshotStrategy,

    /// Save page sources next to screenshots
    pub sources: bool,

    /// Indent of JSON, XML and YAML attachments
    pub indent: usize,

    pub csv_delimiter: char,

    /// Issue URL pattern, `{}` standing for the key
    pub issue_link_pattern: Option<String>,

    /// Test case URL pattern, `{}` standing for the key
    pub tms_link_pattern: Option<String>,

    pub links_column: LinksColumn,

    pub title: String,
}

impl Default for ExtrasConfig {
    fn default() -> Self {
        Self {
            report_dir: PathBuf::from("report"),
            single_page: false,
            screenshots: ScreenshotStrategy::All,
            sources: false,
            indent: 4,
            csv_delimiter: ',',
            issue_link_pattern: None,
            tms_link_pattern: None,
            links_column: LinksColumn::All,
            title: "Test Report".to_string(),
        }
    }
}

impl ExtrasConfig {
    /// Load configuration from file, defaults when it does not exist
    pub fn load(path: &Path) -> ExtrasResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            debug!("Loaded configuration from {}", path.display());
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> ExtrasResult<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> ExtrasResult<()> {
        if self.indent == 0 {
            return Err(ExtrasError::InvalidConfig("indent must be a positive integer".to_string()));
        }
        if matches!(self.csv_delimiter, '"' | '\n' | '\r') {
            return Err(ExtrasError::InvalidConfig(format!(
                "{:?} cannot be used as CSV delimiter",
                self.csv_delimiter
            )));
        }
        Ok(())
    }

    /// Apply `REPORT_EXTRAS_*` environment variables
    pub fn apply_env(&mut self) -> ExtrasResult<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides looked up by variable name
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> ExtrasResult<()> {
        let var = |suffix: &str| lookup(&format!("{}{}", ENV_PREFIX, suffix));

        if let Some(indent) = var("INDENT") {
            self.indent = indent
                .trim()
                .parse()
                .map_err(|_| ExtrasError::InvalidConfig(format!("invalid indent '{}'", indent)))?;
        }
        if let Some(single_page) = var("SINGLE_PAGE") {
            self.single_page = match single_page.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => return Err(ExtrasError::InvalidConfig(format!("invalid single page flag '{}'", other))),
            };
        }
        if let Some(screenshots) = var("SCREENSHOTS") {
            self.screenshots = screenshots.parse()?;
        }
        self.validate()
    }

    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            indent: self.indent,
            csv_delimiter: self.csv_delimiter,
            single_page: self.single_page,
        }
    }

    pub fn link_patterns(&self) -> LinkPatterns {
        LinkPatterns {
            issue: self.issue_link_pattern.clone(),
            tms: self.tms_link_pattern.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = ExtrasConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config, ExtrasConfig::default());
        assert_eq!(config.indent, 4);
        assert_eq!(config.title, "Test Report");
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("extras.toml");
        let config = ExtrasConfig {
            single_page: true,
            screenshots: ScreenshotStrategy::Fail,
            csv_delimiter: ';',
            issue_link_pattern: Some("https://bugs/{}".into()),
            links_column: LinksColumn::Issue,
            ..ExtrasConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(ExtrasConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("extras.toml");
        std::fs::write(&path, "indent = 2\nscreenshots = \"last\"\n").unwrap();
        let config = ExtrasConfig::load(&path).unwrap();
        assert_eq!(config.indent, 2);
        assert_eq!(config.screenshots, ScreenshotStrategy::Last);
        assert_eq!(config.csv_delimiter, ',');
    }

    #[test]
    fn test_validate() {
        let zero = ExtrasConfig {
            indent: 0,
            ..ExtrasConfig::default()
        };
        assert!(matches!(zero.validate(), Err(ExtrasError::InvalidConfig(_))));
        let quote = ExtrasConfig {
            csv_delimiter: '"',
            ..ExtrasConfig::default()
        };
        assert!(quote.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("REPORT_EXTRAS_INDENT", "2"),
            ("REPORT_EXTRAS_SINGLE_PAGE", "true"),
            ("REPORT_EXTRAS_SCREENSHOTS", "none"),
        ]
        .into_iter()
        .collect();
        let mut config = ExtrasConfig::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.indent, 2);
        assert!(config.single_page);
        assert_eq!(config.screenshots, ScreenshotStrategy::None);
    }

    #[test]
    fn test_invalid_override() {
        let mut config = ExtrasConfig::default();
        let err = config.apply_overrides(|name| (name == "REPORT_EXTRAS_INDENT").then(|| "-1".to_string()));
        assert!(err.is_err());
    }
}
