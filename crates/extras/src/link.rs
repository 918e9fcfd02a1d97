//! Links shown in the test header

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decorators::{escape_html, escape_html_quoted};
use crate::error::ExtrasError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Link,
    Issue,
    Tms,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::Link => "link",
            LinkKind::Issue => "issue",
            LinkKind::Tms => "tms",
        }
    }

    /// HTML entity used when no icon is given
    pub fn default_icon(&self) -> &'static str {
        match self {
            LinkKind::Link => "&#127758;",
            LinkKind::Issue => "&#128030;",
            LinkKind::Tms => "&#128221;",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub label: String,
    pub kind: LinkKind,
    pub icon: String,
}

impl Link {
    /// Link of `kind` with its default icon; the label defaults to the url
    pub fn new(url: impl Into<String>, label: Option<&str>, kind: LinkKind) -> Self {
        let url = url.into();
        Self {
            label: label.filter(|l| !l.is_empty()).unwrap_or(&url).to_string(),
            url,
            kind,
            icon: kind.default_icon().to_string(),
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn render(&self) -> String {
        format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{} {}</a>"#,
            escape_html_quoted(&self.url),
            self.icon,
            escape_html(&self.label)
        )
    }
}

/// URL patterns for issue and test case keys, `{}` standing for the key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPatterns {
    pub issue: Option<String>,
    pub tms: Option<String>,
}

impl LinkPatterns {
    /// One link per comma-separated key; nothing when no pattern is set
    pub fn expand(&self, keys: &str, kind: LinkKind) -> Vec<Link> {
        let pattern = match kind {
            LinkKind::Issue => self.issue.as_deref(),
            LinkKind::Tms => self.tms.as_deref(),
            LinkKind::Link => None,
        };
        let Some(pattern) = pattern else {
            return Vec::new();
        };
        keys.split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| Link::new(pattern.replace("{}", key), Some(key), kind))
            .collect()
    }
}

/// Which links the header shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinksColumn {
    #[default]
    All,
    Issue,
    Tms,
    Link,
    None,
}

impl LinksColumn {
    pub fn shows(&self, kind: LinkKind) -> bool {
        match self {
            LinksColumn::All => true,
            LinksColumn::None => false,
            LinksColumn::Issue => kind == LinkKind::Issue,
            LinksColumn::Tms => kind == LinkKind::Tms,
            LinksColumn::Link => kind == LinkKind::Link,
        }
    }
}

impl FromStr for LinksColumn {
    type Err = ExtrasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(LinksColumn::All),
            "issue" => Ok(LinksColumn::Issue),
            "tms" => Ok(LinksColumn::Tms),
            "link" => Ok(LinksColumn::Link),
            "none" => Ok(LinksColumn::None),
            other => Err(ExtrasError::InvalidConfig(format!("unknown links column '{}'", other))),
        }
    }
}
