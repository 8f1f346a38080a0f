//! Packaged-theme manifest.

use blockpress_model::{Page, Settings, Theme};
use serde::{Deserialize, Serialize};

/// Manifest written at the root of every packaged theme.
///
/// `settings` and `pages` are only populated in export mode, making the
/// archive self-sufficient for later re-import. No timestamps are recorded:
/// packaging the same theme twice yields byte-identical artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub name: String,
    pub slug: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Page template file names, in page order.
    pub templates: Vec<String>,
    pub stylesheet: String,
    pub scripts: Vec<String>,
    pub preview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<Page>>,
}

impl Manifest {
    pub fn new(theme: &Theme, slug: String, templates: Vec<String>, scripts: Vec<String>) -> Self {
        Self {
            name: theme.name.clone(),
            slug,
            version: "1.0.0".to_string(),
            author: theme.owner_id.clone(),
            description: format!("Theme '{}' packaged by blockpress", theme.name),
            templates,
            stylesheet: "style.css".to_string(),
            scripts,
            preview: "preview.svg".to_string(),
            settings: None,
            pages: None,
        }
    }

    /// Extend with the full design tokens and block tree (export mode).
    pub fn with_source(mut self, theme: &Theme) -> Self {
        self.settings = Some(theme.settings.clone());
        self.pages = Some(theme.pages.clone());
        self
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}
