//! Theme, page and design-token types.

use crate::block::Block;
use blockpress_common::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Color tokens. Every field becomes one `--color-*` CSS variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Colors {
    pub primary: String,
    pub secondary: String,
    pub accent: String,
    pub background: String,
    pub surface: String,
    pub text: String,
    pub text_muted: String,
    pub border: String,
    pub success: String,
    pub warning: String,
    pub error: String,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            primary: "#3366ff".to_string(),
            secondary: "#1f2937".to_string(),
            accent: "#f59e0b".to_string(),
            background: "#ffffff".to_string(),
            surface: "#f9fafb".to_string(),
            text: "#111827".to_string(),
            text_muted: "#6b7280".to_string(),
            border: "#e5e7eb".to_string(),
            success: "#10b981".to_string(),
            warning: "#f59e0b".to_string(),
            error: "#ef4444".to_string(),
        }
    }
}

/// Typography tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Typography {
    pub font_family: String,
    pub heading_font_family: String,
    /// Base font size in px.
    pub base_size: f64,
    pub line_height: f64,
    /// Modular scale ratio for the heading size ladder.
    pub scale_ratio: f64,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: "'Inter', system-ui, sans-serif".to_string(),
            heading_font_family: "'Inter', system-ui, sans-serif".to_string(),
            base_size: 16.0,
            line_height: 1.6,
            scale_ratio: 1.25,
        }
    }
}

/// Layout tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Layout {
    pub max_width: String,
    pub gutter: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            max_width: "1200px".to_string(),
            gutter: "24px".to_string(),
        }
    }
}

/// Spacing tokens. The generator derives an xs..xl ladder from `base_unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Spacing {
    /// Base spacing unit in px.
    pub base_unit: f64,
    /// Vertical padding applied to each page section, in px.
    pub section: f64,
}

impl Default for Spacing {
    fn default() -> Self {
        Self {
            base_unit: 8.0,
            section: 64.0,
        }
    }
}

/// Border tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Borders {
    /// Corner radius in px.
    pub radius: f64,
    /// Border width in px.
    pub width: f64,
}

impl Default for Borders {
    fn default() -> Self {
        Self {
            radius: 8.0,
            width: 1.0,
        }
    }
}

/// Selectable semantics for settings updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Recursively merge objects; scalars and arrays in the patch replace.
    Deep,
    /// Discard current settings and take the patch wholesale.
    Replace,
}

/// The full design-token set for a theme.
///
/// `components`, `dark_mode` and `responsive` are free-form override maps
/// consumed opaquely by the stylesheet generator's custom layer; the core
/// validates only that they are JSON objects when present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub colors: Colors,
    pub typography: Typography,
    pub layout: Layout,
    pub spacing: Spacing,
    pub borders: Borders,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsive: Option<Value>,
}

impl Settings {
    /// Apply a JSON patch with the requested merge semantics.
    pub fn apply(&mut self, patch: Value, mode: MergeMode) -> Result<(), CoreError> {
        if !patch.is_object() {
            return Err(CoreError::validation("settings patch must be an object"));
        }
        match mode {
            MergeMode::Replace => {
                *self = serde_json::from_value(patch)
                    .map_err(|e| CoreError::validation(format!("invalid settings: {e}")))?;
            }
            MergeMode::Deep => {
                let mut current = serde_json::to_value(&*self)
                    .map_err(|e| CoreError::validation(e.to_string()))?;
                deep_merge(&mut current, &patch);
                *self = serde_json::from_value(current)
                    .map_err(|e| CoreError::validation(format!("invalid settings: {e}")))?;
            }
        }
        Ok(())
    }
}

/// Recursive object merge; non-object patch values replace wholesale.
fn deep_merge(current: &mut Value, patch: &Value) {
    match (current, patch) {
        (Value::Object(cur), Value::Object(pat)) => {
            for (key, value) in pat {
                match cur.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        cur.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (current, patch) => *current = patch.clone(),
    }
}

/// One routable page of a theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub is_home_page: bool,
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Page {
    /// Top-level blocks (no parent), sorted by order.
    pub fn top_level_blocks(&self) -> Vec<&Block> {
        let mut blocks: Vec<&Block> = self
            .blocks
            .iter()
            .filter(|b| b.parent_id.is_none())
            .collect();
        blocks.sort_by_key(|b| b.order);
        blocks
    }

    /// Children of a container block, sorted by order.
    pub fn children_of(&self, parent_id: &str) -> Vec<&Block> {
        let mut blocks: Vec<&Block> = self
            .blocks
            .iter()
            .filter(|b| b.parent_id.as_deref() == Some(parent_id))
            .collect();
        blocks.sort_by_key(|b| b.order);
        blocks
    }
}

/// A complete theme: identity, design tokens, pages and flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

impl Theme {
    /// Structural validation of the data the core was handed.
    ///
    /// Active/default exclusivity across themes is enforced by the theme
    /// CRUD layer; within a single theme we check name, home-page and
    /// page-slug invariants plus parent references.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.trim().is_empty() {
            return Err(CoreError::validation("theme name must not be empty"));
        }

        let home_pages = self.pages.iter().filter(|p| p.is_home_page).count();
        if home_pages > 1 {
            return Err(CoreError::validation(format!(
                "theme '{}' has {} home pages, at most one allowed",
                self.name, home_pages
            )));
        }

        let mut seen_slugs = std::collections::HashSet::new();
        for page in &self.pages {
            if page.slug.trim().is_empty() {
                return Err(CoreError::validation(format!(
                    "page '{}' has an empty slug",
                    page.name
                )));
            }
            if !seen_slugs.insert(page.slug.as_str()) {
                return Err(CoreError::validation(format!(
                    "duplicate page slug '{}'",
                    page.slug
                )));
            }

            for block in &page.blocks {
                if let Some(parent_id) = &block.parent_id {
                    if !page.blocks.iter().any(|b| &b.id == parent_id) {
                        return Err(CoreError::validation(format!(
                            "block '{}' references unknown parent '{}'",
                            block.id, parent_id
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// The page flagged as home, if any.
    pub fn home_page(&self) -> Option<&Page> {
        self.pages.iter().find(|p| p.is_home_page)
    }
}
