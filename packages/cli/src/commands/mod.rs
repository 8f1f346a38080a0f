mod check;
mod export;
mod install;

pub use check::{check, CheckArgs};
pub use export::{export, ExportArgs};
pub use install::{install, InstallArgs};

use anyhow::{Context, Result};
use blockpress_model::Theme;
use std::path::Path;

/// Load and parse a theme definition file.
pub(crate) fn load_theme(path: &Path) -> Result<Theme> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read theme file {}", path.display()))?;
    let theme: Theme = serde_json::from_str(&source)
        .with_context(|| format!("{} is not a valid theme definition", path.display()))?;
    Ok(theme)
}
