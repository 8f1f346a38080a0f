use anyhow::{Context, Result};
use blockpress_model::{CatalogEntry, MemoryCatalog, ThemeCatalog};
use blockpress_packager::Manifest;
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Args)]
pub struct InstallArgs {
    /// Theme definition file (JSON)
    pub theme: PathBuf,

    /// Theme catalog root directory
    #[arg(short = 'd', long, default_value = "./themes")]
    pub themes_dir: PathBuf,
}

/// Rebuild the catalog from manifests already on disk, so repeated CLI
/// runs detect slug collisions the same way a long-lived server would.
fn scan_catalog(themes_root: &Path) -> Result<MemoryCatalog> {
    let catalog = MemoryCatalog::new();
    if !themes_root.exists() {
        return Ok(catalog);
    }

    for entry in std::fs::read_dir(themes_root)
        .with_context(|| format!("cannot read themes directory {}", themes_root.display()))?
    {
        let path = entry?.path();
        let manifest_path = path.join("manifest.json");
        if !manifest_path.is_file() {
            continue;
        }
        let manifest: Manifest = serde_json::from_slice(&std::fs::read(&manifest_path)?)
            .with_context(|| format!("corrupt manifest at {}", manifest_path.display()))?;
        debug!(slug = %manifest.slug, "found installed theme");
        catalog.register(CatalogEntry {
            slug: manifest.slug,
            name: manifest.name,
            version: manifest.version,
            location: path,
        })?;
    }
    Ok(catalog)
}

pub fn install(args: InstallArgs) -> Result<()> {
    let theme = super::load_theme(&args.theme)?;
    let catalog = scan_catalog(&args.themes_dir)?;

    println!(
        "{}",
        format!("📦 Installing '{}'...", theme.name).bright_blue().bold()
    );

    std::fs::create_dir_all(&args.themes_dir)?;
    let entry = blockpress_packager::install(&theme, &catalog, &args.themes_dir)?;

    println!(
        "{} Installed {} v{} → {}",
        "✅".green(),
        entry.name.bold(),
        entry.version,
        entry.location.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_rebuilds_catalog_from_manifests() {
        let tmp = tempfile::tempdir().unwrap();
        let aurora = tmp.path().join("aurora");
        std::fs::create_dir(&aurora).unwrap();
        std::fs::write(
            aurora.join("manifest.json"),
            br#"{
                "name": "Aurora",
                "slug": "aurora",
                "version": "1.0.0",
                "description": "",
                "templates": [],
                "stylesheet": "style.css",
                "scripts": [],
                "preview": "preview.svg"
            }"#,
        )
        .unwrap();
        // A stray directory without a manifest is ignored.
        std::fs::create_dir(tmp.path().join("scratch")).unwrap();

        let catalog = scan_catalog(tmp.path()).unwrap();
        assert!(catalog.contains("aurora"));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("aurora").unwrap().location, aurora);
    }

    #[test]
    fn scan_of_missing_root_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = scan_catalog(&tmp.path().join("nope")).unwrap();
        assert!(catalog.is_empty());
    }
}
