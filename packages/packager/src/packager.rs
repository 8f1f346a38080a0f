//! Artifact generation and the two packaging modes.

use crate::manifest::Manifest;
use crate::scripts::script_bundle;
use crate::sink::{DirectorySink, ZipSink};
use blockpress_common::{slugify, ArtifactSink, CoreError};
use blockpress_model::{CatalogEntry, Theme, ThemeCatalog};
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("Theme slug '{0}' already exists in the catalog")]
    Conflict(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Manifest serialization error: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// One generated artifact, path relative to the package root.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactFile {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// The complete in-memory artifact set. Both packaging modes derive their
/// output from this; they differ only in the sink.
#[derive(Debug, Clone)]
pub struct ThemeArtifacts {
    pub manifest: Manifest,
    pub files: Vec<ArtifactFile>,
}

fn text(path: impl Into<String>, contents: String) -> ArtifactFile {
    ArtifactFile {
        path: path.into(),
        bytes: contents.into_bytes(),
    }
}

/// Deterministic placeholder preview: theme name over token swatches.
fn preview_svg(theme: &Theme) -> String {
    let colors = &theme.settings.colors;
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="640" height="360" viewBox="0 0 640 360">
<rect width="640" height="360" fill="{}"/>
<rect x="0" y="0" width="640" height="120" fill="{}"/>
<rect x="40" y="180" width="120" height="60" fill="{}"/>
<rect x="180" y="180" width="120" height="60" fill="{}"/>
<text x="40" y="80" font-family="sans-serif" font-size="36" fill="#ffffff">{}</text>
</svg>
"##,
        colors.background,
        colors.primary,
        colors.secondary,
        colors.accent,
        xml_escape(&theme.name)
    )
}

// Keep the preview well-formed XML.
fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Generate the full artifact set for a theme. Pure: no I/O.
///
/// `include_source` extends the manifest with the settings and block tree
/// (export mode) so the result can be re-imported.
pub fn build_artifacts(theme: &Theme, include_source: bool) -> Result<ThemeArtifacts, PackageError> {
    theme.validate()?;

    let slug = slugify(&theme.name);
    let mut files = Vec::new();

    files.push(text(
        "style.css",
        blockpress_stylesheet::generate(&theme.settings, theme.custom_css.as_deref()),
    ));

    let scripts = script_bundle();
    for script in &scripts {
        files.push(text(
            format!("scripts/{}", script.name),
            script.contents.to_string(),
        ));
    }

    files.push(text(
        "templates/header.html",
        blockpress_assembler::header_template(theme),
    ));
    files.push(text(
        "templates/footer.html",
        blockpress_assembler::footer_template(theme),
    ));

    let page_templates = blockpress_assembler::assemble_theme(theme);
    let template_names: Vec<String> = page_templates.iter().map(|t| t.name.clone()).collect();
    for template in page_templates {
        files.push(text(format!("templates/{}", template.name), template.contents));
    }
    for template in blockpress_assembler::system_templates(&theme.settings) {
        files.push(text(format!("templates/{}", template.name), template.contents));
    }

    files.push(text("preview.svg", preview_svg(theme)));

    let script_names = scripts.iter().map(|s| s.name.to_string()).collect();
    let mut manifest = Manifest::new(theme, slug, template_names, script_names);
    if include_source {
        manifest = manifest.with_source(theme);
    }

    Ok(ThemeArtifacts { manifest, files })
}

/// Write an artifact set through a sink, manifest first.
pub fn write_artifacts(
    artifacts: &ThemeArtifacts,
    sink: &mut dyn ArtifactSink,
) -> Result<(), PackageError> {
    sink.write("manifest.json", &artifacts.manifest.to_json()?)?;
    for file in &artifacts.files {
        sink.write(&file.path, &file.bytes)?;
    }
    Ok(())
}

/// Install a theme into the catalog directory and register it.
///
/// The catalog registration is the last step, so a failure never leaves a
/// catalog entry pointing at incomplete artifacts. Any failure after
/// partial writes rolls the written files back before the error surfaces.
pub fn install(
    theme: &Theme,
    catalog: &dyn ThemeCatalog,
    themes_root: &Path,
) -> Result<CatalogEntry, PackageError> {
    let slug = slugify(&theme.name);
    if catalog.contains(&slug) {
        return Err(PackageError::Conflict(slug));
    }

    let artifacts = build_artifacts(theme, false)?;

    let location = themes_root.join(&slug);
    let mut sink = match DirectorySink::create(&location) {
        Ok(sink) => sink,
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists => {
            return Err(PackageError::Conflict(slug));
        }
        Err(error) => return Err(error.into()),
    };

    if let Err(error) = write_artifacts(&artifacts, &mut sink) {
        sink.rollback();
        return Err(error);
    }

    let entry = CatalogEntry {
        slug: slug.clone(),
        name: theme.name.clone(),
        version: artifacts.manifest.version.clone(),
        location: location.clone(),
    };
    if let Err(error) = catalog.register(entry.clone()) {
        sink.rollback();
        return Err(match error {
            CoreError::Conflict(slug) => PackageError::Conflict(slug),
            other => other.into(),
        });
    }

    info!(%slug, location = %location.display(), "installed theme");
    Ok(entry)
}

/// Export a theme as a portable, self-sufficient archive.
pub fn export(theme: &Theme) -> Result<Vec<u8>, PackageError> {
    let artifacts = build_artifacts(theme, true)?;

    let mut sink = ZipSink::new();
    write_artifacts(&artifacts, &mut sink)?;
    let bytes = sink.finish()?;

    info!(
        theme = %theme.name,
        bytes = bytes.len(),
        "exported theme archive"
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpress_model::{Block, BlockType, MemoryCatalog, Page, Settings};
    use serde_json::json;
    use std::io::{Cursor, Read};

    fn aurora() -> Theme {
        let hero = Block::new("b1", "p1", BlockType::Hero).with_prop("title", json!("Welcome"));
        let features = Block::new("b2", "p1", BlockType::Features)
            .with_order(1)
            .with_prop(
                "items",
                json!([
                    { "title": "Fast", "description": "" },
                    { "title": "Safe", "description": "" },
                    { "title": "Open", "description": "" }
                ]),
            );
        Theme {
            id: "t1".to_string(),
            name: "Aurora".to_string(),
            slug: "aurora".to_string(),
            settings: Settings::default(),
            custom_css: None,
            pages: vec![Page {
                id: "p1".to_string(),
                name: "Home".to_string(),
                slug: "home".to_string(),
                is_home_page: true,
                blocks: vec![hero, features],
            }],
            is_active: false,
            is_default: false,
            owner_id: None,
        }
    }

    fn read_entry(archive_bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes.to_vec())).unwrap();
        let mut contents = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        contents
    }

    #[test]
    fn export_archive_matches_scenario() {
        let theme = aurora();
        let bytes = export(&theme).unwrap();

        let manifest: Manifest =
            serde_json::from_str(&read_entry(&bytes, "manifest.json")).unwrap();
        assert_eq!(manifest.templates, vec!["index.html"]);
        assert_eq!(manifest.slug, "aurora");

        let css = read_entry(&bytes, "style.css");
        assert!(css.contains(&format!(
            "--color-primary: {};",
            theme.settings.colors.primary
        )));

        let index = read_entry(&bytes, "templates/index.html");
        assert!(index.contains("<h1>Welcome</h1>"));
        assert_eq!(index.matches("class=\"card feature\"").count(), 3);
    }

    #[test]
    fn export_manifest_is_self_sufficient() {
        let bytes = export(&aurora()).unwrap();
        let manifest: Manifest =
            serde_json::from_str(&read_entry(&bytes, "manifest.json")).unwrap();

        let pages = manifest.pages.expect("export restates pages");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].blocks.len(), 2);
        assert!(manifest.settings.is_some());
    }

    #[test]
    fn manifest_is_written_first() {
        let artifacts = build_artifacts(&aurora(), false).unwrap();
        let mut sink = blockpress_common::MemorySink::new();
        write_artifacts(&artifacts, &mut sink).unwrap();

        let paths = sink.paths();
        assert_eq!(paths[0], "manifest.json");
        assert!(paths.contains(&"style.css"));
        assert!(paths.contains(&"templates/index.html"));
        assert!(paths.contains(&"templates/login.html"));
        assert!(paths.contains(&"scripts/auth.js"));
        assert!(paths.contains(&"preview.svg"));
    }

    #[test]
    fn preview_swatches_tokens_and_escapes_the_name() {
        let mut theme = aurora();
        theme.name = "Bits & <Bobs>".to_string();

        let svg = preview_svg(&theme);
        assert!(svg.contains(&format!("fill=\"{}\"", theme.settings.colors.primary)));
        assert!(svg.contains("fill=\"#ffffff\">Bits &amp; &lt;Bobs&gt;</text>"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn export_is_deterministic() {
        let theme = aurora();
        assert_eq!(export(&theme).unwrap(), export(&theme).unwrap());
    }

    #[test]
    fn install_writes_artifacts_and_registers_last() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = MemoryCatalog::new();

        let entry = install(&aurora(), &catalog, tmp.path()).unwrap();
        assert_eq!(entry.slug, "aurora");
        assert!(catalog.contains("aurora"));
        assert!(tmp.path().join("aurora/manifest.json").exists());
        assert!(tmp.path().join("aurora/templates/index.html").exists());
        assert!(tmp.path().join("aurora/scripts/cart.js").exists());
        assert!(tmp.path().join("aurora/preview.svg").exists());

        // Install manifest carries no source payload.
        let manifest: Manifest = serde_json::from_slice(
            &std::fs::read(tmp.path().join("aurora/manifest.json")).unwrap(),
        )
        .unwrap();
        assert!(manifest.settings.is_none());
    }

    #[test]
    fn colliding_slugs_fail_fast_and_leave_state_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = MemoryCatalog::new();
        install(&aurora(), &catalog, tmp.path()).unwrap();

        // Different display name, same normalized slug.
        let mut clone = aurora();
        clone.name = "  AURORA  ".to_string();

        let err = install(&clone, &catalog, tmp.path()).unwrap_err();
        assert!(matches!(err, PackageError::Conflict(slug) if slug == "aurora"));

        assert_eq!(catalog.len(), 1);
        let dirs: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(dirs.len(), 1, "no partial second install may remain");
    }

    #[test]
    fn invalid_theme_fails_before_any_write() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = MemoryCatalog::new();

        let mut theme = aurora();
        theme.name = "".to_string();

        assert!(install(&theme, &catalog, tmp.path()).is_err());
        assert!(catalog.is_empty());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
