//! # Theme Packager
//!
//! Turns a theme's design tokens and block tree into a concrete artifact
//! set (templates, stylesheet, scripts, manifest, preview image) and
//! delivers it through one of two sinks:
//!
//! - **install**: writes into a uniquely named directory under the theme
//!   catalog root and registers a catalog entry as the very last step.
//!   Name collisions fail fast before any write; a failure after partial
//!   writes triggers best-effort cleanup of everything written so far.
//! - **export**: writes the identical artifact set into an in-memory zip
//!   archive, with the manifest extended to restate the full settings and
//!   block tree so the archive is self-sufficient for later re-import.
//!
//! Generation is synchronous, deterministic and free of I/O; the sink
//! write is the only suspend point.

mod manifest;
mod packager;
mod scripts;
mod sink;

pub use manifest::Manifest;
pub use packager::{
    build_artifacts, export, install, write_artifacts, ArtifactFile, PackageError, ThemeArtifacts,
};
pub use scripts::{script_bundle, ScriptFile};
pub use sink::{DirectorySink, ZipSink};
