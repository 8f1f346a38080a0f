//! Artifact sink implementations: theme-catalog directory and in-memory zip.

use blockpress_common::ArtifactSink;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use zip::write::{SimpleFileOptions, ZipWriter};

/// Writes artifacts under a directory, tracking every path it creates so a
/// failed install can be rolled back.
#[derive(Debug)]
pub struct DirectorySink {
    root: PathBuf,
    written_files: Vec<PathBuf>,
    created_dirs: Vec<PathBuf>,
}

impl DirectorySink {
    /// Create the sink and its root directory. Fails if the root already
    /// exists — install targets must be uniquely named.
    pub fn create(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        if root.exists() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("target directory already exists: {}", root.display()),
            ));
        }
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            created_dirs: vec![root.clone()],
            root,
            written_files: Vec::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Best-effort removal of everything this sink has written, deepest
    /// paths first. Errors are logged, not surfaced: rollback runs on a
    /// path that is already failing.
    pub fn rollback(&mut self) {
        for file in self.written_files.drain(..).rev() {
            if let Err(error) = std::fs::remove_file(&file) {
                warn!(path = %file.display(), %error, "rollback: could not remove file");
            }
        }
        for dir in self.created_dirs.drain(..).rev() {
            if let Err(error) = std::fs::remove_dir(&dir) {
                warn!(path = %dir.display(), %error, "rollback: could not remove directory");
            }
        }
    }
}

impl ArtifactSink for DirectorySink {
    fn write(&mut self, path: &str, bytes: &[u8]) -> io::Result<()> {
        let target = self.root.join(path);

        // Create intermediate directories, recording each new one.
        if let Some(parent) = target.parent() {
            let mut ancestors: Vec<PathBuf> = parent
                .ancestors()
                .take_while(|p| *p != self.root.as_path())
                .map(Path::to_path_buf)
                .collect();
            ancestors.reverse();
            for dir in ancestors {
                if !dir.exists() {
                    std::fs::create_dir(&dir)?;
                    self.created_dirs.push(dir);
                }
            }
        }

        std::fs::write(&target, bytes)?;
        self.written_files.push(target);
        debug!(path, bytes = bytes.len(), "wrote artifact");
        Ok(())
    }
}

/// Builds a zip archive in memory; nothing touches the filesystem.
pub struct ZipSink {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipSink {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Finish the archive and return its bytes.
    pub fn finish(self) -> Result<Vec<u8>, zip::result::ZipError> {
        Ok(self.writer.finish()?.into_inner())
    }
}

impl Default for ZipSink {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactSink for ZipSink {
    fn write(&mut self, path: &str, bytes: &[u8]) -> io::Result<()> {
        // Fixed entry timestamp; archives of the same theme must be
        // byte-identical no matter when they are produced.
        let options = SimpleFileOptions::default().last_modified_time(zip::DateTime::default());
        self.writer
            .start_file(path, options)
            .map_err(io::Error::other)?;
        self.writer.write_all(bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn directory_sink_writes_and_rolls_back() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("aurora");

        let mut sink = DirectorySink::create(&root).unwrap();
        sink.write("manifest.json", b"{}").unwrap();
        sink.write("templates/index.html", b"<html>").unwrap();
        assert!(root.join("templates/index.html").exists());

        sink.rollback();
        assert!(!root.exists(), "rollback must remove everything written");
    }

    #[test]
    fn directory_sink_refuses_existing_target() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("taken");
        std::fs::create_dir(&root).unwrap();

        let err = DirectorySink::create(&root).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn zip_sink_builds_readable_archive() {
        let mut sink = ZipSink::new();
        sink.write("manifest.json", b"{\"name\":\"a\"}").unwrap();
        sink.write("scripts/cart.js", b"// cart").unwrap();

        let bytes = sink.finish().unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut contents = String::new();
        archive
            .by_name("scripts/cart.js")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "// cart");
    }

    #[test]
    fn zip_entries_carry_a_fixed_timestamp() {
        let mut sink = ZipSink::new();
        sink.write("manifest.json", b"{}").unwrap();

        let bytes = sink.finish().unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let entry = archive.by_index(0).unwrap();
        assert_eq!(
            entry.last_modified().map(|t| t.year()),
            Some(zip::DateTime::default().year())
        );
    }
}
