use std::io;

/// Destination for packaged theme artifacts.
///
/// The packager generates the identical artifact set regardless of target;
/// only the sink differs (theme catalog directory vs. in-memory archive).
/// Paths are relative, `/`-separated, and never escape the sink root.
pub trait ArtifactSink {
    /// Write one artifact file.
    fn write(&mut self, path: &str, bytes: &[u8]) -> io::Result<()>;
}

/// In-memory sink for tests: records every write in order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub files: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, bytes)| bytes.as_slice())
    }

    pub fn paths(&self) -> Vec<&str> {
        self.files.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl ArtifactSink for MemorySink {
    fn write(&mut self, path: &str, bytes: &[u8]) -> io::Result<()> {
        self.files.push((path.to_string(), bytes.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sink_records_writes_in_order() {
        let mut sink = MemorySink::new();
        sink.write("style.css", b"body {}").unwrap();
        sink.write("templates/index.html", b"<html>").unwrap();

        assert_eq!(sink.paths(), vec!["style.css", "templates/index.html"]);
        assert_eq!(sink.get("style.css"), Some(&b"body {}"[..]));
        assert!(sink.get("missing.css").is_none());
    }
}
