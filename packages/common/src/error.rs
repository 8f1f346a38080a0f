use thiserror::Error;

/// Workspace-wide error taxonomy.
///
/// Crate-local errors convert into this at API boundaries so callers see a
/// single set of failure categories:
/// - `Validation`: malformed input, mutation rejected, no partial write
/// - `NotFound`: a referenced theme/page/block id does not exist
/// - `Conflict`: duplicate theme name or catalog slug, surfaced before any write
/// - `Packaging`: filesystem/archive failure mid-write
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("Name conflict: slug '{0}' is already registered")]
    Conflict(String),

    #[error("Packaging failed: {0}")]
    Packaging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn not_found(kind: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl From<String> for CoreError {
    fn from(s: String) -> Self {
        CoreError::Validation(s)
    }
}

impl From<&str> for CoreError {
    fn from(s: &str) -> Self {
        CoreError::Validation(s.to_string())
    }
}
