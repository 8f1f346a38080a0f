/// Normalize a human-readable name into a catalog/filesystem-safe slug.
///
/// Two names that normalize to the same slug are considered colliding by
/// install-mode packaging.
pub fn slugify(name: &str) -> String {
    let normalized = slug::slugify(name);
    if normalized.is_empty() {
        "untitled".to_string()
    } else {
        normalized
    }
}
