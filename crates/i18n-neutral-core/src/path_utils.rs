//! Dotted path helpers shared by the schema tree, the rewriter and documents.
//!
//! Paths follow the document-mapper convention: segments joined by `.`, array
//! elements addressed by a decimal index segment (`authors.0.name`).

/// Append `name` to a dotted `prefix`. An empty prefix means the root.
///
/// # Example
/// ```
/// use i18n_neutral_core::join_path;
/// assert_eq!(join_path("", "name"), "name");
/// assert_eq!(join_path("meta.title", "es"), "meta.title.es");
/// ```
pub fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Split a dotted path into its segments. The empty path has no segments.
///
/// # Example
/// ```
/// use i18n_neutral_core::split_path;
/// assert_eq!(split_path("authors.0.name"), vec!["authors", "0", "name"]);
/// assert!(split_path("").is_empty());
/// ```
pub fn split_path(path: &str) -> Vec<&str> {
    if path.is_empty() {
        return Vec::new();
    }
    path.split('.').collect()
}

/// Split a dotted path into its parent prefix and last segment.
///
/// # Example
/// ```
/// use i18n_neutral_core::split_parent;
/// assert_eq!(split_parent("meta.title"), ("meta", "title"));
/// assert_eq!(split_parent("name"), ("", "name"));
/// ```
pub fn split_parent(path: &str) -> (&str, &str) {
    path.rsplit_once('.').unwrap_or(("", path))
}

/// Parse an array index segment. Only plain ASCII digits qualify, so `+1` or
/// ` 1` are treated as field names rather than indices.
pub fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
