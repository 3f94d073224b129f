//! Location rules: remote key and CDN URL derivation, and the migration-status predicate.
//!
//! Nothing derived here is stored separately. The remote key and CDN URL are
//! recomputed from the local path on every transfer so they cannot drift from
//! the configured prefix.

use std::path::Path;

/// Remote key layout and residency classification for one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRules {
    key_prefix: String,
    cdn_base_url: String,
    remote_marker: String,
}

impl LocationRules {
    pub fn new(
        key_prefix: impl Into<String>,
        cdn_base_url: impl Into<String>,
        remote_marker: impl Into<String>,
    ) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            cdn_base_url: cdn_base_url.into(),
            remote_marker: remote_marker.into(),
        }
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    pub fn cdn_base_url(&self) -> &str {
        &self.cdn_base_url
    }

    pub fn remote_marker(&self) -> &str {
        &self.remote_marker
    }

    /// Whether a stored path or URL denotes an object already resident in the remote store.
    ///
    /// This is the only place the residency rule lives. It is a substring match on the
    /// marker (by default the object-store hostname), so a CDN host that does not contain
    /// the marker is classified as local even after migration.
    pub fn is_remote(&self, stored_location: &str) -> bool {
        !self.remote_marker.is_empty() && stored_location.contains(&self.remote_marker)
    }

    /// Object key for a local file: `normalize(prefix) + basename(local_path)`.
    ///
    /// Returns `None` when the path has no file name component.
    pub fn remote_key(&self, local_path: &str) -> Option<String> {
        basename(local_path).map(|name| format!("{}{}", normalize_prefix(&self.key_prefix), name))
    }

    /// CDN base for the configured prefix, without a trailing slash.
    pub fn cdn_prefix_url(&self) -> String {
        let base = format!(
            "{}/{}",
            self.cdn_base_url.trim_end_matches('/'),
            self.key_prefix.trim_start_matches('/')
        );
        base.trim_end_matches('/').to_string()
    }

    /// Public URL for a file name under the configured prefix.
    pub fn cdn_url(&self, filename: &str) -> String {
        format!("{}/{}", self.cdn_prefix_url(), filename)
    }

    /// Public URL for the file a stored path points at, substituting only the basename.
    pub fn cdn_url_for_path(&self, stored_path: &str) -> Option<String> {
        basename(stored_path).map(|name| self.cdn_url(name))
    }
}

/// Normalize a key prefix to `segment/.../` form: no leading slash, exactly one trailing
/// slash, or empty when no prefix is configured.
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}/", trimmed)
    }
}

/// Last path component of a filesystem path or URL path.
pub fn basename(path: &str) -> Option<&str> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    Path::new(trimmed)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(prefix: &str) -> LocationRules {
        LocationRules::new(prefix, "https://cdn.example.com", "amazonaws.com")
    }

    #[test]
    fn normalize_prefix_trims_and_terminates() {
        assert_eq!(normalize_prefix("uploads"), "uploads/");
        assert_eq!(normalize_prefix("uploads/"), "uploads/");
        assert_eq!(normalize_prefix("/uploads//"), "uploads/");
        assert_eq!(normalize_prefix("wp-content/uploads/"), "wp-content/uploads/");
        assert_eq!(normalize_prefix(""), "");
        assert_eq!(normalize_prefix("/"), "");
    }

    #[test]
    fn remote_key_uses_basename_only() {
        let r = rules("uploads/");
        assert_eq!(
            r.remote_key("/var/www/uploads/2024/05/photo.jpg").as_deref(),
            Some("uploads/photo.jpg")
        );
        assert_eq!(rules("").remote_key("photo.jpg").as_deref(), Some("photo.jpg"));
        assert_eq!(r.remote_key("/"), None);
        assert_eq!(r.remote_key(""), None);
    }

    #[test]
    fn cdn_url_joins_base_prefix_and_name() {
        assert_eq!(
            rules("uploads/").cdn_url("photo.jpg"),
            "https://cdn.example.com/uploads/photo.jpg"
        );
        assert_eq!(
            rules("/uploads").cdn_url("photo.jpg"),
            "https://cdn.example.com/uploads/photo.jpg"
        );
        assert_eq!(rules("").cdn_url("photo.jpg"), "https://cdn.example.com/photo.jpg");

        let trailing = LocationRules::new("media", "https://cdn.example.com/", "amazonaws.com");
        assert_eq!(trailing.cdn_url("a.png"), "https://cdn.example.com/media/a.png");
    }

    #[test]
    fn cdn_url_for_path_substitutes_filename() {
        let r = rules("uploads");
        assert_eq!(
            r.cdn_url_for_path("2024/05/photo-150x150.jpg").as_deref(),
            Some("https://cdn.example.com/uploads/photo-150x150.jpg")
        );
    }

    #[test]
    fn is_remote_matches_marker_substring() {
        let r = rules("uploads");
        assert!(r.is_remote("https://bucket.s3.us-east-1.amazonaws.com/uploads/a.jpg"));
        assert!(!r.is_remote("/var/www/uploads/a.jpg"));
        // A CDN host without the marker is not recognised as remote.
        assert!(!r.is_remote("https://cdn.example.com/uploads/a.jpg"));
    }

    #[test]
    fn empty_marker_never_matches() {
        let r = LocationRules::new("uploads", "https://cdn.example.com", "");
        assert!(!r.is_remote("https://bucket.s3.amazonaws.com/a.jpg"));
    }
}
