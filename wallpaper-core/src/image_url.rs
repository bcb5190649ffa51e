//! Resolution of stored image records to absolute URLs.

/// Default origin prefixed to relative records.
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://bing.com";

/// Turn a stored record into an absolute URL.
///
/// Records that already carry an `http(s)://` scheme are returned verbatim,
/// protocol-relative records (`//host/...`) get `https:`, everything else is
/// joined onto `base`.
pub fn resolve_image_url(base: &str, record: &str) -> String {
    let record = record.trim();
    let lower = record.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        return record.to_string();
    }
    if record.starts_with("//") {
        return format!("https:{record}");
    }

    let base = base.trim_end_matches('/');
    if record.starts_with('/') {
        format!("{base}{record}")
    } else {
        format!("{base}/{record}")
    }
}
