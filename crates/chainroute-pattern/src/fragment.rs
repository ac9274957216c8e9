//! URL fragment normalization.
//!
//! Routes are matched against a *fragment*: the part of a location after the
//! `#`, or, for path-based locations, the path below the application root.

/// Strips a single leading `#` or `/` and any trailing whitespace.
pub fn normalize_fragment(raw: &str) -> String {
    let trimmed = raw.trim_end();
    trimmed
        .strip_prefix(|c| c == '#' || c == '/')
        .unwrap_or(trimmed)
        .to_string()
}

/// Removes the application root from a path.
///
/// The root is compared without its surrounding slashes, and only on a
/// segment boundary: root `app` strips `/app/posts` but not `/apple`.
/// Paths outside the root are returned without their leading slashes.
pub fn strip_root<'a>(path: &'a str, root: &str) -> &'a str {
    let root = root.trim_matches('/');
    let path = path.trim_start_matches('/');
    if root.is_empty() {
        return path;
    }
    match path.strip_prefix(root) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        Some(rest) if rest.starts_with('?') => rest,
        _ => path,
    }
}

/// Reduces a full URL (or a bare path) to its routable fragment.
///
/// When the URL carries a `#`, everything after it is the fragment. Otherwise
/// the scheme and host are dropped and the root is stripped from the path.
///
/// ```rust
/// use chainroute_pattern::fragment_from_url;
///
/// assert_eq!(fragment_from_url("https://example.com/#posts/15", "/"), "posts/15");
/// assert_eq!(fragment_from_url("https://example.com/app/posts/15", "/app"), "posts/15");
/// assert_eq!(fragment_from_url("/app/posts/new?draft=1", "app"), "posts/new?draft=1");
/// ```
pub fn fragment_from_url(url: &str, root: &str) -> String {
    if let Some((_, hash)) = url.split_once('#') {
        return normalize_fragment(hash);
    }

    let path = match url.find("://") {
        Some(idx) => {
            let after_scheme = &url[idx + 3..];
            after_scheme
                .find('/')
                .map(|slash| &after_scheme[slash..])
                .unwrap_or("")
        }
        None => url,
    };

    normalize_fragment(strip_root(path, root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_one_leading_marker() {
        assert_eq!(normalize_fragment("#posts/15"), "posts/15");
        assert_eq!(normalize_fragment("/posts/15"), "posts/15");
        assert_eq!(normalize_fragment("#/posts/15"), "/posts/15");
        assert_eq!(normalize_fragment("posts/15"), "posts/15");
    }

    #[test]
    fn test_normalize_strips_trailing_whitespace() {
        assert_eq!(normalize_fragment("posts/15  \n"), "posts/15");
        assert_eq!(normalize_fragment(""), "");
    }

    #[test]
    fn test_strip_root() {
        assert_eq!(strip_root("/app/posts/15", "/app/"), "posts/15");
        assert_eq!(strip_root("/app", "app"), "");
        assert_eq!(strip_root("/apple/pie", "/app"), "apple/pie");
        assert_eq!(strip_root("/posts", "/"), "posts");
        assert_eq!(strip_root("/app?x=1", "/app"), "?x=1");
    }

    #[test]
    fn test_fragment_from_url_prefers_hash() {
        assert_eq!(
            fragment_from_url("https://example.com/app/#/post/1/comments/2", "/app"),
            "post/1/comments/2"
        );
    }

    #[test]
    fn test_fragment_from_url_without_path() {
        assert_eq!(fragment_from_url("https://example.com", "/"), "");
    }

    #[test]
    fn test_fragment_from_url_keeps_query() {
        assert_eq!(
            fragment_from_url("http://localhost:8080/posts/new?draft=true", "/"),
            "posts/new?draft=true"
        );
    }
}
