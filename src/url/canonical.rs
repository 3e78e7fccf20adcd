use crate::url::has_extension;

/// Extensions of relative links that are recognized as pages or scripts
const PAGE_EXTENSIONS: &[&str] = &["html", "htm", "aspx", "php", "css", "js", "less"];

/// Canonicalizes an in-scope link against the crawl root
///
/// # Rules
///
/// 1. Already prefixed by `root` → unchanged
/// 2. Root-relative (`/path`) → `root + path`, never doubling the separator
/// 3. Relative with a recognized page/script extension → `root + "/" + link`
/// 4. Anything else → `None`; the caller drops the link
///
/// Bare relative paths without a recognized extension are discarded
/// rather than guessed, which keeps the crawl breadth bounded.
///
/// # Examples
///
/// ```
/// use onion_sift::url::canonicalize;
///
/// let root = "http://example.onion/";
/// assert_eq!(canonicalize("/about.html", root).as_deref(), Some("http://example.onion/about.html"));
/// assert_eq!(canonicalize("forum.php", root).as_deref(), Some("http://example.onion/forum.php"));
/// assert_eq!(canonicalize("forum", root), None);
/// ```
pub fn canonicalize(link: &str, root: &str) -> Option<String> {
    if link.starts_with(root) {
        return Some(link.to_string());
    }

    let base = root.strip_suffix('/').unwrap_or(root);

    if link.starts_with('/') {
        return Some(format!("{}{}", base, link));
    }

    if has_extension(link, PAGE_EXTENSIONS) {
        return Some(format!("{}/{}", base, link));
    }

    None
}

/// Key under which a canonical URL is deduplicated in the frontier
///
/// `http://x.onion` and `http://x.onion/` name the same page, so a single
/// trailing slash is ignored.
pub fn frontier_key(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_prefixed_unchanged() {
        let root = "http://example.onion";
        assert_eq!(
            canonicalize("http://example.onion/a/b", root).as_deref(),
            Some("http://example.onion/a/b")
        );
    }

    #[test]
    fn test_root_relative_without_trailing_slash() {
        assert_eq!(
            canonicalize("/about.html", "http://example.onion").as_deref(),
            Some("http://example.onion/about.html")
        );
    }

    #[test]
    fn test_root_relative_with_trailing_slash() {
        assert_eq!(
            canonicalize("/about", "http://example.onion/").as_deref(),
            Some("http://example.onion/about")
        );
    }

    #[test]
    fn test_extension_relative_single_separator() {
        assert_eq!(
            canonicalize("page.htm", "http://example.onion").as_deref(),
            Some("http://example.onion/page.htm")
        );
        assert_eq!(
            canonicalize("page.htm", "http://example.onion/").as_deref(),
            Some("http://example.onion/page.htm")
        );
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert_eq!(
            canonicalize("INDEX.PHP", "http://example.onion").as_deref(),
            Some("http://example.onion/INDEX.PHP")
        );
    }

    #[test]
    fn test_all_page_extensions() {
        for ext in PAGE_EXTENSIONS {
            let link = format!("file.{}", ext);
            assert!(canonicalize(&link, "http://example.onion").is_some(), "{}", ext);
        }
    }

    #[test]
    fn test_ambiguous_relative_is_indeterminate() {
        assert_eq!(canonicalize("forum", "http://example.onion"), None);
        assert_eq!(canonicalize("dir/sub", "http://example.onion"), None);
        assert_eq!(canonicalize("javascript:void(0)", "http://example.onion"), None);
    }

    #[test]
    fn test_idempotent_for_absolute_in_scope() {
        let root = "http://example.onion";
        for link in ["/about.html", "contact.php", "http://example.onion/x"] {
            let once = canonicalize(link, root).unwrap();
            let twice = canonicalize(&once, root).unwrap();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_frontier_key_ignores_single_trailing_slash() {
        assert_eq!(frontier_key("http://example.onion/"), "http://example.onion");
        assert_eq!(frontier_key("http://example.onion"), "http://example.onion");
        assert_eq!(frontier_key("http://example.onion/a/"), "http://example.onion/a");
    }
}
