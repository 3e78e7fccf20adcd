use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use onion_sift::url::extract_domain;
///
/// let url = Url::parse("http://EXAMPLE.onion/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.onion".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Name of the per-domain output folder for a crawl root
///
/// The host, plus `_<port>` when the URL carries an explicit port. Falls
/// back to a sanitized form of the raw string when it does not parse.
pub fn output_folder_name(root: &str) -> String {
    match Url::parse(root) {
        Ok(url) => match (extract_domain(&url), url.port()) {
            (Some(host), Some(port)) => format!("{}_{}", host, port),
            (Some(host), None) => host,
            (None, _) => sanitize(root),
        },
        Err(_) => sanitize(root),
    }
}

fn sanitize(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}
