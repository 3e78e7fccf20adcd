use crate::url::starts_with_ignore_case;
use crate::UrlError;
use url::Url;

/// Normalizes a target URL before it is crawled
///
/// # Normalization Steps
///
/// 1. Trim whitespace; reject empty input
/// 2. Onion hosts: add `http://` when the scheme is missing, and downgrade
///    `https://` to `http://` (onion services are end-to-end encrypted by
///    the transport and rarely serve TLS)
/// 3. Other hosts: add `https://` when the scheme is missing
/// 4. Parse; reject non-HTTP(S) schemes and URLs without a host
///
/// The string is returned as written (apart from the scheme) so that it
/// can serve as a crawl root prefix.
///
/// # Examples
///
/// ```
/// use onion_sift::url::normalize_target_url;
///
/// assert_eq!(normalize_target_url("abc.onion").unwrap(), "http://abc.onion");
/// assert_eq!(normalize_target_url("https://abc.onion/x").unwrap(), "http://abc.onion/x");
/// assert_eq!(normalize_target_url("example.com").unwrap(), "https://example.com");
/// ```
pub fn normalize_target_url(raw: &str) -> Result<String, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let has_scheme = trimmed.contains("://");
    let is_onion = host_part(trimmed).to_ascii_lowercase().ends_with(".onion");

    let candidate = if is_onion {
        if !has_scheme {
            format!("http://{}", trimmed)
        } else if starts_with_ignore_case(trimmed, "https://") {
            format!("http://{}", &trimmed["https://".len()..])
        } else {
            trimmed.to_string()
        }
    } else if !has_scheme {
        format!("https://{}", trimmed)
    } else {
        trimmed.to_string()
    };

    let parsed = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    Ok(candidate)
}

/// Returns the host[:port] part of a URL-ish string, scheme optional
fn host_part(s: &str) -> &str {
    let without_scheme = s.split_once("://").map(|(_, rest)| rest).unwrap_or(s);
    let end = without_scheme
        .find(|c| c == '/' || c == '?' || c == '#')
        .unwrap_or(without_scheme.len());
    let authority = &without_scheme[..end];
    authority.split(':').next().unwrap_or(authority)
}
