//! URL handling module for Onion-Sift
//!
//! This module provides link classification against a crawl root,
//! conservative canonicalization of in-scope links, normalization of target
//! URLs, and domain extraction for the per-domain output folders.

mod canonical;
mod domain;
mod normalize;

// Re-export main functions
pub use canonical::{canonicalize, frontier_key};
pub use domain::{extract_domain, output_folder_name};
pub use normalize::normalize_target_url;

/// Extensions of links that point at binary files or documents
const BINARY_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png", "gif", "doc"];

/// Side-channel bucket an out-of-scope link is filed into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkBucket {
    External,
    Telephone,
    Mail,
    File,
}

impl LinkBucket {
    /// File name suffix of the bucket's daily log
    pub fn file_suffix(&self) -> &'static str {
        match self {
            Self::External => "_ext-links.txt",
            Self::Telephone => "_telephones.txt",
            Self::Mail => "_mails.txt",
            Self::File => "_files.txt",
        }
    }
}

/// Classification of a link found on a crawled page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkClass {
    /// Under the crawl root; forwarded to the canonicalizer
    InScope,
    /// Absolute URL outside the crawl root
    External,
    /// `tel:` link
    Tel,
    /// `mailto:` link
    Mail,
    /// Binary file or document
    BinaryFile,
    /// Missing href or same-page anchor; dropped without a trace
    Excluded,
}

impl LinkClass {
    /// Returns the side-channel bucket for out-of-scope classes
    pub fn bucket(&self) -> Option<LinkBucket> {
        match self {
            Self::External => Some(LinkBucket::External),
            Self::Tel => Some(LinkBucket::Telephone),
            Self::Mail => Some(LinkBucket::Mail),
            Self::BinaryFile => Some(LinkBucket::File),
            Self::InScope | Self::Excluded => None,
        }
    }

    /// Returns true if the link may enter the frontier
    pub fn is_in_scope(&self) -> bool {
        matches!(self, Self::InScope)
    }
}

/// Classifies a raw href relative to the crawl root
///
/// Rules are applied in order and the first match wins:
///
/// 1. Missing link → `Excluded`
/// 2. Contains `#` → `Excluded`
/// 3. Absolute `http(s)://` URL not prefixed by `root` → `External`
/// 4. `tel:` → `Tel`
/// 5. `mailto:` → `Mail`
/// 6. Path ends in a binary/document extension → `BinaryFile`
/// 7. Otherwise → `InScope`
///
/// # Examples
///
/// ```
/// use onion_sift::url::{classify_link, LinkClass};
///
/// let root = "http://example.onion";
/// assert_eq!(classify_link(Some("/about.html"), root), LinkClass::InScope);
/// assert_eq!(classify_link(Some("http://other.onion/x"), root), LinkClass::External);
/// assert_eq!(classify_link(Some("tel:123"), root), LinkClass::Tel);
/// assert_eq!(classify_link(Some("#top"), root), LinkClass::Excluded);
/// ```
pub fn classify_link(link: Option<&str>, root: &str) -> LinkClass {
    let link = match link {
        Some(link) => link,
        None => return LinkClass::Excluded,
    };

    if link.contains('#') {
        return LinkClass::Excluded;
    }

    if is_absolute_http(link) && !link.starts_with(root) {
        return LinkClass::External;
    }

    if starts_with_ignore_case(link, "tel:") {
        return LinkClass::Tel;
    }

    if starts_with_ignore_case(link, "mailto:") {
        return LinkClass::Mail;
    }

    if has_extension(link, BINARY_EXTENSIONS) {
        return LinkClass::BinaryFile;
    }

    LinkClass::InScope
}

fn is_absolute_http(link: &str) -> bool {
    starts_with_ignore_case(link, "http://") || starts_with_ignore_case(link, "https://")
}

pub(crate) fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Checks the extension of the link's path (query string ignored)
pub(crate) fn has_extension(link: &str, extensions: &[&str]) -> bool {
    let path = link.split('?').next().unwrap_or(link);
    let last_segment = path.rsplit('/').next().unwrap_or(path);

    match last_segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => extensions
            .iter()
            .any(|candidate| candidate.eq_ignore_ascii_case(ext)),
        _ => false,
    }
}
