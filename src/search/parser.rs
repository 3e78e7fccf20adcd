//! Result-page parser for the onion search index

use crate::search::Target;
use scraper::{ElementRef, Html, Selector};

const NO_NAME: &str = "No name";
const NO_DESCRIPTION: &str = "No description provided";
const UNKNOWN_LAST_SEEN: &str = "Unknown";

/// Parses up to `max` `li.result` items of a search result page
///
/// Each item yields a [`Target`]: name from `h4 a`, address from `cite`,
/// description from `p` and last-seen time from `span.lastSeen`. Missing
/// parts get placeholder values; a missing address leaves `url` empty.
pub fn parse_results(html: &str, max: usize) -> Vec<Target> {
    let document = Html::parse_document(html);
    let Ok(item_selector) = Selector::parse("li.result") else {
        return Vec::new();
    };

    document
        .select(&item_selector)
        .take(max)
        .map(parse_item)
        .collect()
}

fn parse_item(item: ElementRef<'_>) -> Target {
    let name = first_text(&item, "h4 a").unwrap_or_else(|| NO_NAME.to_string());
    let url = first_text(&item, "cite");
    let description = first_text(&item, "p").unwrap_or_else(|| NO_DESCRIPTION.to_string());
    let last_seen =
        first_text(&item, "span.lastSeen").unwrap_or_else(|| UNKNOWN_LAST_SEEN.to_string());

    Target {
        name,
        url,
        description,
        last_seen,
    }
}

/// Whitespace-collapsed text of the first match, if non-empty
fn first_text(item: &ElementRef<'_>, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    item.select(&selector)
        .next()
        .map(|element| element.text().collect::<Vec<_>>().join(" "))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}
