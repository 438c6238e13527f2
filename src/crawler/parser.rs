//! HTML link extraction
//!
//! Only `<a href>` links are followed. Links are resolved against the page's
//! final URL with their fragment removed, so anchors into an already-known
//! page do not count as new pages.

use crate::url::Origin;
use scraper::{Html, Selector};
use url::Url;

/// Collects every `<a href>` that resolves to an http(s) URL, in document order
///
/// Skipped: `javascript:`, `mailto:`, `tel:` and `data:` links, fragment-only
/// anchors, and hrefs that do not resolve against `base_url`.
///
/// ```
/// use site2pdf::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/page#top">Link</a><a href="mailto:a@b.c">Mail</a>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let links = extract_links(html, &base_url);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.com/page");
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    Html::parse_document(html)
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, base_url))
        .collect()
}

/// Returns up to `limit` links that share `origin`, in document order
///
/// The limit applies after origin filtering, so off-site links never use up
/// the per-page allowance. Duplicates are left for the frontier to drop.
pub fn extract_same_origin_links(
    html: &str,
    base_url: &Url,
    origin: &Origin,
    limit: usize,
) -> Vec<Url> {
    extract_links(html, base_url)
        .into_iter()
        .filter(|link| origin.contains(link))
        .take(limit)
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);
    Some(absolute_url)
}
