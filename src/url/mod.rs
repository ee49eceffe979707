//! URL handling for Shoe-Scout
//!
//! Search URL templating, link resolution against the page they were found
//! on, and product deduplication keys.

mod normalize;

use crate::UrlError;
use url::form_urlencoded;
use url::Url;

pub use normalize::product_key;

/// Builds the first search results URL for a keyword
///
/// The keyword (plus the rule set's suffix) is form-encoded, so spaces
/// become `+`, and substituted for the `{keyword}` placeholder.
///
/// # Examples
///
/// ```
/// use shoe_scout::url::build_search_url;
///
/// let url = build_search_url("https://shop.example/search?q={keyword}", "air max", "").unwrap();
/// assert_eq!(url.as_str(), "https://shop.example/search?q=air+max");
/// ```
pub fn build_search_url(template: &str, keyword: &str, suffix: &str) -> Result<Url, UrlError> {
    if !template.contains("{keyword}") {
        return Err(UrlError::MissingPlaceholder(template.to_string()));
    }

    let term = format!("{}{}", keyword.trim(), suffix);
    let encoded: String = form_urlencoded::byte_serialize(term.as_bytes()).collect();
    let url = template.replace("{keyword}", &encoded);

    let parsed = Url::parse(&url).map_err(|e| UrlError::Parse(format!("{}: {}", url, e)))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(UrlError::InvalidScheme(parsed.scheme().to_string()));
    }

    Ok(parsed)
}

/// Resolves a link href against the page it was found on
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: and data: links
/// - fragment-only links
/// - URLs that do not resolve to http(s)
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    if absolute.scheme() == "http" || absolute.scheme() == "https" {
        Some(absolute)
    } else {
        None
    }
}
