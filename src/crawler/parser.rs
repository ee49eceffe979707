//! Listing page parser
//!
//! Pulls product references and the next-page link out of one page of
//! search results, using the listing rules of the active rule set.

use crate::model::{ListingPage, ProductReference};
use crate::rules::CompiledRules;
use crate::url::{product_key, resolve_link};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Parses a listing page
///
/// # Product Reference Rules
///
/// - One reference per element matching the item selector, in page order
/// - The link is read from the link selector inside the item, or from the
///   item itself when the rule set names no link selector
/// - The id is the item's id attribute when configured and non-empty,
///   otherwise the normalized detail URL
/// - Items without a usable link are skipped
///
/// # Arguments
///
/// * `html` - The listing page body
/// * `base_url` - Final URL of the listing page, for resolving relative links
/// * `rules` - The compiled rule set
pub fn parse_listing(html: &str, base_url: &Url, rules: &CompiledRules) -> ListingPage {
    let document = Html::parse_document(html);
    let listing = &rules.rules().listing;

    let mut products = Vec::new();
    for item in document.select(&rules.listing.item) {
        let link_element = match &rules.listing.link {
            Some(selector) => item.select(selector).next(),
            None => Some(item),
        };

        let Some(url) = link_element
            .and_then(|el| el.value().attr(&listing.link_attribute))
            .and_then(|href| resolve_link(href, base_url))
        else {
            tracing::trace!("Listing item without a product link on {}", base_url);
            continue;
        };

        let site_id = listing
            .id_attribute
            .as_deref()
            .and_then(|attr| item.value().attr(attr))
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string);

        let id = match site_id {
            Some(id) => id,
            None => match product_key(&url) {
                Ok(key) => key,
                Err(e) => {
                    tracing::debug!("Skipping product link {}: {}", url, e);
                    continue;
                }
            },
        };

        products.push(ProductReference { id, url });
    }

    let next_page = rules
        .listing
        .next_page
        .as_ref()
        .and_then(|selector| next_page_link(&document, selector, base_url));

    ListingPage {
        products,
        next_page,
    }
}

/// Resolves the first next-page element's href
///
/// The element may be the anchor itself or a wrapper around it.
fn next_page_link(document: &Html, selector: &Selector, base_url: &Url) -> Option<Url> {
    document.select(selector).find_map(|el| {
        href_of(el)
            .or_else(|| el.descendants().filter_map(ElementRef::wrap).find_map(href_of))
            .and_then(|href| resolve_link(href, base_url))
    })
}

fn href_of(el: ElementRef<'_>) -> Option<&str> {
    el.value().attr("href").filter(|h| !h.trim().is_empty())
}
