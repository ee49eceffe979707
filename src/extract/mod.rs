//! Detail page extraction
//!
//! Turns one product detail page into zero or more output records. Every
//! failure here is scoped to that one product: the caller logs it, counts it
//! and moves on.

mod brand;
mod payload;
mod price;
mod title;
mod variants;

use crate::model::{flatten, ProductInfo, ProductVariantRecord};
use crate::rules::CompiledRules;
use scraper::Html;
use thiserror::Error;
use url::Url;

pub use payload::{
    locate_payload, parse_payload, AttributeList, EmbeddedPayload, ParseFailure, ParseFailureKind,
};
pub use price::is_valid_price;
pub use title::{is_juvenile, split_title, TitleParts};
pub use variants::{VariantAttributes, VariantError};

/// Why a detail page produced no records
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error("out of scope product '{title}'")]
    OutOfScopeProduct { title: String },

    #[error("no product title found")]
    MissingTitle,

    #[error("no valid price found")]
    NoPriceFound,

    #[error("no variants found")]
    NoVariantsFound {
        #[source]
        source: Option<ParseFailure>,
    },
}

/// Extracts every (variant, size) record from a detail page
///
/// # Order of Checks
///
/// 1. Title: missing title fails, juvenile titles are out of scope
/// 2. Gender and name from the title
/// 3. Brand (empty when not found); a rejected brand token is out of scope
/// 4. Page price from the configured candidates
/// 5. Variants from the embedded payload
///
/// # Returns
///
/// * `Ok(records)` - At least one complete record
/// * `Err(ExtractionFailure)` - The product yields nothing
pub fn extract(
    html: &str,
    page_url: &Url,
    keyword: &str,
    rules: &CompiledRules,
) -> Result<Vec<ProductVariantRecord>, ExtractionFailure> {
    let document = Html::parse_document(html);
    let rule_set = rules.rules();

    let title = read_title(&document, rules).ok_or(ExtractionFailure::MissingTitle)?;
    if is_juvenile(&title, &rule_set.title.juvenile_markers) {
        return Err(ExtractionFailure::OutOfScopeProduct { title });
    }

    let parts = split_title(&title, &rule_set.title);
    let brand = brand::extract_brand(&document, html, &title, &rules.brand)
        .ok_or_else(|| ExtractionFailure::OutOfScopeProduct { title: title.clone() })?;

    let page_price = price::select_price(
        &document,
        &rules.price,
        &rule_set.price.candidates,
        &rule_set.price.currency_marker,
    );
    if page_price.is_none() && !rule_set.price.candidates.is_empty() {
        return Err(ExtractionFailure::NoPriceFound);
    }

    let ctx = variants::PageContext {
        document: &document,
        title_remainder: &parts.remainder,
        page_url,
    };
    let groups = variants::extract_variants(&ctx, rules)
        .map_err(|source| ExtractionFailure::NoVariantsFound { source })?;

    let product = ProductInfo {
        keyword: keyword.to_string(),
        brand,
        name: parts.name,
        gender: parts.gender,
        url: page_url.to_string(),
        retailer: rules.retailer().to_string(),
    };

    let records = flatten(&product, &groups, page_price.as_deref());
    if records.is_empty() {
        return Err(ExtractionFailure::NoPriceFound);
    }

    Ok(records)
}

fn read_title(document: &Html, rules: &CompiledRules) -> Option<String> {
    let attribute = rules.rules().title.attribute.as_deref();

    document.select(&rules.title).find_map(|el| {
        let raw = match attribute {
            Some(attr) => el.value().attr(attr)?.to_string(),
            None => el.text().collect::<Vec<_>>().join(" "),
        };
        let title = title::normalize_title(&raw);
        (!title.is_empty()).then_some(title)
    })
}
