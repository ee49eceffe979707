//! Data model shared by the crawler, the extractor and the row sinks.

use url::Url;

/// Column names of the output table, in row order
pub const RECORD_HEADER: [&str; 11] = [
    "Keyword",
    "Brand",
    "Shoe",
    "Price",
    "URL",
    "Image URL",
    "Size",
    "Width",
    "Color",
    "Gender",
    "Retailer",
];

/// A product found on a listing page
///
/// `id` is the deduplication key: a site-assigned model id when the rule set
/// names one, otherwise the normalized detail URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductReference {
    pub id: String,
    pub url: Url,
}

/// One parsed page of search results
#[derive(Debug, Clone, Default)]
pub struct ListingPage {
    /// Product references in page order
    pub products: Vec<ProductReference>,

    /// Absolute URL of the next results page, if any
    pub next_page: Option<Url>,
}

/// One selectable size within a variant group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeOption {
    pub label: String,

    /// Per-size price when the retailer prices sizes individually
    pub price: Option<String>,
}

/// One purchasable color/width combination of a product
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VariantGroup {
    pub color: String,
    pub width: String,
    pub price: Option<String>,
    pub image_url: String,
    pub sizes: Vec<SizeOption>,
}

/// Product-level fields shared by every row of one detail page
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductInfo {
    pub keyword: String,
    pub brand: String,
    pub name: String,
    pub gender: String,
    pub url: String,
    pub retailer: String,
}

/// One output row: a variant group crossed with one of its sizes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductVariantRecord {
    pub keyword: String,
    pub brand: String,
    pub name: String,
    pub price: String,
    pub url: String,
    pub image_url: String,
    pub size: String,
    pub width: String,
    pub color: String,
    pub gender: String,
    pub retailer: String,
}

impl ProductVariantRecord {
    /// Returns the record as a flat row in [`RECORD_HEADER`] order
    pub fn to_row(&self) -> [&str; 11] {
        [
            &self.keyword,
            &self.brand,
            &self.name,
            &self.price,
            &self.url,
            &self.image_url,
            &self.size,
            &self.width,
            &self.color,
            &self.gender,
            &self.retailer,
        ]
    }
}

/// Flattens variant groups into records, one per (group, size) pair
///
/// The record price is the size price when present, else the group price,
/// else `fallback_price`. Sizes left without any price are dropped so that
/// no partial row is ever emitted.
pub fn flatten(
    product: &ProductInfo,
    groups: &[VariantGroup],
    fallback_price: Option<&str>,
) -> Vec<ProductVariantRecord> {
    let mut records = Vec::new();

    for group in groups {
        for size in &group.sizes {
            let price = size
                .price
                .as_deref()
                .or(group.price.as_deref())
                .or(fallback_price);

            let Some(price) = price else {
                continue;
            };

            records.push(ProductVariantRecord {
                keyword: product.keyword.clone(),
                brand: product.brand.clone(),
                name: product.name.clone(),
                price: price.to_string(),
                url: product.url.clone(),
                image_url: group.image_url.clone(),
                size: size.label.clone(),
                width: group.width.clone(),
                color: group.color.clone(),
                gender: product.gender.clone(),
                retailer: product.retailer.clone(),
            });
        }
    }

    records
}
