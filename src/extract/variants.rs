//! Variant recovery
//!
//! Turns a decoded payload into [`VariantGroup`]s. The positional layout
//! reads every payload entry as one color/width group; the option-list
//! layout reads size options out of an attribute table and takes the other
//! group fields from the page itself.

use super::payload::{parse_payload, AttributeList, EmbeddedPayload, ParseFailure, ParseFailureKind};
use super::price::is_valid_price;
use crate::model::{SizeOption, VariantGroup};
use crate::rules::{CompiledRules, PayloadLocator, PositionalFields, VariantRules};
use scraper::{Html, Selector};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Why a positional attribute list could not be read as a variant
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VariantError {
    #[error("attribute list has {len} entries, position {needed} required")]
    TooShort { len: usize, needed: usize },

    #[error("position {position} ({field}) has the wrong type")]
    WrongType { field: &'static str, position: usize },
}

/// One positional payload entry, validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantAttributes {
    pub color: String,
    pub width: String,
    pub price: Option<String>,
    pub sizes: Vec<SizeOption>,
}

impl VariantAttributes {
    /// Reads the configured positions out of `list`
    ///
    /// Color and width must be scalars, sizes must be a list. A null or
    /// missing price is allowed. Sizes without a label are skipped.
    pub fn from_list(
        list: &AttributeList,
        fields: &PositionalFields,
        currency_marker: &str,
    ) -> Result<Self, VariantError> {
        let needed = fields.color.max(fields.width).max(fields.price).max(fields.sizes);
        if list.len() <= needed {
            return Err(VariantError::TooShort {
                len: list.len(),
                needed,
            });
        }

        let color = list.text(fields.color).ok_or(VariantError::WrongType {
            field: "color",
            position: fields.color,
        })?;
        let width = list.text(fields.width).ok_or(VariantError::WrongType {
            field: "width",
            position: fields.width,
        })?;
        let price = list
            .text(fields.price)
            .map(|p| p.trim().to_string())
            .filter(|p| is_valid_price(p, currency_marker));
        let entries = list.nested(fields.sizes).ok_or(VariantError::WrongType {
            field: "sizes",
            position: fields.sizes,
        })?;

        let trim: &[char] = &fields.size_trim.chars().collect::<Vec<_>>();
        let sizes = entries
            .iter()
            .filter_map(|entry| {
                let label = entry.text(fields.size_label)?;
                let label = label.trim_matches(trim);
                if label.is_empty() {
                    return None;
                }
                let price = fields
                    .size_price
                    .and_then(|i| entry.text(i))
                    .map(|p| p.trim().to_string())
                    .filter(|p| is_valid_price(p, currency_marker));
                Some(SizeOption {
                    label: label.to_string(),
                    price,
                })
            })
            .collect();

        Ok(Self {
            color: color.trim().to_string(),
            width: width.trim().to_string(),
            price,
            sizes,
        })
    }
}

/// Page context the option-list layout needs besides the payload
pub(crate) struct PageContext<'a> {
    pub document: &'a Html,
    pub title_remainder: &'a str,
    pub page_url: &'a url::Url,
}

/// Recovers the variant groups of a detail page
///
/// Groups without any size are dropped. An empty result carries the payload
/// failure, if there was one, for diagnostics.
pub(crate) fn extract_variants(
    ctx: &PageContext<'_>,
    rules: &CompiledRules,
) -> Result<Vec<VariantGroup>, Option<ParseFailure>> {
    let payload = find_payload(ctx.document, &rules.variants.scripts, rules.rules().variants.payload())
        .map_err(Some)?;

    let groups: Vec<VariantGroup> = match &rules.rules().variants {
        VariantRules::Positional {
            fields,
            image_template,
            ..
        } => positional_groups(
            &payload,
            fields,
            image_template,
            &rules.rules().price.currency_marker,
        ),
        VariantRules::OptionList {
            attributes_key,
            size_code,
            color_from_title,
            image_attribute,
            ..
        } => {
            let sizes = option_sizes(&payload, attributes_key, size_code.as_deref());
            let color = match &rules.variants.color {
                Some(selector) => first_text(ctx.document, selector),
                None if *color_from_title => ctx.title_remainder.to_string(),
                None => String::new(),
            };
            let width = rules
                .variants
                .width
                .as_ref()
                .map(|s| first_text(ctx.document, s))
                .unwrap_or_default();
            let image_url = rules
                .variants
                .image
                .as_ref()
                .and_then(|s| first_attr(ctx.document, s, image_attribute))
                .and_then(|src| crate::url::resolve_link(&src, ctx.page_url))
                .map(String::from)
                .unwrap_or_default();

            vec![VariantGroup {
                color,
                width,
                price: None,
                image_url,
                sizes,
            }]
        }
    };

    let groups: Vec<VariantGroup> = groups.into_iter().filter(|g| !g.sizes.is_empty()).collect();
    if groups.is_empty() {
        return Err(None);
    }
    Ok(groups)
}

/// Decodes the first script block carrying the payload
fn find_payload(
    document: &Html,
    scripts: &Selector,
    locator: &PayloadLocator,
) -> Result<EmbeddedPayload, ParseFailure> {
    let mut last_failure = None;

    for script in document.select(scripts) {
        let text: String = script.text().collect();
        if !text.contains(&locator.start_sentinel) {
            continue;
        }
        match parse_payload(&text, &locator.start_sentinel, locator.end_sentinel.as_deref()) {
            Ok(payload) => return Ok(payload),
            Err(e) => last_failure = Some(e),
        }
    }

    Err(last_failure.unwrap_or(ParseFailure {
        kind: ParseFailureKind::SentinelNotFound,
        raw: String::new(),
    }))
}

fn positional_groups(
    payload: &EmbeddedPayload,
    fields: &PositionalFields,
    image_template: &str,
    currency_marker: &str,
) -> Vec<VariantGroup> {
    payload
        .entries()
        .iter()
        .filter_map(|(id, list)| {
            match VariantAttributes::from_list(list, fields, currency_marker) {
                Ok(attrs) => Some(VariantGroup {
                    color: attrs.color,
                    width: attrs.width,
                    price: attrs.price,
                    image_url: image_template.replace("{id}", id),
                    sizes: attrs.sizes,
                }),
                Err(e) => {
                    debug!("Skipping variant {}: {}", id, e);
                    None
                }
            }
        })
        .collect()
}

/// Option labels of every size attribute in the attribute table
fn option_sizes(payload: &EmbeddedPayload, attributes_key: &str, size_code: Option<&str>) -> Vec<SizeOption> {
    let Some(Value::Object(attributes)) = payload.get(attributes_key).and_then(|a| a.get(0)) else {
        return Vec::new();
    };

    let mut sizes = Vec::new();
    for attribute in attributes.values() {
        if let Some(code) = size_code {
            let matches = attribute
                .get("code")
                .and_then(Value::as_str)
                .is_some_and(|c| c.contains(code));
            if !matches {
                continue;
            }
        }

        let Some(options) = attribute.get("options").and_then(Value::as_array) else {
            continue;
        };
        for option in options {
            let label = option
                .get("label")
                .and_then(Value::as_str)
                .map(str::trim)
                .unwrap_or_default();
            if !label.is_empty() {
                sizes.push(SizeOption {
                    label: label.to_string(),
                    price: None,
                });
            }
        }
    }

    sizes
}

fn first_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn first_attr(document: &Html, selector: &Selector, attribute: &str) -> Option<String> {
    document
        .select(selector)
        .find_map(|el| el.value().attr(attribute))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
