use crate::rules::types::{BrandRule, ExtractionRuleSet, VariantRules};
use crate::ConfigError;
use regex::Regex;
use scraper::Selector;

/// A rule set with every selector and pattern parsed once up front
///
/// Compilation is where a broken rule set is rejected; extraction code only
/// ever sees valid selectors.
#[derive(Debug)]
pub struct CompiledRules {
    rules: ExtractionRuleSet,
    pub(crate) listing: CompiledListing,
    pub(crate) title: Selector,
    pub(crate) brand: CompiledBrand,
    pub(crate) price: Vec<CompiledPrice>,
    pub(crate) variants: CompiledVariants,
}

#[derive(Debug)]
pub(crate) struct CompiledListing {
    pub item: Selector,
    pub link: Option<Selector>,
    pub next_page: Option<Selector>,
}

#[derive(Debug)]
pub(crate) enum CompiledBrand {
    None,
    Pattern(Regex),
    LabeledToken {
        selector: Selector,
        label: String,
        offset: usize,
        trim: String,
    },
    TitleToken {
        index: usize,
        reject_chars: String,
    },
}

#[derive(Debug)]
pub(crate) struct CompiledPrice {
    pub selector: Selector,
    pub strip: Vec<Selector>,
}

#[derive(Debug)]
pub(crate) struct CompiledVariants {
    pub scripts: Selector,
    pub width: Option<Selector>,
    pub color: Option<Selector>,
    pub image: Option<Selector>,
}

impl CompiledRules {
    /// Compiles a rule set
    ///
    /// # Returns
    ///
    /// * `Ok(CompiledRules)` - All selectors and patterns are valid
    /// * `Err(ConfigError)` - A selector, pattern or template is invalid
    pub fn compile(rules: ExtractionRuleSet) -> Result<Self, ConfigError> {
        if !rules.search_url.contains("{keyword}") {
            return Err(ConfigError::Validation(format!(
                "search-url of rule set '{}' must contain a {{keyword}} placeholder",
                rules.name
            )));
        }

        if rules.retailer.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "retailer label of rule set '{}' cannot be empty",
                rules.name
            )));
        }

        let name = rules.name.as_str();

        let listing = CompiledListing {
            item: parse_selector(name, &rules.listing.item_selector)?,
            link: parse_optional(name, rules.listing.link_selector.as_deref())?,
            next_page: parse_optional(name, rules.listing.next_page_selector.as_deref())?,
        };

        let title = parse_selector(name, &rules.title.selector)?;

        let brand = match &rules.brand {
            BrandRule::None => CompiledBrand::None,
            BrandRule::Pattern { pattern } => {
                let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    rule_set: name.to_string(),
                    source,
                })?;
                if regex.captures_len() < 2 {
                    return Err(ConfigError::Validation(format!(
                        "brand pattern of rule set '{}' needs a capture group",
                        name
                    )));
                }
                CompiledBrand::Pattern(regex)
            }
            BrandRule::LabeledToken {
                selector,
                label,
                offset,
                trim,
            } => CompiledBrand::LabeledToken {
                selector: parse_selector(name, selector)?,
                label: label.clone(),
                offset: *offset,
                trim: trim.clone(),
            },
            BrandRule::TitleToken {
                index,
                reject_chars,
            } => CompiledBrand::TitleToken {
                index: *index,
                reject_chars: reject_chars.clone(),
            },
        };

        let mut price = Vec::with_capacity(rules.price.candidates.len());
        for candidate in &rules.price.candidates {
            let strip = candidate
                .strip_selectors
                .iter()
                .map(|s| parse_selector(name, s))
                .collect::<Result<Vec<_>, _>>()?;
            price.push(CompiledPrice {
                selector: parse_selector(name, &candidate.selector)?,
                strip,
            });
        }

        let payload = rules.variants.payload();
        if payload.start_sentinel.is_empty() {
            return Err(ConfigError::Validation(format!(
                "start-sentinel of rule set '{}' cannot be empty",
                name
            )));
        }

        let variants = match &rules.variants {
            VariantRules::Positional { .. } => CompiledVariants {
                scripts: parse_selector(name, &payload.script_selector)?,
                width: None,
                color: None,
                image: None,
            },
            VariantRules::OptionList {
                width_selector,
                color_selector,
                image_selector,
                ..
            } => CompiledVariants {
                scripts: parse_selector(name, &payload.script_selector)?,
                width: parse_optional(name, width_selector.as_deref())?,
                color: parse_optional(name, color_selector.as_deref())?,
                image: parse_optional(name, image_selector.as_deref())?,
            },
        };

        Ok(Self {
            rules,
            listing,
            title,
            brand,
            price,
            variants,
        })
    }

    /// The source rule set
    pub fn rules(&self) -> &ExtractionRuleSet {
        &self.rules
    }

    /// Retailer label for the Retailer column
    pub fn retailer(&self) -> &str {
        &self.rules.retailer
    }
}

fn parse_selector(rule_set: &str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        rule_set: rule_set.to_string(),
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

fn parse_optional(rule_set: &str, selector: Option<&str>) -> Result<Option<Selector>, ConfigError> {
    selector.map(|s| parse_selector(rule_set, s)).transpose()
}
