//! Per-retailer extraction rule sets
//!
//! A rule set says where each field lives on a retailer's listing and detail
//! pages. Rule sets are data: they come from the built-in presets or from the
//! `[[retailer]]` tables of a config file, and are compiled once per run.

mod builtin;
mod compiled;
mod types;

pub use builtin::{builtin_names, builtin_rule_set};
pub use compiled::CompiledRules;
pub(crate) use compiled::{CompiledBrand, CompiledPrice};
pub use types::{
    BrandRule, ExtractionRuleSet, GenderMarker, ListingRules, NameMode, PayloadLocator,
    PositionalFields, PriceCandidate, PriceRules, PriceToken, TitleRules, VariantRules,
};
