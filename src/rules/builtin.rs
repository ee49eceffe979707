//! Built-in rule sets for the retailers Shoe-Scout ships with
//!
//! Presets are kept as TOML so they go through exactly the same
//! deserialization path as rule sets supplied in a config file.

use crate::rules::types::ExtractionRuleSet;
use crate::ConfigError;

const PRESETS: &[(&str, &str)] = &[
    ("eastbay", include_str!("presets/eastbay.toml")),
    ("jackrabbit", include_str!("presets/jackrabbit.toml")),
    ("holabird", include_str!("presets/holabird.toml")),
];

/// Names of all built-in rule sets
pub fn builtin_names() -> Vec<&'static str> {
    PRESETS.iter().map(|(name, _)| *name).collect()
}

/// Loads a built-in rule set by name
///
/// # Returns
///
/// * `Ok(Some(rules))` - The preset exists
/// * `Ok(None)` - No preset with that name
/// * `Err(ConfigError)` - The embedded preset failed to parse
pub fn builtin_rule_set(name: &str) -> Result<Option<ExtractionRuleSet>, ConfigError> {
    PRESETS
        .iter()
        .find(|(preset, _)| preset.eq_ignore_ascii_case(name))
        .map(|(_, source)| toml::from_str(source).map_err(ConfigError::from))
        .transpose()
}
