use serde::Deserialize;

/// Declarative description of one retailer's pages
///
/// A rule set is plain data: every retailer runs through the same crawl
/// controller and detail extractor, only the rule set differs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtractionRuleSet {
    /// Short identifier used on the command line (e.g. "eastbay")
    pub name: String,

    /// Retailer label written into the Retailer column
    pub retailer: String,

    /// Prefix for the default output file name
    #[serde(default)]
    pub file_prefix: Option<String>,

    /// Search URL template containing a `{keyword}` placeholder
    pub search_url: String,

    /// Text appended to every keyword before it is encoded
    #[serde(default)]
    pub keyword_suffix: String,

    pub listing: ListingRules,

    pub title: TitleRules,

    #[serde(default)]
    pub brand: BrandRule,

    #[serde(default)]
    pub price: PriceRules,

    pub variants: VariantRules,
}

impl ExtractionRuleSet {
    /// Returns the prefix used for default output file names
    pub fn file_prefix(&self) -> String {
        self.file_prefix.clone().unwrap_or_else(|| self.name.clone())
    }
}

/// Where product links and the next-page link live on a listing page
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ListingRules {
    /// Selects one element per product on the page
    pub item_selector: String,

    /// Selects the link inside an item; the item itself when absent
    #[serde(default)]
    pub link_selector: Option<String>,

    #[serde(default = "default_link_attribute")]
    pub link_attribute: String,

    /// Item attribute holding the site-assigned model id. When absent the
    /// normalized detail URL is the deduplication key.
    #[serde(default)]
    pub id_attribute: Option<String>,

    #[serde(default)]
    pub next_page_selector: Option<String>,
}

/// Title location and the rules for deriving gender and product name
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TitleRules {
    pub selector: String,

    /// Read this attribute instead of the element text
    #[serde(default)]
    pub attribute: Option<String>,

    /// Case-insensitive substrings marking juvenile products
    #[serde(default = "default_juvenile_markers")]
    pub juvenile_markers: Vec<String>,

    /// Gender markers in precedence order
    #[serde(default = "default_gender_markers")]
    pub gender_markers: Vec<GenderMarker>,

    /// Gender used when no marker appears in the title
    #[serde(default = "default_gender")]
    pub default_gender: String,

    #[serde(default)]
    pub name_mode: NameMode,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GenderMarker {
    pub marker: String,
    pub gender: String,
}

/// How the product name is derived from the title
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum NameMode {
    /// Text before the gender marker; text after it is kept as a color hint
    #[default]
    BeforeMarker,

    /// The whole title
    FullTitle,
}

/// Brand lookup strategies
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(
    tag = "kind",
    rename_all = "kebab-case",
    rename_all_fields = "kebab-case"
)]
pub enum BrandRule {
    /// No brand available on this retailer
    #[default]
    None,

    /// Regex over the raw page HTML; capture group 1 is the brand
    Pattern { pattern: String },

    /// Whitespace tokens of a script block: find `label`, read `offset`
    /// tokens forward and trim `trim` characters from both ends
    LabeledToken {
        selector: String,
        label: String,
        #[serde(default = "default_label_offset")]
        offset: usize,
        #[serde(default = "default_token_trim")]
        trim: String,
    },

    /// Whitespace token of the title at `index`
    ///
    /// A token containing any of the `reject-chars` marks the page as
    /// something other than a product.
    TitleToken {
        index: usize,
        #[serde(default)]
        reject_chars: String,
    },
}

/// Candidate price texts in precedence order
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PriceRules {
    #[serde(default)]
    pub candidates: Vec<PriceCandidate>,

    /// A valid price text starts with this marker
    #[serde(default = "default_currency_marker")]
    pub currency_marker: String,
}

impl Default for PriceRules {
    fn default() -> Self {
        Self {
            candidates: Vec::new(),
            currency_marker: default_currency_marker(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PriceCandidate {
    pub selector: String,

    #[serde(default)]
    pub attribute: Option<String>,

    /// Texts of these elements are removed from the candidate text first
    #[serde(default)]
    pub strip_selectors: Vec<String>,

    #[serde(default)]
    pub token: PriceToken,
}

/// Which part of a candidate text holds the price
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PriceToken {
    #[default]
    Whole,
    FirstLine,
    LastField,
}

/// Where the variant payload lives and how its entries map to fields
#[derive(Debug, Clone, Deserialize)]
#[serde(
    tag = "layout",
    rename_all = "kebab-case",
    rename_all_fields = "kebab-case"
)]
pub enum VariantRules {
    /// Payload maps a variant id to a positional attribute list
    Positional {
        payload: PayloadLocator,
        fields: PositionalFields,
        /// Image URL template with an `{id}` placeholder for the variant id
        #[serde(default)]
        image_template: String,
    },

    /// Payload holds an attribute table whose options are the sizes of the
    /// single variant shown on the page
    OptionList {
        payload: PayloadLocator,
        #[serde(default = "default_attributes_key")]
        attributes_key: String,
        /// Only attributes whose code contains this text supply sizes
        #[serde(default)]
        size_code: Option<String>,
        #[serde(default)]
        width_selector: Option<String>,
        #[serde(default)]
        color_selector: Option<String>,
        /// Use the title text after the gender marker as the color
        #[serde(default)]
        color_from_title: bool,
        #[serde(default)]
        image_selector: Option<String>,
        #[serde(default = "default_image_attribute")]
        image_attribute: String,
    },
}

impl VariantRules {
    pub fn payload(&self) -> &PayloadLocator {
        match self {
            Self::Positional { payload, .. } | Self::OptionList { payload, .. } => payload,
        }
    }
}

/// Locates an embedded payload inside script text
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PayloadLocator {
    /// Elements searched, in document order, for the start sentinel
    #[serde(default = "default_script_selector")]
    pub script_selector: String,

    pub start_sentinel: String,

    /// Payload ends right before this text; brace matching when absent
    #[serde(default)]
    pub end_sentinel: Option<String>,
}

/// Positions of variant fields inside a positional attribute list
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct PositionalFields {
    pub color: usize,
    pub width: usize,
    pub price: usize,
    pub sizes: usize,
    pub size_label: usize,
    #[serde(default)]
    pub size_price: Option<usize>,
    /// Characters trimmed from both ends of size labels
    #[serde(default = "default_size_trim")]
    pub size_trim: String,
}

fn default_link_attribute() -> String {
    "href".to_string()
}

pub(crate) fn default_juvenile_markers() -> Vec<String> {
    vec!["girls'".to_string(), "boys'".to_string(), "kids'".to_string()]
}

pub(crate) fn default_gender_markers() -> Vec<GenderMarker> {
    vec![
        GenderMarker {
            marker: "women's".to_string(),
            gender: "Woman".to_string(),
        },
        GenderMarker {
            marker: "men's".to_string(),
            gender: "Man".to_string(),
        },
    ]
}

fn default_gender() -> String {
    "Unisex".to_string()
}

fn default_label_offset() -> usize {
    2
}

fn default_token_trim() -> String {
    "'\",;:".to_string()
}

fn default_currency_marker() -> String {
    "$".to_string()
}

fn default_attributes_key() -> String {
    "attributes".to_string()
}

fn default_image_attribute() -> String {
    "src".to_string()
}

fn default_script_selector() -> String {
    "script".to_string()
}

fn default_size_trim() -> String {
    " \"".to_string()
}
