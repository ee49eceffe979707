//! Embedded payload parser
//!
//! Retailer pages carry their variant data as object literals inside larger
//! script blocks (`var styles = {...};`, `new Product.Config({...});`). This
//! module cuts such a payload out of the surrounding text and decodes it into
//! a generic `key -> attribute list` mapping. It knows nothing about what the
//! positions inside an attribute list mean.

use serde_json::Value;
use thiserror::Error;

/// Maximum number of characters of the raw slice kept on a failure
const RAW_PREVIEW_LEN: usize = 512;

/// Why a payload could not be recovered
#[derive(Debug, Error)]
pub enum ParseFailureKind {
    #[error("start sentinel not found")]
    SentinelNotFound,

    #[error("end sentinel not found")]
    EndSentinelNotFound,

    #[error("no opening brace after the start sentinel")]
    NoOpeningBrace,

    #[error("payload braces are not balanced")]
    UnbalancedBraces,

    #[error("payload is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("payload is neither an object nor an array")]
    NotAnObject,
}

/// A payload that could not be located or decoded
///
/// Carries the (truncated) raw slice for diagnostics.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct ParseFailure {
    pub kind: ParseFailureKind,
    pub raw: String,
}

impl ParseFailure {
    fn new(kind: ParseFailureKind, raw: &str) -> Self {
        Self {
            kind,
            raw: raw.chars().take(RAW_PREVIEW_LEN).collect(),
        }
    }
}

/// One payload entry flattened into a positional list
///
/// Arrays become their elements; any other value becomes a one-element list,
/// so callers can always index positionally.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AttributeList(Vec<Value>);

impl AttributeList {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Self(items),
            other => Self(vec![other]),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Scalar at `index` rendered as text
    ///
    /// Strings are returned as-is, numbers and booleans are formatted.
    /// Returns None for null, nested values or a missing position.
    pub fn text(&self, index: usize) -> Option<String> {
        match self.0.get(index)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Nested list at `index`, each element flattened in turn
    ///
    /// Returns None when the position is missing or holds a scalar.
    pub fn nested(&self, index: usize) -> Option<Vec<AttributeList>> {
        match self.0.get(index)? {
            Value::Array(items) => Some(items.iter().cloned().map(Self::from_value).collect()),
            _ => None,
        }
    }
}

/// A decoded payload: `key -> attribute list` entries in payload order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmbeddedPayload {
    entries: Vec<(String, AttributeList)>,
}

impl EmbeddedPayload {
    fn from_value(value: Value) -> Option<Self> {
        let entries = match value {
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| (k, AttributeList::from_value(v)))
                .collect(),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), AttributeList::from_value(v)))
                .collect(),
            _ => return None,
        };
        Some(Self { entries })
    }

    pub fn entries(&self) -> &[(String, AttributeList)] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&AttributeList> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Locates and decodes a payload embedded in `raw`
///
/// The payload starts right after `start_sentinel`. It ends just before
/// `end_sentinel` when one is given; otherwise it is the first `{ ... }`
/// object after the sentinel, matched by depth counting so nested objects
/// are kept whole.
///
/// # Examples
///
/// ```
/// use shoe_scout::extract::parse_payload;
///
/// let script = r#"var styles = {"A1": ["Red", {"w": "D"}]}; var other = {};"#;
/// let payload = parse_payload(script, "var styles = ", None).unwrap();
/// assert_eq!(payload.get("A1").unwrap().text(0).as_deref(), Some("Red"));
/// ```
pub fn parse_payload(
    raw: &str,
    start_sentinel: &str,
    end_sentinel: Option<&str>,
) -> Result<EmbeddedPayload, ParseFailure> {
    let slice = locate_payload(raw, start_sentinel, end_sentinel)?;

    let value: Value = serde_json::from_str(slice)
        .map_err(|e| ParseFailure::new(ParseFailureKind::Decode(e), slice))?;

    EmbeddedPayload::from_value(value)
        .ok_or_else(|| ParseFailure::new(ParseFailureKind::NotAnObject, slice))
}

/// Cuts the payload text out of `raw` without decoding it
pub fn locate_payload<'a>(
    raw: &'a str,
    start_sentinel: &str,
    end_sentinel: Option<&str>,
) -> Result<&'a str, ParseFailure> {
    let start = raw
        .find(start_sentinel)
        .ok_or_else(|| ParseFailure::new(ParseFailureKind::SentinelNotFound, raw))?;
    let rest = &raw[start + start_sentinel.len()..];

    match end_sentinel {
        Some(end) => {
            let end_index = rest
                .find(end)
                .ok_or_else(|| ParseFailure::new(ParseFailureKind::EndSentinelNotFound, rest))?;
            Ok(rest[..end_index].trim().trim_end_matches(';').trim_end())
        }
        None => {
            let open = rest
                .find('{')
                .ok_or_else(|| ParseFailure::new(ParseFailureKind::NoOpeningBrace, rest))?;
            balanced_object(&rest[open..])
                .ok_or_else(|| ParseFailure::new(ParseFailureKind::UnbalancedBraces, &rest[open..]))
        }
    }
}

/// Returns the prefix of `s` that forms one complete `{...}` object
///
/// Scans character by character tracking brace depth, skipping braces that
/// appear inside string literals (including escaped quotes). Returns None if
/// the object is never closed.
fn balanced_object(s: &str) -> Option<&str> {
    if !s.starts_with('{') {
        return None;
    }

    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escape = false;

    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&s[..=i]);
                }
            }
            _ => {}
        }
    }

    None
}
