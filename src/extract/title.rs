use crate::rules::{GenderMarker, NameMode, TitleRules};

/// Characters trimmed from the ends of name and remainder fragments
const FRAGMENT_TRIM: &[char] = &['-', ',', '|', ':'];

/// Gender, product name and leftover text derived from a title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleParts {
    pub gender: String,
    pub name: String,
    /// Title text after the gender marker, used as a color hint
    pub remainder: String,
}

/// Collapses runs of whitespace and folds typographic apostrophes
pub(crate) fn normalize_title(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace(['\u{2019}', '\u{2018}'], "'")
}

/// Returns true when the title names a juvenile product
pub fn is_juvenile(title: &str, markers: &[String]) -> bool {
    let lower = title.to_lowercase();
    markers
        .iter()
        .filter(|m| !m.is_empty())
        .any(|m| lower.contains(&m.to_lowercase()))
}

/// Splits a title into gender, name and remainder
///
/// Markers are tried in configured order and must start at a word boundary,
/// so "men's" never matches inside "women's".
pub fn split_title(title: &str, rules: &TitleRules) -> TitleParts {
    let Some((marker, start)) = find_gender_marker(title, &rules.gender_markers) else {
        return TitleParts {
            gender: rules.default_gender.clone(),
            name: title.trim().to_string(),
            remainder: String::new(),
        };
    };

    let before = trim_fragment(&title[..start]);
    let after = trim_fragment(&title[start + marker.marker.len()..]);

    let (name, remainder) = match rules.name_mode {
        NameMode::FullTitle => (title.trim(), after),
        // Marker leads the title ("Men's Ghost 14"): the rest is the name
        NameMode::BeforeMarker if before.is_empty() => (after, ""),
        NameMode::BeforeMarker => (before, after),
    };

    TitleParts {
        gender: marker.gender.clone(),
        name: name.to_string(),
        remainder: remainder.to_string(),
    }
}

/// Byte offset of the first configured marker found at a word boundary
fn find_gender_marker<'a>(
    title: &str,
    markers: &'a [GenderMarker],
) -> Option<(&'a GenderMarker, usize)> {
    // ASCII lowercasing keeps byte offsets aligned with `title`
    let lower = title.to_ascii_lowercase();

    for marker in markers {
        let needle = marker.marker.to_ascii_lowercase();
        if needle.is_empty() {
            continue;
        }

        let mut from = 0;
        while let Some(pos) = lower[from..].find(&needle) {
            let at = from + pos;
            let boundary = lower[..at]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            if boundary {
                return Some((marker, at));
            }
            from = at + needle.len();
        }
    }

    None
}

fn trim_fragment(s: &str) -> &str {
    s.trim().trim_matches(FRAGMENT_TRIM).trim()
}
