use crate::rules::CompiledBrand;
use scraper::Html;

/// Looks up the brand according to the rule set's strategy
///
/// A brand that cannot be found is the empty string. Returns None when the
/// brand token rejects the page as a non-product.
pub(crate) fn extract_brand(
    document: &Html,
    html: &str,
    title: &str,
    rule: &CompiledBrand,
) -> Option<String> {
    let brand = match rule {
        CompiledBrand::None => None,
        CompiledBrand::Pattern(regex) => regex
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string()),
        CompiledBrand::LabeledToken {
            selector,
            label,
            offset,
            trim,
        } => {
            let text = document
                .select(selector)
                .flat_map(|el| el.text())
                .collect::<Vec<_>>()
                .join(" ");
            labeled_token(&text, label, *offset, trim)
        }
        CompiledBrand::TitleToken {
            index,
            reject_chars,
        } => {
            let token = title.split_whitespace().nth(*index);
            if token.is_some_and(|t| t.contains(|c: char| reject_chars.contains(c))) {
                return None;
            }
            token.map(str::to_string)
        }
    };

    Some(brand.map(|b| b.trim().to_string()).unwrap_or_default())
}

/// Token `offset` positions after the last occurrence of `label`
fn labeled_token(text: &str, label: &str, offset: usize, trim: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let at = tokens.iter().rposition(|t| t.trim_matches(is_trim_char(trim)) == label)?;
    let token = tokens.get(at + offset)?;
    let token = token.trim_matches(is_trim_char(trim));
    (!token.is_empty()).then(|| token.to_string())
}

fn is_trim_char(trim: &str) -> impl Fn(char) -> bool + '_ {
    move |c| trim.contains(c)
}
