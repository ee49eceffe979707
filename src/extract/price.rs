use crate::rules::{CompiledPrice, PriceCandidate, PriceToken};
use scraper::{ElementRef, Html};

/// First valid price among the configured candidates
///
/// Candidates are tried in order; within a candidate every matching element
/// is tried in document order. A text is valid when it starts with the
/// currency marker.
pub(crate) fn select_price(
    document: &Html,
    compiled: &[CompiledPrice],
    candidates: &[PriceCandidate],
    currency_marker: &str,
) -> Option<String> {
    compiled
        .iter()
        .zip(candidates)
        .find_map(|(price, candidate)| {
            document.select(&price.selector).find_map(|el| {
                let text = candidate_text(el, price, candidate.attribute.as_deref());
                pick_token(&text, candidate.token)
                    .filter(|t| is_valid_price(t, currency_marker))
                    .map(str::to_string)
            })
        })
}

/// Returns true when `text` reads as a price in the rule set's currency
pub fn is_valid_price(text: &str, currency_marker: &str) -> bool {
    let text = text.trim();
    text.len() > currency_marker.len() && text.starts_with(currency_marker)
}

fn candidate_text(el: ElementRef<'_>, price: &CompiledPrice, attribute: Option<&str>) -> String {
    if let Some(attr) = attribute {
        return el.value().attr(attr).unwrap_or_default().to_string();
    }

    let mut text: String = el.text().collect();
    for strip in &price.strip {
        for child in el.select(strip) {
            let noise: String = child.text().collect();
            if !noise.is_empty() {
                text = text.replacen(&noise, "", 1);
            }
        }
    }
    text
}

fn pick_token(text: &str, token: PriceToken) -> Option<&str> {
    let picked = match token {
        PriceToken::Whole => Some(text.trim()),
        PriceToken::FirstLine => text.lines().map(str::trim).find(|l| !l.is_empty()),
        PriceToken::LastField => text.split_whitespace().last(),
    };
    picked.filter(|t| !t.is_empty())
}
