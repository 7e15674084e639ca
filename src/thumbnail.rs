//! Best-effort thumbnail extraction from HTML snippets.

use crate::models::PLACEHOLDER_IMAGE;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static IMG_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img[src]").expect("valid selector"));

/// Return the `src` of the first `<img>` in `html`, or [`PLACEHOLDER_IMAGE`].
///
/// The HTML parser is lenient, so malformed input simply yields no image.
pub fn extract_thumbnail(html: &str) -> String {
    if html.trim().is_empty() {
        return PLACEHOLDER_IMAGE.to_string();
    }
    let fragment = Html::parse_fragment(html);
    fragment
        .select(&IMG_SELECTOR)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string())
}
