use crate::classify::DIRECT_IMAGE_SUFFIXES;
use scraper::{ElementRef, Html, Selector};

// The product site's designated primary image element and the attributes it
// hides the full-size URL behind. All of this tracks third-party markup and
// breaks when that markup changes; callers treat a miss as "no image found".
const LANDING_IMAGE_SELECTOR: &str = "img#landingImage";
const HIGH_RES_ATTR: &str = "data-old-hires";
const DYNAMIC_IMAGE_MAP_ATTR: &str = "data-a-dynamic-image";
const FALLBACK_SIZE_MARKER: &str = "SL1500";

/// Best-guess main product image URL for a product page, or `None`.
///
/// Strategies are tried in order, first hit wins: the landing image's
/// high-res override attribute, its dynamic image map, its plain `src`, and
/// finally a whole-page scan for the first large-looking `img`. The fallback
/// may well return a thumbnail; its result is not validated.
pub fn resolve_main_image(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let strategies: &[fn(&Html) -> Option<String>] = &[
        landing_image_high_res,
        landing_image_dynamic_map,
        landing_image_src,
        first_large_page_image,
    ];
    strategies.iter().find_map(|strategy| strategy(&document))
}

fn landing_image(document: &Html) -> Option<ElementRef<'_>> {
    let selector = Selector::parse(LANDING_IMAGE_SELECTOR).expect("landing image selector");
    document.select(&selector).next()
}

fn landing_image_high_res(document: &Html) -> Option<String> {
    let value = landing_image(document)?.value().attr(HIGH_RES_ATTR)?;
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn landing_image_dynamic_map(document: &Html) -> Option<String> {
    let raw = landing_image(document)?.value().attr(DYNAMIC_IMAGE_MAP_ATTR)?;
    first_dynamic_map_url(raw)
}

// The attribute value is a JSON object mapping candidate URLs to [w, h]
// pairs; the first key in insertion order is the one the page shows.
// Malformed JSON falls through to the next strategy.
fn first_dynamic_map_url(raw: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    value.as_object()?.keys().next().cloned()
}

fn landing_image_src(document: &Html) -> Option<String> {
    let value = landing_image(document)?.value().attr("src")?;
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn first_large_page_image(document: &Html) -> Option<String> {
    let selector = Selector::parse("img").expect("img selector");
    for img in document.select(&selector) {
        let Some(src) = img.value().attr("src") else {
            continue;
        };
        if src.contains(FALLBACK_SIZE_MARKER) || has_image_suffix(src) {
            return Some(src.to_string());
        }
    }
    None
}

fn has_image_suffix(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    DIRECT_IMAGE_SUFFIXES
        .iter()
        .any(|suffix| lower.ends_with(suffix))
}
