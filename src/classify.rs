pub(crate) const DIRECT_IMAGE_SUFFIXES: &[&str] = &[".jpg", ".jpeg", ".png", ".webp"];

const PRODUCT_PAGE_MARKER: &str = "amazon.";

/// How a row's URL will be handled. A closed set: either the URL is itself
/// an image, or it is a product page we scrape for one, or we skip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifiedUrl<'a> {
    DirectImage(&'a str),
    ProductPage(&'a str),
    Unsupported(&'a str),
}

/// Pure string inspection, no network. The direct-image suffix check runs
/// before the product-page marker check, so an image hosted on the product
/// site still counts as a direct link.
pub fn classify(url: &str) -> ClassifiedUrl<'_> {
    let lower = url.to_ascii_lowercase();
    if DIRECT_IMAGE_SUFFIXES
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return ClassifiedUrl::DirectImage(url);
    }
    if url.contains(PRODUCT_PAGE_MARKER) {
        return ClassifiedUrl::ProductPage(url);
    }
    ClassifiedUrl::Unsupported(url)
}
