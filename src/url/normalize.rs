use url::Url;

/// Schemes that never lead to a fetchable resource
const NON_NAVIGABLE_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:", "data:"];

/// Resolves a link href against the page it appeared on
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty hrefs
/// 2. Reject `mailto:`, `tel:`, `javascript:` and `data:` references
/// 3. Resolve against the page URL per RFC 3986
/// 4. Reject anything that is not http(s) after resolution
/// 5. Remove the fragment; fragments never distinguish crawl targets
///
/// # Arguments
///
/// * `href` - The raw attribute value
/// * `page_url` - The URL the page was fetched from
///
/// # Returns
///
/// * `Some(Url)` - Absolute, fragment-free URL
/// * `None` - The reference should be ignored
///
/// # Examples
///
/// ```
/// use doc_harvest::url::normalize_link;
/// use url::Url;
///
/// let page = Url::parse("https://example.com/ref/index.html").unwrap();
/// let url = normalize_link("a.pdf#page=2", &page).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/ref/a.pdf");
/// ```
pub fn normalize_link(href: &str, page_url: &Url) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if NON_NAVIGABLE_SCHEMES
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let mut absolute = page_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }

    strip_fragment(&mut absolute);
    Some(absolute)
}

/// Removes the fragment component in place
pub fn strip_fragment(url: &mut Url) {
    url.set_fragment(None);
}
