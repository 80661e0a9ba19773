use scraper::{Html, Selector};

/// Collects `href` values from page source using the first selector that matches any element
///
/// Mirrors the in-page link script for when script evaluation is unavailable: once a
/// selector matches, later selectors are not tried even if the matches carry no usable
/// `href`. Invalid selectors are skipped.
pub fn anchor_hrefs(html: &str, selectors: &[&str]) -> Vec<String> {
    let doc = Html::parse_document(html);

    for raw in selectors {
        let selector = match Selector::parse(raw) {
            Ok(selector) => selector,
            Err(e) => {
                ::log::warn!("Skipping invalid link selector '{}': {}", raw, e);
                continue;
            }
        };

        let matched: Vec<_> = doc.select(&selector).collect();
        if matched.is_empty() {
            continue;
        }

        let hrefs = matched
            .iter()
            .filter_map(|e| e.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .map(str::to_string)
            .collect::<Vec<String>>();

        ::log::debug!(
            "Page source matched {} anchors ({} with href) for selector '{}'",
            matched.len(),
            hrefs.len(),
            raw
        );
        return hrefs;
    }

    Vec::new()
}
