use crate::parsers::{MISSING_RATING, PLACEHOLDER, normalize_field, normalize_rating};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Header row of the output file
pub const RECORD_HEADER: [&str; 7] = [
    "Name",
    "Description",
    "ImageLink",
    "Price",
    "Rating",
    "Merchant",
    "URL",
];

/// Normalized absolute URL of an item detail page, without query or fragment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemLink(Url);

impl ItemLink {
    /// Resolve `raw` against the page it was found on and strip the query and fragment
    ///
    /// Returns `None` for blank values, unparseable values and non-http(s) schemes.
    pub fn normalize(raw: &str, base: &Url) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let mut url = base.join(raw).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        url.set_query(None);
        url.set_fragment(None);
        Some(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for ItemLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Field values as returned by the page script, before normalization
///
/// `None` marks a field the script did not return as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawItemFields {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Option<String>,
    pub rating: Option<String>,
    pub merchant: Option<String>,
}

impl RawItemFields {
    /// Read the untyped script result; non-object results yield all-missing fields
    pub fn from_value(value: &Value) -> Self {
        let field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            name: field("name"),
            description: field("description"),
            image: field("image"),
            price: field("price"),
            rating: field("rating"),
            merchant: field("merchant"),
        }
    }
}

/// Whether a record came from a successful extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Extracted,
    Fallback,
}

/// One output row: the canonical fields of an item, never empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    name: String,
    description: String,
    image_link: String,
    price: String,
    rating: String,
    merchant_name: String,
    source_url: String,
    outcome: RecordOutcome,
}

impl ItemRecord {
    /// Normalize raw script output into a record for `link`
    pub fn from_raw(raw: &RawItemFields, link: &ItemLink) -> Self {
        Self {
            name: normalize_field(raw.name.as_deref()),
            description: normalize_field(raw.description.as_deref()),
            image_link: normalize_field(raw.image.as_deref()),
            price: normalize_field(raw.price.as_deref()),
            rating: normalize_rating(raw.rating.as_deref()),
            merchant_name: normalize_field(raw.merchant.as_deref()),
            source_url: link.to_string(),
            outcome: RecordOutcome::Extracted,
        }
    }

    /// Placeholder record for a link whose extraction failed
    pub fn fallback(link: &ItemLink) -> Self {
        Self {
            name: PLACEHOLDER.to_string(),
            description: PLACEHOLDER.to_string(),
            image_link: PLACEHOLDER.to_string(),
            price: PLACEHOLDER.to_string(),
            rating: MISSING_RATING.to_string(),
            merchant_name: PLACEHOLDER.to_string(),
            source_url: link.to_string(),
            outcome: RecordOutcome::Fallback,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image_link(&self) -> &str {
        &self.image_link
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn rating(&self) -> &str {
        &self.rating
    }

    pub fn merchant_name(&self) -> &str {
        &self.merchant_name
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn outcome(&self) -> RecordOutcome {
        self.outcome
    }

    pub fn is_fallback(&self) -> bool {
        self.outcome == RecordOutcome::Fallback
    }

    /// Values in `RECORD_HEADER` order
    pub fn row(&self) -> [&str; 7] {
        [
            self.name.as_str(),
            self.description.as_str(),
            self.image_link.as_str(),
            self.price.as_str(),
            self.rating.as_str(),
            self.merchant_name.as_str(),
            self.source_url.as_str(),
        ]
    }
}

/// Summary of a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub pages_visited: u32,
    pub links_discovered: usize,
    pub records_written: usize,
    pub records_failed: usize,
    pub sink_errors: usize,
    pub deadline_hit: bool,
    pub elapsed: Duration,
}

impl RunReport {
    /// Links that were never turned into a record because the run deadline expired
    pub fn links_skipped(&self) -> usize {
        self.links_discovered
            .saturating_sub(self.records_written + self.sink_errors)
    }
}
