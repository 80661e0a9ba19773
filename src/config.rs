use crate::error::HarvestError;
use crate::filter::LinkFilterConfig;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Placeholder substituted into the catalog URL template
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Configuration for a catalog harvest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Catalog page URL with a `{page}` placeholder for the 1-based page index
    #[serde(default = "default_catalog_url_template")]
    pub catalog_url_template: String,

    /// Stop discovering once this many unique item links are found
    #[serde(default = "default_target_count")]
    pub target_count: usize,

    /// Hard cap on catalog pages visited
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Lazy-load scroll repetitions per catalog page
    #[serde(default = "default_scrolls_per_page")]
    pub scrolls_per_page: u32,

    /// Settle delay after each catalog scroll, in milliseconds
    #[serde(default = "default_wait_per_scroll_ms")]
    pub wait_per_scroll_ms: u64,

    /// Stop scrolling a catalog page early once the anchor count stops growing
    #[serde(default)]
    pub stabilize_scrolling: bool,

    /// Overall wall-clock budget for the run, in seconds
    #[serde(default = "default_run_deadline_secs")]
    pub run_deadline_secs: u64,

    /// Wall-clock budget for a single item page, in seconds
    #[serde(default = "default_per_item_deadline_secs")]
    pub per_item_deadline_secs: u64,

    /// Bounded wait for the document body after navigation, in milliseconds
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,

    /// Pause after navigation before checking readiness, in milliseconds
    #[serde(default = "default_settle_after_navigate_ms")]
    pub settle_after_navigate_ms: u64,

    /// Client identity (user agent) presented to the target site
    #[serde(default = "default_identity")]
    pub identity: String,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Path of the delimited output file
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Politeness pause between catalog pages
    #[serde(default = "default_page_delay")]
    pub page_delay: DelayRange,

    /// Politeness pause after a successfully extracted item
    #[serde(default = "default_item_delay")]
    pub item_delay: DelayRange,

    /// Politeness pause after an item that produced a fallback record
    #[serde(default = "default_failure_delay")]
    pub failure_delay: DelayRange,

    /// Anchor selectors used to find item links on catalog pages
    #[serde(default)]
    pub link_selectors: LinkSelectors,

    /// Which collected links are kept
    #[serde(default)]
    pub link_filter: LinkFilterConfig,

    /// Ordered extraction strategies per item field
    #[serde(default)]
    pub fields: FieldStrategies,
}

/// Half-open millisecond interval `[min_ms, max_ms)` for randomized pauses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }
}

/// Primary anchor selector plus fallbacks tried in order when it matches nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSelectors {
    pub primary: String,
    #[serde(default)]
    pub fallbacks: Vec<String>,
}

impl LinkSelectors {
    /// All selectors in the order they are tried
    pub fn chain(&self) -> Vec<&str> {
        std::iter::once(self.primary.as_str())
            .chain(self.fallbacks.iter().map(String::as_str))
            .collect()
    }
}

impl Default for LinkSelectors {
    fn default() -> Self {
        Self {
            primary: r#"a[data-testid="lnkProductContainer"]"#.to_string(),
            fallbacks: vec![r#"a[href*="/p/"], a[href*="/product/"]"#.to_string()],
        }
    }
}

/// How a value is read from a matched element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ExtractMode {
    /// Rendered text content of the element
    Text,
    /// Value of a named attribute
    Attribute { name: String },
}

/// One (selector, mode) pair in a field's fallback chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStrategy {
    pub selector: String,
    #[serde(flatten)]
    pub mode: ExtractMode,
}

impl FieldStrategy {
    pub fn text(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            mode: ExtractMode::Text,
        }
    }

    pub fn attribute(selector: &str, name: &str) -> Self {
        Self {
            selector: selector.to_string(),
            mode: ExtractMode::Attribute {
                name: name.to_string(),
            },
        }
    }
}

/// Extraction strategies for every item field, first non-empty result wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStrategies {
    pub name: Vec<FieldStrategy>,
    pub description: Vec<FieldStrategy>,
    pub image: Vec<FieldStrategy>,
    pub price: Vec<FieldStrategy>,
    pub rating: Vec<FieldStrategy>,
    pub merchant: Vec<FieldStrategy>,
}

impl Default for FieldStrategies {
    fn default() -> Self {
        use FieldStrategy as S;
        Self {
            name: vec![
                S::text(r#"h1[data-testid="lblPDPDetailProductName"]"#),
                S::text("h1"),
                S::text(r#"[data-testid="lblPDPTitle"]"#),
                S::text(r#"[data-testid="spnSRPProdName"]"#),
            ],
            description: vec![
                S::text(r#"div[data-testid="lblPDPDesc"]"#),
                S::text(r#"[data-testid="lblPDPDetailProductDesc"]"#),
                S::text("#description"),
                S::text(r#"div[class*="description"]"#),
            ],
            image: vec![
                S::attribute(r#"img[data-testid="PDPImageMain"]"#, "src"),
                S::attribute(r#"img[data-testid="PDPHeroImage"]"#, "src"),
                S::attribute("img", "src"),
            ],
            price: vec![
                S::text(r#"div[data-testid="lblPDPDetailProductPrice"]"#),
                S::text(r#"[data-testid="spnSRPProdPrice"]"#),
                S::text(r#"div[class*="price"]"#),
            ],
            rating: vec![
                S::text(r#"span[data-testid="lblPDPDetailProductRatingNumber"]"#),
                S::text(r#"[data-testid="lblPDPDetailProductRating"]"#),
                S::text(r#"[aria-label*="rating"]"#),
            ],
            merchant: vec![
                S::text(r#"a[data-testid="llbPDPFooterShopName"]"#),
                S::text(r#"a[data-testid="lnkPDPFooterShopName"]"#),
                S::text(r#"[data-testid="spnSRPProdShopName"]"#),
                S::text(r#"a[href*="/shop/"]"#),
                S::text(r#"div[class*="shop"]"#),
            ],
        }
    }
}

fn default_catalog_url_template() -> String {
    "https://www.tokopedia.com/p/handphone-tablet/handphone?page={page}".to_string()
}

fn default_target_count() -> usize {
    100
}

fn default_max_pages() -> u32 {
    50
}

fn default_scrolls_per_page() -> u32 {
    6
}

fn default_wait_per_scroll_ms() -> u64 {
    1100
}

/// 30 minutes
fn default_run_deadline_secs() -> u64 {
    30 * 60
}

fn default_per_item_deadline_secs() -> u64 {
    45
}

fn default_ready_timeout_ms() -> u64 {
    10_000
}

fn default_settle_after_navigate_ms() -> u64 {
    1200
}

fn default_identity() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36".to_string()
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_output_path() -> String {
    "catalog_items.csv".to_string()
}

fn default_page_delay() -> DelayRange {
    DelayRange::new(500, 1200)
}

fn default_item_delay() -> DelayRange {
    DelayRange::new(900, 1900)
}

fn default_failure_delay() -> DelayRange {
    DelayRange::new(700, 1500)
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self::new(&default_catalog_url_template())
    }
}

impl HarvestConfig {
    /// Create a new configuration with default values for the given catalog template
    pub fn new(catalog_url_template: &str) -> Self {
        Self {
            catalog_url_template: catalog_url_template.to_string(),
            target_count: default_target_count(),
            max_pages: default_max_pages(),
            scrolls_per_page: default_scrolls_per_page(),
            wait_per_scroll_ms: default_wait_per_scroll_ms(),
            stabilize_scrolling: false,
            run_deadline_secs: default_run_deadline_secs(),
            per_item_deadline_secs: default_per_item_deadline_secs(),
            ready_timeout_ms: default_ready_timeout_ms(),
            settle_after_navigate_ms: default_settle_after_navigate_ms(),
            identity: default_identity(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            output_path: default_output_path(),
            page_delay: default_page_delay(),
            item_delay: default_item_delay(),
            failure_delay: default_failure_delay(),
            link_selectors: LinkSelectors::default(),
            link_filter: LinkFilterConfig::default(),
            fields: FieldStrategies::default(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, HarvestError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, HarvestError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Reject settings that would make the run meaningless
    pub fn validate(&self) -> Result<(), HarvestError> {
        if self.target_count == 0 {
            return Err(HarvestError::Config("target_count must be at least 1".into()));
        }
        if self.max_pages == 0 {
            return Err(HarvestError::Config("max_pages must be at least 1".into()));
        }
        if self.run_deadline_secs == 0 {
            return Err(HarvestError::Config("run_deadline_secs must be at least 1".into()));
        }
        if self.per_item_deadline_secs == 0 {
            return Err(HarvestError::Config(
                "per_item_deadline_secs must be at least 1".into(),
            ));
        }
        if !self.catalog_url_template.contains(PAGE_PLACEHOLDER) {
            return Err(HarvestError::Config(format!(
                "catalog_url_template must contain {}",
                PAGE_PLACEHOLDER
            )));
        }
        if let Err(e) = url::Url::parse(&self.page_url(1)) {
            return Err(HarvestError::Config(format!(
                "catalog_url_template does not produce a valid URL: {}",
                e
            )));
        }
        if self.link_selectors.primary.trim().is_empty() {
            return Err(HarvestError::Config(
                "link_selectors.primary must not be empty".into(),
            ));
        }
        for (label, range) in [
            ("page_delay", self.page_delay),
            ("item_delay", self.item_delay),
            ("failure_delay", self.failure_delay),
        ] {
            if range.min_ms > range.max_ms {
                return Err(HarvestError::Config(format!(
                    "{label}: min_ms ({}) exceeds max_ms ({})",
                    range.min_ms, range.max_ms
                )));
            }
        }
        Ok(())
    }

    /// Request URL for a 1-based catalog page index
    pub fn page_url(&self, page: u32) -> String {
        self.catalog_url_template
            .replace(PAGE_PLACEHOLDER, &page.to_string())
    }

    pub fn run_deadline(&self) -> Duration {
        Duration::from_secs(self.run_deadline_secs)
    }

    pub fn per_item_deadline(&self) -> Duration {
        Duration::from_secs(self.per_item_deadline_secs)
    }

    pub fn wait_per_scroll(&self) -> Duration {
        Duration::from_millis(self.wait_per_scroll_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    pub fn settle_after_navigate(&self) -> Duration {
        Duration::from_millis(self.settle_after_navigate_ms)
    }
}
