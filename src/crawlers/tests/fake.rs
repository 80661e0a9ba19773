use crate::config::HarvestConfig;
use crate::crawlers::renderer::Renderer;
use crate::crawlers::scripts;
use crate::error::RenderError;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;
use tokio::time::Instant;

/// How a scripted item page behaves
pub enum ItemPage {
    Fields(Value),
    Hang,
    NavigationFails,
    ScriptFails,
}

/// In-memory renderer that replays canned catalog and item pages
#[derive(Default)]
pub struct FakeRenderer {
    catalog: HashMap<String, Vec<String>>,
    link_script_fails: HashSet<String>,
    sources: HashMap<String, String>,
    items: HashMap<String, ItemPage>,
    failing_navigations: HashSet<String>,
    anchor_counts: VecDeque<u64>,
    current: Option<String>,
    pub navigations: Vec<String>,
    pub scrolls: usize,
    pub strategy_args: Vec<Value>,
    pub closed: bool,
}

impl FakeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog_page(mut self, page: u32, hrefs: &[&str]) -> Self {
        self.catalog
            .insert(page_url(page), hrefs.iter().map(|h| h.to_string()).collect());
        self
    }

    /// Catalog page whose link script throws; the source is served instead
    pub fn catalog_source(mut self, page: u32, html: &str) -> Self {
        self.link_script_fails.insert(page_url(page));
        self.sources.insert(page_url(page), html.to_string());
        self
    }

    pub fn failing_navigation(mut self, url: &str) -> Self {
        self.failing_navigations.insert(url.to_string());
        self
    }

    pub fn anchor_counts(mut self, counts: &[u64]) -> Self {
        self.anchor_counts = counts.iter().copied().collect();
        self
    }

    pub fn item(mut self, url: &str, page: ItemPage) -> Self {
        self.items.insert(url.to_string(), page);
        self
    }

    /// Item page returning a complete, well-formed field map
    pub fn good_item(self, url: &str, name: &str) -> Self {
        self.item(
            url,
            ItemPage::Fields(json!({
                "name": name,
                "description": "A phone",
                "image": "https://img.shop.test/p.jpg",
                "price": "Rp1.000.000",
                "rating": "4.8 (1,204)",
                "merchant": "Toko A"
            })),
        )
    }

    fn current_url(&self) -> String {
        self.current.clone().unwrap_or_default()
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        self.navigations.push(url.to_string());
        self.current = Some(url.to_string());

        let hang = matches!(self.items.get(url), Some(ItemPage::Hang));
        if hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }

        let fails = self.failing_navigations.contains(url)
            || matches!(self.items.get(url), Some(ItemPage::NavigationFails));
        if fails {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }
        Ok(())
    }

    async fn wait_ready(&mut self, _selector: &str, _timeout: Duration) -> Result<(), RenderError> {
        Ok(())
    }

    async fn evaluate(&mut self, script: &str, args: Vec<Value>) -> Result<Value, RenderError> {
        let url = self.current_url();

        if script == scripts::SCROLL_VIEWPORT {
            self.scrolls += 1;
            Ok(Value::Null)
        } else if script == scripts::SCROLL_ITEM_INTRO || script == scripts::SCROLL_ITEM_BODY {
            Ok(Value::Null)
        } else if script == scripts::COUNT_ANCHORS {
            Ok(json!(self.anchor_counts.pop_front().unwrap_or(0)))
        } else if script == scripts::COLLECT_LINKS {
            if self.link_script_fails.contains(&url) {
                return Err(RenderError::Script("TypeError: nodes is null".to_string()));
            }
            Ok(json!(self.catalog.get(&url).cloned().unwrap_or_default()))
        } else if script == scripts::EXTRACT_FIELDS {
            self.strategy_args.extend(args);
            match self.items.get(&url) {
                Some(ItemPage::Fields(fields)) => Ok(fields.clone()),
                _ => Err(RenderError::Script("javascript error".to_string())),
            }
        } else {
            Err(RenderError::Script(format!("unexpected script: {}", script)))
        }
    }

    async fn page_source(&mut self) -> Result<String, RenderError> {
        let url = self.current_url();
        self.sources
            .get(&url)
            .cloned()
            .ok_or_else(|| RenderError::Script("no source".to_string()))
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.closed = true;
        Ok(())
    }
}

pub const TEMPLATE: &str = "https://shop.test/p/phones?page={page}";

pub fn page_url(page: u32) -> String {
    TEMPLATE.replace("{page}", &page.to_string())
}

pub fn item_url(path: &str) -> String {
    format!("https://shop.test{}", path)
}

/// Small, fast configuration for scripted runs
pub fn test_config() -> HarvestConfig {
    let mut config = HarvestConfig::new(TEMPLATE);
    config.target_count = 10;
    config.max_pages = 3;
    config.scrolls_per_page = 2;
    config.wait_per_scroll_ms = 100;
    config.settle_after_navigate_ms = 200;
    config.per_item_deadline_secs = 45;
    config
}

pub fn far_deadline() -> Instant {
    Instant::now() + Duration::from_secs(24 * 3600)
}
