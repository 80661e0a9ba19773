use crate::config::HarvestConfig;
use crate::crawlers::renderer::{Renderer, settle, within};
use crate::crawlers::scripts;
use crate::error::HarvestError;
use crate::filter::LinkFilter;
use crate::parsers::html;
use crate::politeness::Politeness;
use crate::results::ItemLink;
use serde_json::{Value, json};
use std::collections::HashSet;
use tokio::time::Instant;
use url::Url;

/// What happened to a link offered to the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Added,
    Duplicate,
    TargetReached,
}

/// Dedup set and ordered output for one collection run
#[derive(Debug)]
pub struct CollectionState {
    target: usize,
    seen: HashSet<ItemLink>,
    links: Vec<ItemLink>,
    page: u32,
    pages_visited: u32,
    duplicates: usize,
    rejected: usize,
}

impl CollectionState {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            seen: HashSet::new(),
            links: Vec::with_capacity(target),
            page: 0,
            pages_visited: 0,
            duplicates: 0,
            rejected: 0,
        }
    }

    /// Add `link` unless it was seen before or the target is already met
    pub fn offer(&mut self, link: ItemLink) -> Offer {
        if self.is_full() {
            return Offer::TargetReached;
        }
        if self.seen.contains(&link) {
            self.duplicates += 1;
            return Offer::Duplicate;
        }
        self.seen.insert(link.clone());
        self.links.push(link);
        Offer::Added
    }

    pub fn is_full(&self) -> bool {
        self.links.len() >= self.target
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    fn begin_page(&mut self, page: u32) {
        self.page = page;
        self.pages_visited += 1;
    }

    fn reject(&mut self) {
        self.rejected += 1;
    }

    /// Ordered links, never more than the target
    pub fn into_links(mut self) -> Vec<ItemLink> {
        self.links.truncate(self.target);
        self.links
    }
}

/// Result of link discovery
#[derive(Debug)]
pub struct Collection {
    pub links: Vec<ItemLink>,
    pub pages_visited: u32,
    pub deadline_hit: bool,
}

/// Walks catalog pages and gathers item links in discovery order
pub struct LinkCollector<'a> {
    config: &'a HarvestConfig,
    filter: LinkFilter,
}

impl<'a> LinkCollector<'a> {
    pub fn new(config: &'a HarvestConfig) -> Result<Self, HarvestError> {
        let filter = LinkFilter::new(&config.link_filter)?;
        Ok(Self { config, filter })
    }

    /// Collect up to `target_count` unique links from at most `max_pages` catalog pages
    ///
    /// Page-level failures are logged and skipped. Finding nothing at all is fatal.
    pub async fn collect<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        politeness: &mut Politeness,
        deadline: Instant,
    ) -> Result<Collection, HarvestError> {
        let config = self.config;
        let mut state = CollectionState::new(config.target_count);
        let mut deadline_hit = false;

        ::log::info!("Collecting item links from catalog pages...");

        let mut page = 1;
        'pages: while !state.is_full() && page <= config.max_pages {
            if Instant::now() >= deadline {
                ::log::warn!("Run deadline reached during link collection at page {}", page);
                deadline_hit = true;
                break;
            }

            let page_url = config.page_url(page);
            let base = Url::parse(&page_url).map_err(|e| {
                HarvestError::Config(format!("catalog page URL '{}' is invalid: {}", page_url, e))
            })?;
            state.begin_page(page);
            ::log::info!("-> load page {} : {}", page, page_url);

            self.load_page(renderer, page, &page_url, deadline).await;

            for href in self.page_links(renderer, page, deadline).await {
                let Some(link) = ItemLink::normalize(&href, &base) else {
                    ::log::trace!("Ignoring unusable href: {:?}", href);
                    continue;
                };
                if !self.filter.accepts(link.url(), &base) {
                    ::log::debug!("Link filter rejected: {}", link);
                    state.reject();
                    continue;
                }
                match state.offer(link) {
                    Offer::TargetReached => break 'pages,
                    Offer::Duplicate => {}
                    Offer::Added => {}
                }
            }

            ::log::info!("After page {}: collected total links = {}", page, state.len());

            page += 1;
            if !state.is_full() && page <= config.max_pages {
                let _ = tokio::time::timeout_at(deadline, politeness.pause(config.page_delay)).await;
            }
        }

        ::log::debug!(
            "Collection finished on page {} with {} duplicate(s) and {} filtered link(s)",
            state.page,
            state.duplicates,
            state.rejected
        );

        let pages_visited = state.pages_visited;
        if state.is_empty() {
            return Err(HarvestError::NoLinks {
                pages: pages_visited,
            });
        }

        Ok(Collection {
            links: state.into_links(),
            pages_visited,
            deadline_hit,
        })
    }

    /// Navigate, wait for the body, then scroll to trigger lazy loading; failures are logged only
    async fn load_page<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        page: u32,
        page_url: &str,
        deadline: Instant,
    ) {
        let config = self.config;

        if let Err(e) = within(deadline, renderer.navigate(page_url)).await {
            ::log::warn!("navigate page {} error: {} (continue)", page, e);
        }
        settle(config.settle_after_navigate(), deadline).await;

        if let Err(e) = within(deadline, renderer.wait_ready("body", config.ready_timeout())).await {
            ::log::warn!("page {} not ready: {} (continue)", page, e);
        }

        let selectors = json!(config.link_selectors.chain());
        let mut last_count: Option<u64> = None;
        for cycle in 0..config.scrolls_per_page {
            if Instant::now() >= deadline {
                break;
            }
            if let Err(e) = within(deadline, renderer.evaluate(scripts::SCROLL_VIEWPORT, vec![])).await {
                ::log::warn!("scroll error on page {}: {}", page, e);
            }
            settle(config.wait_per_scroll(), deadline).await;

            if config.stabilize_scrolling {
                let count = within(
                    deadline,
                    renderer.evaluate(scripts::COUNT_ANCHORS, vec![selectors.clone()]),
                )
                .await
                .ok()
                .and_then(|v| v.as_u64());

                if count.is_some() && count == last_count {
                    ::log::debug!(
                        "Page {} stable at {:?} anchors after {} scroll(s)",
                        page,
                        count,
                        cycle + 1
                    );
                    break;
                }
                last_count = count;
            }
        }
    }

    /// Candidate hrefs from the link script, or from the page source if the script fails
    async fn page_links<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        page: u32,
        deadline: Instant,
    ) -> Vec<String> {
        let chain = self.config.link_selectors.chain();

        match within(
            deadline,
            renderer.evaluate(scripts::COLLECT_LINKS, vec![json!(chain)]),
        )
        .await
        {
            Ok(Value::Array(values)) => {
                let hrefs: Vec<String> = values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect();
                ::log::debug!("Link script returned {} href(s) on page {}", hrefs.len(), page);
                return hrefs;
            }
            Ok(other) => {
                ::log::warn!(
                    "collect links on page {} returned {} instead of a list",
                    page,
                    type_name(&other)
                );
            }
            Err(e) => {
                ::log::warn!("collect links eval error page {}: {}", page, e);
            }
        }

        match within(deadline, renderer.page_source()).await {
            Ok(source) => {
                let hrefs = html::anchor_hrefs(&source, &chain);
                ::log::info!(
                    "Recovered {} href(s) from page {} source",
                    hrefs.len(),
                    page
                );
                hrefs
            }
            Err(e) => {
                ::log::warn!("page {} source unavailable: {} (skipping page)", page, e);
                Vec::new()
            }
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(path: &str) -> ItemLink {
        let base = Url::parse("https://shop.test/p/phones").unwrap();
        ItemLink::normalize(path, &base).unwrap()
    }

    #[test]
    fn test_first_seen_wins() {
        let mut state = CollectionState::new(10);
        assert_eq!(state.offer(link("/s/a")), Offer::Added);
        assert_eq!(state.offer(link("/s/b")), Offer::Added);
        assert_eq!(state.offer(link("/s/a?ref=2")), Offer::Duplicate);
        assert_eq!(state.offer(link("/s/c")), Offer::Added);

        let links: Vec<String> = state.into_links().iter().map(|l| l.to_string()).collect();
        assert_eq!(
            links,
            vec![
                "https://shop.test/s/a",
                "https://shop.test/s/b",
                "https://shop.test/s/c"
            ]
        );
    }

    #[test]
    fn test_target_reached_refuses_more() {
        let mut state = CollectionState::new(2);
        state.offer(link("/s/a"));
        state.offer(link("/s/b"));
        assert!(state.is_full());
        assert_eq!(state.offer(link("/s/c")), Offer::TargetReached);
        // Even a duplicate is refused once full
        assert_eq!(state.offer(link("/s/a")), Offer::TargetReached);
        assert_eq!(state.into_links().len(), 2);
    }

    #[test]
    fn test_counters() {
        let mut state = CollectionState::new(5);
        state.begin_page(1);
        state.offer(link("/s/a"));
        state.offer(link("/s/a"));
        state.reject();
        state.begin_page(2);

        assert_eq!(state.page, 2);
        assert_eq!(state.pages_visited, 2);
        assert_eq!(state.duplicates, 1);
        assert_eq!(state.rejected, 1);
        assert!(!state.is_empty());
    }
}
