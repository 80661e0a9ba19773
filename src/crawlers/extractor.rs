use crate::config::HarvestConfig;
use crate::crawlers::renderer::Renderer;
use crate::crawlers::scripts;
use crate::error::{HarvestError, RenderError};
use crate::politeness::Politeness;
use crate::results::{ItemLink, ItemRecord, RawItemFields};
use serde_json::Value;
use std::time::Duration;

/// Scroll positions visited on an item page, each followed by a settle pause
const ITEM_SCROLL_STEPS: [(&str, Duration); 2] = [
    (scripts::SCROLL_ITEM_INTRO, Duration::from_millis(800)),
    (scripts::SCROLL_ITEM_BODY, Duration::from_millis(1000)),
];

/// Loads item pages and turns them into records
pub struct DetailExtractor<'a> {
    config: &'a HarvestConfig,
    strategies: Value,
}

impl<'a> DetailExtractor<'a> {
    pub fn new(config: &'a HarvestConfig) -> Result<Self, HarvestError> {
        let strategies = serde_json::to_value(&config.fields)?;
        Ok(Self { config, strategies })
    }

    /// Extract one item under its own deadline, falling back to a placeholder record
    ///
    /// Never fails. The caller follows up with [`pause_after`](Self::pause_after) once
    /// the record has been persisted.
    pub async fn extract<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        link: &ItemLink,
        per_item_deadline: Duration,
    ) -> ItemRecord {
        let attempt = tokio::time::timeout(per_item_deadline, self.read_fields(renderer, link));

        match attempt.await {
            Ok(Ok(raw)) => ItemRecord::from_raw(&raw, link),
            Ok(Err(e)) => {
                ::log::warn!("error extracting {} : {} (writing fallback row)", link, e);
                ItemRecord::fallback(link)
            }
            Err(_) => {
                let e = RenderError::Timeout(per_item_deadline);
                ::log::warn!("error extracting {} : {} (writing fallback row)", link, e);
                ItemRecord::fallback(link)
            }
        }
    }

    /// Politeness pause sized by whether the record is a fallback
    pub async fn pause_after(&self, politeness: &mut Politeness, record: &ItemRecord) {
        let range = if record.is_fallback() {
            self.config.failure_delay
        } else {
            self.config.item_delay
        };
        politeness.pause(range).await;
    }

    async fn read_fields<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        link: &ItemLink,
    ) -> Result<RawItemFields, RenderError> {
        renderer.navigate(link.as_str()).await?;
        tokio::time::sleep(self.config.settle_after_navigate()).await;

        if let Err(e) = renderer
            .wait_ready("body", self.config.ready_timeout())
            .await
        {
            ::log::debug!("{} not ready: {} (extracting anyway)", link, e);
        }

        for (script, pause) in ITEM_SCROLL_STEPS {
            renderer.evaluate(script, vec![]).await?;
            tokio::time::sleep(pause).await;
        }

        let value = renderer
            .evaluate(scripts::EXTRACT_FIELDS, vec![self.strategies.clone()])
            .await?;
        ::log::trace!("Raw fields for {}: {}", link, value);

        Ok(RawItemFields::from_value(&value))
    }
}
