// Re-export modules
pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod parsers;
pub mod politeness;
pub mod results;
pub mod sink;

// Re-export commonly used types for convenience
pub use config::HarvestConfig;
pub use error::HarvestError;
pub use results::{ItemLink, ItemRecord, RunReport};

use crawlers::{Renderer, WebDriverRenderer, run_pipeline};
use politeness::Politeness;
use sink::CsvSink;
use std::path::Path;

/// Builder for a catalog harvest run
pub struct Harvest {
    config: HarvestConfig,
}

impl Harvest {
    /// Create a new Harvest from a full configuration
    pub fn new(config: HarvestConfig) -> Self {
        Self { config }
    }

    /// Load configuration from a JSON file
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, HarvestError> {
        Ok(Self::new(HarvestConfig::from_file(path)?))
    }

    /// Override the number of unique item links to collect
    pub fn with_target_count(mut self, target_count: usize) -> Self {
        self.config.target_count = target_count;
        self
    }

    /// Override the catalog page cap
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Override the output file path
    pub fn with_output_path(mut self, path: impl Into<String>) -> Self {
        self.config.output_path = path.into();
        self
    }

    /// Override the WebDriver URL
    pub fn with_webdriver_url(mut self, url: impl Into<String>) -> Self {
        self.config.webdriver_url = url.into();
        self
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Run the harvest: create the output, open one browser session, collect and extract
    ///
    /// The session is closed on every path once it has been opened.
    pub async fn run(self) -> Result<RunReport, HarvestError> {
        let config = self.config;
        config.validate()?;

        let mut sink = CsvSink::create(&config.output_path)?;
        ::log::info!("Writing records to {}", config.output_path);

        let mut renderer = WebDriverRenderer::connect(&config).await?;
        let mut politeness = Politeness::from_clock();

        let result = run_pipeline(&mut renderer, &mut sink, &config, &mut politeness).await;

        if let Err(e) = renderer.close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }

        result
    }
}
