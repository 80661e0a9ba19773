use catalog_harvest::{Harvest, HarvestConfig, HarvestError};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(about = "Collects item links from a paginated catalog and extracts item details to CSV")]
#[command(version)]
pub struct Args {
    /// Path to a JSON harvest configuration (built-in defaults when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Number of unique item links to collect
    #[arg(short, long)]
    pub target: Option<usize>,

    /// Maximum number of catalog pages to visit
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// WebDriver server URL
    #[arg(long)]
    pub webdriver_url: Option<String>,
}

impl Args {
    /// Build the harvest from the config file (if any) with command-line overrides applied
    pub fn into_harvest(self) -> Result<Harvest, HarvestError> {
        let mut harvest = match &self.config {
            Some(path) => Harvest::from_config_file(path)?,
            None => Harvest::new(HarvestConfig::default()),
        };

        if let Some(output) = self.output {
            harvest = harvest.with_output_path(output);
        }
        if let Some(target) = self.target {
            harvest = harvest.with_target_count(target);
        }
        if let Some(max_pages) = self.max_pages {
            harvest = harvest.with_max_pages(max_pages);
        }
        if let Some(url) = self.webdriver_url {
            harvest = harvest.with_webdriver_url(url);
        }

        Ok(harvest)
    }
}
