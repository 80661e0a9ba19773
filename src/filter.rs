use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for filtering collected item links
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkFilterConfig {
    /// Only keep links on the same host as the catalog page they were found on
    #[serde(default)]
    pub same_host_only: bool,

    /// Regex patterns for links to keep (if empty, all links are kept unless excluded)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for links to drop (these take precedence over include patterns)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

/// Link filter that uses regex patterns and host scope to decide which item links to keep
#[derive(Debug, Default)]
pub struct LinkFilter {
    same_host_only: bool,
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl LinkFilter {
    /// Create a new link filter from configuration
    pub fn new(config: &LinkFilterConfig) -> Result<Self, regex::Error> {
        let include_regexes = config
            .include_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = config
            .exclude_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            same_host_only: config.same_host_only,
            include_regexes,
            exclude_regexes,
        })
    }

    /// Determine if a normalized item link should be kept
    pub fn accepts(&self, link: &Url, catalog_page: &Url) -> bool {
        if self.same_host_only && link.host_str() != catalog_page.host_str() {
            return false;
        }

        let link_str = link.as_str();
        if self.exclude_regexes.iter().any(|r| r.is_match(link_str)) {
            return false;
        }

        self.include_regexes.is_empty() || self.include_regexes.iter().any(|r| r.is_match(link_str))
    }
}
