use std::time::Duration;
use thiserror::Error;

/// Errors raised by a page renderer call
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("deadline of {0:?} expired")]
    Timeout(Duration),

    #[error("readiness wait for '{selector}' failed: {reason}")]
    NotReady { selector: String, reason: String },

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("renderer session lost: {0}")]
    Session(String),
}

/// Errors raised while writing records to the output
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("output I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV encoding error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors that end a harvest run
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("could not parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("could not read configuration: {0}")]
    ConfigRead(#[from] std::io::Error),

    #[error("invalid link filter pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("could not create output sink: {0}")]
    Sink(#[from] SinkError),

    #[error("could not start a renderer session: {0}")]
    Session(String),

    #[error("no item links found after visiting {pages} catalog page(s)")]
    NoLinks { pages: u32 },
}
