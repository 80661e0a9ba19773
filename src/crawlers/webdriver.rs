use crate::config::HarvestConfig;
use crate::crawlers::renderer::Renderer;
use crate::error::{HarvestError, RenderError};
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use serde_json::{Map, Value, json};
use std::time::Duration;

/// Endpoints tried when the configured WebDriver URL refuses the session
const FALLBACK_WEBDRIVER_URLS: [&str; 2] = [
    "http://localhost:9515", // ChromeDriver default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Chrome session driven over WebDriver
pub struct WebDriverRenderer {
    client: Client,
}

impl WebDriverRenderer {
    /// Start a browser session presenting the configured identity
    pub async fn connect(config: &HarvestConfig) -> Result<Self, HarvestError> {
        let caps = capabilities(config);

        match open_session(&config.webdriver_url, &caps).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", config.webdriver_url);
                return Ok(Self { client });
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    config.webdriver_url,
                    e
                );
            }
        }

        for url in FALLBACK_WEBDRIVER_URLS {
            if url == config.webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = open_session(url, &caps).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(Self { client });
            }
        }

        Err(HarvestError::Session(format!(
            "no WebDriver server accepted a session (tried {} and fallbacks); \
             make sure a WebDriver server such as chromedriver is running",
            config.webdriver_url
        )))
    }
}

async fn open_session(
    url: &str,
    caps: &Map<String, Value>,
) -> Result<Client, fantoccini::error::NewSessionError> {
    let mut builder = ClientBuilder::native();
    builder.capabilities(caps.clone());
    builder.connect(url).await
}

/// W3C capabilities for Chrome with identity spoofing and window flags
fn capabilities(config: &HarvestConfig) -> Map<String, Value> {
    let mut args = vec![
        format!("--user-agent={}", config.identity),
        "--disable-http2".to_string(),
        "--no-sandbox".to_string(),
        "--disable-gpu".to_string(),
        "--start-maximized".to_string(),
    ];
    if config.headless {
        args.push("--headless=new".to_string());
    }

    let mut caps = Map::new();
    caps.insert("browserName".to_string(), json!("chrome"));
    caps.insert("goog:chromeOptions".to_string(), json!({ "args": args }));
    caps
}

/// Separates lost sessions from ordinary command failures
fn classify(error: CmdError, otherwise: impl FnOnce(String) -> RenderError) -> RenderError {
    let message = error.to_string();
    if message.contains("Unable to find session") || message.contains("invalid session id") {
        RenderError::Session(message)
    } else {
        otherwise(message)
    }
}

#[async_trait]
impl Renderer for WebDriverRenderer {
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError> {
        self.client.goto(url).await.map_err(|e| {
            classify(e, |reason| RenderError::Navigation {
                url: url.to_string(),
                reason,
            })
        })
    }

    async fn wait_ready(&mut self, selector: &str, timeout: Duration) -> Result<(), RenderError> {
        self.client
            .wait()
            .at_most(timeout)
            .for_element(Locator::Css(selector))
            .await
            .map(|_| ())
            .map_err(|e| {
                classify(e, |reason| RenderError::NotReady {
                    selector: selector.to_string(),
                    reason,
                })
            })
    }

    async fn evaluate(&mut self, script: &str, args: Vec<Value>) -> Result<Value, RenderError> {
        self.client
            .execute(script, args)
            .await
            .map_err(|e| classify(e, RenderError::Script))
    }

    async fn page_source(&mut self) -> Result<String, RenderError> {
        self.client
            .source()
            .await
            .map_err(|e| classify(e, RenderError::Script))
    }

    async fn close(&mut self) -> Result<(), RenderError> {
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| RenderError::Session(e.to_string()))
    }
}
