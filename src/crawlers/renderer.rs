use crate::error::RenderError;
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// A single browsing session that loads pages and runs scripts in them
///
/// Calls are sequential; one session serves the whole run.
#[async_trait]
pub trait Renderer: Send {
    /// Load `url` in the session
    async fn navigate(&mut self, url: &str) -> Result<(), RenderError>;

    /// Wait at most `timeout` for an element matching `selector`
    async fn wait_ready(&mut self, selector: &str, timeout: Duration) -> Result<(), RenderError>;

    /// Run `script` as a function body with `args` bound to `arguments`
    async fn evaluate(&mut self, script: &str, args: Vec<Value>) -> Result<Value, RenderError>;

    /// Current page source after scripts have run
    async fn page_source(&mut self) -> Result<String, RenderError>;

    /// End the session
    async fn close(&mut self) -> Result<(), RenderError>;
}

/// Run a renderer call, failing with `RenderError::Timeout` once `deadline` passes
pub async fn within<T, F>(deadline: Instant, call: F) -> Result<T, RenderError>
where
    F: Future<Output = Result<T, RenderError>>,
{
    let budget = deadline.saturating_duration_since(Instant::now());
    match tokio::time::timeout_at(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(RenderError::Timeout(budget)),
    }
}

/// Sleep for `delay`, cut short at `deadline`
pub async fn settle(delay: Duration, deadline: Instant) {
    let wake = Instant::now() + delay;
    tokio::time::sleep_until(wake.min(deadline)).await;
}
