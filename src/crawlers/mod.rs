pub mod collector;
pub mod extractor;
pub mod pipeline;
pub mod renderer;
pub mod scripts;
pub mod webdriver;

#[cfg(test)]
mod tests;

pub use collector::{Collection, CollectionState, LinkCollector, Offer};
pub use extractor::DetailExtractor;
pub use pipeline::run_pipeline;
pub use renderer::Renderer;
pub use webdriver::WebDriverRenderer;
