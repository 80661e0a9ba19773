use crate::config::HarvestConfig;
use crate::crawlers::collector::LinkCollector;
use crate::crawlers::extractor::DetailExtractor;
use crate::crawlers::renderer::Renderer;
use crate::error::HarvestError;
use crate::politeness::Politeness;
use crate::results::RunReport;
use crate::sink::RecordSink;
use tokio::time::{Instant, timeout_at};

/// Collect links, then extract and persist each one in discovery order
///
/// The whole run is bounded by `config.run_deadline()`. Records already appended stay
/// in the sink when the deadline cuts the run short.
pub async fn run_pipeline<R, S>(
    renderer: &mut R,
    sink: &mut S,
    config: &HarvestConfig,
    politeness: &mut Politeness,
) -> Result<RunReport, HarvestError>
where
    R: Renderer + ?Sized,
    S: RecordSink + ?Sized,
{
    let started = Instant::now();
    let deadline = started + config.run_deadline();

    let collector = LinkCollector::new(config)?;
    let extractor = DetailExtractor::new(config)?;

    let collection = collector.collect(renderer, politeness, deadline).await?;
    let links = collection.links;

    let mut report = RunReport {
        pages_visited: collection.pages_visited,
        links_discovered: links.len(),
        deadline_hit: collection.deadline_hit,
        ..RunReport::default()
    };

    ::log::info!(
        "Collected {} links. Begin full-detail extraction...",
        links.len()
    );

    let per_item = config.per_item_deadline();
    for (i, link) in links.iter().enumerate() {
        ::log::info!("Processing {}/{} : {}", i + 1, links.len(), link);

        let record = match timeout_at(deadline, extractor.extract(renderer, link, per_item)).await {
            Ok(record) => record,
            Err(_) => {
                ::log::warn!(
                    "Run deadline expired while processing {}; {} link(s) left unprocessed",
                    link,
                    links.len() - i
                );
                report.deadline_hit = true;
                break;
            }
        };

        if record.is_fallback() {
            report.records_failed += 1;
        }

        match sink.append(&record) {
            Ok(()) => {
                report.records_written += 1;
                ::log::info!(
                    "Saved {}: {} | {} | {}",
                    i + 1,
                    record.name(),
                    record.price(),
                    record.merchant_name()
                );
            }
            Err(e) => {
                report.sink_errors += 1;
                ::log::warn!("write error for {}: {} (continuing)", link, e);
            }
        }

        if timeout_at(deadline, extractor.pause_after(politeness, &record))
            .await
            .is_err()
        {
            let remaining = links.len() - i - 1;
            if remaining > 0 {
                ::log::warn!(
                    "Run deadline expired; {} link(s) left unprocessed",
                    remaining
                );
                report.deadline_hit = true;
            }
            break;
        }
    }

    report.elapsed = started.elapsed();
    Ok(report)
}
