use clap::Parser;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging, progress is reported at info level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command-line arguments
    let args = Args::parse();

    let harvest = match args.into_harvest() {
        Ok(harvest) => harvest,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };

    println!("Note: harvesting requires a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Using {}; pass --webdriver-url or set webdriver_url in the config to change it",
        harvest.config().webdriver_url
    );

    let output_path = harvest.config().output_path.clone();
    match harvest.run().await {
        Ok(report) => {
            ::log::info!(
                "Done - {} record(s) in {} ({} fallback, {} write error(s), {} skipped) from {} page(s) in {:.2} seconds",
                report.records_written,
                output_path,
                report.records_failed,
                report.sink_errors,
                report.links_skipped(),
                report.pages_visited,
                report.elapsed.as_secs_f64()
            );
            if report.deadline_hit {
                ::log::warn!("Run deadline expired before all links were processed");
            }
        }
        Err(e) => {
            ::log::error!("Harvest failed: {}", e);
            std::process::exit(1);
        }
    }
}
