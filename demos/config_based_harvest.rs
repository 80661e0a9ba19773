use catalog_harvest::Harvest;
use clap::Parser;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to harvest configuration file
    #[arg(short, long, default_value = "demos/handphone.json")]
    config: PathBuf,

    /// Override the number of links to collect
    #[arg(short, long)]
    target: Option<usize>,

    /// Override the output file
    #[arg(short, long)]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::init();

    let args = Args::parse();

    let mut harvest = Harvest::from_config_file(&args.config)?;
    if let Some(target) = args.target {
        harvest = harvest.with_target_count(target);
    }
    if let Some(output) = args.output {
        harvest = harvest.with_output_path(output);
    }

    let config = harvest.config();
    println!("Harvest configuration:");
    println!("  Catalog: {}", config.catalog_url_template);
    println!("  Target links: {}", config.target_count);
    println!("  Max pages: {}", config.max_pages);
    println!("  WebDriver URL: {}", config.webdriver_url);
    println!("  Output: {}", config.output_path);
    println!(
        "  Number of exclude patterns: {}",
        config.link_filter.exclude_patterns.len()
    );

    let report = harvest.run().await?;

    println!("\nHarvest Summary:");
    println!("  Pages visited: {}", report.pages_visited);
    println!("  Links discovered: {}", report.links_discovered);
    println!("  Records written: {}", report.records_written);
    println!("  Fallback records: {}", report.records_failed);
    println!("  Links skipped: {}", report.links_skipped());
    println!("  Elapsed: {:.2?}", report.elapsed);

    Ok(())
}
