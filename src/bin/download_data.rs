//! Crawls Ravelry by category and writes the next numbered raw dump.

use anyhow::Context;
use knit_rag::{bootstrap, raw_data_dir};
use pattern_store::write_dump;
use ravelry_client::{CrawlOptions, NormalizeOptions, RavelryClient, RavelryConfig, crawl_categories};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bootstrap()?;

    let cfg = RavelryConfig::from_env().context("Ravelry credentials")?;
    let client = RavelryClient::new(cfg).context("creating Ravelry client")?;

    let opts = CrawlOptions::default();
    info!(
        categories = opts.categories.len(),
        max_per_category = opts.max_per_category,
        "crawling patterns"
    );
    let patterns = crawl_categories(&client, &opts, &NormalizeOptions::default())
        .await
        .context("crawling Ravelry")?;

    let records: Vec<_> = patterns.into_values().collect();
    let path = write_dump(raw_data_dir(), &records).context("writing raw dump")?;

    println!("Collected {} patterns into {}", records.len(), path.display());
    Ok(())
}
