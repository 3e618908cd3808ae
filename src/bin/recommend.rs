//! Answers one knitting request with pattern recommendations.

use std::sync::Arc;

use anyhow::Context;
use knit_rag::{bootstrap, embedder, llm_profiles, pattern_store, query_from_env};
use recommender::{IndicatifProgress, Recommender, RecommenderConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    bootstrap()?;

    let query = query_from_env();
    let svc = llm_profiles()?;
    let (store_cfg, store) = pattern_store()?;
    let provider = Arc::new(embedder(svc.clone(), &store_cfg));

    let rec = Recommender::new(store, provider, svc, RecommenderConfig::from_env());

    println!("query: {query}\n");
    let prog = IndicatifProgress::spinner();
    let out = rec
        .recommend_with_progress(&query, &prog)
        .await
        .context("generating recommendations")?;

    println!("{}\n", out.answer);
    println!("Retrieved patterns:");
    for h in &out.hits {
        println!(
            "  [{:.3}] {} by {} ({})",
            h.score, h.pattern.name, h.pattern.designer, h.pattern.url
        );
    }
    Ok(())
}
