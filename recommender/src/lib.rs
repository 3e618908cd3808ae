//! Retrieval-augmented pattern recommendations.
//!
//! [`Recommender::recommend`] embeds the request, retrieves the closest
//! patterns from the [`PatternStore`], formats them into the
//! knitting-assistant prompt and returns the model's answer together with the
//! patterns it was shown.

mod cfg;
mod error;
mod llm;
mod progress;
pub mod prompt;

pub use cfg::{DEFAULT_TOP_K, RecommenderConfig, filter_from};
pub use error::RecommenderError;
pub use llm::TextGenerator;
pub use progress::{IndicatifProgress, NoopProgress, Progress};

use std::sync::Arc;

use pattern_store::{EmbeddingsProvider, PatternHit, PatternStore};
use tracing::{debug, info, instrument};

/// Final answer plus the retrieved patterns it was grounded on.
#[derive(Clone, Debug)]
pub struct Recommendation {
    pub answer: String,
    pub hits: Vec<PatternHit>,
}

/// Wires the store, the query embedder and the text generator.
///
/// The embedder must be the one used at ingestion time.
pub struct Recommender {
    store: Arc<PatternStore>,
    embedder: Arc<dyn EmbeddingsProvider>,
    generator: Arc<dyn TextGenerator>,
    cfg: RecommenderConfig,
}

impl Recommender {
    pub fn new(
        store: Arc<PatternStore>,
        embedder: Arc<dyn EmbeddingsProvider>,
        generator: Arc<dyn TextGenerator>,
        cfg: RecommenderConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            generator,
            cfg,
        }
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.cfg
    }

    /// Embeds `query` and returns at most `top_k` closest patterns.
    ///
    /// # Errors
    /// Embedding or index failures as [`RecommenderError::Store`].
    #[instrument(skip_all, fields(top_k = top_k, query_len = query.len()))]
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<PatternHit>, RecommenderError> {
        let vector = self.embedder.embed(query).await?;
        let hits = self
            .store
            .search(vector, top_k, self.cfg.filter.as_ref())
            .await?;
        debug!("retrieved {} patterns", hits.len());
        Ok(hits)
    }

    /// End-to-end: retrieve, build the prompt, generate.
    pub async fn recommend(&self, query: &str) -> Result<Recommendation, RecommenderError> {
        self.recommend_with_progress(query, &NoopProgress).await
    }

    /// Same as [`Recommender::recommend`], reporting each stage to `prog`.
    pub async fn recommend_with_progress(
        &self,
        query: &str,
        prog: &dyn Progress,
    ) -> Result<Recommendation, RecommenderError> {
        prog.step("embedding + retrieving patterns");
        let hits = self.retrieve(query, self.cfg.top_k).await?;

        prog.step("building prompt");
        let context = prompt::format_context(&hits);
        let rendered = prompt::render_prompt(query, &context);

        prog.step("generating recommendations");
        let answer = self.generator.generate(&rendered).await?;
        prog.finish("done");

        info!(hits = hits.len(), answer_len = answer.len(), "recommendation ready");
        Ok(Recommendation { answer, hits })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{future::Future, pin::Pin, sync::Mutex};

    use ai_llm_service::AiLlmError;
    use pattern_store::{StoreConfig, StoreError, embed_patterns};
    use ravelry_client::PatternRecord;

    /// Bag-of-letters embedder; identical text gives identical vectors.
    struct LetterEmbedder;

    impl EmbeddingsProvider for LetterEmbedder {
        fn embed_batch<'a>(
            &'a self,
            texts: &'a [String],
        ) -> Pin<Box<dyn Future<Output = Result<Vec<Vec<f32>>, StoreError>> + Send + 'a>> {
            Box::pin(async move {
                Ok(texts
                    .iter()
                    .map(|t| {
                        let mut v = vec![0.0f32; 26];
                        for b in t.to_ascii_lowercase().bytes().filter(u8::is_ascii_lowercase) {
                            v[(b - b'a') as usize] += 1.0;
                        }
                        v
                    })
                    .collect())
            })
        }
    }

    #[derive(Default)]
    struct EchoGenerator {
        prompts: Mutex<Vec<String>>,
    }

    impl TextGenerator for EchoGenerator {
        fn generate<'a>(
            &'a self,
            prompt: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>> {
            Box::pin(async move {
                self.prompts.lock().unwrap().push(prompt.to_string());
                Ok("Try the first one.".to_string())
            })
        }
    }

    fn record(id: u64, name: &str, yarn: &str, free: bool) -> PatternRecord {
        PatternRecord {
            id,
            name: name.into(),
            designer: "Jo Purl".into(),
            difficulty: 2.0,
            yarn_weight: yarn.into(),
            notes: String::new(),
            url: format!("https://www.ravelry.com/patterns/library/p{id}"),
            category: "cardigan".into(),
            downloadable: true,
            free,
        }
    }

    async fn store_with_patterns(dir: &std::path::Path) -> Arc<PatternStore> {
        let store = PatternStore::new(StoreConfig::local(dir)).unwrap();
        let records: Vec<PatternRecord> = (1..=7)
            .map(|i| record(i, &format!("Cardigan {i}"), "Bulky", i % 2 == 0))
            .collect();
        let vectors = embed_patterns(&records, &LetterEmbedder).await.unwrap();
        store.upsert(&records, &vectors).await.unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn recommend_uses_top_k_hits_in_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_patterns(dir.path()).await;
        let generator = Arc::new(EchoGenerator::default());
        let rec = Recommender::new(
            store,
            Arc::new(LetterEmbedder),
            generator.clone(),
            RecommenderConfig::default(),
        );

        let out = rec.recommend("i want to knit a chunky cardigan").await.unwrap();
        assert_eq!(out.answer, "Try the first one.");
        assert_eq!(out.hits.len(), DEFAULT_TOP_K);

        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("REQUEST: i want to knit a chunky cardigan"));
        assert!(prompts[0].contains(&prompt::format_context(&out.hits)));
        assert!(prompts[0].contains("5. "));
        assert!(!prompts[0].contains("6. "));
    }

    #[tokio::test]
    async fn configured_filter_applies_to_retrieval() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with_patterns(dir.path()).await;
        let cfg = RecommenderConfig {
            top_k: 10,
            filter: filter_from(Some("free".into()), Some("true".into())),
        };
        let rec = Recommender::new(
            store,
            Arc::new(LetterEmbedder),
            Arc::new(EchoGenerator::default()),
            cfg,
        );

        let hits = rec.retrieve("cardigan", 10).await.unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits.iter().all(|h| h.pattern.free));
    }
}
