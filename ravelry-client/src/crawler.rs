//! Category crawl: search each category, dedup ids, fetch details once, normalize.

use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tracing::{debug, info};

use crate::client::{MAX_PAGE_SIZE, RavelryClient, SearchPage, SearchRequest};
use crate::errors::RavelryError;
use crate::normalize::{NormalizeOptions, normalize_details};
use crate::record::PatternRecord;

/// Categories crawled by the download binary.
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "sweater",
    "socks",
    "hat",
    "shawl-wrap",
    "tops",
    "blanket",
    "scarf",
    "mittens",
    "cowl",
    "slippers",
];

/// The two upstream calls a crawl needs.
///
/// Implemented by [`RavelryClient`]; tests plug in canned responses.
pub trait PatternApi: Send + Sync {
    /// One search page.
    fn search<'a>(
        &'a self,
        req: &'a SearchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SearchPage, RavelryError>> + Send + 'a>>;

    /// Raw batch detail payload for `ids`.
    fn details<'a>(
        &'a self,
        ids: &'a [u64],
    ) -> Pin<Box<dyn Future<Output = Result<Value, RavelryError>> + Send + 'a>>;
}

impl PatternApi for RavelryClient {
    fn search<'a>(
        &'a self,
        req: &'a SearchRequest,
    ) -> Pin<Box<dyn Future<Output = Result<SearchPage, RavelryError>> + Send + 'a>> {
        Box::pin(self.search_patterns(req))
    }

    fn details<'a>(
        &'a self,
        ids: &'a [u64],
    ) -> Pin<Box<dyn Future<Output = Result<Value, RavelryError>> + Send + 'a>> {
        Box::pin(self.pattern_details(ids))
    }
}

/// What to crawl.
#[derive(Clone, Debug)]
pub struct CrawlOptions {
    /// Pattern categories (Ravelry `pc` parameter).
    pub categories: Vec<String>,
    /// Optional free-text query applied to every category.
    pub query: Option<String>,
    /// Extra search filters applied to every category.
    pub filters: BTreeMap<String, String>,
    /// Upper bound of ids taken per category.
    pub max_per_category: usize,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
            query: None,
            filters: BTreeMap::new(),
            max_per_category: 100,
        }
    }
}

/// Crawls every category, then fetches and normalizes all unique ids.
///
/// Ids seen in more than one category are fetched once. Pages are requested
/// until `max_per_category` ids were taken for the category or the last page
/// is reached.
///
/// # Errors
/// The first failing upstream call aborts the crawl.
pub async fn crawl_categories<A>(
    api: &A,
    opts: &CrawlOptions,
    norm: &NormalizeOptions,
) -> Result<BTreeMap<u64, PatternRecord>, RavelryError>
where
    A: PatternApi + ?Sized,
{
    let page_size = opts.max_per_category.clamp(1, MAX_PAGE_SIZE);
    let mut ids: BTreeSet<u64> = BTreeSet::new();

    for category in &opts.categories {
        info!(category = %category, "fetching patterns");
        let mut taken = 0usize;
        let mut page = 1u32;

        while taken < opts.max_per_category {
            let mut filters = opts.filters.clone();
            filters.insert("pc".into(), category.clone());
            let req = SearchRequest {
                query: opts.query.clone(),
                filters,
                page,
                page_size,
            };

            let res = api.search(&req).await?;
            let want = opts.max_per_category - taken;
            let batch: Vec<u64> = res.ids.iter().copied().take(want).collect();
            taken += batch.len();
            ids.extend(batch);

            debug!(category = %category, page, taken, page_count = res.page_count, "search page");
            if res.ids.is_empty() || page >= res.page_count {
                break;
            }
            page += 1;
        }
    }

    let ids: Vec<u64> = ids.into_iter().collect();
    info!(unique_ids = ids.len(), "fetching pattern details");
    let raw = api.details(&ids).await?;
    let records = normalize_details(&raw, norm);
    info!(records = records.len(), "patterns normalized");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    /// Canned API: `pages[category]` lists the ids of each page.
    struct FakeApi {
        pages: BTreeMap<String, Vec<Vec<u64>>>,
        searches: Mutex<Vec<(String, u32, usize)>>,
        detail_calls: Mutex<Vec<Vec<u64>>>,
    }

    impl FakeApi {
        fn new(pages: &[(&str, Vec<Vec<u64>>)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(c, p)| (c.to_string(), p.clone()))
                    .collect(),
                searches: Mutex::new(Vec::new()),
                detail_calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl PatternApi for FakeApi {
        fn search<'a>(
            &'a self,
            req: &'a SearchRequest,
        ) -> Pin<Box<dyn Future<Output = Result<SearchPage, RavelryError>> + Send + 'a>> {
            Box::pin(async move {
                let category = req.filters["pc"].clone();
                self.searches
                    .lock()
                    .unwrap()
                    .push((category.clone(), req.page, req.page_size));
                let pages = self.pages.get(&category).cloned().unwrap_or_default();
                let ids = pages
                    .get(req.page as usize - 1)
                    .cloned()
                    .unwrap_or_default();
                Ok(SearchPage {
                    ids,
                    page: req.page,
                    page_count: pages.len().max(1) as u32,
                })
            })
        }

        fn details<'a>(
            &'a self,
            ids: &'a [u64],
        ) -> Pin<Box<dyn Future<Output = Result<Value, RavelryError>> + Send + 'a>> {
            Box::pin(async move {
                self.detail_calls.lock().unwrap().push(ids.to_vec());
                let mut patterns = serde_json::Map::new();
                for id in ids {
                    patterns.insert(
                        id.to_string(),
                        json!({ "id": id, "name": format!("p{id}"), "downloadable": true, "free": false }),
                    );
                }
                Ok(json!({ "patterns": patterns }))
            })
        }
    }

    fn opts(categories: &[&str], max: usize) -> CrawlOptions {
        CrawlOptions {
            categories: categories.iter().map(|c| c.to_string()).collect(),
            max_per_category: max,
            ..CrawlOptions::default()
        }
    }

    #[tokio::test]
    async fn ids_shared_across_categories_are_fetched_once() {
        let api = FakeApi::new(&[("hat", vec![vec![1, 2, 3]]), ("cowl", vec![vec![3, 4]])]);
        let out = crawl_categories(&api, &opts(&["hat", "cowl"], 10), &NormalizeOptions::default())
            .await
            .unwrap();

        assert_eq!(out.keys().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        let calls = api.detail_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn pages_until_the_per_category_limit() {
        let api = FakeApi::new(&[("socks", vec![vec![1, 2], vec![3, 4], vec![5, 6]])]);
        let out = crawl_categories(&api, &opts(&["socks"], 3), &NormalizeOptions::default())
            .await
            .unwrap();

        assert_eq!(out.len(), 3);
        let searches = api.searches.lock().unwrap();
        assert_eq!(
            *searches,
            vec![("socks".to_string(), 1, 3), ("socks".to_string(), 2, 3)]
        );
    }

    #[tokio::test]
    async fn stops_at_the_last_page() {
        let api = FakeApi::new(&[("tops", vec![vec![10], vec![11]])]);
        let out = crawl_categories(&api, &opts(&["tops"], 100), &NormalizeOptions::default())
            .await
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(api.searches.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn zero_limit_searches_nothing() {
        let api = FakeApi::new(&[("hat", vec![vec![1]])]);
        let out = crawl_categories(&api, &opts(&["hat"], 0), &NormalizeOptions::default())
            .await
            .unwrap();
        assert!(out.is_empty());
        assert!(api.searches.lock().unwrap().is_empty());
    }
}
