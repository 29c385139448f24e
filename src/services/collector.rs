use std::sync::Arc;

use crate::models::{PairRecord, QueryView};
use crate::sources::PairSource;

const SECONDS_PER_DAY: i64 = 86_400;

/// Walks the pair feed page by page and accumulates whatever arrives.
/// A failed page ends the walk without discarding earlier pages.
pub struct PairCollector {
    source: Arc<dyn PairSource>,
    page_size: usize,
}

impl PairCollector {
    pub fn new(source: Arc<dyn PairSource>, page_size: usize) -> Self {
        Self { source, page_size }
    }

    pub async fn collect(&self, view: QueryView, pages: u32, age_days: u32) -> Vec<PairRecord> {
        // The cutoff is fixed before the first page so every page of one
        // call filters on the same instant.
        let cutoff = match view {
            QueryView::New => {
                Some(chrono::Utc::now().timestamp() - age_days as i64 * SECONDS_PER_DAY)
            }
            _ => None,
        };

        let mut collected = Vec::new();

        for page in 0..pages {
            let skip = page as usize * self.page_size;
            match self.source.fetch_page(view, self.page_size, skip, cutoff).await {
                Ok(batch) => {
                    let count = batch.len();
                    collected.extend(batch);
                    if count < self.page_size {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "{} page {} failed, keeping {} pairs already fetched: {}",
                        self.source.name(),
                        page,
                        collected.len(),
                        e
                    );
                    break;
                }
            }
        }

        collected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PairToken;
    use crate::sources::SourceError;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    fn pair(id: &str) -> PairRecord {
        PairRecord {
            id: id.to_string(),
            token0: PairToken {
                id: "0x1".to_string(),
                symbol: "AAA".to_string(),
                name: "Token A".to_string(),
                decimals: "18".to_string(),
            },
            token1: PairToken {
                id: "0x2".to_string(),
                symbol: "BBB".to_string(),
                name: "Token B".to_string(),
                decimals: "18".to_string(),
            },
            reserve0: "1".to_string(),
            reserve1: "1".to_string(),
            reserve_usd: "100".to_string(),
            volume_usd: "10".to_string(),
            tx_count: "1".to_string(),
            created_at_timestamp: "1700000000".to_string(),
            total_supply: "1".to_string(),
        }
    }

    /// Serves pre-scripted pages and records every cutoff it sees.
    struct ScriptedSource {
        pages: Mutex<Vec<Result<Vec<PairRecord>, SourceError>>>,
        cutoffs: Mutex<Vec<Option<i64>>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<Vec<PairRecord>, SourceError>>) -> Self {
            Self {
                pages: Mutex::new(pages),
                cutoffs: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl PairSource for ScriptedSource {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch_page(
            &self,
            _view: QueryView,
            _first: usize,
            _skip: usize,
            cutoff: Option<i64>,
        ) -> Result<Vec<PairRecord>, SourceError> {
            self.cutoffs.lock().push(cutoff);
            let mut pages = self.pages.lock();
            if pages.is_empty() {
                Ok(Vec::new())
            } else {
                pages.remove(0)
            }
        }
    }

    fn full_page(prefix: &str, size: usize) -> Vec<PairRecord> {
        (0..size).map(|i| pair(&format!("{prefix}{i}"))).collect()
    }

    #[tokio::test]
    async fn stops_on_short_page() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(full_page("a", 3)),
            Ok(vec![pair("b0")]),
            Ok(full_page("c", 3)),
        ]));
        let collector = PairCollector::new(source, 3);

        let pairs = collector.collect(QueryView::Volume, 10, 7).await;
        assert_eq!(pairs.len(), 4);
    }

    #[tokio::test]
    async fn stops_on_empty_page() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(full_page("a", 2)),
            Ok(Vec::new()),
        ]));
        let collector = PairCollector::new(source, 2);

        let pairs = collector.collect(QueryView::Liquidity, 10, 7).await;
        assert_eq!(pairs.len(), 2);
    }

    #[tokio::test]
    async fn respects_the_page_budget() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(full_page("a", 2)),
            Ok(full_page("b", 2)),
            Ok(full_page("c", 2)),
        ]));
        let collector = PairCollector::new(source, 2);

        let pairs = collector.collect(QueryView::Volume, 2, 7).await;
        assert_eq!(pairs.len(), 4);
    }

    #[tokio::test]
    async fn failure_keeps_what_was_collected() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(full_page("a", 2)),
            Err(SourceError::Status(502)),
            Ok(full_page("c", 2)),
        ]));
        let collector = PairCollector::new(source, 2);

        let pairs = collector.collect(QueryView::Volume, 10, 7).await;
        assert_eq!(pairs.len(), 2);
    }

    #[tokio::test]
    async fn cutoff_is_constant_across_pages_and_absent_otherwise() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(full_page("a", 2)),
            Ok(full_page("b", 2)),
            Ok(vec![pair("c0")]),
        ]));
        let collector = PairCollector::new(source.clone(), 2);

        collector.collect(QueryView::New, 10, 7).await;
        let cutoffs = source.cutoffs.lock().clone();
        assert_eq!(cutoffs.len(), 3);
        assert!(cutoffs[0].is_some());
        assert!(cutoffs.windows(2).all(|w| w[0] == w[1]));

        let source = Arc::new(ScriptedSource::new(vec![Ok(vec![pair("d0")])]));
        let collector = PairCollector::new(source.clone(), 2);
        collector.collect(QueryView::Volume, 1, 7).await;
        assert_eq!(source.cutoffs.lock().as_slice(), &[None]);
    }
}
