use std::sync::Arc;

use super::{Enricher, PairCollector, ResultCache, TokenAggregator};
use crate::models::{Provenance, TokenQuery, TokensResult};

/// Request-scoped pipeline: cache lookup, pagination, aggregation,
/// enrichment, cache store. Fetch-level failures degrade the result instead
/// of propagating; this never errors.
pub struct TokenPipeline {
    collector: PairCollector,
    aggregator: TokenAggregator,
    enricher: Enricher,
    cache: Arc<ResultCache>,
}

impl TokenPipeline {
    pub fn new(
        collector: PairCollector,
        aggregator: TokenAggregator,
        enricher: Enricher,
        cache: Arc<ResultCache>,
    ) -> Self {
        Self {
            collector,
            aggregator,
            enricher,
            cache,
        }
    }

    pub async fn get_tokens(&self, query: &TokenQuery) -> TokensResult {
        let key = query.cache_key();
        if let Some(hit) = self.cache.get(&key) {
            tracing::debug!("cache hit for {}", key);
            return hit;
        }

        let pairs = self
            .collector
            .collect(query.view, query.pages, query.age_days)
            .await;

        if pairs.is_empty() {
            let empty = TokensResult::empty();
            self.cache.put(&key, empty.clone());
            return empty;
        }

        let aggregates = self.aggregator.aggregate(&pairs);
        let mut rows = self
            .aggregator
            .project(aggregates, query.limit, query.view);

        let summary = self.enricher.enrich(&mut rows).await;
        if summary.failed_batches > 0 {
            tracing::warn!(
                "enrichment degraded: {}/{} batches failed, {} rows merged",
                summary.failed_batches,
                summary.batches,
                summary.merged_rows
            );
        }

        let result = TokensResult {
            source: Provenance::Merged,
            coverage: pairs.len(),
            tokens: rows,
        };
        self.cache.put(&key, result.clone());
        result
    }
}
