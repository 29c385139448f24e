use dashmap::DashMap;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::models::{Provenance, TokenRow};
use crate::sources::dexscreener::ScreenerPair;
use crate::sources::TokenInfoSource;

/// What one enrichment pass did. Partial failure is reported here instead of
/// being raised; rows from failed batches simply stay subgraph-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub batches: usize,
    pub failed_batches: usize,
    pub merged_rows: usize,
}

/// Overlays screener data onto projected rows, batch by batch under a
/// fixed-size permit pool.
pub struct Enricher {
    source: Arc<dyn TokenInfoSource>,
    batch_size: usize,
    permits: Arc<Semaphore>,
}

impl Enricher {
    pub fn new(source: Arc<dyn TokenInfoSource>, batch_size: usize, max_concurrent: usize) -> Self {
        Self {
            source,
            batch_size,
            permits: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    pub async fn enrich(&self, rows: &mut [TokenRow]) -> EnrichmentSummary {
        if rows.is_empty() {
            return EnrichmentSummary {
                batches: 0,
                failed_batches: 0,
                merged_rows: 0,
            };
        }

        let addresses: Vec<String> = rows.iter().map(|r| r.address.clone()).collect();
        let found: DashMap<String, ScreenerPair> = DashMap::new();

        let batch_results = join_all(addresses.chunks(self.batch_size).map(|batch| {
            let found = &found;
            async move {
                // One permit per in-flight request; dropped on every path.
                let _permit = self.permits.acquire().await.unwrap();
                match self.source.fetch_batch(batch).await {
                    Ok(records) => {
                        for record in records {
                            let key = record.base_token.address.to_lowercase();
                            found.entry(key).or_insert(record);
                        }
                        true
                    }
                    Err(e) => {
                        tracing::warn!(
                            "{} batch of {} failed: {}",
                            self.source.name(),
                            batch.len(),
                            e
                        );
                        false
                    }
                }
            }
        }))
        .await;

        let batches = batch_results.len();
        let failed_batches = batch_results.iter().filter(|ok| !**ok).count();

        let mut merged_rows = 0;
        for row in rows.iter_mut() {
            match found.get(&row.address.to_lowercase()) {
                Some(record) => {
                    overlay(row, record.value());
                    merged_rows += 1;
                }
                None => {
                    row.source = Provenance::SubgraphOnly;
                }
            }
        }

        EnrichmentSummary {
            batches,
            failed_batches,
            merged_rows,
        }
    }
}

fn overlay(row: &mut TokenRow, record: &ScreenerPair) {
    if let Some(price) = record
        .price_usd
        .as_ref()
        .and_then(|s| s.parse::<f64>().ok())
    {
        row.price = price;
    }
    if let Some(liquidity) = record.liquidity.as_ref().and_then(|l| l.usd) {
        row.liquidity = liquidity;
    }
    if let Some(volume) = record.volume.as_ref().and_then(|v| v.h24) {
        row.volume_24h = volume;
    }
    row.price_change_24h = record
        .price_change
        .as_ref()
        .and_then(|c| c.h24)
        .unwrap_or(0.0);
    row.source = Provenance::Merged;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::dexscreener::{LiquidityInfo, PriceChange, ScreenerToken, VolumeInfo};
    use crate::sources::SourceError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn row(address: &str) -> TokenRow {
        TokenRow {
            address: address.to_string(),
            symbol: "TKN".to_string(),
            name: "Token".to_string(),
            price: 0.0,
            price_change_24h: 0.0,
            volume_24h: 10.0,
            liquidity: 20.0,
            created: 100,
            pool_count: 1,
            source: Provenance::SubgraphOnly,
            url: String::new(),
        }
    }

    fn record(address: &str, price: &str) -> ScreenerPair {
        ScreenerPair {
            chain_id: "pulsechain".to_string(),
            pair_address: Some("0xpool".to_string()),
            base_token: ScreenerToken {
                address: address.to_string(),
                symbol: Some("TKN".to_string()),
            },
            price_usd: Some(price.to_string()),
            price_change: Some(PriceChange { h24: Some(-3.5) }),
            liquidity: Some(LiquidityInfo { usd: Some(9000.0) }),
            volume: Some(VolumeInfo { h24: Some(750.0) }),
        }
    }

    /// Returns one record per requested address; tracks batch sizes and the
    /// peak number of concurrently running calls.
    struct CountingSource {
        batch_sizes: parking_lot::Mutex<Vec<usize>>,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
        fail_containing: Option<String>,
    }

    impl CountingSource {
        fn new(fail_containing: Option<&str>) -> Self {
            Self {
                batch_sizes: parking_lot::Mutex::new(Vec::new()),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
                fail_containing: fail_containing.map(|s| s.to_string()),
            }
        }
    }

    #[async_trait]
    impl TokenInfoSource for CountingSource {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch_batch(
            &self,
            addresses: &[String],
        ) -> Result<Vec<ScreenerPair>, SourceError> {
            self.batch_sizes.lock().push(addresses.len());

            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if let Some(marker) = &self.fail_containing {
                if addresses.iter().any(|a| a == marker) {
                    return Err(SourceError::Status(500));
                }
            }

            Ok(addresses.iter().map(|a| record(a, "1.25")).collect())
        }
    }

    #[tokio::test]
    async fn forty_five_addresses_make_two_batches() {
        let source = Arc::new(CountingSource::new(None));
        let enricher = Enricher::new(source.clone(), 30, 4);

        let mut rows: Vec<TokenRow> = (0..45).map(|i| row(&format!("0x{i:02}"))).collect();
        let summary = enricher.enrich(&mut rows).await;

        assert_eq!(summary.batches, 2);
        assert_eq!(summary.failed_batches, 0);
        assert_eq!(summary.merged_rows, 45);
        assert_eq!(source.batch_sizes.lock().as_slice(), &[30, 15]);
        assert!(rows.iter().all(|r| r.source == Provenance::Merged));
    }

    #[tokio::test]
    async fn in_flight_batches_respect_the_permit_pool() {
        let source = Arc::new(CountingSource::new(None));
        let enricher = Enricher::new(source.clone(), 1, 2);

        let mut rows: Vec<TokenRow> = (0..10).map(|i| row(&format!("0x{i:02}"))).collect();
        enricher.enrich(&mut rows).await;

        assert_eq!(source.batch_sizes.lock().len(), 10);
        assert!(source.peak_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn failed_batch_leaves_its_rows_subgraph_only() {
        // Batch size 2 puts 0xaa/0xbb in the first batch and 0xcc/0xdd in
        // the second; the first batch fails on the marker address.
        let source = Arc::new(CountingSource::new(Some("0xaa")));
        let enricher = Enricher::new(source, 2, 4);

        let mut rows = vec![row("0xaa"), row("0xbb"), row("0xcc"), row("0xdd")];
        let summary = enricher.enrich(&mut rows).await;

        assert_eq!(summary.batches, 2);
        assert_eq!(summary.failed_batches, 1);
        assert_eq!(summary.merged_rows, 2);
        assert_eq!(rows[0].source, Provenance::SubgraphOnly);
        assert_eq!(rows[1].source, Provenance::SubgraphOnly);
        assert_eq!(rows[2].source, Provenance::Merged);
        assert_eq!(rows[3].source, Provenance::Merged);
    }

    #[tokio::test]
    async fn overlay_fields_and_idempotence() {
        let source = Arc::new(CountingSource::new(None));
        let enricher = Enricher::new(source, 30, 4);

        let mut rows = vec![row("0xAA")];
        enricher.enrich(&mut rows).await;

        assert_eq!(rows[0].price, 1.25);
        assert_eq!(rows[0].liquidity, 9000.0);
        assert_eq!(rows[0].volume_24h, 750.0);
        assert_eq!(rows[0].price_change_24h, -3.5);
        assert_eq!(rows[0].source, Provenance::Merged);

        // Matching is case-insensitive on the address and a second pass over
        // the same data changes nothing.
        let snapshot = rows.clone();
        enricher.enrich(&mut rows).await;
        assert_eq!(rows[0].price, snapshot[0].price);
        assert_eq!(rows[0].liquidity, snapshot[0].liquidity);
        assert_eq!(rows[0].volume_24h, snapshot[0].volume_24h);
        assert_eq!(rows[0].price_change_24h, snapshot[0].price_change_24h);
        assert_eq!(rows[0].source, snapshot[0].source);
    }

    #[test]
    fn unparseable_price_keeps_the_existing_one() {
        let mut target = row("0xaa");
        target.price = 0.5;
        overlay(&mut target, &record("0xaa", "not-a-number"));
        assert_eq!(target.price, 0.5);
        assert_eq!(target.source, Provenance::Merged);
    }

    #[tokio::test]
    async fn empty_row_set_issues_no_batches() {
        let source = Arc::new(CountingSource::new(None));
        let enricher = Enricher::new(source.clone(), 30, 4);

        let mut rows: Vec<TokenRow> = Vec::new();
        let summary = enricher.enrich(&mut rows).await;

        assert_eq!(summary.batches, 0);
        assert!(source.batch_sizes.lock().is_empty());
    }
}
