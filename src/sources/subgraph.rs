use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{PairSource, SourceError};
use crate::config::SubgraphConfig;
use crate::models::{PairRecord, QueryView};

const BACKOFF_MULTIPLIER: u32 = 3;

const PAIR_FIELDS: &str = "\
id \
token0 { id symbol name decimals } \
token1 { id symbol name decimals } \
reserve0 reserve1 reserveUSD volumeUSD txCount createdAtTimestamp totalSupply";

/// GraphQL client for the pair subgraph. Every query goes through the retry
/// loop in `post_pairs`; a single call either yields a full page or fails.
pub struct SubgraphClient {
    client: Client,
    url: String,
    retries: u32,
    base_delay: Duration,
}

#[derive(Debug, Deserialize)]
struct GraphResponse {
    data: Option<PairsData>,
    errors: Option<Vec<GraphError>>,
}

#[derive(Debug, Deserialize)]
struct PairsData {
    pairs: Vec<PairRecord>,
}

#[derive(Debug, Deserialize)]
struct GraphError {
    message: String,
}

impl SubgraphClient {
    pub fn new(config: &SubgraphConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
            url: config.url.clone(),
            retries: config.retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }

    fn build_query(view: QueryView, first: usize, skip: usize, cutoff: Option<i64>) -> String {
        match view {
            QueryView::Volume => format!(
                "{{ pairs(first: {first}, skip: {skip}, \
                 orderBy: volumeUSD, orderDirection: desc) {{ {PAIR_FIELDS} }} }}"
            ),
            QueryView::Liquidity => format!(
                "{{ pairs(first: {first}, skip: {skip}, \
                 orderBy: reserveUSD, orderDirection: desc) {{ {PAIR_FIELDS} }} }}"
            ),
            QueryView::New => {
                let cutoff = cutoff.unwrap_or(0);
                format!(
                    "{{ pairs(first: {first}, skip: {skip}, \
                     orderBy: createdAtTimestamp, orderDirection: desc, \
                     where: {{ createdAtTimestamp_gt: {cutoff} }}) {{ {PAIR_FIELDS} }} }}"
                )
            }
        }
    }

    async fn post_once(&self, query: &str) -> Result<Vec<PairRecord>, SourceError> {
        let body = serde_json::json!({ "query": query });

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let parsed: GraphResponse = resp
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        if let Some(errors) = parsed.errors {
            let message = errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(SourceError::Upstream(message));
        }

        match parsed.data {
            Some(data) => Ok(data.pairs),
            None => Err(SourceError::Parse("response carried no data".to_string())),
        }
    }

    /// Post with the retry budget. Backoff between attempts grows as
    /// `base_delay * 3^attempt`; the last failure is carried in the error.
    async fn post_pairs(&self, query: &str) -> Result<Vec<PairRecord>, SourceError> {
        let mut last_err = None;

        for attempt in 0..self.retries {
            match self.post_once(query).await {
                Ok(pairs) => return Ok(pairs),
                Err(e) => {
                    tracing::warn!(
                        "subgraph attempt {}/{} failed: {}",
                        attempt + 1,
                        self.retries,
                        e
                    );
                    last_err = Some(e);
                    if attempt + 1 < self.retries {
                        let delay = self.base_delay * BACKOFF_MULTIPLIER.pow(attempt);
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(SourceError::Unavailable {
            attempts: self.retries,
            last: Box::new(last_err.unwrap_or_else(|| {
                SourceError::Network("no attempt was made".to_string())
            })),
        })
    }
}

#[async_trait]
impl PairSource for SubgraphClient {
    fn name(&self) -> &'static str {
        "subgraph"
    }

    async fn fetch_page(
        &self,
        view: QueryView,
        first: usize,
        skip: usize,
        cutoff: Option<i64>,
    ) -> Result<Vec<PairRecord>, SourceError> {
        let query = Self::build_query(view, first, skip, cutoff);
        self.post_pairs(&query).await
    }
}
