pub mod dexscreener;
pub mod subgraph;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{PairRecord, QueryView};
use dexscreener::ScreenerPair;

/// Paginated pair feed. One call fetches one page of one ordering.
#[async_trait]
pub trait PairSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// `cutoff` only applies to the creation-time ordering; the caller
    /// computes it once and passes the same value for every page.
    async fn fetch_page(
        &self,
        view: QueryView,
        first: usize,
        skip: usize,
        cutoff: Option<i64>,
    ) -> Result<Vec<PairRecord>, SourceError>;
}

/// Batch token lookup on the screener side, capped at 30 addresses per call.
#[async_trait]
pub trait TokenInfoSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_batch(&self, addresses: &[String]) -> Result<Vec<ScreenerPair>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("batch of {0} exceeds the source limit of {1}")]
    BatchTooLarge(usize, usize),
    #[error("source unavailable after {attempts} attempts: {last}")]
    Unavailable {
        attempts: u32,
        #[source]
        last: Box<SourceError>,
    },
}
