use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{SourceError, TokenInfoSource};
use crate::config::ScreenerConfig;

/// Hard cap on addresses per batch request, set by the screener API.
pub const MAX_BATCH: usize = 30;

/// DexScreener batch token client. One call resolves up to 30 token
/// addresses into their most relevant pair each.
pub struct DexScreenerClient {
    client: Client,
    base_url: String,
    chain: String,
}

#[derive(Debug, Deserialize)]
struct TokensResponse {
    pairs: Option<Vec<ScreenerPair>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenerPair {
    pub chain_id: String,
    #[allow(dead_code)]
    pub pair_address: Option<String>,
    pub base_token: ScreenerToken,
    pub price_usd: Option<String>,
    pub price_change: Option<PriceChange>,
    pub liquidity: Option<LiquidityInfo>,
    pub volume: Option<VolumeInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScreenerToken {
    pub address: String,
    #[allow(dead_code)]
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceChange {
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiquidityInfo {
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VolumeInfo {
    pub h24: Option<f64>,
}

impl DexScreenerClient {
    pub fn new(config: &ScreenerConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
            base_url: config.url.clone(),
            chain: config.chain.clone(),
        }
    }
}

#[async_trait]
impl TokenInfoSource for DexScreenerClient {
    fn name(&self) -> &'static str {
        "dexscreener"
    }

    async fn fetch_batch(&self, addresses: &[String]) -> Result<Vec<ScreenerPair>, SourceError> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }
        if addresses.len() > MAX_BATCH {
            return Err(SourceError::BatchTooLarge(addresses.len(), MAX_BATCH));
        }

        let url = format!(
            "{}/latest/dex/tokens/{}",
            self.base_url,
            addresses.join(",")
        );

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let data: TokensResponse = resp
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        let pairs = data
            .pairs
            .unwrap_or_default()
            .into_iter()
            .filter(|p| p.chain_id == self.chain)
            .collect();

        Ok(pairs)
    }
}
