use serde::{Deserialize, Serialize};

/// One liquidity pair as the subgraph returns it. Numeric fields stay the
/// decimal strings the source sends; parsing happens at aggregation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairRecord {
    pub id: String,
    pub token0: PairToken,
    pub token1: PairToken,
    pub reserve0: String,
    pub reserve1: String,
    #[serde(rename = "reserveUSD")]
    pub reserve_usd: String,
    #[serde(rename = "volumeUSD")]
    pub volume_usd: String,
    pub tx_count: String,
    pub created_at_timestamp: String,
    pub total_supply: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairToken {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub decimals: String,
}

impl PairRecord {
    pub fn reserve_usd_value(&self) -> f64 {
        self.reserve_usd.parse().unwrap_or(0.0)
    }

    pub fn volume_usd_value(&self) -> f64 {
        self.volume_usd.parse().unwrap_or(0.0)
    }

    pub fn created_at(&self) -> i64 {
        self.created_at_timestamp.parse().unwrap_or(0)
    }
}
