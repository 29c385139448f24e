use serde::{Deserialize, Serialize};

/// Which data source(s) produced a row's final fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// Subgraph aggregate with screener fields overlaid.
    Merged,
    /// Subgraph aggregate only; the screener had nothing for this address.
    SubgraphOnly,
    /// Screener data without a subgraph aggregate behind it.
    ScreenerOnly,
}

/// A pool's contribution to one token's roll-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolShare {
    pub address: String,
    pub liquidity: f64,
    pub volume: f64,
    pub created: i64,
}

/// The highest-liquidity pool seen for a token so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BestPool {
    pub address: String,
    pub liquidity: f64,
}

/// Per-token roll-up across every pair the token appears in. Mutated only
/// while pairs are being folded in; read-only afterwards.
#[derive(Debug, Clone)]
pub struct TokenAggregate {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub total_liquidity: f64,
    pub total_volume: f64,
    pub weighted_price: f64,
    pub total_weight: f64,
    pub earliest_created: i64,
    pub pool_count: u32,
    pub best_pool: Option<BestPool>,
    pub pools: Vec<PoolShare>,
}

impl TokenAggregate {
    pub fn new(address: String, symbol: String, name: String, created: i64) -> Self {
        Self {
            address,
            symbol,
            name,
            total_liquidity: 0.0,
            total_volume: 0.0,
            weighted_price: 0.0,
            total_weight: 0.0,
            earliest_created: created,
            pool_count: 0,
            best_pool: None,
            pools: Vec::new(),
        }
    }

    /// Fold one pool side into the roll-up.
    pub fn add_pool(&mut self, pool_address: &str, liquidity: f64, volume: f64, created: i64) {
        self.total_liquidity += liquidity;
        self.total_volume += volume;
        if created < self.earliest_created {
            self.earliest_created = created;
        }
        self.pool_count += 1;
        self.pools.push(PoolShare {
            address: pool_address.to_string(),
            liquidity,
            volume,
            created,
        });

        let beats_best = self
            .best_pool
            .as_ref()
            .map(|b| liquidity > b.liquidity)
            .unwrap_or(true);
        if beats_best {
            self.best_pool = Some(BestPool {
                address: pool_address.to_string(),
                liquidity,
            });
        }
    }
}

/// Externally visible token row, as served to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRow {
    pub address: String,
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub price_change_24h: f64,
    pub volume_24h: f64,
    pub liquidity: f64,
    pub created: i64,
    pub pool_count: u32,
    pub source: Provenance,
    pub url: String,
}

/// Full pipeline output for one parameter combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokensResult {
    pub source: Provenance,
    pub coverage: usize,
    pub tokens: Vec<TokenRow>,
}

impl TokensResult {
    /// The result served when the subgraph yields no pairs at all.
    pub fn empty() -> Self {
        Self {
            source: Provenance::SubgraphOnly,
            coverage: 0,
            tokens: Vec::new(),
        }
    }
}
