use std::collections::HashMap;

use crate::models::{PairRecord, Provenance, QueryView, TokenAggregate, TokenRow};

const DETAIL_URL_BASE: &str = "https://dexscreener.com/pulsechain";

/// Folds raw pairs into per-token roll-ups and projects them into rows.
pub struct TokenAggregator {
    excluded_symbols: Vec<String>,
}

impl TokenAggregator {
    pub fn new(excluded_symbols: Vec<String>) -> Self {
        Self { excluded_symbols }
    }

    fn is_excluded(&self, symbol: &str) -> bool {
        self.excluded_symbols
            .iter()
            .any(|s| s.eq_ignore_ascii_case(symbol))
    }

    /// Fold every pair into the per-token map. Aggregates come back in
    /// first-seen address order, which keeps the later cut reproducible.
    pub fn aggregate(&self, pairs: &[PairRecord]) -> Vec<TokenAggregate> {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut aggregates: Vec<TokenAggregate> = Vec::new();

        for pair in pairs {
            let reserve = pair.reserve_usd_value();
            let volume = pair.volume_usd_value();
            if reserve <= 0.0 && volume <= 0.0 {
                continue;
            }

            let created = pair.created_at();
            // The source exposes no per-side split, so both value fields are
            // halved between the two legs.
            let side_liquidity = reserve / 2.0;
            let side_volume = volume / 2.0;

            for token in [&pair.token0, &pair.token1] {
                if token.id.is_empty() || self.is_excluded(&token.symbol) {
                    continue;
                }

                let idx = match index.get(token.id.as_str()) {
                    Some(&idx) => idx,
                    None => {
                        let idx = aggregates.len();
                        index.insert(token.id.clone(), idx);
                        aggregates.push(TokenAggregate::new(
                            token.id.clone(),
                            token.symbol.clone(),
                            token.name.clone(),
                            created,
                        ));
                        idx
                    }
                };

                aggregates[idx].add_pool(&pair.id, side_liquidity, side_volume, created);
            }
        }

        aggregates
    }

    /// Project aggregates into rows. The limit applies before the ordering
    /// pass, so the cut follows aggregation insertion order.
    pub fn project(
        &self,
        aggregates: Vec<TokenAggregate>,
        limit: usize,
        view: QueryView,
    ) -> Vec<TokenRow> {
        let mut rows: Vec<TokenRow> = aggregates.into_iter().map(row_from_aggregate).collect();
        rows.truncate(limit);

        match view {
            QueryView::Volume => rows.sort_by(|a, b| {
                b.volume_24h
                    .total_cmp(&a.volume_24h)
                    .then_with(|| a.address.cmp(&b.address))
            }),
            QueryView::Liquidity => rows.sort_by(|a, b| {
                b.liquidity
                    .total_cmp(&a.liquidity)
                    .then_with(|| a.address.cmp(&b.address))
            }),
            QueryView::New => rows.sort_by(|a, b| {
                b.created
                    .cmp(&a.created)
                    .then_with(|| a.address.cmp(&b.address))
            }),
        }

        rows
    }
}

fn zero_if_nan(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value
    }
}

fn row_from_aggregate(agg: TokenAggregate) -> TokenRow {
    // The weighted accumulators are not fed by the fold, so the projected
    // price stays 0 until enrichment overlays a real one.
    let price = if agg.total_weight > 0.0 {
        agg.weighted_price / agg.total_weight
    } else {
        0.0
    };

    let url = match &agg.best_pool {
        Some(best) => format!("{DETAIL_URL_BASE}/{}", best.address),
        None => String::new(),
    };

    TokenRow {
        address: agg.address,
        symbol: agg.symbol,
        name: agg.name,
        price: zero_if_nan(price),
        price_change_24h: 0.0,
        volume_24h: zero_if_nan(agg.total_volume),
        liquidity: zero_if_nan(agg.total_liquidity),
        created: agg.earliest_created,
        pool_count: agg.pool_count,
        source: Provenance::SubgraphOnly,
        url,
    }
}
