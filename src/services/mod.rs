pub mod aggregator;
pub mod cache;
pub mod collector;
pub mod enrichment;
pub mod pipeline;

pub use aggregator::TokenAggregator;
pub use cache::ResultCache;
pub use collector::PairCollector;
pub use enrichment::{Enricher, EnrichmentSummary};
pub use pipeline::TokenPipeline;
