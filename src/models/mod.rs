pub mod pair;
pub mod query;
pub mod token;

pub use pair::{PairRecord, PairToken};
pub use query::{ParamError, QueryView, TokenQuery};
pub use token::{Provenance, TokenAggregate, TokenRow, TokensResult};
