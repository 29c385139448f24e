use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MAX_PAGES: u32 = 20;
pub const MAX_AGE_DAYS: u32 = 90;
pub const MAX_LIMIT: usize = 500;

pub const DEFAULT_PAGES: u32 = 5;
pub const DEFAULT_AGE_DAYS: u32 = 7;
pub const DEFAULT_LIMIT: usize = 100;

/// The three pair orderings the subgraph is queried with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryView {
    Volume,
    Liquidity,
    New,
}

impl QueryView {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryView::Volume => "volume",
            QueryView::Liquidity => "liquidity",
            QueryView::New => "new",
        }
    }
}

impl fmt::Display for QueryView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryView {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "volume" => Ok(QueryView::Volume),
            "liquidity" => Ok(QueryView::Liquidity),
            "new" => Ok(QueryView::New),
            other => Err(ParamError::UnknownView(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("unknown view '{0}', expected volume, liquidity or new")]
    UnknownView(String),
    #[error("pages must be between 1 and 20, got {0}")]
    PagesOutOfRange(u32),
    #[error("days must be between 1 and 90, got {0}")]
    AgeOutOfRange(u32),
    #[error("limit must be between 1 and 500, got {0}")]
    LimitOutOfRange(usize),
}

/// Normalized, validated request parameters. Two queries with equal fields
/// share one cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenQuery {
    pub view: QueryView,
    pub pages: u32,
    pub age_days: u32,
    pub limit: usize,
}

impl TokenQuery {
    pub fn new(view: QueryView, pages: u32, age_days: u32, limit: usize) -> Result<Self, ParamError> {
        if pages == 0 || pages > MAX_PAGES {
            return Err(ParamError::PagesOutOfRange(pages));
        }
        if age_days == 0 || age_days > MAX_AGE_DAYS {
            return Err(ParamError::AgeOutOfRange(age_days));
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(ParamError::LimitOutOfRange(limit));
        }
        Ok(Self {
            view,
            pages,
            age_days,
            limit,
        })
    }

    pub fn cache_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.view.as_str(),
            self.pages,
            self.age_days,
            self.limit
        )
    }
}

impl Default for TokenQuery {
    fn default() -> Self {
        Self {
            view: QueryView::Volume,
            pages: DEFAULT_PAGES,
            age_days: DEFAULT_AGE_DAYS,
            limit: DEFAULT_LIMIT,
        }
    }
}
