use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub subgraph: SubgraphConfig,
    #[serde(default)]
    pub screener: ScreenerConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SubgraphConfig {
    #[serde(default = "default_subgraph_url")]
    pub url: String,
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScreenerConfig {
    #[serde(default = "default_screener_url")]
    pub url: String,
    #[serde(default = "default_chain")]
    pub chain: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilterConfig {
    #[serde(default = "default_excluded_symbols")]
    pub excluded_symbols: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8787
}
fn default_ttl_secs() -> u64 {
    30
}
fn default_subgraph_url() -> String {
    "https://graph.pulsechain.com/subgraphs/name/pulsechain/pulsex".to_string()
}
fn default_retries() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    250
}
fn default_page_size() -> usize {
    1000
}
fn default_screener_url() -> String {
    "https://api.dexscreener.com".to_string()
}
fn default_chain() -> String {
    "pulsechain".to_string()
}
fn default_batch_size() -> usize {
    30
}
fn default_max_concurrent() -> usize {
    4
}
fn default_excluded_symbols() -> Vec<String> {
    ["WPLS", "WETH", "DAI", "USDC", "USDT"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl Default for SubgraphConfig {
    fn default() -> Self {
        Self {
            url: default_subgraph_url(),
            retries: default_retries(),
            base_delay_ms: default_base_delay_ms(),
            page_size: default_page_size(),
        }
    }
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            url: default_screener_url(),
            chain: default_chain(),
            batch_size: default_batch_size(),
            max_concurrent: default_max_concurrent(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            excluded_symbols: default_excluded_symbols(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        match fs::read_to_string("config.toml") {
            Ok(content) => {
                let config: Config = toml::from_str(&content)?;
                Ok(config)
            }
            Err(_) => Ok(Config::default()),
        }
    }
}
