// src/config.rs
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::select::{RankSelection, MID_TIER_RANKS, TOP_TIER_RANKS};

pub const ENV_CONFIG_PATH: &str = "COLLECTOR_CONFIG_PATH";
pub const ENV_STORE_URL: &str = "SUPABASE_URL";
pub const ENV_STORE_KEY: &str = "SUPABASE_KEY";
pub const ENV_INTERVAL: &str = "COLLECT_INTERVAL_SECS";

pub const DEFAULT_TOP_URL: &str = "https://api.hisekai.org/event/live/top100";
pub const DEFAULT_BORDER_URL: &str = "https://api.hisekai.org/event/live/border";
pub const DEFAULT_TABLE: &str = "event_rankings";

fn default_top_url() -> String {
    DEFAULT_TOP_URL.to_string()
}
fn default_border_url() -> String {
    DEFAULT_BORDER_URL.to_string()
}
fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}
fn default_env() -> String {
    "ENV".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreConfig {
    /// "ENV" (or empty) means: read from SUPABASE_URL
    #[serde(default = "default_env")]
    pub url: String,
    /// "ENV" (or empty) means: read from SUPABASE_KEY
    #[serde(default = "default_env")]
    pub api_key: String,
    #[serde(default = "default_table")]
    pub table: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: default_env(),
            api_key: default_env(),
            table: default_table(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RankConfig {
    #[serde(default = "default_top_ranks")]
    pub top: Vec<u32>,
    #[serde(default = "default_mid_ranks")]
    pub mid: Vec<u32>,
}

fn default_top_ranks() -> Vec<u32> {
    TOP_TIER_RANKS.to_vec()
}
fn default_mid_ranks() -> Vec<u32> {
    MID_TIER_RANKS.to_vec()
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            top: default_top_ranks(),
            mid: default_mid_ranks(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectorConfig {
    #[serde(default = "default_top_url")]
    pub top_url: String,
    #[serde(default = "default_border_url")]
    pub border_url: String,
    /// Per-request timeout for feeds and store. Unset: client default (none).
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Run on a fixed interval instead of once.
    #[serde(default)]
    pub interval_secs: Option<u64>,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub ranks: RankConfig,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            top_url: default_top_url(),
            border_url: default_border_url(),
            request_timeout_secs: None,
            interval_secs: None,
            store: StoreConfig::default(),
            ranks: RankConfig::default(),
        }
    }
}

impl CollectorConfig {
    /// Load from an explicit path. TOML or JSON, picked by extension.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading collector config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg = parse_config(&content, ext.as_str())
            .with_context(|| format!("parsing {}", path.display()))?;
        cfg.resolved()
    }

    /// Load using env var + fallbacks:
    /// 1) $COLLECTOR_CONFIG_PATH
    /// 2) config/collector.toml
    /// 3) config/collector.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        for candidate in ["config/collector.toml", "config/collector.json"] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from(&p);
            }
        }
        Self::default().resolved()
    }

    /// Resolve "ENV" placeholders and env overrides, then validate.
    fn resolved(mut self) -> Result<Self> {
        self.store.url = from_env_if_placeholder(&self.store.url, ENV_STORE_URL)?;
        self.store.api_key = from_env_if_placeholder(&self.store.api_key, ENV_STORE_KEY)?;

        if let Ok(v) = std::env::var(ENV_INTERVAL) {
            let secs: u64 = v
                .trim()
                .parse()
                .with_context(|| format!("{ENV_INTERVAL} must be a number of seconds"))?;
            self.interval_secs = Some(secs);
        }
        if self.interval_secs == Some(0) {
            bail!("interval_secs must be greater than zero");
        }
        if self.request_timeout_secs == Some(0) {
            bail!("request_timeout_secs must be greater than zero");
        }
        if self.store.table.trim().is_empty() {
            bail!("store.table must not be empty");
        }

        self.ranks.top = clean_ranks(&self.ranks.top, "ranks.top")?;
        self.ranks.mid = clean_ranks(&self.ranks.mid, "ranks.mid")?;
        Ok(self)
    }

    pub fn selection(&self) -> RankSelection {
        RankSelection {
            top: self.ranks.top.clone(),
            mid: self.ranks.mid.clone(),
        }
    }
}

fn from_env_if_placeholder(value: &str, var: &str) -> Result<String> {
    let v = value.trim();
    if v.is_empty() || v.eq_ignore_ascii_case("env") {
        return std::env::var(var).map_err(|_| anyhow!("Missing {var} env var"));
    }
    Ok(v.to_string())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<CollectorConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("invalid JSON collector config");
    }
    toml::from_str(s).context("invalid TOML collector config")
}

fn clean_ranks(ranks: &[u32], field: &str) -> Result<Vec<u32>> {
    if ranks.contains(&0) {
        bail!("{field}: ranks start at 1");
    }
    let mut out = ranks.to_vec();
    out.sort_unstable();
    out.dedup();
    Ok(out)
}
