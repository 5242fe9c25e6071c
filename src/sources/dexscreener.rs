// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! DexScreener market data: price, liquidity, volume and pair metadata.

use super::socials::RawSocial;
use super::TokenAge;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

const DEXSCREENER_BASE: &str = "https://api.dexscreener.com";

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    pairs: Option<Vec<DexPair>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DexPair {
    #[serde(default)]
    chain_id: String,
    url: Option<String>,
    price_usd: Option<String>,
    #[serde(default)]
    volume: Option<Window>,
    #[serde(default)]
    liquidity: Option<Liquidity>,
    fdv: Option<f64>,
    pair_created_at: Option<i64>,
    #[serde(default)]
    price_change: Option<Window>,
    #[serde(default)]
    info: Option<PairInfo>,
    #[serde(default)]
    base_token: Option<BaseToken>,
}

#[derive(Debug, Default, Deserialize)]
struct Window {
    h24: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct Liquidity {
    usd: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PairInfo {
    image_url: Option<String>,
    #[serde(default)]
    socials: Vec<RawSocial>,
    #[serde(default)]
    websites: Vec<Website>,
}

#[derive(Debug, Default, Deserialize)]
struct Website {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct BaseToken {
    name: Option<String>,
    symbol: Option<String>,
}

/// Flattened view of the top pair for a token.
#[derive(Debug, Clone, Default)]
pub struct DexSnapshot {
    pub volume_24h: f64,
    pub liquidity_usd: f64,
    pub fdv: f64,
    pub age: Option<TokenAge>,
    pub chart_url: Option<String>,
    pub chain_id: String,
    pub price_usd: String,
    pub socials: Vec<RawSocial>,
    pub websites: Vec<String>,
    pub image: Option<String>,
    pub price_change_24h: f64,
    pub base_name: Option<String>,
    pub base_symbol: Option<String>,
}

#[derive(Clone)]
pub struct DexScreenerClient {
    client: Client,
}

impl DexScreenerClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Top search result for `addr`.
    pub async fn search(&self, addr: &str) -> Option<DexSnapshot> {
        let url = format!("{}/latest/dex/search?q={}", DEXSCREENER_BASE, addr);
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("DexScreener error: {}", e);
                return None;
            }
        };
        let body: SearchResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!("DexScreener error: {}", e);
                return None;
            }
        };
        let snapshot = snapshot_from(body, chrono::Utc::now().timestamp());
        if snapshot.is_none() {
            debug!("DexScreener has no pairs for {}", addr);
        }
        snapshot
    }

    /// Current USD price as DexScreener reports it, `"0"` when unknown.
    pub async fn current_price(&self, addr: &str) -> String {
        self.search(addr)
            .await
            .map(|s| s.price_usd)
            .unwrap_or_else(|| "0".to_string())
    }

    /// Current USD liquidity of the top pair, `"0"` when unknown.
    pub async fn current_liquidity(&self, addr: &str) -> String {
        self.search(addr)
            .await
            .map(|s| liquidity_string(s.liquidity_usd))
            .unwrap_or_else(|| "0".to_string())
    }
}

fn liquidity_string(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

fn snapshot_from(body: SearchResponse, now_secs: i64) -> Option<DexSnapshot> {
    let pair = body.pairs?.into_iter().next()?;
    let info = pair.info.unwrap_or_default();
    let base = pair.base_token.unwrap_or_default();

    let age = pair
        .pair_created_at
        .filter(|ms| *ms > 0)
        .map(|ms| TokenAge::from_timestamps(ms / 1000, now_secs));

    Some(DexSnapshot {
        volume_24h: pair.volume.and_then(|v| v.h24).unwrap_or(0.0),
        liquidity_usd: pair.liquidity.and_then(|l| l.usd).unwrap_or(0.0),
        fdv: pair.fdv.unwrap_or(0.0),
        age,
        chart_url: pair.url,
        chain_id: pair.chain_id.to_lowercase(),
        price_usd: pair.price_usd.unwrap_or_else(|| "0".to_string()),
        socials: info.socials,
        websites: info
            .websites
            .into_iter()
            .map(|w| w.url)
            .filter(|u| !u.is_empty())
            .collect(),
        image: info.image_url,
        price_change_24h: pair.price_change.and_then(|p| p.h24).unwrap_or(0.0),
        base_name: base.name,
        base_symbol: base.symbol,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value, now: i64) -> Option<DexSnapshot> {
        snapshot_from(serde_json::from_value(value).unwrap(), now)
    }

    #[test]
    fn reads_first_pair() {
        let now = 1_700_000_000;
        let snapshot = parse(
            json!({
                "pairs": [{
                    "chainId": "Ethereum",
                    "url": "https://dexscreener.com/ethereum/0xpair",
                    "priceUsd": "0.00001234",
                    "volume": {"h24": 152000.5},
                    "liquidity": {"usd": 48000.0},
                    "fdv": 5200000.0,
                    "pairCreatedAt": (now - 3 * 86_400) * 1000,
                    "priceChange": {"h24": -4.2},
                    "info": {
                        "imageUrl": "https://cdn.example/pepe.png",
                        "socials": [{"type": "twitter", "url": "https://x.com/pepe"}],
                        "websites": [{"label": "Website", "url": "https://pepe.vip"}]
                    },
                    "baseToken": {"name": "Pepe", "symbol": "PEPE"}
                }, {
                    "chainId": "bsc"
                }]
            }),
            now,
        )
        .unwrap();

        assert_eq!(snapshot.chain_id, "ethereum");
        assert_eq!(snapshot.price_usd, "0.00001234");
        assert_eq!(snapshot.liquidity_usd, 48000.0);
        assert_eq!(snapshot.age, Some(TokenAge { days: 3, hours: None }));
        assert_eq!(snapshot.websites, vec!["https://pepe.vip".to_string()]);
        assert_eq!(snapshot.socials.len(), 1);
        assert_eq!(snapshot.base_symbol.as_deref(), Some("PEPE"));
    }

    #[test]
    fn missing_fields_default() {
        let snapshot = parse(json!({"pairs": [{"chainId": "solana"}]}), 0).unwrap();
        assert_eq!(snapshot.price_usd, "0");
        assert_eq!(snapshot.volume_24h, 0.0);
        assert!(snapshot.age.is_none());
        assert!(snapshot.chart_url.is_none());
    }

    #[test]
    fn no_pairs_is_none() {
        assert!(parse(json!({"pairs": null}), 0).is_none());
        assert!(parse(json!({"pairs": []}), 0).is_none());
    }

    #[test]
    fn zero_liquidity_reads_as_unknown() {
        assert_eq!(liquidity_string(0.0), "0");
        assert_eq!(liquidity_string(1500.25), "1500.25");
    }
}
