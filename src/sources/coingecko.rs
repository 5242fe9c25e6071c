// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! CoinGecko coin metadata for EVM contracts.

use crate::chain::Chain;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

const COINGECKO_BASE: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoinLinks {
    #[serde(default)]
    pub homepage: Vec<String>,
    pub twitter_screen_name: Option<String>,
    pub telegram_channel_identifier: Option<String>,
    #[serde(default)]
    pub chat_url: Vec<String>,
    pub subreddit_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CoinResponse {
    name: Option<String>,
    symbol: Option<String>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    categories: Option<Vec<Option<String>>>,
    #[serde(default)]
    image: Option<Images>,
    #[serde(default)]
    links: Option<CoinLinks>,
    #[serde(default)]
    market_data: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Images {
    large: Option<String>,
    small: Option<String>,
}

/// Flattened coin record.
#[derive(Debug, Clone, Default)]
pub struct CoinGeckoInfo {
    pub description: String,
    pub tags: Vec<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub market_cap: f64,
    pub image: Option<String>,
    pub links: CoinLinks,
    pub price_change_24h: f64,
    pub price_change_7d: f64,
}

impl CoinGeckoInfo {
    pub fn is_meme(&self) -> bool {
        self.tags.iter().any(|t| t.to_lowercase().contains("meme"))
    }
}

#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
}

impl CoinGeckoClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn coin(&self, addr: &str, chain: Chain) -> Option<CoinGeckoInfo> {
        let platform = chain.coingecko_platform()?;
        let url = format!(
            "{}/coins/{}/contract/{}",
            COINGECKO_BASE,
            platform,
            addr.to_lowercase()
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| warn!("CoinGecko error: {}", e))
            .ok()?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| warn!("CoinGecko error: {}", e))
            .ok()?;
        let info = parse_coin(body);
        if info.is_none() {
            debug!("CoinGecko has no listing for {} on {}", addr, chain);
        }
        info
    }
}

fn parse_coin(body: Value) -> Option<CoinGeckoInfo> {
    if body.get("error").is_some() {
        return None;
    }
    let coin: CoinResponse = serde_json::from_value(body)
        .map_err(|e| warn!("CoinGecko error: {}", e))
        .ok()?;

    let market = coin.market_data.unwrap_or(Value::Null);
    let number = |pointer: &str| market.pointer(pointer).and_then(Value::as_f64).unwrap_or(0.0);
    let image = coin.image.unwrap_or_default();

    Some(CoinGeckoInfo {
        description: coin
            .description
            .as_ref()
            .and_then(|d| d.get("en"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string(),
        tags: coin.categories.unwrap_or_default().into_iter().flatten().collect(),
        name: coin.name,
        symbol: coin.symbol,
        market_cap: number("/market_cap/usd"),
        image: image.large.or(image.small),
        links: coin.links.unwrap_or_default(),
        price_change_24h: number("/price_change_percentage_24h"),
        price_change_7d: number("/price_change_percentage_7d"),
    })
}
