// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Third-party data providers. Every lookup logs and returns an empty result
//! on failure; nothing here propagates errors to the caller.

pub mod coingecko;
pub mod dexscreener;
pub mod explorer;
pub mod goplus;
pub mod socials;
pub mod solana;
pub mod website;

pub use coingecko::{CoinGeckoClient, CoinGeckoInfo};
pub use dexscreener::{DexScreenerClient, DexSnapshot};
pub use explorer::{ContractSource, ExplorerClient, LaunchInfo};
pub use goplus::{GoPlusClient, SecurityReport};
pub use socials::SocialLink;
pub use solana::{HeliusClient, SolanaAsset};
pub use website::WebsiteScraper;

use crate::config::Config;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default timeout for provider calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A holder and its share of supply, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderShare {
    pub address: String,
    pub percent: f64,
}

/// Token age derived from a launch timestamp. `hours` is only set for tokens
/// younger than a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAge {
    pub days: u64,
    pub hours: Option<u64>,
}

impl TokenAge {
    /// Age of something created at `created_secs`, measured at `now_secs`.
    pub fn from_timestamps(created_secs: i64, now_secs: i64) -> Self {
        let age = (now_secs - created_secs).max(0) as u64;
        let days = age / 86_400;
        let hours = if days == 0 {
            Some((age % 86_400) / 3_600)
        } else {
            None
        };
        Self { days, hours }
    }
}

/// All providers behind one cheaply cloneable handle.
#[derive(Clone)]
pub struct Sources {
    pub dexscreener: DexScreenerClient,
    pub explorer: ExplorerClient,
    pub helius: HeliusClient,
    pub goplus: GoPlusClient,
    pub coingecko: CoinGeckoClient,
    pub website: WebsiteScraper,
}

impl Sources {
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            dexscreener: DexScreenerClient::new(client.clone()),
            explorer: ExplorerClient::new(
                client.clone(),
                config.etherscan_api_key.clone(),
                config.bscscan_api_key.clone(),
                config.basescan_api_key.clone(),
            ),
            helius: HeliusClient::new(client.clone(), config.helius_api_key.clone()),
            goplus: GoPlusClient::new(client.clone()),
            coingecko: CoinGeckoClient::new(client.clone()),
            website: WebsiteScraper::new(client),
        })
    }
}

/// Read a JSON value that providers send either as a string or a number.
pub(crate) fn lenient_f64(value: Option<&serde_json::Value>) -> f64 {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// String view of a JSON scalar, `default` when missing or null.
pub(crate) fn lenient_string(value: Option<&serde_json::Value>, default: &str) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn young_tokens_report_hours() {
        let age = TokenAge::from_timestamps(1_000_000, 1_000_000 + 5 * 3_600 + 59);
        assert_eq!(age, TokenAge { days: 0, hours: Some(5) });
    }

    #[test]
    fn older_tokens_report_days_only() {
        let age = TokenAge::from_timestamps(0, 9 * 86_400 + 100);
        assert_eq!(age, TokenAge { days: 9, hours: None });
    }

    #[test]
    fn lenient_numbers() {
        let v = json!({"a": "0.05", "b": 12, "c": null});
        assert_eq!(lenient_f64(v.get("a")), 0.05);
        assert_eq!(lenient_f64(v.get("b")), 12.0);
        assert_eq!(lenient_f64(v.get("c")), 0.0);
        assert_eq!(lenient_string(v.get("b"), "0"), "12");
        assert_eq!(lenient_string(v.get("missing"), "0"), "0");
    }
}
