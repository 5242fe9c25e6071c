// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Solana token metadata, supply and largest holders via Helius.

use super::socials::RawSocial;
use super::{lenient_f64, lenient_string, HolderShare};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, warn};

const HELIUS_RPC: &str = "https://mainnet.helius-rpc.com";
const OFFCHAIN_TIMEOUT: Duration = Duration::from_secs(5);
const TOP_HOLDERS: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct SolanaAsset {
    pub name: String,
    pub symbol: String,
    pub verified: bool,
    pub description: Option<String>,
    pub socials: Vec<RawSocial>,
    pub total_supply: String,
    pub image: Option<String>,
    pub mint_authority: Option<String>,
    pub freeze_authority: Option<String>,
    pub holders: Vec<HolderShare>,
}

/// Off-chain JSON metadata referenced by the asset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffchainMetadata {
    pub description: Option<String>,
    pub image: Option<String>,
    pub socials: Vec<RawSocial>,
}

#[derive(Clone)]
pub struct HeliusClient {
    client: Client,
    api_key: Option<String>,
}

impl HeliusClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }

    async fn rpc(&self, key: &str, method: &str, params: Value) -> Option<Value> {
        let body = json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params});
        let url = format!("{}/?api-key={}", HELIUS_RPC, key);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| warn!("Helius {} error: {}", method, e))
            .ok()?;
        let value: Value = response
            .json()
            .await
            .map_err(|e| warn!("Helius {} error: {}", method, e))
            .ok()?;
        value.get("result").cloned()
    }

    async fn offchain(&self, uri: &str) -> Option<OffchainMetadata> {
        let response = self
            .client
            .get(uri)
            .timeout(OFFCHAIN_TIMEOUT)
            .send()
            .await
            .map_err(|e| warn!("Offchain metadata fetch error: {}", e))
            .ok()?;
        let value: Value = response
            .json()
            .await
            .map_err(|e| warn!("Offchain metadata fetch error: {}", e))
            .ok()?;
        Some(parse_offchain(&value))
    }

    /// Metadata, supply and top holders for a mint.
    pub async fn asset(&self, mint: &str) -> Option<SolanaAsset> {
        let Some(key) = self.api_key.as_deref() else {
            error!("Missing HELIUS_API_KEY in environment.");
            return None;
        };

        let asset = self.rpc(key, "getAsset", json!({"id": mint})).await?;
        let content = asset.get("content");
        let metadata = content.and_then(|c| c.get("metadata"));

        let offchain = match content
            .and_then(|c| c.get("json_uri"))
            .and_then(Value::as_str)
            .filter(|u| !u.is_empty())
        {
            Some(uri) => self.offchain(uri).await.unwrap_or_default(),
            None => OffchainMetadata::default(),
        };

        let supply = self
            .rpc(key, "getTokenSupply", json!([mint]))
            .await
            .map(|r| lenient_string(r.pointer("/value/amount"), "0"))
            .unwrap_or_else(|| "0".to_string());

        let largest = self
            .rpc(key, "getTokenLargestAccounts", json!([mint]))
            .await
            .and_then(|r| r.get("value").and_then(Value::as_array).cloned())
            .unwrap_or_default();

        Some(SolanaAsset {
            name: lenient_string(metadata.and_then(|m| m.get("name")), "Unknown"),
            symbol: lenient_string(metadata.and_then(|m| m.get("symbol")), "N/A"),
            verified: content.map(|c| !c.is_null()).unwrap_or(false),
            description: offchain.description,
            socials: offchain.socials,
            holders: holder_shares(&largest, &supply),
            total_supply: supply,
            image: offchain.image,
            mint_authority: authority(&asset, "mint_authority"),
            freeze_authority: authority(&asset, "freeze_authority"),
        })
    }
}

fn authority(asset: &Value, key: &str) -> Option<String> {
    asset
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Social handles may sit at top level or under `extensions`, and the
/// `socials` field may be a list or a map.
pub fn parse_offchain(value: &Value) -> OffchainMetadata {
    let mut socials = Vec::new();
    let extensions = value.get("extensions").cloned().unwrap_or(Value::Null);

    for kind in ["twitter", "telegram", "website"] {
        if let Some(url) = string_field(value, kind).or_else(|| string_field(&extensions, kind)) {
            socials.push(RawSocial::new(kind, url));
        }
    }

    match value.get("socials") {
        Some(Value::Array(items)) => {
            for item in items {
                if let Ok(social) = serde_json::from_value::<RawSocial>(item.clone()) {
                    socials.push(social);
                }
            }
        }
        Some(Value::Object(map)) => {
            for (kind, url) in map {
                if let Some(url) = url.as_str() {
                    socials.push(RawSocial::new(kind, url));
                }
            }
        }
        _ => {}
    }

    OffchainMetadata {
        description: string_field(value, "description"),
        image: string_field(value, "image"),
        socials,
    }
}

fn holder_shares(largest: &[Value], total_supply: &str) -> Vec<HolderShare> {
    let total: f64 = total_supply.parse().unwrap_or(0.0);
    if total_supply == "0" {
        return Vec::new();
    }
    largest
        .iter()
        .take(TOP_HOLDERS)
        .map(|acc| {
            let amount = lenient_f64(acc.get("amount"));
            HolderShare {
                address: lenient_string(acc.get("address"), "Unknown"),
                percent: if total > 0.0 { amount / total * 100.0 } else { 0.0 },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offchain_socials_from_all_shapes() {
        let meta = parse_offchain(&json!({
            "description": "A dog on Solana",
            "image": "https://arweave.net/img",
            "twitter": "https://twitter.com/bonk_inu",
            "extensions": {"telegram": "https://t.me/bonk", "website": ""},
            "socials": {"discord": "https://discord.gg/bonk"}
        }));
        assert_eq!(meta.description.as_deref(), Some("A dog on Solana"));
        let kinds: Vec<&str> = meta.socials.iter().map(|s| s.kind.as_str()).collect();
        assert_eq!(kinds, vec!["twitter", "telegram", "discord"]);
    }

    #[test]
    fn offchain_socials_list() {
        let meta = parse_offchain(&json!({
            "socials": [{"type": "x", "url": "https://x.com/wif"}]
        }));
        assert_eq!(meta.socials, vec![RawSocial::new("x", "https://x.com/wif")]);
        assert!(meta.description.is_none());
    }

    #[test]
    fn holders_are_percent_of_supply() {
        let largest = vec![
            json!({"address": "Holder1111111111111111111111111111111111111", "amount": "250"}),
            json!({"address": "Holder2222222222222222222222222222222222222", "amount": "50"}),
        ];
        let holders = holder_shares(&largest, "1000");
        assert_eq!(holders.len(), 2);
        assert_eq!(holders[0].percent, 25.0);
        assert_eq!(holders[1].percent, 5.0);
        assert!(holder_shares(&largest, "0").is_empty());
    }

    #[test]
    fn only_top_five_holders() {
        let largest: Vec<Value> = (0..8)
            .map(|i| json!({"address": format!("H{}", i), "amount": "1"}))
            .collect();
        assert_eq!(holder_shares(&largest, "100").len(), 5);
    }
}
