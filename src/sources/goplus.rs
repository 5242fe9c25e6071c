// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! GoPlus token-security scanner.
//!
//! The scanner reports most flags as `"0"`/`"1"` strings and fractions as
//! decimal strings; everything is normalized here into a flat record with
//! percentages in the 0..100 range.

use super::{lenient_f64, lenient_string, HolderShare};
use crate::chain::Chain;
use reqwest::Client;
use serde_json::Value;
use tracing::warn;

const GOPLUS_BASE: &str = "https://api.gopluslabs.io/api/v1/token_security";

const BURN_OWNERS: [&str; 2] = [
    "0x0000000000000000000000000000000000000000",
    "0x000000000000000000000000000000000000dead",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityReport {
    /// Largest single holder, percent of supply.
    pub max_holder_percent: f64,
    pub is_honeypot: bool,
    pub buy_tax: f64,
    pub sell_tax: f64,
    pub is_proxy: bool,
    pub liquidity_locked: bool,
    pub locked_percentage: f64,
    pub ownership_renounced: bool,
    pub holder_count: u64,
    pub lp_holder_count: usize,
    pub total_supply: String,
    pub is_mintable: bool,
    pub transfer_pausable: bool,
    pub has_blacklist: bool,
    pub has_whitelist: bool,
    pub is_anti_whale: bool,
    pub owner_change_balance: bool,
    /// Solana only, fraction of supply held by the top ten.
    pub top_10_holder_rate: Option<f64>,
    /// Holder list with percentages already scaled to 0..100.
    pub holders: Vec<HolderShare>,
}

#[derive(Clone)]
pub struct GoPlusClient {
    client: Client,
}

impl GoPlusClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn token_security(&self, addr: &str, chain: Chain) -> Option<SecurityReport> {
        let url = format!(
            "{}/{}?contract_addresses={}",
            GOPLUS_BASE,
            chain.goplus_id(),
            addr
        );

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("GoPlus API request failed: {}", e);
                return None;
            }
        };
        let status = response.status();
        if !status.is_success() {
            warn!("GoPlus API HTTP error, status code: {}", status);
            return None;
        }
        let body: Value = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                warn!("GoPlus API response parsing error: {}", e);
                return None;
            }
        };

        let Some(result) = body.get("result") else {
            warn!("GoPlus API returned unexpected response: {}", body);
            return None;
        };
        let record = result.get(addr).or_else(|| result.get(addr.to_lowercase()));
        match record {
            Some(record) => Some(normalize(record, chain)),
            None => {
                warn!("No data found for address {} on chain {}", addr, chain);
                None
            }
        }
    }
}

fn flag(record: &Value, key: &str) -> bool {
    record.get(key).and_then(Value::as_str) == Some("1")
}

/// Flatten a raw scanner record.
pub fn normalize(record: &Value, chain: Chain) -> SecurityReport {
    let holders: Vec<HolderShare> = record
        .get("holders")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .map(|h| HolderShare {
                    address: lenient_string(h.get("address"), "Unknown"),
                    percent: lenient_f64(h.get("percent")) * 100.0,
                })
                .collect()
        })
        .unwrap_or_default();

    let max_holder_percent = if holders.is_empty() {
        let creator = lenient_f64(record.get("creator_percent"));
        let fraction = if creator != 0.0 {
            creator
        } else {
            lenient_f64(record.get("owner_percentage"))
        };
        fraction * 100.0
    } else {
        holders.iter().map(|h| h.percent).fold(0.0, f64::max)
    };

    let locked_percentage = lenient_f64(record.get("locked_percentage"));
    let owner = record.get("owner_address").and_then(Value::as_str);
    let is_mintable = flag(record, "is_mintable");
    let not_mintable = record.get("is_mintable").and_then(Value::as_str) == Some("0");

    let mut report = SecurityReport {
        max_holder_percent,
        is_honeypot: flag(record, "is_honeypot") || flag(record, "cannot_sell_all"),
        buy_tax: lenient_f64(record.get("buy_tax")) * 100.0,
        sell_tax: lenient_f64(record.get("sell_tax")) * 100.0,
        is_proxy: flag(record, "is_proxy"),
        liquidity_locked: flag(record, "lp_locked") || locked_percentage > 0.0,
        locked_percentage,
        ownership_renounced: owner.map_or(true, |o| o.is_empty() || BURN_OWNERS.contains(&o))
            || not_mintable,
        holder_count: lenient_f64(record.get("holder_count")) as u64,
        lp_holder_count: record
            .get("lp_holders")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0),
        total_supply: lenient_string(record.get("total_supply"), "0"),
        is_mintable,
        transfer_pausable: flag(record, "transfer_pausable"),
        has_blacklist: flag(record, "is_blacklisted"),
        has_whitelist: flag(record, "is_whitelisted"),
        is_anti_whale: flag(record, "is_anti_whale"),
        owner_change_balance: flag(record, "owner_change_balance"),
        top_10_holder_rate: None,
        holders,
    };

    if chain == Chain::Sol {
        let no_authority = |key: &str| record.get(key).map_or(true, Value::is_null);
        report.ownership_renounced = no_authority("mint_authority") && no_authority("freeze_authority");
        report.buy_tax = 0.0;
        report.sell_tax = 0.0;
        report.total_supply = lenient_string(record.get("supply"), "0");
        report.top_10_holder_rate = Some(lenient_f64(record.get("top_10_holder_rate")));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn evm_record_is_normalized() {
        let report = normalize(
            &json!({
                "is_honeypot": "0",
                "cannot_sell_all": "1",
                "buy_tax": "0.05",
                "sell_tax": "0.1",
                "is_proxy": "1",
                "lp_locked": "0",
                "locked_percentage": "0",
                "owner_address": "0x1111111111111111111111111111111111111111",
                "is_mintable": "1",
                "holder_count": "1532",
                "lp_holders": [{}, {}, {}],
                "total_supply": "1000000000",
                "transfer_pausable": "1",
                "is_blacklisted": "0",
                "owner_change_balance": "1",
                "holders": [
                    {"address": "0xaaaa", "percent": "0.12"},
                    {"address": "0xbbbb", "percent": "0.41"}
                ]
            }),
            Chain::Eth,
        );

        assert!(report.is_honeypot);
        assert!((report.buy_tax - 5.0).abs() < 1e-9);
        assert!((report.sell_tax - 10.0).abs() < 1e-9);
        assert!((report.max_holder_percent - 41.0).abs() < 1e-9);
        assert!(report.is_proxy);
        assert!(!report.liquidity_locked);
        assert!(!report.ownership_renounced);
        assert!(report.is_mintable);
        assert!(report.transfer_pausable);
        assert!(report.owner_change_balance);
        assert_eq!(report.holder_count, 1532);
        assert_eq!(report.lp_holder_count, 3);
        assert_eq!(report.top_10_holder_rate, None);
    }

    #[test]
    fn burned_owner_counts_as_renounced() {
        let report = normalize(
            &json!({"owner_address": "0x000000000000000000000000000000000000dead", "is_mintable": "1"}),
            Chain::Bsc,
        );
        assert!(report.ownership_renounced);
    }

    #[test]
    fn creator_percent_fallback() {
        let report = normalize(&json!({"creator_percent": "0.25"}), Chain::Base);
        assert!((report.max_holder_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn locked_percentage_implies_lock() {
        let report = normalize(&json!({"locked_percentage": "0.8"}), Chain::Eth);
        assert!(report.liquidity_locked);
    }

    #[test]
    fn solana_overrides() {
        let report = normalize(
            &json!({
                "buy_tax": "0.3",
                "mint_authority": "SomeAuthority",
                "supply": "999",
                "top_10_holder_rate": "0.35"
            }),
            Chain::Sol,
        );
        assert!(!report.ownership_renounced);
        assert_eq!(report.buy_tax, 0.0);
        assert_eq!(report.total_supply, "999");
        assert_eq!(report.top_10_holder_rate, Some(0.35));
    }
}
