// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Etherscan-family explorers: verified source code and launch date.

use super::{lenient_string, TokenAge};
use crate::chain::Chain;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde_json::Value;
use tracing::warn;

const UNVERIFIED_MARKER: &str = "Contract source code not verified";

/// Verified-source lookup result.
#[derive(Debug, Clone, Default)]
pub struct ContractSource {
    pub verified: bool,
    pub name: String,
    pub source_code: String,
}

/// First transaction seen for a contract.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchInfo {
    pub date: String,
    pub age: TokenAge,
}

#[derive(Clone)]
pub struct ExplorerClient {
    client: Client,
    etherscan_key: Option<String>,
    bscscan_key: Option<String>,
    basescan_key: Option<String>,
}

impl ExplorerClient {
    pub fn new(
        client: Client,
        etherscan_key: Option<String>,
        bscscan_key: Option<String>,
        basescan_key: Option<String>,
    ) -> Self {
        Self {
            client,
            etherscan_key,
            bscscan_key,
            basescan_key,
        }
    }

    fn api_key(&self, chain: Chain) -> Option<&str> {
        match chain {
            Chain::Eth => self.etherscan_key.as_deref(),
            Chain::Bsc => self.bscscan_key.as_deref(),
            Chain::Base => self
                .basescan_key
                .as_deref()
                .or(self.etherscan_key.as_deref()),
            Chain::Sol => None,
        }
    }

    async fn get_json(&self, url: &str) -> Option<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| warn!("Explorer request error: {}", e))
            .ok()?;
        response
            .json::<Value>()
            .await
            .map_err(|e| warn!("Explorer response error: {}", e))
            .ok()
    }

    /// Source-code lookup for an EVM contract.
    pub async fn contract(&self, addr: &str, chain: Chain) -> Option<ContractSource> {
        let base = chain.explorer_api()?;
        let key = self.api_key(chain).unwrap_or_default();
        let url = format!(
            "{}?module=contract&action=getsourcecode&address={}&apikey={}",
            base, addr, key
        );
        let body = self.get_json(&url).await?;
        let parsed = parse_contract(&body);
        if parsed.is_none() {
            warn!("{} explorer returned no contract data for {}", chain, addr);
        }
        parsed
    }

    /// Launch date from the earliest transaction touching the contract.
    pub async fn launch_info(&self, addr: &str, chain: Chain) -> Option<LaunchInfo> {
        let base = chain.explorer_api()?;
        let key = self.api_key(chain)?;
        let url = format!(
            "{}?module=account&action=txlist&address={}&startblock=0&endblock=99999999&page=1&offset=1&sort=asc&apikey={}",
            base, addr, key
        );
        let body = self.get_json(&url).await?;
        parse_launch(&body, Utc::now().timestamp())
    }
}

fn parse_contract(body: &Value) -> Option<ContractSource> {
    if body.get("status").and_then(Value::as_str) != Some("1") {
        return None;
    }
    let info = body.get("result")?.as_array()?.first()?;
    let source_code = lenient_string(info.get("SourceCode"), "");
    let verified = !source_code.is_empty() && source_code != UNVERIFIED_MARKER;
    let name = match lenient_string(info.get("ContractName"), "Unknown") {
        n if n.is_empty() => "Unknown".to_string(),
        n => n,
    };

    Some(ContractSource {
        verified,
        name,
        source_code,
    })
}

fn parse_launch(body: &Value, now_secs: i64) -> Option<LaunchInfo> {
    if body.get("status").and_then(Value::as_str) != Some("1") {
        return None;
    }
    let tx = body.get("result")?.as_array()?.first()?;
    let timestamp: i64 = lenient_string(tx.get("timeStamp"), "")
        .parse()
        .map_err(|e| warn!("Launch date fetch error: {}", e))
        .ok()?;
    let date = Utc.timestamp_opt(timestamp, 0).single()?;

    Some(LaunchInfo {
        date: date.format("%B %d, %Y").to_string(),
        age: TokenAge::from_timestamps(timestamp, now_secs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn verified_contract() {
        let body = json!({
            "status": "1",
            "result": [{"SourceCode": "contract Pepe { function mint( }", "ContractName": "PepeToken"}]
        });
        let source = parse_contract(&body).unwrap();
        assert!(source.verified);
        assert_eq!(source.name, "PepeToken");
    }

    #[test]
    fn unverified_contract() {
        let body = json!({
            "status": "1",
            "result": [{"SourceCode": "", "ContractName": ""}]
        });
        let source = parse_contract(&body).unwrap();
        assert!(!source.verified);
        assert_eq!(source.name, "Unknown");
    }

    #[test]
    fn error_status_is_none() {
        assert!(parse_contract(&json!({"status": "0", "result": "Invalid API Key"})).is_none());
    }

    #[test]
    fn launch_from_first_tx() {
        // 2023-04-14 00:00:00 UTC
        let launched = 1_681_430_400;
        let body = json!({"status": "1", "result": [{"timeStamp": launched.to_string()}]});
        let info = parse_launch(&body, launched + 10 * 86_400).unwrap();
        assert_eq!(info.date, "April 14, 2023");
        assert_eq!(info.age.days, 10);
    }
}
