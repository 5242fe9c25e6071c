// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Supported chains and address helpers.

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref SOLANA_ADDRESS: Regex = Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").unwrap();
    static ref ANY_ADDRESS: Regex =
        Regex::new(r"(0x[a-fA-F0-9]{40}|[1-9A-HJ-NP-Za-km-z]{32,44})").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Eth,
    Bsc,
    Base,
    Sol,
}

impl Chain {
    /// Map a DexScreener `chainId` onto a supported chain.
    pub fn from_dexscreener(chain_id: &str) -> Option<Self> {
        match chain_id.to_lowercase().as_str() {
            "ethereum" => Some(Chain::Eth),
            "bsc" | "binance" => Some(Chain::Bsc),
            "solana" => Some(Chain::Sol),
            "base" => Some(Chain::Base),
            _ => None,
        }
    }

    /// Parse the short code used in callback data.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "eth" => Some(Chain::Eth),
            "bsc" => Some(Chain::Bsc),
            "base" => Some(Chain::Base),
            "sol" => Some(Chain::Sol),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Chain::Eth => "eth",
            Chain::Bsc => "bsc",
            Chain::Base => "base",
            Chain::Sol => "sol",
        }
    }

    pub fn is_evm(&self) -> bool {
        !matches!(self, Chain::Sol)
    }

    pub fn explorer_host(&self) -> &'static str {
        match self {
            Chain::Eth => "etherscan.io",
            Chain::Bsc => "bscscan.com",
            Chain::Base => "basescan.org",
            Chain::Sol => "solscan.io",
        }
    }

    pub fn explorer_name(&self) -> &'static str {
        match self {
            Chain::Eth => "Etherscan",
            Chain::Bsc => "BscScan",
            Chain::Base => "Basescan",
            Chain::Sol => "Solscan",
        }
    }

    pub fn explorer_token_url(&self, addr: &str) -> String {
        format!("https://{}/token/{}", self.explorer_host(), addr)
    }

    /// Etherscan-family API endpoint. Solana has none.
    pub fn explorer_api(&self) -> Option<&'static str> {
        match self {
            Chain::Eth => Some("https://api.etherscan.io/api"),
            Chain::Bsc => Some("https://api.bscscan.com/api"),
            Chain::Base => Some("https://api.basescan.org/api"),
            Chain::Sol => None,
        }
    }

    pub fn goplus_id(&self) -> &'static str {
        match self {
            Chain::Eth => "1",
            Chain::Bsc => "56",
            Chain::Base => "8453",
            Chain::Sol => "solana",
        }
    }

    pub fn coingecko_platform(&self) -> Option<&'static str> {
        match self {
            Chain::Eth => Some("ethereum"),
            Chain::Bsc => Some("binance-smart-chain"),
            Chain::Base => Some("base"),
            Chain::Sol => None,
        }
    }

    /// Chain for a scan: market data wins, otherwise guess from the address shape.
    pub fn resolve(dexscreener_chain: Option<&str>, addr: &str) -> Self {
        dexscreener_chain
            .and_then(Chain::from_dexscreener)
            .unwrap_or_else(|| {
                if is_solana_address(addr) {
                    Chain::Sol
                } else {
                    Chain::Eth
                }
            })
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code().to_uppercase())
    }
}

pub fn is_solana_address(addr: &str) -> bool {
    SOLANA_ADDRESS.is_match(addr)
}

/// First contract address found in free text.
pub fn find_address(text: &str) -> Option<&str> {
    ANY_ADDRESS.find(text).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_evm_address_in_sentence() {
        let text = "check 0x6982508145454Ce325dDbE47a25d4ec3d2311933 please";
        assert_eq!(
            find_address(text),
            Some("0x6982508145454Ce325dDbE47a25d4ec3d2311933")
        );
    }

    #[test]
    fn finds_solana_mint() {
        let mint = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
        assert_eq!(find_address(mint), Some(mint));
        assert!(is_solana_address(mint));
        assert!(!is_solana_address("0x6982508145454Ce325dDbE47a25d4ec3d2311933"));
    }

    #[test]
    fn rejects_text_without_address() {
        assert_eq!(find_address("hello there"), None);
    }

    #[test]
    fn resolve_prefers_market_data() {
        let mint = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
        assert_eq!(Chain::resolve(Some("base"), mint), Chain::Base);
        assert_eq!(Chain::resolve(Some("arbitrum"), mint), Chain::Sol);
        assert_eq!(
            Chain::resolve(None, "0x6982508145454Ce325dDbE47a25d4ec3d2311933"),
            Chain::Eth
        );
    }

    #[test]
    fn codes_match_callback_format() {
        for chain in [Chain::Eth, Chain::Bsc, Chain::Base, Chain::Sol] {
            assert_eq!(Chain::from_code(chain.code()), Some(chain));
        }
        assert_eq!(Chain::Sol.to_string(), "SOL");
    }
}
