// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Heuristic risk score.
//!
//! A fixed sequence of independent checks. Each failing check adds its weight
//! and a red flag; each passing check adds a green flag. The total is clamped
//! to 100.

use crate::format::{format_large_number, format_usd};

pub const MAX_SCORE: u32 = 100;

const MIN_LIQUIDITY_USD: f64 = 500.0;
const MIN_AGE_DAYS: u64 = 7;
const MAX_WHALE_PCT: f64 = 30.0;
const MIN_MARKET_CAP_USD: f64 = 1_000_000.0;
const MAX_TAX_PCT: f64 = 5.0;
const MIN_LP_HOLDERS: usize = 2;
const MIN_HOLDERS: u64 = 100;

/// Everything the scorer looks at, already merged from the providers.
#[derive(Debug, Clone, Default)]
pub struct RiskInputs {
    pub verified: bool,
    pub liquidity_usd: f64,
    /// Age in whole days, `None` when no provider knows the launch.
    pub age_days: Option<u64>,
    /// Human description of the launch, e.g. `Launched: May 01, 2024 (12 days ago)`.
    pub launch_text: String,
    pub whale_pct: f64,
    pub owner_can_change_balance: bool,
    pub market_cap_usd: f64,
    pub audited: bool,
    pub admin_controls: Vec<String>,
    pub is_honeypot: bool,
    pub buy_tax: f64,
    pub sell_tax: f64,
    pub is_proxy: bool,
    /// Whether a security-scanner record was available at all.
    pub has_scanner_data: bool,
    pub liquidity_locked: bool,
    pub locked_pct: f64,
    pub lp_holder_count: usize,
    pub is_solana: bool,
    pub ownership_renounced: bool,
    pub holder_count: Option<u64>,
    pub is_mintable: bool,
    pub total_supply: String,
    pub transfer_pausable: bool,
    pub has_blacklist: bool,
    pub is_anti_whale: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn from_score(score: u32) -> Self {
        match score {
            0..=20 => RiskLevel::VeryLow,
            21..=40 => RiskLevel::Low,
            41..=60 => RiskLevel::Medium,
            61..=80 => RiskLevel::High,
            _ => RiskLevel::VeryHigh,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "✅ Very Low",
            RiskLevel::Low => "🟢 Low",
            RiskLevel::Medium => "🟡 Medium",
            RiskLevel::High => "🟠 High",
            RiskLevel::VeryHigh => "🔴 Very High",
        }
    }

    /// Plain-language guidance shown under the score.
    pub fn verdict(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow | RiskLevel::Low => {
                "This token presents a low risk profile. It could be a reasonable addition to your portfolio if it aligns with your investment goals, though I recommend starting with a small position and using alerts to monitor for any unexpected changes."
            }
            RiskLevel::Medium => {
                "This token has a medium risk profile - proceed with caution and consider small positions while monitoring via alerts."
            }
            RiskLevel::High | RiskLevel::VeryHigh => {
                "This token shows a higher risk level - it's best to approach with caution and avoid significant investment until these risks are mitigated; consider setting alerts to track price movements or liquidity changes."
            }
        }
    }
}

/// Scored result with the evidence behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub score: u32,
    pub level: RiskLevel,
    pub green_flags: Vec<String>,
    pub red_flags: Vec<String>,
    /// Short phrases for each red flag, e.g. `low liquidity`.
    pub negatives: Vec<&'static str>,
    /// Informational tax line for small non-zero taxes.
    pub tax_info: Option<String>,
}

#[derive(Default)]
struct Tally {
    score: u32,
    green: Vec<String>,
    red: Vec<String>,
    negatives: Vec<&'static str>,
}

impl Tally {
    fn pass(&mut self, flag: impl Into<String>) {
        self.green.push(flag.into());
    }

    fn fail(&mut self, weight: u32, flag: impl Into<String>, negative: &'static str) {
        self.score += weight;
        self.red.push(flag.into());
        self.negatives.push(negative);
    }
}

pub fn assess(inputs: &RiskInputs) -> RiskAssessment {
    let mut t = Tally::default();

    if inputs.verified {
        t.pass("Contract verified on the blockchain.");
    } else {
        t.fail(20, "Contract not verified on the blockchain.", "an unverified contract");
    }

    if inputs.liquidity_usd >= MIN_LIQUIDITY_USD {
        t.pass(format!("Liquidity: {}.", format_usd(inputs.liquidity_usd)));
    } else {
        t.fail(
            20,
            format!("Liquidity low: {}.", format_usd(inputs.liquidity_usd)),
            "low liquidity",
        );
    }

    match inputs.age_days {
        Some(days) if days >= MIN_AGE_DAYS => t.pass(inputs.launch_text.clone()),
        _ => t.fail(
            15,
            format!(
                "Very new token: {} (high risk of volatility or rugs).",
                inputs.launch_text
            ),
            "a very new token",
        ),
    }

    if inputs.whale_pct <= MAX_WHALE_PCT {
        t.pass("No major wallet dominance.");
    } else {
        t.fail(
            15,
            format!("Warning: one wallet holds {:.1}% of supply.", inputs.whale_pct),
            "large whale holdings",
        );
    }

    if inputs.owner_can_change_balance {
        t.fail(15, "Owner can change balances.", "owner can change balances");
    } else {
        t.pass("Owner cannot change balances.");
    }

    if inputs.market_cap_usd >= MIN_MARKET_CAP_USD {
        t.pass(format!("Market cap: {}.", format_usd(inputs.market_cap_usd)));
    } else if inputs.market_cap_usd > 0.0 {
        t.fail(
            10,
            format!("Market cap low: {}.", format_usd(inputs.market_cap_usd)),
            "low market cap",
        );
    }

    if inputs.audited {
        t.pass("Security audit found.");
    } else {
        t.fail(20, "No official security audit found.", "no security audit");
    }

    if inputs.admin_controls.is_empty() {
        t.pass("No risky admin functions found.");
    } else {
        t.fail(
            20,
            format!("Risky admin functions: {}.", inputs.admin_controls.join(", ")),
            "risky admin functions",
        );
    }

    if inputs.is_honeypot {
        t.fail(30, "Honeypot detected: may not be sellable.", "honeypot risk");
    } else {
        t.pass("No honeypot risks found.");
    }

    let taxes = format!("Buy {:.1}%, Sell {:.1}%.", inputs.buy_tax, inputs.sell_tax);
    let mut tax_info = None;
    if inputs.buy_tax == 0.0 && inputs.sell_tax == 0.0 {
        t.pass(format!("Taxes: {}", taxes));
    } else if inputs.buy_tax > MAX_TAX_PCT || inputs.sell_tax > MAX_TAX_PCT {
        t.fail(10, format!("High taxes: {}", taxes), "high taxes");
    } else if inputs.buy_tax > 0.0 || inputs.sell_tax > 0.0 {
        tax_info = Some(format!("Taxes: {}", taxes));
    }

    if inputs.is_proxy {
        t.fail(15, "Proxy contract: upgradable.", "a proxy contract");
    } else {
        t.pass("Not a proxy contract.");
    }

    let lock_detail = format!(
        "({:.2}%). LP Holders: {}",
        inputs.locked_pct, inputs.lp_holder_count
    );
    if inputs.liquidity_locked {
        t.pass(format!("Liquidity locked {}", lock_detail));
    } else if inputs.has_scanner_data {
        t.fail(
            15,
            format!("Liquidity not locked {}", lock_detail),
            "unlocked liquidity",
        );
    }

    if inputs.has_scanner_data && !inputs.is_solana && inputs.lp_holder_count < MIN_LP_HOLDERS {
        t.fail(10, "Concentrated LP holders.", "concentrated LP holders");
    }

    if inputs.ownership_renounced {
        t.pass("Ownership renounced.");
    } else {
        t.fail(15, "Ownership not renounced.", "ownership not renounced");
    }

    if let Some(count) = inputs.holder_count.filter(|c| *c > 0) {
        if count >= MIN_HOLDERS {
            t.pass(format!("Holder count: {}.", count));
        } else {
            t.fail(10, format!("Low holder count: {}.", count), "low holder count");
        }
    }

    if inputs.is_mintable {
        t.fail(
            10,
            "Token mintable: supply can increase (unlimited max supply).",
            "mintable supply",
        );
    } else {
        t.pass(format!(
            "Not mintable: fixed supply of {} tokens.",
            format_large_number(&inputs.total_supply)
        ));
    }

    if inputs.transfer_pausable {
        t.fail(10, "Transfers pausable.", "pausable transfers");
    } else {
        t.pass("Transfers not pausable.");
    }

    if inputs.has_blacklist {
        t.fail(15, "Has blacklist function.", "a blacklist function");
    } else {
        t.pass("No blacklist function.");
    }

    if inputs.is_anti_whale {
        t.pass("Anti-whale mechanisms in place.");
    }

    let score = t.score.min(MAX_SCORE);
    RiskAssessment {
        score,
        level: RiskLevel::from_score(score),
        green_flags: t.green,
        red_flags: t.red,
        negatives: t.negatives,
        tax_info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Established token that passes every check.
    fn blue_chip() -> RiskInputs {
        RiskInputs {
            verified: true,
            liquidity_usd: 2_500_000.0,
            age_days: Some(400),
            launch_text: "Launched: April 14, 2023 (400 days ago)".to_string(),
            whale_pct: 8.0,
            market_cap_usd: 4_000_000_000.0,
            audited: true,
            has_scanner_data: true,
            liquidity_locked: true,
            locked_pct: 99.5,
            lp_holder_count: 12,
            ownership_renounced: true,
            holder_count: Some(250_000),
            total_supply: "420690000000000".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn clean_token_scores_zero() {
        let result = assess(&blue_chip());
        assert_eq!(result.score, 0);
        assert_eq!(result.level, RiskLevel::VeryLow);
        assert!(result.red_flags.is_empty());
        assert!(result
            .green_flags
            .contains(&"Liquidity: $2,500,000.".to_string()));
        assert!(result
            .green_flags
            .contains(&"Not mintable: fixed supply of 420.7 trillion tokens.".to_string()));
    }

    #[test]
    fn weights_add_up() {
        let inputs = RiskInputs {
            verified: false,
            liquidity_usd: 100.0,
            ..blue_chip()
        };
        let result = assess(&inputs);
        assert_eq!(result.score, 40);
        assert_eq!(result.level, RiskLevel::Low);
        assert_eq!(result.negatives, vec!["an unverified contract", "low liquidity"]);
    }

    #[test]
    fn score_is_clamped() {
        let inputs = RiskInputs {
            launch_text: "Launch date unknown".to_string(),
            whale_pct: 90.0,
            owner_can_change_balance: true,
            market_cap_usd: 1_000.0,
            admin_controls: vec!["mint".to_string()],
            is_honeypot: true,
            buy_tax: 12.0,
            sell_tax: 99.0,
            is_proxy: true,
            has_scanner_data: true,
            holder_count: Some(3),
            is_mintable: true,
            transfer_pausable: true,
            has_blacklist: true,
            ..Default::default()
        };
        let result = assess(&inputs);
        assert_eq!(result.score, MAX_SCORE);
        assert_eq!(result.level, RiskLevel::VeryHigh);
        assert!(result
            .red_flags
            .contains(&"Very new token: Launch date unknown (high risk of volatility or rugs).".to_string()));
        assert!(result
            .red_flags
            .contains(&"High taxes: Buy 12.0%, Sell 99.0%.".to_string()));
    }

    #[test]
    fn small_taxes_are_informational() {
        let inputs = RiskInputs {
            buy_tax: 1.0,
            sell_tax: 2.0,
            ..blue_chip()
        };
        let result = assess(&inputs);
        assert_eq!(result.score, 0);
        assert_eq!(result.tax_info.as_deref(), Some("Taxes: Buy 1.0%, Sell 2.0%."));
    }

    #[test]
    fn unknown_market_cap_is_skipped() {
        let inputs = RiskInputs {
            market_cap_usd: 0.0,
            ..blue_chip()
        };
        let result = assess(&inputs);
        assert_eq!(result.score, 0);
        assert!(!result.green_flags.iter().any(|g| g.starts_with("Market cap")));
    }

    #[test]
    fn lock_checks_need_scanner_data() {
        let without_scanner = RiskInputs {
            has_scanner_data: false,
            liquidity_locked: false,
            lp_holder_count: 0,
            ..blue_chip()
        };
        assert_eq!(assess(&without_scanner).score, 0);

        let with_scanner = RiskInputs {
            liquidity_locked: false,
            lp_holder_count: 1,
            ..blue_chip()
        };
        assert_eq!(assess(&with_scanner).score, 25);
    }

    #[test]
    fn solana_skips_lp_concentration() {
        let inputs = RiskInputs {
            is_solana: true,
            lp_holder_count: 0,
            ..blue_chip()
        };
        assert_eq!(assess(&inputs).score, 0);
    }

    #[test]
    fn labels_follow_bands() {
        assert_eq!(RiskLevel::from_score(20), RiskLevel::VeryLow);
        assert_eq!(RiskLevel::from_score(21), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(60), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(80), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(81), RiskLevel::VeryHigh);
        assert!(RiskLevel::Medium.verdict().contains("medium risk"));
    }
}
