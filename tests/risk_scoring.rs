// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

use token_trust_bot::format::render_report;
use token_trust_bot::validators::{assess, RiskInputs, RiskLevel};

fn established_token() -> RiskInputs {
    RiskInputs {
        verified: true,
        liquidity_usd: 2_500_000.0,
        age_days: Some(600),
        launch_text: "Launched: April 14, 2023 (600 days ago)".to_string(),
        whale_pct: 4.0,
        market_cap_usd: 3_000_000_000.0,
        has_scanner_data: true,
        liquidity_locked: true,
        locked_pct: 99.0,
        lp_holder_count: 40,
        ownership_renounced: true,
        holder_count: Some(300_000),
        total_supply: "420690000000000".to_string(),
        ..Default::default()
    }
}

#[test]
fn established_token_only_misses_audit() {
    let result = assess(&established_token());
    assert_eq!(result.score, 20);
    assert_eq!(result.level, RiskLevel::VeryLow);
    assert_eq!(result.red_flags, vec!["No official security audit found."]);
    assert_eq!(result.negatives, vec!["no security audit"]);
    assert!(result
        .green_flags
        .iter()
        .any(|f| f == "Launched: April 14, 2023 (600 days ago)"));
}

#[test]
fn fresh_rug_candidate_is_capped() {
    let inputs = RiskInputs {
        verified: false,
        liquidity_usd: 120.0,
        age_days: Some(0),
        launch_text: "Launched approximately 2 hours ago".to_string(),
        whale_pct: 80.0,
        owner_can_change_balance: true,
        is_honeypot: true,
        sell_tax: 99.0,
        has_scanner_data: true,
        is_mintable: true,
        ..Default::default()
    };
    let result = assess(&inputs);
    assert_eq!(result.score, 100);
    assert_eq!(result.level, RiskLevel::VeryHigh);
    assert!(result
        .red_flags
        .contains(&"Very new token: Launched approximately 2 hours ago (high risk of volatility or rugs).".to_string()));
    assert!(result.red_flags.contains(&"Warning: one wallet holds 80.0% of supply.".to_string()));
}

#[test]
fn medium_band_verdict() {
    let inputs = RiskInputs {
        is_proxy: true,
        has_blacklist: true,
        ..established_token()
    };
    let result = assess(&inputs);
    assert_eq!(result.score, 50);
    assert_eq!(result.level, RiskLevel::Medium);

    let report = render_report("Pepe", "PEPE", "0.0000123", 1_000_000.0, &result);
    assert!(report.contains("Risk Score: 50/100 - 🟡 Medium"));
    assert!(report.contains("- Proxy contract: upgradable.\n"));
    assert!(report.ends_with(RiskLevel::Medium.verdict()));
}

#[test]
fn unknown_age_counts_as_new() {
    let inputs = RiskInputs {
        age_days: None,
        launch_text: "Launch date unknown".to_string(),
        ..established_token()
    };
    let result = assess(&inputs);
    assert_eq!(result.score, 35);
    assert!(result.negatives.contains(&"a very new token"));
}
