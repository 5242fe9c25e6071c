// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use token_trust_bot::alerts::{evaluate, threshold, Alert, AlertKind, Direction};

fn alert(user_id: i64, addr: &str, set: &str, percent: f64, direction: Direction, kind: AlertKind) -> Alert {
    Alert {
        user_id,
        addr: addr.to_string(),
        set_value: set.to_string(),
        percent,
        direction,
        name: addr.to_uppercase(),
        kind,
    }
}

#[test]
fn tiny_prices_keep_precision() {
    let limit = threshold("0.000000012345", 50.0, Direction::Increase).unwrap();
    assert_eq!(limit, Decimal::from_str("0.0000000185175").unwrap());
}

#[test]
fn sweep_fires_each_crossed_alert_once() {
    let alerts = vec![
        alert(1, "pepe", "0.00001", 20.0, Direction::Increase, AlertKind::Price),
        alert(2, "pepe", "0.00001", 20.0, Direction::Decrease, AlertKind::Price),
        alert(3, "bonk", "250000", 10.0, Direction::Decrease, AlertKind::Liquidity),
        alert(4, "wif", "1.5", 5.0, Direction::Increase, AlertKind::Price),
    ];
    let prices = HashMap::from([("pepe".to_string(), "0.000012".to_string())]);
    let liquidities = HashMap::from([("bonk".to_string(), "200000".to_string())]);

    let fired = evaluate(&alerts, &prices, &liquidities);
    assert_eq!(fired.len(), 2);
    assert_eq!(fired[0].0.user_id, 1);
    assert_eq!(
        fired[0].1,
        "ALERT: PEPE price has increased by 20%! Current: $0.0₄1200"
    );
    assert_eq!(fired[1].0.user_id, 3);
    assert_eq!(
        fired[1].1,
        "ALERT: BONK liquidity has decreased by 10%! Current: $200,000"
    );
}
