// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Price and liquidity threshold alerts.

pub mod monitor;

pub use monitor::{evaluate, spawn_alert_monitor, AlertMonitor};

use crate::format::{format_price, format_usd_str};
use crate::sources::DexScreenerClient;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Price,
    Liquidity,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Price => "price",
            AlertKind::Liquidity => "liquidity",
        }
    }

    /// Current value as a decimal string, `"0"` when unavailable.
    pub async fn current_value(&self, dex: &DexScreenerClient, addr: &str) -> String {
        match self {
            AlertKind::Price => dex.current_price(addr).await,
            AlertKind::Liquidity => dex.current_liquidity(addr).await,
        }
    }

    /// Display form of a value of this kind.
    pub fn format_value(&self, value: &str) -> String {
        match self {
            AlertKind::Price => format_price(value),
            AlertKind::Liquidity => format_usd_str(value),
        }
    }
}

impl FromStr for AlertKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(AlertKind::Price),
            "liquidity" => Ok(AlertKind::Liquidity),
            other => Err(format!("unknown alert type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increase,
    Decrease,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Increase => "increase",
            Direction::Decrease => "decrease",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Direction::Increase => "increased",
            Direction::Decrease => "decreased",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Increase => write!(f, "Increase"),
            Direction::Decrease => write!(f, "Decrease"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increase" => Ok(Direction::Increase),
            "decrease" => Ok(Direction::Decrease),
            other => Err(format!("unknown direction: {}", other)),
        }
    }
}

/// One stored alert. A user holds at most one alert per address.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub user_id: i64,
    pub addr: String,
    /// Value observed when the alert was set.
    pub set_value: String,
    pub percent: f64,
    pub direction: Direction,
    pub name: String,
    pub kind: AlertKind,
}

/// Parse a provider decimal, accepting scientific notation.
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// Trigger level: `set * (1 + p/100)` upward, `set * (1 - p/100)` downward.
pub fn threshold(set_value: &str, percent: f64, direction: Direction) -> Option<Decimal> {
    let set = parse_decimal(set_value)?;
    let ratio = Decimal::from_f64(percent)? / Decimal::ONE_HUNDRED;
    Some(match direction {
        Direction::Increase => set * (Decimal::ONE + ratio),
        Direction::Decrease => set * (Decimal::ONE - ratio),
    })
}

impl Alert {
    pub fn is_triggered(&self, current: &str) -> bool {
        let (Some(limit), Some(current)) = (
            threshold(&self.set_value, self.percent, self.direction),
            parse_decimal(current),
        ) else {
            return false;
        };
        match self.direction {
            Direction::Increase => current >= limit,
            Direction::Decrease => current <= limit,
        }
    }

    /// Notification sent when the alert fires.
    pub fn message(&self, current: &str) -> String {
        format!(
            "ALERT: {} {} has {} by {}%! Current: {}",
            self.name,
            self.kind.as_str(),
            self.direction.verb(),
            self.percent,
            self.kind.format_value(current)
        )
    }

    /// Reply confirming a newly stored alert.
    pub fn confirmation(&self) -> String {
        format!(
            "{} alert set for {} {} at {}% from current ({})! We'll notify you if it exceeds that.",
            self.direction,
            self.name,
            self.kind.as_str(),
            self.percent,
            self.kind.format_value(&self.set_value)
        )
    }
}
