// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Inline keyboards and the callback data they carry.

use crate::alerts::{AlertKind, Direction};
use crate::chain::Chain;
use crate::scanner::TokenReport;
use reqwest::Url;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    About,
    Holders,
    Alert,
    PriceAlerts,
    LiquidityAlerts,
    SetAlert(AlertKind, Direction),
    Social,
}

const ACTIONS: [(CallbackAction, &str); 10] = [
    (CallbackAction::About, "about_"),
    (CallbackAction::Holders, "holders_"),
    (CallbackAction::Alert, "alert_"),
    (CallbackAction::PriceAlerts, "price_alerts_"),
    (CallbackAction::LiquidityAlerts, "liq_alerts_"),
    (
        CallbackAction::SetAlert(AlertKind::Price, Direction::Increase),
        "price_inc_",
    ),
    (
        CallbackAction::SetAlert(AlertKind::Price, Direction::Decrease),
        "price_dec_",
    ),
    (
        CallbackAction::SetAlert(AlertKind::Liquidity, Direction::Increase),
        "liq_inc_",
    ),
    (
        CallbackAction::SetAlert(AlertKind::Liquidity, Direction::Decrease),
        "liq_dec_",
    ),
    (CallbackAction::Social, "social_"),
];

impl CallbackAction {
    fn prefix(&self) -> &'static str {
        ACTIONS
            .iter()
            .find(|(action, _)| action == self)
            .map(|(_, prefix)| *prefix)
            .unwrap_or("about_")
    }

    /// Whether the action is part of the premium alert flow.
    pub fn needs_premium(&self) -> bool {
        matches!(
            self,
            CallbackAction::Alert
                | CallbackAction::PriceAlerts
                | CallbackAction::LiquidityAlerts
                | CallbackAction::SetAlert(..)
        )
    }
}

/// Callback payload: `{prefix}{addr}_{chain}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callback {
    pub action: CallbackAction,
    pub addr: String,
    pub chain: Chain,
}

impl Callback {
    pub fn new(action: CallbackAction, addr: &str, chain: Chain) -> Self {
        Self {
            action,
            addr: addr.to_string(),
            chain,
        }
    }

    pub fn encode(&self) -> String {
        format!("{}{}_{}", self.action.prefix(), self.addr, self.chain.code())
    }

    pub fn parse(data: &str) -> Option<Self> {
        let (action, rest) = ACTIONS
            .iter()
            .find_map(|(action, prefix)| data.strip_prefix(prefix).map(|rest| (*action, rest)))?;
        let (addr, chain) = rest.rsplit_once('_')?;
        if addr.is_empty() {
            return None;
        }
        Some(Self {
            action,
            addr: addr.to_string(),
            chain: Chain::from_code(chain)?,
        })
    }
}

fn callback_button(text: &str, action: CallbackAction, addr: &str, chain: Chain) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, Callback::new(action, addr, chain).encode())
}

fn url_button(text: &str, url: &str) -> Option<InlineKeyboardButton> {
    match Url::parse(url) {
        Ok(url) => Some(InlineKeyboardButton::url(text, url)),
        Err(e) => {
            warn!("Skipping button {} with bad url {}: {}", text, url, e);
            None
        }
    }
}

/// Follow-up actions under a scan report, two per row.
pub fn report_keyboard(report: &TokenReport) -> InlineKeyboardMarkup {
    let (addr, chain) = (report.addr.as_str(), report.chain);
    let mut buttons = Vec::new();

    if let Some(chart) = &report.chart_url {
        buttons.extend(url_button("📈 View Chart", chart));
    }
    if report.has_description {
        buttons.push(callback_button("📝 Token Description", CallbackAction::About, addr, chain));
    }
    if report.has_holders {
        buttons.push(callback_button("🏆 Top Holders", CallbackAction::Holders, addr, chain));
    }
    buttons.push(callback_button("🔔 Set Alerts", CallbackAction::Alert, addr, chain));
    if !report.socials.is_empty() {
        buttons.push(callback_button(
            "🌐 Social Links/Website",
            CallbackAction::Social,
            addr,
            chain,
        ));
    }
    buttons.extend(url_button(
        &format!("🔍 Explore on {}", chain.explorer_name()),
        &chain.explorer_token_url(addr),
    ));

    InlineKeyboardMarkup::new(buttons.chunks(2).map(|row| row.to_vec()))
}

/// Shown when only the placeholder description exists.
pub fn limited_description_keyboard(addr: &str, chain: Chain) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        callback_button("🔔 Set Alerts", CallbackAction::Alert, addr, chain),
        callback_button("🌐 Social Links/Website", CallbackAction::Social, addr, chain),
    ]])
}

pub fn alert_type_keyboard(addr: &str, chain: Chain) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![callback_button("Price Alerts", CallbackAction::PriceAlerts, addr, chain)],
        vec![callback_button(
            "Liquidity Alerts",
            CallbackAction::LiquidityAlerts,
            addr,
            chain,
        )],
    ])
}

/// Increase/decrease choice for one alert kind.
pub fn direction_keyboard(kind: AlertKind, addr: &str, chain: Chain) -> InlineKeyboardMarkup {
    let label = match kind {
        AlertKind::Price => "Price",
        AlertKind::Liquidity => "Liquidity",
    };
    InlineKeyboardMarkup::new(vec![vec![
        callback_button(
            &format!("{} Increase Alert", label),
            CallbackAction::SetAlert(kind, Direction::Increase),
            addr,
            chain,
        ),
        callback_button(
            &format!("{} Decrease Alert", label),
            CallbackAction::SetAlert(kind, Direction::Decrease),
            addr,
            chain,
        ),
    ]])
}
