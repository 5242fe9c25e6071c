// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration module - loads settings from environment variables.

use crate::error::BotError;

/// Main configuration for the scanner bot.
#[derive(Debug, Clone)]
pub struct Config {
    // Telegram
    pub telegram_token: Option<String>,
    pub dev_user_id: i64,

    // Explorers / providers
    pub etherscan_api_key: Option<String>,
    pub bscscan_api_key: Option<String>,
    pub basescan_api_key: Option<String>,
    pub helius_api_key: Option<String>,

    // Billing
    pub stripe_secret_key: Option<String>,
    pub stripe_webhook_secret: Option<String>,
    pub stripe_price_id: Option<String>,
    pub stripe_success_url: String,
    pub stripe_cancel_url: String,
    pub free_scans: u32,
    pub premium_period_days: i64,

    // Runtime
    pub database_path: String,
    pub webhook_port: u16,
    pub alert_interval_sec: u64,
    pub billing_sync_interval_sec: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, BotError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            // Telegram
            telegram_token: optional("TELEGRAM_TOKEN"),
            dev_user_id: parse_or("DEV_USER_ID", 0)?,

            // Explorers / providers
            etherscan_api_key: optional("ETHERSCAN_API_KEY"),
            bscscan_api_key: optional("BSCSCAN_API_KEY"),
            basescan_api_key: optional("BASESCAN_API_KEY"),
            helius_api_key: optional("HELIUS_API_KEY"),

            // Billing
            stripe_secret_key: optional("STRIPE_SECRET_KEY"),
            stripe_webhook_secret: optional("STRIPE_WEBHOOK_SECRET"),
            stripe_price_id: optional("STRIPE_PRICE_ID"),
            stripe_success_url: env_var_or(
                "STRIPE_SUCCESS_URL",
                "https://example.com/thanks-premium-activates-soon",
            ),
            stripe_cancel_url: env_var_or("STRIPE_CANCEL_URL", "https://example.com/cancel"),
            free_scans: parse_or("FREE_SCANS", 3)?,
            premium_period_days: parse_or("PREMIUM_PERIOD_DAYS", 30)?,

            // Runtime
            database_path: env_var_or("DATABASE_PATH", "tokentrust.db"),
            webhook_port: parse_or("WEBHOOK_PORT", 8000)?,
            alert_interval_sec: interval_or("ALERT_INTERVAL_SEC", 60)?,
            billing_sync_interval_sec: interval_or("BILLING_SYNC_INTERVAL_SEC", 300)?,
        })
    }

    /// Telegram token, required when running the bot itself.
    pub fn require_telegram_token(&self) -> Result<String, BotError> {
        self.telegram_token
            .clone()
            .ok_or_else(|| BotError::Config("TELEGRAM_TOKEN not set".to_string()))
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, BotError> {
    match optional(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| BotError::Config(format!("Invalid value for {}: {}", name, raw))),
        None => Ok(default),
    }
}

/// Polling interval in seconds; zero is rejected.
fn interval_or(name: &str, default: u64) -> Result<u64, BotError> {
    match parse_or(name, default)? {
        0 => Err(BotError::Config(format!("{} must be at least 1 second", name))),
        secs => Ok(secs),
    }
}
