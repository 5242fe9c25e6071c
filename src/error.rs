// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error types shared by storage, billing and the webhook server.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Billing API error: {status} - {message}")]
    Billing { status: u16, message: String },
    #[error("Billing is not configured: {0}")]
    BillingDisabled(&'static str),
    #[error("Invalid webhook signature: {0}")]
    Signature(String),
    #[error("Invalid webhook payload: {0}")]
    Payload(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BotError>;
