// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Token Trust - Telegram bot that scores crypto tokens for rug-pull risk.

pub mod alerts;
pub mod billing;
pub mod chain;
pub mod config;
pub mod error;
pub mod format;
pub mod scanner;
pub mod sources;
pub mod storage;
pub mod telegram;
pub mod validators;

pub use config::Config;
pub use error::{BotError, Result};
