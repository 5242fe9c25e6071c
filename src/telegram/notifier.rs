// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Telegram notifier for background tasks.

use teloxide::prelude::*;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Option<Bot>,
}

impl TelegramNotifier {
    pub fn new(bot: Option<Bot>) -> Self {
        info!(
            "📱 Initializing Telegram notifier: bot={}",
            if bot.is_some() { "SET" } else { "NONE" }
        );
        Self { bot }
    }

    /// Notifier that only logs, for runs without a bot token.
    pub fn disabled() -> Self {
        Self { bot: None }
    }

    /// Send a plain message to a user's private chat. Returns whether it was delivered.
    pub async fn send_to(&self, user_id: i64, message: &str) -> bool {
        let Some(bot) = &self.bot else {
            debug!("Notifier disabled, dropping message for {}", user_id);
            return false;
        };
        match bot.send_message(ChatId(user_id), message).await {
            Ok(_) => {
                info!("📤 Sent Telegram message to {}", user_id);
                true
            }
            Err(e) => {
                error!("Failed to send Telegram message to {}: {}", user_id, e);
                false
            }
        }
    }
}
