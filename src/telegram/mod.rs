// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Telegram bot: dispatcher wiring, handlers, keyboards and the notifier.

pub mod handlers;
pub mod keyboard;
pub mod notifier;

pub use handlers::{BotState, Command, HandlerResult, PendingAlert};
pub use keyboard::{Callback, CallbackAction};
pub use notifier::TelegramNotifier;

use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;

/// Run the update dispatcher until Ctrl-C.
pub async fn run_dispatcher(bot: Bot, state: Arc<BotState>) {
    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handlers::handle_command),
                )
                .branch(dptree::endpoint(handlers::handle_text)),
        )
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback));

    info!("🤖 Telegram dispatcher running");
    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
