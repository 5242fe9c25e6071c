// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command, text and callback handlers.

use super::keyboard::{
    alert_type_keyboard, direction_keyboard, limited_description_keyboard, report_keyboard,
    Callback, CallbackAction,
};
use crate::alerts::{Alert, AlertKind, Direction};
use crate::billing::Billing;
use crate::chain::{find_address, Chain};
use crate::format::{
    escape_html, render_report, short_address, split_message, trim_description, CAPTION_LIMIT,
    TEXT_LIMIT,
};
use crate::scanner::{HolderSummary, ScanOutcome, TokenReport, TokenScanner};
use reqwest::Url;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardMarkup, InputFile, ParseMode};
use teloxide::utils::command::BotCommands;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

const DESCRIPTION_BUDGET: usize = 800;
const PREMIUM_ONLY: &str =
    "Alerts are a premium feature - upgrade for unlimited scans + alerts! /premium";

#[derive(BotCommands, Clone)]
#[command(rename_rule = "snake_case", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "welcome message")]
    Start,
    #[command(description = "reset your scan count (developers only)")]
    Reset,
    #[command(description = "check your premium subscription")]
    PremiumStatus,
    #[command(description = "get a premium checkout link")]
    Premium,
}

/// Alert awaiting its percentage from the user's next message.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAlert {
    pub addr: String,
    pub chain: Chain,
    pub name: String,
    pub direction: Direction,
    pub kind: AlertKind,
}

/// Shared handler state.
pub struct BotState {
    pub scanner: TokenScanner,
    pub billing: Billing,
    pub dev_user_id: i64,
    pub free_scans: u32,
    pub pending: Mutex<HashMap<i64, PendingAlert>>,
}

impl BotState {
    pub fn new(scanner: TokenScanner, billing: Billing, dev_user_id: i64, free_scans: u32) -> Self {
        Self {
            scanner,
            billing,
            dev_user_id,
            free_scans,
            pending: Mutex::new(HashMap::new()),
        }
    }
}

/// Percentage typed for a pending alert; must be a positive finite number.
pub fn parse_percent(text: &str) -> Option<f64> {
    text.trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p > 0.0)
}

pub fn holders_message(summary: &HolderSummary) -> String {
    match summary {
        HolderSummary::List(holders) => {
            let lines: Vec<String> = holders
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    format!("- #{}: {:.2}% ({})", i + 1, h.percent, short_address(&h.address))
                })
                .collect();
            format!("🏆 Top Holders: \n\n{}", lines.join("\n"))
        }
        HolderSummary::TopTenRate(rate) => {
            format!("🏆 Top 10 Holders: {:.2}% of supply", rate)
        }
        HolderSummary::Unavailable => "🏆 No detailed holder data available.".to_string(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

async fn send_checkout(bot: &Bot, chat: ChatId, state: &BotState, user_id: i64) -> HandlerResult {
    let prefix = format!(
        "You've used your {} free scans. Upgrade to premium for unlimited scans and price/liquidity alerts!",
        state.free_scans
    );
    match state.billing.checkout_url(user_id).await {
        Ok(url) => {
            bot.send_message(
                chat,
                format!(
                    "{} <a href=\"{}\">Subscribe here</a> (Activates in minutes!)",
                    escape_html(&prefix),
                    escape_html(&url)
                ),
            )
            .parse_mode(ParseMode::Html)
            .await?;
        }
        Err(e) => {
            error!("Failed to create checkout session for {}: {}", user_id, e);
            bot.send_message(
                chat,
                format!(
                    "{} Subscribe here (Error generating dynamic link - check logs for details.)",
                    prefix
                ),
            )
            .await?;
        }
    }
    Ok(())
}

pub async fn handle_command(bot: Bot, msg: Message, cmd: Command, state: Arc<BotState>) -> HandlerResult {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    match cmd {
        Command::Start => {
            bot.send_message(
                msg.chat.id,
                "Hello and welcome to Token Trust. Please send a CA (Contract Address) to scan any crypto token.",
            )
            .await?;
        }
        Command::Reset => {
            if user_id != state.dev_user_id {
                bot.send_message(msg.chat.id, "This command is for developers only.")
                    .await?;
                return Ok(());
            }
            state.billing.database().reset_scans(user_id)?;
            bot.send_message(msg.chat.id, "Your scan count has been reset to 0 for testing.")
                .await?;
        }
        Command::PremiumStatus => {
            if state.billing.is_premium(user_id).await {
                let expiry = state
                    .billing
                    .expiry(user_id)
                    .map(crate::storage::format_expiry)
                    .unwrap_or_else(|| "unknown".to_string());
                bot.send_message(
                    msg.chat.id,
                    format!(
                        "You're premium! Expires: {}. Enjoy unlimited scans and alerts.",
                        expiry
                    ),
                )
                .await?;
                return Ok(());
            }
            bot.send_message(msg.chat.id, "Not premium yet, checking Stripe now...")
                .await?;
            let reply = if state.billing.is_premium(user_id).await {
                "Premium activated! Enjoy unlimited scans and alerts."
            } else {
                "No active subscription found. Upgrade via /premium!"
            };
            bot.send_message(msg.chat.id, reply).await?;
        }
        Command::Premium => {
            if state.billing.is_premium(user_id).await {
                bot.send_message(msg.chat.id, "You're already premium. Enjoy unlimited scans and alerts!")
                    .await?;
                return Ok(());
            }
            match state.billing.checkout_url(user_id).await {
                Ok(url) => {
                    bot.send_message(
                        msg.chat.id,
                        format!(
                            "Unlimited scans and price/liquidity alerts: <a href=\"{}\">Subscribe here</a> (Activates in minutes!)",
                            escape_html(&url)
                        ),
                    )
                    .parse_mode(ParseMode::Html)
                    .await?;
                }
                Err(e) => {
                    error!("Failed to create checkout session for {}: {}", user_id, e);
                    bot.send_message(msg.chat.id, "Checkout is unavailable right now. Try again later!")
                        .await?;
                }
            }
        }
    }
    Ok(())
}

/// Send text in parts within the message limit; the keyboard goes on the last part.
async fn send_split(
    bot: &Bot,
    chat: ChatId,
    text: &str,
    markup: Option<InlineKeyboardMarkup>,
) -> HandlerResult {
    let parts = split_message(text, TEXT_LIMIT);
    let last = parts.len().saturating_sub(1);
    for (i, part) in parts.into_iter().enumerate() {
        let request = bot.send_message(chat, part);
        match (&markup, i == last) {
            (Some(m), true) => request.reply_markup(m.clone()).await?,
            _ => request.await?,
        };
    }
    Ok(())
}

/// Image with caption when it fits, otherwise image then split text.
async fn deliver_report(bot: &Bot, chat: ChatId, report: &TokenReport) -> HandlerResult {
    let text = render_report(
        &report.name,
        &report.symbol,
        &report.price_usd,
        report.volume_24h,
        &report.assessment,
    );
    let markup = report_keyboard(report);

    let image = report.image.as_deref().and_then(|url| Url::parse(url).ok());
    if let Some(url) = image {
        if text.chars().count() <= CAPTION_LIMIT {
            match bot
                .send_photo(chat, InputFile::url(url.clone()))
                .caption(text.clone())
                .reply_markup(markup.clone())
                .await
            {
                Ok(_) => return Ok(()),
                Err(e) => warn!("Failed to send photo with caption: {}", e),
            }
        }
        if let Err(e) = bot.send_photo(chat, InputFile::url(url)).await {
            warn!("Failed to send photo: {}", e);
        }
    }
    send_split(bot, chat, &text, Some(markup)).await
}

async fn complete_alert(
    bot: &Bot,
    msg: &Message,
    state: &BotState,
    user_id: i64,
    setup: PendingAlert,
    text: &str,
) -> HandlerResult {
    let Some(percent) = parse_percent(text) else {
        bot.send_message(msg.chat.id, "Invalid % - try again (e.g., 10).")
            .await?;
        return Ok(());
    };
    state.pending.lock().await.remove(&user_id);

    let dex = &state.scanner.sources().dexscreener;
    let current = setup.kind.current_value(dex, &setup.addr).await;
    if current == "0" {
        bot.send_message(
            msg.chat.id,
            format!("Couldn't fetch current {} - try again later.", setup.kind.as_str()),
        )
        .await?;
        return Ok(());
    }

    let alert = Alert {
        user_id,
        addr: setup.addr,
        set_value: current,
        percent,
        direction: setup.direction,
        name: setup.name,
        kind: setup.kind,
    };
    state.billing.database().upsert_alert(&alert)?;
    info!("🔔 Alert set for user {} on {}", user_id, alert.addr);
    bot.send_message(msg.chat.id, alert.confirmation()).await?;
    Ok(())
}

pub async fn handle_text(bot: Bot, msg: Message, state: Arc<BotState>) -> HandlerResult {
    let (Some(text), Some(user)) = (msg.text(), msg.from.as_ref()) else {
        return Ok(());
    };
    let user_id = user.id.0 as i64;

    let pending = state.pending.lock().await.get(&user_id).cloned();
    if let Some(setup) = pending {
        return complete_alert(&bot, &msg, &state, user_id, setup, text).await;
    }

    let Some(addr) = find_address(text.trim()) else {
        bot.send_message(msg.chat.id, "❌ Please send a valid contract address.")
            .await?;
        return Ok(());
    };

    if !state.billing.can_scan(user_id).await {
        return send_checkout(&bot, msg.chat.id, &state, user_id).await;
    }

    match state.scanner.scan(addr).await {
        ScanOutcome::Report(report) => deliver_report(&bot, msg.chat.id, &report).await,
        ScanOutcome::NotFound => {
            bot.send_message(
                msg.chat.id,
                "Hmm, I couldn't find info for this token. Maybe it's new or a rare one? Please try another address! 😊",
            )
            .await?;
            Ok(())
        }
    }
}

async fn show_description(bot: &Bot, chat: ChatId, state: &BotState, cb: &Callback) -> HandlerResult {
    let description = state.scanner.describe(&cb.addr, cb.chain).await;
    if !description.meaningful {
        bot.send_message(
            chat,
            "Limited token description available for this new token. Set alerts to track updates or check socials!",
        )
        .reply_markup(limited_description_keyboard(&cb.addr, cb.chain))
        .await?;
        return Ok(());
    }
    let token_type = if description.is_meme { "Meme Coin" } else { "Token" };
    let body = format!(
        "Token Description for {} ({}) - {}:\n\n{}",
        description.name,
        description.symbol,
        token_type,
        trim_description(&description.text, DESCRIPTION_BUDGET)
    );
    send_split(bot, chat, &body, None).await
}

async fn show_socials(bot: &Bot, chat: ChatId, state: &BotState, cb: &Callback) -> HandlerResult {
    let socials = state.scanner.socials(&cb.addr, cb.chain).await;
    if socials.is_empty() {
        bot.send_message(chat, "No social links or website found for this token.")
            .await?;
        return Ok(());
    }
    let mut text = "🌐 Social Links/Website:\n\n".to_string();
    for social in &socials {
        text.push_str(&format!("{} - {}\n", capitalize(&social.kind), social.url));
    }
    bot.send_message(chat, text).await?;
    Ok(())
}

/// Chat holding the pressed keyboard, or the user's private chat when the
/// message is no longer available.
fn reply_chat(message_chat: Option<ChatId>, user_id: i64) -> ChatId {
    message_chat.unwrap_or(ChatId(user_id))
}

fn alert_prompt(name: &str, kind: AlertKind, direction: Direction) -> String {
    match kind {
        AlertKind::Price => format!("Enter % change for {} Price {} alert:", name, direction),
        AlertKind::Liquidity => format!(
            "Enter % change for {} liquidity {} alert:",
            name,
            direction.as_str()
        ),
    }
}

pub async fn handle_callback(bot: Bot, q: CallbackQuery, state: Arc<BotState>) -> HandlerResult {
    bot.answer_callback_query(q.id.clone()).await?;

    let user_id = q.from.id.0 as i64;
    let chat = reply_chat(q.message.as_ref().map(|m| m.chat().id), user_id);
    let Some(cb) = q.data.as_deref().and_then(Callback::parse) else {
        warn!("Unrecognized callback data: {:?}", q.data);
        bot.send_message(chat, "Error processing request. Try again!")
            .await?;
        return Ok(());
    };

    if cb.action.needs_premium() && !state.billing.is_premium(user_id).await {
        bot.send_message(chat, PREMIUM_ONLY).await?;
        return Ok(());
    }

    match cb.action {
        CallbackAction::About => show_description(&bot, chat, &state, &cb).await?,
        CallbackAction::Holders => {
            let summary = state.scanner.top_holders(&cb.addr, cb.chain).await;
            bot.send_message(chat, holders_message(&summary)).await?;
        }
        CallbackAction::Alert => {
            bot.send_message(chat, "Choose Alert Type:")
                .reply_markup(alert_type_keyboard(&cb.addr, cb.chain))
                .await?;
        }
        CallbackAction::PriceAlerts => {
            bot.send_message(chat, "Choose Price Alert Type:")
                .reply_markup(direction_keyboard(AlertKind::Price, &cb.addr, cb.chain))
                .await?;
        }
        CallbackAction::LiquidityAlerts => {
            bot.send_message(chat, "Choose Liquidity Alert Type:")
                .reply_markup(direction_keyboard(AlertKind::Liquidity, &cb.addr, cb.chain))
                .await?;
        }
        CallbackAction::SetAlert(kind, direction) => {
            let name = state.scanner.token_name(&cb.addr, cb.chain).await;
            bot.send_message(chat, alert_prompt(&name, kind, direction))
                .await?;
            state.pending.lock().await.insert(
                user_id,
                PendingAlert {
                    addr: cb.addr.clone(),
                    chain: cb.chain,
                    name,
                    direction,
                    kind,
                },
            );
        }
        CallbackAction::Social => show_socials(&bot, chat, &state, &cb).await?,
    }
    Ok(())
}
