// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Token Trust bot entry point.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use teloxide::Bot;
use token_trust_bot::alerts::{spawn_alert_monitor, AlertMonitor};
use token_trust_bot::billing::{spawn_subscription_sync, start_webhook_server, Billing, WebhookState};
use token_trust_bot::format::render_report;
use token_trust_bot::scanner::{ScanOutcome, TokenScanner};
use token_trust_bot::sources::{Sources, REQUEST_TIMEOUT};
use token_trust_bot::storage::Database;
use token_trust_bot::telegram::{run_dispatcher, BotState, TelegramNotifier};
use token_trust_bot::Config;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "token-trust-bot", version, about = "Telegram token risk scanner")]
struct Cli {
    /// Scan one address, print the report and exit
    #[arg(long, value_name = "ADDRESS")]
    scan: Option<String>,

    /// Do not start the payment webhook server
    #[arg(long)]
    no_webhook: bool,
}

async fn scan_once(config: &Config, addr: &str) -> anyhow::Result<()> {
    let scanner = TokenScanner::new(Sources::from_config(config)?);
    info!("🧪 One-off scan for {}", addr);

    match scanner.scan(addr).await {
        ScanOutcome::Report(report) => {
            println!(
                "{}",
                render_report(
                    &report.name,
                    &report.symbol,
                    &report.price_usd,
                    report.volume_24h,
                    &report.assessment,
                )
            );
            for link in &report.socials {
                println!("{}: {}", link.kind, link.url);
            }
            println!("{}", report.chain.explorer_token_url(&report.addr));
        }
        ScanOutcome::NotFound => warn!("❓ No provider knows {}", addr),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load config: {}", e);
        e
    })?;

    if let Some(addr) = cli.scan.as_deref() {
        return scan_once(&config, addr.trim()).await;
    }

    info!("🚀 Starting Token Trust bot");
    let token = config.require_telegram_token()?;
    let db = Database::open(&config.database_path)
        .with_context(|| format!("opening database {}", config.database_path))?;

    let sources = Sources::from_config(&config)?;
    let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    let billing = Billing::new(&config, db.clone(), http);

    let bot = Bot::new(token);
    let notifier = TelegramNotifier::new(Some(bot.clone()));

    if cli.no_webhook {
        info!("Webhook server disabled by flag");
    } else {
        let state = Arc::new(WebhookState {
            db: db.clone(),
            webhook_secret: config.stripe_webhook_secret.clone(),
            period: billing.period(),
        });
        if state.webhook_secret.is_none() {
            warn!("⚠️ STRIPE_WEBHOOK_SECRET not set, webhook events will be rejected");
        }
        let port = config.webhook_port;
        tokio::spawn(async move {
            if let Err(e) = start_webhook_server(port, state).await {
                error!("Webhook server stopped: {}", e);
            }
        });
    }

    let _alerts = spawn_alert_monitor(
        AlertMonitor::new(db.clone(), sources.dexscreener.clone(), notifier.clone()),
        config.alert_interval_sec,
    );
    let _sync = spawn_subscription_sync(
        billing.clone(),
        notifier.clone(),
        config.billing_sync_interval_sec,
    );

    let state = Arc::new(BotState::new(
        TokenScanner::new(sources),
        billing,
        config.dev_user_id,
        config.free_scans,
    ));
    run_dispatcher(bot, state).await;

    info!("👋 Shutting down");
    Ok(())
}
