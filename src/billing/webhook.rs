// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Stripe webhook server: signature verification and subscription events.

use crate::error::{BotError, Result};
use crate::storage::Database;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, NaiveDateTime};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha256;
use std::sync::Arc;
use tracing::{error, info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed payload, in seconds.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Check a `Stripe-Signature` header (`t=<unix>,v1=<hex>[,v1=...]`) against
/// the raw payload.
pub fn verify_signature(payload: &[u8], header: &str, secret: &str, now_secs: i64) -> Result<()> {
    let mut timestamp: Option<i64> = None;
    let mut signatures = Vec::new();
    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp =
        timestamp.ok_or_else(|| BotError::Signature("missing timestamp".to_string()))?;
    if signatures.is_empty() {
        return Err(BotError::Signature("no v1 signature".to_string()));
    }
    if (now_secs - timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(BotError::Signature("timestamp outside tolerance".to_string()));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BotError::Signature(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);

    let matched = signatures.iter().any(|sig| {
        hex::decode(sig)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });
    if matched {
        Ok(())
    } else {
        Err(BotError::Signature("no matching signature".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: EventData,
}

#[derive(Debug, Deserialize)]
pub struct EventData {
    pub object: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Activated { user_id: i64 },
    Renewed { user_id: i64 },
    Revoked { users: usize },
    /// Renewal for a subscription nobody holds.
    Unmatched,
    Ignored,
}

/// Subscription id on an invoice, in both the classic and the newer layout.
fn invoice_subscription(invoice: &Value) -> Option<&str> {
    invoice["subscription"]
        .as_str()
        .or_else(|| invoice["parent"]["subscription_details"]["subscription"].as_str())
}

/// Apply one verified event to the user table.
pub fn apply_event(
    db: &Database,
    event: &Event,
    period: Duration,
    now: NaiveDateTime,
) -> Result<EventOutcome> {
    let object = &event.data.object;
    match event.kind.as_str() {
        "checkout.session.completed" => {
            let user_id = object["client_reference_id"]
                .as_str()
                .and_then(|id| id.parse::<i64>().ok())
                .ok_or_else(|| BotError::Payload("missing client_reference_id".to_string()))?;
            let sub_id = object["subscription"].as_str();
            db.activate_premium(user_id, sub_id, now + period)?;
            info!(
                "✅ Premium activated for user {} via checkout (sub: {})",
                user_id,
                sub_id.unwrap_or("none")
            );
            Ok(EventOutcome::Activated { user_id })
        }
        "invoice.payment_succeeded" => {
            let Some(sub_id) = invoice_subscription(object) else {
                return Ok(EventOutcome::Ignored);
            };
            let Some(user) = db.find_by_subscription(sub_id)? else {
                warn!("Renewal for unknown subscription {}", sub_id);
                return Ok(EventOutcome::Unmatched);
            };
            let base = user.expiry.map_or(now, |exp| exp.max(now));
            db.extend_subscription(sub_id, base + period)?;
            info!("🔄 Subscription renewed for user {} (sub: {})", user.user_id, sub_id);
            Ok(EventOutcome::Renewed {
                user_id: user.user_id,
            })
        }
        "customer.subscription.deleted" => {
            let sub_id = object["id"]
                .as_str()
                .ok_or_else(|| BotError::Payload("subscription without id".to_string()))?;
            let users = db.revoke_subscription(sub_id)?;
            info!("Subscription canceled for sub {}", sub_id);
            Ok(EventOutcome::Revoked { users })
        }
        _ => Ok(EventOutcome::Ignored),
    }
}

/// Webhook server state.
pub struct WebhookState {
    pub db: Database,
    pub webhook_secret: Option<String>,
    pub period: Duration,
}

pub fn router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/webhook", post(handle_webhook))
        .with_state(state)
}

/// Start the webhook server.
pub async fn start_webhook_server(port: u16, state: Arc<WebhookState>) -> std::result::Result<(), String> {
    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    info!("🌐 Starting webhook server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("Failed to bind: {}", e))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({"status": "OK"}))
}

fn process(state: &WebhookState, headers: &HeaderMap, body: &[u8]) -> Result<EventOutcome> {
    let secret = state
        .webhook_secret
        .as_deref()
        .ok_or(BotError::BillingDisabled("STRIPE_WEBHOOK_SECRET not set"))?;
    let header = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| BotError::Signature("missing Stripe-Signature header".to_string()))?;

    verify_signature(body, header, secret, chrono::Utc::now().timestamp())?;
    let event: Event =
        serde_json::from_slice(body).map_err(|e| BotError::Payload(e.to_string()))?;
    apply_event(&state.db, &event, state.period, chrono::Utc::now().naive_utc())
}

async fn handle_webhook(
    State(state): State<Arc<WebhookState>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    match process(&state, &headers, &body) {
        Ok(outcome) => {
            info!("Webhook processed: {:?}", outcome);
            (StatusCode::OK, Json(json!({"status": "success"})))
        }
        Err(e) => {
            error!("Webhook rejected: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"detail": e.to_string()})),
            )
        }
    }
}
