// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

use chrono::Duration;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::sync::Arc;
use token_trust_bot::billing::webhook::router;
use token_trust_bot::billing::WebhookState;
use token_trust_bot::storage::Database;

const SECRET: &str = "whsec_integration";

fn signature(payload: &str, t: i64) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
    mac.update(format!("{}.{}", t, payload).as_bytes());
    format!("t={},v1={}", t, hex::encode(mac.finalize().into_bytes()))
}

async fn serve(db: Database) -> String {
    let state = Arc::new(WebhookState {
        db,
        webhook_secret: Some(SECRET.to_string()),
        period: Duration::days(30),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn health_endpoints_report_ok() {
    let base = serve(Database::open_in_memory().unwrap()).await;
    for path in ["/", "/health"] {
        let body: serde_json::Value = reqwest::get(format!("{}{}", base, path))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, serde_json::json!({"status": "OK"}));
    }
}

#[tokio::test]
async fn signed_checkout_activates_premium() {
    let db = Database::open_in_memory().unwrap();
    let base = serve(db.clone()).await;
    let payload = r#"{"type":"checkout.session.completed","data":{"object":{"client_reference_id":"55","subscription":"sub_55"}}}"#;

    let response = reqwest::Client::new()
        .post(format!("{}/webhook", base))
        .header("Stripe-Signature", signature(payload, chrono::Utc::now().timestamp()))
        .body(payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(db.get_user(55).unwrap().unwrap().is_premium);
}

#[tokio::test]
async fn bad_signature_is_rejected() {
    let db = Database::open_in_memory().unwrap();
    let base = serve(db.clone()).await;
    let payload = r#"{"type":"checkout.session.completed","data":{"object":{"client_reference_id":"56"}}}"#;

    let response = reqwest::Client::new()
        .post(format!("{}/webhook", base))
        .header("Stripe-Signature", "t=1,v1=00")
        .body(payload)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert!(db.get_user(56).unwrap().is_none());
}
