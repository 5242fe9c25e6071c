// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Minimal Stripe REST client: checkout sessions and subscriptions.

use crate::error::{BotError, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

const STRIPE_API: &str = "https://api.stripe.com/v1";
const PAGE_SIZE: &str = "100";

#[derive(Debug, Clone, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl Subscription {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// Terminal states that end premium access.
    pub fn is_ended(&self) -> bool {
        matches!(self.status.as_str(), "canceled" | "incomplete_expired")
    }

    /// Telegram user id carried in the subscription metadata.
    pub fn user_id(&self) -> Option<i64> {
        self.metadata.get("user_id")?.parse().ok()
    }
}

#[derive(Debug, Deserialize)]
struct SubscriptionPage {
    data: Vec<Subscription>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct CheckoutSession {
    url: Option<String>,
}

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
}

impl StripeClient {
    pub fn new(client: Client, secret_key: String) -> Self {
        Self { client, secret_key }
    }

    async fn read<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(BotError::Billing {
                status: status.as_u16(),
                message,
            });
        }
        Ok(serde_json::from_value(body)?)
    }

    /// Hosted checkout URL for a monthly subscription bought by `user_id`.
    pub async fn create_checkout_session(
        &self,
        user_id: i64,
        price_id: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<String> {
        let user = user_id.to_string();
        let form = [
            ("mode", "subscription"),
            ("payment_method_types[0]", "card"),
            ("line_items[0][price]", price_id),
            ("line_items[0][quantity]", "1"),
            ("success_url", success_url),
            ("cancel_url", cancel_url),
            ("client_reference_id", user.as_str()),
            ("metadata[user_id]", user.as_str()),
            ("subscription_data[metadata][user_id]", user.as_str()),
        ];
        let response = self
            .client
            .post(format!("{}/checkout/sessions", STRIPE_API))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;
        let session: CheckoutSession = Self::read(response).await?;
        debug!("Checkout session created for user {}", user_id);
        session.url.ok_or_else(|| BotError::Billing {
            status: 200,
            message: "checkout session has no url".to_string(),
        })
    }

    pub async fn retrieve_subscription(&self, subscription_id: &str) -> Result<Subscription> {
        let response = self
            .client
            .get(format!("{}/subscriptions/{}", STRIPE_API, subscription_id))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;
        Self::read(response).await
    }

    /// Every subscription in any status, following pagination.
    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let mut all = Vec::new();
        let mut starting_after: Option<String> = None;
        loop {
            let mut query = vec![("limit", PAGE_SIZE.to_string()), ("status", "all".to_string())];
            if let Some(cursor) = &starting_after {
                query.push(("starting_after", cursor.clone()));
            }
            let response = self
                .client
                .get(format!("{}/subscriptions", STRIPE_API))
                .bearer_auth(&self.secret_key)
                .query(&query)
                .send()
                .await?;
            let page: SubscriptionPage = Self::read(response).await?;
            starting_after = page.data.last().map(|s| s.id.clone());
            all.extend(page.data);
            if !page.has_more || starting_after.is_none() {
                break;
            }
        }
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn subscription_metadata_user() {
        let sub: Subscription = serde_json::from_value(json!({
            "id": "sub_1",
            "status": "active",
            "metadata": {"user_id": "42"}
        }))
        .unwrap();
        assert!(sub.is_active());
        assert!(!sub.is_ended());
        assert_eq!(sub.user_id(), Some(42));
    }

    #[test]
    fn missing_metadata_has_no_user() {
        let sub: Subscription =
            serde_json::from_value(json!({"id": "sub_2", "status": "canceled"})).unwrap();
        assert!(sub.is_ended());
        assert_eq!(sub.user_id(), None);
    }
}
