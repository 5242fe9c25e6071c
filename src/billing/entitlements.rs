// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Premium checks and the free-scan quota.

use super::stripe::StripeClient;
use crate::config::Config;
use crate::error::{BotError, Result};
use crate::storage::Database;
use chrono::{Duration, NaiveDateTime, Utc};
use tracing::{error, info, warn};

pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[derive(Clone)]
pub struct Billing {
    db: Database,
    stripe: Option<StripeClient>,
    price_id: Option<String>,
    success_url: String,
    cancel_url: String,
    free_scans: u32,
    period: Duration,
}

impl Billing {
    pub fn new(config: &Config, db: Database, client: reqwest::Client) -> Self {
        let stripe = config
            .stripe_secret_key
            .clone()
            .map(|key| StripeClient::new(client, key));
        if stripe.is_none() {
            warn!("⚠️ STRIPE_SECRET_KEY not set, subscriptions are disabled");
        }
        Self {
            db,
            stripe,
            price_id: config.stripe_price_id.clone(),
            success_url: config.stripe_success_url.clone(),
            cancel_url: config.stripe_cancel_url.clone(),
            free_scans: config.free_scans,
            period: Duration::days(config.premium_period_days),
        }
    }

    /// Billing without a payment provider, for local runs.
    pub fn offline(db: Database, free_scans: u32) -> Self {
        Self {
            db,
            stripe: None,
            price_id: None,
            success_url: String::new(),
            cancel_url: String::new(),
            free_scans,
            period: Duration::days(30),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn stripe(&self) -> Option<&StripeClient> {
        self.stripe.as_ref()
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Premium when the stored flag has a future expiry; otherwise the
    /// stored subscription is polled and the row corrected.
    pub async fn is_premium(&self, user_id: i64) -> bool {
        let user = match self.db.get_user(user_id) {
            Ok(Some(user)) => user,
            Ok(None) => return false,
            Err(e) => {
                error!("Failed to load user {}: {}", user_id, e);
                return false;
            }
        };

        let now = now();
        if user.is_premium && user.expiry.is_some_and(|exp| exp > now) {
            return true;
        }

        let (Some(sub_id), Some(stripe)) = (user.subscription_id.as_deref(), &self.stripe) else {
            return false;
        };

        let outcome = match stripe.retrieve_subscription(sub_id).await {
            Ok(sub) if sub.is_active() => {
                info!("✅ Premium reinstated via poll for user {}", user_id);
                self.db
                    .activate_premium(user_id, Some(sub_id), now + self.period)
                    .map(|_| true)
            }
            Ok(sub) if sub.is_ended() => self.db.revoke_user(user_id).map(|_| false),
            Ok(_) => Ok(false),
            Err(e) => {
                error!("Stripe check failed for {}: {}", user_id, e);
                self.db.clear_premium_flag(user_id).map(|_| false)
            }
        };
        outcome.unwrap_or_else(|e| {
            error!("Failed to update premium for {}: {}", user_id, e);
            false
        })
    }

    /// Premium users always scan; others consume one of the free scans.
    pub async fn can_scan(&self, user_id: i64) -> bool {
        if self.is_premium(user_id).await {
            return true;
        }
        let result = self.db.ensure_user(user_id).and_then(|user| {
            if user.total_scans < self.free_scans {
                self.db.increment_scans(user_id)?;
                Ok(true)
            } else {
                Ok(false)
            }
        });
        result.unwrap_or_else(|e| {
            error!("Failed to check scan quota for {}: {}", user_id, e);
            false
        })
    }

    pub fn expiry(&self, user_id: i64) -> Option<NaiveDateTime> {
        self.db.get_user(user_id).ok().flatten()?.expiry
    }

    pub async fn checkout_url(&self, user_id: i64) -> Result<String> {
        let stripe = self
            .stripe
            .as_ref()
            .ok_or(BotError::BillingDisabled("STRIPE_SECRET_KEY not set"))?;
        let price_id = self
            .price_id
            .as_deref()
            .ok_or(BotError::BillingDisabled("STRIPE_PRICE_ID not set"))?;
        stripe
            .create_checkout_session(user_id, price_id, &self.success_url, &self.cancel_url)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn billing() -> Billing {
        Billing::offline(Database::open_in_memory().unwrap(), 3)
    }

    #[tokio::test]
    async fn free_quota_counts_every_scan() {
        let billing = billing();
        assert!(billing.can_scan(9).await);
        assert!(billing.can_scan(9).await);
        assert!(billing.can_scan(9).await);
        assert!(!billing.can_scan(9).await);
        assert_eq!(billing.database().get_user(9).unwrap().unwrap().total_scans, 3);
    }

    #[tokio::test]
    async fn premium_with_future_expiry_scans_freely() {
        let billing = billing();
        let db = billing.database();
        db.activate_premium(5, Some("sub_5"), now() + Duration::days(3))
            .unwrap();
        for _ in 0..5 {
            assert!(billing.can_scan(5).await);
        }
        assert_eq!(db.get_user(5).unwrap().unwrap().total_scans, 0);
    }

    #[tokio::test]
    async fn expired_premium_without_provider_is_not_premium() {
        let billing = billing();
        billing
            .database()
            .activate_premium(6, Some("sub_6"), now() - Duration::days(1))
            .unwrap();
        assert!(!billing.is_premium(6).await);
    }

    #[tokio::test]
    async fn checkout_needs_provider() {
        let err = billing().checkout_url(1).await.unwrap_err();
        assert!(matches!(err, BotError::BillingDisabled(_)));
    }
}
