// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Periodic reconciliation of stored premium state with Stripe.

use super::entitlements::{now, Billing};
use super::stripe::Subscription;
use crate::storage::User;
use crate::telegram::TelegramNotifier;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

const FIRST_SYNC_DELAY: Duration = Duration::from_secs(10);

pub const PREMIUM_ACTIVE_MESSAGE: &str =
    "Your premium is now active! Unlimited scans and alerts unlocked. 🚀";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Grant,
    Revoke,
    Keep,
}

/// What to do with the stored user for one provider subscription.
pub fn sync_action(sub: &Subscription, stored: Option<&User>) -> SyncAction {
    let holds_this = stored
        .and_then(|u| u.subscription_id.as_deref())
        .is_some_and(|id| id == sub.id);
    if sub.is_active() && !holds_this {
        SyncAction::Grant
    } else if sub.is_ended() && holds_this {
        SyncAction::Revoke
    } else {
        SyncAction::Keep
    }
}

/// One pass over all subscriptions. Returns how many users were granted premium.
pub async fn sync_once(billing: &Billing, notifier: &TelegramNotifier) -> usize {
    let Some(stripe) = billing.stripe() else {
        return 0;
    };
    let subscriptions = match stripe.list_subscriptions().await {
        Ok(subs) => subs,
        Err(e) => {
            error!("Stripe poll error: {}", e);
            return 0;
        }
    };

    let db = billing.database();
    let mut granted = 0;
    for sub in &subscriptions {
        let Some(user_id) = sub.user_id() else {
            continue;
        };
        let stored = match db.get_user(user_id) {
            Ok(user) => user,
            Err(e) => {
                error!("Failed to load user {}: {}", user_id, e);
                continue;
            }
        };

        match sync_action(sub, stored.as_ref()) {
            SyncAction::Grant => {
                if let Err(e) = db.activate_premium(user_id, Some(&sub.id), now() + billing.period())
                {
                    error!("Failed to activate premium for {}: {}", user_id, e);
                    continue;
                }
                info!("✅ Activated premium via poll for user {} (sub: {})", user_id, sub.id);
                notifier.send_to(user_id, PREMIUM_ACTIVE_MESSAGE).await;
                granted += 1;
            }
            SyncAction::Revoke => match db.revoke_user(user_id) {
                Ok(()) => info!("Revoked premium via poll for user {} (sub: {})", user_id, sub.id),
                Err(e) => error!("Failed to revoke premium for {}: {}", user_id, e),
            },
            SyncAction::Keep => {}
        }
    }
    granted
}

/// Spawn the subscription sync task. The first pass runs shortly after startup.
pub fn spawn_subscription_sync(
    billing: Billing,
    notifier: TelegramNotifier,
    interval_sec: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!("💳 Subscription sync started (every {}s)", interval_sec);
        sleep(FIRST_SYNC_DELAY).await;
        loop {
            sync_once(&billing, &notifier).await;
            sleep(Duration::from_secs(interval_sec.max(1))).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn sub(id: &str, status: &str) -> Subscription {
        Subscription {
            id: id.to_string(),
            status: status.to_string(),
            metadata: HashMap::from([("user_id".to_string(), "1".to_string())]),
        }
    }

    fn user(sub_id: Option<&str>) -> User {
        User {
            user_id: 1,
            is_premium: sub_id.is_some(),
            subscription_id: sub_id.map(str::to_string),
            expiry: None,
            total_scans: 0,
        }
    }

    #[test]
    fn active_subscription_grants_new_holders_only() {
        let active = sub("sub_1", "active");
        assert_eq!(sync_action(&active, None), SyncAction::Grant);
        assert_eq!(sync_action(&active, Some(&user(None))), SyncAction::Grant);
        assert_eq!(sync_action(&active, Some(&user(Some("sub_0")))), SyncAction::Grant);
        assert_eq!(sync_action(&active, Some(&user(Some("sub_1")))), SyncAction::Keep);
    }

    #[test]
    fn ended_subscription_revokes_matching_holder() {
        let canceled = sub("sub_1", "canceled");
        assert_eq!(sync_action(&canceled, Some(&user(Some("sub_1")))), SyncAction::Revoke);
        assert_eq!(sync_action(&canceled, Some(&user(Some("sub_2")))), SyncAction::Keep);
        let expired = sub("sub_1", "incomplete_expired");
        assert_eq!(sync_action(&expired, Some(&user(Some("sub_1")))), SyncAction::Revoke);
        assert_eq!(sync_action(&sub("sub_1", "past_due"), None), SyncAction::Keep);
    }
}
