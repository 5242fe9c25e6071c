// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Subscription billing: Stripe client, entitlements, webhook and sync.

pub mod entitlements;
pub mod stripe;
pub mod sync;
pub mod webhook;

pub use entitlements::Billing;
pub use stripe::{StripeClient, Subscription};
pub use sync::{spawn_subscription_sync, sync_action, SyncAction};
pub use webhook::{apply_event, start_webhook_server, verify_signature, Event, EventOutcome, WebhookState};
