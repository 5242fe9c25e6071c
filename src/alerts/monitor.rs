// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Periodic alert sweep.

use super::{Alert, AlertKind};
use crate::sources::DexScreenerClient;
use crate::storage::Database;
use crate::telegram::TelegramNotifier;
use std::collections::{HashMap, HashSet};
use tracing::{debug, error, info};

/// Alerts whose threshold was crossed, paired with their notification text.
///
/// `prices` and `liquidities` hold the current value per address; alerts for
/// addresses missing from the relevant map, or valued `"0"`, are skipped.
pub fn evaluate(
    alerts: &[Alert],
    prices: &HashMap<String, String>,
    liquidities: &HashMap<String, String>,
) -> Vec<(Alert, String)> {
    alerts
        .iter()
        .filter_map(|alert| {
            let current = match alert.kind {
                AlertKind::Price => prices.get(&alert.addr),
                AlertKind::Liquidity => liquidities.get(&alert.addr),
            }?;
            if current != "0" && alert.is_triggered(current) {
                Some((alert.clone(), alert.message(current)))
            } else {
                None
            }
        })
        .collect()
}

pub struct AlertMonitor {
    db: Database,
    dex: DexScreenerClient,
    notifier: TelegramNotifier,
}

impl AlertMonitor {
    pub fn new(db: Database, dex: DexScreenerClient, notifier: TelegramNotifier) -> Self {
        Self { db, dex, notifier }
    }

    /// Current values for every distinct address of `kind`, dropping unavailable ones.
    async fn current_values(&self, alerts: &[Alert], kind: AlertKind) -> HashMap<String, String> {
        let addrs: HashSet<&str> = alerts
            .iter()
            .filter(|a| a.kind == kind)
            .map(|a| a.addr.as_str())
            .collect();

        let mut values = HashMap::new();
        for addr in addrs {
            let current = kind.current_value(&self.dex, addr).await;
            if current == "0" {
                debug!("No current {} for {}", kind.as_str(), addr);
            }
            values.insert(addr.to_string(), current);
        }
        values
    }

    /// One pass over all stored alerts. Returns the number fired.
    pub async fn sweep(&self) -> usize {
        let alerts = match self.db.all_alerts() {
            Ok(alerts) => alerts,
            Err(e) => {
                error!("Failed to load alerts: {}", e);
                return 0;
            }
        };
        if alerts.is_empty() {
            return 0;
        }

        let prices = self.current_values(&alerts, AlertKind::Price).await;
        let liquidities = self.current_values(&alerts, AlertKind::Liquidity).await;
        self.settle(&alerts, &prices, &liquidities).await
    }

    /// Notify and delete every alert that crossed its threshold. Returns the number fired.
    pub async fn settle(
        &self,
        alerts: &[Alert],
        prices: &HashMap<String, String>,
        liquidities: &HashMap<String, String>,
    ) -> usize {
        let fired = evaluate(alerts, prices, liquidities);
        for (alert, message) in &fired {
            info!(
                "🔔 Alert fired for user {} on {} ({})",
                alert.user_id, alert.name, alert.kind.as_str()
            );
            self.notifier.send_to(alert.user_id, message).await;
        }
        for (alert, _) in &fired {
            if let Err(e) = self.db.delete_alert(alert.user_id, &alert.addr) {
                error!("Failed to delete alert for user {}: {}", alert.user_id, e);
            }
        }
        fired.len()
    }
}

/// Spawn the alert sweep background task. The first sweep runs immediately.
pub fn spawn_alert_monitor(monitor: AlertMonitor, interval_sec: u64) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        info!("📊 Alert monitor started (checking every {}s)", interval_sec);

        let period = tokio::time::Duration::from_secs(interval_sec.max(1));
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let fired = monitor.sweep().await;
            if fired > 0 {
                info!("Alert sweep fired {} alert(s)", fired);
            }
        }
    })
}
