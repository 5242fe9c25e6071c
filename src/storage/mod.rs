// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! SQLite persistence for users and alerts.

use crate::alerts::{Alert, AlertKind, Direction};
use crate::error::Result;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// Stored expiry format.
pub const EXPIRY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_expiry(at: NaiveDateTime) -> String {
    at.format(EXPIRY_FORMAT).to_string()
}

pub fn parse_expiry(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, EXPIRY_FORMAT).ok()
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub user_id: i64,
    pub is_premium: bool,
    pub subscription_id: Option<String>,
    pub expiry: Option<NaiveDateTime>,
    pub total_scans: u32,
}

impl User {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let expiry: Option<String> = row.get(3)?;
        Ok(Self {
            user_id: row.get(0)?,
            is_premium: row.get::<_, Option<bool>>(1)?.unwrap_or(false),
            subscription_id: row.get(2)?,
            expiry: expiry.as_deref().and_then(parse_expiry),
            total_scans: row.get::<_, Option<u32>>(4)?.unwrap_or(0),
        })
    }
}

/// Database handle shared by the bot, webhook and background tasks.
#[derive(Clone)]
pub struct Database {
    connection: Arc<Mutex<Connection>>,
}

fn create_tables(connection: &Connection) -> rusqlite::Result<()> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY,
            is_premium BOOLEAN DEFAULT FALSE,
            subscription_id TEXT,
            expiry_date DATETIME,
            total_scans INTEGER DEFAULT 0
        )",
        [],
    )?;
    connection.execute(
        "CREATE TABLE IF NOT EXISTS alerts (
            user_id INTEGER,
            addr TEXT,
            set_value TEXT,
            percent REAL,
            direction TEXT,
            name TEXT,
            alert_type TEXT,
            PRIMARY KEY (user_id, addr)
        )",
        [],
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_users_subscription ON users(subscription_id)",
        [],
    )?;
    Ok(())
}

const USER_COLUMNS: &str = "user_id, is_premium, subscription_id, expiry_date, total_scans";

impl Database {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let connection = Connection::open(path.as_ref())?;
        connection.busy_timeout(std::time::Duration::from_secs(30))?;
        create_tables(&connection)?;
        info!("💾 Database ready at {}", path.as_ref().display());
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        create_tables(&connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE user_id = ?1", USER_COLUMNS),
                params![user_id],
                User::from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Fetch the user, inserting a fresh row when unknown.
    pub fn ensure_user(&self, user_id: i64) -> Result<User> {
        {
            let conn = self.conn();
            conn.execute(
                "INSERT OR IGNORE INTO users (user_id, total_scans) VALUES (?1, 0)",
                params![user_id],
            )?;
        }
        Ok(self.get_user(user_id)?.unwrap_or(User {
            user_id,
            is_premium: false,
            subscription_id: None,
            expiry: None,
            total_scans: 0,
        }))
    }

    pub fn increment_scans(&self, user_id: i64) -> Result<()> {
        self.conn().execute(
            "UPDATE users SET total_scans = total_scans + 1 WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(())
    }

    pub fn reset_scans(&self, user_id: i64) -> Result<()> {
        self.conn().execute(
            "UPDATE users SET total_scans = 0 WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(())
    }

    /// Grant premium until `expiry`, creating the user row if needed.
    /// A `None` subscription keeps the stored one.
    pub fn activate_premium(
        &self,
        user_id: i64,
        subscription_id: Option<&str>,
        expiry: NaiveDateTime,
    ) -> Result<()> {
        self.conn().execute(
            "INSERT INTO users (user_id, is_premium, subscription_id, expiry_date, total_scans)
             VALUES (?1, TRUE, ?2, ?3, 0)
             ON CONFLICT(user_id) DO UPDATE SET
                is_premium = TRUE,
                subscription_id = COALESCE(excluded.subscription_id, users.subscription_id),
                expiry_date = excluded.expiry_date",
            params![user_id, subscription_id, format_expiry(expiry)],
        )?;
        Ok(())
    }

    /// Move the expiry of whoever holds `subscription_id`. Returns that user.
    pub fn extend_subscription(
        &self,
        subscription_id: &str,
        expiry: NaiveDateTime,
    ) -> Result<Option<i64>> {
        let Some(user) = self.find_by_subscription(subscription_id)? else {
            warn!("No user holds subscription {}", subscription_id);
            return Ok(None);
        };
        self.conn().execute(
            "UPDATE users SET expiry_date = ?1, is_premium = TRUE WHERE user_id = ?2",
            params![format_expiry(expiry), user.user_id],
        )?;
        Ok(Some(user.user_id))
    }

    /// Clear premium for every user holding `subscription_id`.
    pub fn revoke_subscription(&self, subscription_id: &str) -> Result<usize> {
        let changed = self.conn().execute(
            "UPDATE users SET is_premium = FALSE, subscription_id = NULL, expiry_date = NULL
             WHERE subscription_id = ?1",
            params![subscription_id],
        )?;
        Ok(changed)
    }

    pub fn revoke_user(&self, user_id: i64) -> Result<()> {
        self.conn().execute(
            "UPDATE users SET is_premium = FALSE, subscription_id = NULL, expiry_date = NULL
             WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(())
    }

    /// Drop the premium flag but keep the subscription for a later recheck.
    pub fn clear_premium_flag(&self, user_id: i64) -> Result<()> {
        self.conn().execute(
            "UPDATE users SET is_premium = FALSE WHERE user_id = ?1",
            params![user_id],
        )?;
        Ok(())
    }

    pub fn find_by_subscription(&self, subscription_id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(
                &format!(
                    "SELECT {} FROM users WHERE subscription_id = ?1",
                    USER_COLUMNS
                ),
                params![subscription_id],
                User::from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Store an alert, replacing any existing one for the same user and address.
    pub fn upsert_alert(&self, alert: &Alert) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO alerts
                (user_id, addr, set_value, percent, direction, name, alert_type)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                alert.user_id,
                alert.addr,
                alert.set_value,
                alert.percent,
                alert.direction.as_str(),
                alert.name,
                alert.kind.as_str(),
            ],
        )?;
        Ok(())
    }

    /// All stored alerts. Rows with unknown direction or type are skipped.
    pub fn all_alerts(&self) -> Result<Vec<Alert>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT user_id, addr, set_value, percent, direction, name, alert_type FROM alerts",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<String>>(6)?,
            ))
        })?;

        let mut alerts = Vec::new();
        for row in rows {
            let (user_id, addr, set_value, percent, direction, name, kind) = row?;
            let direction = match direction.parse::<Direction>() {
                Ok(d) => d,
                Err(e) => {
                    warn!("Skipping alert for user {}: {}", user_id, e);
                    continue;
                }
            };
            // Rows without a type predate liquidity alerts.
            let kind = match kind.as_deref().unwrap_or("price").parse::<AlertKind>() {
                Ok(k) => k,
                Err(e) => {
                    warn!("Skipping alert for user {}: {}", user_id, e);
                    continue;
                }
            };
            alerts.push(Alert {
                user_id,
                addr,
                set_value,
                percent,
                direction,
                name: name.unwrap_or_else(|| "Unknown".to_string()),
                kind,
            });
        }
        Ok(alerts)
    }

    pub fn delete_alert(&self, user_id: i64, addr: &str) -> Result<()> {
        self.conn().execute(
            "DELETE FROM alerts WHERE user_id = ?1 AND addr = ?2",
            params![user_id, addr],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn expiry_format_round_trips() {
        assert_eq!(format_expiry(at(5)), "2025-01-05 12:00:00");
        assert_eq!(parse_expiry("2025-01-05 12:00:00"), Some(at(5)));
        assert_eq!(parse_expiry("tomorrow"), None);
    }

    #[test]
    fn ensure_user_is_idempotent() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_user(1).unwrap().is_none());
        let user = db.ensure_user(1).unwrap();
        assert_eq!(user.total_scans, 0);
        assert!(!user.is_premium);
        db.increment_scans(1).unwrap();
        assert_eq!(db.ensure_user(1).unwrap().total_scans, 1);
    }

    #[test]
    fn unknown_alert_rows_are_skipped() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO alerts VALUES (1, 'A', '1', 5.0, 'sideways', 'X', 'price')",
                [],
            )
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO alerts VALUES (2, 'B', '1', 5.0, 'increase', 'Y', NULL)",
                [],
            )
            .unwrap();
        let alerts = db.all_alerts().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].user_id, 2);
        assert_eq!(alerts[0].kind, AlertKind::Price);
    }
}
