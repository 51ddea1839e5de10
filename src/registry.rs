//! Durable user registry backed by a whole-document JSON store.
//!
//! One record per user id, created on first admission and never physically
//! deleted; banning is a soft-delete flag. Every mutation is a full
//! read-modify-write of the document, serialized behind an internal lock so
//! concurrent handlers cannot interleave rewrites.

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use log::{debug, info};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::store::{DocStore, Metadata, StoreError};

/// Display fields supplied by the gateway alongside a user's identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// RFC 3339; set once at creation and never reset.
    pub join_date: String,
    /// RFC 3339; refreshed on every interaction.
    pub last_activity: String,
    pub is_banned: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryDocument {
    pub users: BTreeMap<i64, UserRecord>,
    pub metadata: Metadata,
}

/// Aggregate counters computed by scanning every record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Analytics {
    pub total: usize,
    pub active: usize,
    pub banned: usize,
    pub joined_today: usize,
    pub joined_this_week: usize,
    pub active_today: usize,
}

impl Analytics {
    /// Share of active users seen today, as a percentage.
    pub fn daily_activity_rate(&self) -> f64 {
        if self.active > 0 {
            self.active_today as f64 / self.active as f64 * 100.0
        } else {
            0.0
        }
    }
}

pub struct Registry {
    store: DocStore<RegistryDocument>,
    // Serializes read-modify-write cycles; each save rewrites the whole file.
    lock: Mutex<()>,
}

impl Registry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: DocStore::new(path),
            lock: Mutex::new(()),
        }
    }

    /// Create or update the record for `user_id`.
    ///
    /// Re-upserting an existing id merges the display fields and refreshes
    /// `last_activity`; `join_date` and `is_banned` are left untouched.
    pub fn upsert(&self, user_id: i64, profile: &Profile) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut doc = self.store.load();
        let now = Utc::now().to_rfc3339();
        match doc.users.get_mut(&user_id) {
            Some(record) => {
                record.username = profile.username.clone();
                record.first_name = profile.first_name.clone();
                record.last_name = profile.last_name.clone();
                record.last_activity = now.clone();
            }
            None => {
                doc.users.insert(
                    user_id,
                    UserRecord {
                        user_id,
                        username: profile.username.clone(),
                        first_name: profile.first_name.clone(),
                        last_name: profile.last_name.clone(),
                        join_date: now.clone(),
                        last_activity: now.clone(),
                        is_banned: false,
                    },
                );
            }
        }
        doc.metadata.last_updated = now;
        self.store.save(&doc)?;
        info!("User {user_id} added/updated in registry");
        Ok(())
    }

    /// Refresh `last_activity` for a known user; no-op for unknown ids.
    pub fn touch_activity(&self, user_id: i64) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut doc = self.store.load();
        if let Some(record) = doc.users.get_mut(&user_id) {
            let now = Utc::now().to_rfc3339();
            record.last_activity = now.clone();
            doc.metadata.last_updated = now;
            self.store.save(&doc)?;
            debug!("Updated activity for user {user_id}");
        }
        Ok(())
    }

    /// Set or clear the ban flag. Returns whether the user was found; an
    /// unknown id is reported as not found and no record is created.
    pub fn set_banned(&self, user_id: i64, banned: bool) -> Result<bool, StoreError> {
        let _guard = self.lock.lock();
        let mut doc = self.store.load();
        match doc.users.get_mut(&user_id) {
            Some(record) => {
                record.is_banned = banned;
                doc.metadata.touch();
                self.store.save(&doc)?;
                info!(
                    "User {user_id} {}",
                    if banned { "banned" } else { "unbanned" }
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Unknown ids are not banned.
    pub fn is_banned(&self, user_id: i64) -> bool {
        let _guard = self.lock.lock();
        let doc = self.store.load();
        doc.users.get(&user_id).map(|r| r.is_banned).unwrap_or(false)
    }

    /// Number of non-banned users.
    pub fn count_active(&self) -> usize {
        let _guard = self.lock.lock();
        let doc = self.store.load();
        doc.users.values().filter(|u| !u.is_banned).count()
    }

    /// Ids of all non-banned users, in document order (stable within a load).
    pub fn list_active_ids(&self) -> Vec<i64> {
        let _guard = self.lock.lock();
        let doc = self.store.load();
        doc.users
            .values()
            .filter(|u| !u.is_banned)
            .map(|u| u.user_id)
            .collect()
    }

    /// Scan every record and compute aggregate counters.
    ///
    /// Timestamps are compared by their date component against now. A record
    /// with a malformed timestamp is skipped for that counter, never fatal.
    pub fn analytics(&self) -> Analytics {
        let _guard = self.lock.lock();
        let doc = self.store.load();

        let today = Utc::now().date_naive();
        let week_ago = today - Duration::days(7);

        let mut stats = Analytics {
            total: doc.users.len(),
            ..Analytics::default()
        };
        for user in doc.users.values() {
            if user.is_banned {
                stats.banned += 1;
            } else {
                stats.active += 1;
            }
            if let Some(join_date) = parse_date(&user.join_date) {
                if join_date == today {
                    stats.joined_today += 1;
                }
                if join_date >= week_ago {
                    stats.joined_this_week += 1;
                }
            }
            if let Some(last_activity) = parse_date(&user.last_activity) {
                if last_activity == today && !user.is_banned {
                    stats.active_today += 1;
                }
            }
        }
        stats
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}
