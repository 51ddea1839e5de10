//! Append-only ledger of broadcast runs.
//!
//! Same storage discipline as the registry: the whole document is loaded,
//! mutated and atomically rewritten. Records are immutable once appended and
//! carry dense 1-based sequence ids assigned at append time.

use std::path::PathBuf;

use chrono::Utc;
use log::info;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::store::{DocStore, Metadata, StoreError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastRecord {
    /// 1-based, dense: appending N broadcasts yields ids 1..=N.
    pub id: u64,
    pub total_users: usize,
    pub successful_sends: usize,
    pub failed_sends: usize,
    /// RFC 3339, assigned at append time.
    pub broadcast_date: String,
    /// Percentage of successful sends; 0 when there were no targets.
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerDocument {
    pub broadcasts: Vec<BroadcastRecord>,
    pub metadata: Metadata,
}

pub struct BroadcastLedger {
    store: DocStore<LedgerDocument>,
    lock: Mutex<()>,
}

impl BroadcastLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            store: DocStore::new(path),
            lock: Mutex::new(()),
        }
    }

    /// Append the outcome of one broadcast run and persist it.
    pub fn append(
        &self,
        total_users: usize,
        successful_sends: usize,
        failed_sends: usize,
    ) -> Result<BroadcastRecord, StoreError> {
        let _guard = self.lock.lock();
        let mut doc = self.store.load();
        let record = BroadcastRecord {
            id: doc.broadcasts.len() as u64 + 1,
            total_users,
            successful_sends,
            failed_sends,
            broadcast_date: Utc::now().to_rfc3339(),
            success_rate: if total_users > 0 {
                successful_sends as f64 / total_users as f64 * 100.0
            } else {
                0.0
            },
        };
        doc.broadcasts.push(record.clone());
        doc.metadata.touch();
        self.store.save(&doc)?;
        info!("Broadcast stats saved: {successful_sends}/{total_users} successful");
        Ok(record)
    }

    pub fn records(&self) -> Vec<BroadcastRecord> {
        let _guard = self.lock.lock();
        self.store.load().broadcasts
    }
}
