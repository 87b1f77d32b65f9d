//! In-memory history store. Lives as long as the process.

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{now_ms, HistoryError, HistoryLog, HistoryRecord, HistoryStore, NewHistoryRecord, UsageStats};
use crate::types::ActionKind;

#[derive(Debug, Default)]
pub struct InMemoryHistoryStore {
    log: Mutex<HistoryLog>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A panic in another thread while holding the lock cannot leave the
    /// log half-written (every mutation is a single push/remove), so a
    /// poisoned lock is still safe to use.
    fn log(&self) -> MutexGuard<'_, HistoryLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl HistoryStore for InMemoryHistoryStore {
    fn append(&self, record: NewHistoryRecord) -> Result<u64, HistoryError> {
        let id = self.log().push(record, now_ms());
        log::debug!("[HISTORY] Appended record {}", id);
        Ok(id)
    }

    fn list_recent(&self, limit: usize) -> Vec<HistoryRecord> {
        self.log().recent(limit)
    }

    fn list_by_action(&self, action: &ActionKind, limit: usize) -> Vec<HistoryRecord> {
        self.log().recent_for(action, limit)
    }

    fn get(&self, id: u64) -> Result<HistoryRecord, HistoryError> {
        self.log().get(id)
    }

    fn delete(&self, id: u64) -> Result<(), HistoryError> {
        self.log().remove(id).map(|_| ())
    }

    fn clear(&self) -> Result<usize, HistoryError> {
        Ok(self.log().clear())
    }

    fn total_count(&self) -> u64 {
        self.log().len()
    }

    fn stats(&self) -> UsageStats {
        self.log().stats()
    }
}
