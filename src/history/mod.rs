//! History domain — records of every dispatch that reached the AI service.
//!
//! Public API:
//!   - HistoryStore          — trait the dispatcher appends to
//!   - InMemoryHistoryStore  — process-lifetime store (memory.rs)
//!   - JsonFileHistoryStore  — JSON file rewritten on each mutation (file_store.rs)
//!
//! Ordering: ids are assigned under the store's lock in append order, so
//! "most recent first" is simply descending id.

pub mod file_store;
pub mod memory;

pub use file_store::JsonFileHistoryStore;
pub use memory::InMemoryHistoryStore;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::ErrorKind;
use crate::llm::Provider;
use crate::types::{ActionKind, ActionOutcome, ContentType};

pub const PREVIEW_CHARS: usize = 100;

/// One stored dispatch attempt. Never mutated after append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    pub id: u64,
    pub action: ActionKind,
    pub content_type: ContentType,
    pub input_preview: String,
    pub input_text: String,
    /// Empty for failed attempts.
    pub output_text: String,
    pub tokens_used: u64,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub error: Option<ErrorKind>,
    /// Unix epoch milliseconds.
    pub timestamp_ms: u64,
}

/// A record before the store has assigned its id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryRecord {
    pub action: ActionKind,
    pub content_type: ContentType,
    pub input_text: String,
    pub output_text: String,
    pub tokens_used: u64,
    pub model: Option<String>,
    pub error: Option<ErrorKind>,
}

impl NewHistoryRecord {
    pub fn from_outcome(input_text: &str, outcome: &ActionOutcome) -> Self {
        Self {
            action: outcome.action.clone(),
            content_type: outcome.content_type,
            input_text: input_text.to_string(),
            output_text: outcome.result_text.clone().unwrap_or_default(),
            tokens_used: outcome.tokens_used,
            model: outcome.model.clone(),
            error: outcome.error,
        }
    }
}

/// Aggregate usage over every stored record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    pub total_count: u64,
    pub total_tokens: u64,
    pub actions_by_type: BTreeMap<ActionKind, u64>,
    pub avg_tokens_per_action: f64,
}

impl UsageStats {
    pub fn estimated_cost_usd(&self, provider: Provider) -> f64 {
        provider.estimate_cost_usd(self.total_tokens)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("history entry {0} not found")]
    NotFound(u64),
    #[error("failed to access history file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("history file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
    #[error("history file has more than one entry with id {0}")]
    DuplicateId(u64),
}

impl HistoryError {
    /// Only `NotFound` belongs to the caller-visible taxonomy; storage
    /// failures have no category of their own.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            HistoryError::NotFound(_) => Some(ErrorKind::NotFound),
            _ => None,
        }
    }
}

/// Record keeper for dispatch attempts. Implementations must be safe to
/// share between concurrent dispatches.
pub trait HistoryStore: Send + Sync {
    /// Store a record; returns its id.
    fn append(&self, record: NewHistoryRecord) -> Result<u64, HistoryError>;

    /// Up to `limit` records, most recent first.
    fn list_recent(&self, limit: usize) -> Vec<HistoryRecord>;

    /// Up to `limit` records for one action, most recent first.
    fn list_by_action(&self, action: &ActionKind, limit: usize) -> Vec<HistoryRecord>;

    fn get(&self, id: u64) -> Result<HistoryRecord, HistoryError>;

    fn delete(&self, id: u64) -> Result<(), HistoryError>;

    /// Remove every record; returns how many were removed. Ids keep
    /// increasing afterwards.
    fn clear(&self) -> Result<usize, HistoryError>;

    fn total_count(&self) -> u64;

    fn stats(&self) -> UsageStats;
}

/// Single-line preview: first 100 characters, newlines shown as ` ↵ `.
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let mut head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        head.push_str("...");
    }
    head.replace('\r', "").replace('\n', " ↵ ")
}

pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Ordered record list shared by both stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HistoryLog {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    records: Vec<HistoryRecord>,
}

impl HistoryLog {
    /// Restore id order after loading from disk. Lookups binary-search by id,
    /// so a hand-edited file is sorted here and duplicate ids are rejected.
    pub(crate) fn into_ordered(mut self) -> Result<Self, HistoryError> {
        self.records.sort_by_key(|r| r.id);
        if let Some(pair) = self.records.windows(2).find(|w| w[0].id == w[1].id) {
            return Err(HistoryError::DuplicateId(pair[0].id));
        }
        Ok(self)
    }

    pub(crate) fn push(&mut self, new: NewHistoryRecord, timestamp_ms: u64) -> u64 {
        let last_id = self.records.last().map_or(0, |r| r.id);
        let id = self.next_id.max(last_id + 1).max(1);
        self.next_id = id + 1;
        self.records.push(HistoryRecord {
            id,
            input_preview: preview(&new.input_text),
            action: new.action,
            content_type: new.content_type,
            input_text: new.input_text,
            output_text: new.output_text,
            tokens_used: new.tokens_used,
            model: new.model,
            error: new.error,
            timestamp_ms,
        });
        id
    }

    pub(crate) fn recent(&self, limit: usize) -> Vec<HistoryRecord> {
        self.records.iter().rev().take(limit).cloned().collect()
    }

    pub(crate) fn recent_for(&self, action: &ActionKind, limit: usize) -> Vec<HistoryRecord> {
        self.records
            .iter()
            .rev()
            .filter(|r| &r.action == action)
            .take(limit)
            .cloned()
            .collect()
    }

    fn position(&self, id: u64) -> Result<usize, HistoryError> {
        self.records
            .binary_search_by_key(&id, |r| r.id)
            .map_err(|_| HistoryError::NotFound(id))
    }

    pub(crate) fn get(&self, id: u64) -> Result<HistoryRecord, HistoryError> {
        self.position(id).map(|i| self.records[i].clone())
    }

    pub(crate) fn remove(&mut self, id: u64) -> Result<HistoryRecord, HistoryError> {
        let i = self.position(id)?;
        Ok(self.records.remove(i))
    }

    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.records.len();
        // Keep ids monotonic across clears
        let last_id = self.records.last().map_or(0, |r| r.id);
        self.next_id = self.next_id.max(last_id + 1);
        self.records.clear();
        removed
    }

    pub(crate) fn len(&self) -> u64 {
        self.records.len() as u64
    }

    pub(crate) fn stats(&self) -> UsageStats {
        let mut stats = UsageStats::default();
        for record in &self.records {
            stats.total_count += 1;
            stats.total_tokens += record.tokens_used;
            *stats.actions_by_type.entry(record.action.clone()).or_insert(0) += 1;
        }
        if stats.total_count > 0 {
            stats.avg_tokens_per_action = stats.total_tokens as f64 / stats.total_count as f64;
        }
        stats
    }
}
