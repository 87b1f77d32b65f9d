//! JSON-file history store.
//!
//! The whole log is loaded on open and rewritten on every mutation. A
//! mutation is applied to a copy first and only becomes visible once the
//! file write succeeded, so memory and disk never disagree.
//!
//! Default location: `~/.local/share/clipboard-ai/history.json` (platform
//! data dir via `dirs`).

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{now_ms, HistoryError, HistoryLog, HistoryRecord, HistoryStore, NewHistoryRecord, UsageStats};
use crate::types::ActionKind;

/// Default history file path.
pub fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("clipboard-ai")
        .join("history.json")
}

#[derive(Debug)]
pub struct JsonFileHistoryStore {
    path: PathBuf,
    log: Mutex<HistoryLog>,
}

impl JsonFileHistoryStore {
    /// Open (or lazily create) the history file at `path`.
    ///
    /// A missing file is an empty history. A file that exists but does not
    /// parse, or repeats an id, is an error; it is never silently overwritten.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();
        let log = match std::fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => HistoryLog::default(),
            Ok(raw) => serde_json::from_str::<HistoryLog>(&raw)?.into_ordered()?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HistoryLog::default(),
            Err(source) => return Err(HistoryError::Io { path, source }),
        };
        log::info!("[HISTORY] Opened {} ({} records)", path.display(), log.len());
        Ok(Self {
            path,
            log: Mutex::new(log),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn log(&self) -> MutexGuard<'_, HistoryLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` to a copy of the log, persist it, then publish it.
    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut HistoryLog) -> Result<T, HistoryError>,
    ) -> Result<T, HistoryError> {
        let mut guard = self.log();
        let mut next = guard.clone();
        let out = change(&mut next)?;
        self.persist(&next)?;
        *guard = next;
        Ok(out)
    }

    /// Write to a sibling temp file, then rename over the real one.
    fn persist(&self, log: &HistoryLog) -> Result<(), HistoryError> {
        let io_err = |source| HistoryError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(log)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl HistoryStore for JsonFileHistoryStore {
    fn append(&self, record: NewHistoryRecord) -> Result<u64, HistoryError> {
        let id = self.mutate(|log| Ok(log.push(record, now_ms())))?;
        log::debug!("[HISTORY] Appended record {} to {}", id, self.path.display());
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
        self.mutate(|log| log.remove(id).map(|_| ()))?;
        log::info!("[HISTORY] Deleted record {}", id);
        Ok(())
    }

    fn clear(&self) -> Result<usize, HistoryError> {
        let removed = self.mutate(|log| Ok(log.clear()))?;
        log::info!("[HISTORY] Cleared {} records", removed);
        Ok(removed)
    }

    fn total_count(&self) -> u64 {
        self.log().len()
    }

    fn stats(&self) -> UsageStats {
        self.log().stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::ContentType;

    fn record(action: ActionKind, tokens: u64) -> NewHistoryRecord {
        NewHistoryRecord {
            action,
            content_type: ContentType::Json,
            input_text: "{\"a\": 1}".into(),
            output_text: "An object with one key.".into(),
            tokens_used: tokens,
            model: Some("gpt-4o-mini".into()),
            error: None,
        }
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileHistoryStore::open(dir.path().join("history.json")).unwrap();
        assert_eq!(store.total_count(), 0);
        assert!(!store.path().exists());
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("history.json");
        {
            let store = JsonFileHistoryStore::open(&path).unwrap();
            store.append(record(ActionKind::SUMMARIZE, 12)).unwrap();
            let mut failed = record(ActionKind::TRANSLATE, 0);
            failed.output_text.clear();
            failed.error = Some(ErrorKind::Timeout);
            store.append(failed).unwrap();
        }
        let store = JsonFileHistoryStore::open(&path).unwrap();
        assert_eq!(store.total_count(), 2);
        let recent = store.list_recent(10);
        assert_eq!(recent[0].error, Some(ErrorKind::Timeout));
        assert_eq!(recent[1].tokens_used, 12);
        assert_eq!(store.stats().total_tokens, 12);
    }

    #[test]
    fn ids_continue_after_reopen_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let store = JsonFileHistoryStore::open(&path).unwrap();
        store.append(record(ActionKind::FORMAT_JSON, 1)).unwrap();
        store.append(record(ActionKind::FORMAT_JSON, 1)).unwrap();
        assert_eq!(store.clear().unwrap(), 2);
        drop(store);

        let store = JsonFileHistoryStore::open(&path).unwrap();
        assert_eq!(store.total_count(), 0);
        assert_eq!(store.append(record(ActionKind::FORMAT_JSON, 1)).unwrap(), 3);
    }

    #[test]
    fn delete_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let store = JsonFileHistoryStore::open(&path).unwrap();
        let id = store.append(record(ActionKind::EXPLAIN, 3)).unwrap();
        store.delete(id).unwrap();
        assert!(matches!(store.delete(id), Err(HistoryError::NotFound(_))));
        drop(store);
        assert_eq!(JsonFileHistoryStore::open(&path).unwrap().total_count(), 0);
    }

    fn stored(id: u64, action: &str) -> String {
        format!(
            r#"{{"id": {id}, "action": "{action}", "contentType": "plain_text", "inputPreview": "x",
                "inputText": "x", "outputText": "y", "tokensUsed": 1, "timestampMs": 0}}"#
        )
    }

    #[test]
    fn hand_edited_file_is_put_back_in_id_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let raw = format!(
            r#"{{"nextId": 8, "records": [{}, {}, {}]}}"#,
            stored(7, "summarize"),
            stored(2, "Fix-Typos"),
            stored(5, "translate")
        );
        std::fs::write(&path, raw).unwrap();

        let store = JsonFileHistoryStore::open(&path).unwrap();
        for id in [2, 5, 7] {
            assert_eq!(store.get(id).unwrap().id, id);
        }
        let ids: Vec<u64> = store.list_recent(10).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![7, 5, 2]);
        assert_eq!(store.list_by_action(&ActionKind::FIX_TYPOS, 5).len(), 1);
        store.delete(5).unwrap();
        assert!(store.get(7).is_ok());
        assert_eq!(store.append(record(ActionKind::EXPLAIN, 1)).unwrap(), 8);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        let raw = format!(r#"{{"records": [{}, {}]}}"#, stored(3, "summarize"), stored(3, "translate"));
        std::fs::write(&path, raw).unwrap();
        assert!(matches!(JsonFileHistoryStore::open(&path), Err(HistoryError::DuplicateId(3))));
    }

    #[test]
    fn corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(JsonFileHistoryStore::open(&path), Err(HistoryError::Json(_))));
    }
}
