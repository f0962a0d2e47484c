//! Bounded, persisted log store
//!
//! Holds the recorded entries newest-first, caps their number, drops entries
//! past the retention window on prune, and writes the whole collection to a
//! durable [`Backend`] after every mutation.

mod backend;
mod entry;
mod export;
mod filter;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use entry::{LogEntry, NewEntry, UNKNOWN_IP};
pub use export::{export_file_name, export_to};
pub use filter::{FilterCriteria, StatusFilter};

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::{friendly_io_error_message, Config};

/// Errors raised while persisting or restoring the log collection
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize logs: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Persisted logs are malformed: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        StoreError::Io { context, source }
    }

    /// Message suitable for a notification
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Io { context, source } => friendly_io_error_message(source, context),
            other => other.to_string(),
        }
    }
}

/// Size and age bounds for the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    /// Maximum number of entries kept
    pub max_logs: usize,
    /// Entries at least this old are removed by [`LogStore::prune`]
    pub retention: Duration,
}

impl StoreLimits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_logs: config.max_logs,
            retention: config.retention(),
        }
    }
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Ordered collection of log entries, newest first
///
/// Mutations update memory first and then persist. An `Err` from `append`,
/// `clear` or `prune` means the in-memory change stands and only the write
/// failed; memory stays authoritative for the rest of the session.
#[derive(Debug)]
pub struct LogStore<B: Backend> {
    entries: Vec<LogEntry>,
    limits: StoreLimits,
    backend: B,
}

impl<B: Backend> LogStore<B> {
    /// Create an empty store without reading the backend
    ///
    /// A cap below one is raised to one so every append keeps its entry.
    pub fn new(backend: B, mut limits: StoreLimits) -> Self {
        if limits.max_logs == 0 {
            tracing::warn!("max_logs of 0 raised to 1");
            limits.max_logs = 1;
        }
        Self {
            entries: Vec::new(),
            limits,
            backend,
        }
    }

    /// Restore the store from its backend
    ///
    /// Missing data yields an empty store. Unreadable or malformed data also
    /// yields an empty store, and the error is returned alongside it so the
    /// caller can tell the user.
    pub fn load(backend: B, limits: StoreLimits) -> (Self, Option<StoreError>) {
        let mut store = Self::new(backend, limits);

        let parsed = store.backend.read().and_then(|record| match record {
            Some(content) => serde_json::from_str::<Vec<LogEntry>>(&content)
                .map(Some)
                .map_err(StoreError::Parse),
            None => Ok(None),
        });

        match parsed {
            Ok(Some(mut entries)) => {
                entries.truncate(store.limits.max_logs);
                tracing::debug!("Loaded {} log entries", entries.len());
                store.entries = entries;
                (store, None)
            }
            Ok(None) => (store, None),
            Err(e) => {
                tracing::warn!("Failed to load logs, starting empty: {}", e);
                (store, Some(e))
            }
        }
    }

    /// Write the full collection to the backend
    pub fn save(&self) -> Result<(), StoreError> {
        let content = serde_json::to_string(&self.entries).map_err(StoreError::Serialize)?;
        self.backend.write(&content).inspect_err(|e| {
            tracing::error!("Failed to save logs: {}", e);
        })
    }

    /// Record a new entry stamped with the current time
    pub fn append(&mut self, new: NewEntry) -> Result<&LogEntry, StoreError> {
        self.append_at(new, Utc::now())
    }

    /// Record a new entry stamped with `timestamp`
    ///
    /// The entry goes to the front; anything beyond the cap is evicted from
    /// the tail.
    pub fn append_at(
        &mut self,
        new: NewEntry,
        timestamp: DateTime<Utc>,
    ) -> Result<&LogEntry, StoreError> {
        self.entries.insert(0, LogEntry::from_new(new, timestamp));
        // max_logs is at least one, so the new entry survives
        self.entries.truncate(self.limits.max_logs);
        self.save()?;
        Ok(&self.entries[0])
    }

    /// Remove every entry
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        self.save()
    }

    /// Remove entries whose age at `now` is at least the retention window
    ///
    /// Returns the number of entries removed. Entries stamped after `now` are
    /// kept. The collection is written even when nothing expired, which
    /// resyncs the record after an earlier failed write or a truncating load.
    pub fn prune(&mut self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let retention = self.limits.retention;
        let before = self.entries.len();
        self.entries
            .retain(|entry| match (now - entry.timestamp).to_std() {
                Ok(age) => age < retention,
                Err(_) => true,
            });

        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::info!("Pruned {} expired log entries", removed);
        }
        self.save()?;
        Ok(removed)
    }

    /// Entries matching `criteria`, in store order
    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<LogEntry> {
        self.entries
            .iter()
            .filter(|entry| criteria.matches(entry))
            .cloned()
            .collect()
    }

    /// All entries, newest first
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use tempfile::TempDir;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn limits(max_logs: usize) -> StoreLimits {
        StoreLimits {
            max_logs,
            retention: DAY,
        }
    }

    fn persisted(backend: &MemoryBackend) -> Vec<LogEntry> {
        serde_json::from_str(&backend.record().unwrap()).unwrap()
    }

    #[test]
    fn test_append_places_entry_at_front() {
        let backend = MemoryBackend::new();
        let mut store = LogStore::new(&backend, limits(10));

        store.append(NewEntry::new("10.0.0.1")).unwrap();
        let id = store.append(NewEntry::new("10.0.0.2")).unwrap().id.clone();

        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[0].id, id);
        assert_eq!(store.entries()[0].ip, "10.0.0.2");
        assert_eq!(store.entries()[1].ip, "10.0.0.1");
    }

    #[test]
    fn test_append_persists_full_collection() {
        let backend = MemoryBackend::new();
        let mut store = LogStore::new(&backend, limits(10));

        store.append(NewEntry::new("10.0.0.1")).unwrap();
        store.append(NewEntry::new("10.0.0.2")).unwrap();

        assert_eq!(backend.write_count(), 2);
        assert_eq!(persisted(&backend), store.entries());
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let backend = MemoryBackend::new();
        let mut store = LogStore::new(&backend, limits(100));
        let start = Utc::now();

        let mut first_id = String::new();
        let mut last_id = String::new();
        for i in 0..101 {
            let ts = start + ChronoDuration::milliseconds(i);
            let id = store
                .append_at(NewEntry::new(format!("10.0.0.{}", i)), ts)
                .unwrap()
                .id
                .clone();
            if i == 0 {
                first_id = id.clone();
            }
            last_id = id;
            assert!(store.len() <= 100);
        }

        assert_eq!(store.len(), 100);
        assert_eq!(store.entries()[0].id, last_id);
        assert!(store.entries().iter().all(|e| e.id != first_id));
        assert_eq!(store.entries()[99].ip, "10.0.0.1");
        assert_eq!(persisted(&backend).len(), 100);
    }

    #[test]
    fn test_cap_of_zero_keeps_latest_entry() {
        let backend = MemoryBackend::new();
        let mut store = LogStore::new(&backend, limits(0));
        store.append(NewEntry::new("1.1.1.1")).unwrap();
        assert_eq!(store.append(NewEntry::new("2.2.2.2")).unwrap().ip, "2.2.2.2");
        assert_eq!(store.len(), 1);
        assert_eq!(persisted(&backend).len(), 1);
    }

    #[test]
    fn test_clear_empties_store_and_record() {
        let backend = MemoryBackend::new();
        let mut store = LogStore::new(&backend, limits(10));
        store.append(NewEntry::new("10.0.0.1")).unwrap();
        store.append(NewEntry::new("10.0.0.2")).unwrap();

        store.clear().unwrap();

        assert!(store.is_empty());
        assert_eq!(backend.record().as_deref(), Some("[]"));
    }

    #[test]
    fn test_prune_removes_exactly_expired_entries() {
        let backend = MemoryBackend::new();
        let mut store = LogStore::new(&backend, limits(10));
        let now = Utc::now();
        let day = ChronoDuration::hours(24);

        store
            .append_at(NewEntry::new("old"), now - day - ChronoDuration::seconds(1))
            .unwrap();
        store.append_at(NewEntry::new("boundary"), now - day).unwrap();
        store
            .append_at(NewEntry::new("young-a"), now - ChronoDuration::hours(23))
            .unwrap();
        store
            .append_at(NewEntry::new("young-b"), now - ChronoDuration::minutes(5))
            .unwrap();
        store
            .append_at(NewEntry::new("future"), now + ChronoDuration::minutes(5))
            .unwrap();

        let removed = store.prune(now).unwrap();

        assert_eq!(removed, 2);
        let ips: Vec<_> = store.entries().iter().map(|e| e.ip.as_str()).collect();
        assert_eq!(ips, vec!["future", "young-b", "young-a"]);
        assert_eq!(persisted(&backend), store.entries());
    }

    #[test]
    fn test_prune_is_idempotent() {
        let backend = MemoryBackend::new();
        let mut store = LogStore::new(&backend, limits(10));
        let now = Utc::now();
        store
            .append_at(NewEntry::new("old"), now - ChronoDuration::days(2))
            .unwrap();
        store.append_at(NewEntry::new("new"), now).unwrap();

        assert_eq!(store.prune(now).unwrap(), 1);
        let after_first = store.entries().to_vec();
        let writes = backend.write_count();

        assert_eq!(store.prune(now).unwrap(), 0);
        assert_eq!(store.entries(), after_first.as_slice());
        assert_eq!(backend.write_count(), writes + 1);
        assert_eq!(persisted(&backend), after_first);
    }

    #[test]
    fn test_prune_resyncs_record_after_failed_write() {
        let backend = MemoryBackend::new();
        let mut store = LogStore::new(&backend, limits(10));
        store.append(NewEntry::new("saved")).unwrap();

        backend.set_fail_writes(true);
        assert!(store.append(NewEntry::new("unsaved")).is_err());
        assert_eq!(persisted(&backend).len(), 1);

        backend.set_fail_writes(false);
        assert_eq!(store.prune(Utc::now()).unwrap(), 0);

        assert_eq!(persisted(&backend), store.entries());
        assert_eq!(persisted(&backend)[0].ip, "unsaved");
    }

    #[test]
    fn test_prune_persists_truncated_load() {
        let backend = MemoryBackend::new();
        {
            let mut store = LogStore::new(&backend, limits(10));
            for i in 0..5 {
                store.append(NewEntry::new(format!("10.0.0.{}", i))).unwrap();
            }
        }

        let (mut store, error) = LogStore::load(&backend, limits(2));
        assert!(error.is_none());
        assert_eq!(persisted(&backend).len(), 5);

        store.prune(Utc::now()).unwrap();

        assert_eq!(persisted(&backend).len(), 2);
        assert_eq!(persisted(&backend), store.entries());
    }

    #[test]
    fn test_filter_by_ip_substring() {
        let backend = MemoryBackend::new();
        let mut store = LogStore::new(&backend, limits(10));
        store.append(NewEntry::new("10.0.0.5")).unwrap();
        store.append(NewEntry::new("192.168.1.1")).unwrap();

        let criteria = FilterCriteria::from_inputs("10.0", "", "");
        let result = store.filter(&criteria);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].ip, "10.0.0.5");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_filter_by_exact_status_preserves_order() {
        let backend = MemoryBackend::new();
        let mut store = LogStore::new(&backend, limits(10));
        store.append(NewEntry::new("a").with_status(404)).unwrap();
        store.append(NewEntry::new("b").with_status(200)).unwrap();
        store.append(NewEntry::new("c")).unwrap();
        store.append(NewEntry::new("d").with_status(404)).unwrap();

        let result = store.filter(&FilterCriteria::all().with_status(StatusFilter::Exact(404)));
        let ips: Vec<_> = result.iter().map(|e| e.ip.as_str()).collect();
        assert_eq!(ips, vec!["d", "a"]);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("security_logs.json");

        let mut store = LogStore::new(FileBackend::new(&path), limits(10));
        store
            .append(
                NewEntry::new("10.0.0.5")
                    .with_method("GET")
                    .with_status(200)
                    .with_user_agent("curl/8.0")
                    .with_header("Accept", "*/*"),
            )
            .unwrap();
        store.append(NewEntry::new(UNKNOWN_IP)).unwrap();

        let (loaded, err) = LogStore::load(FileBackend::new(&path), limits(10));
        assert!(err.is_none());
        assert_eq!(loaded.entries(), store.entries());
    }

    #[test]
    fn test_load_missing_record_is_empty() {
        let (store, err) = LogStore::load(MemoryBackend::new(), limits(10));
        assert!(store.is_empty());
        assert!(err.is_none());
    }

    #[test]
    fn test_load_malformed_record_is_empty_with_error() {
        let (store, err) = LogStore::load(MemoryBackend::with_record("{not json"), limits(10));
        assert!(store.is_empty());
        assert!(matches!(err, Some(StoreError::Parse(_))));
    }

    #[test]
    fn test_load_truncates_to_cap() {
        let backend = MemoryBackend::new();
        let mut store = LogStore::new(&backend, limits(10));
        for i in 0..5 {
            store.append(NewEntry::new(format!("ip-{}", i))).unwrap();
        }

        let (loaded, _) = LogStore::load(&backend, limits(3));
        let ips: Vec<_> = loaded.entries().iter().map(|e| e.ip.as_str()).collect();
        assert_eq!(ips, vec!["ip-4", "ip-3", "ip-2"]);
    }

    #[test]
    fn test_write_failure_keeps_memory_authoritative() {
        let backend = MemoryBackend::new();
        let mut store = LogStore::new(&backend, limits(10));
        store.append(NewEntry::new("saved")).unwrap();

        backend.set_fail_writes(true);
        let err = store.append(NewEntry::new("unsaved")).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.len(), 2);
        assert_eq!(store.entries()[0].ip, "unsaved");

        // Last successful write is what a restart would observe
        assert_eq!(persisted(&backend).len(), 1);

        assert!(store.clear().is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_io_error_user_message() {
        let err = StoreError::io(
            "Failed to write log store",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.user_message().contains("permission denied"));
    }
}
