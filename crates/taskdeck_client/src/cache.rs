//! Keyed cache of procedure results.
//!
//! # Responsibility
//! - Hold the last-known result per query key with an explicit entry state
//!   machine: idle, pending, fresh, stale, error.
//! - Arbitrate fetch completion through sequence-stamped tickets so that
//!   cancellation stays advisory: a late result for a superseded fetch is
//!   dropped, never applied.
//!
//! # Invariants
//! - The cache is an explicitly constructed instance; there is no
//!   module-level state.
//! - A failed fetch keeps the last-known-good data and records the error.
//! - Snapshot/restore round-trips an entry verbatim, including its fetch
//!   sequence.

use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;

/// Cache key: procedure path plus canonical input encoding.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct QueryKey {
    path: String,
    input_json: String,
}

impl QueryKey {
    /// Builds a key from a procedure path and its input payload.
    ///
    /// `serde_json` object keys are sorted, so equal inputs produce equal
    /// keys regardless of construction order.
    pub fn new(path: impl Into<String>, input: &Value) -> Self {
        Self {
            path: path.into(),
            input_json: input.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Reconstructs the input payload for refetching.
    pub fn input(&self) -> Value {
        serde_json::from_str(&self.input_json).unwrap_or(Value::Null)
    }
}

/// Lifecycle state of one cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// No fetch has been issued yet.
    Idle,
    /// A fetch is in flight.
    Pending,
    /// Holds a result no mutation has invalidated.
    Fresh,
    /// Invalidated; a refetch is due.
    Stale,
    /// Last fetch failed; `data` may still hold older good state.
    Error,
}

/// One cached query result with its state-machine bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub status: EntryStatus,
    pub data: Option<Value>,
    pub error: Option<String>,
    fetch_seq: u64,
}

impl CacheEntry {
    fn idle() -> Self {
        Self {
            status: EntryStatus::Idle,
            data: None,
            error: None,
            fetch_seq: 0,
        }
    }
}

/// Permission to apply the result of one specific fetch.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    key: QueryKey,
    seq: u64,
}

impl FetchTicket {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

/// Verbatim copy of an entry (or its absence) for rollback.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    key: QueryKey,
    entry: Option<CacheEntry>,
}

/// Explicitly constructed keyed result cache.
#[derive(Debug, Default)]
pub struct QueryCache {
    entries: BTreeMap<QueryKey, CacheEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the entry for a key, if one exists.
    pub fn entry(&self, key: &QueryKey) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    /// Returns the entry status; absent entries are `Idle`.
    pub fn status(&self, key: &QueryKey) -> EntryStatus {
        self.entries
            .get(key)
            .map_or(EntryStatus::Idle, |entry| entry.status)
    }

    /// Returns a clone of the cached data, if any.
    pub fn data(&self, key: &QueryKey) -> Option<Value> {
        self.entries.get(key).and_then(|entry| entry.data.clone())
    }

    /// Returns the recorded error message, if any.
    pub fn error(&self, key: &QueryKey) -> Option<String> {
        self.entries.get(key).and_then(|entry| entry.error.clone())
    }

    /// Installs externally provided data as a fresh result.
    ///
    /// Used to hydrate server-rendered initial data without a fetch.
    pub fn seed(&mut self, key: QueryKey, data: Value) {
        let entry = self.entries.entry(key).or_insert_with(CacheEntry::idle);
        entry.data = Some(data);
        entry.error = None;
        entry.status = EntryStatus::Fresh;
    }

    /// Overwrites cached data in place, e.g. for an optimistic write.
    ///
    /// Preserves `Stale` so a pending invalidation is not lost; any other
    /// state becomes `Fresh`.
    pub fn set_data(&mut self, key: QueryKey, data: Value) {
        let entry = self.entries.entry(key).or_insert_with(CacheEntry::idle);
        entry.data = Some(data);
        entry.error = None;
        if entry.status != EntryStatus::Stale {
            entry.status = EntryStatus::Fresh;
        }
    }

    /// Marks a fetch in flight and returns the ticket that may complete it.
    pub fn begin_fetch(&mut self, key: QueryKey) -> FetchTicket {
        let entry = self.entries.entry(key.clone()).or_insert_with(CacheEntry::idle);
        entry.fetch_seq += 1;
        entry.status = EntryStatus::Pending;
        FetchTicket {
            key,
            seq: entry.fetch_seq,
        }
    }

    /// Advisory cancellation: supersedes any in-flight fetch for the key.
    ///
    /// A no-op unless a fetch is pending. The in-flight request itself is
    /// not aborted; its eventual result simply no longer applies.
    pub fn cancel_fetch(&mut self, key: &QueryKey) {
        if let Some(entry) = self.entries.get_mut(key) {
            if entry.status == EntryStatus::Pending {
                entry.fetch_seq += 1;
                entry.status = if entry.data.is_some() {
                    EntryStatus::Fresh
                } else {
                    EntryStatus::Idle
                };
                debug!(
                    "event=fetch_cancelled module=cache path={} seq={}",
                    key.path(),
                    entry.fetch_seq
                );
            }
        }
    }

    /// Applies a fetch outcome if the ticket is still current.
    ///
    /// Returns `false` when the ticket was superseded and the outcome was
    /// dropped.
    pub fn complete_fetch(&mut self, ticket: &FetchTicket, outcome: Result<Value, String>) -> bool {
        let Some(entry) = self.entries.get_mut(&ticket.key) else {
            return false;
        };
        if entry.fetch_seq != ticket.seq {
            debug!(
                "event=fetch_dropped module=cache path={} stale_seq={} current_seq={}",
                ticket.key.path(),
                ticket.seq,
                entry.fetch_seq
            );
            return false;
        }

        match outcome {
            Ok(data) => {
                entry.data = Some(data);
                entry.error = None;
                entry.status = EntryStatus::Fresh;
            }
            Err(message) => {
                // Keep last-known-good data; only the status and message
                // change.
                entry.error = Some(message);
                entry.status = EntryStatus::Error;
            }
        }
        true
    }

    /// Marks the entry stale so the next pump refetches it.
    ///
    /// Also supersedes any in-flight fetch: post-mutation data must come
    /// from a fetch issued after the invalidation.
    pub fn invalidate(&mut self, key: &QueryKey) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.fetch_seq += 1;
            entry.status = EntryStatus::Stale;
        }
    }

    /// Keys currently due for a refetch.
    pub fn stale_keys(&self) -> Vec<QueryKey> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.status == EntryStatus::Stale)
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Captures the entry (or its absence) for later rollback.
    pub fn snapshot(&self, key: &QueryKey) -> CacheSnapshot {
        CacheSnapshot {
            key: key.clone(),
            entry: self.entries.get(key).cloned(),
        }
    }

    /// Restores a snapshot verbatim, discarding any interim changes.
    pub fn restore(&mut self, snapshot: CacheSnapshot) {
        match snapshot.entry {
            Some(entry) => {
                self.entries.insert(snapshot.key, entry);
            }
            None => {
                self.entries.remove(&snapshot.key);
            }
        }
    }

    /// Drops an entry entirely (unmount/eviction).
    pub fn evict(&mut self, key: &QueryKey) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::{EntryStatus, QueryCache, QueryKey};
    use serde_json::{json, Value};

    fn key() -> QueryKey {
        QueryKey::new("project.getProjectById", &json!({ "projectId": "p-1" }))
    }

    #[test]
    fn equal_inputs_produce_equal_keys() {
        let a = QueryKey::new("q", &json!({ "b": 1, "a": 2 }));
        let b = QueryKey::new("q", &json!({ "a": 2, "b": 1 }));
        assert_eq!(a, b);
    }

    #[test]
    fn fetch_lifecycle_reaches_fresh() {
        let mut cache = QueryCache::new();
        assert_eq!(cache.status(&key()), EntryStatus::Idle);

        let ticket = cache.begin_fetch(key());
        assert_eq!(cache.status(&key()), EntryStatus::Pending);

        assert!(cache.complete_fetch(&ticket, Ok(json!({ "name": "loaded" }))));
        assert_eq!(cache.status(&key()), EntryStatus::Fresh);
        assert_eq!(cache.data(&key()), Some(json!({ "name": "loaded" })));
    }

    #[test]
    fn superseded_ticket_is_dropped() {
        let mut cache = QueryCache::new();
        let stale_ticket = cache.begin_fetch(key());
        cache.cancel_fetch(&key());

        assert!(!cache.complete_fetch(&stale_ticket, Ok(json!({ "name": "late" }))));
        assert_eq!(cache.data(&key()), None);
    }

    #[test]
    fn invalidation_supersedes_in_flight_fetch() {
        let mut cache = QueryCache::new();
        let ticket = cache.begin_fetch(key());
        cache.invalidate(&key());

        assert!(!cache.complete_fetch(&ticket, Ok(json!({ "name": "pre-mutation" }))));
        assert_eq!(cache.status(&key()), EntryStatus::Stale);
    }

    #[test]
    fn failed_fetch_keeps_last_known_good() {
        let mut cache = QueryCache::new();
        let ticket = cache.begin_fetch(key());
        cache.complete_fetch(&ticket, Ok(json!({ "name": "good" })));

        cache.invalidate(&key());
        let retry = cache.begin_fetch(key());
        assert!(cache.complete_fetch(&retry, Err("backend down".to_string())));

        assert_eq!(cache.status(&key()), EntryStatus::Error);
        assert_eq!(cache.data(&key()), Some(json!({ "name": "good" })));
        assert_eq!(cache.error(&key()), Some("backend down".to_string()));
    }

    #[test]
    fn snapshot_restore_round_trips_verbatim() {
        let mut cache = QueryCache::new();
        let ticket = cache.begin_fetch(key());
        cache.complete_fetch(&ticket, Ok(json!({ "completed": false })));

        let before = cache.entry(&key()).cloned();
        let snapshot = cache.snapshot(&key());

        cache.set_data(key(), json!({ "completed": true }));
        cache.restore(snapshot);

        assert_eq!(cache.entry(&key()).cloned(), before);
    }

    #[test]
    fn restoring_absent_snapshot_removes_entry() {
        let mut cache = QueryCache::new();
        let snapshot = cache.snapshot(&key());

        cache.seed(key(), json!({ "name": "interim" }));
        cache.restore(snapshot);

        assert!(cache.entry(&key()).is_none());
        assert_eq!(cache.status(&key()), EntryStatus::Idle);
    }

    #[test]
    fn seed_installs_fresh_data() {
        let mut cache = QueryCache::new();
        cache.seed(key(), json!({ "name": "hydrated" }));
        assert_eq!(cache.status(&key()), EntryStatus::Fresh);
        assert_eq!(cache.data(&key()), Some(json!({ "name": "hydrated" })));
    }

    #[test]
    fn set_data_preserves_stale_status() {
        let mut cache = QueryCache::new();
        cache.seed(key(), json!({ "completed": false }));
        cache.invalidate(&key());

        cache.set_data(key(), json!({ "completed": true }));
        assert_eq!(cache.status(&key()), EntryStatus::Stale);
        assert_eq!(cache.data(&key()), Some(json!({ "completed": true })));
    }

    #[test]
    fn key_input_round_trips() {
        let input = json!({ "projectId": "p-9" });
        let key = QueryKey::new("project.getProjectById", &input);
        assert_eq!(key.input(), input);
        assert_eq!(
            QueryKey::new("q", &Value::Null).input(),
            Value::Null
        );
    }
}
