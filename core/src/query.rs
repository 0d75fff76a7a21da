//! Keyed query cache with explicit invalidation.
//!
//! # Design
//! Every fetch is stamped with a generation drawn from a cache-wide counter.
//! Only the result carrying the latest generation for its key is applied;
//! anything older is dropped on arrival. Because results are stored per key,
//! a late response for one key can never overwrite another key's entry,
//! regardless of the order in which responses arrive.
//!
//! Invalidation keeps the last resolved data around so views can keep
//! rendering it while the re-fetch is in flight.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use tracing::debug;

/// Lifecycle of a single cached query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// No result yet; the first fetch is pending.
    Loading,
    /// The last fetch succeeded and nothing has invalidated it since.
    Resolved,
    /// A mutation made the data stale; a re-fetch is due or in flight.
    Invalidated,
    /// The last fetch failed. Earlier data, if any, is kept.
    Errored,
}

/// Snapshot of one cache entry.
#[derive(Debug, Clone)]
pub struct QueryState<V> {
    pub status: QueryStatus,
    pub data: Option<V>,
    pub error: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub fetching: bool,
}

impl<V> QueryState<V> {
    fn loading() -> Self {
        Self {
            status: QueryStatus::Loading,
            data: None,
            error: None,
            updated_at: None,
            fetching: false,
        }
    }
}

/// Proof of a started fetch. Hand it back to `QueryCache::resolve`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket<K> {
    key: K,
    generation: u64,
}

impl<K> FetchTicket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
struct Entry<V> {
    state: QueryState<V>,
    latest: u64,
}

/// Owned map from query key to its latest state.
#[derive(Debug)]
pub struct QueryCache<K, V> {
    entries: HashMap<K, Entry<V>>,
    next_generation: u64,
}

impl<K, V> Default for QueryCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            next_generation: 0,
        }
    }
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &K) -> Option<&QueryState<V>> {
        self.entries.get(key).map(|entry| &entry.state)
    }

    /// Fresh data is served from the cache; everything else must be fetched.
    pub fn needs_fetch(&self, key: &K) -> bool {
        match self.entries.get(key) {
            None => true,
            Some(entry) => {
                !entry.state.fetching
                    && matches!(
                        entry.state.status,
                        QueryStatus::Invalidated | QueryStatus::Errored
                    )
            }
        }
    }

    /// Start a fetch for `key`, superseding any fetch already in flight.
    pub fn begin_fetch(&mut self, key: K) -> FetchTicket<K> {
        self.next_generation += 1;
        let generation = self.next_generation;

        let entry = self.entries.entry(key.clone()).or_insert_with(|| Entry {
            state: QueryState::loading(),
            latest: 0,
        });
        if entry.state.data.is_none() {
            entry.state.status = QueryStatus::Loading;
        }
        entry.state.fetching = true;
        entry.latest = generation;

        debug!(?key, generation, "query fetch started");
        FetchTicket { key, generation }
    }

    /// Apply a fetch result. Returns `false` when the ticket was superseded
    /// or the entry removed, in which case the result is dropped.
    pub fn resolve(&mut self, ticket: FetchTicket<K>, result: Result<V, String>) -> bool {
        let Some(entry) = self.entries.get_mut(&ticket.key) else {
            debug!(key = ?ticket.key, "query result for removed entry discarded");
            return false;
        };
        if entry.latest != ticket.generation {
            debug!(
                key = ?ticket.key,
                stale = ticket.generation,
                latest = entry.latest,
                "superseded query result discarded"
            );
            return false;
        }

        let state = &mut entry.state;
        state.fetching = false;
        match result {
            Ok(value) => {
                state.status = QueryStatus::Resolved;
                state.data = Some(value);
                state.error = None;
                state.updated_at = Some(Utc::now());
                debug!(key = ?ticket.key, "query resolved");
            }
            Err(message) => {
                debug!(key = ?ticket.key, error = %message, "query errored");
                state.status = QueryStatus::Errored;
                state.error = Some(message);
            }
        }
        true
    }

    /// Mark `key` stale. Returns `false` when nothing is cached under it.
    pub fn invalidate(&mut self, key: &K) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };
        if entry.state.data.is_some() {
            entry.state.status = QueryStatus::Invalidated;
        }
        debug!(?key, "query invalidated");
        true
    }

    pub fn remove(&mut self, key: &K) -> Option<QueryState<V>> {
        self.entries.remove(key).map(|entry| entry.state)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
