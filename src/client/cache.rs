use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

/// Identifies one cached query result: the query name plus its serialized
/// parameters. The same post cached under the feed, a community list and a
/// profile list gets three distinct keys and is patched independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub query: &'static str,
    pub params: String,
}

impl QueryKey {
    pub fn new(query: &'static str, params: impl Into<String>) -> Self {
        QueryKey {
            query,
            params: params.into(),
        }
    }
}

/// Rollback handle captured when a patch is applied. Restoring puts the
/// pre-patch value back verbatim (including "no value cached").
#[derive(Debug)]
pub struct Snapshot {
    key: QueryKey,
    previous: Option<Value>,
}

/// Shared cache of query results keyed by query name + parameters.
///
/// Each key carries a generation counter. A refetch records the generation
/// when it starts and may only land while that generation is still current;
/// `cancel_pending` bumps the counter so an in-flight response from before
/// an optimistic patch is discarded instead of overwriting the patch.
#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    values: Arc<DashMap<QueryKey, Value>>,
    generations: Arc<DashMap<QueryKey, u64>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<Value> {
        self.values.get(key).map(|v| v.clone())
    }

    /// Stores an authoritative value (e.g. server-confirmed data).
    pub fn set(&self, key: QueryKey, value: Value) {
        self.values.insert(key, value);
    }

    /// Marks the start of a refetch and returns the generation it belongs to.
    pub fn begin_fetch(&self, key: &QueryKey) -> u64 {
        *self.generations.entry(key.clone()).or_insert(0)
    }

    /// Lands a refetched value, unless the key's generation moved on since
    /// `begin_fetch`. Returns whether the value was stored.
    pub fn complete_fetch(&self, key: &QueryKey, generation: u64, value: Value) -> bool {
        let current = *self.generations.entry(key.clone()).or_insert(0);
        if current != generation {
            return false;
        }
        self.values.insert(key.clone(), value);
        true
    }

    /// Invalidates all in-flight refetches for the key.
    pub fn cancel_pending(&self, key: &QueryKey) {
        *self.generations.entry(key.clone()).or_insert(0) += 1;
    }

    /// Applies an in-place patch to the cached value, if one exists, and
    /// returns a snapshot of what was there before. With nothing cached
    /// there is nothing to patch or roll back.
    pub fn patch<F>(&self, key: QueryKey, patch: F) -> Option<Snapshot>
    where
        F: FnOnce(&mut Value),
    {
        let mut entry = self.values.get_mut(&key)?;
        let previous = entry.value().clone();
        patch(entry.value_mut());
        Some(Snapshot {
            key,
            previous: Some(previous),
        })
    }

    /// Restores a snapshot verbatim.
    pub fn restore(&self, snapshot: Snapshot) {
        match snapshot.previous {
            Some(value) => {
                self.values.insert(snapshot.key, value);
            }
            None => {
                self.values.remove(&snapshot.key);
            }
        }
    }
}
