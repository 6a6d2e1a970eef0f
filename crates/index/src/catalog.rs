// Copyright 2026 the strataq authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use parking_lot::RwLock;
use strataq_storage::now_millis;

/// Catalog entry for one `(table, column)` the catalog has marked
/// "desired" for indexing. Hit counting and last-used tracking use atomics
/// so that `record_hit` never needs the catalog's own write lock.
#[derive(Debug)]
pub struct IndexSpec {
    pub table: String,
    pub column: String,
    pub created_at: i64,
    last_used_at: AtomicI64,
    hit_count: AtomicU64,
    build_cost_millis: AtomicU64,
}

impl IndexSpec {
    fn new(table: &str, column: &str) -> Self {
        let now = now_millis();
        Self {
            table: table.to_string(),
            column: column.to_string(),
            created_at: now,
            last_used_at: AtomicI64::new(now),
            hit_count: AtomicU64::new(0),
            build_cost_millis: AtomicU64::new(0),
        }
    }

    pub fn last_used_at(&self) -> i64 {
        self.last_used_at.load(AtomicOrdering::Relaxed)
    }

    pub fn hit_count(&self) -> u64 {
        self.hit_count.load(AtomicOrdering::Relaxed)
    }

    pub fn build_cost_millis(&self) -> u64 {
        self.build_cost_millis.load(AtomicOrdering::Relaxed)
    }
}

#[derive(Clone, Debug, Default)]
pub struct CatalogStats {
    pub desired_count: usize,
    pub total_hits: u64,
}

/// Thread-safe mapping `(table, column) -> IndexSpec` tracking which
/// indexes are "desired" and their usage statistics (`spec.md` §4.8).
#[derive(Default)]
pub struct IndexCatalog {
    entries: RwLock<HashMap<(String, String), Arc<IndexSpec>>>,
}

impl IndexCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_desired(&self, table: &str, column: &str) {
        let key = (table.to_string(), column.to_string());
        let mut entries = self.entries.write();
        entries
            .entry(key)
            .or_insert_with(|| Arc::new(IndexSpec::new(table, column)));
    }

    pub fn unmark_desired(&self, table: &str, column: &str) {
        self.entries.write().remove(&(table.to_string(), column.to_string()));
    }

    pub fn is_desired(&self, table: &str, column: &str) -> bool {
        self.entries
            .read()
            .contains_key(&(table.to_string(), column.to_string()))
    }

    pub fn list_all(&self) -> Vec<Arc<IndexSpec>> {
        self.entries.read().values().cloned().collect()
    }

    pub fn list_for_table(&self, table: &str) -> Vec<Arc<IndexSpec>> {
        self.entries
            .read()
            .values()
            .filter(|spec| spec.table == table)
            .cloned()
            .collect()
    }

    pub fn get_spec(&self, table: &str, column: &str) -> Option<Arc<IndexSpec>> {
        self.entries
            .read()
            .get(&(table.to_string(), column.to_string()))
            .cloned()
    }

    /// Bumps `hit_count` and refreshes `last_used_at`; does not take the
    /// catalog's write lock.
    pub fn record_hit(&self, table: &str, column: &str) {
        if let Some(spec) = self.get_spec(table, column) {
            spec.hit_count.fetch_add(1, AtomicOrdering::Relaxed);
            spec.last_used_at.store(now_millis(), AtomicOrdering::Relaxed);
        }
    }

    pub fn record_build_cost(&self, table: &str, column: &str, millis: u64) {
        if let Some(spec) = self.get_spec(table, column) {
            spec.build_cost_millis.store(millis, AtomicOrdering::Relaxed);
        }
    }

    /// Specs whose `last_used_at` is older than `now - threshold_millis`.
    pub fn get_stale(&self, threshold_millis: u64) -> Vec<Arc<IndexSpec>> {
        let cutoff = now_millis() - threshold_millis as i64;
        self.entries
            .read()
            .values()
            .filter(|spec| spec.last_used_at() < cutoff)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let entries = self.entries.read();
        CatalogStats {
            desired_count: entries.len(),
            total_hits: entries.values().map(|s| s.hit_count()).sum(),
        }
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_and_unmark_desired() {
        let cat = IndexCatalog::new();
        assert!(!cat.is_desired("events", "region"));
        cat.mark_desired("events", "region");
        assert!(cat.is_desired("events", "region"));
        cat.unmark_desired("events", "region");
        assert!(!cat.is_desired("events", "region"));
    }

    #[test]
    fn record_hit_bumps_counters() {
        let cat = IndexCatalog::new();
        cat.mark_desired("events", "region");
        cat.record_hit("events", "region");
        cat.record_hit("events", "region");
        let spec = cat.get_spec("events", "region").unwrap();
        assert_eq!(spec.hit_count(), 2);
    }

    #[test]
    fn stale_detection_respects_threshold() {
        let cat = IndexCatalog::new();
        cat.mark_desired("events", "region");
        assert!(cat.get_stale(0).len() <= 1);
        assert_eq!(cat.get_stale(10 * 60 * 1000).len(), 0);
    }

    #[test]
    fn mark_desired_is_idempotent() {
        let cat = IndexCatalog::new();
        cat.mark_desired("events", "region");
        let first = cat.get_spec("events", "region").unwrap().created_at;
        cat.mark_desired("events", "region");
        let second = cat.get_spec("events", "region").unwrap().created_at;
        assert_eq!(first, second);
        assert_eq!(cat.stats().desired_count, 1);
    }
}
