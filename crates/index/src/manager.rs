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

//! Integrates the catalog, the two index kinds, the background builder,
//! and the adaptive policy into one owner (`spec.md` §4.11).

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use strataq_common::config::IndexConfig;
use strataq_storage::{now_millis, RowView, SegmentMeta};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use strataq_planner::PredicateObserver;

use crate::builder::{BuildJob, IndexBackgroundBuilder};
use crate::catalog::IndexCatalog;
use crate::policy::AdaptiveIndexPolicy;
use crate::row_set::RowPositions;
use crate::secondary_index::{IndexQuery, SecondaryIndex};

/// Result of an `IndexManager::lookup` call: matching segment-local row
/// positions per segment, whether the result is precise (no residual
/// predicate required), and a diagnostic count of rows the lookup
/// considered.
#[derive(Clone, Debug, Default)]
pub struct IndexLookupResult {
    pub matches: HashMap<u64, RowPositions>,
    pub exact: bool,
    pub rows_considered: u64,
}

impl IndexLookupResult {
    pub fn empty() -> Self {
        Self {
            matches: HashMap::new(),
            exact: false,
            rows_considered: 0,
        }
    }
}

type ColumnIndexes = HashMap<u64, Arc<SecondaryIndex>>;
type TableIndexes = HashMap<String, ColumnIndexes>;

/// State held under one read/write lock: lookups take the read lock only;
/// `unregister_segment`, the installation step of `on_segment_flushed`,
/// and `drop_index` take the write lock (`spec.md` §5).
#[derive(Default)]
struct IndexState {
    indexes: HashMap<String, TableIndexes>,
    segments: HashMap<String, HashMap<u64, SegmentMeta>>,
}

pub struct IndexManager {
    state: RwLock<IndexState>,
    catalog: Arc<IndexCatalog>,
    policy: Arc<AdaptiveIndexPolicy>,
    builder: Arc<IndexBackgroundBuilder>,
    config: IndexConfig,
    tick_handle: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl IndexManager {
    pub fn new(config: IndexConfig) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(IndexState::default()),
            catalog: Arc::new(IndexCatalog::new()),
            policy: Arc::new(AdaptiveIndexPolicy::new(config.window_millis, config.max_observations)),
            builder: Arc::new(IndexBackgroundBuilder::with_default_pool_size()),
            config,
            tick_handle: parking_lot::Mutex::new(None),
        })
    }

    pub fn catalog(&self) -> &Arc<IndexCatalog> {
        &self.catalog
    }

    pub fn policy(&self) -> &Arc<AdaptiveIndexPolicy> {
        &self.policy
    }

    pub fn register_segment(&self, table: &str, segment_id: u64, row_count: usize) {
        let mut state = self.state.write();
        state.segments.entry(table.to_string()).or_default().insert(
            segment_id,
            SegmentMeta {
                segment_id,
                row_count,
                created_at: now_millis(),
            },
        );
    }

    /// Removes segment metadata and every index keyed by that segment.
    pub fn unregister_segment(&self, table: &str, segment_id: u64) {
        let mut state = self.state.write();
        if let Some(segments) = state.segments.get_mut(table) {
            segments.remove(&segment_id);
        }
        if let Some(columns) = state.indexes.get_mut(table) {
            for per_segment in columns.values_mut() {
                per_segment.remove(&segment_id);
            }
        }
    }

    /// For each column currently marked desired on `table`, builds the
    /// appropriate index variant and submits it to the background
    /// builder; installs it under the write lock on success. Does not
    /// retroactively build for segments that predate a column becoming
    /// desired (see `DESIGN.md`'s open-question decisions).
    pub fn on_segment_flushed(self: &Arc<Self>, table: &str, segment_id: u64, rows: Vec<RowView>) {
        self.register_segment(table, segment_id, rows.len());
        let desired_columns: Vec<String> = self
            .catalog
            .list_for_table(table)
            .into_iter()
            .map(|spec| spec.column.clone())
            .collect();

        for column in desired_columns {
            let this = self.clone();
            let table = table.to_string();
            let job = BuildJob {
                table: table.clone(),
                column: column.clone(),
                segment_id,
                rows: rows.clone(),
            };
            let handle = self.builder.submit_build(job);
            tokio::spawn(async move {
                let start = now_millis();
                match handle.await {
                    Ok(Some(index)) => {
                        this.install(&table, &column, segment_id, index);
                        this.catalog
                            .record_build_cost(&table, &column, (now_millis() - start) as u64);
                        debug!(table, column, segment_id, "installed background-built index");
                    }
                    Ok(None) => {
                        debug!(table, column, segment_id, "index build declined (builder shutting down)");
                    }
                    Err(join_error) => {
                        warn!(table, column, segment_id, error = %join_error, "index build failed, falling back to scan");
                    }
                }
            });
        }
    }

    fn install(&self, table: &str, column: &str, segment_id: u64, index: SecondaryIndex) {
        let mut state = self.state.write();
        state
            .indexes
            .entry(table.to_string())
            .or_default()
            .entry(column.to_string())
            .or_default()
            .insert(segment_id, Arc::new(index));
    }

    /// Marks `(table, column)` desired; returns whether an index for it
    /// was already present before this call.
    pub fn ensure_index(&self, table: &str, column: &str) -> bool {
        let already_present = self
            .state
            .read()
            .indexes
            .get(table)
            .and_then(|cols| cols.get(column))
            .map(|segs| !segs.is_empty())
            .unwrap_or(false);
        self.catalog.mark_desired(table, column);
        already_present
    }

    /// Unmarks `(table, column)` desired and removes every per-segment
    /// index for that column.
    pub fn drop_index(&self, table: &str, column: &str) {
        self.catalog.unmark_desired(table, column);
        let mut state = self.state.write();
        if let Some(columns) = state.indexes.get_mut(table) {
            columns.remove(column);
        }
    }

    /// Unions across segments the result of dispatching `query` to each
    /// segment's index for `(table, column)`. Missing table/column yields
    /// an empty, inexact result.
    pub fn lookup(&self, table: &str, column: &str, query: &IndexQuery) -> IndexLookupResult {
        let state = self.state.read();
        let per_segment = match state.indexes.get(table).and_then(|cols| cols.get(column)) {
            Some(m) if !m.is_empty() => m,
            _ => return IndexLookupResult::empty(),
        };

        let all_segment_ids: HashSet<u64> = state
            .segments
            .get(table)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default();
        let indexed_segment_ids: HashSet<u64> = per_segment.keys().copied().collect();
        let mut exact = indexed_segment_ids.is_superset(&all_segment_ids);

        let mut matches = HashMap::new();
        let mut rows_considered = 0u64;
        for (segment_id, index) in per_segment {
            match index.lookup(query) {
                Ok(positions) => {
                    rows_considered += positions.size();
                    matches.insert(*segment_id, positions);
                }
                Err(_) => {
                    exact = false;
                }
            }
        }
        drop(state);
        self.catalog.record_hit(table, column);
        IndexLookupResult { matches, exact, rows_considered }
    }

    /// Hard-coded `selectivity = 0.1` forwarded to the policy, ported
    /// as-is from the source per `DESIGN.md`'s open-question decision.
    pub fn record_query_usage(&self, table: &str, column: &str) {
        self.policy.observe(table, column, false, 0.1);
    }

    fn known_tables(&self) -> Vec<String> {
        let state = self.state.read();
        let mut tables: HashSet<String> = state.segments.keys().cloned().collect();
        tables.extend(state.indexes.keys().cloned());
        tables.extend(self.catalog.list_all().into_iter().map(|spec| spec.table.clone()));
        tables.into_iter().collect()
    }

    /// For each known table, consults the policy for build/drop
    /// recommendations and applies them.
    pub fn adaptive_tick(&self) {
        let mem_budget_bytes = self.config.memory_budget_mb.saturating_mul(1024 * 1024);
        for table in self.known_tables() {
            let to_build = self.policy.recommend_build(&table, mem_budget_bytes, self.config.max_new_per_tick);
            for column in &to_build {
                if !self.catalog.is_desired(&table, column) {
                    info!(table, column, "adaptive tick: recommending build");
                }
                self.ensure_index(&table, column);
            }

            let to_drop = self.policy.recommend_drop(&table, usize::MAX, self.config.stale_drop_millis);
            for column in &to_drop {
                if self.catalog.is_desired(&table, column) {
                    info!(table, column, "adaptive tick: dropping stale index");
                    self.drop_index(&table, column);
                }
            }
        }
    }

    /// Spawns the periodic adaptive-tick scheduler.
    pub fn start(self: &Arc<Self>) {
        let this = self.clone();
        let interval = Duration::from_secs(self.config.adaptive_tick_seconds.max(1));
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                this.adaptive_tick();
            }
        });
        *self.tick_handle.lock() = Some(handle);
    }

    /// Cancels the tick scheduler, stops the builder from accepting new
    /// work, and gives in-flight builds a 5-second grace period to finish
    /// before force-cancelling whatever remains (`spec.md` §5).
    pub fn shutdown(&self) {
        if let Some(handle) = self.tick_handle.lock().take() {
            handle.abort();
        }
        self.builder.shutdown();
        let builder = self.builder.clone();
        tokio::spawn(async move {
            let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
            while builder.active_tasks() > 0 && tokio::time::Instant::now() < deadline {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            if builder.active_tasks() > 0 {
                warn!(remaining = builder.active_tasks(), "index builder grace period elapsed, forcing shutdown");
            }
            builder.shutdown_now();
        });
    }

    pub fn stats(&self) -> ManagerStats {
        let state = self.state.read();
        let index_count = state
            .indexes
            .values()
            .flat_map(|cols| cols.values())
            .map(|segs| segs.len())
            .sum();
        let memory_bytes = state
            .indexes
            .values()
            .flat_map(|cols| cols.values())
            .flat_map(|segs| segs.values())
            .map(|idx| idx.memory_bytes())
            .sum();
        ManagerStats {
            index_count,
            memory_bytes,
            catalog: self.catalog.stats(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ManagerStats {
    pub index_count: usize,
    pub memory_bytes: usize,
    pub catalog: crate::catalog::CatalogStats,
}

/// Lets the planner feed predicate observations straight to the manager's
/// policy without depending on `strataq_index` itself.
impl PredicateObserver for IndexManager {
    fn observe(&self, table: &str, column: &str, is_range: bool, selectivity: f64) {
        self.policy.observe(table, column, is_range, selectivity);
    }
}
