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

//! From a rolling window of observed predicates, ranks `(table, column)`
//! pairs as index build candidates and flags unused ones as drop
//! candidates (`spec.md` §4.10).

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use strataq_planner::PredicateObserver;
use strataq_storage::now_millis;

use crate::btree_index::is_numeric_column;

#[derive(Clone, Copy, Debug)]
struct Observation {
    timestamp: i64,
    is_range: bool,
    selectivity: f64,
}

#[derive(Clone, Copy, Debug)]
struct ScoreWeights {
    qps: f64,
    selectivity: f64,
    equals_ratio: f64,
    range_ratio: f64,
    cardinality: f64,
}

const WEIGHTS: ScoreWeights = ScoreWeights {
    qps: 1.0,
    selectivity: 2.0,
    equals_ratio: 1.5,
    range_ratio: 2.0,
    cardinality: 0.5,
};

/// Per-`(table, column)` observation history, capped at `max_observations`
/// and pruned to the most recent `window_millis` on every append — "a
/// lock-free list append with prune" per `spec.md` §5, approximated here
/// with a per-column `parking_lot::Mutex` so one column's observations
/// never contend with another's.
struct ColumnHistory {
    window_millis: u64,
    max_observations: usize,
    observations: Mutex<VecDeque<Observation>>,
}

impl ColumnHistory {
    fn new(window_millis: u64, max_observations: usize) -> Self {
        Self {
            window_millis,
            max_observations,
            observations: Mutex::new(VecDeque::new()),
        }
    }

    fn observe(&self, is_range: bool, selectivity: f64) {
        let now = now_millis();
        let mut obs = self.observations.lock();
        obs.push_back(Observation {
            timestamp: now,
            is_range,
            selectivity,
        });
        let cutoff = now - self.window_millis as i64;
        while obs.front().map(|o| o.timestamp < cutoff).unwrap_or(false) {
            obs.pop_front();
        }
        while obs.len() > self.max_observations {
            obs.pop_front();
        }
    }

    fn snapshot(&self) -> Vec<Observation> {
        let now = now_millis();
        let cutoff = now - self.window_millis as i64;
        self.observations
            .lock()
            .iter()
            .filter(|o| o.timestamp >= cutoff)
            .copied()
            .collect()
    }

    fn newest_timestamp(&self) -> Option<i64> {
        self.observations.lock().back().map(|o| o.timestamp)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BuildCandidate {
    pub table: String,
    pub column: String,
    pub score: f64,
    pub estimated_memory_bytes: u64,
}

/// Default `window_millis` / `max_observations`, mirroring
/// `strataq_common::config::IndexConfig`'s defaults.
pub struct AdaptiveIndexPolicy {
    window_millis: u64,
    max_observations: usize,
    history: Mutex<HashMap<(String, String), std::sync::Arc<ColumnHistory>>>,
}

impl AdaptiveIndexPolicy {
    pub fn new(window_millis: u64, max_observations: usize) -> Self {
        Self {
            window_millis,
            max_observations,
            history: Mutex::new(HashMap::new()),
        }
    }

    fn history_for(&self, table: &str, column: &str) -> std::sync::Arc<ColumnHistory> {
        let key = (table.to_string(), column.to_string());
        let mut map = self.history.lock();
        map.entry(key)
            .or_insert_with(|| std::sync::Arc::new(ColumnHistory::new(self.window_millis, self.max_observations)))
            .clone()
    }

    pub fn observe(&self, table: &str, column: &str, is_range: bool, selectivity: f64) {
        self.history_for(table, column).observe(is_range, selectivity);
    }

    fn columns_of_table(&self, table: &str) -> Vec<String> {
        self.history
            .lock()
            .keys()
            .filter(|(t, _)| t == table)
            .map(|(_, c)| c.clone())
            .collect()
    }

    fn score(&self, table: &str, column: &str) -> Option<BuildCandidate> {
        let history = self.history_for(table, column);
        let obs = history.snapshot();
        if obs.is_empty() {
            return None;
        }
        let count = obs.len() as f64;
        let avg_selectivity = obs.iter().map(|o| o.selectivity).sum::<f64>() / count;
        let equals_ratio = obs.iter().filter(|o| !o.is_range).count() as f64 / count;
        let range_ratio = obs.iter().filter(|o| o.is_range).count() as f64 / count;
        let qps = count * 1000.0 / self.window_millis as f64;
        let estimated_cardinality = 1.0 / avg_selectivity.max(0.001);

        let score = WEIGHTS.qps * qps
            + WEIGHTS.selectivity * (1.0 - avg_selectivity)
            + WEIGHTS.equals_ratio * equals_ratio
            + WEIGHTS.range_ratio * range_ratio
            - WEIGHTS.cardinality * estimated_cardinality.max(1.0).log10();

        let is_range_heavy = obs.iter().filter(|o| o.is_range).count() * 2 > obs.len();
        let estimated_memory_bytes = if is_numeric_column(column) && is_range_heavy {
            20.0 * count
        } else {
            100.0 * estimated_cardinality
        };

        Some(BuildCandidate {
            table: table.to_string(),
            column: column.to_string(),
            score,
            estimated_memory_bytes: estimated_memory_bytes.round().max(0.0) as u64,
        })
    }

    /// Ranks this table's observed columns by score and greedily packs up
    /// to `max_new` of them within `mem_budget_bytes`.
    pub fn recommend_build(&self, table: &str, mem_budget_bytes: u64, max_new: usize) -> Vec<String> {
        let mut candidates: Vec<BuildCandidate> = self
            .columns_of_table(table)
            .into_iter()
            .filter_map(|column| self.score(table, &column))
            .collect();
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        let mut chosen = Vec::new();
        let mut spent = 0u64;
        for candidate in candidates {
            if chosen.len() >= max_new {
                break;
            }
            let next_spend = spent.saturating_add(candidate.estimated_memory_bytes);
            if next_spend > mem_budget_bytes {
                continue;
            }
            spent = next_spend;
            chosen.push(candidate.column);
        }
        chosen
    }

    /// Columns whose newest observation is older than `stale_millis`, or
    /// which have no observations.
    pub fn recommend_drop(&self, table: &str, max_drop: usize, stale_millis: u64) -> Vec<String> {
        let now = now_millis();
        let mut stale: Vec<String> = self
            .columns_of_table(table)
            .into_iter()
            .filter(|column| {
                let history = self.history_for(table, column);
                match history.newest_timestamp() {
                    None => true,
                    Some(ts) => now - ts > stale_millis as i64,
                }
            })
            .collect();
        stale.truncate(max_drop);
        stale
    }
}

impl PredicateObserver for AdaptiveIndexPolicy {
    fn observe(&self, table: &str, column: &str, is_range: bool, selectivity: f64) {
        AdaptiveIndexPolicy::observe(self, table, column, is_range, selectivity);
    }
}
