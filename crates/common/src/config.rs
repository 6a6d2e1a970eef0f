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

//! The recognized configuration options of the embeddable engine (see
//! `spec.md` §6). No on-disk format is defined here; a host application is
//! expected to deserialize this from whatever config layer it already
//! uses (it derives `serde::Deserialize`, the way `risingwave_common`'s
//! system params do).

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// `ingest.batchSize`: desired events per flush.
    pub batch_size: usize,
    /// `ingest.flushMillis`: maximum age of buffered events before a forced flush.
    pub flush_interval_millis: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: 10_000,
            flush_interval_millis: 500,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// `index.memoryBudgetMb`: total memory budget across all indexes,
    /// consulted by the adaptive policy at recommendation time.
    pub memory_budget_mb: u64,
    /// `index.maxNewPerTick`: max new indexes recommended per adaptive tick.
    pub max_new_per_tick: usize,
    /// `index.staleDropMs`: threshold past which an unused index is a drop candidate.
    pub stale_drop_millis: u64,
    /// `index.adaptiveTickSeconds`: period of the adaptive control loop.
    pub adaptive_tick_seconds: u64,
    /// Rolling observation window used by the adaptive policy.
    pub window_millis: u64,
    /// Hard cap on observations retained per (table, column).
    pub max_observations: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            memory_budget_mb: 256,
            max_new_per_tick: 2,
            stale_drop_millis: 10 * 60 * 1000,
            adaptive_tick_seconds: 60,
            window_millis: 60_000,
            max_observations: 1_000,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub ingest: IngestConfig,
    pub index: IndexConfig,
}
