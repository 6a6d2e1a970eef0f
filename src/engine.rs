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

//! Wires the leaf crates into one embeddable engine: a [`ColumnStore`]
//! shared by ingest and query, an [`IngestBuffer`] whose flush hook drives
//! [`IndexManager::on_segment_flushed`] (`spec.md` §2 "on flush triggers
//! background index builds"), and the [`IndexManagerProbe`] seam the
//! executor uses to accelerate scans.

use std::sync::Arc;

use strataq_common::config::EngineConfig;
use strataq_index::IndexManager;
use strataq_storage::{BatchAppendResult, ColumnStore, IngestBuffer, RowView};

use crate::index_adapter::IndexManagerProbe;
use crate::service::{IngestService, QueryService};

/// Owns every long-lived piece of the embeddable engine and exposes the
/// two service facades of `spec.md` §6.
pub struct Engine {
    pub ingest: Arc<IngestService>,
    pub query: Arc<QueryService>,
    index_manager: Arc<IndexManager>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let store = Arc::new(ColumnStore::new());
        let index_manager = IndexManager::new(config.index);

        let hook_manager = index_manager.clone();
        let on_flush: Arc<dyn Fn(BatchAppendResult) + Send + Sync> = Arc::new(move |result| {
            for (table, appended) in result {
                let rows: Vec<RowView> = appended.rows.iter().cloned().map(RowView::new).collect();
                hook_manager.on_segment_flushed(&table, appended.segment_id, rows);
            }
        });
        let buffer = IngestBuffer::with_flush_hook(store.clone(), config.ingest, on_flush);
        let ingest = Arc::new(IngestService::new(store.clone(), buffer));

        let probe = Arc::new(IndexManagerProbe::new(index_manager.clone()));
        let query = Arc::new(QueryService::new(store, index_manager.clone(), probe));

        Self { ingest, query, index_manager }
    }

    /// Spawns the ingest flush scheduler and the adaptive-tick scheduler.
    /// Requires a `tokio` runtime to already be running on the caller's
    /// thread (an embedding host is expected to own that runtime).
    pub fn start(&self) {
        self.ingest.start();
        self.index_manager.start();
    }

    /// Stops the ingest scheduler (performing a final flush) and shuts
    /// down the index manager's adaptive tick and background builder.
    pub fn shutdown(&self) {
        self.ingest.stop();
        self.index_manager.shutdown();
    }

    pub fn index_manager(&self) -> &Arc<IndexManager> {
        &self.index_manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strataq_storage::Event;

    #[tokio::test]
    async fn segment_flush_triggers_index_build_for_desired_columns() {
        let engine = Engine::new(EngineConfig::default());
        engine.index_manager.ensure_index("events", "region");

        let events = (0..5)
            .map(|i| Event::new("click").with_table("events").with_ts(i).with_prop("region", "us"))
            .collect();
        engine.ingest.submit(events);
        engine.ingest.flush();

        for _ in 0..50 {
            tokio::task::yield_now().await;
            if engine.index_manager.stats().index_count > 0 {
                break;
            }
        }
        assert!(engine.index_manager.stats().index_count > 0);
    }

    #[tokio::test]
    async fn query_sees_events_submitted_through_ingest() {
        let engine = Engine::new(EngineConfig::default());
        engine
            .ingest
            .submit(vec![Event::new("click").with_table("events").with_ts(1000).with_user_id("u1")]);
        engine.ingest.flush();
        let result = engine
            .query
            .execute(&crate::service::ExecuteRequest::new("SELECT userId FROM events WHERE userId = 'u1'"))
            .unwrap();
        assert_eq!(result.rows.len(), 1);
    }
}
