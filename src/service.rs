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

//! The embeddable facade of `spec.md` §6: `IngestService` wraps the
//! storage layer's buffer and store, `QueryService` wraps the SQL
//! front end, planner, and executor. Neither type owns the index
//! layer directly — `Engine` (`crate::engine`) wires the two of them
//! together with an `IndexManager` through `IndexManagerProbe`.

use std::sync::Arc;

use strataq_exec::{IndexProbe, QueryResult};
use strataq_index::IndexManager;
use strataq_planner::{observer::NullObserver, plan, PhysicalPlan};
use strataq_storage::{ColumnStore, Event, IngestBuffer, RowView, StoreStats, SubmitOutcome};
use strataq_sql::parse;

use crate::error::EngineError;

/// `request = {sql, limit_hint, vectorized}` of `spec.md` §6.
/// `vectorized` is accepted but unused — the executor is deliberately
/// tuple-at-a-time (`spec.md` §1 "vectorless").
#[derive(Clone, Debug, Default)]
pub struct ExecuteRequest {
    pub sql: String,
    pub limit_hint: Option<u64>,
    pub vectorized: bool,
}

impl ExecuteRequest {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            limit_hint: None,
            vectorized: false,
        }
    }

    pub fn with_limit_hint(mut self, limit_hint: u64) -> Self {
        self.limit_hint = Some(limit_hint);
        self
    }
}

/// Wraps the ingest buffer and column store behind the four operations
/// `spec.md` §6 names: `submit`, `flush`/`stop`, `scan`, `query_events`,
/// `stats`.
pub struct IngestService {
    store: Arc<ColumnStore>,
    buffer: Arc<IngestBuffer>,
}

impl IngestService {
    pub fn new(store: Arc<ColumnStore>, buffer: Arc<IngestBuffer>) -> Self {
        Self { store, buffer }
    }

    /// Spawns the periodic flush scheduler.
    pub fn start(&self) {
        self.buffer.start();
    }

    /// `>= 0` accepted; negative means overloaded (the whole batch was
    /// dropped and never reached the store).
    pub fn submit(&self, events: Vec<Event>) -> i64 {
        match self.buffer.submit(events) {
            SubmitOutcome::Accepted(n) => n as i64,
            SubmitOutcome::Overloaded => -1,
        }
    }

    pub fn flush(&self) {
        self.buffer.flush();
    }

    pub fn stop(&self) {
        self.buffer.stop();
    }

    pub fn scan(&self, table: &str, from_ts: i64, to_ts: i64, filter: Option<&dyn Fn(&RowView) -> bool>) -> Vec<RowView> {
        self.store.scan(table, from_ts, to_ts, filter)
    }

    /// `query_events(table, from, to) -> list<Event>`: owned copies, for
    /// collaborators that need to re-serialize raw events (e.g. a
    /// WebSocket fan-out) rather than the read-only row view.
    pub fn query_events(&self, table: &str, from_ts: i64, to_ts: i64) -> Vec<Event> {
        self.store
            .scan(table, from_ts, to_ts, None)
            .into_iter()
            .map(|row| row.source().clone())
            .collect()
    }

    pub fn stats(&self) -> IngestStats {
        IngestStats {
            store: self.store.stats(),
            dropped: self.buffer.dropped_count(),
            pending: self.buffer.pending_count(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct IngestStats {
    pub store: StoreStats,
    pub dropped: u64,
    pub pending: usize,
}

/// Wraps the SQL front end, planner, and executor behind the operations
/// `spec.md` §6 names: `execute`, `explain`, `validate_sql`,
/// `get_table_names`, `get_total_event_count`, `get_storage_stats`.
pub struct QueryService {
    store: Arc<ColumnStore>,
    index_manager: Arc<IndexManager>,
    probe: Arc<dyn IndexProbe>,
}

impl QueryService {
    pub fn new(store: Arc<ColumnStore>, index_manager: Arc<IndexManager>, probe: Arc<dyn IndexProbe>) -> Self {
        Self { store, index_manager, probe }
    }

    /// Parses, plans (recording predicate observations for the adaptive
    /// policy), and executes `request.sql`, optionally index-accelerated.
    pub fn execute(&self, request: &ExecuteRequest) -> Result<QueryResult, EngineError> {
        let stmt = parse(&request.sql)?;
        let physical = plan(&stmt, request.limit_hint, self.index_manager.as_ref())?;
        let result = strataq_exec::execute(&physical, &self.store, Some(self.probe.as_ref()))?;
        Ok(result)
    }

    /// Parses and plans `request.sql` without executing it or recording
    /// predicate observations — useful for a caller inspecting the
    /// pipeline a query would run (e.g. a console's `EXPLAIN`).
    pub fn explain(&self, request: &ExecuteRequest) -> Result<PhysicalPlan, EngineError> {
        let stmt = parse(&request.sql)?;
        let physical = plan(&stmt, request.limit_hint, &NullObserver)?;
        Ok(physical)
    }

    /// Parse- and plan-checks `sql` without touching the store or the
    /// adaptive policy.
    pub fn validate_sql(&self, sql: &str) -> Result<(), EngineError> {
        let stmt = parse(sql)?;
        plan(&stmt, None, &NullObserver)?;
        Ok(())
    }

    pub fn get_table_names(&self) -> Vec<String> {
        self.store.table_names()
    }

    pub fn get_total_event_count(&self) -> u64 {
        self.store.size()
    }

    pub fn get_storage_stats(&self) -> StoreStats {
        self.store.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strataq_common::config::IngestConfig;
    use strataq_common::Value;
    use strataq_exec::NullProbe;
    use strataq_index::IndexManager;
    use strataq_common::config::IndexConfig;

    fn seeded() -> (Arc<ColumnStore>, QueryService, IngestService) {
        let store = Arc::new(ColumnStore::new());
        store.append_batch(vec![
            Event::new("click").with_table("events").with_ts(1000).with_user_id("u1").with_prop("region", "us"),
            Event::new("purchase").with_table("events").with_ts(2000).with_user_id("u2").with_prop("region", "eu"),
        ]);
        let buffer = IngestBuffer::new(store.clone(), IngestConfig::default());
        let ingest = IngestService::new(store.clone(), buffer);
        let manager = IndexManager::new(IndexConfig::default());
        let query = QueryService::new(store.clone(), manager, Arc::new(NullProbe));
        (store, query, ingest)
    }

    #[test]
    fn execute_returns_a_query_result() {
        let (_store, query, _ingest) = seeded();
        let result = query.execute(&ExecuteRequest::new("SELECT userId FROM events WHERE userId = 'u1'")).unwrap();
        assert_eq!(result.rows, vec![vec![Value::Str("u1".into())]]);
    }

    #[test]
    fn validate_sql_rejects_group_by_without_aggregate() {
        let (_store, query, _ingest) = seeded();
        assert!(query.validate_sql("SELECT userId FROM events GROUP BY userId").is_err());
    }

    #[test]
    fn validate_sql_rejects_malformed_syntax() {
        let (_store, query, _ingest) = seeded();
        assert!(query.validate_sql("SELECT FROM events").is_err());
    }

    #[test]
    fn explain_does_not_execute() {
        let (_store, query, _ingest) = seeded();
        let plan = query.explain(&ExecuteRequest::new("SELECT * FROM events")).unwrap();
        assert_eq!(plan.scan.table, "events");
    }

    #[test]
    fn get_table_names_reflects_store() {
        let (_store, query, _ingest) = seeded();
        assert_eq!(query.get_table_names(), vec!["events".to_string()]);
        assert_eq!(query.get_total_event_count(), 2);
    }

    #[test]
    fn ingest_submit_accepts_and_query_sees_it() {
        let (_store, query, ingest) = seeded();
        let accepted = ingest.submit(vec![Event::new("click").with_table("events").with_ts(3000).with_user_id("u3")]);
        assert_eq!(accepted, 1);
        let result = query.execute(&ExecuteRequest::new("SELECT userId FROM events WHERE userId = 'u3'")).unwrap();
        assert_eq!(result.rows.len(), 1);
    }

    #[test]
    fn ingest_stats_reports_store_totals() {
        let (_store, _query, ingest) = seeded();
        let stats = ingest.stats();
        assert_eq!(stats.store.total_events, 2);
        assert_eq!(stats.dropped, 0);
    }
}
