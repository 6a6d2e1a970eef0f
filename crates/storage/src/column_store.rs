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
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::{now_millis, Event};
use crate::row::RowView;
use crate::segment::SegmentMeta;

/// One flushed batch's worth of rows for a table: the implicit unit of
/// index granularity. Row positions within `events` are the segment-local
/// positions that `SecondaryIndex` results are expressed in.
struct Segment {
    id: u64,
    created_at: i64,
    events: Vec<Arc<Event>>,
}

/// Per-table append-only ordered sequence of segments, guarded by its own
/// mutex so that appenders to one table never block readers of another.
struct TableStore {
    segments: Mutex<Vec<Arc<Segment>>>,
    next_segment_id: AtomicU64,
}

impl TableStore {
    fn new() -> Self {
        Self {
            segments: Mutex::new(Vec::new()),
            next_segment_id: AtomicU64::new(1),
        }
    }

    /// Appends `batch` as one new segment and returns its metadata plus
    /// contents — everything a caller needs to register the segment and
    /// kick off its background index build.
    fn append(&self, batch: Vec<Event>) -> SegmentAppend {
        let id = self.next_segment_id.fetch_add(1, AtomicOrdering::Relaxed);
        let events: Vec<Arc<Event>> = batch.into_iter().map(Arc::new).collect();
        let segment = Arc::new(Segment {
            id,
            created_at: now_millis(),
            events: events.clone(),
        });
        self.segments.lock().push(segment);
        SegmentAppend {
            segment_id: id,
            rows: events,
        }
    }

    /// Snapshots the current segment list under the mutex, then releases
    /// it: scanners iterate the snapshot without holding the lock.
    fn snapshot(&self) -> Vec<Arc<Segment>> {
        self.segments.lock().clone()
    }

    fn len(&self) -> usize {
        self.segments.lock().iter().map(|s| s.events.len()).sum()
    }

    fn segment_metas(&self) -> Vec<SegmentMeta> {
        self.segments
            .lock()
            .iter()
            .map(|s| SegmentMeta {
                segment_id: s.id,
                row_count: s.events.len(),
                created_at: s.created_at,
            })
            .collect()
    }
}

/// One table's contribution to an `append_batch` call: the new segment's
/// id plus the rows it contains, in insertion order.
#[derive(Clone, Debug)]
pub struct SegmentAppend {
    pub segment_id: u64,
    pub rows: Vec<Arc<Event>>,
}

/// Per-table newly-appended segment from one `append_batch` call, keyed by
/// table.
pub type BatchAppendResult = HashMap<String, SegmentAppend>;

#[derive(Clone, Debug, Default)]
pub struct StoreStats {
    pub total_events: u64,
    pub total_batches: u64,
    pub per_table_counts: HashMap<String, u64>,
}

/// The authoritative in-memory record of all ingested events, partitioned
/// by table. Operations are infallible on well-formed input: there is no
/// schema to violate, and unknown tables yield the empty sequence rather
/// than an error.
pub struct ColumnStore {
    tables: Mutex<HashMap<String, Arc<TableStore>>>,
    total_events: AtomicU64,
    total_batches: AtomicU64,
}

impl Default for ColumnStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            total_events: AtomicU64::new(0),
            total_batches: AtomicU64::new(0),
        }
    }

    fn table_store(&self, table: &str) -> Arc<TableStore> {
        let mut tables = self.tables.lock();
        tables
            .entry(table.to_string())
            .or_insert_with(|| Arc::new(TableStore::new()))
            .clone()
    }

    fn existing_table_store(&self, table: &str) -> Option<Arc<TableStore>> {
        self.tables.lock().get(table).cloned()
    }

    /// Groups `events` by their (defaulted) `table` field and appends each
    /// group as one new segment to that table's sequence, atomically with
    /// respect to concurrent readers of that table.
    pub fn append_batch(&self, events: Vec<Event>) -> BatchAppendResult {
        let mut grouped: HashMap<String, Vec<Event>> = HashMap::new();
        for mut event in events {
            let table = event.normalized_table().to_string();
            event.table = table.clone();
            grouped.entry(table).or_default().push(event);
        }

        let mut result = BatchAppendResult::new();
        let mut total = 0u64;
        for (table, batch) in grouped {
            total += batch.len() as u64;
            let store = self.table_store(&table);
            let appended = store.append(batch);
            result.insert(table, appended);
        }
        self.total_events.fetch_add(total, AtomicOrdering::Relaxed);
        self.total_batches.fetch_add(1, AtomicOrdering::Relaxed);
        result
    }

    /// Rows of `table` whose timestamp lies in `[from_ts, to_ts]` and for
    /// which `filter` (if given) returns true. Yield order is insertion
    /// order; there is no sort. Unknown tables yield the empty sequence.
    pub fn scan(
        &self,
        table: &str,
        from_ts: i64,
        to_ts: i64,
        filter: Option<&dyn Fn(&RowView) -> bool>,
    ) -> Vec<RowView> {
        let store = match self.existing_table_store(table) {
            Some(s) => s,
            None => return Vec::new(),
        };
        store
            .snapshot()
            .into_iter()
            .flat_map(|segment| segment.events.clone())
            .filter(|e| e.ts >= from_ts && e.ts <= to_ts)
            .map(RowView::new)
            .filter(|row| filter.map(|f| f(row)).unwrap_or(true))
            .collect()
    }

    /// Index-accelerated variant of [`Self::scan`]: restricts the scan of
    /// one segment to the given segment-local row positions rather than
    /// iterating every row, then applies the same time range and residual
    /// filter. Used by the executor when an [`crate::ColumnStore`] probe
    /// found an exact or partial match set for a segment.
    pub fn scan_positions<I: IntoIterator<Item = u32>>(
        &self,
        table: &str,
        segment_id: u64,
        positions: I,
        from_ts: i64,
        to_ts: i64,
        filter: Option<&dyn Fn(&RowView) -> bool>,
    ) -> Vec<RowView> {
        let store = match self.existing_table_store(table) {
            Some(s) => s,
            None => return Vec::new(),
        };
        let segment = match store.snapshot().into_iter().find(|s| s.id == segment_id) {
            Some(s) => s,
            None => return Vec::new(),
        };
        positions
            .into_iter()
            .filter_map(|pos| segment.events.get(pos as usize).cloned())
            .filter(|e| e.ts >= from_ts && e.ts <= to_ts)
            .map(RowView::new)
            .filter(|row| filter.map(|f| f(row)).unwrap_or(true))
            .collect()
    }

    /// Metadata for every segment currently held for `table`, in flush
    /// order. Empty for unknown tables.
    pub fn segment_metas(&self, table: &str) -> Vec<SegmentMeta> {
        self.existing_table_store(table)
            .map(|s| s.segment_metas())
            .unwrap_or_default()
    }

    /// All rows of one segment, as a [`RowView`] snapshot — used by the
    /// background index builder to construct a `SecondaryIndex` without
    /// holding the table's append mutex.
    pub fn segment_rows(&self, table: &str, segment_id: u64) -> Vec<RowView> {
        let store = match self.existing_table_store(table) {
            Some(s) => s,
            None => return Vec::new(),
        };
        store
            .snapshot()
            .into_iter()
            .find(|s| s.id == segment_id)
            .map(|s| s.events.iter().cloned().map(RowView::new).collect())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> StoreStats {
        let tables = self.tables.lock();
        let per_table_counts = tables
            .iter()
            .map(|(name, store)| (name.clone(), store.len() as u64))
            .collect();
        StoreStats {
            total_events: self.total_events.load(AtomicOrdering::Relaxed),
            total_batches: self.total_batches.load(AtomicOrdering::Relaxed),
            per_table_counts,
        }
    }

    pub fn size(&self) -> u64 {
        self.total_events.load(AtomicOrdering::Relaxed)
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.lock().keys().cloned().collect()
    }

    pub fn clear(&self) {
        self.tables.lock().clear();
        self.total_events.store(0, AtomicOrdering::Relaxed);
        self.total_batches.store(0, AtomicOrdering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ev(ts: i64, table: &str, event: &str) -> Event {
        Event::new(event).with_table(table).with_ts(ts)
    }

    #[test]
    fn append_then_scan_preserves_insertion_order() {
        let store = ColumnStore::new();
        store.append_batch(vec![
            ev(3, "events", "a"),
            ev(1, "events", "b"),
            ev(2, "events", "c"),
        ]);
        let rows = store.scan("events", i64::MIN, i64::MAX, None);
        let names: Vec<_> = rows.iter().map(|r| r.event_name().to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn unknown_table_yields_empty_sequence() {
        let store = ColumnStore::new();
        assert!(store.scan("nope", 0, 100, None).is_empty());
    }

    #[test]
    fn append_batch_partitions_by_table() {
        let store = ColumnStore::new();
        let result = store.append_batch(vec![ev(1, "a", "x"), ev(1, "b", "y"), ev(2, "a", "z")]);
        assert_eq!(result.get("a").unwrap().rows.len(), 2);
        assert_eq!(result.get("b").unwrap().rows.len(), 1);
        assert_eq!(store.size(), 3);
    }

    #[test]
    fn time_range_is_inclusive() {
        let store = ColumnStore::new();
        store.append_batch(vec![ev(100, "events", "a"), ev(200, "events", "b"), ev(300, "events", "c")]);
        let rows = store.scan("events", 100, 200, None);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn missing_table_defaults_to_events() {
        let store = ColumnStore::new();
        let mut e = Event::new("x");
        e.table = String::new();
        store.append_batch(vec![e]);
        assert_eq!(store.scan("events", i64::MIN, i64::MAX, None).len(), 1);
    }

    #[test]
    fn each_append_batch_call_creates_one_new_segment_per_table() {
        let store = ColumnStore::new();
        let r1 = store.append_batch(vec![ev(1, "events", "a")]);
        let r2 = store.append_batch(vec![ev(2, "events", "b")]);
        assert_ne!(r1.get("events").unwrap().segment_id, r2.get("events").unwrap().segment_id);
        assert_eq!(store.segment_metas("events").len(), 2);
    }

    #[test]
    fn scan_positions_restricts_to_segment_local_rows() {
        let store = ColumnStore::new();
        let appended = store.append_batch(vec![ev(1, "events", "a"), ev(2, "events", "b"), ev(3, "events", "c")]);
        let segment_id = appended.get("events").unwrap().segment_id;
        let rows = store.scan_positions("events", segment_id, [0u32, 2u32], i64::MIN, i64::MAX, None);
        let names: Vec<_> = rows.iter().map(|r| r.event_name().to_string()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
