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

use strataq_storage::RowView;

use crate::error::IndexError;
use crate::row_set::RowPositions;

/// Equality index for low-to-medium cardinality string-valued columns
/// (base columns and `props.*`). Built by scanning a segment in order and
/// bucketing each row's segment-local position by its column value; null
/// properties are skipped.
#[derive(Clone, Debug)]
pub struct BitmapIndex {
    table: String,
    column: String,
    segment_id: u64,
    buckets: HashMap<String, RowPositions>,
}

impl BitmapIndex {
    pub fn build(table: &str, column: &str, segment_id: u64, rows: &[RowView]) -> Self {
        let mut buckets: HashMap<String, RowPositions> = HashMap::new();
        for (pos, row) in rows.iter().enumerate() {
            let value = row.column(column);
            if value.is_null() {
                continue;
            }
            buckets
                .entry(value.as_text())
                .or_default()
                .add(pos as u32);
        }
        Self {
            table: table.to_string(),
            column: column.to_string(),
            segment_id,
            buckets,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn segment_id(&self) -> u64 {
        self.segment_id
    }

    pub fn lookup_equals(&self, value: &str) -> RowPositions {
        self.buckets.get(value).cloned().unwrap_or_default()
    }

    pub fn lookup_in(&self, values: &[String]) -> RowPositions {
        RowPositions::union_all(values.iter().filter_map(|v| self.buckets.get(v)))
    }

    /// Bitmap indexes carry no ordering over their keys; range lookups are
    /// unsupported and the caller must fall back to a scan.
    pub fn lookup_range(
        &self,
        _lo: &str,
        _include_lo: bool,
        _hi: &str,
        _include_hi: bool,
    ) -> Result<RowPositions, IndexError> {
        Err(IndexError::UnsupportedOperation {
            index_kind: "Bitmap",
            operation: "range lookup",
        })
    }

    pub fn memory_bytes(&self) -> usize {
        self.buckets
            .iter()
            .map(|(k, v)| k.len() + v.memory_bytes())
            .sum()
    }

    pub fn cardinality(&self) -> usize {
        self.buckets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;
    use std::sync::Arc;
    use strataq_storage::Event;

    fn row(region: &str) -> RowView {
        let mut props = Map::new();
        props.insert("region".to_string(), region.to_string());
        RowView::new(Arc::new(Event {
            ts: 0,
            table: "events".into(),
            user_id: None,
            event: "click".into(),
            props,
        }))
    }

    #[test]
    fn build_and_equals_lookup() {
        let rows = vec![row("us"), row("eu"), row("us")];
        let idx = BitmapIndex::build("events", "region", 1, &rows);
        let matches = idx.lookup_equals("us");
        assert_eq!(matches.size(), 2);
        assert!(matches.contains(0));
        assert!(matches.contains(2));
    }

    #[test]
    fn lookup_in_unions_buckets() {
        let rows = vec![row("us"), row("eu"), row("apac")];
        let idx = BitmapIndex::build("events", "region", 1, &rows);
        let matches = idx.lookup_in(&["us".to_string(), "apac".to_string()]);
        assert_eq!(matches.size(), 2);
    }

    #[test]
    fn range_lookup_is_unsupported() {
        let idx = BitmapIndex::build("events", "region", 1, &[]);
        assert!(idx.lookup_range("a", true, "z", true).is_err());
    }

    #[test]
    fn null_properties_are_skipped() {
        let missing = RowView::new(Arc::new(Event {
            ts: 0,
            table: "events".into(),
            user_id: None,
            event: "click".into(),
            props: Map::new(),
        }));
        let idx = BitmapIndex::build("events", "region", 1, &[missing]);
        assert_eq!(idx.cardinality(), 0);
    }
}
