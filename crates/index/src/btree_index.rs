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

use strataq_storage::RowView;

use crate::error::IndexError;
use crate::row_set::RowPositions;

/// Names that heuristically suggest numeric property content, used by
/// `is_numeric_column` (`spec.md` §4.7) to choose `BTree` over `Bitmap`.
const NUMERIC_NAME_HINTS: [&str; 4] = ["price", "amount", "count", "size"];

/// Whether `column` should be indexed with a [`BTreeIndex`] rather than a
/// [`crate::bitmap_index::BitmapIndex`]: the `ts`/`timestamp` base column,
/// or a property name containing one of `NUMERIC_NAME_HINTS`.
pub fn is_numeric_column(column: &str) -> bool {
    let lower = column.to_ascii_lowercase();
    let bare = lower.strip_prefix("props.").unwrap_or(&lower);
    bare == "ts" || bare == "timestamp" || NUMERIC_NAME_HINTS.iter().any(|hint| bare.contains(hint))
}

/// Ordered index for numeric columns (`ts` and numeric-looking props).
/// Built by collecting `(value, row_pos)` pairs in ascending value order;
/// null and non-numeric values are skipped.
#[derive(Clone, Debug)]
pub struct BTreeIndex {
    table: String,
    column: String,
    segment_id: u64,
    entries: Vec<(f64, u32)>,
}

impl BTreeIndex {
    pub fn build(table: &str, column: &str, segment_id: u64, rows: &[RowView]) -> Self {
        let mut entries: Vec<(f64, u32)> = rows
            .iter()
            .enumerate()
            .filter_map(|(pos, row)| row.column(column).as_f64().map(|v| (v, pos as u32)))
            .collect();
        entries.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        Self {
            table: table.to_string(),
            column: column.to_string(),
            segment_id,
            entries,
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

    /// Scans entries whose value lies in the requested open/closed
    /// interval. `entries` is sorted by value, so the admissible range is
    /// a contiguous slice found by binary search.
    pub fn lookup_range(&self, lo: f64, include_lo: bool, hi: f64, include_hi: bool) -> RowPositions {
        let start = self.entries.partition_point(|(v, _)| {
            if include_lo {
                *v < lo
            } else {
                *v <= lo
            }
        });
        let mut out = RowPositions::new();
        for (v, pos) in &self.entries[start..] {
            let above_hi = if include_hi { *v > hi } else { *v >= hi };
            if above_hi {
                break;
            }
            out.add(*pos);
        }
        out
    }

    /// Equals maps onto a closed range lookup `[v, v]`.
    pub fn lookup_equals(&self, value: f64) -> RowPositions {
        self.lookup_range(value, true, value, true)
    }

    /// Rejects non-numeric equality probes outright; numeric equals are
    /// unioned per value.
    pub fn lookup_in(&self, values: &[f64]) -> RowPositions {
        let sets: Vec<RowPositions> = values.iter().map(|v| self.lookup_equals(*v)).collect();
        RowPositions::union_all(sets.iter())
    }

    /// Parses a textual probe value as `f64`; non-numeric equals are a
    /// caller error for a BTree index (`spec.md` §4.7).
    pub fn parse_probe(value: &str) -> Result<f64, IndexError> {
        value.trim().parse::<f64>().map_err(|_| IndexError::NonNumericProbe {
            value: value.to_string(),
        })
    }

    pub fn memory_bytes(&self) -> usize {
        self.entries.len() * std::mem::size_of::<(f64, u32)>()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
