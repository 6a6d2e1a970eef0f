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

//! Per-`(table, column, segment)` secondary index. Modeled as a tagged
//! variant over the two index kinds (`spec.md` "Design Notes": "model each
//! as a tagged variant... a dispatch function selects behavior") rather
//! than a trait-object hierarchy.

use strataq_common::Value;
use strataq_storage::RowView;

use crate::bitmap_index::BitmapIndex;
use crate::btree_index::{is_numeric_column, BTreeIndex};
use crate::error::IndexError;
use crate::row_set::RowPositions;

/// A lookup request dispatched to every segment's index for a `(table,
/// column)` pair (`spec.md` §4.11 `IndexManager::lookup`).
#[derive(Clone, Debug, PartialEq)]
pub enum IndexQuery {
    Equals(Value),
    In(Vec<Value>),
    Range {
        lo: Value,
        include_lo: bool,
        hi: Value,
        include_hi: bool,
    },
}

#[derive(Clone, Debug)]
pub enum SecondaryIndex {
    Bitmap(BitmapIndex),
    BTree(BTreeIndex),
}

impl SecondaryIndex {
    /// Builds the appropriate variant for `column`: `BTree` for `ts` or a
    /// numeric-looking property name, `Bitmap` otherwise.
    pub fn build(table: &str, column: &str, segment_id: u64, rows: &[RowView]) -> Self {
        if is_numeric_column(column) {
            SecondaryIndex::BTree(BTreeIndex::build(table, column, segment_id, rows))
        } else {
            SecondaryIndex::Bitmap(BitmapIndex::build(table, column, segment_id, rows))
        }
    }

    pub fn table(&self) -> &str {
        match self {
            SecondaryIndex::Bitmap(b) => b.table(),
            SecondaryIndex::BTree(b) => b.table(),
        }
    }

    pub fn column(&self) -> &str {
        match self {
            SecondaryIndex::Bitmap(b) => b.column(),
            SecondaryIndex::BTree(b) => b.column(),
        }
    }

    pub fn segment_id(&self) -> u64 {
        match self {
            SecondaryIndex::Bitmap(b) => b.segment_id(),
            SecondaryIndex::BTree(b) => b.segment_id(),
        }
    }

    pub fn memory_bytes(&self) -> usize {
        match self {
            SecondaryIndex::Bitmap(b) => b.memory_bytes(),
            SecondaryIndex::BTree(b) => b.memory_bytes(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            SecondaryIndex::Bitmap(_) => "bitmap",
            SecondaryIndex::BTree(_) => "btree",
        }
    }

    /// Dispatches `query` to this index's variant-specific lookup.
    pub fn lookup(&self, query: &IndexQuery) -> Result<RowPositions, IndexError> {
        match self {
            SecondaryIndex::Bitmap(b) => match query {
                IndexQuery::Equals(v) => Ok(b.lookup_equals(&v.as_text())),
                IndexQuery::In(vs) => {
                    let texts: Vec<String> = vs.iter().map(Value::as_text).collect();
                    Ok(b.lookup_in(&texts))
                }
                IndexQuery::Range { lo, hi, include_lo, include_hi } => {
                    b.lookup_range(&lo.as_text(), *include_lo, &hi.as_text(), *include_hi)
                }
            },
            SecondaryIndex::BTree(b) => match query {
                IndexQuery::Equals(v) => {
                    let parsed = BTreeIndex::parse_probe(&v.as_text())?;
                    Ok(b.lookup_equals(parsed))
                }
                IndexQuery::In(vs) => {
                    let parsed: Result<Vec<f64>, IndexError> =
                        vs.iter().map(|v| BTreeIndex::parse_probe(&v.as_text())).collect();
                    Ok(b.lookup_in(&parsed?))
                }
                IndexQuery::Range { lo, hi, include_lo, include_hi } => {
                    let lo = BTreeIndex::parse_probe(&lo.as_text())?;
                    let hi = BTreeIndex::parse_probe(&hi.as_text())?;
                    Ok(b.lookup_range(lo, *include_lo, hi, *include_hi))
                }
            },
        }
    }
}
