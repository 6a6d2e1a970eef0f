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

use strataq_common::Value;
use strataq_storage::RowView;

/// The mutable state threaded through the operator pipeline: the current
/// column list, the materialized value rows, a parallel list of raw row
/// views (consulted only by `Aggregate`, empty after it runs), and the
/// running `scanned`/`matched` counters (`spec.md` §4.5).
#[derive(Debug, Default)]
pub struct ExecContext {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    pub raw_rows: Vec<RowView>,
    pub scanned: u64,
    pub matched: u64,
}

impl ExecContext {
    pub fn empty() -> Self {
        Self::default()
    }
}
