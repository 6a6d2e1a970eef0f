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

//! The seam through which `Scan` may "optionally probe IndexManager for
//! candidate row sets" (`spec.md` §2), without `strataq_exec` depending on
//! `strataq_index` — mirrored on `strataq_planner::PredicateObserver`, which
//! decouples the planner from the index crate the same way.

use strataq_common::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum ProbeQuery {
    Equals(Value),
    In(Vec<Value>),
    Range {
        lo: Value,
        include_lo: bool,
        hi: Value,
        include_hi: bool,
    },
}

/// One segment's worth of matching segment-local row positions.
#[derive(Clone, Debug, PartialEq)]
pub struct ProbeMatch {
    pub segment_id: u64,
    pub positions: Vec<u32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProbeResult {
    pub matches: Vec<ProbeMatch>,
    /// True iff every segment of the table was covered by an index for
    /// this column, i.e. the result needs no residual scan fallback.
    pub exact: bool,
}

/// Implemented by `strataq_index::IndexManager` in the root crate.
pub trait IndexProbe: Send + Sync {
    fn probe(&self, table: &str, column: &str, query: &ProbeQuery) -> ProbeResult;
    fn record_usage(&self, table: &str, column: &str);
}

/// No-op probe for callers that want a literal, unaccelerated scan.
pub struct NullProbe;

impl IndexProbe for NullProbe {
    fn probe(&self, _table: &str, _column: &str, _query: &ProbeQuery) -> ProbeResult {
        ProbeResult::default()
    }

    fn record_usage(&self, _table: &str, _column: &str) {}
}
