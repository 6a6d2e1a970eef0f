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

//! Adapts `strataq_index::IndexManager` to `strataq_exec::IndexProbe`, the
//! seam the two crates' own doc comments describe but leave for a caller
//! that can see both to wire together — here, the root crate.

use std::sync::Arc;

use strataq_exec::{IndexProbe, ProbeMatch, ProbeQuery, ProbeResult};
use strataq_index::{IndexManager, IndexQuery};

pub struct IndexManagerProbe {
    manager: Arc<IndexManager>,
}

impl IndexManagerProbe {
    pub fn new(manager: Arc<IndexManager>) -> Self {
        Self { manager }
    }
}

fn to_index_query(query: &ProbeQuery) -> IndexQuery {
    match query {
        ProbeQuery::Equals(v) => IndexQuery::Equals(v.clone()),
        ProbeQuery::In(vs) => IndexQuery::In(vs.clone()),
        ProbeQuery::Range { lo, include_lo, hi, include_hi } => IndexQuery::Range {
            lo: lo.clone(),
            include_lo: *include_lo,
            hi: hi.clone(),
            include_hi: *include_hi,
        },
    }
}

impl IndexProbe for IndexManagerProbe {
    fn probe(&self, table: &str, column: &str, query: &ProbeQuery) -> ProbeResult {
        let result = self.manager.lookup(table, column, &to_index_query(query));
        ProbeResult {
            matches: result
                .matches
                .into_iter()
                .map(|(segment_id, positions)| ProbeMatch {
                    segment_id,
                    positions: positions.iter().collect(),
                })
                .collect(),
            exact: result.exact,
        }
    }

    fn record_usage(&self, table: &str, column: &str) {
        self.manager.record_query_usage(table, column);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strataq_common::config::IndexConfig;
    use strataq_common::Value;

    #[test]
    fn unknown_index_probes_empty_and_inexact() {
        let manager = IndexManager::new(IndexConfig::default());
        let probe = IndexManagerProbe::new(manager);
        let result = probe.probe("events", "region", &ProbeQuery::Equals(Value::from("us")));
        assert!(result.matches.is_empty());
        assert!(!result.exact);
    }
}
