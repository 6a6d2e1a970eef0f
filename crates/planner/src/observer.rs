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

/// Sink for the predicates the planner sees while building a physical
/// plan, implemented by `strataq_index`'s `IndexManager` so the adaptive
/// policy can learn from recent workload without the planner depending on
/// the index crate.
pub trait PredicateObserver {
    fn observe(&self, table: &str, column: &str, is_range: bool, selectivity: f64);
}

/// No-op observer for planning calls that don't care about the adaptive
/// feedback loop (e.g. `validate_sql`, `explain`).
pub struct NullObserver;

impl PredicateObserver for NullObserver {
    fn observe(&self, _table: &str, _column: &str, _is_range: bool, _selectivity: f64) {}
}
