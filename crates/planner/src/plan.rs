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

use strataq_sql::{AggCall, Expr, OrderItem};

/// `Scan(table, from_ts, to_ts, residual_predicate)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScanNode {
    pub table: String,
    pub from_ts: i64,
    pub to_ts: i64,
    pub residual: Option<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AggSpec {
    pub call: AggCall,
    pub alias: String,
}

/// `Aggregate(group_by, aggregates)` — present iff group-by + aggregates.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateNode {
    pub group_by: Vec<String>,
    pub aggregates: Vec<AggSpec>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProjectSpec {
    Wildcard,
    Column { name: String, alias: String },
}

/// `Project(specs)` — always present; materializes the final column set.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectNode {
    pub specs: Vec<ProjectSpec>,
}

/// The ordered operator pipeline: `Scan -> [Aggregate] -> Project ->
/// [OrderBy] -> [Limit]`.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicalPlan {
    pub scan: ScanNode,
    pub aggregate: Option<AggregateNode>,
    pub project: ProjectNode,
    /// Present iff `ORDER BY` is non-empty.
    pub order_by: Vec<OrderItem>,
    /// Present iff a limit applies (`SQL LIMIT` narrowed by `limit_hint`).
    pub limit: Option<u64>,
}
