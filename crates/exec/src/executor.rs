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

//! Runs the pipeline `Scan -> [Aggregate] -> Project -> [OrderBy] ->
//! [Limit]` (`spec.md` §2, §4.5). Operators are modeled as a tagged
//! variant with a dispatch function selecting behavior, the same pattern
//! `strataq_index::SecondaryIndex` uses for its two index kinds
//! (`spec.md` "Design Notes": "model each as a tagged variant... a
//! dispatch function selects behavior").

use std::time::Instant;

use strataq_planner::{AggregateNode, PhysicalPlan, ProjectNode, ScanNode};
use strataq_sql::OrderItem;
use strataq_storage::ColumnStore;

use crate::context::ExecContext;
use crate::error::ExecError;
use crate::index_probe::IndexProbe;
use crate::query_result::QueryResult;
use crate::{aggregate, limit, order_by, project, scan};

enum Operator {
    Scan(ScanNode),
    Aggregate(AggregateNode),
    Project(ProjectNode),
    OrderBy(Vec<OrderItem>),
    Limit(u64),
}

fn build_pipeline(plan: &PhysicalPlan) -> Vec<Operator> {
    let mut ops = vec![Operator::Scan(plan.scan.clone())];
    if let Some(agg) = &plan.aggregate {
        ops.push(Operator::Aggregate(agg.clone()));
    }
    ops.push(Operator::Project(plan.project.clone()));
    if !plan.order_by.is_empty() {
        ops.push(Operator::OrderBy(plan.order_by.clone()));
    }
    if let Some(n) = plan.limit {
        ops.push(Operator::Limit(n));
    }
    ops
}

fn apply(op: &Operator, ctx: ExecContext, store: &ColumnStore, probe: Option<&dyn IndexProbe>) -> Result<ExecContext, ExecError> {
    match op {
        Operator::Scan(node) => scan::execute(node, store, probe),
        Operator::Aggregate(node) => aggregate::execute(node, ctx),
        Operator::Project(node) => project::execute(node, ctx),
        Operator::OrderBy(items) => Ok(order_by::execute(items, ctx)),
        Operator::Limit(n) => Ok(limit::execute(*n, ctx)),
    }
}

/// Executes `plan` against `store`, optionally accelerating `Scan` with
/// `probe`. Mirrors `strataq_planner::plan`'s `observer` parameter shape:
/// pass `None` for a literal, unaccelerated scan.
pub fn execute(plan: &PhysicalPlan, store: &ColumnStore, probe: Option<&dyn IndexProbe>) -> Result<QueryResult, ExecError> {
    let start = Instant::now();
    let mut ctx = ExecContext::empty();
    for op in build_pipeline(plan) {
        ctx = apply(&op, ctx, store, probe)?;
    }
    Ok(QueryResult {
        columns: ctx.columns,
        rows: ctx.rows,
        scanned_rows: ctx.scanned,
        matched_rows: ctx.matched,
        elapsed_millis: start.elapsed().as_millis() as u64,
    })
}
