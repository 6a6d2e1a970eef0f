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

use strataq_sql::{SelectItem, SelectStmt};
use thiserror::Error;

use crate::observer::PredicateObserver;
use crate::plan::{AggSpec, AggregateNode, PhysicalPlan, ProjectNode, ProjectSpec, ScanNode};
use crate::pushdown::{collect_predicate_columns, extract_range, strip_time_predicates};

/// A hard-coded selectivity estimate the planner attaches to every
/// predicate it observes. The engine has no real selectivity signal until
/// a query actually executes, so — in the spirit of the source's own
/// hard-coded `record_query_usage` estimate (see `DESIGN.md`) — planning
/// time observations use this single constant rather than inventing a
/// cardinality model.
const PLANNING_TIME_SELECTIVITY_ESTIMATE: f64 = 0.1;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("statement must be a SELECT")]
    NotASelect,
    #[error("select list must not be empty")]
    EmptySelectList,
    #[error("table name must not be empty")]
    EmptyTable,
    #[error("aggregate function used without a GROUP BY clause")]
    AggregateWithoutGroupBy,
    #[error("GROUP BY present without any aggregate in the select list")]
    GroupByWithoutAggregate,
}

/// Optional hint accompanying a request (`QueryService.execute`'s
/// `request.limit_hint`): the effective limit is `min(sql_limit,
/// limit_hint)`, using whichever is present.
pub fn resolve_limit(sql_limit: Option<u64>, limit_hint: Option<u64>) -> Option<u64> {
    match (sql_limit, limit_hint) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Converts `stmt` into a [`PhysicalPlan`], validating the aggregate/
/// group-by pairing invariants and extracting the time-range pushdown.
/// Every predicate the planner sees is forwarded to `observer` so the
/// adaptive index policy can learn from recent workload.
pub fn plan(
    stmt: &SelectStmt,
    limit_hint: Option<u64>,
    observer: &dyn PredicateObserver,
) -> Result<PhysicalPlan, PlanError> {
    if stmt.select_list.is_empty() {
        return Err(PlanError::EmptySelectList);
    }
    if stmt.table.trim().is_empty() {
        return Err(PlanError::EmptyTable);
    }

    let has_aggregate = stmt
        .select_list
        .iter()
        .any(|item| matches!(item, SelectItem::Aggregate { .. }));
    let has_group_by = !stmt.group_by.is_empty();

    if has_aggregate && !has_group_by {
        return Err(PlanError::AggregateWithoutGroupBy);
    }
    if has_group_by && !has_aggregate {
        return Err(PlanError::GroupByWithoutAggregate);
    }

    if let Some(selection) = &stmt.selection {
        for (column, is_range) in collect_predicate_columns(selection) {
            observer.observe(&stmt.table, &column, is_range, PLANNING_TIME_SELECTIVITY_ESTIMATE);
        }
    }

    let (from_ts, to_ts) = stmt
        .selection
        .as_ref()
        .and_then(extract_range)
        .unwrap_or((i64::MIN, i64::MAX));
    let residual = stmt.selection.as_ref().and_then(strip_time_predicates);

    let scan = ScanNode {
        table: stmt.table.clone(),
        from_ts,
        to_ts,
        residual,
    };

    let aggregate = if has_aggregate {
        let aggregates = stmt
            .select_list
            .iter()
            .filter_map(|item| match item {
                SelectItem::Aggregate { call, alias } => Some(AggSpec {
                    call: call.clone(),
                    alias: alias.clone().unwrap_or_else(|| call.default_alias()),
                }),
                _ => None,
            })
            .collect();
        Some(AggregateNode {
            group_by: stmt.group_by.clone(),
            aggregates,
        })
    } else {
        None
    };

    let specs = stmt
        .select_list
        .iter()
        .map(|item| match item {
            SelectItem::Wildcard => ProjectSpec::Wildcard,
            SelectItem::Column { name, alias } => ProjectSpec::Column {
                name: name.clone(),
                alias: alias.clone().unwrap_or_else(|| name.clone()),
            },
            SelectItem::Aggregate { call, alias } => ProjectSpec::Column {
                name: alias.clone().unwrap_or_else(|| call.default_alias()),
                alias: alias.clone().unwrap_or_else(|| call.default_alias()),
            },
        })
        .collect();

    let limit = resolve_limit(stmt.limit, limit_hint);

    Ok(PhysicalPlan {
        scan,
        aggregate,
        project: ProjectNode { specs },
        order_by: stmt.order_by.clone(),
        limit,
    })
}
