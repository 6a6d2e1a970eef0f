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

//! `Scan(table, from_ts, to_ts, residual)` (`spec.md` §4.5).
//!
//! The literal contract scans with a nil filter and applies the residual
//! row by row. When an [`IndexProbe`] is available and the residual's
//! top-level `AND` conjuncts contain an equality/`IN`/`BETWEEN` predicate
//! on a non-time column that the probe can answer exactly, this narrows
//! the scan to the matching segment-local positions first — the "Executor
//! ... optionally probes IndexManager for candidate row sets" of `spec.md`
//! §2. The residual is still applied in full afterward, so results are
//! identical either way; only `scanned_rows` reflects how many rows were
//! actually examined.

use strataq_common::Value;
use strataq_storage::{ColumnStore, RowView};
use strataq_sql::{CmpOp, Expr, Literal};
use tracing::debug;

use crate::context::ExecContext;
use crate::error::ExecError;
use crate::index_probe::{IndexProbe, ProbeQuery};
use crate::predicate::{eval_bool, literal_to_value};
use strataq_planner::ScanNode;

fn is_time_column(expr: &Expr) -> bool {
    matches!(expr, Expr::Column(c) if c.eq_ignore_ascii_case("ts") || c.eq_ignore_ascii_case("timestamp"))
}

fn column_of(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::Column(c) => Some(c.as_str()),
        _ => None,
    }
}

fn flatten_and<'a>(expr: &'a Expr, out: &mut Vec<&'a Expr>) {
    match expr {
        Expr::And(l, r) => {
            flatten_and(l, out);
            flatten_and(r, out);
        }
        other => out.push(other),
    }
}

/// Finds the first top-level conjunct on a non-time column that resolves
/// to a probeable query.
fn extract_probe_query(residual: &Expr) -> Option<(String, ProbeQuery)> {
    let mut conjuncts = Vec::new();
    flatten_and(residual, &mut conjuncts);
    for expr in conjuncts {
        match expr {
            Expr::Cmp { op: CmpOp::Eq, left, right } => {
                let (column, literal) = if !is_time_column(left) && matches!(right.as_ref(), Expr::Literal(_)) {
                    (column_of(left)?, as_literal(right)?)
                } else if !is_time_column(right) && matches!(left.as_ref(), Expr::Literal(_)) {
                    (column_of(right)?, as_literal(left)?)
                } else {
                    continue;
                };
                return Some((column.to_string(), ProbeQuery::Equals(literal_to_value(literal))));
            }
            Expr::In { expr: target, list } => {
                if let Some(column) = column_of(target).filter(|c| !c.eq_ignore_ascii_case("ts") && !c.eq_ignore_ascii_case("timestamp")) {
                    let values = list.iter().map(literal_to_value).collect();
                    return Some((column.to_string(), ProbeQuery::In(values)));
                }
            }
            Expr::Between { expr: target, low, high } => {
                if let Some(column) = column_of(target).filter(|c| !c.eq_ignore_ascii_case("ts") && !c.eq_ignore_ascii_case("timestamp")) {
                    if let (Some(lo), Some(hi)) = (as_literal(low), as_literal(high)) {
                        return Some((
                            column.to_string(),
                            ProbeQuery::Range {
                                lo: literal_to_value(lo),
                                include_lo: true,
                                hi: literal_to_value(hi),
                                include_hi: true,
                            },
                        ));
                    }
                }
            }
            _ => {}
        }
    }
    None
}

fn as_literal(expr: &Expr) -> Option<&Literal> {
    match expr {
        Expr::Literal(l) => Some(l),
        _ => None,
    }
}

fn rows_for_scan(scan: &ScanNode, store: &ColumnStore, probe: Option<&dyn IndexProbe>) -> Vec<RowView> {
    let (probe, residual) = match (probe, &scan.residual) {
        (Some(p), Some(r)) => (p, r),
        _ => return store.scan(&scan.table, scan.from_ts, scan.to_ts, None),
    };
    let Some((column, query)) = extract_probe_query(residual) else {
        return store.scan(&scan.table, scan.from_ts, scan.to_ts, None);
    };

    let result = probe.probe(&scan.table, &column, &query);
    probe.record_usage(&scan.table, &column);
    if !result.exact || result.matches.is_empty() {
        return store.scan(&scan.table, scan.from_ts, scan.to_ts, None);
    }

    debug!(table = %scan.table, column = %column, "index-accelerated scan");
    result
        .matches
        .iter()
        .flat_map(|m| store.scan_positions(&scan.table, m.segment_id, m.positions.clone(), scan.from_ts, scan.to_ts, None))
        .collect()
}

pub fn execute(scan: &ScanNode, store: &ColumnStore, probe: Option<&dyn IndexProbe>) -> Result<ExecContext, ExecError> {
    let rows = rows_for_scan(scan, store, probe);

    let mut ctx = ExecContext::empty();
    ctx.columns = RowView::base_columns().iter().map(|s| s.to_string()).collect();
    for row in rows {
        ctx.scanned += 1;
        let admitted = match &scan.residual {
            Some(expr) => eval_bool(expr, &row)?,
            None => true,
        };
        if admitted {
            ctx.matched += 1;
            ctx.rows.push(vec![
                Value::Int(row.ts()),
                Value::Str(row.table().to_string()),
                Value::from(row.user_id()),
                Value::Str(row.event_name().to_string()),
            ]);
            ctx.raw_rows.push(row);
        }
    }
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index_probe::{NullProbe, ProbeMatch};
    use strataq_storage::Event;

    fn store_with_seed() -> ColumnStore {
        let store = ColumnStore::new();
        store.append_batch(vec![
            Event::new("click").with_table("events").with_ts(1000).with_user_id("u1").with_prop("region", "us"),
            Event::new("purchase").with_table("events").with_ts(2000).with_user_id("u2").with_prop("region", "eu"),
        ]);
        store
    }

    #[test]
    fn scan_without_probe_counts_scanned_and_matched() {
        let store = store_with_seed();
        let scan = ScanNode {
            table: "events".into(),
            from_ts: i64::MIN,
            to_ts: i64::MAX,
            residual: Some(Expr::Cmp {
                op: CmpOp::Eq,
                left: Box::new(Expr::Column("userId".into())),
                right: Box::new(Expr::Literal(Literal::Str("u1".into()))),
            }),
        };
        let ctx = execute(&scan, &store, None).unwrap();
        assert_eq!(ctx.scanned, 2);
        assert_eq!(ctx.matched, 1);
        assert_eq!(ctx.columns, vec!["ts", "table", "userId", "event"]);
    }

    #[test]
    fn scan_falls_back_when_probe_is_inexact() {
        let store = store_with_seed();
        let scan = ScanNode {
            table: "events".into(),
            from_ts: i64::MIN,
            to_ts: i64::MAX,
            residual: Some(Expr::Cmp {
                op: CmpOp::Eq,
                left: Box::new(Expr::Column("region".into())),
                right: Box::new(Expr::Literal(Literal::Str("us".into()))),
            }),
        };
        let ctx = execute(&scan, &store, Some(&NullProbe)).unwrap();
        assert_eq!(ctx.scanned, 2);
        assert_eq!(ctx.matched, 1);
    }

    struct StubProbe;
    impl IndexProbe for StubProbe {
        fn probe(&self, _table: &str, _column: &str, _query: &ProbeQuery) -> crate::index_probe::ProbeResult {
            crate::index_probe::ProbeResult {
                matches: vec![ProbeMatch { segment_id: 1, positions: vec![0] }],
                exact: true,
            }
        }
        fn record_usage(&self, _table: &str, _column: &str) {}
    }

    #[test]
    fn exact_probe_narrows_to_positions() {
        let store = store_with_seed();
        let scan = ScanNode {
            table: "events".into(),
            from_ts: i64::MIN,
            to_ts: i64::MAX,
            residual: Some(Expr::Cmp {
                op: CmpOp::Eq,
                left: Box::new(Expr::Column("region".into())),
                right: Box::new(Expr::Literal(Literal::Str("us".into()))),
            }),
        };
        let ctx = execute(&scan, &store, Some(&StubProbe)).unwrap();
        assert_eq!(ctx.scanned, 1);
        assert_eq!(ctx.matched, 1);
    }
}
