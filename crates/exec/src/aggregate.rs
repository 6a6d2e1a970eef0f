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

//! `Aggregate(group_by, aggregates)` (`spec.md` §4.5).

use std::cmp::Ordering;
use std::collections::HashMap;

use strataq_common::Value;
use strataq_planner::{AggSpec, AggregateNode};
use strataq_sql::{AggArg, AggFunc};

use crate::context::ExecContext;
use crate::error::ExecError;

/// Per-group, per-aggregate running state.
#[derive(Clone, Debug, Default)]
struct Accumulator {
    count_all: u64,
    count_col: u64,
    sum: f64,
    numeric_count: u64,
    min: Option<Value>,
    max: Option<Value>,
}

/// Group-by keys are joined into one string with a null sentinel distinct
/// from any possible textual value, so that a row with a null key column
/// forms its own group rather than colliding with an empty string
/// (`spec.md` §4.5 "nulls represented as a sentinel token").
fn group_key_repr(key: &[Value]) -> String {
    key.iter()
        .map(|v| match v {
            Value::Null => "\u{0}".to_string(),
            other => format!("\u{1}{}", other.as_text()),
        })
        .collect::<Vec<_>>()
        .join("\u{2}")
}

fn accumulate(acc: &mut Accumulator, spec: &AggSpec, raw: &strataq_storage::RowView) {
    match (&spec.call.func, &spec.call.arg) {
        (AggFunc::Count, AggArg::Star) => acc.count_all += 1,
        (AggFunc::Count, AggArg::Column(col)) => {
            if !raw.column(col).is_null() {
                acc.count_col += 1;
            }
        }
        (AggFunc::Sum, AggArg::Column(col)) | (AggFunc::Avg, AggArg::Column(col)) => {
            if let Some(v) = raw.column(col).as_f64() {
                acc.sum += v;
                acc.numeric_count += 1;
            }
        }
        (AggFunc::Min, AggArg::Column(col)) => {
            let v = raw.column(col);
            if !v.is_null() {
                acc.min = Some(match &acc.min {
                    Some(cur) if cur.compare(&v) != Ordering::Greater => cur.clone(),
                    _ => v,
                });
            }
        }
        (AggFunc::Max, AggArg::Column(col)) => {
            let v = raw.column(col);
            if !v.is_null() {
                acc.max = Some(match &acc.max {
                    Some(cur) if cur.compare(&v) != Ordering::Less => cur.clone(),
                    _ => v,
                });
            }
        }
        // The grammar only ever pairs COUNT with `Star`; SUM/AVG/MIN/MAX
        // always carry a `Column` arg (`spec.md` §4.3).
        (AggFunc::Sum | AggFunc::Avg | AggFunc::Min | AggFunc::Max, AggArg::Star) => {}
    }
}

fn finalize(spec: &AggSpec, acc: &Accumulator) -> Value {
    match spec.call.func {
        AggFunc::Count => match spec.call.arg {
            AggArg::Star => Value::Int(acc.count_all as i64),
            AggArg::Column(_) => Value::Int(acc.count_col as i64),
        },
        AggFunc::Sum => Value::Float(acc.sum),
        AggFunc::Avg => {
            if acc.numeric_count == 0 {
                Value::Null
            } else {
                Value::Float(acc.sum / acc.numeric_count as f64)
            }
        }
        AggFunc::Min => acc.min.clone().unwrap_or(Value::Null),
        AggFunc::Max => acc.max.clone().unwrap_or(Value::Null),
    }
}

/// Partitions `ctx.raw_rows` into groups keyed by the group-by column
/// values and finalizes one accumulator per aggregate spec per group.
/// Group emission order is unspecified (`spec.md` §4.5) — this emits
/// first-seen order, which callers relying on a specific order must
/// override with `ORDER BY`.
pub fn execute(node: &AggregateNode, ctx: ExecContext) -> Result<ExecContext, ExecError> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, (Vec<Value>, Vec<Accumulator>)> = HashMap::new();

    for raw in &ctx.raw_rows {
        let key: Vec<Value> = node.group_by.iter().map(|c| raw.column(c)).collect();
        let key_repr = group_key_repr(&key);
        if !groups.contains_key(&key_repr) {
            order.push(key_repr.clone());
            groups.insert(key_repr.clone(), (key, vec![Accumulator::default(); node.aggregates.len()]));
        }
        let (_, accs) = groups.get_mut(&key_repr).expect("just inserted");
        for (i, spec) in node.aggregates.iter().enumerate() {
            accumulate(&mut accs[i], spec, raw);
        }
    }

    let mut columns = node.group_by.clone();
    for spec in &node.aggregates {
        columns.push(spec.alias.clone());
    }

    let rows = order
        .iter()
        .map(|key_repr| {
            let (group_values, accs) = &groups[key_repr];
            let mut out_row = group_values.clone();
            for (spec, acc) in node.aggregates.iter().zip(accs.iter()) {
                out_row.push(finalize(spec, acc));
            }
            out_row
        })
        .collect();

    Ok(ExecContext {
        columns,
        rows,
        raw_rows: Vec::new(),
        scanned: ctx.scanned,
        matched: ctx.matched,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;
    use std::sync::Arc;
    use strataq_sql::AggCall;
    use strataq_storage::{Event, RowView};

    fn row(user_id: &str, price: &str) -> RowView {
        let mut props = Map::new();
        props.insert("price".to_string(), price.to_string());
        RowView::new(Arc::new(Event {
            ts: 0,
            table: "events".into(),
            user_id: Some(user_id.to_string()),
            event: "click".into(),
            props,
        }))
    }

    fn ctx_with(rows: Vec<RowView>) -> ExecContext {
        ExecContext {
            columns: vec![],
            rows: vec![],
            raw_rows: rows,
            scanned: 4,
            matched: 4,
        }
    }

    #[test]
    fn count_star_and_sum_avg_group_by_user() {
        let node = AggregateNode {
            group_by: vec!["userId".to_string()],
            aggregates: vec![
                AggSpec {
                    call: AggCall { func: AggFunc::Count, arg: AggArg::Star },
                    alias: "c".to_string(),
                },
                AggSpec {
                    call: AggCall { func: AggFunc::Sum, arg: AggArg::Column("price".to_string()) },
                    alias: "s".to_string(),
                },
                AggSpec {
                    call: AggCall { func: AggFunc::Avg, arg: AggArg::Column("price".to_string()) },
                    alias: "a".to_string(),
                },
            ],
        };
        let ctx = ctx_with(vec![row("u1", "10"), row("u1", "20"), row("u2", "5")]);
        let out = execute(&node, ctx).unwrap();
        assert_eq!(out.columns, vec!["userId", "c", "s", "a"]);
        assert_eq!(out.rows.len(), 2);
        let u1 = out.rows.iter().find(|r| r[0] == Value::Str("u1".into())).unwrap();
        assert_eq!(u1[1], Value::Int(2));
        assert_eq!(u1[2], Value::Float(30.0));
        assert_eq!(u1[3], Value::Float(15.0));
    }

    #[test]
    fn avg_with_no_numeric_values_is_null() {
        let node = AggregateNode {
            group_by: vec!["userId".to_string()],
            aggregates: vec![AggSpec {
                call: AggCall { func: AggFunc::Avg, arg: AggArg::Column("price".to_string()) },
                alias: "a".to_string(),
            }],
        };
        let mut props = Map::new();
        props.insert("price".to_string(), "not-a-number".to_string());
        let r = RowView::new(Arc::new(Event {
            ts: 0,
            table: "events".into(),
            user_id: Some("u1".into()),
            event: "click".into(),
            props,
        }));
        let out = execute(&node, ctx_with(vec![r])).unwrap();
        assert_eq!(out.rows[0][1], Value::Null);
    }

    #[test]
    fn null_group_keys_form_their_own_group() {
        let node = AggregateNode {
            group_by: vec!["missing".to_string()],
            aggregates: vec![AggSpec {
                call: AggCall { func: AggFunc::Count, arg: AggArg::Star },
                alias: "c".to_string(),
            }],
        };
        let out = execute(&node, ctx_with(vec![row("u1", "1"), row("u2", "2")])).unwrap();
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0][0], Value::Null);
        assert_eq!(out.rows[0][1], Value::Int(2));
    }
}
