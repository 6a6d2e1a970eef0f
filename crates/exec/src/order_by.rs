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

//! `OrderBy(items)` (`spec.md` §4.5): stable sort by the listed items in
//! order, `ASC` by default, falling through to the next item on ties and
//! preserving scan order past the last item.

use std::cmp::Ordering;

use strataq_sql::OrderItem;

use crate::context::ExecContext;

pub fn execute(items: &[OrderItem], mut ctx: ExecContext) -> ExecContext {
    let positions: Vec<(usize, bool)> = items
        .iter()
        .filter_map(|item| {
            ctx.columns
                .iter()
                .position(|c| c.eq_ignore_ascii_case(&item.column))
                .map(|idx| (idx, item.desc))
        })
        .collect();

    // `Vec::sort_by` is a stable sort, so ties fall through to original
    // (scan) order automatically once every listed item compares equal.
    ctx.rows.sort_by(|a, b| {
        for &(idx, desc) in &positions {
            let cmp = a[idx].compare(&b[idx]);
            let cmp = if desc { cmp.reverse() } else { cmp };
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    });
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use strataq_common::Value;

    fn ctx(rows: Vec<Vec<Value>>) -> ExecContext {
        ExecContext {
            columns: vec!["ts".into(), "event".into()],
            rows,
            raw_rows: vec![],
            scanned: 0,
            matched: 0,
        }
    }

    #[test]
    fn ascending_is_default() {
        let out = execute(
            &[OrderItem { column: "ts".into(), desc: false }],
            ctx(vec![
                vec![Value::Int(300), Value::Str("c".into())],
                vec![Value::Int(100), Value::Str("a".into())],
                vec![Value::Int(200), Value::Str("b".into())],
            ]),
        );
        let tss: Vec<_> = out.rows.iter().map(|r| r[0].clone()).collect();
        assert_eq!(tss, vec![Value::Int(100), Value::Int(200), Value::Int(300)]);
    }

    #[test]
    fn descending_reverses() {
        let out = execute(
            &[OrderItem { column: "ts".into(), desc: true }],
            ctx(vec![vec![Value::Int(100), Value::Str("a".into())], vec![Value::Int(300), Value::Str("c".into())]]),
        );
        assert_eq!(out.rows[0][0], Value::Int(300));
    }

    #[test]
    fn ties_preserve_scan_order() {
        let out = execute(
            &[OrderItem { column: "ts".into(), desc: false }],
            ctx(vec![
                vec![Value::Int(100), Value::Str("first".into())],
                vec![Value::Int(100), Value::Str("second".into())],
            ]),
        );
        assert_eq!(out.rows[0][1], Value::Str("first".into()));
        assert_eq!(out.rows[1][1], Value::Str("second".into()));
    }
}
