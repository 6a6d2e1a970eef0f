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

use strataq_sql::{CmpOp, Expr, Literal};

fn is_time_column(expr: &Expr) -> bool {
    matches!(expr, Expr::Column(c) if c.eq_ignore_ascii_case("ts") || c.eq_ignore_ascii_case("timestamp"))
}

fn literal_as_i64(lit: &Literal) -> Option<i64> {
    match lit {
        Literal::Int(i) => Some(*i),
        Literal::Float(f) => Some(*f as i64),
        Literal::Str(s) => s.trim().parse::<i64>().ok(),
    }
}

fn as_literal(expr: &Expr) -> Option<&Literal> {
    match expr {
        Expr::Literal(l) => Some(l),
        _ => None,
    }
}

fn range_of_leaf(expr: &Expr) -> Option<(i64, i64)> {
    match expr {
        Expr::Between { expr: target, low, high } if is_time_column(target) => {
            let lo = as_literal(low).and_then(literal_as_i64)?;
            let hi = as_literal(high).and_then(literal_as_i64)?;
            Some((lo, hi))
        }
        Expr::Cmp { op, left, right } => {
            let (ts_on_left, literal) = if is_time_column(left) {
                (true, as_literal(right)?)
            } else if is_time_column(right) {
                (false, as_literal(left)?)
            } else {
                return None;
            };
            let v = literal_as_i64(literal)?;
            let effective_op = if ts_on_left { *op } else { op.flip() };
            Some(match effective_op {
                CmpOp::Ge => (v, i64::MAX),
                CmpOp::Gt => (v.saturating_add(1), i64::MAX),
                CmpOp::Le => (i64::MIN, v),
                CmpOp::Lt => (i64::MIN, v.saturating_sub(1)),
                CmpOp::Eq => (v, v),
                CmpOp::Ne => return None,
            })
        }
        _ => None,
    }
}

/// Jointly computes the pushed-down time range and the residual predicate
/// that compensates for exactly what was pushed. `Or` nodes abandon
/// pushdown for their whole subtree — including leaving their children
/// completely unstripped in the residual, since nothing from them was
/// actually pushed into the scan's time bounds.
fn push_down(expr: &Expr) -> (Option<(i64, i64)>, Option<Expr>) {
    match expr {
        Expr::And(l, r) => {
            let (range_l, resid_l) = push_down(l);
            let (range_r, resid_r) = push_down(r);
            let range = match (range_l, range_r) {
                (None, None) => None,
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (Some((a_lo, a_hi)), Some((b_lo, b_hi))) => Some((a_lo.max(b_lo), a_hi.min(b_hi))),
            };
            let residual = combine(Expr::And, resid_l, resid_r);
            (range, residual)
        }
        Expr::Or(_, _) => (None, Some(expr.clone())),
        other => {
            if let Some(range) = range_of_leaf(other) {
                (Some(range), None)
            } else {
                (None, Some(other.clone()))
            }
        }
    }
}

fn combine(
    ctor: impl FnOnce(Box<Expr>, Box<Expr>) -> Expr,
    left: Option<Expr>,
    right: Option<Expr>,
) -> Option<Expr> {
    match (left, right) {
        (None, None) => None,
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (Some(a), Some(b)) => Some(ctor(Box::new(a), Box::new(b))),
    }
}

/// Extracts an inclusive `[lo, hi]` time range pushdown from a WHERE tree.
/// Under `AND`, ranges from both sides intersect; under `OR` the pushdown
/// abandons for that subtree (returns `None`).
pub fn extract_range(expr: &Expr) -> Option<(i64, i64)> {
    push_down(expr).0
}

/// The residual WHERE left after removing every predicate that was
/// incorporated into [`extract_range`]'s pushed-down time bounds.
pub fn strip_time_predicates(expr: &Expr) -> Option<Expr> {
    push_down(expr).1
}

/// Every (column, is_range) predicate the planner observed while building
/// this WHERE tree, for forwarding to the adaptive index policy.
pub fn collect_predicate_columns(expr: &Expr) -> Vec<(String, bool)> {
    let mut out = Vec::new();
    walk(expr, &mut out);
    out
}

fn column_of(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Column(c) => Some(c.clone()),
        _ => None,
    }
}

fn walk(expr: &Expr, out: &mut Vec<(String, bool)>) {
    match expr {
        Expr::And(l, r) | Expr::Or(l, r) => {
            walk(l, out);
            walk(r, out);
        }
        Expr::Cmp { op, left, right } => {
            let is_range = !matches!(op, CmpOp::Eq | CmpOp::Ne);
            if let Some(col) = column_of(left).or_else(|| column_of(right)) {
                out.push((col, is_range));
            }
        }
        Expr::In { expr: target, .. } => {
            if let Some(col) = column_of(target) {
                out.push((col, false));
            }
        }
        Expr::Between { expr: target, .. } => {
            if let Some(col) = column_of(target) {
                out.push((col, true));
            }
        }
        Expr::Like { expr: target, .. } => {
            if let Some(col) = column_of(target) {
                out.push((col, false));
            }
        }
        Expr::Column(_) | Expr::Literal(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strataq_sql::parse;

    fn where_expr(sql: &str) -> Expr {
        parse(sql).unwrap().selection.unwrap()
    }

    #[test]
    fn between_on_ts_pushes_down() {
        let e = where_expr("SELECT * FROM t WHERE ts BETWEEN 1500 AND 3500");
        assert_eq!(extract_range(&e), Some((1500, 3500)));
        assert_eq!(strip_time_predicates(&e), None);
    }

    #[test]
    fn flipped_comparison_pushes_down() {
        let e = where_expr("SELECT * FROM t WHERE 100 <= ts");
        assert_eq!(extract_range(&e), Some((100, i64::MAX)));
    }

    #[test]
    fn and_intersects_ranges() {
        let e = where_expr("SELECT * FROM t WHERE ts >= 100 AND ts <= 200");
        assert_eq!(extract_range(&e), Some((100, 200)));
        assert_eq!(strip_time_predicates(&e), None);
    }

    #[test]
    fn or_abandons_pushdown_and_keeps_residual_whole() {
        let e = where_expr("SELECT * FROM t WHERE ts > 100 OR event = 'x'");
        assert_eq!(extract_range(&e), None);
        assert_eq!(strip_time_predicates(&e), Some(e.clone()));
    }

    #[test]
    fn residual_preserves_non_time_predicates_under_and() {
        let e = where_expr("SELECT * FROM t WHERE ts >= 100 AND region = 'us'");
        let residual = strip_time_predicates(&e).unwrap();
        assert_eq!(
            residual,
            Expr::Cmp {
                op: CmpOp::Eq,
                left: Box::new(Expr::Column("region".to_string())),
                right: Box::new(Expr::Literal(Literal::Str("us".to_string()))),
            }
        );
    }
}
