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

//! Evaluates a `WHERE`-clause [`Expr`] against one [`RowView`] (`spec.md`
//! §4.5 "Predicate evaluation").

use std::cmp::Ordering;

use strataq_common::Value;
use strataq_storage::RowView;
use strataq_sql::{CmpOp, Expr, Literal};

use crate::error::ExecError;

pub(crate) fn literal_to_value(lit: &Literal) -> Value {
    match lit {
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::Str(s) => Value::Str(s.clone()),
    }
}

/// Resolves a leaf operand: a column reference against `row`, or a literal
/// verbatim. `Cmp`/`In`/`Between`/`Like` never nest compound expressions as
/// operands (the grammar forbids it), so this only ever sees the two leaf
/// kinds.
fn eval_operand(expr: &Expr, row: &RowView) -> Value {
    match expr {
        Expr::Column(name) => row.column(name),
        Expr::Literal(lit) => literal_to_value(lit),
        _ => Value::Null,
    }
}

fn eval_cmp(op: CmpOp, left: &Value, right: &Value) -> bool {
    let ord = left.compare(right);
    match op {
        CmpOp::Eq => ord == Ordering::Equal,
        CmpOp::Ne => ord != Ordering::Equal,
        CmpOp::Lt => ord == Ordering::Less,
        CmpOp::Le => ord != Ordering::Greater,
        CmpOp::Gt => ord == Ordering::Greater,
        CmpOp::Ge => ord != Ordering::Less,
    }
}

/// Evaluates `expr` against `row`, short-circuiting `AND`/`OR`.
pub fn eval_bool(expr: &Expr, row: &RowView) -> Result<bool, ExecError> {
    match expr {
        Expr::And(l, r) => Ok(eval_bool(l, row)? && eval_bool(r, row)?),
        Expr::Or(l, r) => Ok(eval_bool(l, row)? || eval_bool(r, row)?),
        Expr::Cmp { op, left, right } => {
            let lv = eval_operand(left, row);
            let rv = eval_operand(right, row);
            Ok(eval_cmp(*op, &lv, &rv))
        }
        Expr::In { expr: target, list } => {
            let v = eval_operand(target, row);
            Ok(list.iter().any(|lit| v.equals(&literal_to_value(lit))))
        }
        Expr::Between { expr: target, low, high } => {
            let v = eval_operand(target, row);
            let lo = eval_operand(low, row);
            let hi = eval_operand(high, row);
            Ok(v.compare(&lo) != Ordering::Less && v.compare(&hi) != Ordering::Greater)
        }
        Expr::Like { expr: target, prefix } => {
            let v = eval_operand(target, row);
            if v.is_null() {
                Ok(false)
            } else {
                Ok(v.as_text().to_lowercase().starts_with(&prefix.to_lowercase()))
            }
        }
        Expr::Column(_) | Expr::Literal(_) => Err(ExecError::MalformedPredicate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use strataq_storage::Event;

    fn row(user_id: &str, region: &str) -> RowView {
        let mut props = HashMap::new();
        props.insert("region".to_string(), region.to_string());
        RowView::new(Arc::new(Event {
            ts: 1000,
            table: "events".into(),
            user_id: Some(user_id.to_string()),
            event: "click".into(),
            props,
        }))
    }

    #[test]
    fn eq_matches_user_id() {
        let expr = Expr::Cmp {
            op: CmpOp::Eq,
            left: Box::new(Expr::Column("userId".into())),
            right: Box::new(Expr::Literal(Literal::Str("u1".into()))),
        };
        assert!(eval_bool(&expr, &row("u1", "us")).unwrap());
        assert!(!eval_bool(&expr, &row("u2", "us")).unwrap());
    }

    #[test]
    fn like_is_case_insensitive_prefix_match() {
        let expr = Expr::Like {
            expr: Box::new(Expr::Column("event".into())),
            prefix: "CLI".into(),
        };
        assert!(eval_bool(&expr, &row("u1", "us")).unwrap());
    }

    #[test]
    fn like_against_null_is_false() {
        let expr = Expr::Like {
            expr: Box::new(Expr::Column("missing_prop".into())),
            prefix: "x".into(),
        };
        assert!(!eval_bool(&expr, &row("u1", "us")).unwrap());
    }

    #[test]
    fn between_is_inclusive() {
        let expr = Expr::Between {
            expr: Box::new(Expr::Column("ts".into())),
            low: Box::new(Expr::Literal(Literal::Int(1000))),
            high: Box::new(Expr::Literal(Literal::Int(1000))),
        };
        assert!(eval_bool(&expr, &row("u1", "us")).unwrap());
    }

    #[test]
    fn in_list_matches_any_element() {
        let expr = Expr::In {
            expr: Box::new(Expr::Column("region".into())),
            list: vec![Literal::Str("eu".into()), Literal::Str("us".into())],
        };
        assert!(eval_bool(&expr, &row("u1", "us")).unwrap());
    }

    #[test]
    fn and_short_circuits() {
        let expr = Expr::And(
            Box::new(Expr::Cmp {
                op: CmpOp::Eq,
                left: Box::new(Expr::Column("userId".into())),
                right: Box::new(Expr::Literal(Literal::Str("u1".into()))),
            }),
            Box::new(Expr::Cmp {
                op: CmpOp::Eq,
                left: Box::new(Expr::Column("region".into())),
                right: Box::new(Expr::Literal(Literal::Str("us".into()))),
            }),
        );
        assert!(eval_bool(&expr, &row("u1", "us")).unwrap());
        assert!(!eval_bool(&expr, &row("u1", "eu")).unwrap());
    }

    #[test]
    fn bare_column_as_top_level_predicate_is_malformed() {
        let err = eval_bool(&Expr::Column("userId".into()), &row("u1", "us")).unwrap_err();
        assert_eq!(err, ExecError::MalformedPredicate);
    }
}
