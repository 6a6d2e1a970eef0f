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

use std::cmp::Ordering;
use std::fmt;

/// The one scalar type every value flowing through the engine reduces to:
/// row view lookups, predicate operands, aggregate accumulator inputs, and
/// the cells of a [`QueryResult`](crate::value::Value) row.
///
/// Comparisons between two non-null values prefer numeric coercion (both
/// sides parsable as `f64`) and otherwise fall back to a case-insensitive
/// string compare, per the predicate evaluation rules of the query engine.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn null() -> Self {
        Value::Null
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Lazily parses a numeric interpretation of this value, as required by
    /// `SUM`/`AVG`/numeric comparisons. Non-numeric strings yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Null => None,
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Str(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Textual form used for string comparisons and `LIKE`.
    pub fn as_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Str(s) => s.clone(),
        }
    }

    /// Ordering used by comparisons, `MIN`/`MAX`, and `ORDER BY`.
    ///
    /// Nulls sort below every non-null value; two nulls are equal. Two
    /// non-null values compare numerically when both parse as `f64`,
    /// otherwise case-insensitively as text.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        }
        self.as_text()
            .to_lowercase()
            .cmp(&other.as_text().to_lowercase())
    }

    pub fn equals(&self, other: &Value) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl<T> From<Option<T>> for Value
where
    Value: From<T>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Value::from(v),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sorts_below_non_null() {
        assert_eq!(Value::Null.compare(&Value::Int(0)), Ordering::Less);
        assert_eq!(Value::Int(0).compare(&Value::Null), Ordering::Greater);
        assert_eq!(Value::Null.compare(&Value::Null), Ordering::Equal);
    }

    #[test]
    fn numeric_coercion_before_text() {
        let a = Value::Str("10".into());
        let b = Value::Int(9);
        assert_eq!(a.compare(&b), Ordering::Greater);
    }

    #[test]
    fn text_compare_is_case_insensitive() {
        assert!(Value::from("US").equals(&Value::from("us")));
    }

    #[test]
    fn non_numeric_strings_fall_back_to_text_order() {
        let a = Value::from("apac");
        let b = Value::from("us");
        assert_eq!(a.compare(&b), Ordering::Less);
    }
}
