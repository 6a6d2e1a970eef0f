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

use std::sync::Arc;

use strataq_common::Value;

use crate::event::Event;

/// A lightweight read-only façade over a stored [`Event`].
///
/// Holds an `Arc` rather than borrowing, so a scan snapshot can outlive the
/// per-table lock that produced it (see the concurrency discipline in
/// `spec.md` §5): cloning a `RowView` is a refcount bump, never a copy of
/// the underlying event.
#[derive(Clone, Debug)]
pub struct RowView {
    event: Arc<Event>,
}

impl RowView {
    pub fn new(event: Arc<Event>) -> Self {
        Self { event }
    }

    pub fn source(&self) -> &Event {
        &self.event
    }

    pub fn ts(&self) -> i64 {
        self.event.ts
    }

    pub fn table(&self) -> &str {
        self.event.normalized_table()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.event.user_id.as_deref()
    }

    pub fn event_name(&self) -> &str {
        &self.event.event
    }

    pub fn prop(&self, name: &str) -> Option<&str> {
        self.event.props.get(name).map(String::as_str)
    }

    /// Resolves a column reference: base columns by case-insensitive name
    /// (`ts`/`timestamp`, `table`, `userid`/`user_id`, `event`), a bare
    /// name or `props.<name>` otherwise consulting the property map with
    /// the name's original casing. Missing properties resolve to null.
    pub fn column(&self, name: &str) -> Value {
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "ts" | "timestamp" => Value::Int(self.ts()),
            "table" => Value::Str(self.table().to_string()),
            "userid" | "user_id" => Value::from(self.user_id()),
            "event" => Value::Str(self.event_name().to_string()),
            _ => {
                let prop_key: &str = if lower.starts_with("props.") {
                    &name[6.min(name.len())..]
                } else {
                    name
                };
                Value::from(self.prop(prop_key))
            }
        }
    }

    /// The four base columns that are contractually present in `SELECT *`.
    pub fn base_columns() -> [&'static str; 4] {
        ["ts", "table", "userId", "event"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn row(ts: i64, user_id: Option<&str>, event: &str, props: &[(&str, &str)]) -> RowView {
        let mut map = HashMap::new();
        for (k, v) in props {
            map.insert(k.to_string(), v.to_string());
        }
        RowView::new(Arc::new(Event {
            ts,
            table: "events".into(),
            user_id: user_id.map(String::from),
            event: event.into(),
            props: map,
        }))
    }

    #[test]
    fn base_columns_case_insensitive() {
        let r = row(1000, Some("u1"), "click", &[]);
        assert_eq!(r.column("TS"), Value::Int(1000));
        assert_eq!(r.column("UserId"), Value::Str("u1".into()));
        assert_eq!(r.column("user_id"), Value::Str("u1".into()));
    }

    #[test]
    fn missing_property_is_null() {
        let r = row(1000, None, "click", &[("region", "us")]);
        assert_eq!(r.column("region"), Value::Str("us".into()));
        assert_eq!(r.column("props.region"), Value::Str("us".into()));
        assert_eq!(r.column("missing"), Value::Null);
        assert_eq!(r.column("user_id"), Value::Null);
    }
}
