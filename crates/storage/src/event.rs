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

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

pub const DEFAULT_TABLE: &str = "events";

/// The atomic record appended to the store.
///
/// `table` is never `None` once stored: [`Event::with_default_table`] (and
/// [`crate::ColumnStore::append_batch`]) substitute [`DEFAULT_TABLE`] at
/// append time if the producer left it unset.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    pub ts: i64,
    pub table: String,
    pub user_id: Option<String>,
    pub event: String,
    pub props: HashMap<String, String>,
}

impl Event {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            ts: now_millis(),
            table: DEFAULT_TABLE.to_string(),
            user_id: None,
            event: event.into(),
            props: HashMap::new(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_ts(mut self, ts: i64) -> Self {
        self.ts = ts;
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// `event` must be non-empty and non-whitespace for an event to be valid.
    pub fn is_valid(&self) -> bool {
        !self.event.trim().is_empty()
    }

    /// Substitutes [`DEFAULT_TABLE`] for a missing/blank table, per the
    /// store's invariant that `table` is never empty once stored.
    pub fn normalized_table(&self) -> &str {
        if self.table.trim().is_empty() {
            DEFAULT_TABLE
        } else {
            self.table.as_str()
        }
    }
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
