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

use thiserror::Error;

/// Per-index-kind failures. These never reach a query as a typed failure
/// (`spec.md` §7): the planner/executor only ever fall back to a scan when
/// an index declines a lookup.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum IndexError {
    #[error("{index_kind} index does not support {operation}")]
    UnsupportedOperation {
        index_kind: &'static str,
        operation: &'static str,
    },
    #[error("'{value}' is not numeric; BTree equals/in require numeric probes")]
    NonNumericProbe { value: String },
}
