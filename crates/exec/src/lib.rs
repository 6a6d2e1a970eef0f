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

//! The tuple-at-a-time executor (`spec.md` §4.5): runs a
//! [`strataq_planner::PhysicalPlan`] against a [`strataq_storage::ColumnStore`]
//! and produces a [`QueryResult`].

mod aggregate;
mod context;
mod error;
mod executor;
pub mod index_probe;
mod limit;
mod order_by;
mod predicate;
mod project;
mod query_result;
mod scan;

pub use error::ExecError;
pub use executor::execute;
pub use index_probe::{IndexProbe, NullProbe, ProbeMatch, ProbeQuery, ProbeResult};
pub use query_result::QueryResult;
