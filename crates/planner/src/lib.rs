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

//! Converts a parsed [`strataq_sql::SelectStmt`] into a [`plan::PhysicalPlan`],
//! rejecting unsupported shapes and extracting the time-range pushdown.

pub mod observer;
pub mod plan;
mod planner;
mod pushdown;

pub use observer::PredicateObserver;
pub use plan::*;
pub use planner::{plan, PlanError};
