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

//! The engine's unified error type: every sub-crate's error folds into
//! one `EngineError` at this boundary (`spec.md` §7), the same way the
//! teacher's top-level crates fold per-module errors into one facade.

use strataq_exec::ExecError;
use strataq_planner::PlanError;
use strataq_sql::ParseError;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("execution error: {0}")]
    Exec(#[from] ExecError),
}
