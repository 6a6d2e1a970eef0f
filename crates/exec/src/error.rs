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

/// Unexpected runtime conditions the executor cannot recover from
/// (`spec.md` §7 `ExecutionFailure`). A well-formed [`strataq_planner::PhysicalPlan`]
/// never triggers these — the grammar only ever produces predicate trees
/// `eval_bool` can evaluate — so in practice they guard against malformed
/// plans rather than fire on any query the parser/planner would accept.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ExecError {
    #[error("predicate tree is malformed: a bare column or literal cannot be evaluated as a boolean")]
    MalformedPredicate,
}
