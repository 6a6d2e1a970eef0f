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

//! `Project(specs)` (`spec.md` §4.5) — always the last shape-defining
//! stage; materializes the final column set and aliases.

use strataq_common::Value;
use strataq_planner::{ProjectNode, ProjectSpec};

use crate::context::ExecContext;
use crate::error::ExecError;

/// A reference to a missing column yields null rather than an error
/// (`spec.md` §4.5).
enum Source {
    Column(usize),
    Missing,
}

pub fn execute(node: &ProjectNode, ctx: ExecContext) -> Result<ExecContext, ExecError> {
    let mut columns = Vec::new();
    let mut sources = Vec::new();

    for spec in &node.specs {
        match spec {
            ProjectSpec::Wildcard => {
                for (i, name) in ctx.columns.iter().enumerate() {
                    columns.push(name.clone());
                    sources.push(Source::Column(i));
                }
            }
            ProjectSpec::Column { name, alias } => {
                columns.push(alias.clone());
                let idx = ctx.columns.iter().position(|c| c.eq_ignore_ascii_case(name));
                sources.push(idx.map(Source::Column).unwrap_or(Source::Missing));
            }
        }
    }

    let rows = ctx
        .rows
        .iter()
        .map(|row| {
            sources
                .iter()
                .map(|s| match s {
                    Source::Column(i) => row[*i].clone(),
                    Source::Missing => Value::Null,
                })
                .collect()
        })
        .collect();

    Ok(ExecContext {
        columns,
        rows,
        raw_rows: ctx.raw_rows,
        scanned: ctx.scanned,
        matched: ctx.matched,
    })
}
