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

//! `Limit(n)` (`spec.md` §4.5): truncates to the first `n` rows.

use crate::context::ExecContext;

pub fn execute(n: u64, mut ctx: ExecContext) -> ExecContext {
    ctx.rows.truncate(n as usize);
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use strataq_common::Value;

    #[test]
    fn truncates_to_n_rows() {
        let ctx = ExecContext {
            columns: vec!["x".into()],
            rows: vec![vec![Value::Int(1)], vec![Value::Int(2)], vec![Value::Int(3)]],
            raw_rows: vec![],
            scanned: 0,
            matched: 0,
        };
        let out = execute(2, ctx);
        assert_eq!(out.rows.len(), 2);
    }
}
