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

//! A case-insensitive, deliberately tiny SQL grammar:
//! `SELECT ... FROM t [WHERE ...] [GROUP BY ...] [ORDER BY ...] [LIMIT n]`.
//! No joins, no subqueries, no arithmetic expressions — see `spec.md` §4.3.

pub mod ast;
mod lexer;
pub mod parser;

pub use ast::*;
pub use parser::{parse, ParseError, ParseErrorKind};
