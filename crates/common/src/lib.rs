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

//! Types shared by every other `strataq` crate: the scalar [`Value`]
//! representation that flows between row views, predicates, aggregates
//! and query results, and the engine-wide [`config::EngineConfig`].

pub mod config;
pub mod value;

pub use config::EngineConfig;
pub use value::Value;
