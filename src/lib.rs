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

//! `strataq`: an embeddable, in-process analytics engine over a stream of
//! schemaless events — a columnar store, a restricted SQL dialect, a
//! tuple-at-a-time executor, and a secondary-index layer whose build/drop
//! decisions are driven by an adaptive policy over recent query workload
//! (`spec.md` §1).
//!
//! This crate is the integration point: [`engine::Engine`] wires
//! `strataq_storage`, `strataq_sql`, `strataq_planner`, `strataq_exec`,
//! and `strataq_index` together and exposes the embeddable
//! `IngestService`/`QueryService` facade of `spec.md` §6. HTTP/REST,
//! WebSocket, Kafka-style ingestion, metrics exposition, the console, and
//! the dashboard are out of scope (`spec.md` §1) — a host embeds this
//! crate and builds those surfaces against the facade.

pub mod engine;
pub mod error;
pub mod index_adapter;
pub mod service;

pub use engine::Engine;
pub use error::EngineError;
pub use index_adapter::IndexManagerProbe;
pub use service::{ExecuteRequest, IngestService, IngestStats, QueryService};

pub use strataq_common::config::EngineConfig;
pub use strataq_exec::QueryResult;
pub use strataq_storage::Event;
