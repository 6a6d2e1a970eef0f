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

//! The authoritative in-memory record of ingested events (`ColumnStore`),
//! the bounded staging buffer that feeds it (`IngestBuffer`), and the
//! read-only row façade (`RowView`) the rest of the engine scans through.

pub mod column_store;
pub mod event;
pub mod ingest;
pub mod row;
pub mod segment;

pub use column_store::{BatchAppendResult, ColumnStore, SegmentAppend, StoreStats};
pub use event::{now_millis, Event};
pub use ingest::{IngestBuffer, SubmitOutcome};
pub use row::RowView;
pub use segment::SegmentMeta;
