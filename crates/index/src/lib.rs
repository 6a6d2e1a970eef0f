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

//! Secondary index layer: bitmap/btree index kinds, the desired-index
//! catalog, off-critical-path background building, the adaptive policy
//! that decides what to build or drop, and the `IndexManager` that owns
//! all of it (`spec.md` §4.7-§4.11).

pub mod bitmap_index;
pub mod btree_index;
pub mod builder;
pub mod catalog;
pub mod error;
pub mod manager;
pub mod policy;
pub mod row_set;
pub mod secondary_index;

pub use bitmap_index::BitmapIndex;
pub use btree_index::{is_numeric_column, BTreeIndex};
pub use builder::{BuildJob, BuildOutcome, IndexBackgroundBuilder};
pub use catalog::{CatalogStats, IndexCatalog, IndexSpec};
pub use error::IndexError;
pub use manager::{IndexLookupResult, IndexManager, ManagerStats};
pub use policy::{AdaptiveIndexPolicy, BuildCandidate};
pub use row_set::RowPositions;
pub use secondary_index::{IndexQuery, SecondaryIndex};
