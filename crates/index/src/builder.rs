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

//! Off-critical-path index construction (`spec.md` §4.9). Builds run as
//! bounded-concurrency `tokio` tasks gated by a semaphore sized
//! `max(1, cores/2)`, mirroring the teacher's use of an async runtime for
//! background services even though the query path stays synchronous.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;

use parking_lot::Mutex;
use strataq_storage::RowView;
use tokio::sync::Semaphore;
use tokio::task::{AbortHandle, JoinHandle};

use crate::secondary_index::SecondaryIndex;

/// One index build request: everything needed to construct a
/// [`SecondaryIndex`] for one `(table, column, segment)` off the critical
/// path.
pub struct BuildJob {
    pub table: String,
    pub column: String,
    pub segment_id: u64,
    pub rows: Vec<RowView>,
}

/// Outcome of a build job: `None` means the build panicked or the builder
/// had already begun shutting down — callers fall back to an unindexed
/// scan for that segment (`spec.md` §7).
pub type BuildOutcome = Option<SecondaryIndex>;

pub fn default_pool_size() -> usize {
    (num_cpus::get() / 2).max(1)
}

/// Off-critical-path index construction pool. Tasks mutate only indexes
/// that have not yet been installed, so no external locking is needed
/// until the `IndexManager` installs a finished build under its write
/// lock.
pub struct IndexBackgroundBuilder {
    semaphore: Arc<Semaphore>,
    active_tasks: Arc<AtomicUsize>,
    shutting_down: Arc<AtomicBool>,
    in_flight: Mutex<Vec<AbortHandle>>,
}

impl IndexBackgroundBuilder {
    pub fn new(pool_size: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(pool_size.max(1))),
            active_tasks: Arc::new(AtomicUsize::new(0)),
            shutting_down: Arc::new(AtomicBool::new(false)),
            in_flight: Mutex::new(Vec::new()),
        }
    }

    pub fn with_default_pool_size() -> Self {
        Self::new(default_pool_size())
    }

    pub fn active_tasks(&self) -> usize {
        self.active_tasks.load(AtomicOrdering::Relaxed)
    }

    fn prune_finished(&self) {
        self.in_flight.lock().retain(|h| !h.is_finished());
    }

    /// Submits one build job; returns a future resolving to the built
    /// index, or `None` on panic or post-shutdown submission.
    pub fn submit_build(&self, job: BuildJob) -> JoinHandle<BuildOutcome> {
        self.prune_finished();
        if self.shutting_down.load(AtomicOrdering::Relaxed) {
            return tokio::spawn(async { None });
        }
        let semaphore = self.semaphore.clone();
        let active = self.active_tasks.clone();
        let handle = tokio::spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(p) => p,
                Err(_) => return None,
            };
            active.fetch_add(1, AtomicOrdering::Relaxed);
            let BuildJob { table, column, segment_id, rows } = job;
            let index = SecondaryIndex::build(&table, &column, segment_id, &rows);
            active.fetch_sub(1, AtomicOrdering::Relaxed);
            Some(index)
        });
        self.in_flight.lock().push(handle.abort_handle());
        handle
    }

    /// Submits every job and awaits all of them (joins on all).
    pub async fn submit_builds(&self, jobs: Vec<BuildJob>) -> Vec<BuildOutcome> {
        let handles: Vec<_> = jobs.into_iter().map(|job| self.submit_build(job)).collect();
        let mut out = Vec::with_capacity(handles.len());
        for handle in handles {
            out.push(handle.await.unwrap_or(None));
        }
        out
    }

    /// Runs an arbitrary maintenance closure (e.g. catalog pruning) on the
    /// same background pool.
    pub fn submit_maintenance<F>(&self, task: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        tokio::spawn(async move { task() })
    }

    /// Stops accepting new work; jobs already submitted keep running.
    pub fn shutdown(&self) {
        self.shutting_down.store(true, AtomicOrdering::Relaxed);
    }

    /// Stops accepting new work and cancels everything still in flight.
    pub fn shutdown_now(&self) {
        self.shutting_down.store(true, AtomicOrdering::Relaxed);
        for handle in self.in_flight.lock().drain(..) {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(column: &str) -> BuildJob {
        BuildJob {
            table: "events".into(),
            column: column.into(),
            segment_id: 1,
            rows: Vec::new(),
        }
    }

    #[tokio::test]
    async fn build_installs_after_successful_completion() {
        let builder = IndexBackgroundBuilder::new(2);
        let outcome = builder.submit_build(job("region")).await.unwrap();
        assert!(outcome.is_some());
    }

    #[tokio::test]
    async fn submit_builds_joins_on_all() {
        let builder = IndexBackgroundBuilder::new(2);
        let outcomes = builder.submit_builds(vec![job("region"), job("price")]).await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(Option::is_some));
    }

    #[tokio::test]
    async fn shutdown_refuses_new_work() {
        let builder = IndexBackgroundBuilder::new(2);
        builder.shutdown();
        let outcome = builder.submit_build(job("region")).await.unwrap();
        assert!(outcome.is_none());
    }
}
