// Dweve Recsync - Tabular Record Synchronization
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Row-by-row import through ordered stages.
//!
//! A [`Pipeline`] owns the store session and the compiled stages. Every row
//! runs through each stage in order; within a stage every mapping is built
//! and upserted in turn. When an upserted object carries a `_key`, the
//! stored record's id is recorded on the row as `"<type>[<key>]"` so later
//! stages of the same row can reference it.
//!
//! Rows are independent of one another, so [`Pipeline::run_parallel`] fans
//! them out to a bounded rayon pool and folds the per-row counts into one
//! [`Summary`].

use crate::cancel::CancelToken;
use crate::error::{Result, SchemaError, StoreError, SyncError, TemplateError};
use crate::mapping::Mapping;
use crate::row::Row;
use crate::schema::{SchemaNode, KEY};
use crate::store::RecordStore;
use crate::upsert::{UpsertOutcome, Upserter};
use crate::value::Value;
use rayon::prelude::*;
use tracing::{debug, warn};

/// All mappings for one record type.
#[derive(Debug)]
pub struct Stage {
    /// Remote record type the mappings produce.
    pub record_type: String,
    /// Mappings applied to every row, in order.
    pub mappings: Vec<Mapping>,
}

impl Stage {
    /// A stage from already compiled mappings.
    pub fn new(record_type: impl Into<String>, mappings: Vec<Mapping>) -> Self {
        Self {
            record_type: record_type.into(),
            mappings,
        }
    }

    /// Compile each schema tree into a mapping.
    pub fn compile<I>(record_type: impl Into<String>, trees: I) -> std::result::Result<Self, SchemaError>
    where
        I: IntoIterator<Item = SchemaNode>,
    {
        let mappings = trees
            .into_iter()
            .map(Mapping::new)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self::new(record_type, mappings))
    }
}

/// Worker pool sizing for [`Pipeline::run_parallel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerConfig {
    /// Number of worker threads. Zero uses one per available CPU.
    pub workers: usize,
}

impl WorkerConfig {
    /// A pool of exactly `workers` threads.
    pub fn with_workers(workers: usize) -> Self {
        Self { workers }
    }
}

/// Result of one mapping for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingOutcome {
    /// Record type of the stage the mapping belongs to.
    pub record_type: String,
    /// Position of the mapping within its stage.
    pub index: usize,
    /// The upsert outcome, or the render failure that prevented a build.
    pub result: std::result::Result<UpsertOutcome, TemplateError>,
}

/// Everything that happened to one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowReport {
    /// The row after processing, including the handles it gained.
    pub row: Row,
    /// One entry per mapping, in execution order.
    pub outcomes: Vec<MappingOutcome>,
}

impl RowReport {
    /// Counts for this row alone.
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            rows: 1,
            ..Summary::default()
        };
        for outcome in &self.outcomes {
            summary.record(outcome);
        }
        summary
    }
}

/// Aggregate counts for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    /// Rows fully processed.
    pub rows: usize,
    /// Records created.
    pub created: usize,
    /// Records updated.
    pub updated: usize,
    /// Matches that already held the built values.
    pub unchanged: usize,
    /// Mappings that built nothing or had no identity to look up.
    pub skipped: usize,
    /// Mappings abandoned on a render or store failure.
    pub errored: usize,
}

impl Summary {
    /// Count one mapping outcome.
    pub fn record(&mut self, outcome: &MappingOutcome) {
        match &outcome.result {
            Ok(UpsertOutcome::Created(_)) => self.created += 1,
            Ok(UpsertOutcome::Updated { .. }) => self.updated += 1,
            Ok(UpsertOutcome::Unchanged(_)) => self.unchanged += 1,
            Ok(UpsertOutcome::Skipped) => self.skipped += 1,
            Ok(UpsertOutcome::Failed(_)) | Err(_) => self.errored += 1,
        }
    }

    /// Combine two partial summaries.
    pub fn merge(self, other: Self) -> Self {
        Self {
            rows: self.rows + other.rows,
            created: self.created + other.created,
            updated: self.updated + other.updated,
            unchanged: self.unchanged + other.unchanged,
            skipped: self.skipped + other.skipped,
            errored: self.errored + other.errored,
        }
    }

    /// Create plus update calls issued.
    pub fn writes(&self) -> usize {
        self.created + self.updated
    }

    /// True when no mapping failed.
    pub fn is_clean(&self) -> bool {
        self.errored == 0
    }
}

/// Imports rows into a [`RecordStore`] through ordered stages.
#[derive(Debug)]
pub struct Pipeline<S> {
    upserter: Upserter<S>,
    stages: Vec<Stage>,
    cancel: CancelToken,
}

impl<S: RecordStore> Pipeline<S> {
    /// Validate the store session and build the pipeline.
    ///
    /// Stage order is the order of `stages`: referenced types must come
    /// before the types that reference them.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Authentication`] when the store rejects the
    /// session. No row is processed in that case.
    pub fn new(store: S, stages: Vec<Stage>) -> Result<Self> {
        store.check_session().map_err(|e| match e {
            StoreError::Authentication(message) => SyncError::Authentication(message),
            StoreError::Cancelled => SyncError::Cancelled,
            other => SyncError::Store(other),
        })?;
        Ok(Self {
            upserter: Upserter::new(store),
            stages,
            cancel: CancelToken::new(),
        })
    }

    /// Use a shared cancellation token.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// The token that stops this pipeline.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        self.upserter.store()
    }

    /// Run one row through every stage.
    ///
    /// Render and store failures are contained to their mapping and
    /// reported in the [`RowReport`]. Only cancellation aborts the row.
    pub fn process_row(&self, mut row: Row) -> Result<RowReport> {
        let mut outcomes = Vec::new();

        for stage in &self.stages {
            for (index, mapping) in stage.mappings.iter().enumerate() {
                self.cancel.check()?;
                let result = self.apply(stage, mapping, &mut row)?;
                outcomes.push(MappingOutcome {
                    record_type: stage.record_type.clone(),
                    index,
                    result,
                });
            }
        }

        Ok(RowReport { row, outcomes })
    }

    fn apply(
        &self,
        stage: &Stage,
        mapping: &Mapping,
        row: &mut Row,
    ) -> Result<std::result::Result<UpsertOutcome, TemplateError>> {
        let record_type = stage.record_type.as_str();

        let mut object = match mapping.build(row) {
            Ok(Some(object)) => object,
            Ok(None) => {
                debug!(record_type, line = ?row.line(), "row does not satisfy mapping");
                return Ok(Ok(UpsertOutcome::Skipped));
            }
            Err(e) => {
                warn!(
                    action = "error",
                    record_type,
                    line = ?row.line(),
                    error = %e,
                    "could not build {}",
                    record_type.to_uppercase()
                );
                return Ok(Err(e));
            }
        };

        let outcome = self.upserter.upsert(record_type, &mut object)?;

        if outcome.record().is_some() {
            let key = object.get(KEY).and_then(Value::as_str).filter(|k| !k.is_empty());
            let id = object.get("id").and_then(Value::as_str);
            if let (Some(key), Some(id)) = (key, id) {
                debug!(record_type, key, id, "recorded handle");
                row.set_handle(record_type, key, id);
            }
        }

        Ok(Ok(outcome))
    }

    /// Process rows one after another.
    pub fn run<I>(&self, rows: I) -> Result<Summary>
    where
        I: IntoIterator<Item = Row>,
    {
        rows.into_iter().try_fold(Summary::default(), |summary, row| {
            Ok(summary.merge(self.process_row(row)?.summary()))
        })
    }

    /// Process rows on a bounded worker pool.
    ///
    /// Each worker runs the whole per-row pipeline for the rows it takes.
    /// Rows run concurrently without coordination, so two rows describing
    /// the same entity may both create it.
    pub fn run_parallel<I>(&self, rows: I, config: &WorkerConfig) -> Result<Summary>
    where
        I: IntoIterator<Item = Row>,
        I::IntoIter: Send,
    {
        self.run_parallel_with(rows, config, |_| {})
    }

    /// Like [`Pipeline::run_parallel`], handing every finished row report
    /// to `observe` on the worker that produced it.
    pub fn run_parallel_with<I, F>(&self, rows: I, config: &WorkerConfig, observe: F) -> Result<Summary>
    where
        I: IntoIterator<Item = Row>,
        I::IntoIter: Send,
        F: Fn(&RowReport) + Sync + Send,
    {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .build()
            .map_err(|e| SyncError::WorkerPool(e.to_string()))?;

        let rows = rows.into_iter();
        pool.install(|| {
            rows.par_bridge()
                .map(|row| {
                    let report = self.process_row(row)?;
                    observe(&report);
                    Ok(report.summary())
                })
                .try_reduce(Summary::default, |a, b| Ok(a.merge(b)))
        })
    }
}
