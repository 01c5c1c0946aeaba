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

//! Create-or-update of a single built object.

use crate::diff::{diff, Patch};
use crate::error::{StoreError, SyncError};
use crate::query::{derive_query, Query};
use crate::store::{record_id, RecordStore, RemoteRecord};
use crate::value::{payload, Object, Value};
use tracing::{debug, error, info};

/// What an upsert did.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// The object carried no usable identity; nothing was sent.
    Skipped,
    /// No match existed; the record was created.
    Created(RemoteRecord),
    /// A match existed and differed; the whole object was written.
    Updated {
        /// The matched record overlaid with the update response.
        record: RemoteRecord,
        /// Fields that differed, with their new values.
        patch: Patch,
    },
    /// A match existed and already held the built values.
    Unchanged(RemoteRecord),
    /// A store operation failed; the failure has been logged.
    Failed(StoreError),
}

impl UpsertOutcome {
    /// The stored record, for outcomes that produced one.
    pub fn record(&self) -> Option<&RemoteRecord> {
        match self {
            Self::Created(record) | Self::Unchanged(record) => Some(record),
            Self::Updated { record, .. } => Some(record),
            Self::Skipped | Self::Failed(_) => None,
        }
    }

    /// Short label used in logs and reports.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Skipped => "skipped",
            Self::Created(_) => "created",
            Self::Updated { .. } => "updated",
            Self::Unchanged(_) => "no change",
            Self::Failed(_) => "error",
        }
    }
}

/// Reconciles built objects with a [`RecordStore`].
#[derive(Debug)]
pub struct Upserter<S> {
    store: S,
}

impl<S: RecordStore> Upserter<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create `object` if the store has no match for its query, otherwise
    /// update the match when the diff is non-empty.
    ///
    /// On success the stored record's `id` is merged into `object`. Store
    /// failures are logged and reported as [`UpsertOutcome::Failed`]; only
    /// cancellation is returned as an error.
    pub fn upsert(&self, record_type: &str, object: &mut Object) -> Result<UpsertOutcome, SyncError> {
        let Some(query) = derive_query(object) else {
            debug!(record_type, "no lookup query for object, skipping");
            return Ok(UpsertOutcome::Skipped);
        };

        match self.reconcile(record_type, object, &query) {
            Ok(outcome) => {
                if let Some(id) = outcome.record().and_then(record_id) {
                    object.insert("id".to_string(), Value::String(id));
                }
                Ok(outcome)
            }
            Err(e) if e.is_cancellation() => Err(SyncError::Cancelled),
            Err(e) => {
                error!(
                    action = "error",
                    record_type,
                    query = ?query,
                    object = ?object,
                    error = %e,
                    "error {} {:?}",
                    record_type.to_uppercase(),
                    query
                );
                Ok(UpsertOutcome::Failed(e))
            }
        }
    }

    fn reconcile(
        &self,
        record_type: &str,
        object: &Object,
        query: &Query,
    ) -> Result<UpsertOutcome, StoreError> {
        let body = payload(object);

        let Some(mut existing) = self.store.filter(record_type, query, 1)?.into_iter().next() else {
            let record = self.store.create(record_type, &body)?;
            info!(
                action = "created",
                record_type,
                query = ?query,
                object = ?object,
                "created {} {:?}",
                record_type.to_uppercase(),
                query
            );
            return Ok(UpsertOutcome::Created(record));
        };

        let patch = diff(&existing, object);
        if patch.is_empty() {
            info!(
                action = "no change",
                record_type,
                query = ?query,
                object = ?object,
                "no change {} {:?}",
                record_type.to_uppercase(),
                query
            );
            return Ok(UpsertOutcome::Unchanged(existing));
        }

        let id = record_id(&existing).ok_or_else(|| {
            StoreError::Decode(format!("{} record matching {:?} has no id", record_type, query))
        })?;
        // Fields only the remote holds are sent back unchanged.
        let mut merged = existing.clone();
        merged.extend(body);
        let response = self.store.update(record_type, &id, &merged)?;
        existing.extend(response);
        info!(
            action = "updated",
            record_type,
            query = ?query,
            patch = ?patch,
            object = ?object,
            "updated {} {:?}",
            record_type.to_uppercase(),
            query
        );
        Ok(UpsertOutcome::Updated {
            record: existing,
            patch,
        })
    }
}
