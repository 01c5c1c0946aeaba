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

//! In-memory [`RecordStore`] with call recording and failure injection.

use recsync_core::{differs, record_id, Query, RecordStore, RemoteRecord, StoreError, PATH_SEPARATOR};
use serde_json::{json, Value as JsonValue};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Store operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    /// Query by filter.
    Filter,
    /// Create a record.
    Create,
    /// Update a record by id.
    Update,
}

/// One recorded store call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Operation performed.
    pub operation: Operation,
    /// Record type addressed.
    pub record_type: String,
    /// Target id for updates.
    pub id: Option<String>,
    /// Body sent for creates and updates.
    pub body: Option<RemoteRecord>,
}

#[derive(Debug, Default)]
struct State {
    records: BTreeMap<String, Vec<RemoteRecord>>,
    next_id: u64,
    calls: Vec<Call>,
    failures: Vec<(Operation, Option<String>, StoreError)>,
    session_error: Option<StoreError>,
}

/// An in-memory record store.
///
/// Records are kept per type with numeric ids assigned on create. Filters
/// follow `__` paths into nested objects and compare values the same way
/// the diff engine does, so a textual `"7"` matches a stored `7`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a record without recording a call. Returns its id.
    ///
    /// A record without an `id` is given the next free one. Non-object
    /// values are stored as empty records.
    pub fn seed(&self, record_type: &str, record: JsonValue) -> String {
        let mut state = self.state();
        let mut record = match record {
            JsonValue::Object(map) => map,
            _ => RemoteRecord::new(),
        };
        let id = match record_id(&record) {
            Some(id) => id,
            None => {
                state.next_id += 1;
                let id = state.next_id;
                record.insert("id".to_string(), json!(id));
                id.to_string()
            }
        };
        state
            .records
            .entry(record_type.to_string())
            .or_default()
            .push(record);
        id
    }

    /// All stored records of a type, in insertion order.
    pub fn records(&self, record_type: &str) -> Vec<RemoteRecord> {
        self.state()
            .records
            .get(record_type)
            .cloned()
            .unwrap_or_default()
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Number of calls of one kind across all types.
    pub fn count(&self, operation: Operation) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Number of calls of one kind against one type.
    pub fn count_for(&self, operation: Operation, record_type: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.operation == operation && c.record_type == record_type)
            .count()
    }

    /// Fail the next matching call with `error`.
    ///
    /// With `record_type` set only calls against that type match. Injected
    /// failures are consumed in the order they were added.
    pub fn fail_next(&self, operation: Operation, record_type: Option<&str>, error: StoreError) {
        self.state()
            .failures
            .push((operation, record_type.map(str::to_string), error));
    }

    /// Make `check_session` return `error`.
    pub fn reject_session(&self, error: StoreError) {
        self.state().session_error = Some(error);
    }

    fn begin(
        state: &mut State,
        operation: Operation,
        record_type: &str,
        id: Option<&str>,
        body: Option<&RemoteRecord>,
    ) -> Result<(), StoreError> {
        state.calls.push(Call {
            operation,
            record_type: record_type.to_string(),
            id: id.map(str::to_string),
            body: body.cloned(),
        });

        let pos = state.failures.iter().position(|(op, ty, _)| {
            *op == operation && ty.as_deref().map_or(true, |t| t == record_type)
        });
        match pos {
            Some(i) => Err(state.failures.remove(i).2),
            None => Ok(()),
        }
    }
}

/// Whether a stored record satisfies every filter in `query`.
fn matches(record: &RemoteRecord, query: &Query) -> bool {
    query.iter().all(|(path, expected)| {
        let mut parts = path.split(PATH_SEPARATOR);
        let first = parts.next().and_then(|p| record.get(p));
        let found = parts.try_fold(first, |node, part| {
            node.map(|n| n.as_object().and_then(|o| o.get(part)))
        });
        match found.flatten() {
            Some(actual) => !differs(actual, expected),
            None => false,
        }
    })
}

impl RecordStore for MemoryStore {
    fn filter(
        &self,
        record_type: &str,
        query: &Query,
        limit: usize,
    ) -> Result<Vec<RemoteRecord>, StoreError> {
        let mut state = self.state();
        Self::begin(&mut state, Operation::Filter, record_type, None, None)?;

        Ok(state
            .records
            .get(record_type)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| matches(r, query))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn create(&self, record_type: &str, object: &RemoteRecord) -> Result<RemoteRecord, StoreError> {
        let mut state = self.state();
        Self::begin(&mut state, Operation::Create, record_type, None, Some(object))?;

        state.next_id += 1;
        let mut record = object.clone();
        record.insert("id".to_string(), json!(state.next_id));
        state
            .records
            .entry(record_type.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn update(
        &self,
        record_type: &str,
        id: &str,
        object: &RemoteRecord,
    ) -> Result<RemoteRecord, StoreError> {
        let mut state = self.state();
        Self::begin(&mut state, Operation::Update, record_type, Some(id), Some(object))?;

        let record = state
            .records
            .get_mut(record_type)
            .and_then(|records| {
                records
                    .iter_mut()
                    .find(|r| record_id(r).as_deref() == Some(id))
            })
            .ok_or_else(|| StoreError::NotFound(format!("{} {}", record_type, id)))?;

        for (key, value) in object {
            if key != "id" {
                record.insert(key.clone(), value.clone());
            }
        }
        Ok(record.clone())
    }

    fn check_session(&self) -> Result<(), StoreError> {
        match &self.state().session_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recsync_core::Value;

    fn query(pairs: &[(&str, &str)]) -> Query {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn test_filter_follows_paths() {
        let store = MemoryStore::new();
        store.seed("person", json!({"name": {"first": "Ada", "last": "Lovelace"}}));
        store.seed("person", json!({"name": {"first": "Ada", "last": "Byron"}}));

        let found = store
            .filter("person", &query(&[("name__last", "Byron")]), 10)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["id"], json!(2));
    }

    #[test]
    fn test_filter_matches_numeric_text() {
        let store = MemoryStore::new();
        store.seed("applicant", json!({"organization": 7}));

        let found = store
            .filter("applicant", &query(&[("organization", "7")]), 1)
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_create_then_update() {
        let store = MemoryStore::new();
        let mut body = RemoteRecord::new();
        body.insert("name".to_string(), json!("Acme"));

        let created = store.create("organization", &body).unwrap();
        assert_eq!(created["id"], json!(1));

        body.insert("url".to_string(), json!("acme.test"));
        let updated = store.update("organization", "1", &body).unwrap();
        assert_eq!(updated["url"], json!("acme.test"));
        assert_eq!(store.records("organization").len(), 1);
        assert_eq!(store.count(Operation::Create), 1);
        assert_eq!(store.count_for(Operation::Update, "organization"), 1);
    }

    #[test]
    fn test_update_unknown_id() {
        let store = MemoryStore::new();
        let err = store
            .update("organization", "42", &RemoteRecord::new())
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_injected_failure_consumed_once() {
        let store = MemoryStore::new();
        store.fail_next(
            Operation::Filter,
            Some("person"),
            StoreError::Transport("reset".to_string()),
        );

        assert!(store.filter("organization", &Query::new(), 1).is_ok());
        assert!(store.filter("person", &Query::new(), 1).is_err());
        assert!(store.filter("person", &Query::new(), 1).is_ok());
    }

    #[test]
    fn test_session_rejection() {
        let store = MemoryStore::new();
        assert!(store.check_session().is_ok());
        store.reject_session(StoreError::Authentication("bad token".to_string()));
        assert!(matches!(
            store.check_session(),
            Err(StoreError::Authentication(_))
        ));
    }
}
