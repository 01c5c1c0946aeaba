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

//! The remote record store seam.
//!
//! Transport, authentication and pagination belong to the implementation.
//! The engine only needs filtered lookup, create and update.

use crate::error::StoreError;
use crate::query::Query;
use serde_json::{Map as JsonMap, Value as JsonValue};

/// A record as returned by the store. Always carries `id` once persisted.
pub type RemoteRecord = JsonMap<String, JsonValue>;

/// A remote record store.
///
/// Implementations must be shareable across worker threads.
pub trait RecordStore: Send + Sync {
    /// Return up to `limit` records of `record_type` matching `query`.
    fn filter(
        &self,
        record_type: &str,
        query: &Query,
        limit: usize,
    ) -> Result<Vec<RemoteRecord>, StoreError>;

    /// Create a record and return it as stored.
    fn create(&self, record_type: &str, object: &RemoteRecord) -> Result<RemoteRecord, StoreError>;

    /// Replace the fields of record `id` and return it as stored.
    fn update(
        &self,
        record_type: &str,
        id: &str,
        object: &RemoteRecord,
    ) -> Result<RemoteRecord, StoreError>;

    /// Verify the session before any row is processed.
    fn check_session(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn filter(
        &self,
        record_type: &str,
        query: &Query,
        limit: usize,
    ) -> Result<Vec<RemoteRecord>, StoreError> {
        (**self).filter(record_type, query, limit)
    }

    fn create(&self, record_type: &str, object: &RemoteRecord) -> Result<RemoteRecord, StoreError> {
        (**self).create(record_type, object)
    }

    fn update(
        &self,
        record_type: &str,
        id: &str,
        object: &RemoteRecord,
    ) -> Result<RemoteRecord, StoreError> {
        (**self).update(record_type, id, object)
    }

    fn check_session(&self) -> Result<(), StoreError> {
        (**self).check_session()
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn filter(
        &self,
        record_type: &str,
        query: &Query,
        limit: usize,
    ) -> Result<Vec<RemoteRecord>, StoreError> {
        (**self).filter(record_type, query, limit)
    }

    fn create(&self, record_type: &str, object: &RemoteRecord) -> Result<RemoteRecord, StoreError> {
        (**self).create(record_type, object)
    }

    fn update(
        &self,
        record_type: &str,
        id: &str,
        object: &RemoteRecord,
    ) -> Result<RemoteRecord, StoreError> {
        (**self).update(record_type, id, object)
    }

    fn check_session(&self) -> Result<(), StoreError> {
        (**self).check_session()
    }
}

/// The record's `id` as a string. Numeric ids are rendered in decimal.
pub fn record_id(record: &RemoteRecord) -> Option<String> {
    match record.get("id")? {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id() {
        let rec = json!({"id": 42}).as_object().cloned().unwrap();
        assert_eq!(record_id(&rec), Some("42".to_string()));

        let rec = json!({"id": "abc"}).as_object().cloned().unwrap();
        assert_eq!(record_id(&rec), Some("abc".to_string()));

        let rec = json!({"id": ""}).as_object().cloned().unwrap();
        assert_eq!(record_id(&rec), None);

        let rec = json!({"name": "x"}).as_object().cloned().unwrap();
        assert_eq!(record_id(&rec), None);
    }
}
