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

//! Error types for the reconciliation engine.
//!
//! Building a mapping that a row does not satisfy is not an error (it yields
//! `None`), and neither is an object without enough identity to look up.
//! The types here cover the failures that remain: malformed schemas,
//! template rendering, remote-store operations, and pipeline-level aborts.

use thiserror::Error;

/// Errors raised while constructing a schema or compiling its templates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The root of a mapping must be an object node.
    #[error("Mapping root must be an object, found {found}")]
    RootNotObject {
        /// Kind of node that was found at the root.
        found: String,
    },

    /// A `_required` directive was not a list of field names.
    #[error("Invalid _required directive at {path}: {reason}")]
    InvalidRequired {
        /// Dotted path of the object declaring the directive.
        path: String,
        /// Why the directive was rejected.
        reason: String,
    },

    /// A template failed to compile.
    #[error("Invalid template at {path}: {message}")]
    Template {
        /// Dotted path of the leaf holding the template.
        path: String,
        /// Compiler message.
        message: String,
    },

    /// A record type was referenced that the schema does not define.
    #[error("Unknown record type: {0}")]
    UnknownRecordType(String),
}

/// A template could not be rendered against a row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to render template '{template}': {message}")]
pub struct TemplateError {
    /// Template source.
    pub template: String,
    /// Renderer message.
    pub message: String,
}

/// Failures reported by a [`RecordStore`](crate::RecordStore) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The session could not be established or was rejected.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The addressed record or endpoint does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The store refused the request (validation, conflict, server error).
    #[error("Request rejected with status {status}: {message}")]
    Rejected {
        /// Status code reported by the store.
        status: u16,
        /// Response body or reason.
        message: String,
    },

    /// The request never completed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The response could not be understood.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// The operator interrupted the operation.
    #[error("Operation cancelled")]
    Cancelled,
}

impl StoreError {
    /// Returns true for failures that must not be swallowed by per-mapping
    /// error isolation.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, StoreError::Cancelled)
    }
}

/// Errors that abort a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The remote session is not valid; no rows were processed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The run was interrupted by the operator.
    #[error("Import cancelled")]
    Cancelled,

    /// Store failure outside per-mapping isolation (session check).
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// The schema could not be turned into a pipeline.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The worker pool could not be created.
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

/// Convenience alias for pipeline results.
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Rejected {
            status: 422,
            message: "name is required".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Request rejected with status 422: name is required"
        );
    }

    #[test]
    fn test_cancellation_detection() {
        assert!(StoreError::Cancelled.is_cancellation());
        assert!(!StoreError::Transport("reset".to_string()).is_cancellation());
    }

    #[test]
    fn test_sync_error_from_store() {
        let err: SyncError = StoreError::NotFound("person/7".to_string()).into();
        assert_eq!(err.to_string(), "Store error: Not found: person/7");
    }

    #[test]
    fn test_schema_error_display() {
        let err = SchemaError::Template {
            path: "person.name".to_string(),
            message: "unclosed expression".to_string(),
        };
        assert!(err.to_string().contains("person.name"));
    }

    #[test]
    fn test_errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncError>();
        assert_send_sync::<StoreError>();
        assert_send_sync::<TemplateError>();
    }
}
