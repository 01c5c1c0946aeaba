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

//! Error types for schema loading.

use recsync_core::SchemaError;
use thiserror::Error;

/// Errors that can occur while loading a YAML schema file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum YamlError {
    /// YAML parsing failed
    #[error("YAML parse error: {0}")]
    ParseError(String),

    /// Root element must be a mapping of record types
    #[error("Root must be a YAML mapping of record types, found {found}")]
    InvalidRootType { found: String },

    /// Non-string key encountered in mapping
    #[error("Non-string keys not supported, found {key_type} at path {path}")]
    NonStringKey { key_type: String, path: String },

    /// A record type maps to something other than a tree or a list of trees
    #[error("Record type {record_type} must map to a mapping or a list of mappings, found {found}")]
    InvalidRecordType { record_type: String, found: String },

    /// Maximum nesting depth exceeded
    #[error("Maximum nesting depth of {max_depth} exceeded at depth {actual_depth}")]
    MaxDepthExceeded {
        max_depth: usize,
        actual_depth: usize,
    },

    /// Document too large
    #[error("Document size {size} bytes exceeds maximum of {max_size} bytes")]
    DocumentTooLarge { size: usize, max_size: usize },

    /// The trees parsed but do not form a valid schema
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<serde_yaml::Error> for YamlError {
    fn from(err: serde_yaml::Error) -> Self {
        YamlError::ParseError(err.to_string())
    }
}

/// Result type for schema loading.
pub type Result<T> = std::result::Result<T, YamlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = YamlError::ParseError("invalid syntax".to_string());
        assert_eq!(err.to_string(), "YAML parse error: invalid syntax");
    }

    #[test]
    fn test_invalid_root_type_display() {
        let err = YamlError::InvalidRootType {
            found: "sequence".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Root must be a YAML mapping of record types, found sequence"
        );
    }

    #[test]
    fn test_invalid_record_type_display() {
        let err = YamlError::InvalidRecordType {
            record_type: "person".to_string(),
            found: "string".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Record type person must map to a mapping or a list of mappings, found string"
        );
    }

    #[test]
    fn test_max_depth_exceeded_display() {
        let err = YamlError::MaxDepthExceeded {
            max_depth: 100,
            actual_depth: 150,
        };
        assert_eq!(
            err.to_string(),
            "Maximum nesting depth of 100 exceeded at depth 150"
        );
    }

    #[test]
    fn test_document_too_large_display() {
        let err = YamlError::DocumentTooLarge {
            size: 20_000_000,
            max_size: 10_000_000,
        };
        assert_eq!(
            err.to_string(),
            "Document size 20000000 bytes exceeds maximum of 10000000 bytes"
        );
    }

    #[test]
    fn test_schema_error_is_transparent() {
        let err: YamlError = SchemaError::UnknownRecordType("course".to_string()).into();
        assert_eq!(
            err.to_string(),
            SchemaError::UnknownRecordType("course".to_string()).to_string()
        );
    }
}
