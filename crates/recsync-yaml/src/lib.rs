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

//! Recsync YAML Schemas
//!
//! Loads mapping schemas from YAML. The top-level keys of a schema file are
//! record types; each maps to one schema tree or a list of trees.
//!
//! # Schema Files
//!
//! ```yaml
//! organization:
//!   name: org_name
//!   _key: org
//! applicant:
//!   name: "{{row.first}} {{row.last}}"
//!   organization: "organization[org]"
//!   _required: [organization]
//! ```
//!
//! Scalars are kept as text, so `3` and `true` become the leaf templates
//! `"3"` and `"true"`. A null value becomes an empty leaf and builds to
//! nothing.
//!
//! # Examples
//!
//! ```rust
//! use recsync_yaml::{load_schema, SchemaConfig};
//!
//! let yaml = "organization:\n  name: org_name\n";
//! let file = load_schema(yaml, &SchemaConfig::default()).unwrap();
//!
//! let stages = file.stages(None).unwrap();
//! assert_eq!(stages[0].record_type, "organization");
//! ```

mod error;
mod load;

pub use error::{Result, YamlError};
pub use load::{
    load_schema, RecordSchema, SchemaConfig, SchemaConfigBuilder, SchemaFile,
    DEFAULT_MAX_DOCUMENT_SIZE, DEFAULT_MAX_NESTING_DEPTH,
};
