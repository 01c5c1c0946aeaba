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

//! Mapping, diff and reconciliation engine for tabular record sync.
//!
//! Rows of named string columns are turned into nested objects by a
//! declarative schema, then reconciled with a remote [`RecordStore`]:
//! look the object up by a derived query, create it when absent, update it
//! when it differs, and leave it alone otherwise.
//!
//! # Building objects
//!
//! A [`Mapping`] compiles one schema tree. Leaves are either column names,
//! literals or Handlebars templates rendered against the row:
//!
//! - Directive fields (`_required`, `_lookup`, `_key`) steer the engine and
//!   are never sent to the store.
//! - Falsy values are pruned; an object missing a `_required` field builds
//!   to nothing.
//! - `"true"`/`"false"` (any case) become booleans.
//!
//! # Reconciling
//!
//! [`derive_query`] picks the lookup filter, [`diff`] compares a stored
//! record with a built object, and [`Upserter`] ties them together.
//! [`Pipeline`] runs every row through ordered [`Stage`]s, letting later
//! stages reference records created earlier in the same row through
//! `type[key]` handles.

mod cancel;
mod diff;
mod error;
mod mapping;
mod pipeline;
mod query;
mod row;
pub mod schema;
mod store;
pub mod template;
mod upsert;
mod value;

pub use cancel::CancelToken;
pub use diff::{diff, differs, Patch};
pub use error::{Result, SchemaError, StoreError, SyncError, TemplateError};
pub use mapping::Mapping;
pub use pipeline::{MappingOutcome, Pipeline, RowReport, Stage, Summary, WorkerConfig};
pub use query::{derive_query, flatten, Query, PATH_SEPARATOR};
pub use row::{handle_name, has_bracket_reference, Row};
pub use schema::{ObjectNode, SchemaNode};
pub use store::{record_id, RecordStore, RemoteRecord};
pub use upsert::{UpsertOutcome, Upserter};
pub use value::{coerce_bool, is_directive, payload, Object, Value};
