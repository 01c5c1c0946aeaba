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

//! CSV row source for recsync.
//!
//! Reads a CSV document with a header record into [`Row`](recsync_core::Row)
//! values, one per data record, keyed by header name.
//!
//! # Examples
//!
//! ```
//! use recsync_csv::{read_rows, ReaderConfig};
//!
//! let csv = "org_name,org_city\nAcme,Boston\n";
//! let rows = read_rows(csv, &ReaderConfig::default()).unwrap();
//! assert_eq!(rows[0].get("org_name"), Some("Acme"));
//! ```
//!
//! For large inputs use [`RowReader`] directly; it streams records and
//! can be handed to a pipeline as an iterator.

mod error;
mod reader;

pub use error::{CsvError, Result};
pub use reader::{read_rows, ReaderConfig, RowReader, DEFAULT_MAX_ROWS};
