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

//! recsync CLI library for command-line parsing and execution.
//!
//! # Commands
//!
//! - **import**: map every CSV row through a schema and create or update
//!   the resulting records in the record API (or in a dry-run store)
//! - **render**: print the objects a schema builds from CSV rows as JSON
//!   lines, without contacting any store
//! - **check**: load and compile a schema, listing its record types
//!
//! # Examples
//!
//! ```no_run
//! use recsync_cli::commands::{check, import, ImportOptions};
//!
//! # fn main() -> Result<(), recsync_cli::error::CliError> {
//! check("admissions.yaml", &[])?;
//!
//! let report = import(&ImportOptions {
//!     csv: Some("applicants.csv".to_string()),
//!     dry_run: true,
//!     ..ImportOptions::new("admissions.yaml")
//! })?;
//! assert_eq!(report.rejected, 0);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod dry_run;
pub mod error;
pub mod report;
