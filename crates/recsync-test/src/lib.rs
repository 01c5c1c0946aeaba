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

//! Shared test fixtures and an in-memory record store for recsync.
//!
//! # Quick Start
//!
//! ```rust
//! use recsync_core::Pipeline;
//! use recsync_test::{fixtures, MemoryStore, Operation};
//!
//! let store = MemoryStore::new();
//! let pipeline = Pipeline::new(&store, fixtures::admissions_stages()).unwrap();
//!
//! let summary = pipeline.run(fixtures::admissions_rows()).unwrap();
//! assert!(summary.is_clean());
//! assert_eq!(store.count(Operation::Update), 0);
//! ```

pub mod fixtures;
mod store;

pub use store::{Call, MemoryStore, Operation};
