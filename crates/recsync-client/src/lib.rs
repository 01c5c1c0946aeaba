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

//! REST record store for recsync.
//!
//! [`RestStore`] implements [`RecordStore`](recsync_core::RecordStore)
//! against a customer-scoped JSON API using a blocking `reqwest` client:
//!
//! - `POST /api/{version}/login/` exchanges an email and password for a token
//! - `GET /api/{version}/customer/` lists the customers of the account
//! - `GET|POST /api/{version}/{customer}/{type}/` filters and creates
//! - `PUT /api/{version}/{customer}/{type}/{id}/` updates
//!
//! Every request carries the token in the `Authentication-Token` header.
//! List responses have the shape `{"data": [...], "has_more": bool}`.
//!
//! ```no_run
//! use recsync_client::{ClientConfig, Credentials, RestStore};
//!
//! let store = RestStore::connect(
//!     ClientConfig::default(),
//!     Credentials::Token("secret-token".to_string()),
//! )?;
//! println!("acting for customer {}", store.customer());
//! # Ok::<(), recsync_client::ClientError>(())
//! ```

mod config;
mod error;
mod store;

pub use config::{ClientConfig, Credentials, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::{ClientError, Result};
pub use store::{RestStore, AUTH_HEADER, LIMIT_PARAM};
