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

//! Error types for the REST store.

use recsync_core::StoreError;
use thiserror::Error;

/// Errors raised while talking to the record API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The login endpoint refused the email and password.
    #[error("Login rejected ({status}): {message}")]
    LoginRejected { status: u16, message: String },

    /// The session token was refused.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The account can see no customers and none was configured.
    #[error("No customer available for this account")]
    NoCustomer,

    /// The addressed resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-success status.
    #[error("HTTP {status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    /// Connection, timeout or TLS failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// A response body was not the expected JSON.
    #[error("Invalid response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The client could not be configured.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<ClientError> for StoreError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::LoginRejected { message, .. } => StoreError::Authentication(message),
            ClientError::Unauthorized(message) => StoreError::Authentication(message),
            ClientError::NoCustomer => StoreError::Authentication(err.to_string()),
            ClientError::NotFound(what) => StoreError::NotFound(what),
            ClientError::Status {
                status, message, ..
            } => StoreError::Rejected { status, message },
            ClientError::Transport(message) | ClientError::InvalidConfig(message) => {
                StoreError::Transport(message)
            }
            ClientError::Decode { .. } => StoreError::Decode(err.to_string()),
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
