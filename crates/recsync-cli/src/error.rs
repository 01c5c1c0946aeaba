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

//! Structured error types for the recsync CLI.
//!
//! Every command returns `Result<T, CliError>`; the binary prints the
//! error's display form and exits with a failure status.

use recsync_client::ClientError;
use recsync_core::SyncError;
use recsync_csv::CsvError;
use recsync_yaml::YamlError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while running a CLI command.
///
/// Implements `Clone` so failures can be collected from worker threads.
#[derive(Error, Debug, Clone)]
pub enum CliError {
    /// Reading an input failed.
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The file path that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// Input exceeds the configured size limit.
    #[error("File '{path}' is too large ({actual} bytes). Maximum allowed: {max} bytes ({max_mb} MB)")]
    FileTooLarge {
        /// The file path that exceeded the limit
        path: PathBuf,
        /// The actual file size in bytes
        actual: u64,
        /// The maximum allowed file size in bytes
        max: u64,
        /// The maximum allowed file size in MB (for display)
        max_mb: u64,
    },

    /// The schema file could not be loaded or compiled.
    #[error("Schema error: {0}")]
    Schema(String),

    /// The CSV input was malformed.
    #[error("CSV error: {0}")]
    Csv(String),

    /// The record API could not be reached or refused the session.
    #[error("Client error: {0}")]
    Client(String),

    /// The import stopped.
    #[error("Sync error: {0}")]
    Sync(String),

    /// The run finished but some rows or mappings failed.
    #[error("Import finished with {errored} failed mapping(s) and {rejected} rejected row(s)")]
    Incomplete {
        /// Mappings abandoned on a render or store failure
        errored: usize,
        /// CSV records that could not be read
        rejected: usize,
    },

    /// Invalid command-line input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Create an I/O error with path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create a file-too-large error.
    ///
    /// ```
    /// use recsync_cli::error::CliError;
    ///
    /// let err = CliError::file_too_large("rows.csv", 3_000_000, 1024 * 1024);
    /// assert!(err.to_string().contains("1 MB"));
    /// ```
    pub fn file_too_large(path: impl Into<PathBuf>, actual: u64, max: u64) -> Self {
        Self::FileTooLarge {
            path: path.into(),
            actual,
            max,
            max_mb: max / (1024 * 1024),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl From<YamlError> for CliError {
    fn from(source: YamlError) -> Self {
        Self::Schema(source.to_string())
    }
}

impl From<CsvError> for CliError {
    fn from(source: CsvError) -> Self {
        Self::Csv(source.to_string())
    }
}

impl From<ClientError> for CliError {
    fn from(source: ClientError) -> Self {
        Self::Client(source.to_string())
    }
}

impl From<SyncError> for CliError {
    fn from(source: SyncError) -> Self {
        Self::Sync(source.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(source: serde_json::Error) -> Self {
        Self::InvalidInput(source.to_string())
    }
}
