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

//! Error types for CSV row reading.

use thiserror::Error;

/// CSV reading error types.
///
/// # Examples
///
/// ```
/// use recsync_csv::CsvError;
///
/// let err = CsvError::DuplicateHeader {
///     name: "email".to_string(),
///     position: 4,
/// };
///
/// assert_eq!(
///     err.to_string(),
///     "Duplicate header 'email' at position 4"
/// );
/// ```
#[derive(Debug, Error)]
pub enum CsvError {
    /// CSV parsing error at a specific line.
    ///
    /// ```
    /// use recsync_csv::CsvError;
    ///
    /// let err = CsvError::ParseError {
    ///     line: 42,
    ///     message: "invalid UTF-8".to_string(),
    /// };
    /// assert!(err.to_string().contains("line 42"));
    /// ```
    #[error("CSV parse error at line {line}: {message}")]
    ParseError {
        /// Line number where the error occurred (1-based).
        line: usize,
        /// Detailed error message.
        message: String,
    },

    /// Invalid header format or content.
    #[error("Invalid header at position {position}: {reason}")]
    InvalidHeader {
        /// Position of the invalid header (0-based).
        position: usize,
        /// Reason the header is invalid.
        reason: String,
    },

    /// The same column name appears twice.
    #[error("Duplicate header '{name}' at position {position}")]
    DuplicateHeader {
        /// Repeated column name.
        name: String,
        /// Position of the second occurrence (0-based).
        position: usize,
    },

    /// Row has wrong number of columns.
    ///
    /// ```
    /// use recsync_csv::CsvError;
    ///
    /// let err = CsvError::WidthMismatch {
    ///     expected: 5,
    ///     actual: 3,
    ///     line: 10,
    /// };
    /// assert!(err.to_string().contains("expected 5 columns"));
    /// ```
    #[error("Row width mismatch: expected {expected} columns, got {actual} at line {line}")]
    WidthMismatch {
        /// Expected number of columns.
        expected: usize,
        /// Actual number of columns in the row.
        actual: usize,
        /// Line where the row starts (1-based).
        line: usize,
    },

    /// I/O error during CSV reading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from underlying CSV library.
    #[error("CSV library error: {0}")]
    CsvLib(#[from] csv::Error),

    /// Row count exceeded security limit.
    ///
    /// ```
    /// use recsync_csv::CsvError;
    ///
    /// let err = CsvError::SecurityLimit {
    ///     limit: 1_000_000,
    ///     actual: 1_000_001,
    /// };
    /// assert!(err.to_string().contains("Security limit"));
    /// ```
    #[error("Security limit exceeded: row count {actual} exceeds maximum {limit}")]
    SecurityLimit {
        /// Maximum allowed rows.
        limit: usize,
        /// Actual row count encountered.
        actual: usize,
    },
}

/// Result type for CSV reading.
pub type Result<T> = std::result::Result<T, CsvError>;
