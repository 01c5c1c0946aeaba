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

//! CLI command implementations

mod check;
mod import;
mod render;

pub use check::check;
pub use import::{import, ImportOptions};
pub use render::{render, render_rows};

use crate::error::CliError;
use recsync_core::Stage;
use recsync_csv::ReaderConfig;
use recsync_yaml::{load_schema, SchemaConfig};
use std::fs;
use std::io::{self, Read};

/// Default maximum input size (1 GB).
/// Can be overridden via the RECSYNC_MAX_FILE_SIZE environment variable.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

/// Name used for standard input in error messages.
pub const STDIN_NAME: &str = "<stdin>";

fn get_max_file_size() -> u64 {
    std::env::var("RECSYNC_MAX_FILE_SIZE")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_MAX_FILE_SIZE)
}

/// Read a file from disk with size validation.
///
/// Files larger than the configured maximum (`RECSYNC_MAX_FILE_SIZE`,
/// default 1 GB) are rejected before any content is read.
///
/// # Errors
///
/// Fails when the file is missing, too large, unreadable or not UTF-8.
pub fn read_file(path: &str) -> Result<String, CliError> {
    let metadata = fs::metadata(path).map_err(|e| CliError::io_error(path, e))?;

    let max_file_size = get_max_file_size();
    if metadata.len() > max_file_size {
        return Err(CliError::file_too_large(path, metadata.len(), max_file_size));
    }

    fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))
}

/// Read a file, or standard input when no path is given.
///
/// Standard input is held to the same size limit as files.
pub fn read_input(path: Option<&str>) -> Result<String, CliError> {
    match path {
        Some(path) => read_file(path),
        None => {
            let max_file_size = get_max_file_size();
            let mut content = String::new();
            io::stdin()
                .lock()
                .take(max_file_size.saturating_add(1))
                .read_to_string(&mut content)
                .map_err(|e| CliError::io_error(STDIN_NAME, e))?;

            let actual = content.len() as u64;
            if actual > max_file_size {
                return Err(CliError::file_too_large(STDIN_NAME, actual, max_file_size));
            }
            Ok(content)
        }
    }
}

/// Load a schema file and compile it into pipeline stages.
///
/// An empty `order` keeps the document order of the record types.
pub fn load_stages(path: &str, order: &[String]) -> Result<Vec<Stage>, CliError> {
    let content = read_file(path)?;
    let schema = load_schema(&content, &SchemaConfig::default())?;
    let order = (!order.is_empty()).then_some(order);
    Ok(schema.stages(order)?)
}

/// CSV reader settings for a single-character delimiter.
pub fn reader_config(delimiter: char) -> Result<ReaderConfig, CliError> {
    if !delimiter.is_ascii() {
        return Err(CliError::invalid_input(format!(
            "delimiter '{}' is not a single-byte ASCII character",
            delimiter
        )));
    }
    Ok(ReaderConfig {
        delimiter: delimiter as u8,
        ..ReaderConfig::default()
    })
}
