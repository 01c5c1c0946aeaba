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

//! Render command - show what a schema builds from each row

use super::{load_stages, read_input, reader_config};
use crate::error::CliError;
use recsync_core::schema::KEY;
use recsync_core::{handle_name, payload, Row, Stage, Value};
use recsync_csv::RowReader;
use serde_json::json;
use std::io::{self, BufWriter, Write};
use tracing::warn;

const STDOUT_NAME: &str = "<stdout>";

/// Print the objects built for each CSV row as JSON lines.
///
/// # Errors
///
/// Fails on unreadable input, an invalid schema, a malformed CSV record or
/// a write error on stdout.
pub fn render(
    schema: &str,
    csv: Option<&str>,
    order: &[String],
    delimiter: char,
    limit: Option<usize>,
) -> Result<(), CliError> {
    let stages = load_stages(schema, order)?;
    let input = read_input(csv)?;
    let reader = RowReader::new(input.as_bytes(), &reader_config(delimiter)?)?;

    let rows = reader
        .take(limit.unwrap_or(usize::MAX))
        .collect::<Result<Vec<_>, _>>()?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    render_rows(&stages, rows, &mut out)?;
    out.flush().map_err(|e| CliError::io_error(STDOUT_NAME, e))
}

/// Write one JSON line per row and mapping.
///
/// Each line holds `line`, `record_type`, `index` and `object`; `object`
/// is `null` when the row does not satisfy the mapping. Keyed objects
/// register their handle name as a stand-in id, so later references in
/// the same row render as `"type[key]"`.
pub fn render_rows<W: Write>(
    stages: &[Stage],
    rows: impl IntoIterator<Item = Row>,
    out: &mut W,
) -> Result<usize, CliError> {
    let mut written = 0;

    for mut row in rows {
        for stage in stages {
            for (index, mapping) in stage.mappings.iter().enumerate() {
                let object = match mapping.build(&row) {
                    Ok(object) => object,
                    Err(e) => {
                        warn!(record_type = %stage.record_type, line = ?row.line(), error = %e, "render failed");
                        continue;
                    }
                };

                if let Some(key) = object
                    .as_ref()
                    .and_then(|o| o.get(KEY))
                    .and_then(Value::as_str)
                    .filter(|k| !k.is_empty())
                {
                    let handle = handle_name(&stage.record_type, key);
                    row.set_handle(&stage.record_type, key, handle);
                }

                let line = json!({
                    "line": row.line(),
                    "record_type": stage.record_type,
                    "index": index,
                    "object": object.as_ref().map(payload),
                });
                serde_json::to_writer(&mut *out, &line)?;
                writeln!(out).map_err(|e| CliError::io_error(STDOUT_NAME, e))?;
                written += 1;
            }
        }
    }

    Ok(written)
}
