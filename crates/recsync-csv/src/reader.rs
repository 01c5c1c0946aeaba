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

//! Streaming CSV row reader

use crate::error::{CsvError, Result};
use recsync_core::Row;
use std::io::Read;

/// Default maximum number of rows to read.
///
/// Large enough for a full student information system export while still
/// bounding runaway input.
pub const DEFAULT_MAX_ROWS: usize = 10_000_000;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Configuration for reading rows.
///
/// # Examples
///
/// ```
/// use recsync_csv::ReaderConfig;
///
/// let config = ReaderConfig {
///     delimiter: b';',
///     trim: true,
///     ..Default::default()
/// };
/// assert_eq!(config.max_rows, recsync_csv::DEFAULT_MAX_ROWS);
/// assert!(!config.flexible);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Field delimiter character (default: `,`).
    pub delimiter: u8,
    /// Whether to trim leading/trailing whitespace from headers and fields
    /// (default: `false`).
    pub trim: bool,
    /// Maximum number of data rows (default: [`DEFAULT_MAX_ROWS`]).
    pub max_rows: usize,
    /// Accept rows whose width differs from the header (default: `false`).
    ///
    /// Missing trailing fields read as empty; extra fields are ignored.
    pub flexible: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: false,
            max_rows: DEFAULT_MAX_ROWS,
            flexible: false,
        }
    }
}

/// Iterator over the rows of a CSV source.
///
/// Column names come from the header record. Each row carries the line it
/// started on. Malformed records are yielded as errors without ending the
/// iteration; exceeding `max_rows` ends it.
///
/// # Examples
///
/// ```
/// use recsync_csv::{ReaderConfig, RowReader};
///
/// let data = "name,city\nAcme,Boston\n";
/// let reader = RowReader::new(data.as_bytes(), &ReaderConfig::default()).unwrap();
///
/// let rows: Vec<_> = reader.collect::<Result<_, _>>().unwrap();
/// assert_eq!(rows[0].get("city"), Some("Boston"));
/// assert_eq!(rows[0].line(), Some(2));
/// ```
pub struct RowReader<R> {
    records: csv::StringRecordsIntoIter<R>,
    headers: Vec<String>,
    max_rows: usize,
    rows_read: usize,
    finished: bool,
}

impl<R: Read> RowReader<R> {
    /// Read and validate the header record.
    ///
    /// # Errors
    ///
    /// Fails when the header is unreadable, empty, has an empty column name,
    /// or repeats a column name.
    pub fn new(reader: R, config: &ReaderConfig) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(config.delimiter)
            .has_headers(true)
            .flexible(config.flexible)
            .trim(if config.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .from_reader(reader);

        let headers = validate_headers(csv_reader.headers()?)?;

        Ok(Self {
            records: csv_reader.into_records(),
            headers,
            max_rows: config.max_rows,
            rows_read: 0,
            finished: false,
        })
    }

    /// Column names in file order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }
}

fn validate_headers(record: &csv::StringRecord) -> Result<Vec<String>> {
    let mut headers: Vec<String> = Vec::with_capacity(record.len());

    for (position, raw) in record.iter().enumerate() {
        let name = if position == 0 {
            raw.trim_start_matches(BYTE_ORDER_MARK)
        } else {
            raw
        };

        if name.trim().is_empty() {
            return Err(CsvError::InvalidHeader {
                position,
                reason: "empty column name".to_string(),
            });
        }
        if headers.iter().any(|h| h == name) {
            return Err(CsvError::DuplicateHeader {
                name: name.to_string(),
                position,
            });
        }
        headers.push(name.to_string());
    }

    if headers.is_empty() {
        return Err(CsvError::InvalidHeader {
            position: 0,
            reason: "no columns".to_string(),
        });
    }

    Ok(headers)
}

fn convert_error(err: csv::Error, fallback_line: usize) -> CsvError {
    let line = err
        .position()
        .map_or(fallback_line, |p| p.line() as usize);

    if let csv::ErrorKind::UnequalLengths {
        expected_len, len, ..
    } = err.kind()
    {
        return CsvError::WidthMismatch {
            expected: *expected_len as usize,
            actual: *len as usize,
            line,
        };
    }

    if matches!(err.kind(), csv::ErrorKind::Utf8 { .. }) {
        return CsvError::ParseError {
            line,
            message: err.to_string(),
        };
    }

    CsvError::CsvLib(err)
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(convert_error(e, self.rows_read + 2))),
        };

        // Security: Limit row count to prevent memory exhaustion
        if self.rows_read >= self.max_rows {
            self.finished = true;
            return Some(Err(CsvError::SecurityLimit {
                limit: self.max_rows,
                actual: self.rows_read + 1,
            }));
        }
        self.rows_read += 1;

        let line = record
            .position()
            .map_or(self.rows_read + 1, |p| p.line() as usize);
        let mut row = Row::new().with_line(line);
        for (i, name) in self.headers.iter().enumerate() {
            row.insert(name.as_str(), record.get(i).unwrap_or(""));
        }
        Some(Ok(row))
    }
}

/// Read every row of an in-memory CSV document.
///
/// # Examples
///
/// ```
/// use recsync_csv::{read_rows, ReaderConfig};
///
/// let rows = read_rows("a,b\n1,2\n3,4\n", &ReaderConfig::default()).unwrap();
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[1].get("b"), Some("4"));
/// ```
pub fn read_rows(csv: &str, config: &ReaderConfig) -> Result<Vec<Row>> {
    RowReader::new(csv.as_bytes(), config)?.collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bom_stripped() {
        let rows = read_rows("\u{feff}name,city\nAcme,Boston\n", &ReaderConfig::default()).unwrap();
        assert_eq!(rows[0].get("name"), Some("Acme"));
    }

    #[test]
    fn test_empty_header_rejected() {
        let err = read_rows("name,,city\n", &ReaderConfig::default()).unwrap_err();
        assert!(matches!(err, CsvError::InvalidHeader { position: 1, .. }));
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let err = read_rows("name,city,name\n", &ReaderConfig::default()).unwrap_err();
        match err {
            CsvError::DuplicateHeader { name, position } => {
                assert_eq!(name, "name");
                assert_eq!(position, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = read_rows("", &ReaderConfig::default()).unwrap_err();
        assert!(matches!(err, CsvError::InvalidHeader { .. }));
    }

    #[test]
    fn test_width_mismatch() {
        let mut reader =
            RowReader::new("a,b\n1,2\n3\n5,6\n".as_bytes(), &ReaderConfig::default()).unwrap();
        assert!(reader.next().unwrap().is_ok());
        let err = reader.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            CsvError::WidthMismatch {
                expected: 2,
                actual: 1,
                line: 3
            }
        ));
        assert_eq!(reader.next().unwrap().unwrap().get("a"), Some("5"));
    }

    #[test]
    fn test_flexible_fills_missing() {
        let config = ReaderConfig {
            flexible: true,
            ..Default::default()
        };
        let rows = read_rows("a,b\n1\n2,3,4\n", &config).unwrap();
        assert_eq!(rows[0].get("b"), Some(""));
        assert_eq!(rows[1].get("b"), Some("3"));
        assert_eq!(rows[1].columns().len(), 2);
    }

    #[test]
    fn test_trim() {
        let config = ReaderConfig {
            trim: true,
            ..Default::default()
        };
        let rows = read_rows(" name , city \n Acme , Boston \n", &config).unwrap();
        assert_eq!(rows[0].get("city"), Some("Boston"));
    }

    #[test]
    fn test_row_limit() {
        let config = ReaderConfig {
            max_rows: 2,
            ..Default::default()
        };
        let mut reader = RowReader::new("a\n1\n2\n3\n4\n".as_bytes(), &config).unwrap();
        assert!(reader.next().unwrap().is_ok());
        assert!(reader.next().unwrap().is_ok());
        assert!(matches!(
            reader.next().unwrap(),
            Err(CsvError::SecurityLimit { limit: 2, actual: 3 })
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_line_numbers_follow_quoted_newlines() {
        let rows = read_rows("a,b\n\"x\ny\",1\nz,2\n", &ReaderConfig::default()).unwrap();
        assert_eq!(rows[0].line(), Some(2));
        assert_eq!(rows[1].line(), Some(4));
    }
}
