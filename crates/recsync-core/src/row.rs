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

//! Input rows and the row-local forward-reference table.

use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::BTreeMap;

/// One input row: column name to string value.
///
/// Besides its columns, a row carries a handle table filled in while the
/// pipeline processes it. When a mapping persists an object that declares
/// `_key`, the pipeline records `"<record_type>[<key>]" -> id` here, and
/// later mappings of the same row can refer to that string. The table never
/// outlives the row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    columns: BTreeMap<String, String>,
    handles: BTreeMap<String, String>,
    line: Option<usize>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the source line number, used in log messages.
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Source line number, if known.
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Set a column value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.columns.insert(column.into(), value.into());
    }

    /// Look up a column, then a handle.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.columns
            .get(name)
            .or_else(|| self.handles.get(name))
            .map(String::as_str)
    }

    /// Returns true if `name` is a column or a recorded handle.
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name) || self.handles.contains_key(name)
    }

    /// Record the id generated for a keyed object of `record_type`.
    pub fn set_handle(&mut self, record_type: &str, key: &str, id: impl Into<String>) {
        self.handles.insert(handle_name(record_type, key), id.into());
    }

    /// Look up a recorded handle.
    pub fn handle(&self, record_type: &str, key: &str) -> Option<&str> {
        self.handles
            .get(&handle_name(record_type, key))
            .map(String::as_str)
    }

    /// Columns of the row.
    pub fn columns(&self) -> &BTreeMap<String, String> {
        &self.columns
    }

    /// Handles recorded so far.
    pub fn handles(&self) -> &BTreeMap<String, String> {
        &self.handles
    }

    /// Returns true if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns and handles as a JSON object, the `row` variable of templates.
    pub fn to_context(&self) -> JsonValue {
        let mut map = JsonMap::new();
        for (k, v) in self.columns.iter().chain(self.handles.iter()) {
            map.entry(k.clone())
                .or_insert_with(|| JsonValue::String(v.clone()));
        }
        JsonValue::Object(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// Format the handle name for a keyed object: `type[key]`.
pub fn handle_name(record_type: &str, key: &str) -> String {
    format!("{}[{}]", record_type, key)
}

/// Returns true if `s` contains a `type[key]` bracket pattern.
pub fn has_bracket_reference(s: &str) -> bool {
    match s.find('[') {
        Some(open) if open > 0 => s[open + 1..].contains(']'),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_prefers_columns() {
        let mut row: Row = [("org[a]", "column")].into_iter().collect();
        row.set_handle("org", "a", "42");
        assert_eq!(row.get("org[a]"), Some("column"));
        assert_eq!(row.handle("org", "a"), Some("42"));
    }

    #[test]
    fn test_handles_resolve() {
        let mut row = Row::new();
        assert!(!row.contains("org[k]"));
        row.set_handle("org", "k", "7");
        assert!(row.contains("org[k]"));
        assert_eq!(row.get("org[k]"), Some("7"));
    }

    #[test]
    fn test_bracket_reference_detection() {
        assert!(has_bracket_reference("organization[acme]"));
        assert!(has_bracket_reference("person[{{x}}]"));
        assert!(!has_bracket_reference("[acme]"));
        assert!(!has_bracket_reference("org[acme"));
        assert!(!has_bracket_reference("plain"));
    }

    #[test]
    fn test_context_contains_handles() {
        let mut row: Row = [("name", "Acme")].into_iter().collect();
        row.set_handle("org", "k", "7");
        let ctx = row.to_context();
        assert_eq!(ctx["name"], "Acme");
        assert_eq!(ctx["org[k]"], "7");
    }
}
