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

//! Canonical schemas and rows.
//!
//! The admissions fixture models three linked record types: an
//! organization, a person, and an applicant referencing both through
//! `type[key]` handles. The same schema is available as YAML and as
//! compiled [`Stage`]s, and the same rows as CSV and as [`Row`]s.

use recsync_core::{Row, SchemaNode, Stage};
use serde_json::{json, Value as JsonValue};

/// Admissions schema as a YAML document.
pub const ADMISSIONS_YAML: &str = r#"organization:
  name: org_name
  url: org_url
  _key: org
  _required: [name]
person:
  name:
    first: first_name
    last: last_name
  email: email
  _key: me
  _lookup:
    email: email
applicant:
  name: "{{row.first_name}} {{row.last_name}}"
  person: "person[me]"
  organization: "organization[org]"
  active: "true"
  _required: [person]
"#;

/// Admissions rows as CSV.
pub const ADMISSIONS_CSV: &str = "org_name,org_url,first_name,last_name,email
Acme,acme.test,Ada,Lovelace,ada@acme.test
Acme,acme.test,Grace,Hopper,grace@acme.test
Globex,,Alan,Turing,alan@globex.test
";

/// Record types of the admissions schema in dependency order.
pub const ADMISSIONS_ORDER: [&str; 3] = ["organization", "person", "applicant"];

/// Admissions schema trees keyed by record type.
pub fn admissions_schema() -> Vec<(&'static str, JsonValue)> {
    vec![
        (
            "organization",
            json!({
                "name": "org_name",
                "url": "org_url",
                "_key": "org",
                "_required": ["name"],
            }),
        ),
        (
            "person",
            json!({
                "name": {"first": "first_name", "last": "last_name"},
                "email": "email",
                "_key": "me",
                "_lookup": {"email": "email"},
            }),
        ),
        (
            "applicant",
            json!({
                "name": "{{row.first_name}} {{row.last_name}}",
                "person": "person[me]",
                "organization": "organization[org]",
                "active": "true",
                "_required": ["person"],
            }),
        ),
    ]
}

/// Compiled admissions stages in dependency order.
///
/// # Panics
///
/// Never for the built-in schema.
pub fn admissions_stages() -> Vec<Stage> {
    admissions_schema()
        .into_iter()
        .map(|(record_type, tree)| {
            let node = SchemaNode::from_json(&tree).expect("fixture schema is valid");
            Stage::compile(record_type, [node]).expect("fixture schema compiles")
        })
        .collect()
}

/// The rows of [`ADMISSIONS_CSV`], numbered from line 2.
pub fn admissions_rows() -> Vec<Row> {
    let header = ["org_name", "org_url", "first_name", "last_name", "email"];
    [
        ["Acme", "acme.test", "Ada", "Lovelace", "ada@acme.test"],
        ["Acme", "acme.test", "Grace", "Hopper", "grace@acme.test"],
        ["Globex", "", "Alan", "Turing", "alan@globex.test"],
    ]
    .iter()
    .enumerate()
    .map(|(i, values)| {
        let row: Row = header.iter().copied().zip(values.iter().copied()).collect();
        row.with_line(i + 2)
    })
    .collect()
}

/// Single-mapping schema with a nested object.
pub fn scenario_schema() -> JsonValue {
    json!({"name": "org_name", "location": {"city": "org_city"}})
}

/// Row satisfying [`scenario_schema`].
pub fn scenario_row() -> Row {
    [("org_name", "Acme"), ("org_city", "Boston")]
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_follow_order() {
        let stages = admissions_stages();
        let names: Vec<_> = stages.iter().map(|s| s.record_type.as_str()).collect();
        assert_eq!(names, ADMISSIONS_ORDER);
    }

    #[test]
    fn test_rows_match_csv() {
        let rows = admissions_rows();
        assert_eq!(rows.len(), ADMISSIONS_CSV.lines().count() - 1);
        assert_eq!(rows[2].get("org_url"), Some(""));
        assert_eq!(rows[0].line(), Some(2));
    }
}
