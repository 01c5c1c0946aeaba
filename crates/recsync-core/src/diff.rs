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

//! Type-aware comparison of remote records against built objects.
//!
//! The diff decides whether a write is needed at all. It never proposes
//! deletions: a field the store holds but the mapping did not build is left
//! alone. Scalars are compared after coercing the remote value to the built
//! value's type, so `7` on the server matches `"7"` from a CSV cell and
//! `"TRUE"` matches `true`.

use crate::store::RemoteRecord;
use crate::value::{coerce_bool, is_directive, Object, Value};
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::BTreeMap;

/// Changed top-level fields mapped to their newly built values.
pub type Patch = BTreeMap<String, Value>;

/// Compute the fields of `built` that differ from `remote`.
///
/// An empty patch means the store already holds the built object.
///
/// # Examples
///
/// ```
/// use recsync_core::{diff, Object, Value};
/// use serde_json::json;
///
/// let remote = json!({"id": 7, "name": "Acme", "rank": 3});
/// let mut built = Object::new();
/// built.insert("name".to_string(), Value::from("Acme"));
/// built.insert("rank".to_string(), Value::from("3"));
///
/// assert!(diff(remote.as_object().unwrap(), &built).is_empty());
/// ```
pub fn diff(remote: &RemoteRecord, built: &Object) -> Patch {
    let mut patch = Patch::new();
    for (key, new) in built {
        if is_directive(key) {
            continue;
        }
        let changed = match remote.get(key) {
            Some(old) => differs(old, new),
            None => true,
        };
        if changed {
            patch.insert(key.clone(), new.clone());
        }
    }
    patch
}

fn nested_differs(old: &JsonMap<String, JsonValue>, new: &Object) -> bool {
    !diff(old, new).is_empty()
}

/// Returns true if the remote value does not match the built value.
pub fn differs(old: &JsonValue, new: &Value) -> bool {
    match (old, new) {
        (JsonValue::Object(o), Value::Object(n)) => nested_differs(o, n),
        (JsonValue::Array(o), Value::List(n)) => {
            o.len() != n.len() || o.iter().zip(n).any(|(a, b)| differs(a, b))
        }
        (_, Value::Object(_)) | (_, Value::List(_)) => true,
        (old, Value::String(s)) => !matches_str(old, s),
        (old, Value::Bool(b)) => remote_bool(old) != Some(*b),
    }
}

fn matches_str(old: &JsonValue, new: &str) -> bool {
    match old {
        JsonValue::String(o) => o == new,
        JsonValue::Number(n) => {
            if n.to_string() == new {
                return true;
            }
            match (n.as_f64(), new.trim().parse::<f64>()) {
                (Some(a), Ok(b)) => a == b,
                _ => false,
            }
        }
        JsonValue::Bool(b) => b.to_string() == new,
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => false,
    }
}

fn remote_bool(old: &JsonValue) -> Option<bool> {
    match old {
        JsonValue::Bool(b) => Some(*b),
        JsonValue::String(s) => coerce_bool(s),
        JsonValue::Number(n) => n.as_f64().map(|f| f != 0.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn remote(value: JsonValue) -> RemoteRecord {
        value.as_object().cloned().unwrap()
    }

    fn object(pairs: Vec<(&str, Value)>) -> Object {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_identical_is_empty() {
        let location = object(vec![("city", "Boston".into())]);
        let built = object(vec![
            ("name", "Acme".into()),
            ("location", Value::Object(location)),
            ("_key", "acme".into()),
        ]);
        let r = remote(json!({
            "id": "1",
            "name": "Acme",
            "location": {"city": "Boston", "state": "MA"},
            "_meta": {"created": "yesterday"},
        }));
        assert!(diff(&r, &built).is_empty());
    }

    #[test]
    fn test_changed_scalar_records_new_value() {
        let built = object(vec![("name", "Acme".into()), ("url", "new.test".into())]);
        let r = remote(json!({"name": "Acme", "url": "old.test"}));
        let patch = diff(&r, &built);
        assert_eq!(patch, object(vec![("url", "new.test".into())]));
    }

    #[test]
    fn test_added_field_records_new_value() {
        let built = object(vec![("name", "Acme".into()), ("url", "acme.test".into())]);
        let r = remote(json!({"name": "Acme"}));
        assert_eq!(diff(&r, &built), object(vec![("url", "acme.test".into())]));
    }

    #[test]
    fn test_nested_change_reports_top_level_field() {
        let location = object(vec![("city", "Akron".into())]);
        let built = object(vec![("location", Value::Object(location.clone()))]);
        let r = remote(json!({"location": {"city": "Boston", "state": "MA"}}));
        assert_eq!(
            diff(&r, &built),
            object(vec![("location", Value::Object(location))])
        );
    }

    #[test]
    fn test_number_coercion() {
        let built = object(vec![("year", "2012".into()), ("gpa", "3.50".into())]);
        let r = remote(json!({"year": 2012, "gpa": 3.5}));
        assert!(diff(&r, &built).is_empty());
    }

    #[test]
    fn test_bool_coercion() {
        let built = object(vec![("active", Value::Bool(true))]);
        assert!(diff(&remote(json!({"active": true})), &built).is_empty());
        assert!(diff(&remote(json!({"active": "True"})), &built).is_empty());
        assert!(!diff(&remote(json!({"active": false})), &built).is_empty());
    }

    #[test]
    fn test_null_remote_differs() {
        let built = object(vec![("url", "acme.test".into())]);
        assert!(!diff(&remote(json!({"url": null})), &built).is_empty());
    }

    #[test]
    fn test_lists_pairwise() {
        let built = object(vec![(
            "emails",
            Value::List(vec!["a@x".into(), "b@x".into()]),
        )]);
        assert!(diff(&remote(json!({"emails": ["a@x", "b@x"]})), &built).is_empty());
        assert!(!diff(&remote(json!({"emails": ["a@x", "c@x"]})), &built).is_empty());
        assert!(!diff(&remote(json!({"emails": ["a@x"]})), &built).is_empty());
        assert!(!diff(&remote(json!({"emails": []})), &built).is_empty());
    }

    #[test]
    fn test_list_of_objects_ignores_server_fields() {
        let phone = object(vec![("number", "555".into())]);
        let built = object(vec![("phones", Value::List(vec![Value::Object(phone)]))]);
        let r = remote(json!({"phones": [{"id": 3, "number": "555"}]}));
        assert!(diff(&r, &built).is_empty());
    }

    #[test]
    fn test_shape_mismatch_differs() {
        let location = object(vec![("city", "Boston".into())]);
        let built = object(vec![("location", Value::Object(location))]);
        assert!(!diff(&remote(json!({"location": "Boston"})), &built).is_empty());
    }
}
