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

//! Values produced by the mapping builder.

use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use std::collections::BTreeMap;

/// A built object: field name to value.
pub type Object = BTreeMap<String, Value>;

/// A value in a built object.
///
/// Rows only ever carry strings, so the builder produces strings, booleans
/// (coerced from `"true"`/`"false"`), nested objects and lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// String value.
    String(String),
    /// Boolean value.
    Bool(bool),
    /// Nested object.
    Object(Object),
    /// List of values.
    List(Vec<Value>),
}

impl Value {
    /// Truthiness used for pruning and `_required` checks.
    ///
    /// Empty strings, `false`, empty objects and empty lists are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::String(s) => !s.is_empty(),
            Self::Bool(b) => *b,
            Self::Object(o) => !o.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Try to get the value as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get the value as a nested object.
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Try to get the value as a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert to JSON, removing `_`-prefixed directive fields at every depth.
    pub fn to_payload(&self) -> JsonValue {
        match self {
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Object(o) => JsonValue::Object(payload(o)),
            Self::List(items) => JsonValue::Array(items.iter().map(Value::to_payload).collect()),
        }
    }

    /// Short name of the variant, used in log and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Object(_) => "object",
            Self::List(_) => "list",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Self::Object(o)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Bool(b) => write!(f, "{}", b),
            other => write!(f, "{}", other.to_payload()),
        }
    }
}

/// Coerce `"true"`/`"false"` (any ASCII casing) to a boolean.
pub fn coerce_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Returns true for directive field names (`_required`, `_lookup`, `_key`, ...).
pub fn is_directive(name: &str) -> bool {
    name.starts_with('_')
}

/// Build the JSON payload for an object: directive fields are never sent.
pub fn payload(object: &Object) -> JsonMap<String, JsonValue> {
    object
        .iter()
        .filter(|(k, _)| !is_directive(k))
        .map(|(k, v)| (k.clone(), v.to_payload()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truthiness() {
        assert!(!Value::from("").is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Object(Object::new()).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::List(vec![Value::from("a")]).is_truthy());
    }

    #[test]
    fn test_coerce_bool() {
        assert_eq!(coerce_bool("true"), Some(true));
        assert_eq!(coerce_bool("TRUE"), Some(true));
        assert_eq!(coerce_bool("False"), Some(false));
        assert_eq!(coerce_bool("yes"), None);
        assert_eq!(coerce_bool(""), None);
    }

    #[test]
    fn test_payload_strips_directives_recursively() {
        let mut location = Object::new();
        location.insert("city".to_string(), Value::from("Boston"));
        location.insert("_key".to_string(), Value::from("hq"));

        let mut obj = Object::new();
        obj.insert("name".to_string(), Value::from("Acme"));
        obj.insert("_key".to_string(), Value::from("acme"));
        obj.insert("active".to_string(), Value::Bool(true));
        obj.insert("location".to_string(), Value::Object(location));

        assert_eq!(
            JsonValue::Object(payload(&obj)),
            json!({"name": "Acme", "active": true, "location": {"city": "Boston"}})
        );
    }

    #[test]
    fn test_serialize_untagged() {
        let v = Value::List(vec![Value::from("a"), Value::Bool(false)]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"["a",false]"#);
    }
}
