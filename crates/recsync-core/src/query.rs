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

//! Deriving lookup queries from built objects.

use crate::schema::LOOKUP;
use crate::value::{Object, Value};
use std::collections::BTreeMap;

/// Separator joining nested field names in a query key.
pub const PATH_SEPARATOR: &str = "__";

/// A flat lookup filter: `__`-joined field path to value.
pub type Query = BTreeMap<String, Value>;

/// Derive the lookup query for a built object.
///
/// A truthy `name` is mandatory, even when `_lookup` is present, so a sparse
/// row never matches half the store. A structured name needs at least a
/// `first` or `last` part. The query is the flattened `_lookup` object when
/// there is one, otherwise the flattened `{name: ...}`.
///
/// # Examples
///
/// ```
/// use recsync_core::{derive_query, Object, Value};
///
/// let mut obj = Object::new();
/// obj.insert("name".to_string(), Value::from("Acme"));
/// let query = derive_query(&obj).unwrap();
/// assert_eq!(query["name"], Value::from("Acme"));
/// ```
pub fn derive_query(object: &Object) -> Option<Query> {
    let name = object.get("name").filter(|v| v.is_truthy())?;

    if let Value::Object(parts) = name {
        if !parts.contains_key("first") && !parts.contains_key("last") {
            return None;
        }
    }

    match object.get(LOOKUP) {
        Some(Value::Object(lookup)) if !lookup.is_empty() => Some(flatten(lookup)),
        _ => {
            let mut by_name = Object::new();
            by_name.insert("name".to_string(), name.clone());
            Some(flatten(&by_name))
        }
    }
}

/// Flatten nested objects into `__`-joined keys.
///
/// ```
/// use recsync_core::{flatten, Object, Value};
///
/// let mut inner = Object::new();
/// inner.insert("bar".to_string(), Value::from("baz"));
/// let mut outer = Object::new();
/// outer.insert("foo".to_string(), Value::Object(inner));
///
/// assert_eq!(flatten(&outer)["foo__bar"], Value::from("baz"));
/// ```
pub fn flatten(object: &Object) -> Query {
    let mut query = Query::new();
    flatten_into(object, None, &mut query);
    query
}

fn flatten_into(object: &Object, prefix: Option<&str>, query: &mut Query) {
    for (key, value) in object {
        let path = match prefix {
            Some(p) => format!("{}{}{}", p, PATH_SEPARATOR, key),
            None => key.clone(),
        };
        match value {
            Value::Object(nested) => flatten_into(nested, Some(&path), query),
            other => {
                query.insert(path, other.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(pairs: Vec<(&str, Value)>) -> Object {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_name_query() {
        let obj = object(vec![("name", "Acme".into()), ("url", "acme.test".into())]);
        let query = derive_query(&obj).unwrap();
        assert_eq!(query, object(vec![("name", "Acme".into())]));
    }

    #[test]
    fn test_missing_name() {
        let obj = object(vec![("url", "acme.test".into())]);
        assert_eq!(derive_query(&obj), None);
    }

    #[test]
    fn test_empty_name() {
        let obj = object(vec![("name", "".into())]);
        assert_eq!(derive_query(&obj), None);
    }

    #[test]
    fn test_name_required_even_with_lookup() {
        let lookup = object(vec![("ssn", "123".into())]);
        let obj = object(vec![("_lookup", Value::Object(lookup))]);
        assert_eq!(derive_query(&obj), None);
    }

    #[test]
    fn test_structured_name_needs_first_or_last() {
        let name = object(vec![("middle", "Q".into())]);
        let obj = object(vec![("name", Value::Object(name))]);
        assert_eq!(derive_query(&obj), None);

        let name = object(vec![("last", "Lovelace".into()), ("middle", "Q".into())]);
        let obj = object(vec![("name", Value::Object(name))]);
        let query = derive_query(&obj).unwrap();
        assert_eq!(query["name__last"], Value::from("Lovelace"));
        assert_eq!(query["name__middle"], Value::from("Q"));
    }

    #[test]
    fn test_lookup_overrides_name() {
        let b = object(vec![("b", "c".into())]);
        let lookup = object(vec![("a", Value::Object(b))]);
        let obj = object(vec![("name", "Acme".into()), ("_lookup", Value::Object(lookup))]);
        let query = derive_query(&obj).unwrap();
        assert_eq!(query, object(vec![("a__b", "c".into())]));
    }

    #[test]
    fn test_deep_flatten() {
        let c = object(vec![("c", "d".into())]);
        let b = object(vec![("b", Value::Object(c)), ("x", Value::Bool(true))]);
        let a = object(vec![("a", Value::Object(b))]);
        let query = flatten(&a);
        assert_eq!(query["a__b__c"], Value::from("d"));
        assert_eq!(query["a__x"], Value::Bool(true));
        assert_eq!(query.len(), 2);
    }
}
