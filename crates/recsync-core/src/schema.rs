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

//! Declarative mapping schema.
//!
//! A schema tree mirrors the shape of the object it builds. Leaves hold
//! templates, objects hold named children, and lists hold item schemas.
//! Child names starting with `_` are directives:
//!
//! - `_required`: names of children that must be truthy after building.
//!   Parsed into [`ObjectNode::required`] and never built.
//! - `_lookup`: an alternate query, built like any other child.
//! - `_key`: the forward-reference handle for the built object.

use crate::error::SchemaError;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Name of the directive listing required children.
pub const REQUIRED: &str = "_required";
/// Name of the directive holding an alternate lookup query.
pub const LOOKUP: &str = "_lookup";
/// Name of the directive holding the forward-reference handle.
pub const KEY: &str = "_key";

/// A node in a mapping schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A scalar template.
    Leaf(String),
    /// A nested object.
    Object(ObjectNode),
    /// A list whose items are built independently.
    List(Vec<SchemaNode>),
}

/// An object node: ordered children plus the `_required` directive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectNode {
    /// Child schemas, including `_lookup` and `_key` when present.
    pub fields: BTreeMap<String, SchemaNode>,
    /// Children that must be truthy for the object to survive.
    pub required: Vec<String>,
}

impl ObjectNode {
    /// Create an empty object node.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a child (builder style).
    pub fn field(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        self.fields.insert(name.into(), node);
        self
    }

    /// Declare required children (builder style).
    pub fn require<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }
}

impl SchemaNode {
    /// Create a leaf node.
    pub fn leaf(template: impl Into<String>) -> Self {
        Self::Leaf(template.into())
    }

    /// Short name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Leaf(_) => "leaf",
            Self::Object(_) => "object",
            Self::List(_) => "list",
        }
    }

    /// Convert a JSON document into a schema tree.
    ///
    /// Strings, numbers and booleans become leaves holding their textual
    /// form; `null` becomes an empty leaf. `_required` must be a string or a
    /// list of strings.
    pub fn from_json(value: &JsonValue) -> Result<Self, SchemaError> {
        from_json_at(value, "$")
    }

    /// Visit every leaf template with its dotted path.
    pub fn for_each_leaf<F>(&self, path: &str, f: &mut F) -> Result<(), SchemaError>
    where
        F: FnMut(&str, &str) -> Result<(), SchemaError>,
    {
        match self {
            Self::Leaf(template) => f(path, template),
            Self::Object(obj) => {
                for (name, child) in &obj.fields {
                    child.for_each_leaf(&format!("{}.{}", path, name), f)?;
                }
                Ok(())
            }
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    item.for_each_leaf(&format!("{}[{}]", path, i), f)?;
                }
                Ok(())
            }
        }
    }
}

fn from_json_at(value: &JsonValue, path: &str) -> Result<SchemaNode, SchemaError> {
    match value {
        JsonValue::Null => Ok(SchemaNode::Leaf(String::new())),
        JsonValue::Bool(b) => Ok(SchemaNode::Leaf(b.to_string())),
        JsonValue::Number(n) => Ok(SchemaNode::Leaf(n.to_string())),
        JsonValue::String(s) => Ok(SchemaNode::Leaf(s.clone())),
        JsonValue::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| from_json_at(item, &format!("{}[{}]", path, i)))
            .collect::<Result<Vec<_>, _>>()
            .map(SchemaNode::List),
        JsonValue::Object(map) => {
            let mut node = ObjectNode::new();
            for (name, child) in map {
                let child_path = format!("{}.{}", path, name);
                if name == REQUIRED {
                    node.required = required_names(child, path)?;
                } else {
                    node.fields
                        .insert(name.clone(), from_json_at(child, &child_path)?);
                }
            }
            Ok(SchemaNode::Object(node))
        }
    }
}

fn required_names(value: &JsonValue, path: &str) -> Result<Vec<String>, SchemaError> {
    let invalid = |reason: &str| SchemaError::InvalidRequired {
        path: path.to_string(),
        reason: reason.to_string(),
    };
    match value {
        JsonValue::String(s) => Ok(vec![s.clone()]),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid("entries must be field names"))
            })
            .collect(),
        _ => Err(invalid("expected a field name or a list of field names")),
    }
}
