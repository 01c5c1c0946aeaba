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

//! Building nested objects from a schema and a row.

use crate::error::{SchemaError, TemplateError};
use crate::row::Row;
use crate::schema::{ObjectNode, SchemaNode};
use crate::template::{FieldRole, TemplateEngine};
use crate::value::{Object, Value};

/// A compiled mapping: one schema tree plus its templates.
///
/// # Examples
///
/// ```
/// use recsync_core::{Mapping, Row, SchemaNode, Value};
/// use serde_json::json;
///
/// let schema = SchemaNode::from_json(&json!({
///     "name": "org_name",
///     "location": {"city": "org_city"},
/// })).unwrap();
/// let mapping = Mapping::new(schema).unwrap();
///
/// let row: Row = [("org_name", "Acme"), ("org_city", "Boston")].into_iter().collect();
/// let obj = mapping.build(&row).unwrap().unwrap();
/// assert_eq!(obj["name"], Value::from("Acme"));
/// ```
#[derive(Debug)]
pub struct Mapping {
    root: ObjectNode,
    engine: TemplateEngine,
}

impl Mapping {
    /// Compile a mapping. The root must be an object node.
    pub fn new(schema: SchemaNode) -> Result<Self, SchemaError> {
        let mut engine = TemplateEngine::new();
        schema.for_each_leaf("$", &mut |path, template| engine.compile(path, template))?;
        match schema {
            SchemaNode::Object(root) => Ok(Self { root, engine }),
            other => Err(SchemaError::RootNotObject {
                found: other.kind().to_string(),
            }),
        }
    }

    /// The root object schema.
    pub fn schema(&self) -> &ObjectNode {
        &self.root
    }

    /// Build the object for a row.
    ///
    /// Returns `Ok(None)` when the row does not satisfy the mapping: a
    /// `_required` field is missing, or nothing at all could be built.
    pub fn build(&self, row: &Row) -> Result<Option<Object>, TemplateError> {
        Ok(self.build_object(&self.root, row)?.filter(|obj| !obj.is_empty()))
    }

    fn build_node(
        &self,
        node: &SchemaNode,
        name: Option<&str>,
        row: &Row,
    ) -> Result<Option<Value>, TemplateError> {
        match node {
            SchemaNode::Leaf(template) => {
                self.engine.resolve(template, row, FieldRole::for_field(name))
            }
            SchemaNode::Object(obj) => Ok(self.build_object(obj, row)?.map(Value::Object)),
            SchemaNode::List(items) => self.build_list(items, name, row).map(Some),
        }
    }

    fn build_object(&self, node: &ObjectNode, row: &Row) -> Result<Option<Object>, TemplateError> {
        let mut built = Object::new();
        for (name, child) in &node.fields {
            if let Some(value) = self.build_node(child, Some(name), row)? {
                if value.is_truthy() {
                    built.insert(name.clone(), value);
                }
            }
        }

        let satisfied = node
            .required
            .iter()
            .all(|field| built.get(field).is_some_and(Value::is_truthy));
        Ok(satisfied.then_some(built))
    }

    fn build_list(
        &self,
        items: &[SchemaNode],
        name: Option<&str>,
        row: &Row,
    ) -> Result<Value, TemplateError> {
        let mut built = Vec::with_capacity(items.len());
        for item in items {
            if let Some(value) = self.build_node(item, name, row)? {
                if value.is_truthy() {
                    built.push(value);
                }
            }
        }
        Ok(Value::List(built))
    }
}
