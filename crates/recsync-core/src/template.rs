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

//! Scalar template rendering.
//!
//! A leaf template is either a literal or, when it contains `{{`, a
//! Handlebars template rendered with the row bound to `row` and the `min`
//! and `max` helpers available:
//!
//! ```text
//! {{row.first_name}} {{row.[last name]}}
//! {{max row.score_a row.score_b}}
//! organization[{{row.school_code}}]
//! ```
//!
//! The rendered string is then resolved against the row: a column (or
//! handle) of that name yields the row's value, anything else is taken
//! literally. Schema authors can therefore write `name: org_name` to copy a
//! column or `country: USA` for a constant.

use crate::error::{SchemaError, TemplateError};
use crate::row::{has_bracket_reference, Row};
use crate::value::{coerce_bool, Value};
use handlebars::{handlebars_helper, no_escape, Handlebars};
use serde_json::{json, Value as JsonValue};
use std::cmp::Ordering;

/// Marker that switches a leaf from literal to template.
pub const DELIMITER: &str = "{{";

/// How a rendered leaf is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRole {
    /// Regular field: row lookup and boolean coercion apply.
    Value,
    /// `_key` field: the rendered literal is returned as is.
    Key,
}

impl FieldRole {
    /// Role of the field with the given name.
    pub fn for_field(name: Option<&str>) -> Self {
        match name {
            Some(crate::schema::KEY) => FieldRole::Key,
            _ => FieldRole::Value,
        }
    }
}

/// Returns true if the template needs rendering.
pub fn is_template(template: &str) -> bool {
    template.contains(DELIMITER)
}

handlebars_helper!(min_helper: |*args| extremum(&args, Ordering::Less));
handlebars_helper!(max_helper: |*args| extremum(&args, Ordering::Greater));

/// Pick the smallest or largest argument.
///
/// Arguments are compared numerically when every one of them parses as a
/// number, otherwise as strings. The chosen argument is returned unchanged
/// so its textual form survives rendering.
fn extremum(args: &[&JsonValue], want: Ordering) -> JsonValue {
    let numbers: Option<Vec<f64>> = args.iter().map(|v| as_number(v)).collect();
    let mut best: Option<usize> = None;
    for i in 0..args.len() {
        let better = match best {
            None => true,
            Some(b) => {
                let ord = match &numbers {
                    Some(n) => n[i].partial_cmp(&n[b]).unwrap_or(Ordering::Equal),
                    None => as_text(args[i]).cmp(&as_text(args[b])),
                };
                ord == want
            }
        };
        if better {
            best = Some(i);
        }
    }
    best.map(|i| args[i].clone()).unwrap_or(JsonValue::Null)
}

fn as_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Compiled templates of one mapping.
pub struct TemplateEngine {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("templates", &self.registry.get_templates().len())
            .finish()
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    /// Create an engine with the `min`/`max` helpers and no HTML escaping.
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(no_escape);
        registry.register_helper("min", Box::new(min_helper));
        registry.register_helper("max", Box::new(max_helper));
        Self { registry }
    }

    /// Compile a template ahead of rendering. Literals are ignored.
    pub fn compile(&mut self, path: &str, template: &str) -> Result<(), SchemaError> {
        if !is_template(template) || self.registry.has_template(template) {
            return Ok(());
        }
        self.registry
            .register_template_string(template, template)
            .map_err(|e| SchemaError::Template {
                path: path.to_string(),
                message: e.to_string(),
            })
    }

    /// Render a template against a row. Literals are returned unchanged.
    pub fn render(&self, template: &str, row: &Row) -> Result<String, TemplateError> {
        if !is_template(template) {
            return Ok(template.to_string());
        }
        let data = json!({ "row": row.to_context() });
        let rendered = if self.registry.has_template(template) {
            self.registry.render(template, &data)
        } else {
            self.registry.render_template(template, &data)
        };
        rendered.map_err(|e| TemplateError {
            template: template.to_string(),
            message: e.to_string(),
        })
    }

    /// Render and resolve a leaf.
    ///
    /// Returns `Ok(None)` when the rendered string is a `type[key]` reference
    /// the row cannot resolve yet, so the field is dropped instead of being
    /// submitted as a dangling reference.
    pub fn resolve(
        &self,
        template: &str,
        row: &Row,
        role: FieldRole,
    ) -> Result<Option<Value>, TemplateError> {
        let rendered = self.render(template, row)?;

        if has_bracket_reference(&rendered) && !row.contains(&rendered) {
            return Ok(None);
        }

        if role == FieldRole::Key {
            return Ok(Some(Value::String(rendered)));
        }

        let resolved = match row.get(&rendered) {
            Some(value) => value.to_string(),
            None => rendered,
        };

        Ok(Some(match coerce_bool(&resolved) {
            Some(b) => Value::Bool(b),
            None => Value::String(resolved),
        }))
    }
}
