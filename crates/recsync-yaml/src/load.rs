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

//! YAML schema loading

use crate::error::{Result, YamlError};
use recsync_core::{SchemaError, SchemaNode, Stage};
use serde_json::{Map as JsonMap, Value as JsonValue};
use serde_yaml::Value as YamlValue;
use tracing::debug;

/// Default maximum document size: 16 MB
///
/// Schema files are hand-written configuration; anything near this size is
/// almost certainly the wrong file.
pub const DEFAULT_MAX_DOCUMENT_SIZE: usize = 16 * 1024 * 1024;

/// Default maximum nesting depth: 128 levels
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 128;

/// Configuration for schema loading
///
/// # Examples
///
/// ```rust
/// use recsync_yaml::SchemaConfig;
///
/// let config = SchemaConfig::builder()
///     .max_document_size(1024 * 1024)
///     .max_nesting_depth(32)
///     .build();
/// assert_eq!(config.max_nesting_depth, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConfig {
    /// Maximum allowed document size in bytes (default: 16 MB)
    pub max_document_size: usize,
    /// Maximum allowed nesting depth (default: 128 levels)
    pub max_nesting_depth: usize,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }
}

impl SchemaConfig {
    /// Creates a new builder for `SchemaConfig`.
    pub fn builder() -> SchemaConfigBuilder {
        SchemaConfigBuilder::new()
    }
}

/// Builder for [`SchemaConfig`].
#[derive(Debug, Clone)]
pub struct SchemaConfigBuilder {
    config: SchemaConfig,
}

impl SchemaConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            config: SchemaConfig::default(),
        }
    }

    /// Sets the maximum allowed document size in bytes.
    pub fn max_document_size(mut self, size: usize) -> Self {
        self.config.max_document_size = size;
        self
    }

    /// Sets the maximum allowed nesting depth.
    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.config.max_nesting_depth = depth;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> SchemaConfig {
        self.config
    }
}

impl Default for SchemaConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The schema trees of one record type.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    /// Remote record type.
    pub record_type: String,
    /// One tree per mapping, in document order.
    pub trees: Vec<SchemaNode>,
}

impl RecordSchema {
    /// Compile the trees into a pipeline stage.
    pub fn compile(&self) -> std::result::Result<Stage, SchemaError> {
        Stage::compile(self.record_type.clone(), self.trees.iter().cloned())
    }
}

/// A loaded schema file: record types in document order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SchemaFile {
    records: Vec<RecordSchema>,
}

impl SchemaFile {
    /// Record schemas in document order.
    pub fn records(&self) -> &[RecordSchema] {
        &self.records
    }

    /// Record types in document order.
    pub fn record_types(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.record_type.as_str())
    }

    /// Look up a record type.
    pub fn get(&self, record_type: &str) -> Option<&RecordSchema> {
        self.records.iter().find(|r| r.record_type == record_type)
    }

    /// Compile pipeline stages.
    ///
    /// Without an explicit `order` stages follow the document. With one,
    /// only the named record types run, in the given order.
    ///
    /// # Errors
    ///
    /// Fails when `order` names a record type the file does not define, or
    /// when a template does not compile.
    pub fn stages(&self, order: Option<&[String]>) -> Result<Vec<Stage>> {
        let selected: Vec<&RecordSchema> = match order {
            None => self.records.iter().collect(),
            Some(names) => names
                .iter()
                .map(|name| {
                    self.get(name)
                        .ok_or_else(|| SchemaError::UnknownRecordType(name.clone()))
                })
                .collect::<std::result::Result<_, _>>()?,
        };

        selected
            .into_iter()
            .map(|record| {
                debug!(
                    record_type = %record.record_type,
                    mappings = record.trees.len(),
                    "compiling stage"
                );
                record.compile().map_err(YamlError::from)
            })
            .collect()
    }
}

/// Load a schema file.
///
/// # Security
///
/// Enforces `max_document_size` before parsing and `max_nesting_depth`
/// during conversion.
///
/// # Examples
///
/// ```rust
/// use recsync_yaml::{load_schema, SchemaConfig};
///
/// let yaml = r#"
/// organization:
///   name: org_name
/// person:
///   - name: first_name
///   - name: second_name
/// "#;
///
/// let file = load_schema(yaml, &SchemaConfig::default()).unwrap();
/// let types: Vec<_> = file.record_types().collect();
/// assert_eq!(types, ["organization", "person"]);
/// assert_eq!(file.records()[1].trees.len(), 2);
/// ```
pub fn load_schema(yaml: &str, config: &SchemaConfig) -> Result<SchemaFile> {
    if yaml.len() > config.max_document_size {
        return Err(YamlError::DocumentTooLarge {
            size: yaml.len(),
            max_size: config.max_document_size,
        });
    }

    let value: YamlValue = serde_yaml::from_str(yaml)?;
    let root = match untag(&value) {
        YamlValue::Mapping(map) => map,
        other => {
            return Err(YamlError::InvalidRootType {
                found: yaml_kind(other).to_string(),
            })
        }
    };

    let mut records = Vec::with_capacity(root.len());
    for (key, value) in root {
        let record_type = string_key(key, "$")?;
        let path = format!("$.{}", record_type);

        let items: Vec<&YamlValue> = match untag(value) {
            YamlValue::Mapping(_) => vec![value],
            YamlValue::Sequence(seq) => seq.iter().collect(),
            other => {
                return Err(YamlError::InvalidRecordType {
                    record_type,
                    found: yaml_kind(other).to_string(),
                })
            }
        };

        let mut trees = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            if !matches!(untag(item), YamlValue::Mapping(_)) {
                return Err(YamlError::InvalidRecordType {
                    record_type,
                    found: format!("{} at index {}", yaml_kind(untag(item)), i),
                });
            }
            let json = to_json(item, &path, 1, config)?;
            trees.push(SchemaNode::from_json(&json)?);
        }

        records.push(RecordSchema { record_type, trees });
    }

    Ok(SchemaFile { records })
}

fn untag(value: &YamlValue) -> &YamlValue {
    match value {
        YamlValue::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

fn yaml_kind(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "boolean",
        YamlValue::Number(_) => "number",
        YamlValue::String(_) => "string",
        YamlValue::Sequence(_) => "sequence",
        YamlValue::Mapping(_) => "mapping",
        YamlValue::Tagged(_) => "tagged value",
    }
}

fn string_key(key: &YamlValue, path: &str) -> Result<String> {
    match untag(key) {
        YamlValue::String(s) => Ok(s.clone()),
        other => Err(YamlError::NonStringKey {
            key_type: yaml_kind(other).to_string(),
            path: path.to_string(),
        }),
    }
}

/// Convert to JSON, turning every scalar into its textual form.
fn to_json(value: &YamlValue, path: &str, depth: usize, config: &SchemaConfig) -> Result<JsonValue> {
    if depth > config.max_nesting_depth {
        return Err(YamlError::MaxDepthExceeded {
            max_depth: config.max_nesting_depth,
            actual_depth: depth,
        });
    }

    Ok(match untag(value) {
        YamlValue::Null => JsonValue::Null,
        YamlValue::Bool(b) => JsonValue::String(b.to_string()),
        YamlValue::Number(n) => JsonValue::String(n.to_string()),
        YamlValue::String(s) => JsonValue::String(s.clone()),
        YamlValue::Sequence(seq) => JsonValue::Array(
            seq.iter()
                .enumerate()
                .map(|(i, item)| to_json(item, &format!("{}[{}]", path, i), depth + 1, config))
                .collect::<Result<_>>()?,
        ),
        YamlValue::Mapping(map) => {
            let mut object = JsonMap::new();
            for (key, child) in map {
                let name = string_key(key, path)?;
                let child_path = format!("{}.{}", path, name);
                let converted = to_json(child, &child_path, depth + 1, config)?;
                object.insert(name, converted);
            }
            JsonValue::Object(object)
        }
        YamlValue::Tagged(_) => JsonValue::Null,
    })
}
