//! Documents: JSON data bound to a [`Schema`], addressed by dotted paths.

use serde_json::{Map, Value};

use crate::accessor;
use crate::error::DocumentError;
use crate::path_utils::{join_path, parse_index, split_path};
use crate::schema::{FieldDef, Node, Schema, Virtual};
use crate::validation::{validate_fields, ValidationIssue};

/// A document instance of a schema.
///
/// Stored data is a JSON object; writes are checked against the schema,
/// reads are not. Virtual properties are reached through
/// [`Document::get_virtual`] and [`Document::set_virtual`].
#[derive(Debug, Clone)]
pub struct Document<'s> {
    schema: &'s Schema,
    data: Value,
}

impl<'s> Document<'s> {
    /// An empty document.
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            data: Value::Object(Map::new()),
        }
    }

    /// Wrap existing data. Values are not cast; use [`Document::validate`].
    pub fn from_value(schema: &'s Schema, data: Value) -> Result<Self, DocumentError> {
        if !data.is_object() {
            return Err(DocumentError::NotAnObject);
        }
        Ok(Self { schema, data })
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn to_value(&self) -> Value {
        self.data.clone()
    }

    pub fn into_value(self) -> Value {
        self.data
    }

    /// Stored value at `path`. Unset and `null` values read as `None`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.data;
        for segment in split_path(path) {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(parse_index(segment)?)?,
                _ => return None,
            };
        }
        (!current.is_null()).then_some(current)
    }

    /// Store `value` at the leaf field `path`, creating parent objects and
    /// sub-document array slots as needed. `null` unsets the field.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<(), DocumentError> {
        let value = value.into();
        let segments = split_path(path);
        let (def, indices) = resolve_field(self.schema, &segments)
            .ok_or_else(|| DocumentError::UnknownPath(path.to_string()))?;

        if !value.is_null() && !def.field_type.accepts(&value) {
            return Err(DocumentError::Cast {
                path: path.to_string(),
                expected: def.field_type.to_string(),
            });
        }

        *slot_mut(&mut self.data, &segments, &indices) = value;
        Ok(())
    }

    /// Read a virtual property, e.g. `name.default` or `chapters.0.title.i18n`.
    pub fn get_virtual(&self, path: &str) -> Result<Option<&Value>, DocumentError> {
        let (field, virt) = self.locate(path)?;
        Ok(match virt {
            Virtual::Default { .. } => accessor::get_default(self, &field),
            Virtual::I18n { .. } => accessor::get_i18n(self, &field),
        })
    }

    /// Write a virtual property. Only `.default` virtuals accept writes.
    pub fn set_virtual(&mut self, path: &str, value: impl Into<Value>) -> Result<(), DocumentError> {
        let (field, virt) = self.locate(path)?;
        match virt {
            Virtual::Default { .. } => accessor::set_default(self, &field, value),
            Virtual::I18n { .. } => Err(DocumentError::ReadOnlyVirtual(path.to_string())),
        }
    }

    /// Instance-level `getLanguages()`.
    pub fn get_languages(&self) -> Option<&'s [String]> {
        self.schema.get_languages()
    }

    /// Check required fields, types and the string/number options of every
    /// field, including inside embedded sub-documents.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        validate_fields(self.schema.fields(), self.data.as_object(), "", &mut issues);
        issues
    }

    fn locate(&self, path: &str) -> Result<(String, &'s Virtual), DocumentError> {
        let segments = split_path(path);
        locate_virtual(self.schema, &segments, "")
            .ok_or_else(|| DocumentError::UnknownVirtual(path.to_string()))
    }
}

/// Leaf definition at a document path, with one flag per segment telling
/// whether it indexes an embedded document array. Leaves must end the path.
fn resolve_field<'s>(
    schema: &'s Schema,
    segments: &[&str],
) -> Option<(&'s FieldDef, Vec<bool>)> {
    let mut fields = schema.fields();
    let mut indices = Vec::with_capacity(segments.len());
    let mut iter = segments.iter();
    while let Some(segment) = iter.next() {
        indices.push(false);
        match fields.get(segment)? {
            Node::Field(def) => return iter.next().is_none().then_some((def, indices)),
            Node::Nested(children) => fields = children,
            Node::Embedded(sub) => fields = sub.fields(),
            Node::EmbeddedArray(sub) => {
                parse_index(iter.next()?)?;
                indices.push(true);
                fields = sub.fields();
            }
        }
    }
    None
}

/// Find the virtual addressed by `segments`, searching the schema that owns
/// it. Returns the absolute path of the field it delegates to.
fn locate_virtual<'s>(
    schema: &'s Schema,
    segments: &[&str],
    owner: &str,
) -> Option<(String, &'s Virtual)> {
    if let Some(virt) = schema.virtual_at(&segments.join(".")) {
        return Some((join_path(owner, virt.field()), virt));
    }

    let mut fields = schema.fields();
    let mut walked = owner.to_string();
    for (i, segment) in segments.iter().enumerate() {
        walked = join_path(&walked, segment);
        match fields.get(segment)? {
            Node::Nested(children) => fields = children,
            Node::Embedded(sub) => return locate_virtual(sub, &segments[i + 1..], &walked),
            Node::EmbeddedArray(sub) => {
                let index = segments.get(i + 1)?;
                parse_index(index)?;
                return locate_virtual(sub, &segments[i + 2..], &join_path(&walked, index));
            }
            Node::Field(_) => return None,
        }
    }
    None
}

/// Mutable slot at `segments`, creating containers on the way. Only segments
/// flagged in `indices` address arrays; an unset array is padded with empty
/// objects up to the index.
fn slot_mut<'v>(root: &'v mut Value, segments: &[&str], indices: &[bool]) -> &'v mut Value {
    let mut current = root;
    for (segment, &is_index) in segments.iter().zip(indices) {
        let index = if is_index { parse_index(segment) } else { None };
        if index.is_some() && current.is_null() {
            *current = Value::Array(Vec::new());
        }
        if !(index.is_some() && current.is_array()) && !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = match (index, current) {
            (Some(i), Value::Array(items)) => {
                if items.len() <= i {
                    items.resize_with(i + 1, || Value::Object(Map::new()));
                }
                &mut items[i]
            }
            (_, Value::Object(map)) => map.entry(segment.to_string()).or_insert(Value::Null),
            (_, other) => other,
        };
    }
    current
}
