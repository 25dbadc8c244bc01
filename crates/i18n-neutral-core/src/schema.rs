//! In-memory document schema: an ordered tree of named nodes.
//!
//! A [`Schema`] owns a [`Fields`] tree, the virtual properties registered on
//! it and, once the i18n plugin ran, the plugin options. Every node is
//! addressable by a dotted path; removal and insertion are plain tree
//! operations so that rewrites can be expressed (and tested) step by step.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::I18nOptions;
use crate::error::I18nError;
use crate::path_utils::{join_path, split_path};

// ---------------------------------------------------------------------------
// Field types and definitions
// ---------------------------------------------------------------------------

/// Scalar and array types a leaf field can declare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    ObjectId,
    Buffer,
    Mixed,
    Array(Box<FieldType>),
}

impl FieldType {
    /// Look up a type by its definition name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name.to_ascii_lowercase().as_str() {
            "string" => FieldType::String,
            "number" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "date" => FieldType::Date,
            "objectid" => FieldType::ObjectId,
            "buffer" => FieldType::Buffer,
            "mixed" => FieldType::Mixed,
            _ => return None,
        };
        Some(ty)
    }

    /// Definition form of the type: a name, or a one-element array for arrays.
    pub fn to_definition(&self) -> Value {
        match self {
            FieldType::Array(inner) => Value::Array(vec![inner.to_definition()]),
            other => Value::String(other.to_string()),
        }
    }

    /// Whether `value` can be stored in a field of this type without a cast.
    ///
    /// Dates are stored as ISO-8601 strings or epoch milliseconds, object ids
    /// as 24-digit hex strings and buffers as byte arrays.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Date => value.is_string() || value.is_i64() || value.is_u64(),
            FieldType::ObjectId => value
                .as_str()
                .is_some_and(|s| s.len() == 24 && s.bytes().all(|b| b.is_ascii_hexdigit())),
            FieldType::Buffer => value
                .as_array()
                .is_some_and(|bytes| bytes.iter().all(|b| b.as_u64().is_some_and(|n| n <= 255))),
            FieldType::Mixed => true,
            FieldType::Array(inner) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| item.is_null() || inner.accepts(item))),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => f.write_str("String"),
            FieldType::Number => f.write_str("Number"),
            FieldType::Boolean => f.write_str("Boolean"),
            FieldType::Date => f.write_str("Date"),
            FieldType::ObjectId => f.write_str("ObjectId"),
            FieldType::Buffer => f.write_str("Buffer"),
            FieldType::Mixed => f.write_str("Mixed"),
            FieldType::Array(inner) => write!(f, "[{inner}]"),
        }
    }
}

/// A leaf field: its type plus every option given in the definition.
///
/// Options are kept verbatim (`required`, `default`, `maxlength`, `i18n`, ...)
/// so that a rewrite can carry them over to the fields it generates.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub field_type: FieldType,
    pub options: Map<String, Value>,
}

impl FieldDef {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            options: Map::new(),
        }
    }

    /// Builder-style option setter.
    pub fn with_option(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        self.options.get(key)
    }

    pub fn is_required(&self) -> bool {
        self.flag("required")
    }

    /// Whether the field carries the internationalization marker.
    pub fn is_i18n(&self) -> bool {
        self.flag("i18n")
    }

    fn flag(&self, key: &str) -> bool {
        matches!(self.options.get(key), Some(Value::Bool(true)))
    }
}

// ---------------------------------------------------------------------------
// Tree nodes
// ---------------------------------------------------------------------------

/// A node in the schema tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A typed leaf.
    Field(FieldDef),
    /// A plain nested object path. Its children belong to the same schema.
    Nested(Fields),
    /// A single embedded sub-document with its own schema.
    Embedded(Box<Schema>),
    /// An array of embedded sub-documents sharing one schema.
    EmbeddedArray(Box<Schema>),
}

impl Node {
    /// The sub-schema of an embedded node, if any.
    pub fn sub_schema(&self) -> Option<&Schema> {
        match self {
            Node::Embedded(schema) | Node::EmbeddedArray(schema) => Some(schema),
            _ => None,
        }
    }
}

/// Ordered map of child name to node.
///
/// Insertion order is definition order; replacing an existing name keeps its
/// position, removing a name shifts the following entries up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields {
    entries: Vec<(String, Node)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.position(name).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.position(name).map(move |i| &mut self.entries[i].1)
    }

    /// Insert or replace `name`. Returns the previous node when replacing.
    pub fn insert(&mut self, name: impl Into<String>, node: Node) -> Option<Node> {
        let name = name.into();
        match self.position(&name) {
            Some(i) => Some(std::mem::replace(&mut self.entries[i].1, node)),
            None => {
                self.entries.push((name, node));
                None
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }
}

impl<S: Into<String>> FromIterator<(S, Node)> for Fields {
    fn from_iter<T: IntoIterator<Item = (S, Node)>>(iter: T) -> Self {
        let mut fields = Fields::new();
        for (name, node) in iter {
            fields.insert(name, node);
        }
        fields
    }
}

// ---------------------------------------------------------------------------
// Virtual properties
// ---------------------------------------------------------------------------

/// A computed property registered on a schema. Holds no data; reads and
/// writes are delegated to stored sub-fields of `field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Virtual {
    /// `<field>.default`: reads and writes `<field>._def`.
    Default { path: String, field: String },
    /// `<field>.i18n`: read-only view of the whole nested value at `<field>`.
    I18n { path: String, field: String },
}

impl Virtual {
    /// Path the virtual is exposed at, relative to its schema.
    pub fn path(&self) -> &str {
        match self {
            Virtual::Default { path, .. } | Virtual::I18n { path, .. } => path,
        }
    }

    /// Stored field the virtual delegates to, relative to its schema.
    pub fn field(&self) -> &str {
        match self {
            Virtual::Default { field, .. } | Virtual::I18n { field, .. } => field,
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Virtual::I18n { .. })
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// A document schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Fields,
    virtuals: Vec<Virtual>,
    i18n: Option<I18nOptions>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(fields: Fields) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Fields {
        &mut self.fields
    }

    /// Node at a dotted schema path.
    ///
    /// Descends through nested paths and into embedded sub-schemas; schema
    /// paths never carry array indices.
    pub fn path(&self, path: &str) -> Option<&Node> {
        let segments = split_path(path);
        let (last, parents) = segments.split_last()?;
        let mut fields = &self.fields;
        for segment in parents {
            fields = match fields.get(segment)? {
                Node::Nested(children) => children,
                Node::Embedded(sub) | Node::EmbeddedArray(sub) => &sub.fields,
                Node::Field(_) => return None,
            };
        }
        fields.get(last)
    }

    /// Mutable node at a dotted schema path. Follows the same route as
    /// [`Schema::path`].
    pub fn path_mut(&mut self, path: &str) -> Option<&mut Node> {
        let segments = split_path(path);
        let (last, parents) = segments.split_last()?;
        let mut fields = &mut self.fields;
        for segment in parents {
            fields = match fields.get_mut(segment)? {
                Node::Nested(children) => children,
                Node::Embedded(sub) | Node::EmbeddedArray(sub) => &mut sub.fields,
                Node::Field(_) => return None,
            };
        }
        fields.get_mut(last)
    }

    /// Add `node` as `name` under the nested `prefix` (empty for the root),
    /// creating intermediate nested paths as needed. Replaces an existing
    /// node of the same name in place.
    pub fn add(&mut self, prefix: &str, name: &str, node: Node) -> Result<(), I18nError> {
        let mut fields = &mut self.fields;
        let mut walked = String::new();
        for segment in split_path(prefix) {
            walked = join_path(&walked, segment);
            if !fields.contains(segment) {
                fields.insert(segment, Node::Nested(Fields::new()));
            }
            fields = match fields.get_mut(segment) {
                Some(Node::Nested(children)) => children,
                _ => {
                    return Err(I18nError::Definition {
                        path: walked,
                        message: "cannot add a field under a non-nested path".to_string(),
                    })
                }
            };
        }
        fields.insert(name, node);
        Ok(())
    }

    /// Every leaf and embedded path of this schema, depth-first in definition
    /// order. Nested paths are walked through, not listed; embedded
    /// sub-schemas are listed but not entered.
    pub fn each_path(&self) -> Vec<(String, &Node)> {
        let mut out = Vec::new();
        collect_paths(&self.fields, "", &mut out);
        out
    }

    pub fn virtuals(&self) -> &[Virtual] {
        &self.virtuals
    }

    pub fn virtual_at(&self, path: &str) -> Option<&Virtual> {
        self.virtuals.iter().find(|v| v.path() == path)
    }

    /// Register a virtual, replacing any virtual already at the same path.
    pub fn add_virtual(&mut self, virt: Virtual) {
        self.virtuals.retain(|v| v.path() != virt.path());
        self.virtuals.push(virt);
    }

    /// Options recorded when the i18n plugin was applied.
    pub fn i18n_options(&self) -> Option<&I18nOptions> {
        self.i18n.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.i18n.is_some()
    }

    pub(crate) fn set_i18n_options(&mut self, options: I18nOptions) {
        self.i18n = Some(options);
    }

    /// Model-level `getLanguages()`: the configured languages, in order.
    pub fn get_languages(&self) -> Option<&[String]> {
        self.i18n.as_ref().map(|opts| opts.languages.as_slice())
    }
}

fn collect_paths<'a>(fields: &'a Fields, prefix: &str, out: &mut Vec<(String, &'a Node)>) {
    for (name, node) in fields.iter() {
        let path = join_path(prefix, name);
        match node {
            Node::Nested(children) => collect_paths(children, &path, out),
            _ => out.push((path, node)),
        }
    }
}
