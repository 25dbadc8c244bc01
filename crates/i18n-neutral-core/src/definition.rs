//! JSON schema definitions: parsing into a [`Schema`] tree and back.
//!
//! The format mirrors what document mappers accept in code:
//!
//! | Definition                                | Node                         |
//! |-------------------------------------------|------------------------------|
//! | `"String"`                                | field                        |
//! | `{ "type": "String", ...options }`        | field with options           |
//! | `["Number"]`, `{ "type": ["Number"] }`    | array field                  |
//! | `{ "schema": { ... } }`                   | embedded sub-document        |
//! | `[ { ... } ]`                             | array of embedded documents  |
//! | any other object                          | nested path                  |
//!
//! Output is always the long form, in definition order.

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::I18nError;
use crate::path_utils::join_path;
use crate::schema::{FieldDef, FieldType, Fields, Node, Schema};

/// Key marking an embedded sub-schema in a definition object.
const SCHEMA_KEY: &str = "schema";
const TYPE_KEY: &str = "type";

impl Schema {
    /// Parse a schema definition object.
    pub fn from_definition(definition: &Value) -> Result<Self, I18nError> {
        parse_schema(definition, "")
    }

    /// Parse a schema definition from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, I18nError> {
        let definition: Value = serde_json::from_str(json)?;
        Self::from_definition(&definition)
    }

    /// Render the schema tree back to definition form.
    ///
    /// Virtuals and plugin options are not part of a definition; see
    /// [`crate::Manifest`] for those.
    pub fn to_definition(&self) -> Value {
        fields_to_definition(self.fields())
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn parse_schema(definition: &Value, path: &str) -> Result<Schema, I18nError> {
    let obj = definition
        .as_object()
        .ok_or_else(|| definition_error(path, "schema definition must be a JSON object"))?;
    Ok(Schema::with_fields(parse_fields(obj, path)?))
}

fn parse_fields(obj: &Map<String, Value>, prefix: &str) -> Result<Fields, I18nError> {
    let mut fields = Fields::new();
    for (name, value) in obj {
        if name.is_empty() || name.contains('.') {
            return Err(definition_error(
                prefix,
                &format!("invalid field name `{name}`"),
            ));
        }
        let path = join_path(prefix, name);
        fields.insert(name.as_str(), parse_node(value, &path)?);
    }
    Ok(fields)
}

fn parse_node(value: &Value, path: &str) -> Result<Node, I18nError> {
    match value {
        Value::String(name) => Ok(Node::Field(FieldDef::new(parse_type_name(name, path)?))),
        Value::Array(items) => parse_array(items, path),
        Value::Object(obj) => {
            if let Some(sub) = obj.get(SCHEMA_KEY) {
                return Ok(Node::Embedded(Box::new(parse_schema(sub, path)?)));
            }
            match obj.get(TYPE_KEY) {
                Some(Value::String(name)) => {
                    let field_type = parse_type_name(name, path)?;
                    parse_field(field_type, obj, path)
                }
                Some(Value::Array(items)) => {
                    let field_type = FieldType::Array(Box::new(parse_array_item_type(items, path)?));
                    parse_field(field_type, obj, path)
                }
                _ => Ok(Node::Nested(parse_fields(obj, path)?)),
            }
        }
        other => Err(definition_error(
            path,
            &format!("invalid field definition {other}"),
        )),
    }
}

fn parse_field(
    field_type: FieldType,
    obj: &Map<String, Value>,
    path: &str,
) -> Result<Node, I18nError> {
    let mut def = FieldDef::new(field_type);
    for (key, value) in obj {
        if key != TYPE_KEY {
            def.options.insert(key.clone(), value.clone());
        }
    }
    if let Some(marker) = def.option("i18n") {
        if !marker.is_boolean() {
            return Err(definition_error(
                path,
                &format!("`i18n` must be a boolean, got {marker}"),
            ));
        }
    }
    if let Some(pattern) = def.option("match") {
        let pattern = pattern
            .as_str()
            .ok_or_else(|| definition_error(path, "`match` must be a string pattern"))?;
        Regex::new(pattern)
            .map_err(|e| definition_error(path, &format!("invalid `match` pattern: {e}")))?;
    }
    Ok(Node::Field(def))
}

/// `[]` is an array of mixed values, `["T"]` an array of `T`, `[{...}]` an
/// array of embedded documents unless the object is itself a typed field.
fn parse_array(items: &[Value], path: &str) -> Result<Node, I18nError> {
    match items {
        [Value::Object(obj)] if !obj.contains_key(TYPE_KEY) => {
            Ok(Node::EmbeddedArray(Box::new(parse_schema(&items[0], path)?)))
        }
        _ => Ok(Node::Field(FieldDef::new(FieldType::Array(Box::new(
            parse_array_item_type(items, path)?,
        ))))),
    }
}

fn parse_array_item_type(items: &[Value], path: &str) -> Result<FieldType, I18nError> {
    match items {
        [] => Ok(FieldType::Mixed),
        [Value::String(name)] => parse_type_name(name, path),
        [Value::Object(obj)] => match obj.get(TYPE_KEY) {
            Some(Value::String(name)) => parse_type_name(name, path),
            _ => Err(definition_error(path, "array item must declare a type")),
        },
        [Value::Array(inner)] => Ok(FieldType::Array(Box::new(parse_array_item_type(
            inner, path,
        )?))),
        _ => Err(definition_error(
            path,
            "array definitions take exactly one item type",
        )),
    }
}

fn parse_type_name(name: &str, path: &str) -> Result<FieldType, I18nError> {
    FieldType::from_name(name)
        .ok_or_else(|| definition_error(path, &format!("unknown type `{name}`")))
}

fn definition_error(path: &str, message: &str) -> I18nError {
    I18nError::Definition {
        path: if path.is_empty() {
            "<root>".to_string()
        } else {
            path.to_string()
        },
        message: message.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn fields_to_definition(fields: &Fields) -> Value {
    let mut out = Map::new();
    for (name, node) in fields.iter() {
        out.insert(name.to_string(), node_to_definition(node));
    }
    Value::Object(out)
}

fn node_to_definition(node: &Node) -> Value {
    match node {
        Node::Field(def) => {
            let mut out = Map::new();
            out.insert(TYPE_KEY.to_string(), def.field_type.to_definition());
            for (key, value) in &def.options {
                out.insert(key.clone(), value.clone());
            }
            Value::Object(out)
        }
        Node::Nested(children) => fields_to_definition(children),
        Node::Embedded(sub) => {
            let mut out = Map::new();
            out.insert(SCHEMA_KEY.to_string(), sub.to_definition());
            Value::Object(out)
        }
        Node::EmbeddedArray(sub) => Value::Array(vec![sub.to_definition()]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_shorthand_and_long_form() {
        let schema = Schema::from_definition(&json!({
            "title": "String",
            "name": { "type": "String", "i18n": true, "maxlength": 40 }
        }))
        .unwrap();

        match schema.path("title") {
            Some(Node::Field(def)) => {
                assert_eq!(def.field_type, FieldType::String);
                assert!(def.options.is_empty());
            }
            other => panic!("expected field, got: {:?}", other),
        }
        match schema.path("name") {
            Some(Node::Field(def)) => {
                assert!(def.is_i18n());
                assert_eq!(def.option("maxlength"), Some(&json!(40)));
                assert!(def.option("type").is_none());
            }
            other => panic!("expected field, got: {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_embedded_and_arrays() {
        let schema = Schema::from_definition(&json!({
            "meta": { "slug": "String" },
            "author": { "schema": { "name": "String" } },
            "comments": [{ "body": "String" }],
            "tags": ["String"],
            "scores": { "type": ["Number"], "required": true },
            "labels": [{ "type": "String" }],
            "blob": []
        }))
        .unwrap();

        assert!(matches!(schema.path("meta"), Some(Node::Nested(_))));
        assert!(matches!(schema.path("author"), Some(Node::Embedded(_))));
        assert!(matches!(schema.path("comments"), Some(Node::EmbeddedArray(_))));
        assert!(matches!(schema.path("comments.body"), Some(Node::Field(_))));

        let field_type = |path: &str| match schema.path(path) {
            Some(Node::Field(def)) => def.field_type.clone(),
            other => panic!("expected field at {path}, got: {:?}", other),
        };
        assert_eq!(field_type("tags"), FieldType::Array(Box::new(FieldType::String)));
        assert_eq!(field_type("scores"), FieldType::Array(Box::new(FieldType::Number)));
        assert_eq!(field_type("labels"), FieldType::Array(Box::new(FieldType::String)));
        assert_eq!(field_type("blob"), FieldType::Array(Box::new(FieldType::Mixed)));
    }

    #[test]
    fn test_unknown_type() {
        let err = Schema::from_definition(&json!({ "meta": { "x": "Strnig" } })).unwrap_err();
        match err {
            I18nError::Definition { path, message } => {
                assert_eq!(path, "meta.x");
                assert!(message.contains("Strnig"));
            }
            other => panic!("expected Definition, got: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_match_pattern() {
        let err = Schema::from_definition(&json!({
            "code": { "type": "String", "match": "([a-z" }
        }))
        .unwrap_err();
        assert!(matches!(err, I18nError::Definition { .. }));
    }

    #[test]
    fn test_non_boolean_i18n_marker_rejected() {
        for marker in [json!(1), json!("true"), json!({})] {
            let err = Schema::from_definition(&json!({
                "meta": { "name": { "type": "String", "i18n": marker } }
            }))
            .unwrap_err();
            match err {
                I18nError::Definition { path, message } => {
                    assert_eq!(path, "meta.name");
                    assert!(message.contains("`i18n` must be a boolean"), "{message}");
                }
                other => panic!("expected Definition, got: {:?}", other),
            }
        }
    }

    #[test]
    fn test_root_must_be_object() {
        let err = Schema::from_definition(&json!(["String"])).unwrap_err();
        match err {
            I18nError::Definition { path, .. } => assert_eq!(path, "<root>"),
            other => panic!("expected Definition, got: {:?}", other),
        }
    }

    #[test]
    fn test_dotted_field_name_rejected() {
        assert!(Schema::from_definition(&json!({ "a.b": "String" })).is_err());
    }

    #[test]
    fn test_definition_round_trip() {
        let definition = json!({
            "name": { "type": "String", "required": true },
            "meta": { "slug": { "type": "String" } },
            "author": { "schema": { "name": { "type": "String" } } },
            "comments": [{ "body": { "type": "String" } }],
            "tags": { "type": ["String"] }
        });
        let schema = Schema::from_definition(&definition).unwrap();
        assert_eq!(schema.to_definition(), definition);
        assert_eq!(Schema::from_definition(&schema.to_definition()).unwrap(), schema);
    }

    #[test]
    fn test_from_json_str_preserves_order() {
        let schema = Schema::from_json_str(r#"{"zeta": "String", "alpha": "Number"}"#).unwrap();
        assert_eq!(schema.fields().keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }
}
