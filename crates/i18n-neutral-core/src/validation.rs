//! Document validation against the field options of a schema.
//!
//! Supported options: `required` on every field; `minlength`, `maxlength`,
//! `enum` and `match` on strings; `min` and `max` on numbers. Options copied
//! onto i18n sub-fields are enforced per language, and the reserved default
//! sub-field is always required.

use std::fmt;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::path_utils::join_path;
use crate::schema::{FieldDef, FieldType, Fields, Node};

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    /// Document path of the offending value (e.g. `chapters.0.title._def`).
    pub path: String,
    #[serde(flatten)]
    pub kind: IssueKind,
}

/// Classification of validation failures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueKind {
    Required,
    Cast { expected: String },
    MinLength { min: u64 },
    MaxLength { max: u64 },
    Enum { allowed: Vec<Value> },
    Match { pattern: String },
    Min { min: f64 },
    Max { max: f64 },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = &self.path;
        match &self.kind {
            IssueKind::Required => write!(f, "Path `{path}` is required."),
            IssueKind::Cast { expected } => {
                write!(f, "Cast to {expected} failed for value at path `{path}`.")
            }
            IssueKind::MinLength { min } => write!(
                f,
                "Path `{path}` is shorter than the minimum allowed length ({min})."
            ),
            IssueKind::MaxLength { max } => write!(
                f,
                "Path `{path}` is longer than the maximum allowed length ({max})."
            ),
            IssueKind::Enum { .. } => {
                write!(f, "Value at path `{path}` is not a valid enum value.")
            }
            IssueKind::Match { pattern } => {
                write!(f, "Path `{path}` does not match /{pattern}/.")
            }
            IssueKind::Min { min } => {
                write!(f, "Path `{path}` is less than minimum allowed value ({min}).")
            }
            IssueKind::Max { max } => {
                write!(f, "Path `{path}` is more than maximum allowed value ({max}).")
            }
        }
    }
}

/// Validate `data` (the object at `prefix`, if any) against `fields`.
pub(crate) fn validate_fields(
    fields: &Fields,
    data: Option<&Map<String, Value>>,
    prefix: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    for (name, node) in fields.iter() {
        let path = join_path(prefix, name);
        let value = data.and_then(|d| d.get(name)).filter(|v| !v.is_null());
        match node {
            Node::Field(def) => validate_field(def, value, &path, issues),
            Node::Nested(children) => {
                validate_fields(children, value.and_then(Value::as_object), &path, issues)
            }
            Node::Embedded(sub) => match value {
                Some(Value::Object(obj)) => validate_fields(sub.fields(), Some(obj), &path, issues),
                Some(_) => issues.push(cast_issue(&path, "Embedded")),
                None => {}
            },
            Node::EmbeddedArray(sub) => match value {
                Some(Value::Array(items)) => {
                    for (i, item) in items.iter().enumerate() {
                        let item_path = join_path(&path, &i.to_string());
                        match item.as_object() {
                            Some(obj) => validate_fields(sub.fields(), Some(obj), &item_path, issues),
                            None => issues.push(cast_issue(&item_path, "Embedded")),
                        }
                    }
                }
                Some(_) => issues.push(cast_issue(&path, "DocumentArray")),
                None => {}
            },
        }
    }
}

fn validate_field(
    def: &FieldDef,
    value: Option<&Value>,
    path: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let Some(value) = value else {
        if def.is_required() {
            issues.push(issue(path, IssueKind::Required));
        }
        return;
    };

    if !def.field_type.accepts(value) {
        issues.push(cast_issue(path, &def.field_type.to_string()));
        return;
    }

    match (&def.field_type, value) {
        (FieldType::String, Value::String(s)) => validate_string(def, s, path, issues),
        (FieldType::Number, Value::Number(n)) => {
            if let Some(n) = n.as_f64() {
                validate_number(def, n, path, issues);
            }
        }
        _ => {}
    }
}

fn validate_string(def: &FieldDef, s: &str, path: &str, issues: &mut Vec<ValidationIssue>) {
    let len = s.chars().count() as u64;
    if let Some(min) = def.option("minlength").and_then(Value::as_u64) {
        if len < min {
            issues.push(issue(path, IssueKind::MinLength { min }));
        }
    }
    if let Some(max) = def.option("maxlength").and_then(Value::as_u64) {
        if len > max {
            issues.push(issue(path, IssueKind::MaxLength { max }));
        }
    }
    if let Some(allowed) = def.option("enum").and_then(Value::as_array) {
        if !allowed.iter().any(|v| v.as_str() == Some(s)) {
            issues.push(issue(
                path,
                IssueKind::Enum {
                    allowed: allowed.clone(),
                },
            ));
        }
    }
    if let Some(pattern) = def.option("match").and_then(Value::as_str) {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(s) => issues.push(issue(
                path,
                IssueKind::Match {
                    pattern: pattern.to_string(),
                },
            )),
            Ok(_) => {}
            Err(e) => tracing::warn!(path, error = %e, "skipping invalid `match` pattern"),
        }
    }
}

fn validate_number(def: &FieldDef, n: f64, path: &str, issues: &mut Vec<ValidationIssue>) {
    if let Some(min) = def.option("min").and_then(Value::as_f64) {
        if n < min {
            issues.push(issue(path, IssueKind::Min { min }));
        }
    }
    if let Some(max) = def.option("max").and_then(Value::as_f64) {
        if n > max {
            issues.push(issue(path, IssueKind::Max { max }));
        }
    }
}

fn issue(path: &str, kind: IssueKind) -> ValidationIssue {
    ValidationIssue {
        path: path.to_string(),
        kind,
    }
}

fn cast_issue(path: &str, expected: &str) -> ValidationIssue {
    issue(
        path,
        IssueKind::Cast {
            expected: expected.to_string(),
        },
    )
}
