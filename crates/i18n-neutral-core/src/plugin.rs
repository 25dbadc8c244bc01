//! The i18n rewrite: string fields marked `i18n: true` become one nested
//! sub-field per language plus an optional reserved default.
//!
//! ```text
//! name: { type: String, i18n: true, maxlength: 40 }
//!   ↓  languages = [es, fr], use_default = true
//! name: {
//!   _def: { type: String, maxlength: 40, required: true },
//!   es:   { type: String, maxlength: 40, required: false },
//!   fr:   { type: String, maxlength: 40, required: false },
//! }
//! virtuals: name.default (get/set _def), name.i18n (get, read-only)
//! ```
//!
//! Embedded sub-schemas receive the same rewrite with the same options. The
//! rewrite runs on a copy and is committed only when every field, at every
//! depth, was rewritten successfully.

use serde_json::Value;

use crate::config::I18nOptions;
use crate::error::I18nError;
use crate::path_utils::{join_path, split_parent};
use crate::schema::{FieldDef, FieldType, Fields, Node, Schema, Virtual};

/// Reserved sub-field holding the default (fallback) value.
pub const DEFAULT_FIELD: &str = "_def";
/// Suffix of the read/write virtual over [`DEFAULT_FIELD`].
pub const DEFAULT_VIRTUAL: &str = "default";
/// Suffix of the read-only virtual over the whole localized value.
pub const I18N_VIRTUAL: &str = "i18n";

/// Options dropped from the original field before they are copied onto the
/// generated sub-fields.
const DISCARDED_OPTIONS: [&str; 3] = ["i18n", "default", "required"];

/// Apply the i18n rewrite to `schema`.
///
/// Fails without touching `schema` when the options are invalid, when the
/// schema was already configured (or embeds a schema configured with other
/// options), or when an `i18n` marker is not a boolean or sits on a
/// non-string field. Embedded schemas configured with the same options are
/// kept as they are.
pub fn apply(schema: &mut Schema, options: &I18nOptions) -> Result<(), I18nError> {
    options.validate()?;

    let mut rewritten = schema.clone();
    rewrite_schema(&mut rewritten, "", options)?;
    *schema = rewritten;
    Ok(())
}

/// Rewrite one schema. `location` is where the schema is embedded in the
/// root schema and only feeds error messages and logs; field paths and
/// virtuals stay relative to `schema`.
fn rewrite_schema(
    schema: &mut Schema,
    location: &str,
    options: &I18nOptions,
) -> Result<(), I18nError> {
    if schema.is_configured() {
        return Err(I18nError::Configuration(format!(
            "i18n-neutral plugin already applied to schema at `{}`",
            if location.is_empty() { "<root>" } else { location }
        )));
    }

    let paths: Vec<String> = schema.each_path().into_iter().map(|(path, _)| path).collect();
    for path in paths {
        let full_path = join_path(location, &path);
        let localized = match schema.path_mut(&path) {
            Some(Node::Embedded(sub) | Node::EmbeddedArray(sub)) => {
                rewrite_embedded(sub, &full_path, options)?;
                continue;
            }
            Some(Node::Field(def)) => {
                if !i18n_marker(def, &full_path)? {
                    tracing::trace!(path = %full_path, "field not marked for i18n");
                    continue;
                }
                if def.field_type != FieldType::String {
                    return Err(I18nError::TypeMismatch {
                        path: full_path,
                        found: def.field_type.to_string(),
                    });
                }
                localized_fields(def, options)
            }
            _ => continue,
        };

        let (prefix, name) = split_parent(&path);
        schema.add(prefix, name, Node::Nested(localized))?;
        for virt in localized_virtuals(&path, options) {
            schema.add_virtual(virt);
        }
        tracing::debug!(
            path = %full_path,
            languages = options.languages.len(),
            use_default = options.use_default,
            "rewrote i18n field"
        );
    }

    schema.set_i18n_options(options.clone());
    Ok(())
}

/// An embedded schema that already went through the rewrite with the same
/// options is left as is; one configured differently is an error.
fn rewrite_embedded(
    sub: &mut Schema,
    location: &str,
    options: &I18nOptions,
) -> Result<(), I18nError> {
    if sub.i18n_options() == Some(options) {
        tracing::debug!(path = %location, "embedded schema already configured");
        return Ok(());
    }
    tracing::debug!(path = %location, "applying i18n rewrite to embedded schema");
    rewrite_schema(sub, location, options)
}

/// The `i18n` option must be a boolean when present.
fn i18n_marker(def: &FieldDef, path: &str) -> Result<bool, I18nError> {
    match def.option("i18n") {
        None => Ok(false),
        Some(Value::Bool(marked)) => Ok(*marked),
        Some(other) => Err(I18nError::Definition {
            path: path.to_string(),
            message: format!("`i18n` must be a boolean, got {other}"),
        }),
    }
}

/// Build the nested replacement for an i18n field: `_def` first (required)
/// when enabled, then one optional sub-field per language.
fn localized_fields(def: &FieldDef, options: &I18nOptions) -> Fields {
    let mut captured = def.clone();
    for key in DISCARDED_OPTIONS {
        captured.options.shift_remove(key);
    }

    let mut fields = Fields::new();
    if options.use_default {
        fields.insert(
            DEFAULT_FIELD,
            Node::Field(captured.clone().with_option("required", Value::Bool(true))),
        );
    }
    for lang in &options.languages {
        fields.insert(
            lang.as_str(),
            Node::Field(captured.clone().with_option("required", Value::Bool(false))),
        );
    }
    fields
}

fn localized_virtuals(path: &str, options: &I18nOptions) -> Vec<Virtual> {
    let mut out = Vec::with_capacity(2);
    if options.use_default {
        out.push(Virtual::Default {
            path: join_path(path, DEFAULT_VIRTUAL),
            field: path.to_string(),
        });
    }
    out.push(Virtual::I18n {
        path: join_path(path, I18N_VIRTUAL),
        field: path.to_string(),
    });
    out
}
