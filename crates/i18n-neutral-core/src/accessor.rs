//! Virtual accessors over rewritten i18n fields.
//!
//! Each accessor takes the owning top-level document and the absolute path of
//! the rewritten field explicitly. A field inside an embedded sub-document is
//! addressed through its owner (`chapters.0.title`), so there is no hidden
//! "current sub-document" context to resolve.

use serde_json::Value;

use crate::document::Document;
use crate::error::DocumentError;
use crate::path_utils::join_path;
use crate::plugin::DEFAULT_FIELD;

/// Getter of `<field>.default`: the stored `<field>._def` value.
pub fn get_default<'d>(doc: &'d Document<'_>, field_path: &str) -> Option<&'d Value> {
    doc.get(&join_path(field_path, DEFAULT_FIELD))
}

/// Setter of `<field>.default`: writes `<field>._def`.
pub fn set_default(
    doc: &mut Document<'_>,
    field_path: &str,
    value: impl Into<Value>,
) -> Result<(), DocumentError> {
    doc.set(&join_path(field_path, DEFAULT_FIELD), value)
}

/// Getter of `<field>.i18n`: the whole nested value as stored, default
/// included. `None` until any sub-field was set.
pub fn get_i18n<'d>(doc: &'d Document<'_>, field_path: &str) -> Option<&'d Value> {
    doc.get(field_path)
}
