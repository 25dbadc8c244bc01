//! Language-neutral i18n fields for document schemas.
//!
//! Fields declared as `{ "type": "String", "i18n": true }` are rewritten into a
//! nested object with one optional sub-field per configured language and, by
//! default, a required `_def` sub-field holding the fallback value. Two
//! virtuals are registered per rewritten field:
//!
//! - `<field>.default` reads and writes `<field>._def`;
//! - `<field>.i18n` returns the whole stored per-language value.
//!
//! ```
//! use i18n_neutral_core::{apply, Document, I18nOptions, Schema};
//! use serde_json::json;
//!
//! let mut schema = Schema::from_definition(&json!({
//!     "name": { "type": "String", "i18n": true }
//! })).unwrap();
//! apply(&mut schema, &I18nOptions::new(["es", "en"])).unwrap();
//!
//! let mut doc = Document::new(&schema);
//! doc.set_virtual("name.default", "hello").unwrap();
//! doc.set("name.es", "hola").unwrap();
//! assert_eq!(doc.get("name._def"), Some(&json!("hello")));
//! assert_eq!(
//!     doc.get_virtual("name.i18n").unwrap(),
//!     Some(&json!({ "_def": "hello", "es": "hola" }))
//! );
//! ```

pub mod accessor;
pub mod config;
pub mod definition;
pub mod document;
pub mod error;
pub mod manifest;
pub mod path_utils;
pub mod plugin;
pub mod schema;
pub mod validation;

pub use config::I18nOptions;
pub use document::Document;
pub use error::{DocumentError, I18nError};
pub use manifest::{Manifest, ManifestEntry};
pub use path_utils::{join_path, parse_index, split_parent, split_path};
pub use plugin::{apply, DEFAULT_FIELD, DEFAULT_VIRTUAL, I18N_VIRTUAL};
pub use schema::{FieldDef, FieldType, Fields, Node, Schema, Virtual};
pub use validation::{IssueKind, ValidationIssue};
