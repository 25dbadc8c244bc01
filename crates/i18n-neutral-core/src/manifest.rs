//! Virtuals manifest: the accessors and languages a rewrite registered.
//!
//! A schema definition only carries stored fields. The manifest is its
//! sidecar: every virtual of the root schema and of each embedded schema,
//! tagged with where that schema sits.

use serde::{Deserialize, Serialize};

use crate::path_utils::join_path;
use crate::schema::{Fields, Node, Schema, Virtual};

/// Accessors registered by the i18n rewrite, across all embedded schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Manifest format version.
    #[serde(rename = "$schema")]
    pub schema: String,
    pub languages: Vec<String>,
    pub use_default: bool,
    /// Virtuals in schema definition order.
    pub virtuals: Vec<ManifestEntry>,
}

/// A virtual and the schema that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Schema path of the embedded schema owning the virtual; empty for the
    /// root schema.
    pub owner: String,
    pub accessor: Virtual,
}

impl Manifest {
    /// Build the manifest of a configured schema; `None` if the plugin was
    /// never applied.
    pub fn from_schema(schema: &Schema) -> Option<Self> {
        let options = schema.i18n_options()?;
        let mut virtuals = Vec::new();
        collect_schema(schema, "", &mut virtuals);
        Some(Self {
            schema: "i18n-neutral/manifest/v1".to_string(),
            languages: options.languages.clone(),
            use_default: options.use_default,
            virtuals,
        })
    }
}

fn collect_schema(schema: &Schema, owner: &str, out: &mut Vec<ManifestEntry>) {
    out.extend(schema.virtuals().iter().map(|v| ManifestEntry {
        owner: owner.to_string(),
        accessor: v.clone(),
    }));
    collect_embedded(schema.fields(), owner, out);
}

fn collect_embedded(fields: &Fields, prefix: &str, out: &mut Vec<ManifestEntry>) {
    for (name, node) in fields.iter() {
        let path = join_path(prefix, name);
        match node {
            Node::Nested(children) => collect_embedded(children, &path, out),
            Node::Embedded(sub) | Node::EmbeddedArray(sub) => collect_schema(sub, &path, out),
            Node::Field(_) => {}
        }
    }
}
