//! Plugin options for the i18n rewrite.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::I18nError;
use crate::plugin::{DEFAULT_FIELD, DEFAULT_VIRTUAL, I18N_VIRTUAL};

const MISSING_LANGUAGES: &str = "Required languages array not provided";
const USE_DEFAULT_NOT_BOOL: &str = "useDefault option value must be boolean";

/// Options for the i18n rewrite.
///
/// ## Serialization Format
///
/// Fields are serialized in `camelCase` (`languages`, `useDefault`), matching
/// the option object accepted by the plugin and the CLI `--config` file.
/// Once applied, a copy is attached to the schema and backs `getLanguages()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct I18nOptions {
    /// Ordered language tags, one sub-field each.
    pub languages: Vec<String>,
    /// Add the reserved `_def` sub-field and the `.default` virtual.
    /// Default: true.
    #[serde(default = "default_use_default")]
    pub use_default: bool,
}

fn default_use_default() -> bool {
    true
}

impl I18nOptions {
    /// Options for the given languages with the default value enabled.
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            languages: languages.into_iter().map(Into::into).collect(),
            use_default: true,
        }
    }

    /// Disable the reserved default sub-field.
    pub fn without_default(mut self) -> Self {
        self.use_default = false;
        self
    }

    /// Build options from a loosely typed JSON option object.
    ///
    /// Produces the same messages as the plugin contract so that a bad config
    /// file reads exactly like a bad plugin call.
    pub fn from_value(value: &Value) -> Result<Self, I18nError> {
        let obj = value
            .as_object()
            .ok_or_else(|| I18nError::Configuration(MISSING_LANGUAGES.to_string()))?;

        let languages = match obj.get("languages") {
            Some(Value::Array(items)) if !items.is_empty() => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        I18nError::Configuration(format!(
                            "language tags must be strings, got {item}"
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => return Err(I18nError::Configuration(MISSING_LANGUAGES.to_string())),
        };

        let use_default = match obj.get("useDefault") {
            None => true,
            Some(Value::Bool(b)) => *b,
            Some(_) => {
                return Err(I18nError::Configuration(USE_DEFAULT_NOT_BOOL.to_string()))
            }
        };

        let options = Self {
            languages,
            use_default,
        };
        options.validate()?;
        Ok(options)
    }

    /// Check the language set before any schema is touched.
    ///
    /// Tags must be non-empty, distinct, free of `.` (they become path
    /// segments) and must not shadow the reserved sub-field or a virtual
    /// suffix.
    pub fn validate(&self) -> Result<(), I18nError> {
        if self.languages.is_empty() {
            return Err(I18nError::Configuration(MISSING_LANGUAGES.to_string()));
        }

        let mut seen = HashSet::with_capacity(self.languages.len());
        for tag in &self.languages {
            if tag.is_empty() {
                return Err(I18nError::Configuration(
                    "language tags must not be empty".to_string(),
                ));
            }
            if tag.contains('.') {
                return Err(I18nError::Configuration(format!(
                    "language tag `{tag}` must not contain `.`"
                )));
            }
            if [DEFAULT_FIELD, DEFAULT_VIRTUAL, I18N_VIRTUAL].contains(&tag.as_str()) {
                return Err(I18nError::Configuration(format!(
                    "language tag `{tag}` is reserved"
                )));
            }
            if !seen.insert(tag.as_str()) {
                return Err(I18nError::Configuration(format!(
                    "duplicate language tag `{tag}`"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config_message(result: Result<I18nOptions, I18nError>) -> String {
        match result {
            Err(I18nError::Configuration(msg)) => msg,
            other => panic!("expected Configuration error, got: {:?}", other),
        }
    }

    #[test]
    fn test_from_value_defaults_use_default() {
        let opts = I18nOptions::from_value(&json!({ "languages": ["es", "fr"] })).unwrap();
        assert_eq!(opts.languages, vec!["es", "fr"]);
        assert!(opts.use_default);
    }

    #[test]
    fn test_from_value_explicit_use_default() {
        let opts =
            I18nOptions::from_value(&json!({ "languages": ["en"], "useDefault": false }))
                .unwrap();
        assert!(!opts.use_default);
    }

    #[test]
    fn test_missing_languages() {
        for value in [
            json!(null),
            json!({}),
            json!({ "languages": "es" }),
            json!({ "languages": [] }),
        ] {
            let msg = config_message(I18nOptions::from_value(&value));
            assert_eq!(msg, MISSING_LANGUAGES);
        }
    }

    #[test]
    fn test_use_default_must_be_bool() {
        let msg = config_message(I18nOptions::from_value(
            &json!({ "languages": ["es"], "useDefault": "yes" }),
        ));
        assert_eq!(msg, USE_DEFAULT_NOT_BOOL);
    }

    #[test]
    fn test_non_string_language() {
        let msg = config_message(I18nOptions::from_value(&json!({ "languages": ["es", 3] })));
        assert!(msg.contains("must be strings"));
    }

    fn validation_message(opts: I18nOptions) -> String {
        match opts.validate() {
            Err(I18nError::Configuration(msg)) => msg,
            other => panic!("expected Configuration error, got: {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_duplicates_and_reserved() {
        let msg = validation_message(I18nOptions::new(["es", "fr", "es"]));
        assert!(msg.contains("duplicate"));

        for tag in ["_def", "default", "i18n"] {
            let msg = validation_message(I18nOptions::new(["es", tag]));
            assert!(msg.contains("reserved"), "{tag}: {msg}");
        }

        assert!(validation_message(I18nOptions::new(["pt.br"])).contains("`.`"));
        assert!(validation_message(I18nOptions::new([""])).contains("empty"));
    }

    #[test]
    fn test_serde_camel_case() {
        let opts = I18nOptions::new(["es", "en"]).without_default();
        let json = serde_json::to_string(&opts).unwrap();
        assert!(json.contains("\"useDefault\":false"));

        let back: I18nOptions = serde_json::from_str(r#"{"languages":["es"]}"#).unwrap();
        assert!(back.use_default);
    }
}
