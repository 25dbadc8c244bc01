#![no_main]

use i18n_neutral_core::{apply, Document, I18nOptions, Schema};
use libfuzzer_sys::fuzz_target;

// Accepts arbitrary bytes, attempts to parse as a schema definition, applies
// the rewrite and validates an empty document against it.
// Goal: no panics, even on malformed input.
fuzz_target!(|data: &[u8]| {
    if let Ok(definition) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Ok(mut schema) = Schema::from_definition(&definition) {
            if apply(&mut schema, &I18nOptions::new(["es", "en"])).is_ok() {
                let _ = Document::new(&schema).validate();
            }
        }
    }
});
