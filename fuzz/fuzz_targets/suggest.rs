#![no_main]

use libfuzzer_sys::fuzz_target;
use queryscope_core::{
    Cursor, IndexPatternSchema, Language, SchemaField, SuggestionEngine, SuggestionRequest,
    SuggestionServices,
};

fuzz_target!(|data: &[u8]| {
    if let Ok(query) = std::str::from_utf8(data) {
        let schema = IndexPatternSchema {
            title: "fuzz-index".to_string(),
            fields: vec![SchemaField {
                name: "field1".to_string(),
                field_type: "string".to_string(),
            }],
        };
        let services = SuggestionServices::default();
        let engine = SuggestionEngine::new();

        // Exercise a spread of cursor positions, including out-of-range ones.
        for column in [1, query.chars().count() / 2 + 1, query.chars().count() + 1] {
            for language in [Language::Sql, Language::Ppl, Language::Dql] {
                let request = SuggestionRequest {
                    query,
                    language,
                    position: Cursor::new(1, column),
                    selection_start: 0,
                    selection_end: 0,
                    index_pattern: Some(&schema),
                    services: Some(&services),
                };
                let _ = futures::executor::block_on(engine.get_suggestions(&request));
            }
        }
    }
});
