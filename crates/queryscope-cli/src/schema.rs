//! Index-pattern schema loading.

use anyhow::{Context, Result};
use queryscope_core::IndexPatternSchema;
use std::path::Path;

/// Loads an index-pattern schema from a JSON file:
///
/// ```json
/// {
///   "title": "test-index",
///   "fields": [
///     { "name": "field1", "type": "string" },
///     { "name": "field2", "type": "number" }
///   ]
/// }
/// ```
pub fn load_schema(path: &Path) -> Result<IndexPatternSchema> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse schema file {}", path.display()))
}
