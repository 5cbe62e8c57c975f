//! Suggestion rendering: table and JSON output.

use anyhow::Result;
use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use queryscope_core::{QuerySuggestion, SuggestionKind};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct SuggestionRow {
    #[tabled(rename = "Suggestion")]
    text: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

pub fn kind_label(kind: SuggestionKind) -> &'static str {
    match kind {
        SuggestionKind::Keyword => "keyword",
        SuggestionKind::Field => "field",
        SuggestionKind::Struct => "index",
        SuggestionKind::Function => "function",
        SuggestionKind::Operator => "operator",
        SuggestionKind::Value => "value",
    }
}

fn colored_kind(kind: SuggestionKind) -> String {
    let label = kind_label(kind);
    match kind {
        SuggestionKind::Keyword => label.green().to_string(),
        SuggestionKind::Field => label.cyan().to_string(),
        SuggestionKind::Struct => label.magenta().to_string(),
        SuggestionKind::Function => label.yellow().to_string(),
        SuggestionKind::Operator => label.blue().to_string(),
        SuggestionKind::Value => label.white().to_string(),
    }
}

/// Should table output use ANSI colors?
pub fn use_color() -> bool {
    std::io::stdout().is_terminal()
}

/// Renders suggestions as a human-readable table.
pub fn format_table(suggestions: &[QuerySuggestion], colorize: bool) -> String {
    if suggestions.is_empty() {
        return "no suggestions".to_string();
    }

    let rows: Vec<SuggestionRow> = suggestions
        .iter()
        .map(|suggestion| SuggestionRow {
            text: suggestion.text.clone(),
            kind: if colorize {
                colored_kind(suggestion.kind)
            } else {
                kind_label(suggestion.kind).to_string()
            },
            detail: suggestion.detail.clone().unwrap_or_default(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    table.to_string()
}

/// Renders suggestions as a JSON array.
pub fn format_json(suggestions: &[QuerySuggestion], compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(suggestions)?
    } else {
        serde_json::to_string_pretty(suggestions)?
    };
    Ok(json)
}
