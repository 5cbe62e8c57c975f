//! QueryScope CLI - query autocomplete

use std::collections::HashMap;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;

use queryscope_cli::cli::{Args, OutputFormat};
use queryscope_cli::{output, schema};
use queryscope_core::{
    Cursor, Language, SuggestionEngine, SuggestionRequest, SuggestionServices, ValueFetchError,
    ValueFetcher,
};

/// Configuration error (bad arguments, unreadable schema).
const EXIT_CONFIG_ERROR: u8 = 66;

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("queryscope: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn run(args: Args) -> Result<()> {
    let query = match args.query {
        Some(query) => query,
        None => std::io::read_to_string(std::io::stdin()).context("failed to read stdin")?,
    };

    let language = Language::from(args.language);
    let index_pattern = args
        .schema
        .as_deref()
        .map(schema::load_schema)
        .transpose()?;
    let values = parse_value_pairs(&args.values)?;
    let fetcher = StaticValueFetcher { values };
    let services = SuggestionServices {
        value_fetcher: Some(&fetcher),
    };

    let request = SuggestionRequest {
        query: &query,
        language,
        position: cursor_position(&query, args.line, args.column),
        selection_start: 0,
        selection_end: 0,
        index_pattern: index_pattern.as_ref(),
        services: Some(&services),
    };

    let engine = SuggestionEngine::new();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("failed to start async runtime")?;
    let mut suggestions = runtime.block_on(engine.get_suggestions(&request));

    if let Some(limit) = args.limit {
        suggestions.truncate(limit);
    }

    let rendered = match args.format {
        OutputFormat::Table => output::format_table(&suggestions, output::use_color()),
        OutputFormat::Json => output::format_json(&suggestions, args.compact)?,
    };
    println!("{rendered}");

    Ok(())
}

/// Cursor position for the request; defaults to the end of the query.
fn cursor_position(query: &str, line: Option<usize>, column: Option<usize>) -> Cursor {
    let last_line = query.bytes().filter(|&b| b == b'\n').count() + 1;
    let last_column = query.rsplit('\n').next().unwrap_or(query).chars().count() + 1;
    Cursor::new(line.unwrap_or(last_line), column.unwrap_or(last_column))
}

/// Parses repeated `column=value1,value2` arguments.
fn parse_value_pairs(pairs: &[String]) -> Result<HashMap<String, Vec<String>>> {
    let mut values = HashMap::new();
    for pair in pairs {
        let Some((column, list)) = pair.split_once('=') else {
            bail!("invalid --values argument `{pair}` (expected column=value1,value2)");
        };
        values.insert(
            column.trim().to_string(),
            list.split(',').map(|v| v.trim().to_string()).collect(),
        );
    }
    Ok(values)
}

/// Offline value fetcher backed by `--values` arguments.
struct StaticValueFetcher {
    values: HashMap<String, Vec<String>>,
}

#[async_trait::async_trait]
impl ValueFetcher for StaticValueFetcher {
    async fn fetch_column_values(
        &self,
        _index_pattern_title: &str,
        column_name: &str,
    ) -> Result<Vec<String>, ValueFetchError> {
        Ok(self.values.get(column_name).cloned().unwrap_or_default())
    }
}
