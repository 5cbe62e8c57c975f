//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use queryscope_core::Language;
use std::path::PathBuf;

/// QueryScope - context-aware query autocomplete
#[derive(Parser, Debug)]
#[command(name = "queryscope")]
#[command(about = "Compute autocomplete suggestions for a query and cursor position", long_about = None)]
#[command(version)]
pub struct Args {
    /// Query text (reads from stdin if omitted)
    #[arg(value_name = "QUERY")]
    pub query: Option<String>,

    /// Query language
    #[arg(short, long, default_value = "sql", value_enum)]
    pub language: LanguageArg,

    /// 1-based cursor line (defaults to the last line of the query)
    #[arg(long)]
    pub line: Option<usize>,

    /// 1-based cursor column (defaults to the end of the query)
    #[arg(long)]
    pub column: Option<usize>,

    /// Index-pattern schema JSON file: {"title": ..., "fields": [{"name", "type"}]}
    #[arg(short, long, value_name = "FILE")]
    pub schema: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Static column values for offline value suggestions
    /// (column=value1,value2, repeatable)
    #[arg(long, value_name = "COLUMN=VALUES")]
    pub values: Vec<String>,

    /// Limit the number of printed suggestions
    #[arg(short = 'n', long, value_name = "N")]
    pub limit: Option<usize>,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LanguageArg {
    Sql,
    Ppl,
    Dql,
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::Sql => Language::Sql,
            LanguageArg::Ppl => Language::Ppl,
            LanguageArg::Dql => Language::Dql,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON array of suggestions
    Json,
}
