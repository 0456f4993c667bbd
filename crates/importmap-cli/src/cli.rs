//! CLI argument definitions.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use importmap_model::{DateFormat, Delimiter};

#[derive(Parser)]
#[command(
    name = "importmap",
    version,
    about = "Map the columns of a delimited file onto target captions",
    long_about = "Map the columns of a delimited file onto target captions.\n\n\
                  Columns are matched by name, known phrasings and inferred value type.\n\
                  Exact matches are applied automatically; the rest are suggested and\n\
                  must be confirmed before the mapped file can be exported."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values (emails, phone numbers) in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Configuration file (default: the platform config folder).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Map a file onto captions, validate it and export the result.
    Map(MapArgs),

    /// List the known captions and the phrasings matched for each.
    Captions,
}

#[derive(Parser)]
pub struct MapArgs {
    /// Delimited file to import (.csv, .tsv or .txt).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Field delimiter.
    #[arg(long = "delimiter", value_enum)]
    pub delimiter: Option<DelimiterArg>,

    /// Treat the first row as data, not as column names.
    #[arg(long = "no-header")]
    pub no_header: bool,

    /// Expected layout of Start Date values.
    #[arg(long = "date-format", value_enum)]
    pub date_format: Option<DateFormatArg>,

    /// Suggestion service URL (overrides [provider] endpoint).
    #[arg(long = "provider-url", value_name = "URL", conflicts_with = "no_provider")]
    pub provider_url: Option<String>,

    /// Use only local matching, even if a provider is configured.
    #[arg(long = "no-provider")]
    pub no_provider: bool,

    /// Add a caption slot before matching.
    #[arg(long = "add-caption", value_name = "CAPTION")]
    pub add_captions: Vec<String>,

    /// Rename a caption before matching.
    #[arg(long = "rename-caption", value_name = "OLD=NEW", value_parser = parse_pair)]
    pub rename_captions: Vec<(String, String)>,

    /// Remove a caption slot before matching.
    #[arg(long = "remove-caption", value_name = "CAPTION")]
    pub remove_captions: Vec<String>,

    /// Mark a caption as a key field.
    #[arg(long = "key-field", value_name = "CAPTION")]
    pub key_fields: Vec<String>,

    /// Mark a caption for matching existing records by id.
    #[arg(long = "match-by-id", value_name = "CAPTION")]
    pub match_by_id: Vec<String>,

    /// Confirm a column for a caption.
    #[arg(long = "confirm", value_name = "COLUMN=CAPTION", value_parser = parse_pair)]
    pub confirms: Vec<(String, String)>,

    /// Accept the suggestion for a caption.
    #[arg(long = "accept", value_name = "CAPTION")]
    pub accepts: Vec<String>,

    /// Accept every pending suggestion.
    #[arg(long = "accept-all")]
    pub accept_all: bool,

    /// Send a message to the suggestion provider; mappings in its reply are confirmed.
    #[arg(long = "message", value_name = "TEXT")]
    pub messages: Vec<String>,

    /// Correct one cell, e.g. `3:Email=ann@example.com` (row numbers as shown in reports).
    #[arg(long = "fix", value_name = "ROW:CAPTION=VALUE")]
    pub fixes: Vec<FixArg>,

    /// Show the score breakdown of every assignment.
    #[arg(long = "explain")]
    pub explain: bool,

    /// Write the mapped file here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH", conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Write `<name>-mapped.<ext>` into this directory.
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// A cell correction from `--fix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixArg {
    pub row: usize,
    pub caption: String,
    pub value: String,
}

impl FromStr for FixArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, rest) = s
            .split_once(':')
            .ok_or_else(|| format!("expected ROW:CAPTION=VALUE, got '{s}'"))?;
        let row = row
            .trim()
            .parse()
            .map_err(|_| format!("invalid row number '{}'", row.trim()))?;
        let (caption, value) = parse_pair(rest)?;
        Ok(Self {
            row,
            caption,
            value,
        })
    }
}

/// Split `LEFT=RIGHT` at the first `=`.
pub fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (left, right) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LEFT=RIGHT, got '{s}'"))?;
    let left = left.trim();
    if left.is_empty() {
        return Err(format!("missing name before '=' in '{s}'"));
    }
    Ok((left.to_string(), right.trim().to_string()))
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DelimiterArg {
    Comma,
    Tab,
}

impl From<DelimiterArg> for Delimiter {
    fn from(arg: DelimiterArg) -> Self {
        match arg {
            DelimiterArg::Comma => Self::Comma,
            DelimiterArg::Tab => Self::Tab,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DateFormatArg {
    #[value(name = "dd/mm/yyyy")]
    DayMonthYear,
    #[value(name = "mm/dd/yyyy")]
    MonthDayYear,
    #[value(name = "yyyy-mm-dd")]
    YearMonthDay,
}

impl From<DateFormatArg> for DateFormat {
    fn from(arg: DateFormatArg) -> Self {
        match arg {
            DateFormatArg::DayMonthYear => Self::DayMonthYear,
            DateFormatArg::MonthDayYear => Self::MonthDayYear,
            DateFormatArg::YearMonthDay => Self::YearMonthDay,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fix_argument() {
        let fix: FixArg = "3:Email=ann=1@example.com".parse().unwrap();
        assert_eq!(fix.row, 3);
        assert_eq!(fix.caption, "Email");
        assert_eq!(fix.value, "ann=1@example.com");
        assert!("x:Email=a".parse::<FixArg>().is_err());
        assert!("3:=a".parse::<FixArg>().is_err());
    }

    #[test]
    fn test_map_flags_parse() {
        let cli = Cli::try_parse_from([
            "importmap",
            "map",
            "people.csv",
            "--confirm",
            "First Name=Forename(s)",
            "--accept",
            "Email",
            "--date-format",
            "yyyy-mm-dd",
            "--fix",
            "2:Email=a@b.c",
        ])
        .unwrap();
        let Command::Map(args) = cli.command else {
            panic!("expected map command");
        };
        assert_eq!(
            args.confirms,
            vec![("First Name".to_string(), "Forename(s)".to_string())]
        );
        assert!(matches!(args.date_format, Some(DateFormatArg::YearMonthDay)));
        assert_eq!(args.fixes[0].row, 2);
    }
}
