use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::language::Language;
use crate::util::EXPECTED_QUESTION_COUNT;

#[derive(Parser, Debug)]
#[command(
    name = "civics-prep",
    version,
    about = "Data preparation tooling for the civics test question and story files"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    MergeLines(MergeLinesArgs),
    Extract(ExtractArgs),
    ToJson(ToJsonArgs),
    ToCsv(ToCsvArgs),
    Patch(PatchArgs),
    Validate(ValidateArgs),
    #[command(subcommand)]
    Story(StoryCommand),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum InputFormat {
    Text,
    Csv,
    Auto,
}

impl InputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Csv => "csv",
            Self::Auto => "auto",
        }
    }
}

/// How the `Answers` cell of the completed table maps to correct answers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CorrectSplit {
    Whole,
    Comma,
}

impl CorrectSplit {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Whole => "whole",
            Self::Comma => "comma",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum TableLayout {
    Completed,
    Long,
}

impl TableLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Long => "long",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct MergeLinesArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: PathBuf,

    #[arg(long, value_enum)]
    pub language: Language,

    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    pub input_format: InputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: PathBuf,

    #[arg(long, value_enum)]
    pub language: Language,

    /// Corrections file applied after extraction. Defaults to the table
    /// bundled for the language, if any.
    #[arg(long)]
    pub corrections: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub no_builtin_corrections: bool,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    pub input_format: InputFormat,

    #[arg(long, default_value_t = EXPECTED_QUESTION_COUNT)]
    pub expected_count: u32,
}

#[derive(Args, Debug, Clone)]
pub struct ToJsonArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: PathBuf,

    /// Detected from the header row when omitted.
    #[arg(long, value_enum)]
    pub input_layout: Option<TableLayout>,

    #[arg(long, value_enum, default_value_t = CorrectSplit::Whole)]
    pub correct_split: CorrectSplit,

    #[arg(long)]
    pub backup_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ToCsvArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = TableLayout::Completed)]
    pub layout: TableLayout,
}

#[derive(Args, Debug, Clone)]
pub struct PatchArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub corrections: PathBuf,

    /// Written in place of the input when omitted.
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub backup_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(long = "questions")]
    pub questions: Vec<PathBuf>,

    #[arg(long)]
    pub story: Option<PathBuf>,

    #[arg(long = "story-language")]
    pub story_languages: Vec<String>,

    #[arg(long, default_value_t = EXPECTED_QUESTION_COUNT)]
    pub expected_count: u32,

    #[arg(long, default_value_t = 3)]
    pub min_wrong_answers: usize,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

#[derive(Subcommand, Debug)]
pub enum StoryCommand {
    Export(StoryExportArgs),
    Apply(StoryApplyArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StoryExportArgs {
    #[arg(long)]
    pub story: PathBuf,

    #[arg(long)]
    pub csv: PathBuf,

    #[arg(long)]
    pub language: String,

    #[arg(long, default_value = "en")]
    pub source_language: String,
}

#[derive(Args, Debug, Clone)]
pub struct StoryApplyArgs {
    #[arg(long)]
    pub story: PathBuf,

    #[arg(long)]
    pub csv: PathBuf,

    #[arg(long)]
    pub language: String,

    #[arg(long)]
    pub backup_dir: Option<PathBuf>,
}
