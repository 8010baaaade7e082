//! Round trip of the narrative story file through translation sheets.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use regex::Regex;
use tracing::{info, warn};

use crate::cli::{StoryApplyArgs, StoryExportArgs};
use crate::model::{ChapterTranslation, FragmentKind, StoryFile, StoryFragment, contains_placeholder};
use crate::tables::{create_csv_writer, header_index, require_column};
use crate::util::{
    backup_file, default_backup_dir, ensure_input_exists, read_json, write_json_pretty,
};

mod apply;
mod export;
mod markup;
#[cfg(test)]
mod tests;

pub use apply::run_apply;
pub use export::run_export;

use self::markup::*;

pub const ROW_TITLE: &str = "title";
pub const ROW_INTRODUCTION: &str = "introduction";
pub const ROW_SECTION: &str = "section";

const DEFAULT_SOURCE_LANGUAGE: &str = "en";

fn full_column(language: &str) -> String {
    format!("{}_Full", language.to_uppercase())
}
