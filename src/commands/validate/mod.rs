use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use serde::Serialize;
use tracing::{info, warn};

use crate::cli::ValidateArgs;
use crate::model::{QuestionRecord, StoryFile, contains_placeholder};
use crate::util::{ensure_input_exists, id_coverage, now_utc_string, read_json, write_json_pretty};

mod questions;
mod run;
mod story;
#[cfg(test)]
mod tests;

pub use run::run;

use self::questions::*;
use self::story::*;

const DETAIL_SAMPLE: usize = 5;

#[derive(Debug, Serialize, Clone)]
pub struct QualityCheck {
    pub check_id: String,
    pub name: String,
    pub result: String,
    pub detail: String,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct ValidationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub manifest_version: u32,
    pub generated_at: String,
    pub status: String,
    pub inputs: Vec<String>,
    pub summary: ValidationSummary,
    pub checks: Vec<QualityCheck>,
    pub issues: Vec<String>,
}

/// Collects checks and the per-problem issue lines behind them.
#[derive(Debug, Default)]
pub struct CheckSet {
    pub checks: Vec<QualityCheck>,
    pub issues: Vec<String>,
}

impl CheckSet {
    pub fn record(&mut self, check_id: impl Into<String>, name: impl Into<String>, problems: Vec<String>) {
        let name = name.into();
        let passed = problems.is_empty();
        let detail = if passed {
            "ok".to_string()
        } else {
            let sample = problems
                .iter()
                .take(DETAIL_SAMPLE)
                .cloned()
                .collect::<Vec<String>>()
                .join("; ");
            if problems.len() > DETAIL_SAMPLE {
                format!("{} problems: {sample}; ...", problems.len())
            } else {
                format!("{} problems: {sample}", problems.len())
            }
        };

        self.issues
            .extend(problems.into_iter().map(|problem| format!("{name}: {problem}")));
        self.checks.push(QualityCheck {
            check_id: check_id.into(),
            name,
            result: if passed { "passed" } else { "failed" }.to_string(),
            detail,
        });
    }
}

pub fn summarize_checks(checks: &[QualityCheck]) -> ValidationSummary {
    let passed = checks.iter().filter(|check| check.result == "passed").count();
    let failed = checks.iter().filter(|check| check.result == "failed").count();

    ValidationSummary {
        total: checks.len(),
        passed,
        failed,
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
