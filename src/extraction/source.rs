use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::InputFormat;

/// Reads raw export lines from a text file, or from a one-column CSV export
/// (the `Text` column when a header row names one).
pub fn read_source_lines(path: &Path, format: InputFormat) -> Result<Vec<String>> {
    match resolve_format(path, format) {
        InputFormat::Csv => read_csv_lines(path),
        _ => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(raw
                .trim_start_matches('\u{feff}')
                .lines()
                .map(ToOwned::to_owned)
                .collect())
        }
    }
}

fn resolve_format(path: &Path, format: InputFormat) -> InputFormat {
    if format != InputFormat::Auto {
        return format;
    }

    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        InputFormat::Csv
    } else {
        InputFormat::Text
    }
}

fn read_csv_lines(path: &Path) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open CSV {}", path.display()))?;

    let mut lines = Vec::new();
    let mut column = 0usize;

    for (index, record) in reader.records().enumerate() {
        let record = record
            .with_context(|| format!("failed to read CSV row {} in {}", index + 1, path.display()))?;

        if index == 0 {
            if let Some(position) = record.iter().position(|cell| cell.trim() == "Text") {
                column = position;
                continue;
            }
        }

        let cell = record.get(column).unwrap_or_default();
        if cell.is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(cell.lines().map(ToOwned::to_owned));
    }

    Ok(lines)
}
