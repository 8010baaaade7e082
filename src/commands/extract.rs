use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::{ExtractArgs, InputFormat};
use crate::corrections::{
    Corrections, RecordPatch, apply_record_patches, builtin_record_corrections, load_corrections,
};
use crate::extraction::{
    LinePatterns, TextCleaner, extract_records, read_source_lines, reconstruct_lines,
};
use crate::language::Language;
use crate::model::{
    BilingualRecord, ExtractCounts, ExtractPaths, ExtractRunManifest, SourceFileEntry,
};
use crate::tables::write_bilingual_table;
use crate::util::{
    EXPECTED_QUESTION_COUNT, ensure_input_exists, now_utc_string, sha256_file, utc_compact_string,
    write_json_pretty,
};

pub fn run(args: ExtractArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    ensure_input_exists(&args.input)?;
    let manifest_path = args
        .manifest_path
        .clone()
        .unwrap_or_else(|| default_manifest_path(&args.output));

    info!(
        input = %args.input.display(),
        language = args.language.code(),
        run_id = %run_id,
        "starting extraction"
    );

    let lines = read_source_lines(&args.input, args.input_format)?;
    let patterns = LinePatterns::new()?;
    let cleaner = TextCleaner::new(args.language)?;
    let units = reconstruct_lines(&lines, &patterns, args.language);
    let mut report = extract_records(
        &units,
        &patterns,
        &cleaner,
        args.language,
        args.expected_count,
    );

    let records_extracted = report.records.len();
    let incomplete_before_patch = report.incomplete_ids.len();
    let missing_ids_before_patch = report.missing_ids.clone();

    let (corrections, corrections_label) = resolve_corrections(&args)?;
    let summary = match &corrections {
        Some(corrections) => {
            corrections.ensure_language(args.language)?;
            apply_record_patches(&mut report.records, corrections, args.language)
        }
        None => Default::default(),
    };
    report.refresh_coverage(args.expected_count);

    if !summary.filled.is_empty() || !summary.overridden.is_empty() {
        info!(
            corrections = %corrections_label.as_deref().unwrap_or_default(),
            filled = ?summary.filled,
            overridden = ?summary.overridden,
            "applied corrections"
        );
    }

    let records_written = write_records(&args.output, &report.records, args.language)?;

    for warning in &report.warnings {
        warn!(warning = %warning, "extraction warning");
    }
    if !report.missing_ids.is_empty() {
        warn!(missing = ?report.missing_ids, "question ids missing after corrections");
    }
    if !report.extra_ids.is_empty() {
        warn!(extra = ?report.extra_ids, "question ids outside the expected range");
    }
    if !report.incomplete_ids.is_empty() {
        warn!(incomplete = ?report.incomplete_ids, "records without target question");
    }

    let status = if report.missing_ids.is_empty() && report.incomplete_ids.is_empty() {
        "completed"
    } else {
        "completed_with_gaps"
    };

    let manifest = ExtractRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        status: status.to_string(),
        started_at,
        updated_at: now_utc_string(),
        command: render_extract_command(&args),
        language: args.language.code().to_string(),
        source: SourceFileEntry {
            path: args.input.display().to_string(),
            sha256: sha256_file(&args.input)?,
        },
        paths: ExtractPaths {
            output_path: args.output.display().to_string(),
            manifest_path: manifest_path.display().to_string(),
            corrections_path: corrections_label,
        },
        counts: ExtractCounts {
            lines_read: lines.len(),
            units_merged: units.len(),
            records_extracted,
            incomplete_records: incomplete_before_patch,
            records_filled: summary.filled.len(),
            records_overridden: summary.overridden.len(),
            records_written,
        },
        missing_ids_before_patch,
        missing_ids: report.missing_ids.clone(),
        extra_ids: report.extra_ids.clone(),
        incomplete_ids: report.incomplete_ids.clone(),
        warnings: report.warnings.clone(),
    };
    write_json_pretty(&manifest_path, &manifest)?;

    info!(
        run_id = %run_id,
        status,
        output = %args.output.display(),
        manifest = %manifest_path.display(),
        records_written,
        missing = report.missing_ids.len(),
        "extraction completed"
    );

    Ok(())
}

fn default_manifest_path(output: &Path) -> PathBuf {
    PathBuf::from(format!("{}.manifest.json", output.display()))
}

fn resolve_corrections(
    args: &ExtractArgs,
) -> Result<(Option<Corrections<RecordPatch>>, Option<String>)> {
    if let Some(path) = &args.corrections {
        let corrections = load_corrections(path)?;
        return Ok((Some(corrections), Some(path.display().to_string())));
    }

    if args.no_builtin_corrections {
        return Ok((None, None));
    }

    let builtin = builtin_record_corrections(args.language)?;
    let label = builtin
        .as_ref()
        .map(|_| format!("builtin:{}", args.language.code()));
    Ok((builtin, label))
}

/// Writes the review table, or the raw records when the output is `.json`.
fn write_records(
    output: &Path,
    records: &BTreeMap<u32, BilingualRecord>,
    language: Language,
) -> Result<usize> {
    let is_json = output
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        let values = records.values().collect::<Vec<_>>();
        write_json_pretty(output, &values)?;
        return Ok(values.len());
    }

    write_bilingual_table(output, records.values(), language)
}

fn render_extract_command(args: &ExtractArgs) -> String {
    let mut command = vec![
        "civics-prep".to_string(),
        "extract".to_string(),
        "--input".to_string(),
        args.input.display().to_string(),
        "--output".to_string(),
        args.output.display().to_string(),
        "--language".to_string(),
        args.language.code().to_string(),
    ];

    if let Some(path) = &args.corrections {
        command.push("--corrections".to_string());
        command.push(path.display().to_string());
    }
    if args.no_builtin_corrections {
        command.push("--no-builtin-corrections".to_string());
    }
    if let Some(path) = &args.manifest_path {
        command.push("--manifest-path".to_string());
        command.push(path.display().to_string());
    }
    if args.input_format != InputFormat::Auto {
        command.push("--input-format".to_string());
        command.push(args.input_format.as_str().to_string());
    }
    if args.expected_count != EXPECTED_QUESTION_COUNT {
        command.push("--expected-count".to_string());
        command.push(args.expected_count.to_string());
    }

    command.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARABIC_EXPORT: &str = "\
American Government
الحكومة الأمريكية
A: Principles of American Government
أ: مبادئ الحكومة الأمريكية
10. What does the Constitution do?
● Sets up the government
● Defines powers of
government
.١٠ ماذا يفعل الدستور؟
● يؤسس الحكومة
● يحدد صلاحيات الحكومة
uscis.gov/citizenship 2 of 19
12. What is the economic system of the United States?
● Capitalism
.١٢ ما هو النظام الاقتصادي للولايات المتحدة؟
● الرأسمالية
";

    fn args_for(dir: &Path, output: &str) -> ExtractArgs {
        let input = dir.join("arabic_export.txt");
        std::fs::write(&input, ARABIC_EXPORT).expect("write input");

        ExtractArgs {
            input,
            output: dir.join(output),
            language: Language::Ar,
            corrections: None,
            no_builtin_corrections: false,
            manifest_path: None,
            input_format: InputFormat::Auto,
            expected_count: 12,
        }
    }

    #[test]
    fn run_fills_arabic_question_11_from_builtin_corrections() {
        let dir = tempfile::tempdir().expect("tempdir");
        let args = args_for(dir.path(), "arabic_questions.json");
        let output = args.output.clone();

        run(args).expect("extract");

        let records: Vec<BilingualRecord> =
            crate::util::read_json(&output).expect("read records");
        let by_id = |id: u32| {
            records
                .iter()
                .find(|record| record.id == id)
                .expect("record present")
        };
        assert_eq!(by_id(10).answers_source[1], "Defines powers of government");
        assert_eq!(by_id(10).subcategory_target, "مبادئ الحكومة الأمريكية");
        assert_eq!(
            by_id(11).question_target,
            "ما هو حق أو حرية واحدة من التعديل الأول؟"
        );
        assert_eq!(by_id(4).answers_target.len(), 5);

        let manifest: serde_json::Value =
            crate::util::read_json(&default_manifest_path(&output)).expect("read manifest");
        assert_eq!(manifest["status"], "completed_with_gaps");
        assert_eq!(manifest["paths"]["corrections_path"], "builtin:ar");
        assert_eq!(manifest["counts"]["records_extracted"], 2);
        assert_eq!(manifest["counts"]["records_filled"], 17);
        assert_eq!(manifest["counts"]["records_overridden"], 0);
        assert!(
            manifest["missing_ids_before_patch"]
                .as_array()
                .expect("array")
                .contains(&serde_json::json!(11))
        );
        assert_eq!(
            manifest["missing_ids"],
            serde_json::json!([1, 2, 3, 5, 6, 7, 8, 9])
        );
    }

    #[test]
    fn run_fills_chinese_gaps_from_builtin_corrections() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("chinese_export.txt");
        std::fs::write(
            &input,
            "\
15. Who makes federal laws?
● Congress
15谁制定联邦法律？
● 国会
17. The President of the United States is in charge of which branch of government?
● Executive branch
17美国总统负责哪个政府分支？
● 行政部门
",
        )
        .expect("write input");
        let output = dir.path().join("chinese_questions.json");

        run(ExtractArgs {
            input,
            output: output.clone(),
            language: Language::Zh,
            corrections: None,
            no_builtin_corrections: false,
            manifest_path: None,
            input_format: InputFormat::Auto,
            expected_count: 17,
        })
        .expect("extract");

        let records: Vec<BilingualRecord> =
            crate::util::read_json(&output).expect("read records");
        let sixteen = records
            .iter()
            .find(|record| record.id == 16)
            .expect("question 16 filled");
        assert_eq!(sixteen.question_target, "说出政府的三个分支。");
        assert_eq!(
            sixteen.answers_source,
            vec![
                "Legislative, executive, and judicial".to_string(),
                "Congress, president, and the courts".to_string()
            ]
        );

        let manifest: serde_json::Value =
            crate::util::read_json(&default_manifest_path(&output)).expect("read manifest");
        assert_eq!(manifest["paths"]["corrections_path"], "builtin:zh");
        assert!(
            !manifest["missing_ids"]
                .as_array()
                .expect("array")
                .contains(&serde_json::json!(16))
        );
    }

    #[test]
    fn run_without_builtin_corrections_reports_gap() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut args = args_for(dir.path(), "arabic_table.csv");
        args.no_builtin_corrections = true;
        args.manifest_path = Some(dir.path().join("manifests/extract.json"));
        let output = args.output.clone();

        run(args).expect("extract");

        let mut reader = csv::Reader::from_path(&output).expect("open table");
        let ids = reader
            .records()
            .map(|row| row.expect("row")[0].to_string())
            .collect::<Vec<String>>();
        assert_eq!(ids, vec!["10", "12"]);

        let manifest: serde_json::Value =
            crate::util::read_json(&dir.path().join("manifests/extract.json")).expect("manifest");
        assert!(manifest["paths"]["corrections_path"].is_null());
        assert!(
            manifest["missing_ids"]
                .as_array()
                .expect("array")
                .contains(&serde_json::json!(11))
        );
    }

    #[test]
    fn render_extract_command_includes_non_default_flags() {
        let args = ExtractArgs {
            input: PathBuf::from("raw/korean.txt"),
            output: PathBuf::from("out/korean.csv"),
            language: Language::Ko,
            corrections: Some(PathBuf::from("data/corrections/ko.json")),
            no_builtin_corrections: false,
            manifest_path: None,
            input_format: InputFormat::Csv,
            expected_count: EXPECTED_QUESTION_COUNT,
        };

        let command = render_extract_command(&args);
        assert!(command.starts_with("civics-prep extract --input raw/korean.txt"));
        assert!(command.contains("--language ko"));
        assert!(command.contains("--corrections data/corrections/ko.json"));
        assert!(command.contains("--input-format csv"));
        assert!(!command.contains("--expected-count"));
    }
}
