//! Bilingual export parsing: line reconstruction, classification and the
//! per-question state machine.

use std::collections::BTreeMap;

use crate::language::Language;
use crate::model::BilingualRecord;
use crate::util::id_coverage;

mod clean;
mod machine;
mod patterns;
mod reconstruct;
mod source;

pub use clean::TextCleaner;
pub use machine::{ExtractState, Extractor};
pub use patterns::{LineKind, LinePatterns};
pub use reconstruct::reconstruct_lines;
pub use source::read_source_lines;

#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub records: BTreeMap<u32, BilingualRecord>,
    pub missing_ids: Vec<u32>,
    pub extra_ids: Vec<u32>,
    pub incomplete_ids: Vec<u32>,
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    pub fn refresh_coverage(&mut self, expected_count: u32) {
        let (missing, extra) = id_coverage(self.records.keys().copied(), expected_count);
        self.missing_ids = missing;
        self.extra_ids = extra;
        self.incomplete_ids = self
            .records
            .values()
            .filter(|record| !record.has_target_question())
            .map(|record| record.id)
            .collect();
    }
}

pub fn extract_records(
    units: &[String],
    patterns: &LinePatterns,
    cleaner: &TextCleaner,
    language: Language,
    expected_count: u32,
) -> ExtractionReport {
    let mut extractor = Extractor::new(language);
    let mut report = ExtractionReport::default();

    for unit in units {
        let kind = patterns.classify(unit, language);
        if let Some(record) = extractor.step(kind) {
            store_record(&mut report, cleaner.clean_record(record));
        }
    }
    if let Some(record) = extractor.finish() {
        store_record(&mut report, cleaner.clean_record(record));
    }

    let mut warnings = extractor.take_warnings();
    warnings.append(&mut report.warnings);
    report.warnings = warnings;
    report.refresh_coverage(expected_count);
    report
}

fn store_record(report: &mut ExtractionReport, record: BilingualRecord) {
    let id = record.id;
    match report.records.get(&id) {
        Some(existing) if existing.has_target_question() && !record.has_target_question() => {
            report.warnings.push(format!(
                "question {id}: duplicate block without translation ignored"
            ));
        }
        Some(_) => {
            report
                .warnings
                .push(format!("question {id}: duplicate block replaces earlier one"));
            report.records.insert(id, record);
        }
        None => {
            report.records.insert(id, record);
        }
    }
}
