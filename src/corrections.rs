use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::language::{Category, Language};
use crate::model::{BilingualRecord, CorrectAnswer, QuestionRecord, WrongAnswer};
use crate::util::read_json;

pub const CORRECTIONS_VERSION: u32 = 1;

/// How a corrections table treats records that already exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchMode {
    /// Every supplied field overwrites the existing value.
    #[default]
    Override,
    /// Absent records are created; existing ones only gain fields that are
    /// still empty.
    FillMissing,
}

/// Versioned table of per-question field overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Corrections<P> {
    pub version: u32,
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub mode: PatchMode,
    #[serde(default = "BTreeMap::new")]
    pub records: BTreeMap<u32, P>,
}

impl<P> Corrections<P> {
    pub fn ensure_language(&self, language: Language) -> Result<()> {
        match self.language {
            Some(declared) if declared != language => bail!(
                "corrections are for language {} but {} was requested",
                declared.code(),
                language.code()
            ),
            _ => Ok(()),
        }
    }
}

/// Overrides for one extracted bilingual record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordPatch {
    pub category_source: Option<String>,
    pub subcategory_source: Option<String>,
    pub category_target: Option<String>,
    pub subcategory_target: Option<String>,
    pub question_source: Option<String>,
    pub answers_source: Option<Vec<String>>,
    pub question_target: Option<String>,
    pub answers_target: Option<Vec<String>>,
}

impl RecordPatch {
    /// Writes every supplied field into `record`. Returns whether anything
    /// changed.
    pub fn apply(&self, record: &mut BilingualRecord) -> bool {
        let mut changed = false;
        changed |= overwrite(&mut record.category_source, &self.category_source);
        changed |= overwrite(&mut record.subcategory_source, &self.subcategory_source);
        changed |= overwrite(&mut record.category_target, &self.category_target);
        changed |= overwrite(&mut record.subcategory_target, &self.subcategory_target);
        changed |= overwrite(&mut record.question_source, &self.question_source);
        changed |= overwrite(&mut record.answers_source, &self.answers_source);
        changed |= overwrite(&mut record.question_target, &self.question_target);
        changed |= overwrite(&mut record.answers_target, &self.answers_target);
        changed
    }

    /// Like [`RecordPatch::apply`], but leaves non-empty fields alone.
    pub fn fill(&self, record: &mut BilingualRecord) -> bool {
        let mut changed = false;
        changed |= fill_text(&mut record.category_source, &self.category_source);
        changed |= fill_text(&mut record.subcategory_source, &self.subcategory_source);
        changed |= fill_text(&mut record.category_target, &self.category_target);
        changed |= fill_text(&mut record.subcategory_target, &self.subcategory_target);
        changed |= fill_text(&mut record.question_source, &self.question_source);
        changed |= fill_list(&mut record.answers_source, &self.answers_source);
        changed |= fill_text(&mut record.question_target, &self.question_target);
        changed |= fill_list(&mut record.answers_target, &self.answers_target);
        changed
    }
}

/// Overrides for one application question. `addWrongAnswers` entries are
/// appended unless a wrong answer with the same text already exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct QuestionPatch {
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub question: Option<String>,
    pub correct_answers: Option<Vec<CorrectAnswer>>,
    pub wrong_answers: Option<Vec<WrongAnswer>>,
    #[serde(default)]
    pub add_wrong_answers: Vec<WrongAnswer>,
}

impl QuestionPatch {
    pub fn apply(&self, record: &mut QuestionRecord) -> bool {
        let mut changed = false;
        changed |= overwrite(&mut record.category, &self.category);
        changed |= overwrite(&mut record.subcategory, &self.subcategory);
        changed |= overwrite(&mut record.question, &self.question);
        changed |= overwrite(&mut record.correct_answers, &self.correct_answers);
        changed |= overwrite(&mut record.wrong_answers, &self.wrong_answers);

        for wrong in &self.add_wrong_answers {
            let present = record
                .wrong_answers
                .iter()
                .any(|existing| existing.text.trim() == wrong.text.trim());
            if !present {
                record.wrong_answers.push(wrong.clone());
                changed = true;
            }
        }

        changed
    }

    fn create(&self, id: u32) -> Option<QuestionRecord> {
        let question = self.question.clone()?;
        let mut record = QuestionRecord {
            id,
            category: Category::for_id(id)
                .map(|category| category.english_name().to_string())
                .unwrap_or_default(),
            subcategory: String::new(),
            question,
            correct_answers: Vec::new(),
            wrong_answers: Vec::new(),
        };
        self.apply(&mut record);
        Some(record)
    }
}

fn overwrite<T: Clone + PartialEq>(slot: &mut T, value: &Option<T>) -> bool {
    match value {
        Some(value) if slot != value => {
            *slot = value.clone();
            true
        }
        _ => false,
    }
}

fn fill_text(slot: &mut String, value: &Option<String>) -> bool {
    match value {
        Some(value) if slot.trim().is_empty() && !value.is_empty() => {
            *slot = value.clone();
            true
        }
        _ => false,
    }
}

fn fill_list(slot: &mut Vec<String>, value: &Option<Vec<String>>) -> bool {
    match value {
        Some(value) if slot.is_empty() && !value.is_empty() => {
            *slot = value.clone();
            true
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchSummary {
    /// Ids the patch created because extraction did not produce them.
    pub filled: Vec<u32>,
    /// Existing ids whose fields changed.
    pub overridden: Vec<u32>,
    /// Ids that could not be created from the patch alone.
    pub skipped: Vec<u32>,
}

pub fn load_corrections<P: DeserializeOwned>(path: &Path) -> Result<Corrections<P>> {
    let corrections: Corrections<P> = read_json(path)?;
    if corrections.version != CORRECTIONS_VERSION {
        bail!(
            "unsupported corrections version {} in {} (expected {})",
            corrections.version,
            path.display(),
            CORRECTIONS_VERSION
        );
    }
    Ok(corrections)
}

/// Corrections shipped with the tool for exports known to lose records.
pub fn builtin_record_corrections(language: Language) -> Result<Option<Corrections<RecordPatch>>> {
    let raw = match language {
        Language::Ar => include_str!("../data/corrections/ar.json"),
        Language::Zh => include_str!("../data/corrections/zh.json"),
        _ => return Ok(None),
    };

    let corrections: Corrections<RecordPatch> = serde_json::from_str(raw)
        .with_context(|| format!("failed to parse built-in corrections for {}", language.code()))?;
    Ok(Some(corrections))
}

pub fn apply_record_patches(
    records: &mut BTreeMap<u32, BilingualRecord>,
    corrections: &Corrections<RecordPatch>,
    language: Language,
) -> PatchSummary {
    let mut summary = PatchSummary::default();

    for (&id, patch) in &corrections.records {
        match records.get_mut(&id) {
            Some(record) => {
                let changed = match corrections.mode {
                    PatchMode::Override => patch.apply(record),
                    PatchMode::FillMissing => patch.fill(record),
                };
                if changed {
                    summary.overridden.push(id);
                }
            }
            None => {
                let mut record = BilingualRecord::for_id(id, language);
                patch.apply(&mut record);
                records.insert(id, record);
                summary.filled.push(id);
            }
        }
    }

    summary
}

/// Applies question patches in place and keeps the list ordered by id.
pub fn apply_question_patches(
    questions: &mut Vec<QuestionRecord>,
    corrections: &Corrections<QuestionPatch>,
) -> PatchSummary {
    let mut summary = PatchSummary::default();

    for (&id, patch) in &corrections.records {
        match questions.iter_mut().find(|question| question.id == id) {
            Some(_) if corrections.mode == PatchMode::FillMissing => {}
            Some(question) => {
                if patch.apply(question) {
                    summary.overridden.push(id);
                }
            }
            None => match patch.create(id) {
                Some(question) => {
                    questions.push(question);
                    summary.filled.push(id);
                }
                None => summary.skipped.push(id),
            },
        }
    }

    questions.sort_by_key(|question| question.id);
    summary
}
