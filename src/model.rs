use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::language::{Category, Language};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectAnswer {
    pub text: String,
    #[serde(default)]
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrongAnswer {
    pub text: String,
}

/// One entry of `interview_questions_<lang>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    pub question: String,
    #[serde(default)]
    pub correct_answers: Vec<CorrectAnswer>,
    #[serde(default)]
    pub wrong_answers: Vec<WrongAnswer>,
}

/// Question extracted from a bilingual export, before review.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualRecord {
    pub id: u32,
    pub category_source: String,
    pub subcategory_source: String,
    pub category_target: String,
    pub subcategory_target: String,
    pub question_source: String,
    pub answers_source: Vec<String>,
    pub question_target: String,
    pub answers_target: Vec<String>,
}

impl BilingualRecord {
    /// Empty record with categories filled from the id range table.
    pub fn for_id(id: u32, language: Language) -> Self {
        let (category_source, category_target) = match Category::for_id(id) {
            Some(category) => (
                category.english_name().to_string(),
                language.category_name(category).to_string(),
            ),
            None => (String::new(), String::new()),
        };

        Self {
            id,
            category_source,
            category_target,
            ..Self::default()
        }
    }

    pub fn has_target_question(&self) -> bool {
        !self.question_target.trim().is_empty()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FragmentKind {
    Normal,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryFragment {
    #[serde(rename = "type")]
    pub kind: FragmentKind,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChapterTranslation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Section of a story chapter. Per-language keys (`content_<lang>`,
/// `sectionTitle_<lang>`) are kept as raw JSON so rewriting the file never
/// drops a language this tool does not know about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorySection {
    #[serde(rename = "linkedQuestions", default)]
    pub linked_questions: Vec<u32>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl StorySection {
    pub fn content_key(lang: &str) -> String {
        format!("content_{lang}")
    }

    #[cfg(test)]
    pub fn has_content(&self, lang: &str) -> bool {
        self.fields.contains_key(&Self::content_key(lang))
    }

    pub fn content(&self, lang: &str) -> Result<Option<Vec<StoryFragment>>> {
        let key = Self::content_key(lang);
        match self.fields.get(&key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .with_context(|| format!("invalid {key} fragments")),
        }
    }

    pub fn set_content(&mut self, lang: &str, fragments: &[StoryFragment]) -> Result<()> {
        let value = serde_json::to_value(fragments).context("failed to encode story fragments")?;
        self.fields.insert(Self::content_key(lang), value);
        Ok(())
    }

    pub fn section_title(&self, lang: &str) -> Option<&str> {
        self.fields
            .get(&format!("sectionTitle_{lang}"))
            .and_then(Value::as_str)
    }

    pub fn has_section_title_key(&self, lang: &str) -> bool {
        self.fields.contains_key(&format!("sectionTitle_{lang}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryChapter {
    #[serde(rename = "chapterId")]
    pub chapter_id: u32,
    #[serde(default)]
    pub translations: BTreeMap<String, ChapterTranslation>,
    #[serde(default)]
    pub sections: Vec<StorySection>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Root of `question_story.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryFile {
    #[serde(rename = "civicsStory")]
    pub civics_story: Vec<StoryChapter>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceFileEntry {
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractPaths {
    pub output_path: String,
    pub manifest_path: String,
    pub corrections_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractCounts {
    pub lines_read: usize,
    pub units_merged: usize,
    pub records_extracted: usize,
    pub incomplete_records: usize,
    pub records_filled: usize,
    pub records_overridden: usize,
    pub records_written: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub command: String,
    pub language: String,
    pub source: SourceFileEntry,
    pub paths: ExtractPaths,
    pub counts: ExtractCounts,
    pub missing_ids_before_patch: Vec<u32>,
    pub missing_ids: Vec<u32>,
    pub extra_ids: Vec<u32>,
    pub incomplete_ids: Vec<u32>,
    pub warnings: Vec<String>,
}

/// Markers left in files for text that still needs a human translation.
pub const PLACEHOLDER_MARKERS: [&str; 2] = ["[번역 필요]", "translation needed"];

pub fn contains_placeholder(text: &str) -> bool {
    let lowered = text.to_lowercase();
    PLACEHOLDER_MARKERS
        .iter()
        .any(|marker| lowered.contains(&marker.to_lowercase()))
}
