use anyhow::{Context, Result};
use regex::Regex;

use crate::language::{ENGLISH_DOCUMENT_TITLE, Language};
use crate::model::BilingualRecord;

pub struct TextCleaner {
    titles: Vec<&'static str>,
    trailing_page_number: Regex,
    whitespace: Regex,
}

impl TextCleaner {
    pub fn new(language: Language) -> Result<Self> {
        let mut titles = vec![ENGLISH_DOCUMENT_TITLE];
        titles.extend_from_slice(language.document_titles());

        Ok(Self {
            titles,
            trailing_page_number: Regex::new(r"(?P<end>[.?!)\]])\s+\d{1,2}\s*$")
                .context("failed to compile trailing page number regex")?,
            whitespace: Regex::new(r"\s+").context("failed to compile whitespace regex")?,
        })
    }

    pub fn clean(&self, text: &str) -> String {
        let mut value = text.to_string();
        for title in &self.titles {
            if value.contains(title) {
                value = value.replace(title, " ");
            }
        }

        let value = self
            .trailing_page_number
            .replace(&value, "$end")
            .into_owned();
        let value = self.whitespace.replace_all(&value, " ");
        let value = strip_unbalanced_quote(value.trim());

        value.trim_end_matches('*').trim().to_string()
    }

    pub fn clean_record(&self, mut record: BilingualRecord) -> BilingualRecord {
        record.question_source = self.clean(&record.question_source);
        record.question_target = self.clean(&record.question_target);
        record.subcategory_source = self.clean(&record.subcategory_source);
        record.subcategory_target = self.clean(&record.subcategory_target);
        record.answers_source = self.clean_answers(&record.answers_source);
        record.answers_target = self.clean_answers(&record.answers_target);
        record
    }

    fn clean_answers(&self, answers: &[String]) -> Vec<String> {
        answers
            .iter()
            .map(|answer| self.clean(answer))
            .filter(|answer| !answer.is_empty())
            .collect()
    }
}

/// CSV exports leave a lone quote at the start or end of a cell.
fn strip_unbalanced_quote(value: &str) -> &str {
    if value.matches('"').count() % 2 == 0 {
        return value;
    }

    if let Some(rest) = value.strip_prefix('"') {
        return rest.trim_start();
    }

    value.strip_suffix('"').map(str::trim_end).unwrap_or(value)
}
