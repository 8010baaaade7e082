use anyhow::{Context, Result};
use regex::Regex;

use crate::language::{ENGLISH_DOCUMENT_TITLE, Language, parse_question_number};

/// Lexical classification of one reconstructed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Question { id: u32, text: String, target: bool },
    Answer { text: String, target: bool },
    Subcategory { text: String, target: bool },
    Category { text: String, target: bool },
    Noise,
    Text(String),
}

pub struct LinePatterns {
    numbered: Regex,
    numbered_rtl: Regex,
    inline_numbered: Regex,
    subcategory: Regex,
    bullet: Regex,
    page_number: Regex,
    page_footer: Regex,
}

impl LinePatterns {
    pub fn new() -> Result<Self> {
        Ok(Self {
            numbered: Regex::new(r#"^"?(?P<id>[0-9\x{0660}-\x{0669}\x{06F0}-\x{06F9}]+)\.\s*(?P<body>.+)$"#)
                .context("failed to compile numbered question regex")?,
            numbered_rtl: Regex::new(r#"^"?\.(?P<id>[0-9\x{0660}-\x{0669}\x{06F0}-\x{06F9}]+)\s*(?P<body>.+)$"#)
                .context("failed to compile right-to-left question regex")?,
            inline_numbered: Regex::new(r"^(?P<id>\d+)(?P<body>[\x{4E00}-\x{9FFF}].*)$")
                .context("failed to compile inline question regex")?,
            subcategory: Regex::new(r#"^"?(?P<letter>[A-Z]|[أبج])\s*[:：]\s*(?P<body>.+)$"#)
                .context("failed to compile subcategory regex")?,
            bullet: Regex::new(r#"^"?[●•]\s*(?P<body>.*)$"#)
                .context("failed to compile bullet regex")?,
            page_number: Regex::new(r"^\d{1,3}$").context("failed to compile page number regex")?,
            page_footer: Regex::new(r"(?i)^(?:uscis\.gov\S*\s*)?(?:page\s+)?\d+\s+of\s+\d+$")
                .context("failed to compile page footer regex")?,
        })
    }

    pub fn is_noise(&self, line: &str, language: Language) -> bool {
        let trimmed = line.trim();
        trimmed.is_empty()
            || self.page_number.is_match(trimmed)
            || self.page_footer.is_match(trimmed)
            || trimmed.contains(ENGLISH_DOCUMENT_TITLE)
            || language
                .document_titles()
                .iter()
                .any(|title| trimmed.contains(title))
    }

    pub fn is_bullet(&self, line: &str) -> bool {
        self.bullet.is_match(line.trim())
    }

    pub fn is_subcategory(&self, line: &str) -> bool {
        self.subcategory.is_match(line.trim())
    }

    /// Question number and body when `line` opens a numbered question.
    pub fn question_parts<'a>(&self, line: &'a str, language: Language) -> Option<(u32, &'a str)> {
        let trimmed = line.trim();
        let captures = self
            .numbered
            .captures(trimmed)
            .or_else(|| self.numbered_rtl.captures(trimmed))
            .or_else(|| {
                language
                    .allows_unpunctuated_numbering()
                    .then(|| self.inline_numbered.captures(trimmed))
                    .flatten()
            })?;

        let id = parse_question_number(captures.name("id")?.as_str())?;
        let body = captures.name("body")?.as_str().trim();
        Some((id, body))
    }

    pub fn classify(&self, line: &str, language: Language) -> LineKind {
        let trimmed = line.trim();
        if self.is_noise(trimmed, language) {
            return LineKind::Noise;
        }

        let detector = language.detector();
        let target = detector.contains(trimmed);

        if language.match_category_header(trimmed).is_some() {
            return LineKind::Category {
                text: trimmed.to_string(),
                target,
            };
        }

        if let Some(captures) = self.subcategory.captures(trimmed) {
            let body = captures
                .name("body")
                .map(|value| value.as_str().trim().to_string())
                .unwrap_or_default();
            return LineKind::Subcategory { text: body, target };
        }

        if let Some(captures) = self.bullet.captures(trimmed) {
            let body = captures
                .name("body")
                .map(|value| value.as_str().trim().to_string())
                .unwrap_or_default();
            return LineKind::Answer { text: body, target };
        }

        if let Some((id, body)) = self.question_parts(trimmed, language) {
            return LineKind::Question {
                id,
                text: body.to_string(),
                target,
            };
        }

        LineKind::Text(trimmed.to_string())
    }
}
