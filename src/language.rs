use std::ops::RangeInclusive;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

const HANGUL: &[RangeInclusive<char>] = &['\u{AC00}'..='\u{D7AF}'];
const CJK: &[RangeInclusive<char>] = &['\u{4E00}'..='\u{9FFF}'];
const DEVANAGARI: &[RangeInclusive<char>] = &['\u{0900}'..='\u{097F}'];
const ARABIC: &[RangeInclusive<char>] = &[
    '\u{0600}'..='\u{06FF}',
    '\u{0750}'..='\u{077F}',
    '\u{08A0}'..='\u{08FF}',
    '\u{FB50}'..='\u{FDFF}',
    '\u{FE70}'..='\u{FEFF}',
];

const VIETNAMESE_MARKS: &str = "ăâđêôơưĂÂĐÊÔƠƯáàảãạắằẳẵặấầẩẫậéèẻẽẹếềểễệíìỉĩịóòỏõọốồổỗộớờởỡợúùủũụứừửữựýỳỷỹỵ";
const FRENCH_MARKS: &str = "àâäæçéèêëïîôùûüÿœÀÂÄÆÇÉÈÊËÏÎÔÙÛÜŸŒ";
const SPANISH_MARKS: &str = "áéíóúñüÁÉÍÓÚÑÜ¿¡";

/// Matches text written in one target script, either by Unicode block or by
/// a fixed set of marked letters for Latin-script languages.
#[derive(Debug, Clone, Copy)]
pub struct ScriptDetector {
    ranges: &'static [RangeInclusive<char>],
    marks: &'static str,
}

impl ScriptDetector {
    pub const fn new(ranges: &'static [RangeInclusive<char>], marks: &'static str) -> Self {
        Self { ranges, marks }
    }

    pub fn matches_char(&self, ch: char) -> bool {
        self.ranges.iter().any(|range| range.contains(&ch)) || self.marks.contains(ch)
    }

    pub fn contains(&self, text: &str) -> bool {
        text.chars().any(|ch| self.matches_char(ch))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Category {
    Government,
    History,
    Symbols,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Government, Self::History, Self::Symbols];

    pub fn for_id(id: u32) -> Option<Self> {
        match id {
            1..=72 => Some(Self::Government),
            73..=118 => Some(Self::History),
            119..=128 => Some(Self::Symbols),
            _ => None,
        }
    }

    pub fn english_name(self) -> &'static str {
        match self {
            Self::Government => "American Government",
            Self::History => "American History",
            Self::Symbols => "Symbols and Holidays",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ko,
    Zh,
    Hi,
    Ar,
    Vi,
    Fr,
    Es,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Self::Ko => "ko",
            Self::Zh => "zh",
            Self::Hi => "hi",
            Self::Ar => "ar",
            Self::Vi => "vi",
            Self::Fr => "fr",
            Self::Es => "es",
        }
    }

    /// Suffix used in review table headers, e.g. `Question_KO`.
    pub fn column_suffix(self) -> &'static str {
        match self {
            Self::Ko => "KO",
            Self::Zh => "ZH",
            Self::Hi => "HI",
            Self::Ar => "AR",
            Self::Vi => "VI",
            Self::Fr => "FR",
            Self::Es => "ES",
        }
    }

    pub fn detector(self) -> ScriptDetector {
        match self {
            Self::Ko => ScriptDetector::new(HANGUL, ""),
            Self::Zh => ScriptDetector::new(CJK, ""),
            Self::Hi => ScriptDetector::new(DEVANAGARI, ""),
            Self::Ar => ScriptDetector::new(ARABIC, ""),
            Self::Vi => ScriptDetector::new(&[], VIETNAMESE_MARKS),
            Self::Fr => ScriptDetector::new(&[], FRENCH_MARKS),
            Self::Es => ScriptDetector::new(&[], SPANISH_MARKS),
        }
    }

    /// Latin-script languages can only be told apart from English by marked
    /// letters, which many short lines lack.
    pub fn is_latin_script(self) -> bool {
        matches!(self, Self::Vi | Self::Fr | Self::Es)
    }

    /// Chinese exports drop the period after the question number.
    pub fn allows_unpunctuated_numbering(self) -> bool {
        matches!(self, Self::Zh)
    }

    pub fn category_name(self, category: Category) -> &'static str {
        match (self, category) {
            (Self::Ko, Category::Government) => "미국 정부",
            (Self::Ko, Category::History) => "미국 역사",
            (Self::Ko, Category::Symbols) => "상징과 공휴일",
            (Self::Zh, Category::Government) => "美国政府",
            (Self::Zh, Category::History) => "美国历史",
            (Self::Zh, Category::Symbols) => "标志与节日",
            (Self::Hi, Category::Government) => "अमेरिकी सरकार",
            (Self::Hi, Category::History) => "अमेरिकी इतिहास",
            (Self::Hi, Category::Symbols) => "प्रतीक और छुट्टियाँ",
            (Self::Ar, Category::Government) => "الحكومة الأمريكية",
            (Self::Ar, Category::History) => "التاريخ الأمريكي",
            (Self::Ar, Category::Symbols) => "الرموز والعطلات",
            (Self::Vi, Category::Government) => "Chính phủ Hoa Kỳ",
            (Self::Vi, Category::History) => "Lịch sử Hoa Kỳ",
            (Self::Vi, Category::Symbols) => "Biểu tượng và ngày lễ",
            (Self::Fr, Category::Government) => "Gouvernement Américain",
            (Self::Fr, Category::History) => "Histoire Américaine",
            (Self::Fr, Category::Symbols) => "Symboles et Jours Fériés",
            (Self::Es, Category::Government) => "Gobierno Estadounidense",
            (Self::Es, Category::History) => "Historia Estadounidense",
            (Self::Es, Category::Symbols) => "Símbolos y días feriados",
        }
    }

    /// Title lines repeated on every page of the bilingual export.
    pub fn document_titles(self) -> &'static [&'static str] {
        match self {
            Self::Ko => &["시민권 시험 문제 및 답변 128가지(2025년 버전)"],
            Self::Ar => &["128 سؤاالً وجواًبا عن التربية المدنية )نسخة 2025("],
            Self::Zh => &["128 道公民测试问题及答案（2025 年版）"],
            _ => &[],
        }
    }

    /// Returns the category a header line names, and whether it is the
    /// target-language spelling.
    pub fn match_category_header(self, line: &str) -> Option<(Category, bool)> {
        let trimmed = line.trim();
        Category::ALL.into_iter().find_map(|category| {
            if trimmed.eq_ignore_ascii_case(category.english_name()) {
                return Some((category, false));
            }
            if trimmed == self.category_name(category) {
                return Some((category, true));
            }
            None
        })
    }
}

pub const ENGLISH_DOCUMENT_TITLE: &str = "128 Civics Questions and Answers (2025 version)";

/// Parses an ASCII or Arabic-Indic digit run into a question number.
pub fn parse_question_number(digits: &str) -> Option<u32> {
    let mut value: u32 = 0;
    let mut seen = false;

    for ch in digits.chars() {
        let digit = match ch {
            '0'..='9' => ch as u32 - '0' as u32,
            '\u{0660}'..='\u{0669}' => ch as u32 - 0x0660,
            '\u{06F0}'..='\u{06F9}' => ch as u32 - 0x06F0,
            _ => return None,
        };
        value = value.checked_mul(10)?.checked_add(digit)?;
        seen = true;
    }

    seen.then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detectors_match_their_own_script_only() {
        assert!(Language::Ko.detector().contains("43. 현재 주의 상원의원은?"));
        assert!(!Language::Ko.detector().contains("43. Who is one of your state's U.S. Senators now?"));
        assert!(Language::Ar.detector().contains("ما هو حق"));
        assert!(Language::Zh.detector().contains("美国政府"));
        assert!(Language::Hi.detector().contains("अमेरिकी सरकार"));
        assert!(Language::Vi.detector().contains("Chính phủ"));
        assert!(Language::Fr.detector().contains("Qu'est-ce que la Déclaration ?"));
        assert!(!Language::Fr.detector().contains("What is the Declaration?"));
        assert!(Language::Es.detector().contains("¿Qué es?"));
    }

    #[test]
    fn category_ranges_cover_all_question_ids() {
        assert_eq!(Category::for_id(1), Some(Category::Government));
        assert_eq!(Category::for_id(72), Some(Category::Government));
        assert_eq!(Category::for_id(73), Some(Category::History));
        assert_eq!(Category::for_id(118), Some(Category::History));
        assert_eq!(Category::for_id(119), Some(Category::Symbols));
        assert_eq!(Category::for_id(128), Some(Category::Symbols));
        assert_eq!(Category::for_id(0), None);
        assert_eq!(Category::for_id(129), None);
    }

    #[test]
    fn category_headers_match_both_languages() {
        assert_eq!(
            Language::Ko.match_category_header("AMERICAN HISTORY"),
            Some((Category::History, false))
        );
        assert_eq!(
            Language::Ko.match_category_header("미국 정부"),
            Some((Category::Government, true))
        );
        assert_eq!(Language::Ko.match_category_header("A: Principles"), None);
    }

    #[test]
    fn question_numbers_accept_arabic_indic_digits() {
        assert_eq!(parse_question_number("43"), Some(43));
        assert_eq!(parse_question_number("١١"), Some(11));
        assert_eq!(parse_question_number("۱۲۸"), Some(128));
        assert_eq!(parse_question_number(""), None);
        assert_eq!(parse_question_number("4a"), None);
    }
}
