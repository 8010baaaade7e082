//! Review CSV tables: the bilingual extraction table, the completed
//! question table and the long `ID, DataName, Value` translation sheet.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::cli::{CorrectSplit, TableLayout};
use crate::language::Language;
use crate::model::{BilingualRecord, CorrectAnswer, QuestionRecord, WrongAnswer};
use crate::util::ensure_directory;

pub const COMPLETED_HEADERS: [&str; 7] = [
    "Index",
    "Category",
    "SubCategory",
    "Questions",
    "Answers",
    "rationale",
    "Wrong",
];

const ANSWER_SEPARATOR: &str = ", ";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Opens a CSV writer, creating parent directories. With `bom` set the file
/// starts with a UTF-8 byte order mark so spreadsheet tools pick the right
/// encoding.
pub fn create_csv_writer(path: &Path, bom: bool) -> Result<csv::Writer<File>> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let mut file =
        File::create(path).with_context(|| format!("failed to create CSV {}", path.display()))?;
    if bom {
        file.write_all(UTF8_BOM)
            .with_context(|| format!("failed to write CSV {}", path.display()))?;
    }

    Ok(csv::Writer::from_writer(file))
}

/// Header names mapped to column positions. A leading byte order mark on the
/// first header is ignored.
pub fn header_index(headers: &csv::StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(index, name)| (name.trim_start_matches('\u{feff}').trim().to_string(), index))
        .collect()
}

pub fn require_column(
    columns: &HashMap<String, usize>,
    name: &str,
    path: &Path,
) -> Result<usize> {
    match columns.get(name) {
        Some(index) => Ok(*index),
        None => bail!("missing CSV column {name} in {}", path.display()),
    }
}

pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

pub fn bilingual_headers(language: Language) -> Vec<String> {
    let suffix = language.column_suffix();
    vec![
        "Index".to_string(),
        "Category_EN".to_string(),
        "SubCategory_EN".to_string(),
        format!("Category_{suffix}"),
        format!("SubCategory_{suffix}"),
        "Question_EN".to_string(),
        "Answers_EN".to_string(),
        format!("Question_{suffix}"),
        format!("Answers_{suffix}"),
    ]
}

/// Writes the side-by-side review table for extracted records. Returns the
/// number of rows written.
pub fn write_bilingual_table<'a>(
    path: &Path,
    records: impl IntoIterator<Item = &'a BilingualRecord>,
    language: Language,
) -> Result<usize> {
    let mut writer = create_csv_writer(path, true)?;
    writer
        .write_record(bilingual_headers(language))
        .with_context(|| format!("failed to write CSV header to {}", path.display()))?;

    let mut rows = 0usize;
    for record in records {
        writer
            .write_record([
                record.id.to_string(),
                record.category_source.clone(),
                record.subcategory_source.clone(),
                record.category_target.clone(),
                record.subcategory_target.clone(),
                record.question_source.clone(),
                record.answers_source.join(ANSWER_SEPARATOR),
                record.question_target.clone(),
                record.answers_target.join(ANSWER_SEPARATOR),
            ])
            .with_context(|| format!("failed to write question {} to {}", record.id, path.display()))?;
        rows += 1;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush CSV {}", path.display()))?;
    Ok(rows)
}

/// Each non-empty line of the `Answers` cell is one answer (split further on
/// commas in comma mode). When the answer has several lines and the
/// rationale cell has exactly as many, rationales pair up line by line;
/// otherwise the whole rationale is shared.
pub fn split_correct_answers(cell: &str, rationale: &str, split: CorrectSplit) -> Vec<CorrectAnswer> {
    let lines = cell
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<&str>>();
    let per_line = rationale.split('\n').map(str::trim).collect::<Vec<&str>>();
    let shared = rationale.trim();
    let paired = lines.len() > 1 && per_line.len() == lines.len();

    let mut answers = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        let rationale = if paired {
            per_line.get(index).copied().unwrap_or(shared)
        } else {
            shared
        };
        let texts = match split {
            CorrectSplit::Whole => vec![normalize_whitespace(line)],
            CorrectSplit::Comma => line.split(',').map(normalize_whitespace).collect(),
        };
        answers.extend(
            texts
                .into_iter()
                .filter(|text| !text.is_empty())
                .map(|text| CorrectAnswer {
                    text,
                    rationale: rationale.to_string(),
                }),
        );
    }
    answers
}

/// Rationale cell for the completed table: the shared rationale when all
/// answers agree, else one line per answer.
fn completed_rationale(answers: &[CorrectAnswer]) -> String {
    let Some(first) = answers.first() else {
        return String::new();
    };
    if answers.iter().all(|answer| answer.rationale == first.rationale) {
        return first.rationale.clone();
    }

    answers
        .iter()
        .map(|answer| normalize_whitespace(&answer.rationale))
        .collect::<Vec<String>>()
        .join("\n")
}

/// One wrong answer per non-empty line of the cell.
pub fn split_wrong_answers(cell: &str) -> Vec<WrongAnswer> {
    cell.lines()
        .map(normalize_whitespace)
        .filter(|text| !text.is_empty())
        .map(|text| WrongAnswer { text })
        .collect()
}

/// Reads the completed review table into question records ordered by id.
pub fn read_completed_table(path: &Path, split: CorrectSplit) -> Result<Vec<QuestionRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open CSV {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read CSV header in {}", path.display()))?
        .clone();
    let columns = header_index(&headers);

    let index_col = require_column(&columns, "Index", path)?;
    let question_col = require_column(&columns, "Questions", path)?;
    let answers_col = require_column(&columns, "Answers", path)?;
    let category_col = columns.get("Category").copied();
    let subcategory_col = columns.get("SubCategory").copied();
    let rationale_col = columns.get("rationale").copied();
    let wrong_col = columns.get("Wrong").copied();

    let mut questions = Vec::new();
    for (row_index, row) in reader.records().enumerate() {
        let row = row.with_context(|| {
            format!("failed to read CSV row {} in {}", row_index + 2, path.display())
        })?;
        let cell = |column: Option<usize>| {
            column
                .and_then(|column| row.get(column))
                .unwrap_or_default()
        };

        let raw_id = cell(Some(index_col)).trim();
        if raw_id.is_empty() {
            continue;
        }
        let id = raw_id.parse::<u32>().with_context(|| {
            format!(
                "unparsable question index {raw_id:?} on row {} of {}",
                row_index + 2,
                path.display()
            )
        })?;

        questions.push(QuestionRecord {
            id,
            category: normalize_whitespace(cell(category_col)),
            subcategory: normalize_whitespace(cell(subcategory_col)),
            question: normalize_whitespace(cell(Some(question_col))),
            correct_answers: split_correct_answers(
                cell(Some(answers_col)),
                cell(rationale_col),
                split,
            ),
            wrong_answers: split_wrong_answers(cell(wrong_col)),
        });
    }

    questions.sort_by_key(|question| question.id);
    Ok(questions)
}

/// Inverse of [`read_completed_table`].
pub fn write_completed_table(path: &Path, questions: &[QuestionRecord]) -> Result<usize> {
    let mut writer = create_csv_writer(path, true)?;
    writer
        .write_record(COMPLETED_HEADERS)
        .with_context(|| format!("failed to write CSV header to {}", path.display()))?;

    for question in questions {
        let answers = question
            .correct_answers
            .iter()
            .map(|answer| normalize_whitespace(&answer.text))
            .collect::<Vec<String>>()
            .join("\n");
        let rationale = completed_rationale(&question.correct_answers);
        let wrong = question
            .wrong_answers
            .iter()
            .map(|answer| answer.text.as_str())
            .collect::<Vec<&str>>()
            .join("\n");

        writer
            .write_record([
                question.id.to_string().as_str(),
                question.category.as_str(),
                question.subcategory.as_str(),
                question.question.as_str(),
                answers.as_str(),
                rationale.as_str(),
                wrong.as_str(),
            ])
            .with_context(|| {
                format!("failed to write question {} to {}", question.id, path.display())
            })?;
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush CSV {}", path.display()))?;
    Ok(questions.len())
}

/// Writes one `ID, DataName, Value` row per question field, the layout used
/// for bulk translation sheets.
pub fn write_long_table(path: &Path, questions: &[QuestionRecord]) -> Result<usize> {
    let mut writer = create_csv_writer(path, true)?;
    writer
        .write_record(["ID", "DataName", "Value"])
        .with_context(|| format!("failed to write CSV header to {}", path.display()))?;

    let mut rows = 0usize;
    for question in questions {
        let id = question.id.to_string();
        let mut entries = Vec::new();
        if !question.category.is_empty() {
            entries.push(("Category".to_string(), question.category.as_str()));
        }
        if !question.subcategory.is_empty() {
            entries.push(("SubCategory".to_string(), question.subcategory.as_str()));
        }
        entries.push(("Question".to_string(), question.question.as_str()));
        for (index, answer) in question.correct_answers.iter().enumerate() {
            entries.push((format!("Correct_Answer_{}", index + 1), answer.text.as_str()));
            entries.push((format!("Correct_Rationale_{}", index + 1), answer.rationale.as_str()));
        }
        for (index, answer) in question.wrong_answers.iter().enumerate() {
            entries.push((format!("Wrong_Answer_{}", index + 1), answer.text.as_str()));
        }

        for (name, value) in entries {
            writer
                .write_record([id.as_str(), name.as_str(), value])
                .with_context(|| {
                    format!("failed to write question {} to {}", question.id, path.display())
                })?;
            rows += 1;
        }
    }

    writer
        .flush()
        .with_context(|| format!("failed to flush CSV {}", path.display()))?;
    Ok(rows)
}

/// Field named by a `DataName` cell of the long sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LongField {
    Category,
    SubCategory,
    Question,
    CorrectAnswer(usize),
    CorrectRationale(usize),
    WrongAnswer(usize),
    WrongRationale,
}

impl LongField {
    fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        match name {
            "Category" => return Some(Self::Category),
            "SubCategory" => return Some(Self::SubCategory),
            _ if name.eq_ignore_ascii_case("question") => return Some(Self::Question),
            _ => {}
        }

        let (prefix, position) = name.rsplit_once('_')?;
        let position = position.parse::<usize>().ok().filter(|value| *value > 0)?;
        match prefix {
            "Correct_Answer" => Some(Self::CorrectAnswer(position)),
            "Correct_Rationale" => Some(Self::CorrectRationale(position)),
            "Wrong_Answer" => Some(Self::WrongAnswer(position)),
            "Wrong_Rationale" => Some(Self::WrongRationale),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct LongEntry {
    category: String,
    subcategory: String,
    question: String,
    correct: BTreeMap<usize, (String, String)>,
    wrong: BTreeMap<usize, String>,
}

/// Sheets read by the long reader, with the data names it did not know.
#[derive(Debug, Default)]
pub struct LongTable {
    pub questions: Vec<QuestionRecord>,
    pub unknown_fields: Vec<String>,
}

/// Reads an `ID, DataName, <value>` sheet back into question records. The
/// value column is `Value` when the header names it, else the third column
/// (translated sheets title it with a language code). A header row is
/// optional; rows without a numeric id are skipped.
pub fn read_long_table(path: &Path) -> Result<LongTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open CSV {}", path.display()))?;

    let mut id_col = 0usize;
    let mut name_col = 1usize;
    let mut value_col = 2usize;
    let mut entries = BTreeMap::<u32, LongEntry>::new();
    let mut unknown_fields = Vec::new();

    for (row_index, row) in reader.records().enumerate() {
        let row = row.with_context(|| {
            format!("failed to read CSV row {} in {}", row_index + 1, path.display())
        })?;

        if row_index == 0 {
            let columns = header_index(&row);
            if let Some(&index) = columns.get("DataName") {
                name_col = index;
                id_col = columns.get("ID").copied().unwrap_or(id_col);
                value_col = columns.get("Value").copied().unwrap_or(value_col);
                continue;
            }
        }

        let cell = |column: usize| row.get(column).unwrap_or_default();
        let Ok(id) = cell(id_col).trim_start_matches('\u{feff}').trim().parse::<u32>() else {
            continue;
        };
        let name = cell(name_col);
        let value = cell(value_col).trim().to_string();

        let Some(field) = LongField::parse(name) else {
            if !unknown_fields.iter().any(|known| known == name) {
                unknown_fields.push(name.to_string());
            }
            continue;
        };

        let entry = entries.entry(id).or_default();
        match field {
            LongField::Category => entry.category = value,
            LongField::SubCategory => entry.subcategory = value,
            LongField::Question => entry.question = value,
            LongField::CorrectAnswer(position) => entry.correct.entry(position).or_default().0 = value,
            LongField::CorrectRationale(position) => {
                entry.correct.entry(position).or_default().1 = value;
            }
            LongField::WrongAnswer(position) => {
                entry.wrong.insert(position, value);
            }
            LongField::WrongRationale => {}
        }
    }

    let questions = entries
        .into_iter()
        .map(|(id, entry)| QuestionRecord {
            id,
            category: entry.category,
            subcategory: entry.subcategory,
            question: entry.question,
            correct_answers: entry
                .correct
                .into_values()
                .filter(|(text, _)| !text.is_empty())
                .map(|(text, rationale)| CorrectAnswer { text, rationale })
                .collect(),
            wrong_answers: entry
                .wrong
                .into_values()
                .filter(|text| !text.is_empty())
                .map(|text| WrongAnswer { text })
                .collect(),
        })
        .collect();

    Ok(LongTable {
        questions,
        unknown_fields,
    })
}

/// Picks the layout from the header row: a `DataName` column means the long
/// sheet.
pub fn detect_table_layout(path: &Path) -> Result<TableLayout> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open CSV {}", path.display()))?;

    let mut first = csv::StringRecord::new();
    reader
        .read_record(&mut first)
        .with_context(|| format!("failed to read CSV header in {}", path.display()))?;

    if header_index(&first).contains_key("DataName") {
        Ok(TableLayout::Long)
    } else {
        Ok(TableLayout::Completed)
    }
}
