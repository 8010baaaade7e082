use std::collections::BTreeMap;

use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::{TableLayout, ToCsvArgs, ToJsonArgs};
use crate::model::QuestionRecord;
use crate::tables::{
    detect_table_layout, read_completed_table, read_long_table, write_completed_table,
    write_long_table,
};
use crate::util::{
    EXPECTED_QUESTION_COUNT, backup_file, default_backup_dir, ensure_input_exists, id_coverage,
    read_json, write_json_pretty,
};

pub fn run_to_json(args: ToJsonArgs) -> Result<()> {
    ensure_input_exists(&args.input)?;

    let layout = match args.input_layout {
        Some(layout) => layout,
        None => detect_table_layout(&args.input)?,
    };
    let questions = match layout {
        TableLayout::Completed => read_completed_table(&args.input, args.correct_split)?,
        TableLayout::Long => {
            let table = read_long_table(&args.input)?;
            if !table.unknown_fields.is_empty() {
                warn!(fields = ?table.unknown_fields, "ignored unknown sheet fields");
            }
            table.questions
        }
    };
    report_id_gaps(&questions);

    let backup_dir = args
        .backup_dir
        .clone()
        .unwrap_or_else(|| default_backup_dir(&args.output));
    if let Some(backup) = backup_file(&args.output, &backup_dir, Utc::now())? {
        info!(backup = %backup.display(), "backed up existing question file");
    }

    write_json_pretty(&args.output, &questions)?;

    for (category, count) in category_counts(&questions) {
        info!(category = %category, count, "questions per category");
    }
    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        layout = layout.as_str(),
        correct_split = args.correct_split.as_str(),
        questions = questions.len(),
        "converted table to json"
    );

    Ok(())
}

pub fn run_to_csv(args: ToCsvArgs) -> Result<()> {
    ensure_input_exists(&args.input)?;

    let mut questions: Vec<QuestionRecord> = read_json(&args.input)?;
    questions.sort_by_key(|question| question.id);

    let rows = match args.layout {
        TableLayout::Completed => write_completed_table(&args.output, &questions)?,
        TableLayout::Long => write_long_table(&args.output, &questions)?,
    };

    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        layout = args.layout.as_str(),
        questions = questions.len(),
        rows,
        "converted question json to csv"
    );

    Ok(())
}

fn report_id_gaps(questions: &[QuestionRecord]) {
    let mut seen = BTreeMap::<u32, usize>::new();
    for question in questions {
        *seen.entry(question.id).or_default() += 1;
    }

    let duplicates = seen
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(id, _)| *id)
        .collect::<Vec<u32>>();
    if !duplicates.is_empty() {
        warn!(duplicates = ?duplicates, "duplicate question ids in table");
    }

    let (missing, extra) = id_coverage(seen.keys().copied(), EXPECTED_QUESTION_COUNT);
    if !missing.is_empty() {
        warn!(missing = ?missing, "question ids missing from table");
    }
    if !extra.is_empty() {
        warn!(extra = ?extra, "question ids outside the expected range");
    }
}

fn category_counts(questions: &[QuestionRecord]) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();
    for question in questions {
        *counts.entry(question.category.as_str()).or_default() += 1;
    }
    counts
}
