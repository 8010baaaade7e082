use anyhow::Result;
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::PatchArgs;
use crate::corrections::{QuestionPatch, apply_question_patches, load_corrections};
use crate::model::QuestionRecord;
use crate::util::{
    backup_file, default_backup_dir, ensure_input_exists, read_json, write_json_pretty,
};

pub fn run(args: PatchArgs) -> Result<()> {
    ensure_input_exists(&args.input)?;
    ensure_input_exists(&args.corrections)?;

    let corrections = load_corrections::<QuestionPatch>(&args.corrections)?;
    let mut questions: Vec<QuestionRecord> = read_json(&args.input)?;

    let summary = apply_question_patches(&mut questions, &corrections);
    if !summary.skipped.is_empty() {
        warn!(
            skipped = ?summary.skipped,
            "patches for missing questions without question text were skipped"
        );
    }

    let output = args.output.clone().unwrap_or_else(|| args.input.clone());
    if output == args.input && summary.filled.is_empty() && summary.overridden.is_empty() {
        info!(
            input = %args.input.display(),
            corrections = %args.corrections.display(),
            "question file already matches corrections; nothing written"
        );
        return Ok(());
    }

    let backup_dir = args
        .backup_dir
        .clone()
        .unwrap_or_else(|| default_backup_dir(&output));
    if let Some(backup) = backup_file(&output, &backup_dir, Utc::now())? {
        info!(backup = %backup.display(), "backed up question file before patching");
    }

    write_json_pretty(&output, &questions)?;

    info!(
        input = %args.input.display(),
        output = %output.display(),
        corrections = %args.corrections.display(),
        filled = ?summary.filled,
        overridden = ?summary.overridden,
        questions = questions.len(),
        "applied question corrections"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CorrectAnswer, WrongAnswer};

    fn seed(dir: &std::path::Path) -> (std::path::PathBuf, std::path::PathBuf) {
        let questions = vec![QuestionRecord {
            id: 95,
            category: "미국 역사".to_string(),
            subcategory: "지리".to_string(),
            question: "자유의 여신상은 어디에 있는가?".to_string(),
            correct_answers: vec![CorrectAnswer {
                text: "뉴욕 항구".to_string(),
                rationale: String::new(),
            }],
            wrong_answers: vec![WrongAnswer {
                text: "워싱턴 D.C.".to_string(),
            }],
        }];
        let input = dir.join("interview_questions_ko.json");
        write_json_pretty(&input, &questions).expect("seed questions");

        let corrections = dir.join("questions_ko.json");
        std::fs::write(
            &corrections,
            include_str!("../../data/corrections/questions_ko.json"),
        )
        .expect("seed corrections");

        (input, corrections)
    }

    #[test]
    fn run_patches_in_place_with_backup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (input, corrections) = seed(dir.path());

        run(PatchArgs {
            input: input.clone(),
            corrections,
            output: None,
            backup_dir: None,
        })
        .expect("patch");

        let questions: Vec<QuestionRecord> = read_json(&input).expect("read");
        assert_eq!(questions[0].wrong_answers.len(), 2);
        assert_eq!(questions[0].wrong_answers[1].text, "샌프란시스코, 로스앤젤레스");

        let backups = std::fs::read_dir(dir.path().join("archived_backups"))
            .expect("backup dir")
            .count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn rerun_in_place_skips_backup_and_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (input, corrections) = seed(dir.path());
        let args = PatchArgs {
            input: input.clone(),
            corrections,
            output: None,
            backup_dir: None,
        };

        run(args.clone()).expect("first patch");
        let after_first = std::fs::read_to_string(&input).expect("read");
        let backup_dir = dir.path().join("archived_backups");
        std::fs::remove_dir_all(&backup_dir).expect("clear backups");

        run(args).expect("second patch");

        assert_eq!(std::fs::read_to_string(&input).expect("read"), after_first);
        assert!(!backup_dir.exists());
    }

    #[test]
    fn run_twice_leaves_output_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (input, corrections) = seed(dir.path());
        let output = dir.path().join("patched.json");

        for _ in 0..2 {
            run(PatchArgs {
                input: input.clone(),
                corrections: corrections.clone(),
                output: Some(output.clone()),
                backup_dir: Some(dir.path().join("backups")),
            })
            .expect("patch");
        }

        let questions: Vec<QuestionRecord> = read_json(&output).expect("read");
        assert_eq!(questions[0].wrong_answers.len(), 2);
        let original: Vec<QuestionRecord> = read_json(&input).expect("read input");
        assert_eq!(original[0].wrong_answers.len(), 1);
    }
}
