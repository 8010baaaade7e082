use serde_json::json;

use super::*;
use crate::model::{CorrectAnswer, WrongAnswer};

fn complete_questions(count: u32) -> Vec<QuestionRecord> {
    (1..=count)
        .map(|id| QuestionRecord {
            id,
            category: "American Government".to_string(),
            subcategory: "Principles of American Government".to_string(),
            question: format!("Question {id}?"),
            correct_answers: vec![CorrectAnswer {
                text: format!("Answer {id}"),
                rationale: String::new(),
            }],
            wrong_answers: (1..=3)
                .map(|n| WrongAnswer {
                    text: format!("Wrong {id}.{n}"),
                })
                .collect(),
        })
        .collect()
}

fn story_fixture() -> StoryFile {
    serde_json::from_value(json!({
        "civicsStory": [
            {
                "chapterId": 1,
                "translations": {
                    "en": { "title": "The Founding", "introduction": "How it began." },
                    "ko": { "title": "건국", "introduction": "시작된 과정." }
                },
                "sections": [
                    {
                        "linkedQuestions": [1, 2],
                        "sectionTitle_en": "A new nation",
                        "sectionTitle_ko": "새로운 국가",
                        "content_en": [
                            { "type": "normal", "text": "The supreme law is " },
                            { "type": "answer", "text": "the Constitution" },
                            { "type": "normal", "text": "." }
                        ],
                        "content_ko": [
                            { "type": "normal", "text": "최고법은 " },
                            { "type": "answer", "text": "헌법" },
                            { "type": "normal", "text": "이다." }
                        ]
                    },
                    {
                        "linkedQuestions": [3],
                        "content_en": [{ "type": "answer", "text": "Republic" }],
                        "content_ko": [{ "type": "answer", "text": "공화국" }]
                    }
                ]
            }
        ]
    }))
    .expect("story fixture")
}

fn failed_ids(checks: &CheckSet) -> Vec<String> {
    checks
        .checks
        .iter()
        .filter(|check| check.result == "failed")
        .map(|check| check.check_id.clone())
        .collect()
}

#[test]
fn complete_question_file_passes_all_checks() {
    let mut checks = CheckSet::default();
    check_question_file(
        &mut checks,
        Path::new("interview_questions_en.json"),
        &complete_questions(128),
        128,
        3,
    );

    assert_eq!(checks.checks.len(), 5);
    assert!(failed_ids(&checks).is_empty());
    assert!(checks.issues.is_empty());
}

#[test]
fn question_checks_report_gaps_duplicates_and_short_answers() {
    let mut questions = complete_questions(128);
    questions.retain(|question| question.id != 11);
    questions.push(questions[0].clone());
    questions[5].wrong_answers.truncate(2);
    questions[6].correct_answers.clear();
    questions[7].question = "[번역 필요]".to_string();

    let mut checks = CheckSet::default();
    check_question_file(&mut checks, Path::new("q_ar.json"), &questions, 128, 3);

    let failed = failed_ids(&checks);
    assert_eq!(
        failed,
        vec!["Q-001:q_ar.json", "Q-002:q_ar.json", "Q-003:q_ar.json", "Q-005:q_ar.json"]
    );
    assert!(checks.issues.iter().any(|issue| issue.contains("missing ids [11]")));
    assert!(checks.issues.iter().any(|issue| issue.contains("id 1 appears 2 times")));
    assert!(checks.issues.iter().any(|issue| issue.contains("question 6 has 2 wrong answers")));
}

#[test]
fn story_checks_pass_for_isomorphic_translation() {
    let story = story_fixture();
    let mut checks = CheckSet::default();

    check_story_file(
        &mut checks,
        Path::new("question_story.json"),
        &story,
        &story_languages(&story),
        3,
    );

    assert_eq!(story_languages(&story), vec!["en".to_string(), "ko".to_string()]);
    assert!(failed_ids(&checks).is_empty(), "{:?}", checks.issues);
}

#[test]
fn story_checks_flag_structure_and_link_problems() {
    let mut story = story_fixture();
    let chapter = &mut story.civics_story[0];
    chapter.sections[1].linked_questions = vec![2, 3];
    chapter.sections[0].fields.remove("sectionTitle_ko");
    chapter.sections[0]
        .set_content(
            "ko",
            &[crate::model::StoryFragment {
                kind: crate::model::FragmentKind::Normal,
                text: "최고법은 헌법이다.".to_string(),
            }],
        )
        .expect("set content");
    chapter
        .translations
        .get_mut("ko")
        .expect("ko translation")
        .introduction
        .clear();

    let mut checks = CheckSet::default();
    check_story_file(
        &mut checks,
        Path::new("question_story.json"),
        &story,
        &["ko".to_string()],
        4,
    );

    let failed = failed_ids(&checks);
    assert!(failed.contains(&"S-001:question_story.json".to_string()));
    assert!(failed.contains(&"S-ko-01:question_story.json".to_string()));
    assert!(failed.contains(&"S-ko-02:question_story.json".to_string()));
    assert!(failed.contains(&"S-ko-03:question_story.json".to_string()));
    assert!(checks.issues.iter().any(|issue| issue.contains("questions never linked [4]")));
    assert!(checks.issues.iter().any(|issue| issue.contains("question 2 linked by")));
    assert!(checks.issues.iter().any(|issue| issue.contains("length 1 != content_en length 3")));
}

#[test]
fn story_check_reports_missing_language_content() {
    let story = story_fixture();
    let mut checks = CheckSet::default();

    check_story_file(&mut checks, Path::new("story.json"), &story, &["fr".to_string()], 3);

    let failed = failed_ids(&checks);
    assert!(failed.contains(&"S-fr-01:story.json".to_string()));
    assert!(failed.contains(&"S-fr-02:story.json".to_string()));
    assert!(failed.contains(&"S-fr-03:story.json".to_string()));
    assert!(!failed.contains(&"S-fr-04:story.json".to_string()));
}

#[test]
fn run_writes_report_and_fails_in_strict_mode() {
    let dir = tempfile::tempdir().expect("tempdir");
    let questions_path = dir.path().join("interview_questions_en.json");
    write_json_pretty(&questions_path, &complete_questions(127)).expect("write questions");
    let report_path = dir.path().join("reports/validation.json");

    let args = ValidateArgs {
        questions: vec![questions_path],
        story: None,
        story_languages: Vec::new(),
        expected_count: 128,
        min_wrong_answers: 3,
        report_path: Some(report_path.clone()),
        strict: true,
    };

    let err = run(args).expect_err("strict mode fails");
    assert!(err.to_string().contains("1 validation checks failed"));

    let report: serde_json::Value = read_json(&report_path).expect("report");
    assert_eq!(report["status"], "failed");
    assert_eq!(report["summary"]["total"], 5);
    assert_eq!(report["summary"]["failed"], 1);
    assert_eq!(report["checks"][0]["result"], "failed");
    assert!(
        report["issues"][0]
            .as_str()
            .expect("issue")
            .contains("missing ids [128]")
    );
}

#[test]
fn run_requires_an_input() {
    let args = ValidateArgs {
        questions: Vec::new(),
        story: None,
        story_languages: Vec::new(),
        expected_count: 128,
        min_wrong_answers: 3,
        report_path: None,
        strict: false,
    };

    assert!(run(args).is_err());
}
