use serde_json::json;

use super::apply::{ApplyOutcome, apply_rows, read_translation_rows};
use super::export::export_rows;
use super::*;

fn story_fixture() -> StoryFile {
    serde_json::from_value(json!({
        "civicsStory": [
            {
                "chapterId": 1,
                "translations": {
                    "en": { "title": "The Founding", "introduction": "How it began." }
                },
                "sections": [
                    {
                        "linkedQuestions": [1, 2],
                        "sectionTitle_en": "A new nation",
                        "content_en": [
                            { "type": "normal", "text": "The supreme law is " },
                            { "type": "answer", "text": "the Constitution" },
                            { "type": "normal", "text": "." }
                        ]
                    },
                    {
                        "linkedQuestions": [3],
                        "content_en": [{ "type": "answer", "text": "Republic" }]
                    }
                ]
            }
        ],
        "version": "2025"
    }))
    .expect("story fixture")
}

#[test]
fn render_wraps_answers_in_markers() {
    let story = story_fixture();
    let fragments = story.civics_story[0].sections[0]
        .content("en")
        .expect("valid content")
        .expect("english content");

    assert_eq!(
        render_fragments(&fragments),
        "The supreme law is [ANSWER:the Constitution]."
    );
}

#[test]
fn parse_splits_markers_back_into_fragments() {
    let markup = AnswerMarkup::new().expect("markup regex");

    let fragments = markup.parse("La loi suprême est [ANSWER:la Constitution].");
    assert_eq!(
        fragments,
        vec![
            StoryFragment {
                kind: FragmentKind::Normal,
                text: "La loi suprême est ".to_string(),
            },
            StoryFragment {
                kind: FragmentKind::Answer,
                text: "la Constitution".to_string(),
            },
            StoryFragment {
                kind: FragmentKind::Normal,
                text: ".".to_string(),
            },
        ]
    );

    let only_answer = markup.parse("[ANSWER:République]");
    assert_eq!(only_answer.len(), 1);
    assert_eq!(only_answer[0].kind, FragmentKind::Answer);
}

#[test]
fn export_rows_cover_titles_introductions_and_sections() {
    let rows = export_rows(&story_fixture(), "en", "fr").expect("rows");

    let kinds = rows.iter().map(|row| row.kind).collect::<Vec<&str>>();
    assert_eq!(kinds, vec!["title", "introduction", "section", "section"]);
    assert_eq!(rows[0].source, "The Founding");
    assert_eq!(rows[2].section_id, 1);
    assert_eq!(rows[2].source, "The supreme law is [ANSWER:the Constitution].");
    assert_eq!(rows[2].notes, "Ch1 Sec1 | Questions: [1, 2]");
    assert!(rows.iter().all(|row| row.target.is_empty()));
}

#[test]
fn run_export_writes_bom_prefixed_sheet() {
    let dir = tempfile::tempdir().expect("tempdir");
    let story_path = dir.path().join("question_story.json");
    let csv_path = dir.path().join("story_translation_fr.csv");
    write_json_pretty(&story_path, &story_fixture()).expect("write story");

    run_export(StoryExportArgs {
        story: story_path,
        csv: csv_path.clone(),
        language: "fr".to_string(),
        source_language: "en".to_string(),
    })
    .expect("export");

    let raw = std::fs::read(&csv_path).expect("read csv");
    assert!(raw.starts_with(b"\xEF\xBB\xBF"));
    let text = String::from_utf8(raw).expect("utf-8");
    assert!(text.contains("ID,ChapterID,SectionID,Type,EN_Full,FR_Full,Notes"));
    assert!(text.contains("[ANSWER:Republic]"));
}

#[test]
fn apply_rows_writes_translations_and_counts_gaps() {
    let mut story = story_fixture();
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("sheet.csv");
    std::fs::write(
        &csv_path,
        "ID,ChapterID,SectionID,Type,EN_Full,FR_Full,Notes\n\
         1,1,0,title,The Founding,La Fondation,\n\
         2,1,0,introduction,How it began.,[번역 필요],\n\
         3,1,1,section,x,La loi suprême est [ANSWER:la Constitution].,\n\
         4,1,2,section,x,,\n\
         5,9,1,section,x,Orpheline,\n",
    )
    .expect("write sheet");

    let sheet = read_translation_rows(&csv_path, "fr").expect("rows");
    assert_eq!(sheet.source_language.as_deref(), Some("en"));
    let markup = AnswerMarkup::new().expect("markup");
    let outcome = apply_rows(&mut story, sheet.chapters, "fr", "en", &markup).expect("apply");

    assert_eq!(
        outcome,
        ApplyOutcome {
            titles: 1,
            introductions: 0,
            sections: 1,
            answers: 1,
            skipped_empty: 1,
            untranslated: 1,
            structure_mismatches: 0,
            unmatched_rows: 1,
        }
    );

    let chapter = &story.civics_story[0];
    assert_eq!(chapter.translations["fr"].title, "La Fondation");
    assert!(chapter.translations["fr"].introduction.is_empty());
    let content = chapter.sections[0]
        .content("fr")
        .expect("valid")
        .expect("french content");
    assert_eq!(content.len(), 3);
    assert!(!chapter.sections[1].has_content("fr"));
}

#[test]
fn structure_is_checked_against_sheet_source_language() {
    let mut story = story_fixture();
    story.civics_story[0].sections[0]
        .set_content(
            "es",
            &[StoryFragment {
                kind: FragmentKind::Normal,
                text: "La ley suprema es la Constitución.".to_string(),
            }],
        )
        .expect("spanish content");
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("sheet.csv");
    std::fs::write(
        &csv_path,
        "ID,ChapterID,SectionID,Type,ES_Full,FR_Full,Notes\n\
         3,1,1,section,x,La loi suprême est la Constitution.,\n",
    )
    .expect("write sheet");

    let sheet = read_translation_rows(&csv_path, "fr").expect("rows");
    let source = sheet.source_language.clone().expect("source column");
    assert_eq!(source, "es");

    let markup = AnswerMarkup::new().expect("markup");
    let outcome = apply_rows(&mut story, sheet.chapters, "fr", &source, &markup).expect("apply");
    assert_eq!(outcome.structure_mismatches, 0);

    let mut against_english = story_fixture();
    let sheet = read_translation_rows(&csv_path, "fr").expect("rows");
    let outcome =
        apply_rows(&mut against_english, sheet.chapters, "fr", "en", &markup).expect("apply");
    assert_eq!(outcome.structure_mismatches, 1);
}

#[test]
fn run_apply_backs_up_and_preserves_unknown_keys() {
    let dir = tempfile::tempdir().expect("tempdir");
    let story_path = dir.path().join("question_story.json");
    let csv_path = dir.path().join("sheet.csv");
    write_json_pretty(&story_path, &story_fixture()).expect("write story");
    std::fs::write(
        &csv_path,
        "\u{feff}ID,ChapterID,SectionID,Type,EN_Full,KO_Full,Notes\n\
         1,1,0,title,The Founding,건국,\n\
         2,1,0,introduction,How it began.,시작된 과정.,\n\
         3,1,1,section,x,최고법은 [ANSWER:헌법]이다.,\n\
         4,1,2,section,x,[ANSWER:공화국],\n",
    )
    .expect("write sheet");

    run_apply(StoryApplyArgs {
        story: story_path.clone(),
        csv: csv_path,
        language: "ko".to_string(),
        backup_dir: None,
    })
    .expect("apply");

    let raw: serde_json::Value = read_json(&story_path).expect("story json");
    assert_eq!(raw["version"], "2025");
    assert_eq!(raw["civicsStory"][0]["translations"]["ko"]["title"], "건국");
    assert_eq!(
        raw["civicsStory"][0]["sections"][1]["content_ko"][0]["text"],
        "공화국"
    );
    assert_eq!(
        raw["civicsStory"][0]["sections"][0]["sectionTitle_en"],
        "A new nation"
    );

    let backups = std::fs::read_dir(dir.path().join("archived_backups"))
        .expect("backups")
        .count();
    assert_eq!(backups, 1);
}

#[test]
fn read_translation_rows_requires_language_column() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv_path = dir.path().join("sheet.csv");
    std::fs::write(&csv_path, "ID,ChapterID,SectionID,Type,EN_Full,Notes\n").expect("write");

    let err = read_translation_rows(&csv_path, "es").expect_err("missing column");
    assert!(err.to_string().contains("missing CSV column ES_Full"));
}
