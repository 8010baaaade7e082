use super::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub chapter_id: u32,
    pub section_id: usize,
    pub kind: &'static str,
    pub source: String,
    pub target: String,
    pub notes: String,
}

pub fn run_export(args: StoryExportArgs) -> Result<()> {
    ensure_input_exists(&args.story)?;

    let story: StoryFile = read_json(&args.story)?;
    let rows = export_rows(&story, &args.source_language, &args.language)?;

    let mut writer = create_csv_writer(&args.csv, true)?;
    writer
        .write_record([
            "ID".to_string(),
            "ChapterID".to_string(),
            "SectionID".to_string(),
            "Type".to_string(),
            full_column(&args.source_language),
            full_column(&args.language),
            "Notes".to_string(),
        ])
        .with_context(|| format!("failed to write CSV header to {}", args.csv.display()))?;

    for (index, row) in rows.iter().enumerate() {
        writer
            .write_record([
                (index + 1).to_string(),
                row.chapter_id.to_string(),
                row.section_id.to_string(),
                row.kind.to_string(),
                row.source.clone(),
                row.target.clone(),
                row.notes.clone(),
            ])
            .with_context(|| format!("failed to write row {} to {}", index + 1, args.csv.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to flush CSV {}", args.csv.display()))?;

    let prefilled = rows.iter().filter(|row| !row.target.is_empty()).count();
    info!(
        story = %args.story.display(),
        csv = %args.csv.display(),
        source_language = %args.source_language,
        language = %args.language,
        rows = rows.len(),
        prefilled,
        "exported story translation sheet"
    );

    Ok(())
}

/// One row per chapter title, chapter introduction and section. Existing
/// target text is carried over so a sheet can be revised in place.
pub fn export_rows(story: &StoryFile, source: &str, target: &str) -> Result<Vec<ExportRow>> {
    let mut rows = Vec::new();

    for chapter in &story.civics_story {
        let chapter_id = chapter.chapter_id;
        let source_translation = chapter.translations.get(source);
        let target_translation = chapter.translations.get(target);
        if source_translation.is_none() {
            warn!(chapter = chapter_id, language = source, "chapter has no source translation");
        }

        rows.push(ExportRow {
            chapter_id,
            section_id: 0,
            kind: ROW_TITLE,
            source: source_translation
                .map(|translation| translation.title.clone())
                .unwrap_or_default(),
            target: target_translation
                .map(|translation| translation.title.clone())
                .unwrap_or_default(),
            notes: format!("Chapter {chapter_id} Title"),
        });
        rows.push(ExportRow {
            chapter_id,
            section_id: 0,
            kind: ROW_INTRODUCTION,
            source: source_translation
                .map(|translation| translation.introduction.clone())
                .unwrap_or_default(),
            target: target_translation
                .map(|translation| translation.introduction.clone())
                .unwrap_or_default(),
            notes: format!("Chapter {chapter_id} Introduction"),
        });

        for (index, section) in chapter.sections.iter().enumerate() {
            let section_id = index + 1;
            let source_text = section
                .content(source)
                .with_context(|| format!("chapter {chapter_id} section {section_id}"))?
                .map(|fragments| render_fragments(&fragments))
                .unwrap_or_default();
            let target_text = section
                .content(target)
                .with_context(|| format!("chapter {chapter_id} section {section_id}"))?
                .map(|fragments| render_fragments(&fragments))
                .unwrap_or_default();

            rows.push(ExportRow {
                chapter_id,
                section_id,
                kind: ROW_SECTION,
                source: source_text,
                target: target_text,
                notes: format!(
                    "Ch{chapter_id} Sec{section_id} | Questions: {:?}",
                    section.linked_questions
                ),
            });
        }
    }

    Ok(rows)
}
