use super::*;

#[derive(Debug, Default)]
pub(super) struct ChapterRows {
    title: Option<String>,
    introduction: Option<String>,
    sections: BTreeMap<usize, String>,
}

/// Parsed translation sheet. `source_language` comes from the other
/// `<LANG>_Full` column, when the sheet has exactly one.
#[derive(Debug, Default)]
pub(super) struct TranslationSheet {
    pub(super) source_language: Option<String>,
    pub(super) chapters: BTreeMap<u32, ChapterRows>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub titles: usize,
    pub introductions: usize,
    pub sections: usize,
    pub answers: usize,
    pub skipped_empty: usize,
    pub untranslated: usize,
    pub structure_mismatches: usize,
    pub unmatched_rows: usize,
}

pub fn run_apply(args: StoryApplyArgs) -> Result<()> {
    ensure_input_exists(&args.story)?;
    ensure_input_exists(&args.csv)?;

    let mut story: StoryFile = read_json(&args.story)?;
    let sheet = read_translation_rows(&args.csv, &args.language)?;
    let source_language = sheet
        .source_language
        .unwrap_or_else(|| DEFAULT_SOURCE_LANGUAGE.to_string());
    let markup = AnswerMarkup::new()?;

    let outcome = apply_rows(
        &mut story,
        sheet.chapters,
        &args.language,
        &source_language,
        &markup,
    )?;

    let backup_dir = args
        .backup_dir
        .clone()
        .unwrap_or_else(|| default_backup_dir(&args.story));
    if let Some(backup) = backup_file(&args.story, &backup_dir, Utc::now())? {
        info!(backup = %backup.display(), "backed up story file");
    }
    write_json_pretty(&args.story, &story)?;

    info!(
        story = %args.story.display(),
        csv = %args.csv.display(),
        language = %args.language,
        source_language = %source_language,
        titles = outcome.titles,
        introductions = outcome.introductions,
        sections = outcome.sections,
        answers = outcome.answers,
        skipped_empty = outcome.skipped_empty,
        untranslated = outcome.untranslated,
        structure_mismatches = outcome.structure_mismatches,
        unmatched_rows = outcome.unmatched_rows,
        "applied story translations"
    );

    Ok(())
}

pub(super) fn read_translation_rows(path: &Path, language: &str) -> Result<TranslationSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open CSV {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("failed to read CSV header in {}", path.display()))?
        .clone();
    let columns = header_index(&headers);

    let chapter_col = require_column(&columns, "ChapterID", path)?;
    let section_col = require_column(&columns, "SectionID", path)?;
    let kind_col = require_column(&columns, "Type", path)?;
    let target_column = full_column(language);
    let text_col = require_column(&columns, &target_column, path)?;

    let source_columns = columns
        .keys()
        .filter(|name| name.as_str() != target_column)
        .filter_map(|name| name.strip_suffix("_Full"))
        .collect::<Vec<&str>>();
    let source_language = match source_columns.as_slice() {
        [single] => Some(single.to_lowercase()),
        _ => None,
    };

    let mut chapters = BTreeMap::<u32, ChapterRows>::new();
    for (index, row) in reader.records().enumerate() {
        let line = index + 2;
        let row = row.with_context(|| format!("failed to read CSV row {line} in {}", path.display()))?;
        let cell = |column: usize| row.get(column).unwrap_or_default().trim();

        if cell(chapter_col).is_empty() {
            continue;
        }
        let chapter_id = cell(chapter_col).parse::<u32>().with_context(|| {
            format!("invalid ChapterID on row {line} of {}", path.display())
        })?;
        let section_id = cell(section_col).parse::<usize>().with_context(|| {
            format!("invalid SectionID on row {line} of {}", path.display())
        })?;
        let text = row.get(text_col).unwrap_or_default().to_string();

        let entry = chapters.entry(chapter_id).or_default();
        match cell(kind_col) {
            ROW_TITLE => entry.title = Some(text),
            ROW_INTRODUCTION => entry.introduction = Some(text),
            ROW_SECTION => {
                entry.sections.insert(section_id, text);
            }
            other => bail!("unknown row type {other:?} on row {line} of {}", path.display()),
        }
    }

    Ok(TranslationSheet {
        source_language,
        chapters,
    })
}

/// Decides whether a sheet cell can be written into the story.
fn usable(text: Option<&String>, outcome: &mut ApplyOutcome) -> Option<String> {
    let text = text?.trim();
    if text.is_empty() {
        outcome.skipped_empty += 1;
        return None;
    }
    if contains_placeholder(text) {
        outcome.untranslated += 1;
        return None;
    }
    Some(text.to_string())
}

pub(super) fn apply_rows(
    story: &mut StoryFile,
    mut rows: BTreeMap<u32, ChapterRows>,
    language: &str,
    source_language: &str,
    markup: &AnswerMarkup,
) -> Result<ApplyOutcome> {
    let mut outcome = ApplyOutcome::default();

    for chapter in &mut story.civics_story {
        let chapter_id = chapter.chapter_id;
        let Some(mut chapter_rows) = rows.remove(&chapter_id) else {
            warn!(chapter = chapter_id, "chapter missing from translation sheet");
            continue;
        };

        if let Some(title) = usable(chapter_rows.title.as_ref(), &mut outcome) {
            translation_entry(&mut chapter.translations, language).title = title;
            outcome.titles += 1;
        }
        if let Some(introduction) = usable(chapter_rows.introduction.as_ref(), &mut outcome) {
            translation_entry(&mut chapter.translations, language).introduction = introduction;
            outcome.introductions += 1;
        }

        for (index, section) in chapter.sections.iter_mut().enumerate() {
            let section_id = index + 1;
            let Some(raw) = chapter_rows.sections.remove(&section_id) else {
                warn!(chapter = chapter_id, section = section_id, "section missing from translation sheet");
                continue;
            };
            let Some(text) = usable(Some(&raw), &mut outcome) else {
                warn!(chapter = chapter_id, section = section_id, "section has no usable translation");
                continue;
            };

            let fragments = markup.parse(&text);
            outcome.answers += fragments
                .iter()
                .filter(|fragment| fragment.kind == FragmentKind::Answer)
                .count();

            if let Some(template) = section.content(source_language)? {
                let same_shape = template.len() == fragments.len()
                    && template
                        .iter()
                        .zip(&fragments)
                        .all(|(expected, actual)| expected.kind == actual.kind);
                if !same_shape {
                    outcome.structure_mismatches += 1;
                    warn!(
                        chapter = chapter_id,
                        section = section_id,
                        expected = template.len(),
                        actual = fragments.len(),
                        source_language,
                        "translated section differs from source fragment structure"
                    );
                }
            }

            section.set_content(language, &fragments)?;
            outcome.sections += 1;
        }

        outcome.unmatched_rows += chapter_rows.sections.len();
    }

    for (chapter_id, chapter_rows) in rows {
        warn!(chapter = chapter_id, "translation sheet chapter not present in story");
        outcome.unmatched_rows += chapter_rows.sections.len()
            + usize::from(chapter_rows.title.is_some())
            + usize::from(chapter_rows.introduction.is_some());
    }

    Ok(outcome)
}

fn translation_entry<'a>(
    translations: &'a mut BTreeMap<String, ChapterTranslation>,
    language: &str,
) -> &'a mut ChapterTranslation {
    translations.entry(language.to_string()).or_default()
}
