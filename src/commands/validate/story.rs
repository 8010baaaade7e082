use super::*;

/// Languages present in any chapter's `translations` map.
pub fn story_languages(story: &StoryFile) -> Vec<String> {
    let mut languages = story
        .civics_story
        .iter()
        .flat_map(|chapter| chapter.translations.keys().cloned())
        .collect::<Vec<String>>();
    languages.sort();
    languages.dedup();
    languages
}

pub fn check_story_file(
    checks: &mut CheckSet,
    path: &Path,
    story: &StoryFile,
    languages: &[String],
    expected_count: u32,
) {
    let label = file_label(path);

    checks.record(
        format!("S-001:{label}"),
        format!("{label} linked questions"),
        linked_question_problems(story, expected_count),
    );
    checks.record(
        format!("S-002:{label}"),
        format!("{label} english template"),
        template_problems(story),
    );

    for language in languages {
        checks.record(
            format!("S-{language}-01:{label}"),
            format!("{label} {language} chapter translations"),
            translation_problems(story, language),
        );
        checks.record(
            format!("S-{language}-02:{label}"),
            format!("{label} {language} content structure"),
            content_problems(story, language),
        );
        checks.record(
            format!("S-{language}-03:{label}"),
            format!("{label} {language} section titles"),
            section_title_problems(story, language),
        );
        checks.record(
            format!("S-{language}-04:{label}"),
            format!("{label} {language} placeholders"),
            story_placeholder_problems(story, language),
        );
    }
}

fn linked_question_problems(story: &StoryFile, expected_count: u32) -> Vec<String> {
    let mut links = BTreeMap::<u32, Vec<String>>::new();
    for chapter in &story.civics_story {
        for (index, section) in chapter.sections.iter().enumerate() {
            for id in &section.linked_questions {
                links
                    .entry(*id)
                    .or_default()
                    .push(format!("chapter {} section {index}", chapter.chapter_id));
            }
        }
    }

    let mut problems = Vec::new();
    let (missing, extra) = id_coverage(links.keys().copied(), expected_count);
    if !missing.is_empty() {
        problems.push(format!("questions never linked {missing:?}"));
    }
    if !extra.is_empty() {
        problems.push(format!("linked ids outside 1..={expected_count}: {extra:?}"));
    }
    for (id, places) in links {
        if places.len() > 1 {
            problems.push(format!("question {id} linked by {}", places.join(", ")));
        }
    }
    problems
}

fn template_problems(story: &StoryFile) -> Vec<String> {
    let mut problems = Vec::new();
    for chapter in &story.civics_story {
        for (index, section) in chapter.sections.iter().enumerate() {
            let place = format!("chapter {} section {index}", chapter.chapter_id);
            match section.content("en") {
                Ok(Some(fragments)) if !fragments.is_empty() => {}
                Ok(_) => problems.push(format!("{place}: content_en missing or empty")),
                Err(err) => problems.push(format!("{place}: {err}")),
            }
        }
    }
    problems
}

fn translation_problems(story: &StoryFile, language: &str) -> Vec<String> {
    let mut problems = Vec::new();
    for chapter in &story.civics_story {
        match chapter.translations.get(language) {
            None => problems.push(format!(
                "chapter {}: missing translations.{language}",
                chapter.chapter_id
            )),
            Some(translation) => {
                if translation.title.trim().is_empty() {
                    problems.push(format!(
                        "chapter {}: translations.{language}.title missing or empty",
                        chapter.chapter_id
                    ));
                }
                if translation.introduction.trim().is_empty() {
                    problems.push(format!(
                        "chapter {}: translations.{language}.introduction missing or empty",
                        chapter.chapter_id
                    ));
                }
            }
        }
    }
    problems
}

fn content_problems(story: &StoryFile, language: &str) -> Vec<String> {
    let mut problems = Vec::new();
    for chapter in &story.civics_story {
        for (index, section) in chapter.sections.iter().enumerate() {
            let place = format!("chapter {} section {index}", chapter.chapter_id);
            let Ok(Some(template)) = section.content("en") else {
                continue;
            };

            let fragments = match section.content(language) {
                Ok(Some(fragments)) => fragments,
                Ok(None) => {
                    problems.push(format!("{place}: content_{language} missing"));
                    continue;
                }
                Err(err) => {
                    problems.push(format!("{place}: {err}"));
                    continue;
                }
            };

            if fragments.len() != template.len() {
                problems.push(format!(
                    "{place}: content_{language} length {} != content_en length {}",
                    fragments.len(),
                    template.len()
                ));
            }
            for (position, (expected, actual)) in template.iter().zip(&fragments).enumerate() {
                if expected.kind != actual.kind {
                    problems.push(format!(
                        "{place} index {position}: content_{language} type {:?} != {:?}",
                        actual.kind, expected.kind
                    ));
                }
            }
        }
    }
    problems
}

fn section_title_problems(story: &StoryFile, language: &str) -> Vec<String> {
    let mut problems = Vec::new();
    for chapter in &story.civics_story {
        for (index, section) in chapter.sections.iter().enumerate() {
            if !section.has_section_title_key("en") {
                continue;
            }
            let present = section
                .section_title(language)
                .is_some_and(|title| !title.trim().is_empty());
            if !present {
                problems.push(format!(
                    "chapter {} section {index}: sectionTitle_{language} missing or empty",
                    chapter.chapter_id
                ));
            }
        }
    }
    problems
}

fn story_placeholder_problems(story: &StoryFile, language: &str) -> Vec<String> {
    let mut problems = Vec::new();
    for chapter in &story.civics_story {
        if let Some(translation) = chapter.translations.get(language) {
            if contains_placeholder(&translation.title) || contains_placeholder(&translation.introduction) {
                problems.push(format!("chapter {}: translations.{language}", chapter.chapter_id));
            }
        }
        for (index, section) in chapter.sections.iter().enumerate() {
            let Ok(Some(fragments)) = section.content(language) else {
                continue;
            };
            if fragments.iter().any(|fragment| contains_placeholder(&fragment.text)) {
                problems.push(format!(
                    "chapter {} section {index}: content_{language}",
                    chapter.chapter_id
                ));
            }
        }
    }
    problems
}
