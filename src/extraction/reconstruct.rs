use crate::language::Language;

use super::LinePatterns;

/// Merges wrapped export lines back into one line per question, answer or
/// header. Continuation lines are space-joined onto the unit they follow.
pub fn reconstruct_lines<S: AsRef<str>>(
    lines: &[S],
    patterns: &LinePatterns,
    language: Language,
) -> Vec<String> {
    let detector = language.detector();
    let mut units = Vec::<String>::new();
    let mut current = String::new();
    let mut current_is_header = false;

    for raw_line in lines {
        let line = raw_line.as_ref().trim();
        if patterns.is_noise(line, language) {
            continue;
        }

        if current.is_empty() {
            current.push_str(line);
            current_is_header = is_header(line, patterns, language);
            continue;
        }

        // A translated header without its letter prefix still opens a unit.
        let header_script_switch =
            current_is_header && detector.contains(line) != detector.contains(&current);

        if header_script_switch || starts_new_unit(line, patterns, language) {
            units.push(current.trim().to_string());
            current.clear();
            current.push_str(line);
            current_is_header = is_header(line, patterns, language);
            continue;
        }

        current.push(' ');
        current.push_str(line);
    }

    if !current.trim().is_empty() {
        units.push(current.trim().to_string());
    }

    units
}

pub fn starts_new_unit(line: &str, patterns: &LinePatterns, language: Language) -> bool {
    line.starts_with('"')
        || patterns.is_bullet(line)
        || patterns.question_parts(line, language).is_some()
        || is_header(line, patterns, language)
}

fn is_header(line: &str, patterns: &LinePatterns, language: Language) -> bool {
    patterns.is_subcategory(line) || language.match_category_header(line).is_some()
}
