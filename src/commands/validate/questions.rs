use super::*;

/// Checks one application question file.
pub fn check_question_file(
    checks: &mut CheckSet,
    path: &Path,
    questions: &[QuestionRecord],
    expected_count: u32,
    min_wrong_answers: usize,
) {
    let label = file_label(path);

    checks.record(
        format!("Q-001:{label}"),
        format!("{label} question ids"),
        id_problems(questions, expected_count),
    );

    let missing_correct = questions
        .iter()
        .filter(|question| {
            question
                .correct_answers
                .iter()
                .all(|answer| answer.text.trim().is_empty())
        })
        .map(|question| format!("question {} has no correct answer", question.id))
        .collect();
    checks.record(
        format!("Q-002:{label}"),
        format!("{label} correct answers"),
        missing_correct,
    );

    let few_wrong = questions
        .iter()
        .filter(|question| question.wrong_answers.len() < min_wrong_answers)
        .map(|question| {
            format!(
                "question {} has {} wrong answers (minimum {min_wrong_answers})",
                question.id,
                question.wrong_answers.len()
            )
        })
        .collect();
    checks.record(
        format!("Q-003:{label}"),
        format!("{label} wrong answers"),
        few_wrong,
    );

    let empty_text = questions
        .iter()
        .filter(|question| question.question.trim().is_empty())
        .map(|question| format!("question {} has empty text", question.id))
        .collect();
    checks.record(
        format!("Q-004:{label}"),
        format!("{label} question text"),
        empty_text,
    );

    checks.record(
        format!("Q-005:{label}"),
        format!("{label} placeholders"),
        placeholder_problems(questions),
    );
}

fn id_problems(questions: &[QuestionRecord], expected_count: u32) -> Vec<String> {
    let mut counts = BTreeMap::<u32, usize>::new();
    for question in questions {
        *counts.entry(question.id).or_default() += 1;
    }

    let mut problems = Vec::new();
    let (missing, extra) = id_coverage(counts.keys().copied(), expected_count);
    if !missing.is_empty() {
        problems.push(format!("missing ids {missing:?}"));
    }
    if !extra.is_empty() {
        problems.push(format!("ids outside 1..={expected_count}: {extra:?}"));
    }
    for (id, count) in counts {
        if count > 1 {
            problems.push(format!("id {id} appears {count} times"));
        }
    }
    problems
}

fn placeholder_problems(questions: &[QuestionRecord]) -> Vec<String> {
    let mut problems = Vec::new();
    for question in questions {
        let texts = std::iter::once(question.question.as_str())
            .chain(question.correct_answers.iter().map(|answer| answer.text.as_str()))
            .chain(question.correct_answers.iter().map(|answer| answer.rationale.as_str()))
            .chain(question.wrong_answers.iter().map(|answer| answer.text.as_str()));

        if texts.into_iter().any(contains_placeholder) {
            problems.push(format!("question {} contains untranslated placeholder", question.id));
        }
    }
    problems
}
