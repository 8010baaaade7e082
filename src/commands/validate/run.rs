use super::*;

pub fn run(args: ValidateArgs) -> Result<()> {
    if args.questions.is_empty() && args.story.is_none() {
        bail!("nothing to validate: pass --questions and/or --story");
    }

    let report = build_report(&args)?;

    for check in report.checks.iter().filter(|check| check.result == "failed") {
        warn!(check_id = %check.check_id, detail = %check.detail, "{} failed", check.name);
    }

    if let Some(path) = &args.report_path {
        write_json_pretty(path, &report)?;
        info!(report = %path.display(), "wrote validation report");
    }

    info!(
        status = %report.status,
        total = report.summary.total,
        passed = report.summary.passed,
        failed = report.summary.failed,
        "validation completed"
    );

    if args.strict && report.summary.failed > 0 {
        bail!("{} validation checks failed", report.summary.failed);
    }

    Ok(())
}

pub fn build_report(args: &ValidateArgs) -> Result<ValidationReport> {
    let mut checks = CheckSet::default();
    let mut inputs = Vec::<PathBuf>::new();

    for path in &args.questions {
        ensure_input_exists(path)?;
        let questions: Vec<QuestionRecord> = read_json(path)?;
        check_question_file(
            &mut checks,
            path,
            &questions,
            args.expected_count,
            args.min_wrong_answers,
        );
        inputs.push(path.clone());
    }

    if let Some(path) = &args.story {
        ensure_input_exists(path)?;
        let story: StoryFile = read_json(path)?;
        let languages = if args.story_languages.is_empty() {
            story_languages(&story)
        } else {
            args.story_languages.clone()
        };
        check_story_file(&mut checks, path, &story, &languages, args.expected_count);
        inputs.push(path.clone());
    }

    let summary = summarize_checks(&checks.checks);
    let status = if summary.failed == 0 { "passed" } else { "failed" };

    Ok(ValidationReport {
        manifest_version: 1,
        generated_at: now_utc_string(),
        status: status.to_string(),
        inputs: inputs
            .iter()
            .map(|path| path.display().to_string())
            .collect(),
        summary,
        checks: checks.checks,
        issues: checks.issues,
    })
}
