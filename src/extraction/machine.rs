use crate::language::Language;
use crate::model::BilingualRecord;

use super::LineKind;

/// Position inside one question block of a bilingual export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtractState {
    #[default]
    AwaitingQuestion,
    CollectingSourceAnswers,
    AwaitingTargetQuestion,
    CollectingTargetAnswers,
}

/// Walks classified lines and assembles one [`BilingualRecord`] per question
/// number. A record is emitted when the next source question opens, or by
/// [`Extractor::finish`] for the last one.
#[derive(Debug)]
pub struct Extractor {
    language: Language,
    state: ExtractState,
    current: Option<BilingualRecord>,
    subcategory_source: String,
    subcategory_target: String,
    source_subcategory_pending: bool,
    warnings: Vec<String>,
}

impl Extractor {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            state: ExtractState::AwaitingQuestion,
            current: None,
            subcategory_source: String::new(),
            subcategory_target: String::new(),
            source_subcategory_pending: false,
            warnings: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> ExtractState {
        self.state
    }

    pub fn current_id(&self) -> Option<u32> {
        self.current.as_ref().map(|record| record.id)
    }

    #[cfg(test)]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    pub fn step(&mut self, kind: LineKind) -> Option<BilingualRecord> {
        match kind {
            LineKind::Noise => None,
            LineKind::Category { .. } => {
                self.source_subcategory_pending = false;
                self.close_answers();
                None
            }
            LineKind::Subcategory { text, target } => {
                self.on_subcategory(text, target);
                None
            }
            LineKind::Question { id, text, target } => self.on_question(id, text, target),
            LineKind::Answer { text, target } => {
                self.on_answer(text, target);
                None
            }
            LineKind::Text(text) => {
                self.on_text(text);
                None
            }
        }
    }

    pub fn finish(&mut self) -> Option<BilingualRecord> {
        self.state = ExtractState::AwaitingQuestion;
        self.current.take()
    }

    fn close_answers(&mut self) {
        self.state = match self.state {
            ExtractState::CollectingSourceAnswers => ExtractState::AwaitingTargetQuestion,
            ExtractState::CollectingTargetAnswers => ExtractState::AwaitingQuestion,
            other => other,
        };
    }

    fn on_subcategory(&mut self, text: String, target: bool) {
        // Latin-script translations often carry no marked letter; the second
        // of two consecutive subcategory lines is the translation.
        if target || self.source_subcategory_pending {
            self.subcategory_target = text;
            self.source_subcategory_pending = false;
        } else {
            self.subcategory_source = text;
            self.subcategory_target.clear();
            self.source_subcategory_pending = true;
        }
        self.close_answers();
    }

    fn on_question(&mut self, id: u32, text: String, target: bool) -> Option<BilingualRecord> {
        self.source_subcategory_pending = false;

        let same_id_open = self
            .current
            .as_ref()
            .is_some_and(|record| record.id == id && !record.has_target_question());
        let awaiting_target = matches!(
            self.state,
            ExtractState::CollectingSourceAnswers | ExtractState::AwaitingTargetQuestion
        );

        if same_id_open && awaiting_target {
            if target || self.language.is_latin_script() {
                if let Some(record) = self.current.as_mut() {
                    record.question_target = text;
                }
                self.state = ExtractState::CollectingTargetAnswers;
            } else {
                self.warnings
                    .push(format!("question {id}: repeated source question line ignored"));
            }
            return None;
        }

        if target {
            if self.current_id() == Some(id) {
                self.warnings
                    .push(format!("question {id}: duplicate target question line ignored"));
                return None;
            }

            self.warnings
                .push(format!("question {id}: target question without source question"));
            let emitted = self.current.take();
            let mut record = self.open_record(id);
            record.question_target = text;
            self.current = Some(record);
            self.state = ExtractState::CollectingTargetAnswers;
            return emitted;
        }

        let emitted = self.current.take();
        let mut record = self.open_record(id);
        record.question_source = text;
        self.current = Some(record);
        self.state = ExtractState::CollectingSourceAnswers;
        emitted
    }

    fn open_record(&self, id: u32) -> BilingualRecord {
        let mut record = BilingualRecord::for_id(id, self.language);
        record.subcategory_source = self.subcategory_source.clone();
        record.subcategory_target = self.subcategory_target.clone();
        record
    }

    fn on_answer(&mut self, text: String, target: bool) {
        if text.is_empty() {
            return;
        }

        let Some(record) = self.current.as_mut() else {
            self.warnings
                .push(format!("answer outside of any question: {text}"));
            return;
        };

        match self.state {
            ExtractState::AwaitingQuestion => {
                self.warnings.push(format!(
                    "question {}: answer after the question block closed: {text}",
                    record.id
                ));
            }
            ExtractState::CollectingSourceAnswers => {
                if target && !self.language.is_latin_script() {
                    self.warnings.push(format!(
                        "question {}: target answers before target question",
                        record.id
                    ));
                    record.answers_target.push(text);
                    self.state = ExtractState::AwaitingTargetQuestion;
                } else {
                    record.answers_source.push(text);
                }
            }
            ExtractState::AwaitingTargetQuestion | ExtractState::CollectingTargetAnswers => {
                record.answers_target.push(text);
            }
        }
    }

    fn on_text(&mut self, text: String) {
        let target = self.language.detector().contains(&text);
        let Some(record) = self.current.as_mut() else {
            return;
        };

        match self.state {
            ExtractState::AwaitingQuestion => {}
            ExtractState::CollectingSourceAnswers => {
                if target && !self.language.is_latin_script() {
                    self.warnings.push(format!(
                        "question {}: unnumbered target line ignored: {text}",
                        record.id
                    ));
                    self.state = ExtractState::AwaitingTargetQuestion;
                } else {
                    let slot = match record.answers_source.last_mut() {
                        Some(answer) => answer,
                        None => &mut record.question_source,
                    };
                    append_fragment(slot, &text);
                }
            }
            ExtractState::AwaitingTargetQuestion => {
                if let Some(answer) = record.answers_target.last_mut() {
                    append_fragment(answer, &text);
                }
            }
            ExtractState::CollectingTargetAnswers => {
                let slot = match record.answers_target.last_mut() {
                    Some(answer) => answer,
                    None => &mut record.question_target,
                };
                append_fragment(slot, &text);
            }
        }
    }
}

fn append_fragment(slot: &mut String, text: &str) {
    if !slot.is_empty() {
        slot.push(' ');
    }
    slot.push_str(text);
}
