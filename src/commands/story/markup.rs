use super::*;

/// Flattens story fragments into one sheet cell, wrapping answer fragments
/// as `[ANSWER:text]`.
pub fn render_fragments(fragments: &[StoryFragment]) -> String {
    let mut text = String::new();
    for fragment in fragments {
        match fragment.kind {
            FragmentKind::Answer => {
                text.push_str("[ANSWER:");
                text.push_str(&fragment.text);
                text.push(']');
            }
            FragmentKind::Normal => text.push_str(&fragment.text),
        }
    }
    text
}

pub struct AnswerMarkup {
    marker: Regex,
}

impl AnswerMarkup {
    pub fn new() -> Result<Self> {
        Ok(Self {
            marker: Regex::new(r"\[ANSWER:(?P<answer>[^\]]+)\]")
                .context("failed to compile answer marker regex")?,
        })
    }

    /// Splits a translated cell back into fragments. Text between markers
    /// becomes normal fragments; empty stretches are dropped.
    pub fn parse(&self, text: &str) -> Vec<StoryFragment> {
        let mut fragments = Vec::new();
        let mut last = 0usize;

        for captures in self.marker.captures_iter(text) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            if whole.start() > last {
                fragments.push(StoryFragment {
                    kind: FragmentKind::Normal,
                    text: text[last..whole.start()].to_string(),
                });
            }
            if let Some(answer) = captures.name("answer") {
                fragments.push(StoryFragment {
                    kind: FragmentKind::Answer,
                    text: answer.as_str().to_string(),
                });
            }
            last = whole.end();
        }

        if last < text.len() {
            fragments.push(StoryFragment {
                kind: FragmentKind::Normal,
                text: text[last..].to_string(),
            });
        }

        fragments
    }
}
