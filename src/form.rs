// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use chrono::{SecondsFormat, Utc};

use crate::article::{ArticleRecord, FlagValue};
use crate::doi;
use crate::render::{Notice, Slot};
use crate::state::ClientState;

/// The single-article form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleForm {
    pub doi: String,
    pub title: String,
    pub protein: String,
    pub hardness: bool,
    pub whc: bool,
}

impl ArticleForm {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Record as submitted, stamped with the current time. The DOI is
    /// sent in its canonical form.
    pub fn to_record(&self) -> ArticleRecord {
        ArticleRecord {
            doi: doi::normalize(&self.doi),
            title: self.title.trim().to_string(),
            protein: self.protein.trim().to_string(),
            hardness: FlagValue::Flag(self.hardness),
            whc: FlagValue::Flag(self.whc),
            timestamp: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoiFieldState {
    Empty,
    Invalid,
    Valid,
    ValidAndDuplicateLocally,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldEvent {
    Input,
    Blur,
    Focus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderTone {
    Neutral,
    Error,
    Ok,
    Warning,
}

impl BorderTone {
    pub fn hex(self) -> &'static str {
        match self {
            BorderTone::Neutral => "inherit",
            BorderTone::Error => "#EF4444",
            BorderTone::Ok => "#10B981",
            BorderTone::Warning => "#F59E0B",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFeedback {
    pub border: BorderTone,
    pub notice: Option<Notice>,
    /// Error notices in the form's message area should disappear.
    pub dismiss_errors: bool,
}

impl FieldFeedback {
    fn unchanged() -> Self {
        Self {
            border: BorderTone::Neutral,
            notice: None,
            dismiss_errors: false,
        }
    }
}

impl DoiFieldState {
    pub fn evaluate(input: &str, state: &ClientState) -> Self {
        let input = input.trim();
        if input.is_empty() {
            DoiFieldState::Empty
        } else if !doi::is_valid(input) {
            DoiFieldState::Invalid
        } else if state.is_uploaded(input) {
            DoiFieldState::ValidAndDuplicateLocally
        } else {
            DoiFieldState::Valid
        }
    }

    /// What the field shows after `event`. Depends on nothing else.
    pub fn feedback(self, event: FieldEvent) -> FieldFeedback {
        match (event, self) {
            (FieldEvent::Blur, DoiFieldState::Invalid) => FieldFeedback {
                border: BorderTone::Error,
                notice: Some(Notice::error(
                    Slot::Response,
                    "Invalid DOI format. Please use format: 10.xxxx/xxxxx",
                )),
                dismiss_errors: false,
            },
            (FieldEvent::Blur, _) => FieldFeedback {
                border: BorderTone::Ok,
                notice: None,
                dismiss_errors: true,
            },
            (FieldEvent::Input, DoiFieldState::ValidAndDuplicateLocally) => FieldFeedback {
                border: BorderTone::Warning,
                notice: Some(Notice::info(Slot::Response, "This DOI exists in your uploaded file.")),
                dismiss_errors: false,
            },
            (FieldEvent::Focus, _) => FieldFeedback {
                dismiss_errors: true,
                ..FieldFeedback::unchanged()
            },
            (FieldEvent::Input, _) => FieldFeedback::unchanged(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Tone;
    use crate::state::UploadedDataSet;

    fn state_with(dois: &[&str]) -> ClientState {
        let mut state = ClientState::new();
        let records = dois.iter().map(|d| ArticleRecord::new(*d, "")).collect();
        state.replace_uploaded(UploadedDataSet::new(records));
        state
    }

    #[test]
    fn states_follow_the_input() {
        let state = state_with(&["10.1000/known"]);
        assert_eq!(DoiFieldState::evaluate("  ", &state), DoiFieldState::Empty);
        assert_eq!(DoiFieldState::evaluate("10.1", &state), DoiFieldState::Invalid);
        assert_eq!(DoiFieldState::evaluate("10.1000/new", &state), DoiFieldState::Valid);
        assert_eq!(
            DoiFieldState::evaluate("10.1000/KNOWN", &state),
            DoiFieldState::ValidAndDuplicateLocally
        );
    }

    #[test]
    fn blur_marks_invalid_input() {
        let feedback = DoiFieldState::Invalid.feedback(FieldEvent::Blur);
        assert_eq!(feedback.border, BorderTone::Error);
        assert_eq!(feedback.notice.map(|n| n.tone), Some(Tone::Error));

        let feedback = DoiFieldState::Empty.feedback(FieldEvent::Blur);
        assert_eq!(feedback.border, BorderTone::Ok);
        assert!(feedback.dismiss_errors);
    }

    #[test]
    fn typing_a_known_doi_warns() {
        let feedback = DoiFieldState::ValidAndDuplicateLocally.feedback(FieldEvent::Input);
        assert_eq!(feedback.border, BorderTone::Warning);
        assert!(feedback.notice.is_some());

        assert_eq!(
            DoiFieldState::Invalid.feedback(FieldEvent::Input),
            FieldFeedback::unchanged()
        );
    }

    #[test]
    fn form_record_is_trimmed_and_stamped() {
        let form = ArticleForm {
            doi: " 10.1000/a ".into(),
            title: " Gel ".into(),
            hardness: true,
            ..Default::default()
        };
        let record = form.to_record();
        assert_eq!(record.doi, "10.1000/a");
        assert_eq!(record.title, "Gel");
        assert_eq!(record.hardness, FlagValue::Flag(true));
        assert!(record.timestamp.is_some());

        let mut form = form;
        form.clear();
        assert!(form.is_empty());
    }

    #[test]
    fn pasted_resolver_link_is_submitted_as_a_bare_doi() {
        let form = ArticleForm {
            doi: " https://doi.org/10.1000/XYZ ".into(),
            ..Default::default()
        };
        let record = form.to_record();
        assert_eq!(record.doi, "10.1000/xyz");
        assert!(doi::is_valid(&record.doi));
        assert!(!record.doi.contains("doi.org"));
    }
}
