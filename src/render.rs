// Copyright 2025 Servus Altissimi (Pseudonym)

// Permission is hereby granted, free of charge, to any person obtaining a copy of this software and associated documentation files (the "Software"), to deal in the Software without restriction, including without limitation the rights to use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is furnished to do so, subject to the following conditions:
// The above copyright notice and this permission notice shall be included in all copies or substantial portions of the Software.
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Output side of the client. Hub operations describe what to show; a
//! `Renderer` decides how.

use indicatif::{ProgressBar, ProgressStyle};

use crate::form::{BorderTone, FieldFeedback};
use crate::session::SessionUser;
use crate::stats::StatsSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Error,
}

/// Message area a notice belongs to: the single-article form or the
/// file/statistics panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Response,
    FileResponse,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub slot: Slot,
    pub tone: Tone,
    pub text: String,
}

impl Notice {
    pub fn new(slot: Slot, tone: Tone, text: impl Into<String>) -> Self {
        Self { slot, tone, text: text.into() }
    }

    pub fn info(slot: Slot, text: impl Into<String>) -> Self {
        Self::new(slot, Tone::Info, text)
    }

    pub fn success(slot: Slot, text: impl Into<String>) -> Self {
        Self::new(slot, Tone::Success, text)
    }

    pub fn error(slot: Slot, text: impl Into<String>) -> Self {
        Self::new(slot, Tone::Error, text)
    }
}

pub trait Renderer {
    fn notice(&mut self, notice: Notice);
    /// Hides error notices currently shown in `slot`.
    fn dismiss_errors(&mut self, slot: Slot);
    fn stats(&mut self, stats: &StatsSnapshot);
    /// `None` hides the progress bar.
    fn progress(&mut self, percent: Option<u8>);
    fn loading(&mut self, active: bool);
    fn field(&mut self, feedback: &FieldFeedback);
    fn active_users(&mut self, users: &[SessionUser]);
}

/// Prints to the terminal.
pub struct ConsoleRenderer {
    bar: Option<ProgressBar>,
    style: ProgressStyle,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        let style = ProgressStyle::with_template("{bar:40.cyan/blue} {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-");
        Self { bar: None, style }
    }
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for ConsoleRenderer {
    fn notice(&mut self, notice: Notice) {
        let marker = match notice.tone {
            Tone::Info => "[info]",
            Tone::Success => "[ok]",
            Tone::Error => "[error]",
        };
        let line = format!("{} {}", marker, notice.text);
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    }

    fn dismiss_errors(&mut self, _slot: Slot) {}

    fn stats(&mut self, stats: &StatsSnapshot) {
        println!("{}", "=".repeat(40));
        println!("Total articles:    {}", stats.total);
        println!("Uploaded articles: {}", stats.uploaded);
        println!("Saved articles:    {}", stats.saved);
        println!("Unique DOIs:       {}", stats.unique);
        println!("{}", "=".repeat(40));
    }

    fn progress(&mut self, percent: Option<u8>) {
        match percent {
            Some(percent) => {
                let bar = self.bar.get_or_insert_with(|| {
                    let bar = ProgressBar::new(100);
                    bar.set_style(self.style.clone());
                    bar.set_message("Processing file");
                    bar
                });
                bar.set_position(u64::from(percent.min(100)));
            }
            None => {
                if let Some(bar) = self.bar.take() {
                    bar.finish_and_clear();
                }
            }
        }
    }

    fn loading(&mut self, _active: bool) {}

    fn field(&mut self, feedback: &FieldFeedback) {
        if feedback.border != BorderTone::Neutral {
            println!("DOI field: {:?} ({})", feedback.border, feedback.border.hex());
        }
        if let Some(notice) = &feedback.notice {
            self.notice(notice.clone());
        }
    }

    fn active_users(&mut self, users: &[SessionUser]) {
        if users.is_empty() {
            println!("Active users: none");
            return;
        }
        println!("Active users:");
        for user in users {
            println!("  {} (last active {})", user.email, user.last_active);
        }
    }
}

/// Keeps everything it is asked to show. Useful for embedding the client
/// somewhere other than a terminal, and in tests.
#[derive(Debug, Default)]
pub struct Recorder {
    pub notices: Vec<Notice>,
    pub dismissed: Vec<Slot>,
    pub stats: Vec<StatsSnapshot>,
    pub progress: Vec<Option<u8>>,
    pub loading: Vec<bool>,
    pub fields: Vec<FieldFeedback>,
    pub active_users: Vec<Vec<SessionUser>>,
}

impl Recorder {
    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn last_stats(&self) -> Option<&StatsSnapshot> {
        self.stats.last()
    }
}

impl Renderer for Recorder {
    fn notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn dismiss_errors(&mut self, slot: Slot) {
        self.dismissed.push(slot);
    }

    fn stats(&mut self, stats: &StatsSnapshot) {
        self.stats.push(*stats);
    }

    fn progress(&mut self, percent: Option<u8>) {
        self.progress.push(percent);
    }

    fn loading(&mut self, active: bool) {
        self.loading.push(active);
    }

    fn field(&mut self, feedback: &FieldFeedback) {
        self.fields.push(feedback.clone());
    }

    fn active_users(&mut self, users: &[SessionUser]) {
        self.active_users.push(users.to_vec());
    }
}
