//! Plain-text rendering of slides and engine events.

use std::fmt::Write;

use colored::Colorize;
use saga_core::{Payload, SlideKind};
use saga_engine::{EngineEvent, PanelView, Presenter, SlideView};
use saga_profile::LedgerEvent;

/// Renders into an internal buffer that the session drains after each
/// command.
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    out: String,
}

impl TerminalPresenter {
    /// Create a presenter with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a free-form line.
    pub fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str("  ");
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    /// Take everything rendered so far.
    pub fn take(&mut self) -> String {
        let out = std::mem::take(&mut self.out);
        out.trim_end().to_string()
    }
}

/// Payload text: the body when present, otherwise `key: value` pairs.
fn payload_text(payload: &Payload) -> String {
    if let Some(body) = payload.body() {
        return body.to_string();
    }
    payload
        .iter()
        .map(|(key, value)| format!("{key}: {value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Presenter for TerminalPresenter {
    fn render(&mut self, view: &SlideView<'_>) {
        let header = format!(
            "{} - slide {}/{}",
            view.chapter.display_name(),
            view.slide_index + 1,
            view.chapter.slides.len()
        );
        self.line(header.bold().to_string());
        let content = payload_text(&view.slide.content);
        if !content.is_empty() {
            self.line(content);
        }

        match &view.slide.kind {
            SlideKind::Advance(_) => {
                for status in &view.side_paths {
                    let mark = if status.visited { "x" } else { " " };
                    let required = if status.required { " (required)" } else { "" };
                    self.line(format!("[{mark}] path {}{required}", status.slot));
                }
                match &view.panel {
                    Some(PanelView::Side { slot, panel }) => {
                        self.line(format!("{} {}", format!("[{slot}]").cyan(), payload_text(&panel.content)));
                        self.line("(leave to return)".dimmed().to_string());
                    }
                    Some(PanelView::Quest(quest)) => {
                        self.line(format!(
                            "{} step {}/{}: {}",
                            "[quest]".cyan(),
                            quest.step_index + 1,
                            quest.quest.steps.len(),
                            payload_text(&quest.step.content)
                        ));
                        if quest.revealed {
                            if let Some(reveal) = &quest.step.reveal {
                                self.line(format!("> {}", payload_text(reveal)));
                            }
                        } else if quest.requires_reveal {
                            self.line("(reveal to continue)".dimmed().to_string());
                        }
                        if quest.is_last {
                            self.line("(step to finish the quest)".dimmed().to_string());
                        }
                    }
                    None => {}
                }
            }
            SlideKind::Solo => {}
            SlideKind::Choice(choice) => {
                for (index, option) in choice.options.iter().enumerate() {
                    let mark = if view.chosen == Some(index) { "*" } else { " " };
                    self.line(format!("{mark}{}. {}", index + 1, option.label));
                }
            }
            SlideKind::Quiz(quiz) => {
                for (index, option) in quiz.options.iter().enumerate() {
                    let label = format!("{}. {}", index + 1, option.label);
                    if view.disabled_options.contains(&index) {
                        self.line(label.dimmed().to_string());
                    } else {
                        self.line(label);
                    }
                }
            }
            SlideKind::Customer(_) => {
                if let Some(customer) = &view.customer {
                    self.line(format!(
                        "{} {}",
                        format!("[{}]", customer.stage).cyan(),
                        payload_text(customer.content)
                    ));
                    if let Some(reveal) = customer.reveal {
                        self.line(format!("> {}", payload_text(reveal)));
                    }
                }
            }
            SlideKind::Ending(ending) => {
                for (index, option) in ending.options.iter().enumerate() {
                    self.line(format!(" {}. {}", index + 1, option.label));
                }
            }
        }

        match &view.blocker {
            Some(blocker) => self.line(format!("({blocker})").yellow().to_string()),
            None => self.line("(next to continue)".dimmed().to_string()),
        }
    }

    fn notify(&mut self, event: &EngineEvent) {
        let text = match event {
            EngineEvent::Ledger(LedgerEvent::ItemGranted { id }) => {
                format!("+ {id}").green().to_string()
            }
            EngineEvent::Ledger(LedgerEvent::CurrencyGranted { amount, balance }) => {
                format!("+ {amount} coins (wallet: {balance})").green().to_string()
            }
            EngineEvent::Ledger(LedgerEvent::Crafted { produces, .. }) => {
                format!("crafted {produces}").green().bold().to_string()
            }
            EngineEvent::PrerequisitesHeld { produces } => {
                format!("everything needed for {produces} is at hand!").magenta().to_string()
            }
            EngineEvent::QuizAnswered { correct: true, .. } => "correct!".green().to_string(),
            EngineEvent::QuizAnswered { correct: false, .. } => "not quite.".red().to_string(),
            EngineEvent::QuestCompleted => "quest complete".green().to_string(),
            EngineEvent::ChapterUnlocked(chapter) => {
                format!("chapter {chapter} unlocked").cyan().to_string()
            }
            EngineEvent::ChapterCompleted(chapter) => {
                format!("chapter {chapter} complete").bold().to_string()
            }
            _ => return,
        };
        let _ = writeln!(self.out, "  {text}");
    }
}
