//! Structural validation of a script.
//!
//! Checks that chapters are non-empty, that every jump and portal names a
//! slide or chapter that exists, that gates only require side-paths the slide
//! actually offers, and that quizzes have exactly one correct answer.

use std::collections::HashSet;
use std::fmt;

use crate::chapter::Chapter;
use crate::script::Script;
use crate::slide::{EndingTarget, Slide, SlideKind};

/// How serious a validation issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The script cannot be played correctly.
    Error,
    /// The script plays, but probably not as intended.
    Warning,
}

/// A warning or error found during script validation.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Where the issue was found, e.g. `ch1` or `ch1#3`.
    pub location: String,
    /// A human-readable description of the issue.
    pub message: String,
    /// Error or warning.
    pub severity: Severity,
}

impl ValidationIssue {
    /// Whether this issue is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{level}: {}: {}", self.location, self.message)
    }
}

impl Script {
    /// Validate the script's structure and return every issue found.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.chapters.is_empty() {
            issues.push(error("script", "no chapters defined"));
            return issues;
        }

        if !self.has_chapter(self.first_chapter.as_str()) {
            issues.push(error(
                "script",
                format!("first chapter '{}' does not exist", self.first_chapter),
            ));
        }

        let mut seen = HashSet::new();
        for chapter in &self.chapters {
            if !seen.insert(chapter.id.as_str()) {
                issues.push(error(
                    chapter.id.as_str(),
                    "duplicate chapter id".to_string(),
                ));
            }
            validate_chapter(self, chapter, &mut issues);
        }

        issues
    }
}

fn validate_chapter(script: &Script, chapter: &Chapter, issues: &mut Vec<ValidationIssue>) {
    if chapter.slides.is_empty() {
        issues.push(error(chapter.id.as_str(), "chapter has no slides"));
        return;
    }

    let mut ids = HashSet::new();
    for (index, slide) in chapter.slides.iter().enumerate() {
        if let Some(id) = &slide.id
            && !ids.insert(id.as_str())
        {
            issues.push(error(
                &at(chapter, index),
                format!("duplicate slide id '{id}'"),
            ));
        }
        validate_slide(script, chapter, index, slide, issues);
    }
}

fn validate_slide(
    script: &Script,
    chapter: &Chapter,
    index: usize,
    slide: &Slide,
    issues: &mut Vec<ValidationIssue>,
) {
    let location = at(chapter, index);

    if let Some(next) = &slide.next_chapter_id {
        if !script.has_chapter(next.as_str()) {
            issues.push(error(&location, format!("unknown next chapter '{next}'")));
        }
        let finishes_anywhere = matches!(slide.kind, SlideKind::Ending(_));
        if !finishes_anywhere && !chapter.is_last(index) {
            issues.push(warning(
                &location,
                "next_chapter_id is only followed on the final slide",
            ));
        }
    }

    if let Some(recipe) = &slide.craft {
        if recipe.requires.is_empty() {
            issues.push(warning(&location, "recipe has no prerequisites"));
        }
        let mut listed = HashSet::new();
        let mut repeated = HashSet::new();
        for id in &recipe.requires {
            if !listed.insert(id) && repeated.insert(id) {
                issues.push(warning(
                    &location,
                    format!("recipe requires '{id}' more than once; each listing needs its own unit"),
                ));
            }
        }
    }

    match &slide.kind {
        SlideKind::Advance(advance) => {
            for slot in advance.required_slots() {
                if !advance.side_paths.has(slot) {
                    issues.push(error(
                        &location,
                        format!("gate requires undefined side-path '{slot}'"),
                    ));
                }
            }
            if let Some(quest) = &advance.side_paths.quest {
                if quest.steps.is_empty() {
                    issues.push(error(&location, "quest has no steps"));
                }
                for (step, data) in quest.steps.iter().enumerate() {
                    if quest.step_requires_reveal(step) && data.reveal.is_none() {
                        issues.push(warning(
                            &location,
                            format!("quest step {step} is gated but has nothing to reveal"),
                        ));
                    }
                }
            }
        }
        SlideKind::Solo | SlideKind::Customer(_) => {}
        SlideKind::Choice(choice) => {
            if choice.options.is_empty() {
                issues.push(error(&location, "choice has no options"));
            }
            for option in &choice.options {
                if let Some(target) = &option.next_id
                    && chapter.position_of(target.as_str()).is_none()
                {
                    issues.push(error(
                        &location,
                        format!("option '{}' jumps to unknown slide '{target}'", option.label),
                    ));
                }
                if let Some(next) = &option.next_chapter_id
                    && !script.has_chapter(next.as_str())
                {
                    issues.push(error(
                        &location,
                        format!(
                            "option '{}' portals to unknown chapter '{next}'",
                            option.label
                        ),
                    ));
                }
            }
        }
        SlideKind::Quiz(quiz) => {
            let correct = quiz.options.iter().filter(|option| option.correct).count();
            if correct != 1 {
                issues.push(error(
                    &location,
                    format!("quiz must have exactly one correct option, found {correct}"),
                ));
            }
        }
        SlideKind::Ending(ending) => {
            if ending.options.is_empty() {
                issues.push(error(&location, "ending has no options"));
            }
            for option in &ending.options {
                if let EndingTarget::Slide(target) = &option.target
                    && chapter.position_of(target.as_str()).is_none()
                {
                    issues.push(error(
                        &location,
                        format!("option '{}' leads to unknown slide '{target}'", option.label),
                    ));
                }
            }
        }
    }
}

fn at(chapter: &Chapter, index: usize) -> String {
    format!("{}#{index}", chapter.id)
}

fn error(location: &str, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        location: location.to_string(),
        message: message.into(),
        severity: Severity::Error,
    }
}

fn warning(location: &str, message: impl Into<String>) -> ValidationIssue {
    ValidationIssue {
        location: location.to_string(),
        message: message.into(),
        severity: Severity::Warning,
    }
}
