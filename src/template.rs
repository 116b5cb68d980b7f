//! Template registry.
//!
//! A [`Template`] selects which optional content a generated document shows.
//! The three canonical templates are constants; callers derive variants with
//! [`Template::with_overrides`] instead of mutating them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Marker drawn next to each answer option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BubbleStyle {
    /// Outline circle
    #[default]
    Circle,
    /// Outline circle, filled for the correct answer when answers are shown
    Filled,
    /// No marker; multiple-choice questions get blank answer rules instead
    None,
}

impl FromStr for BubbleStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "circle" => Ok(BubbleStyle::Circle),
            "filled" => Ok(BubbleStyle::Filled),
            "none" => Ok(BubbleStyle::None),
            other => Err(Error::Configuration(format!("unknown bubble style: {}", other))),
        }
    }
}

/// Display flags for a generated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub name: Cow<'static, str>,
    pub description: Cow<'static, str>,
    pub show_answers: bool,
    pub show_points: bool,
    pub show_difficulty: bool,
    pub bubble_style: BubbleStyle,
}

/// Standard quiz handed to students.
pub const STUDENT_QUIZ: Template = Template {
    name: Cow::Borrowed("Student Quiz"),
    description: Cow::Borrowed("Standard quiz format with A/B/C/D bubbles"),
    show_answers: false,
    show_points: false,
    show_difficulty: false,
    bubble_style: BubbleStyle::Circle,
};

/// Teacher copy with the correct answers highlighted.
pub const ANSWER_KEY: Template = Template {
    name: Cow::Borrowed("Teacher Answer Key"),
    description: Cow::Borrowed("Same layout with correct answers highlighted"),
    show_answers: true,
    show_points: true,
    show_difficulty: true,
    bubble_style: BubbleStyle::Filled,
};

/// Worksheet with room for written answers.
pub const PRACTICE_SHEET: Template = Template {
    name: Cow::Borrowed("Practice Worksheet"),
    description: Cow::Borrowed("Questions with larger answer spaces"),
    show_answers: false,
    show_points: false,
    show_difficulty: false,
    bubble_style: BubbleStyle::None,
};

static TEMPLATES: [Template; 3] = [STUDENT_QUIZ, ANSWER_KEY, PRACTICE_SHEET];

impl Template {
    /// Apply caller overrides field by field.
    pub fn with_overrides(&self, overrides: &TemplateOverrides) -> Template {
        Template {
            name: overrides
                .name
                .clone()
                .map(Cow::Owned)
                .unwrap_or_else(|| self.name.clone()),
            description: overrides
                .description
                .clone()
                .map(Cow::Owned)
                .unwrap_or_else(|| self.description.clone()),
            show_answers: overrides.show_answers.unwrap_or(self.show_answers),
            show_points: overrides.show_points.unwrap_or(self.show_points),
            show_difficulty: overrides.show_difficulty.unwrap_or(self.show_difficulty),
            bubble_style: overrides.bubble_style.unwrap_or(self.bubble_style),
        }
    }

    /// Whether an option is drawn highlighted.
    pub fn highlights(&self, is_correct: bool) -> bool {
        self.show_answers && is_correct
    }
}

impl Default for Template {
    fn default() -> Self {
        STUDENT_QUIZ
    }
}

/// Field-by-field template overrides; `None` keeps the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateOverrides {
    pub name: Option<String>,
    pub description: Option<String>,
    pub show_answers: Option<bool>,
    pub show_points: Option<bool>,
    pub show_difficulty: Option<bool>,
    pub bubble_style: Option<BubbleStyle>,
}

impl TemplateOverrides {
    /// Create empty overrides.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_show_answers(mut self, show: bool) -> Self {
        self.show_answers = Some(show);
        self
    }

    pub fn with_show_points(mut self, show: bool) -> Self {
        self.show_points = Some(show);
        self
    }

    pub fn with_show_difficulty(mut self, show: bool) -> Self {
        self.show_difficulty = Some(show);
        self
    }

    pub fn with_bubble_style(mut self, style: BubbleStyle) -> Self {
        self.bubble_style = Some(style);
        self
    }

    /// Whether no field is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Identifier of a canonical template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateKind {
    #[default]
    StudentQuiz,
    AnswerKey,
    PracticeSheet,
}

impl TemplateKind {
    /// All canonical kinds, in registry order.
    pub const ALL: [TemplateKind; 3] = [
        TemplateKind::StudentQuiz,
        TemplateKind::AnswerKey,
        TemplateKind::PracticeSheet,
    ];

    /// The canonical template for this kind.
    pub fn template(self) -> &'static Template {
        &TEMPLATES[self as usize]
    }

    /// Short identifier used on the command line and in file names.
    pub fn as_str(self) -> &'static str {
        match self {
            TemplateKind::StudentQuiz => "student",
            TemplateKind::AnswerKey => "answer-key",
            TemplateKind::PracticeSheet => "practice",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "student" | "student-quiz" | "quiz" => Ok(TemplateKind::StudentQuiz),
            "answer-key" | "answers" | "key" | "teacher" => Ok(TemplateKind::AnswerKey),
            "practice" | "practice-sheet" | "worksheet" => Ok(TemplateKind::PracticeSheet),
            other => Err(Error::Configuration(format!("unknown template: {}", other))),
        }
    }
}

/// The canonical templates, for populating template pickers.
pub fn get_available_templates() -> &'static [Template] {
    &TEMPLATES
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_templates() {
        let templates = get_available_templates();
        assert_eq!(templates.len(), 3);
        assert_eq!(templates[0].name, "Student Quiz");
        assert!(!templates[0].show_answers);
        assert_eq!(templates[1].bubble_style, BubbleStyle::Filled);
        assert!(templates[1].show_points && templates[1].show_difficulty);
        assert_eq!(templates[2].bubble_style, BubbleStyle::None);
    }

    #[test]
    fn test_overrides_leave_base_untouched() {
        let custom = STUDENT_QUIZ.with_overrides(
            &TemplateOverrides::new()
                .with_show_points(true)
                .with_name("Unit 3 Quiz"),
        );
        assert!(custom.show_points);
        assert_eq!(custom.name, "Unit 3 Quiz");
        assert_eq!(custom.bubble_style, BubbleStyle::Circle);
        assert!(!STUDENT_QUIZ.show_points);
    }

    #[test]
    fn test_overrides_from_json() {
        let overrides: TemplateOverrides =
            serde_json::from_str(r#"{"showAnswers": true, "bubbleStyle": "filled"}"#).unwrap();
        let t = STUDENT_QUIZ.with_overrides(&overrides);
        assert!(t.show_answers);
        assert_eq!(t.bubble_style, BubbleStyle::Filled);
        assert!(TemplateOverrides::new().is_empty());
    }

    #[test]
    fn test_highlights() {
        assert!(ANSWER_KEY.highlights(true));
        assert!(!ANSWER_KEY.highlights(false));
        assert!(!STUDENT_QUIZ.highlights(true));
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("answer_key".parse::<TemplateKind>().unwrap(), TemplateKind::AnswerKey);
        assert_eq!(TemplateKind::PracticeSheet.template().name, "Practice Worksheet");
        assert!("poster".parse::<TemplateKind>().is_err());
    }
}
