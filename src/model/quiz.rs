//! Quiz input types.
//!
//! These mirror the JSON the question-management side produces: a quiz is
//! `{ "testName": ..., "questions": [...] }`, optionally wrapped in a
//! library bundle `{ "tests": [...] }`.

use super::{DeltaOp, RichContent};
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Smallest number of active options on a multiple-choice question.
pub const MIN_OPTIONS: usize = 2;

/// Largest number of active options on a multiple-choice question.
pub const MAX_OPTIONS: usize = 6;

/// Option letter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Letter {
    #[default]
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Letter {
    /// All letters in order.
    pub const ALL: [Letter; MAX_OPTIONS] =
        [Letter::A, Letter::B, Letter::C, Letter::D, Letter::E, Letter::F];

    /// Zero-based position of the letter.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Letter at a zero-based position.
    pub fn from_index(index: usize) -> Option<Letter> {
        Self::ALL.get(index).copied()
    }

    pub fn as_char(self) -> char {
        (b'A' + self as u8) as char
    }

    /// Read an answer written as `"B"`, `"b"` or `"option2"`.
    pub fn parse_answer(answer: &str) -> Option<Letter> {
        let answer = answer.trim();
        let index = match answer.as_bytes() {
            [c] if c.is_ascii_alphabetic() => (c.to_ascii_uppercase() - b'A') as usize,
            _ => {
                let prefix = answer.get(..6)?;
                if !prefix.eq_ignore_ascii_case("option") {
                    return None;
                }
                answer[6..].parse::<usize>().ok()?.checked_sub(1)?
            }
        };
        Letter::from_index(index)
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Question kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    #[default]
    MultipleChoice,
    TrueFalse,
}

/// Question difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[serde(other)]
    Other,
}

impl Difficulty {
    /// Upper-case label used in question headers.
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Medium => "MEDIUM",
            Difficulty::Hard => "HARD",
            Difficulty::Other => "OTHER",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label().to_ascii_lowercase())
    }
}

/// Accept both `"q1"` and `7` as identifiers.
fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Str(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<IdRepr>::deserialize(deserializer)? {
        Some(IdRepr::Str(s)) => s,
        Some(IdRepr::Int(n)) => n.to_string(),
        Some(IdRepr::Float(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Map `correctAnswer` onto a letter; anything unreadable becomes `None`
/// rather than failing the whole file.
fn lenient_answer<'de, D>(deserializer: D) -> std::result::Result<Option<Letter>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let letter = match &raw {
        Some(serde_json::Value::String(s)) => Letter::parse_answer(s),
        _ => None,
    };
    if let (None, Some(raw)) = (letter, raw.filter(|v| !v.is_null())) {
        log::warn!("Unrecognized correctAnswer {}; highlighting A", raw);
    }
    Ok(letter)
}

/// Read a Quill Delta given as `{"ops": [...]}` or a bare op list.
fn lenient_delta<'de, D>(deserializer: D) -> std::result::Result<Option<RichContent>, D::Error>
where
    D: Deserializer<'de>,
{
    let ops = match Option::<serde_json::Value>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(serde_json::Value::Object(mut doc)) => doc.remove("ops").unwrap_or_default(),
        Some(other) => other,
    };
    match serde_json::from_value::<Vec<DeltaOp>>(ops) {
        Ok(ops) => Ok(Some(RichContent::delta(ops))),
        Err(e) => {
            log::warn!("Ignoring unreadable questionDelta: {}", e);
            Ok(None)
        }
    }
}

/// A single quiz question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,

    /// Plain question text; also accepted as `question`.
    #[serde(default, alias = "question")]
    pub question_text: String,

    /// Formatted question text, preferred over every other form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_rich: Option<RichContent>,

    /// Editor Delta of the question body.
    #[serde(
        default,
        deserialize_with = "lenient_delta",
        skip_serializing_if = "Option::is_none"
    )]
    pub question_delta: Option<RichContent>,

    /// Editor HTML of the question body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_html: Option<String>,

    #[serde(default)]
    pub question_type: QuestionType,

    /// Image reference: a data URI or a bare path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default)]
    pub options: BTreeMap<Letter, RichContent>,

    /// Number of active options; letters past it are ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option_count: Option<usize>,

    /// `None` when the answer was missing or unreadable.
    #[serde(
        default,
        deserialize_with = "lenient_answer",
        skip_serializing_if = "Option::is_none"
    )]
    pub correct_answer: Option<Letter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
}

impl Question {
    /// Create a multiple-choice question with options lettered from A.
    pub fn multiple_choice<S: AsRef<str>>(
        id: impl Into<String>,
        text: impl Into<String>,
        options: &[S],
        correct: Letter,
    ) -> Self {
        let options: BTreeMap<Letter, RichContent> = options
            .iter()
            .enumerate()
            .filter_map(|(i, text)| Letter::from_index(i).map(|l| (l, RichContent::plain(text.as_ref()))))
            .collect();
        Self {
            id: id.into(),
            question_text: text.into(),
            option_count: Some(options.len()),
            options,
            correct_answer: Some(correct),
            ..Default::default()
        }
    }

    /// Create a true/false question; `answer` is the correct value.
    pub fn true_false(id: impl Into<String>, text: impl Into<String>, answer: bool) -> Self {
        Self {
            id: id.into(),
            question_text: text.into(),
            question_type: QuestionType::TrueFalse,
            option_count: Some(2),
            correct_answer: Some(if answer { Letter::A } else { Letter::B }),
            ..Default::default()
        }
    }

    /// Set formatted question text.
    pub fn with_rich(mut self, content: RichContent) -> Self {
        self.question_rich = Some(content);
        self
    }

    /// Set the image reference.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Replace one option's content.
    pub fn with_option(mut self, letter: Letter, content: RichContent) -> Self {
        self.options.insert(letter, content);
        self
    }

    /// Set the active option count.
    pub fn with_option_count(mut self, count: usize) -> Self {
        self.option_count = Some(count);
        self
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = Some(points);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    pub fn is_true_false(&self) -> bool {
        self.question_type == QuestionType::TrueFalse
    }

    /// The question body: the first non-blank of the rich, Delta and HTML
    /// forms, then the plain text.
    pub fn content(&self) -> RichContent {
        let html = self.question_html.as_deref().map(RichContent::html);
        self.question_rich
            .iter()
            .chain(&self.question_delta)
            .chain(&html)
            .find(|content| !content.is_blank())
            .cloned()
            .unwrap_or_else(|| RichContent::plain(self.question_text.clone()))
    }

    /// The letter to highlight; an unreadable answer falls back to A.
    pub fn correct_letter(&self) -> Letter {
        self.correct_answer.unwrap_or_default()
    }

    /// Number of active options, clamped to the supported range.
    pub fn active_option_count(&self) -> usize {
        if self.is_true_false() {
            return 2;
        }
        let count = match self.option_count {
            Some(n) => n,
            None if self.options.is_empty() => 4,
            None => self.options.len(),
        };
        count.clamp(MIN_OPTIONS, MAX_OPTIONS)
    }

    /// Letters that are in play for this question.
    pub fn active_letters(&self) -> &'static [Letter] {
        &Letter::ALL[..self.active_option_count()]
    }

    pub fn option(&self, letter: Letter) -> Option<&RichContent> {
        self.options.get(&letter)
    }

    /// Points, counting a missing value as one.
    pub fn points_or_default(&self) -> u32 {
        self.points.unwrap_or(1)
    }

    /// Image reference, ignoring empty strings.
    pub fn image_ref(&self) -> Option<&str> {
        self.image.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Check the question invariants.
    pub fn validate(&self) -> Result<()> {
        if let Some(n) = self.option_count {
            if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&n) && !self.is_true_false() {
                return Err(Error::InvalidQuiz(format!(
                    "question {}: optionCount {} outside {}..={}",
                    self.id, n, MIN_OPTIONS, MAX_OPTIONS
                )));
            }
        }
        let Some(correct) = self.correct_answer else {
            return Err(Error::InvalidQuiz(format!(
                "question {}: missing or unrecognized correct answer",
                self.id
            )));
        };
        if self.is_true_false() {
            if correct > Letter::B {
                return Err(Error::InvalidQuiz(format!(
                    "question {}: true/false answer must be A or B, got {}",
                    self.id, correct
                )));
            }
            return Ok(());
        }
        let answered = self.active_letters().contains(&correct)
            && self
                .option(correct)
                .is_some_and(|content| !content.is_blank());
        if !answered {
            return Err(Error::InvalidQuiz(format!(
                "question {}: correct answer {} is not an active option",
                self.id, correct
            )));
        }
        Ok(())
    }
}

/// A quiz: a named, ordered set of questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[serde(default)]
    pub test_name: String,

    #[serde(
        default,
        rename = "testID",
        alias = "testId",
        skip_serializing_if = "Option::is_none"
    )]
    pub test_id: Option<String>,

    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Create an empty quiz.
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            ..Default::default()
        }
    }

    /// Append a question.
    pub fn with_question(mut self, question: Question) -> Self {
        self.questions.push(question);
        self
    }

    /// Parse every quiz in a JSON document (bare quiz or `{ "tests": [...] }`).
    pub fn load_all(json: &str) -> Result<Vec<Quiz>> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        match value.get_mut("tests").map(serde_json::Value::take) {
            Some(tests) => Ok(serde_json::from_value(tests)?),
            None => Ok(vec![serde_json::from_value(value)?]),
        }
    }

    /// Parse the first quiz in a JSON document.
    pub fn from_json(json: &str) -> Result<Quiz> {
        Self::load_all(json)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::InvalidQuiz("library contains no tests".to_string()))
    }

    /// Read and parse the first quiz in a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Quiz> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Title for the document header.
    pub fn title(&self) -> &str {
        let name = self.test_name.trim();
        if name.is_empty() {
            "Quiz"
        } else {
            name
        }
    }

    /// Questions in layout order: by `position`, defaulting to the 1-based
    /// input index, ties kept in input order.
    pub fn ordered_questions(&self) -> Vec<&Question> {
        let mut ordered: Vec<(u32, &Question)> = self
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| (q.position.unwrap_or(i as u32 + 1), q))
            .collect();
        ordered.sort_by_key(|(position, _)| *position);
        ordered.into_iter().map(|(_, q)| q).collect()
    }

    /// Sum of question points.
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(Question::points_or_default).sum()
    }

    /// Aggregate counts for headers and CLI output.
    pub fn summary(&self) -> QuizSummary {
        let mut counts: BTreeMap<Difficulty, usize> = BTreeMap::new();
        for question in &self.questions {
            *counts
                .entry(question.difficulty.unwrap_or(Difficulty::Easy))
                .or_default() += 1;
        }
        let mut dominant = Difficulty::Easy;
        let mut best = 0;
        for (difficulty, count) in counts {
            if count > best {
                dominant = difficulty;
                best = count;
            }
        }

        QuizSummary {
            question_count: self.questions.len(),
            total_points: self.total_points(),
            dominant_difficulty: dominant,
        }
    }

    /// Validate every question, returning the problems found.
    pub fn validate(&self) -> Vec<Error> {
        self.questions
            .iter()
            .filter_map(|q| q.validate().err())
            .collect()
    }
}

/// Aggregate quiz figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub question_count: usize,
    pub total_points: u32,
    pub dominant_difficulty: Difficulty,
}
