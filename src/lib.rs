//! # quizpdf
//!
//! Pagination and layout engine for printable quiz documents.
//!
//! A [`Quiz`] holds questions whose text and options may be rich content
//! (plain strings, Quill-style Delta operations or a small HTML subset).
//! The engine word-wraps that content, sizes embedded images, draws answer
//! bubbles and breaks pages before questions that would overflow. The result
//! is a [`Document`] of pages and primitive draw operations that can be
//! saved as PDF, JSON or text.
//!
//! ## Quick Start
//!
//! ```no_run
//! use quizpdf::{generate_answer_key, Quiz};
//!
//! fn main() -> quizpdf::Result<()> {
//!     let quiz = Quiz::from_file("quiz.json")?;
//!     let doc = generate_answer_key(&quiz, None)?;
//!     doc.save(doc.default_filename())?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Rich content**: bold, italic, underline, sub/superscript runs
//! - **Templates**: student quiz, answer key, practice worksheet, overrides
//! - **Images**: base64 data URIs fitted to a box, placeholders otherwise
//! - **Pagination**: estimated question heights, page footers "Page i of N"
//! - **Output**: PDF 1.4 with standard fonts, JSON and plain text
//! - **Parallel batches**: all three templates at once with Rayon

pub mod backend;
pub mod composer;
pub mod error;
pub mod export;
pub mod layout;
pub mod model;
pub mod render;
pub mod template;

// Re-export commonly used types
pub use backend::{DocumentBackend, RecordingBackend, ShapeStyle};
pub use composer::{ComposerBuilder, ComposerState, DocumentComposer, QuestionPlacement};
pub use error::{Error, Result};
pub use export::{export, ExportFormat, ExportResult};
pub use layout::{
    ContentRenderer, FontStack, ImagePlacer, LayoutOptions, OptionRenderer, PageBreakEstimator,
    PageSize, Point, Rect,
};
pub use model::{
    DeltaAttributes, DeltaInsert, DeltaOp, Difficulty, Document, DrawOp, FontFamily, FontState,
    FontStyle, FontWeight, ImageFormat, LayoutStats, Letter, Metadata, Page, Question,
    QuestionType, Quiz, QuizSummary, Resource, RichContent, Script, ScriptOffset, StyledRun,
};
pub use render::JsonFormat;
pub use template::{
    get_available_templates, BubbleStyle, Template, TemplateKind, TemplateOverrides, ANSWER_KEY,
    PRACTICE_SHEET, STUDENT_QUIZ,
};

use rayon::prelude::*;
use std::path::Path;

/// Lay out `quiz` under `template` on A4 with default options.
///
/// # Example
///
/// ```no_run
/// use quizpdf::{generate_document, Quiz, STUDENT_QUIZ};
///
/// let quiz = Quiz::from_file("quiz.json").unwrap();
/// let doc = generate_document(&quiz, &STUDENT_QUIZ).unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn generate_document(quiz: &Quiz, template: &Template) -> Result<Document> {
    generate_with_options(quiz, template, LayoutOptions::default())
}

/// Lay out `quiz` with custom layout options.
///
/// # Example
///
/// ```no_run
/// use quizpdf::{generate_with_options, LayoutOptions, PageSize, Quiz, ANSWER_KEY};
///
/// let options = LayoutOptions::new()
///     .with_page_size(PageSize::Letter)
///     .with_margins(25.0);
/// let quiz = Quiz::from_file("quiz.json").unwrap();
/// let doc = generate_with_options(&quiz, &ANSWER_KEY, options).unwrap();
/// ```
pub fn generate_with_options(
    quiz: &Quiz,
    template: &Template,
    options: LayoutOptions,
) -> Result<Document> {
    let backend = RecordingBackend::new(options.page_width, options.page_height);
    DocumentComposer::builder()
        .backend(backend)
        .options(options)
        .build()?
        .generate(quiz, template)
}

fn generate_kind(
    quiz: &Quiz,
    kind: TemplateKind,
    overrides: Option<&TemplateOverrides>,
) -> Result<Document> {
    let template = match overrides {
        Some(overrides) => kind.template().with_overrides(overrides),
        None => kind.template().clone(),
    };
    generate_document(quiz, &template)
}

/// Student version: empty circle bubbles, name and date fields.
pub fn generate_student_quiz(quiz: &Quiz, overrides: Option<&TemplateOverrides>) -> Result<Document> {
    generate_kind(quiz, TemplateKind::StudentQuiz, overrides)
}

/// Teacher version: correct answers filled and bold, points and difficulty shown.
pub fn generate_answer_key(quiz: &Quiz, overrides: Option<&TemplateOverrides>) -> Result<Document> {
    generate_kind(quiz, TemplateKind::AnswerKey, overrides)
}

/// Worksheet version: blank answer rules instead of bubbles.
pub fn generate_practice_sheet(
    quiz: &Quiz,
    overrides: Option<&TemplateOverrides>,
) -> Result<Document> {
    generate_kind(quiz, TemplateKind::PracticeSheet, overrides)
}

/// Generate every canonical template in parallel.
///
/// Each generation owns its backend and state; results come back in
/// [`TemplateKind::ALL`] order.
pub fn generate_all(quiz: &Quiz, options: &LayoutOptions) -> Vec<(TemplateKind, Result<Document>)> {
    TemplateKind::ALL
        .par_iter()
        .map(|&kind| {
            let doc = generate_with_options(quiz, kind.template(), options.clone());
            (kind, doc)
        })
        .collect()
}

/// Load every quiz from a JSON file: a single quiz or `{ "tests": [...] }`.
pub fn load_quizzes<P: AsRef<Path>>(path: P) -> Result<Vec<Quiz>> {
    let json = std::fs::read_to_string(path)?;
    Quiz::load_all(&json)
}

/// Builder for generating and exporting quiz documents.
///
/// # Example
///
/// ```no_run
/// use quizpdf::{QuizPdf, Quiz, TemplateKind, TemplateOverrides};
///
/// let quiz = Quiz::from_file("quiz.json")?;
/// QuizPdf::new()
///     .with_template(TemplateKind::StudentQuiz)
///     .with_overrides(TemplateOverrides::new().with_show_points(true))
///     .generate(&quiz)?
///     .save("quiz.pdf")?;
/// # Ok::<(), quizpdf::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct QuizPdf {
    kind: TemplateKind,
    overrides: TemplateOverrides,
    options: LayoutOptions,
}

impl QuizPdf {
    /// Create a builder for the student template with default layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the canonical template.
    pub fn with_template(mut self, kind: TemplateKind) -> Self {
        self.kind = kind;
        self
    }

    /// Apply template overrides.
    pub fn with_overrides(mut self, overrides: TemplateOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Set layout options.
    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the paper size.
    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.options = self.options.with_page_size(size);
        self
    }

    /// The template that will be used.
    pub fn template(&self) -> Template {
        self.kind.template().with_overrides(&self.overrides)
    }

    /// Lay out `quiz`.
    pub fn generate(&self, quiz: &Quiz) -> Result<Document> {
        generate_with_options(quiz, &self.template(), self.options.clone())
    }

    /// Lay out `quiz` and encode it as `format`.
    pub fn export(&self, quiz: &Quiz, format: ExportFormat) -> Result<ExportResult> {
        let doc = self.generate(quiz)?;
        export::export(&doc, format)
    }
}
