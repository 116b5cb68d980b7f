//! Document composer.
//!
//! Drives one generation from start to finish: header, optional student-info
//! block, each question in position order with page breaks decided up front,
//! and a final pass that writes footers once the page count is known.
//!
//! # Example
//!
//! ```no_run
//! use quizpdf::composer::DocumentComposer;
//! use quizpdf::backend::RecordingBackend;
//! use quizpdf::{Quiz, ANSWER_KEY};
//!
//! let quiz = Quiz::from_file("quiz.json")?;
//! let doc = DocumentComposer::builder()
//!     .backend(RecordingBackend::a4())
//!     .build()?
//!     .generate(&quiz, &ANSWER_KEY)?;
//! doc.save("answer-key.pdf")?;
//! # Ok::<(), quizpdf::Error>(())
//! ```

use crate::backend::DocumentBackend;
use crate::error::{Error, Result};
use crate::layout::{
    shows_metadata, ContentRenderer, ImagePlacer, LayoutOptions, LayoutState, OptionRenderer,
    PageBreakEstimator, PlacedImage, Point,
};
use crate::model::{Document, FontStyle, LayoutStats, Letter, Metadata, Question, Quiz};
use crate::template::{BubbleStyle, Template};
use chrono::Utc;

const TITLE_ADVANCE: f32 = 10.0;
const SUBTITLE_ADVANCE: f32 = 5.0;
const RULE_OFFSET: f32 = 3.0;
const RULE_ADVANCE: f32 = 10.0;
const STUDENT_INFO_ADVANCE: f32 = 15.0;
const ANSWER_KEY_ADVANCE: f32 = 5.0;
const DATE_FIELD_WIDTH: f32 = 50.0;
const PAGE_LABEL_WIDTH: f32 = 20.0;
const SIZE_TOLERANCE: f32 = 0.01;

/// Phase of a generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerState {
    Idle,
    RenderingHeader,
    RenderingQuestion,
    NewPage,
    Finalizing,
    Done,
}

/// Where a question ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuestionPlacement {
    /// 1-based question number
    pub number: u32,
    /// Zero-based page the question starts on
    pub page_index: usize,
    pub start_y: f32,
    /// Cursor after the question, spacing included
    pub end_y: f32,
}

/// Builder for [`DocumentComposer`].
#[derive(Default)]
pub struct ComposerBuilder {
    backend: Option<Box<dyn DocumentBackend>>,
    options: Option<LayoutOptions>,
}

impl ComposerBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document backend.
    pub fn backend<B: DocumentBackend + 'static>(mut self, backend: B) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    /// Set an already boxed document backend.
    pub fn boxed_backend(mut self, backend: Box<dyn DocumentBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set layout options.
    pub fn options(mut self, options: LayoutOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Build the composer.
    ///
    /// Fails with [`Error::Configuration`] when no backend was supplied or
    /// the layout does not fit the backend's pages.
    pub fn build(self) -> Result<DocumentComposer> {
        let backend = self
            .backend
            .ok_or_else(|| Error::Configuration("no document backend configured".to_string()))?;
        DocumentComposer::new(backend, self.options.unwrap_or_default())
    }
}

/// Lays out a quiz onto a [`DocumentBackend`].
///
/// A composer performs exactly one generation: [`generate`](Self::generate)
/// consumes it together with its backend.
pub struct DocumentComposer {
    backend: Box<dyn DocumentBackend>,
    options: LayoutOptions,
    state: ComposerState,
    layout: LayoutState,
    stats: LayoutStats,
    text: ContentRenderer,
    option_renderer: OptionRenderer,
    images: ImagePlacer,
    estimator: PageBreakEstimator,
}

impl DocumentComposer {
    /// Start building a composer.
    pub fn builder() -> ComposerBuilder {
        ComposerBuilder::new()
    }

    /// Create a composer over `backend`.
    pub fn new(mut backend: Box<dyn DocumentBackend>, options: LayoutOptions) -> Result<Self> {
        options.validate()?;

        let (width, height) = backend.page_size();
        if (width - options.page_width).abs() > SIZE_TOLERANCE
            || (height - options.page_height).abs() > SIZE_TOLERANCE
        {
            return Err(Error::Configuration(format!(
                "backend pages are {}x{} mm but the layout expects {}x{} mm",
                width, height, options.page_width, options.page_height
            )));
        }
        if backend.page_count() == 0 {
            backend.new_page();
        }

        Ok(Self {
            backend,
            state: ComposerState::Idle,
            layout: LayoutState::new(&options),
            stats: LayoutStats::new(),
            text: ContentRenderer::from_options(&options),
            option_renderer: OptionRenderer::new(&options),
            images: ImagePlacer::new(&options),
            estimator: PageBreakEstimator::new(&options),
            options,
        })
    }

    /// Current phase.
    pub fn state(&self) -> ComposerState {
        self.state
    }

    /// Layout options in use.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Lay out `quiz` under `template` and return the finished document.
    pub fn generate(mut self, quiz: &Quiz, template: &Template) -> Result<Document> {
        log::debug!(
            "Generating '{}' as '{}' ({} questions)",
            quiz.title(),
            template.name,
            quiz.questions.len()
        );

        self.transition(ComposerState::RenderingHeader);
        self.render_header(quiz, template);
        if template.show_answers {
            self.layout.cursor_y += ANSWER_KEY_ADVANCE;
        } else {
            self.render_student_info();
        }

        for (index, question) in quiz.ordered_questions().into_iter().enumerate() {
            self.place_question(question, index as u32 + 1, template);
        }

        self.transition(ComposerState::Finalizing);
        self.render_footers()?;

        let metadata = Metadata {
            title: quiz.title().to_string(),
            template: template.name.to_string(),
            producer: self.options.credit.clone(),
            created: Some(Utc::now()),
            page_count: self.backend.page_count() as u32,
            question_count: quiz.questions.len() as u32,
            total_points: quiz.total_points(),
        };
        self.transition(ComposerState::Done);
        self.backend.finish(metadata, self.stats)
    }

    fn transition(&mut self, next: ComposerState) {
        if self.state != next {
            log::debug!("Composer {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn render_header(&mut self, quiz: &Quiz, template: &Template) {
        let left = self.options.content_left();
        let mut y = self.layout.cursor_y;

        let title_font = self.options.font(self.options.title_font_pt).bold();
        self.backend
            .draw_text(quiz.title(), Point::new(left, y), &title_font, false);
        y += TITLE_ADVANCE;

        let subtitle_font = self.options.font(self.options.subtitle_font_pt);
        self.backend
            .draw_text(&template.name, Point::new(left, y), &subtitle_font, false);
        y += SUBTITLE_ADVANCE;

        if template.show_points {
            let summary = quiz.summary();
            let totals = format!(
                "Total Questions: {} | Total Points: {}",
                summary.question_count, summary.total_points
            );
            self.backend
                .draw_text(&totals, Point::new(left, y), &subtitle_font, false);
            y += SUBTITLE_ADVANCE;
        }

        self.backend.move_to(Point::new(left, y + RULE_OFFSET));
        self.backend.line_to(
            Point::new(self.options.content_right(), y + RULE_OFFSET),
            self.options.stroke_width,
        );
        self.layout.cursor_y = y + RULE_ADVANCE;
    }

    fn render_student_info(&mut self) {
        let y = self.layout.cursor_y;
        let font = self.options.font(self.options.info_font_pt);
        self.backend.draw_text(
            "Name: ____________________________",
            Point::new(self.options.content_left(), y),
            &font,
            false,
        );
        self.backend.draw_text(
            "Date: ______________",
            Point::new(self.options.content_right() - DATE_FIELD_WIDTH, y),
            &font,
            false,
        );
        self.layout.cursor_y = y + STUDENT_INFO_ADVANCE;
    }

    /// Break the page if the estimate overflows, then render the question.
    ///
    /// A question that does not fit an empty page is rendered anyway.
    fn place_question(
        &mut self,
        question: &Question,
        number: u32,
        template: &Template,
    ) -> QuestionPlacement {
        self.transition(ComposerState::RenderingQuestion);
        if let Err(e) = question.validate() {
            log::warn!("{}; rendering anyway", e);
            self.stats.add_invalid_question();
        }

        let required = self.estimator.estimate(question, template);
        let at_top = self.layout.cursor_y <= self.options.margin_top;
        if !at_top && self.estimator.should_break(self.layout.cursor_y, required) {
            log::debug!(
                "Question {} needs {:.1} mm at y={:.1}; starting a new page",
                number,
                required,
                self.layout.cursor_y
            );
            self.transition(ComposerState::NewPage);
            self.backend.new_page();
            self.layout.page_index = self.backend.current_page();
            self.layout.cursor_y = self.options.margin_top;
            self.stats.add_page_break();
            self.transition(ComposerState::RenderingQuestion);
        }

        let start_y = self.layout.cursor_y;
        self.backend.mark_question(number);
        self.stats.add_question();
        let end_y = self.render_question(question, number, template);
        self.layout.cursor_y = end_y;

        QuestionPlacement {
            number,
            page_index: self.layout.page_index,
            start_y,
            end_y,
        }
    }

    fn render_question(&mut self, question: &Question, number: u32, template: &Template) -> f32 {
        let left = self.options.content_left();
        let right = self.options.content_right();
        let indent_x = left + self.options.question_indent;
        let body = self.options.body_font();
        let mut y = self.layout.cursor_y;

        self.backend
            .draw_text(&format!("{}.", number), Point::new(left, y), &body.bold(), false);
        if shows_metadata(question, template) {
            let meta_font = self
                .options
                .font(self.options.info_font_pt)
                .with_style(FontStyle::Italic);
            self.backend.draw_text(
                &metadata_label(question, template),
                Point::new(indent_x, y),
                &meta_font,
                false,
            );
            y += self.options.line_height;
        }

        self.layout.fonts.push(body);

        let runs = question.content().normalize();
        let text_end = self.text.render(
            self.backend.as_mut(),
            &mut self.layout.fonts,
            &runs,
            Point::new(indent_x, y),
            right - indent_x,
        );
        y = if text_end > y {
            text_end
        } else {
            y + self.options.line_height
        };
        y += self.options.question_text_gap;

        let placement = self.images.place(
            question.image_ref(),
            Point::new(indent_x, y),
            self.options.image_max_width(),
            self.options.image_max_height,
        );
        self.images.draw(&placement, self.backend.as_mut());
        match placement.content {
            Some(PlacedImage::Image { .. }) => self.stats.add_image(),
            Some(PlacedImage::Placeholder { .. }) => self.stats.add_placeholder(),
            None => {}
        }
        y += placement.consumed_height;

        let option_x = left + self.options.option_indent;
        let option_width = right - option_x;
        if question.is_true_false() {
            y = self.option_renderer.render_true_false(
                self.backend.as_mut(),
                &mut self.layout.fonts,
                question.correct_letter(),
                template,
                Point::new(option_x, y),
                option_width,
            );
            for letter in [Letter::A, Letter::B] {
                self.stats
                    .add_option(template.highlights(letter == question.correct_letter()));
            }
        } else if template.bubble_style == BubbleStyle::None {
            y = self.option_renderer.render_answer_rules(
                self.backend.as_mut(),
                Point::new(option_x, y),
                right,
            );
            self.stats
                .add_answer_rules(self.option_renderer.rule_count() as u32);
        } else {
            for &letter in question.active_letters() {
                let Some(content) = question.option(letter) else {
                    continue;
                };
                let is_correct = letter == question.correct_letter();
                let next = self.option_renderer.render_option(
                    self.backend.as_mut(),
                    &mut self.layout.fonts,
                    letter,
                    content,
                    template,
                    is_correct,
                    Point::new(option_x, y),
                    option_width,
                );
                if next > y {
                    self.stats.add_option(template.highlights(is_correct));
                }
                y = next;
            }
        }

        self.layout.fonts.pop();
        y + self.options.question_spacing
    }

    fn render_footers(&mut self) -> Result<()> {
        let total = self.backend.page_count();
        let font = self.options.font(self.options.footer_font_pt);
        let y = self.options.page_height - self.options.footer_offset;
        let page_x = self.options.content_right() - PAGE_LABEL_WIDTH;
        let left = self.options.content_left();

        for index in 0..total {
            self.backend.set_page(index)?;
            self.backend.draw_text(
                &format!("Page {} of {}", index + 1, total),
                Point::new(page_x, y),
                &font,
                false,
            );
            self.backend
                .draw_text(&self.options.credit, Point::new(left, y), &font, false);
        }
        Ok(())
    }
}

/// `[DIFFICULTY] (P pts)` for the enabled parts.
fn metadata_label(question: &Question, template: &Template) -> String {
    let mut parts = Vec::new();
    if template.show_difficulty {
        if let Some(difficulty) = question.difficulty {
            parts.push(format!("[{}]", difficulty.label()));
        }
    }
    if let (true, Some(points)) = (template.show_points, question.points) {
        parts.push(format!("({} pts)", points));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::model::Difficulty;
    use crate::template::{ANSWER_KEY, STUDENT_QUIZ};

    fn composer() -> DocumentComposer {
        DocumentComposer::builder()
            .backend(RecordingBackend::a4())
            .build()
            .unwrap()
    }

    fn short_question() -> Question {
        Question::multiple_choice("q", "What is 5 + 3?", &["6", "7", "8", "9"], Letter::C)
    }

    #[test]
    fn test_builder_requires_backend() {
        let result = DocumentComposer::builder().build();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_page_size_mismatch_rejected() {
        let result = DocumentComposer::builder()
            .backend(RecordingBackend::new(100.0, 100.0))
            .build();
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_break_near_bottom() {
        let mut composer = composer();
        composer.layout.cursor_y = composer.options.bottom_limit() - 1.0;
        let placement = composer.place_question(&short_question(), 1, &STUDENT_QUIZ);
        assert_eq!(placement.page_index, 1);
        assert_eq!(placement.start_y, composer.options.margin_top);
        assert_eq!(composer.stats.page_break_count, 1);
        assert_eq!(composer.state(), ComposerState::RenderingQuestion);
    }

    #[test]
    fn test_no_break_at_page_top() {
        let mut composer = composer();
        let text = vec!["lorem"; 2000].join(" ");
        let huge = Question::multiple_choice("q", text, &["a", "b"], Letter::A);
        let placement = composer.place_question(&huge, 1, &STUDENT_QUIZ);
        assert_eq!(placement.page_index, 0);
        assert_eq!(composer.stats.page_break_count, 0);
    }

    #[test]
    fn test_short_question_height() {
        let mut composer = composer();
        composer.layout.cursor_y = 60.0;
        let placement = composer.place_question(&short_question(), 1, &STUDENT_QUIZ);
        // 6 text + 5 gap + 4 x 8 options + 15 spacing
        assert_eq!(placement.end_y - placement.start_y, 58.0);
    }

    #[test]
    fn test_metadata_label() {
        let q = short_question().with_difficulty(Difficulty::Hard).with_points(3);
        assert_eq!(metadata_label(&q, &ANSWER_KEY), "[HARD] (3 pts)");
        assert_eq!(metadata_label(&short_question().with_points(1), &ANSWER_KEY), "(1 pts)");
        // no points tag without explicit points, though totals still count one
        assert_eq!(metadata_label(&short_question(), &ANSWER_KEY), "");
        assert!(!shows_metadata(&short_question(), &ANSWER_KEY));
    }
}
