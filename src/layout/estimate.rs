//! Page-break estimation.
//!
//! A cheap character-count heuristic, not a measurement: it decides whether a
//! question starts on a fresh page before any of it is drawn.

use super::LayoutOptions;
use crate::model::Question;
use crate::template::Template;

/// Lines set aside beyond the question text for `option_count` options.
pub fn fixed_line_overhead(option_count: usize) -> usize {
    option_count + 2
}

/// Predicts the vertical space a question needs.
#[derive(Debug, Clone)]
pub struct PageBreakEstimator {
    chars_per_line: usize,
    line_height: f32,
    question_spacing: f32,
    image_reservation: f32,
    bottom_limit: f32,
}

impl PageBreakEstimator {
    pub fn new(options: &LayoutOptions) -> Self {
        Self {
            chars_per_line: options.chars_per_line.max(1),
            line_height: options.line_height,
            question_spacing: options.question_spacing,
            image_reservation: options.image_reservation(),
            bottom_limit: options.bottom_limit(),
        }
    }

    /// Estimated height of `question` under `template`, spacing included.
    pub fn estimate(&self, question: &Question, template: &Template) -> f32 {
        let text_len = question.content().plain_text().chars().count();
        let text_lines = text_len.div_ceil(self.chars_per_line).max(1);
        let mut lines = text_lines + fixed_line_overhead(question.active_option_count());
        if shows_metadata(question, template) {
            lines += 1;
        }

        let image = if question.image_ref().is_some() {
            self.image_reservation
        } else {
            0.0
        };
        lines as f32 * self.line_height + image + self.question_spacing
    }

    /// Whether content of `required` height starting at `cursor_y` overflows the page.
    pub fn should_break(&self, cursor_y: f32, required: f32) -> bool {
        cursor_y + required > self.bottom_limit
    }
}

/// Whether the question header carries a difficulty/points line.
pub(crate) fn shows_metadata(question: &Question, template: &Template) -> bool {
    (template.show_points && question.points.is_some())
        || (template.show_difficulty && question.difficulty.is_some())
}
