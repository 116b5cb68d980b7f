//! Answer options: bubble, letter and rich content.

use super::{ContentRenderer, FontStack, LayoutOptions, Point};
use crate::backend::{DocumentBackend, ShapeStyle};
use crate::model::{rich, FontWeight, Letter, RichContent};
use crate::template::{BubbleStyle, Template};

/// Renders answer options and blank answer rules.
#[derive(Debug, Clone)]
pub struct OptionRenderer {
    text: ContentRenderer,
    label_offset: f32,
    text_offset: f32,
    gap: f32,
    bubble_radius: f32,
    stroke_width: f32,
    rule_count: usize,
    rule_spacing: f32,
}

impl OptionRenderer {
    pub fn new(options: &LayoutOptions) -> Self {
        Self {
            text: ContentRenderer::from_options(options),
            label_offset: options.option_label_offset,
            text_offset: options.option_text_offset,
            gap: options.option_gap,
            bubble_radius: options.bubble_radius,
            stroke_width: options.stroke_width,
            rule_count: options.answer_rule_count,
            rule_spacing: options.answer_rule_spacing,
        }
    }

    /// Draw one option with its bubble centred on `origin.x`.
    ///
    /// `max_width` is measured from `origin.x`. Returns the cursor after the
    /// option, or `origin.y` if the option has no visible text.
    #[allow(clippy::too_many_arguments)]
    pub fn render_option(
        &self,
        backend: &mut dyn DocumentBackend,
        fonts: &mut FontStack,
        letter: Letter,
        content: &RichContent,
        template: &Template,
        is_correct: bool,
        origin: Point,
        max_width: f32,
    ) -> f32 {
        let runs = content.normalize();
        if rich::runs_plain_text(&runs).trim().is_empty() {
            return origin.y;
        }

        let highlighted = template.highlights(is_correct);
        let bubble = Point::new(origin.x, origin.y - self.bubble_radius);
        match template.bubble_style {
            BubbleStyle::Circle => backend.draw_circle(bubble, self.bubble_radius, ShapeStyle::Stroke),
            BubbleStyle::Filled => {
                backend.draw_circle(bubble, self.bubble_radius, ShapeStyle::Stroke);
                if highlighted {
                    backend.draw_circle(bubble, self.bubble_radius, ShapeStyle::Fill);
                }
            }
            BubbleStyle::None => {}
        }

        let weight = if highlighted {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        };
        fonts.push(fonts.current().with_weight(weight));
        let label_font = fonts.current();
        backend.draw_text(
            &format!("{}.", letter),
            Point::new(origin.x + self.label_offset, origin.y),
            &label_font,
            false,
        );

        let text_origin = Point::new(origin.x + self.text_offset, origin.y);
        let text_width = (max_width - self.text_offset).max(1.0);
        let y = self
            .text
            .render(backend, fonts, &runs, text_origin, text_width);
        fonts.pop();

        y + self.gap
    }

    /// Draw the fixed True/False pair; `correct` A means True.
    pub fn render_true_false(
        &self,
        backend: &mut dyn DocumentBackend,
        fonts: &mut FontStack,
        correct: Letter,
        template: &Template,
        origin: Point,
        max_width: f32,
    ) -> f32 {
        let mut y = origin.y;
        for (letter, label) in [(Letter::A, "True"), (Letter::B, "False")] {
            y = self.render_option(
                backend,
                fonts,
                letter,
                &RichContent::plain(label),
                template,
                correct == letter,
                Point::new(origin.x, y),
                max_width,
            );
        }
        y
    }

    /// Draw blank answer rules from `origin` to `right`.
    pub fn render_answer_rules(
        &self,
        backend: &mut dyn DocumentBackend,
        origin: Point,
        right: f32,
    ) -> f32 {
        let mut y = origin.y;
        for _ in 0..self.rule_count {
            backend.move_to(Point::new(origin.x, y));
            backend.line_to(Point::new(right, y), self.stroke_width);
            y += self.rule_spacing;
        }
        y
    }

    /// Number of rules [`render_answer_rules`](Self::render_answer_rules) draws.
    pub fn rule_count(&self) -> usize {
        self.rule_count
    }
}
