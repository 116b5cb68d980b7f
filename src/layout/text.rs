//! Greedy word-wrap of styled runs.

use super::{FontStack, LayoutOptions, Point};
use crate::backend::DocumentBackend;
use crate::model::{FontState, FontStyle, FontWeight, StyledRun};

/// Font for a run, derived from the surrounding font.
///
/// Bold and italic add to the base; scripts shrink the size.
pub fn resolve_run_font(base: &FontState, run: &StyledRun) -> FontState {
    let mut font = base.with_size(base.size_pt * run.script.size_factor());
    if run.bold {
        font = font.with_weight(FontWeight::Bold);
    }
    if run.italic {
        font = font.with_style(FontStyle::Italic);
    }
    font
}

/// Split into words that keep their trailing spaces. Other whitespace
/// becomes a plain space.
fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_inclusive(|c: char| c.is_whitespace()).map(|word| {
        word.chars()
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .collect()
    })
}

/// Lays out styled runs into wrapped lines.
#[derive(Debug, Clone, Copy)]
pub struct ContentRenderer {
    line_height: f32,
}

impl ContentRenderer {
    pub fn new(line_height: f32) -> Self {
        Self { line_height }
    }

    pub fn from_options(options: &LayoutOptions) -> Self {
        Self::new(options.line_height)
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Draw `runs` starting at `origin`, wrapping at `max_width`.
    ///
    /// The base font is the current top of `fonts`; it is the current font
    /// again when this returns. Returns the cursor below the last line, or
    /// `origin.y` when there was nothing to draw.
    pub fn render(
        &self,
        backend: &mut dyn DocumentBackend,
        fonts: &mut FontStack,
        runs: &[StyledRun],
        origin: Point,
        max_width: f32,
    ) -> f32 {
        let base = fonts.current();
        let depth = fonts.depth();
        let mut x = origin.x;
        let mut y = origin.y;
        let mut line_width = 0.0_f32;
        let mut drew_any = false;

        for run in runs {
            fonts.push(resolve_run_font(&base, run));
            let font = fonts.current();
            let offset = run.script.vertical_offset();

            for word in words(&run.text) {
                let width = backend.measure_text(&word, &font);
                let blank = word.trim().is_empty();

                if line_width > 0.0 && line_width + width > max_width {
                    y += self.line_height;
                    x = origin.x;
                    line_width = 0.0;
                }
                if blank {
                    // spaces only advance, and never start a line
                    if line_width > 0.0 {
                        x += width;
                        line_width += width;
                    }
                    continue;
                }

                backend.draw_text(&word, Point::new(x, y + offset), &font, run.underline);
                drew_any = true;
                x += width;
                line_width += width;
            }

            fonts.pop();
        }
        debug_assert_eq!(fonts.depth(), depth);

        if drew_any {
            y + self.line_height
        } else {
            origin.y
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::RecordingBackend;
    use crate::model::{DrawOp, ScriptOffset};

    fn text_ops(backend: &RecordingBackend) -> Vec<(String, f32, f32, FontState)> {
        backend.pages()[0]
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, x, y, font, .. } => Some((text.clone(), *x, *y, *font)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_empty_runs_keep_origin() {
        let mut backend = RecordingBackend::a4();
        let mut fonts = FontStack::new(FontState::helvetica(11.0));
        let renderer = ContentRenderer::new(6.0);
        let y = renderer.render(&mut backend, &mut fonts, &[], Point::new(20.0, 50.0), 100.0);
        assert_eq!(y, 50.0);
        assert!(backend.pages()[0].is_empty());
    }

    #[test]
    fn test_single_line() {
        let mut backend = RecordingBackend::a4();
        let mut fonts = FontStack::new(FontState::helvetica(11.0));
        let renderer = ContentRenderer::new(6.0);
        let runs = vec![StyledRun::plain("Hello world")];
        let y = renderer.render(&mut backend, &mut fonts, &runs, Point::new(20.0, 50.0), 170.0);
        assert_eq!(y, 56.0);
        let ops = text_ops(&backend);
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].0, "Hello ");
        assert_eq!(ops[1].0, "world");
        assert!(ops[1].1 > ops[0].1);
    }

    #[test]
    fn test_wraps_to_new_line() {
        let mut backend = RecordingBackend::a4();
        let mut fonts = FontStack::new(FontState::helvetica(11.0));
        let renderer = ContentRenderer::new(6.0);
        // each "lorem " is about 10.78 mm wide
        let runs = vec![StyledRun::plain("lorem lorem lorem lorem")];
        let y = renderer.render(&mut backend, &mut fonts, &runs, Point::new(0.0, 10.0), 25.0);
        assert_eq!(y, 22.0);
        let ys: Vec<f32> = text_ops(&backend).iter().map(|op| op.2).collect();
        assert_eq!(ys, vec![10.0, 10.0, 16.0, 16.0]);
    }

    #[test]
    fn test_long_word_placed_alone() {
        let mut backend = RecordingBackend::a4();
        let mut fonts = FontStack::new(FontState::helvetica(11.0));
        let renderer = ContentRenderer::new(6.0);
        let runs = vec![StyledRun::plain("Supercalifragilistic ok")];
        let y = renderer.render(&mut backend, &mut fonts, &runs, Point::new(0.0, 0.0), 10.0);
        let ops = text_ops(&backend);
        assert_eq!(ops[0].2, 0.0);
        assert_eq!(ops[1].2, 6.0);
        assert_eq!(y, 12.0);
    }

    #[test]
    fn test_script_run_offset_and_size() {
        let mut backend = RecordingBackend::a4();
        let base = FontState::helvetica(10.0);
        let mut fonts = FontStack::new(base);
        let renderer = ContentRenderer::new(6.0);
        let runs = vec![
            StyledRun::plain("E = mc"),
            StyledRun {
                text: "2".to_string(),
                script: ScriptOffset::Super,
                ..Default::default()
            },
        ];
        renderer.render(&mut backend, &mut fonts, &runs, Point::new(0.0, 30.0), 100.0);
        let ops = text_ops(&backend);
        let last = ops.last().unwrap();
        assert_eq!(last.0, "2");
        assert_eq!(last.2, 28.0);
        assert!((last.3.size_pt - 7.0).abs() < 1e-4);
        assert_eq!(fonts.current(), base);
        assert_eq!(fonts.depth(), 0);
    }

    #[test]
    fn test_bold_run_font() {
        let base = FontState::helvetica(11.0);
        let run = StyledRun {
            text: "x".to_string(),
            bold: true,
            italic: true,
            ..Default::default()
        };
        let font = resolve_run_font(&base, &run);
        assert_eq!(font.base_font_name(), "Helvetica-BoldOblique");
        assert_eq!(font.size_pt, 11.0);
    }
}
