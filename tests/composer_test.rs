//! Integration tests for the document composer.

use base64::Engine;
use quizpdf::backend::{DocumentBackend, RecordingBackend, ShapeStyle};
use quizpdf::error::Result;
use quizpdf::{
    generate_document, generate_with_options, Difficulty, Document, DocumentComposer, DrawOp,
    Error, FontState, LayoutOptions, LayoutStats, Letter, Metadata, PageSize, Point, Question,
    Quiz, Rect, Resource, RichContent, ANSWER_KEY, PRACTICE_SHEET, STUDENT_QUIZ,
};
use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

/// Backend that logs page switches and delegates drawing.
struct TracingBackend {
    inner: RecordingBackend,
    events: Rc<RefCell<Vec<String>>>,
}

impl TracingBackend {
    fn new(events: Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            inner: RecordingBackend::a4(),
            events,
        }
    }
}

impl DocumentBackend for TracingBackend {
    fn page_size(&self) -> (f32, f32) {
        self.inner.page_size()
    }

    fn page_count(&self) -> usize {
        self.inner.page_count()
    }

    fn current_page(&self) -> usize {
        self.inner.current_page()
    }

    fn new_page(&mut self) {
        self.events.borrow_mut().push("new_page".to_string());
        self.inner.new_page();
    }

    fn set_page(&mut self, index: usize) -> Result<()> {
        self.events.borrow_mut().push(format!("set_page {}", index));
        self.inner.set_page(index)
    }

    fn move_to(&mut self, point: Point) {
        self.inner.move_to(point);
    }

    fn line_to(&mut self, point: Point, width: f32) {
        self.inner.line_to(point, width);
    }

    fn draw_text(&mut self, text: &str, at: Point, font: &FontState, underline: bool) {
        self.inner.draw_text(text, at, font, underline);
    }

    fn draw_circle(&mut self, center: Point, radius: f32, style: ShapeStyle) {
        self.inner.draw_circle(center, radius, style);
    }

    fn add_image(&mut self, image: &Resource, rect: Rect) {
        self.inner.add_image(image, rect);
    }

    fn mark_question(&mut self, number: u32) {
        self.inner.mark_question(number);
    }

    fn finish(self: Box<Self>, metadata: Metadata, stats: LayoutStats) -> Result<Document> {
        self.events.borrow_mut().push("finish".to_string());
        Box::new(self.inner).finish(metadata, stats)
    }
}

fn png_data_uri(width: u32, height: u32) -> String {
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height))
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

fn short_question(id: &str) -> Question {
    Question::multiple_choice(id, "What is 5 + 3?", &["6", "7", "8", "9"], Letter::C)
}

fn long_question(id: &str) -> Question {
    let text = vec!["lorem"; 200].join(" ");
    Question::multiple_choice(id, text, &["alpha", "beta", "gamma", "delta"], Letter::A)
        .with_image(png_data_uri(32, 18))
}

fn texts(doc: &Document, page: usize) -> Vec<String> {
    doc.pages[page]
        .text_ops()
        .map(|(text, ..)| text.to_string())
        .collect()
}

fn option_labels(doc: &Document) -> Vec<(String, bool)> {
    doc.pages
        .iter()
        .flat_map(|page| page.text_ops())
        .filter(|(text, ..)| text.len() == 2 && text.ends_with('.') && text.as_bytes()[0].is_ascii_uppercase())
        .map(|(text, _, _, font)| (text.to_string(), font.is_bold()))
        .collect()
}

fn filled_circles(doc: &Document) -> usize {
    doc.pages
        .iter()
        .flat_map(|page| page.ops.iter())
        .filter(|op| matches!(op, DrawOp::Circle { filled: true, .. }))
        .count()
}

#[test]
fn test_builder_without_backend_fails() {
    let result = DocumentComposer::builder()
        .options(LayoutOptions::default())
        .build();
    assert!(matches!(result, Err(Error::Configuration(_))));
}

#[test]
fn test_mixed_quiz_breaks_before_long_question() {
    let quiz = Quiz::new("Scenario")
        .with_question(short_question("1"))
        .with_question(short_question("2"))
        .with_question(short_question("3"))
        .with_question(long_question("4"))
        .with_question(long_question("5"));
    let options = LayoutOptions::new().with_page_size(PageSize::Custom {
        width: 210.0,
        height: 456.0,
    });
    let doc = generate_with_options(&quiz, &STUDENT_QUIZ, options).unwrap();

    assert_eq!(doc.page_count(), 2);
    assert_eq!(doc.pages[0].questions, vec![1, 2, 3]);
    assert_eq!(doc.pages[1].questions, vec![4, 5]);
    assert_eq!(doc.stats.page_break_count, 1);
    assert_eq!(doc.stats.image_count, 2);
    assert_eq!(doc.resources.len(), 1);

    // question 4 starts at the top margin of the second page
    let first = doc.pages[1].text_ops().next().unwrap();
    assert_eq!(first.0, "4.");
    assert_eq!(first.2, 20.0);
}

#[test]
fn test_question_near_bottom_moves_to_next_page() {
    // header ends at 60; 60 + 57 exceeds the 61 mm limit
    let options = LayoutOptions::new().with_page_size(PageSize::Custom {
        width: 210.0,
        height: 81.0,
    });
    let quiz = Quiz::new("Short page").with_question(short_question("1"));
    let doc = generate_with_options(&quiz, &STUDENT_QUIZ, options).unwrap();

    assert_eq!(doc.page_count(), 2);
    assert!(doc.pages[0].questions.is_empty());
    assert_eq!(doc.pages[1].questions, vec![1]);
    let number = doc.pages[1].text_ops().find(|(t, ..)| *t == "1.").unwrap();
    assert_eq!(number.2, 20.0);
}

#[test]
fn test_highlight_only_correct_under_answer_key() {
    let quiz = Quiz::new("Key").with_question(short_question("1"));

    let key = generate_document(&quiz, &ANSWER_KEY).unwrap();
    let labels = option_labels(&key);
    assert_eq!(labels.len(), 4);
    for (label, bold) in &labels {
        assert_eq!(*bold, label == "C.", "label {}", label);
    }
    assert_eq!(filled_circles(&key), 1);
    assert_eq!(key.stats.highlighted_count, 1);

    let student = generate_document(&quiz, &STUDENT_QUIZ).unwrap();
    assert!(option_labels(&student).iter().all(|(_, bold)| !bold));
    assert_eq!(filled_circles(&student), 0);
    assert_eq!(student.stats.highlighted_count, 0);
}

#[test]
fn test_true_false_ignores_option_data() {
    let q = Question::true_false("tf", "The earth is flat", false)
        .with_option_count(6)
        .with_option(Letter::C, RichContent::plain("Maybe"));
    let doc = generate_document(&Quiz::new("TF").with_question(q), &ANSWER_KEY).unwrap();
    let all = texts(&doc, 0);
    assert!(all.contains(&"True".to_string()));
    assert!(all.contains(&"False".to_string()));
    assert!(!all.contains(&"Maybe".to_string()));
    let labels = option_labels(&doc);
    assert_eq!(
        labels,
        vec![("A.".to_string(), false), ("B.".to_string(), true)]
    );
    assert_eq!(doc.stats.option_count, 2);
}

#[test]
fn test_option_count_limits_letters() {
    let q = Question::multiple_choice("q", "Pick", &["a", "b", "c", "d", "e", "f"], Letter::B)
        .with_option_count(3);
    let doc = generate_document(&Quiz::new("Count").with_question(q), &STUDENT_QUIZ).unwrap();
    let labels: Vec<String> = option_labels(&doc).into_iter().map(|(l, _)| l).collect();
    assert_eq!(labels, vec!["A.", "B.", "C."]);
}

#[test]
fn test_six_options_answer_key() {
    let q = Question::multiple_choice("q", "Pick", &["a", "b", "c", "d", "e", "f"], Letter::F)
        .with_difficulty(Difficulty::Hard)
        .with_points(2);
    let doc = generate_document(&Quiz::new("Six").with_question(q), &ANSWER_KEY).unwrap();
    assert_eq!(doc.stats.option_count, 6);
    assert_eq!(filled_circles(&doc), 1);
    let labels = option_labels(&doc);
    assert_eq!(labels.last().unwrap(), &("F.".to_string(), true));
    assert!(texts(&doc, 0).contains(&"[HARD] (2 pts)".to_string()));
    assert!(texts(&doc, 0).contains(&"Total Questions: 1 | Total Points: 2".to_string()));
}

#[test]
fn test_editor_export_keeps_formatting_and_answers() {
    let json = r#"{
        "testName": "Editor Export",
        "questions": [
            {
                "id": "q-1",
                "question": "Bold question",
                "questionHtml": "<p><strong>Bold</strong> question</p>",
                "questionDelta": { "ops": [
                    { "insert": "Bold", "attributes": { "bold": true } },
                    { "insert": " question\n" }
                ] },
                "questionType": "multiple-choice",
                "options": { "A": "red", "B": "green", "C": "blue", "D": "gray" },
                "correctAnswer": "option2",
                "points": 1
            },
            {
                "id": "q-2",
                "question": "Unknown answer",
                "options": { "A": "yes", "B": "no" },
                "correctAnswer": "maybe"
            }
        ]
    }"#;
    let quiz = Quiz::from_json(json).unwrap();
    assert_eq!(quiz.questions.len(), 2);

    let doc = generate_document(&quiz, &ANSWER_KEY).unwrap();
    let bold_body = doc.pages[0]
        .text_ops()
        .find(|(text, ..)| *text == "Bold")
        .map(|(.., font)| font.is_bold());
    assert_eq!(bold_body, Some(true));

    let labels = option_labels(&doc);
    assert_eq!(labels[1], ("B.".to_string(), true));
    assert_eq!(doc.stats.question_count, 2);
    assert_eq!(doc.stats.invalid_question_count, 1);
}

#[test]
fn test_unscored_question_has_no_points_tag() {
    let quiz = Quiz::new("Unscored").with_question(short_question("1"));
    let doc = generate_document(&quiz, &ANSWER_KEY).unwrap();
    let all = texts(&doc, 0);
    assert!(!all.iter().any(|t| t.contains("pts")));
    assert!(all.contains(&"Total Questions: 1 | Total Points: 1".to_string()));
}

#[test]
fn test_empty_quiz_has_header_and_footer() {
    let doc = generate_document(&Quiz::default(), &STUDENT_QUIZ).unwrap();
    assert_eq!(doc.page_count(), 1);
    let all = texts(&doc, 0);
    assert_eq!(all[0], "Quiz");
    assert_eq!(all[1], "Student Quiz");
    assert!(all.iter().any(|t| t.starts_with("Name: ")));
    assert!(all.contains(&"Page 1 of 1".to_string()));
    assert!(all.iter().any(|t| t.starts_with("Generated by quizpdf v")));
    assert_eq!(doc.metadata.question_count, 0);
}

#[test]
fn test_footers_number_every_page() {
    let mut quiz = Quiz::new("Long");
    for i in 0..10 {
        quiz = quiz.with_question(short_question(&i.to_string()));
    }
    let doc = generate_document(&quiz, &STUDENT_QUIZ).unwrap();
    assert_eq!(doc.page_count(), 3);
    assert_eq!(doc.pages[0].questions, vec![1, 2, 3]);
    assert_eq!(doc.pages[1].questions, vec![4, 5, 6, 7]);
    for (index, _) in doc.pages.iter().enumerate() {
        let footer = format!("Page {} of 3", index + 1);
        assert!(texts(&doc, index).contains(&footer), "missing {}", footer);
    }
}

#[test]
fn test_footer_pass_revisits_pages() {
    let events = Rc::new(RefCell::new(Vec::new()));
    let mut quiz = Quiz::new("Traced");
    for i in 0..5 {
        quiz = quiz.with_question(short_question(&i.to_string()));
    }
    let doc = DocumentComposer::builder()
        .backend(TracingBackend::new(Rc::clone(&events)))
        .build()
        .unwrap()
        .generate(&quiz, &STUDENT_QUIZ)
        .unwrap();

    assert_eq!(doc.page_count(), 2);
    assert_eq!(
        *events.borrow(),
        vec!["new_page", "set_page 0", "set_page 1", "finish"]
    );
}

#[test]
fn test_practice_sheet_draws_answer_rules() {
    let quiz = Quiz::new("Practice")
        .with_question(short_question("1"))
        .with_question(Question::true_false("2", "Water boils at 100 C", true));
    let doc = generate_document(&quiz, &PRACTICE_SHEET).unwrap();

    assert_eq!(doc.stats.answer_rule_count, 3);
    let lines = doc.pages[0]
        .ops
        .iter()
        .filter(|op| matches!(op, DrawOp::Line { .. }))
        .count();
    // header rule plus three answer rules
    assert_eq!(lines, 4);
    assert!(!doc.pages[0]
        .ops
        .iter()
        .any(|op| matches!(op, DrawOp::Circle { .. })));
    assert!(texts(&doc, 0).contains(&"True".to_string()));
}

#[test]
fn test_bad_image_does_not_abort() {
    let q = short_question("1").with_image("data:image/png;base64,!!!!");
    let doc = generate_document(&Quiz::new("Images").with_question(q), &STUDENT_QUIZ).unwrap();
    assert_eq!(doc.stats.placeholder_count, 1);
    assert!(texts(&doc, 0).contains(&"[Image unavailable]".to_string()));
}

#[test]
fn test_invalid_question_still_rendered() {
    let q = short_question("1").with_option_count(2);
    // correct answer C is not among the two active options
    let doc = generate_document(&Quiz::new("Invalid").with_question(q), &STUDENT_QUIZ).unwrap();
    assert_eq!(doc.stats.invalid_question_count, 1);
    assert_eq!(doc.stats.question_count, 1);
}

#[test]
fn test_questions_follow_position() {
    let quiz = Quiz::new("Ordered")
        .with_question(Question::true_false("a", "Second", true).with_position(2))
        .with_question(Question::true_false("b", "First", true).with_position(1));
    let doc = generate_document(&quiz, &STUDENT_QUIZ).unwrap();
    let all = texts(&doc, 0);
    let first = all.iter().position(|t| t == "First").unwrap();
    let second = all.iter().position(|t| t == "Second").unwrap();
    assert!(first < second);
}
