//! Benchmarks for quiz layout and PDF serialization.
//!
//! Run with: cargo bench
//!
//! These benchmarks lay out synthetic quizzes of increasing size.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quizpdf::{
    DeltaAttributes, DeltaOp, Difficulty, LayoutOptions, Letter, Question, Quiz, RichContent,
    Script, ANSWER_KEY, STUDENT_QUIZ,
};

/// Creates a quiz mixing plain, Delta and HTML questions.
fn create_test_quiz(question_count: usize) -> Quiz {
    let mut quiz = Quiz::new("Benchmark Quiz");
    for i in 0..question_count {
        let question = match i % 3 {
            0 => Question::multiple_choice(
                format!("q{}", i),
                "Which planet is closest to the sun in our solar system?",
                &["Mercury", "Venus", "Earth", "Mars"],
                Letter::A,
            ),
            1 => Question::multiple_choice(format!("q{}", i), "", &["1", "2", "4", "8"], Letter::C)
                .with_rich(RichContent::delta(vec![
                    DeltaOp::text("Evaluate 2"),
                    DeltaOp::styled("2", DeltaAttributes::script(Script::Super)),
                    DeltaOp::styled(" exactly", DeltaAttributes::bold()),
                ])),
            _ => Question::true_false(format!("q{}", i), "", true).with_rich(RichContent::html(
                "<p>The formula for water is H<sub>2</sub>O, <em>not</em> H<sub>2</sub>O<sub>2</sub>.</p>",
            )),
        };
        quiz = quiz.with_question(question.with_difficulty(Difficulty::Medium).with_points(2));
    }
    quiz
}

/// Benchmark layout at various quiz sizes.
fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");

    for question_count in [10, 50, 200].iter() {
        let quiz = create_test_quiz(*question_count);

        group.bench_function(format!("{}_questions", question_count), |b| {
            b.iter(|| quizpdf::generate_document(black_box(&quiz), &STUDENT_QUIZ).unwrap());
        });
    }

    group.finish();
}

/// Benchmark PDF serialization of a laid-out document.
fn bench_pdf_output(c: &mut Criterion) {
    let doc = quizpdf::generate_document(&create_test_quiz(50), &ANSWER_KEY).unwrap();

    c.bench_function("pdf_50_questions", |b| {
        b.iter(|| black_box(&doc).to_pdf_bytes().unwrap());
    });
}

/// Benchmark generating all templates in parallel.
fn bench_generate_all(c: &mut Criterion) {
    let quiz = create_test_quiz(50);
    let options = LayoutOptions::default();

    c.bench_function("generate_all_50_questions", |b| {
        b.iter(|| quizpdf::generate_all(black_box(&quiz), &options));
    });
}

criterion_group!(benches, bench_layout, bench_pdf_output, bench_generate_all);
criterion_main!(benches);
