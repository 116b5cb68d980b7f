//! Data model shared by the layout engine and the output writers.
//!
//! Inputs ([`Quiz`], [`Question`], [`RichContent`]) are read-only for the
//! engine; the output ([`Document`]) is a list of pages holding primitive
//! draw operations that any writer can replay.

mod document;
mod font;
mod quiz;
mod resource;
pub mod rich;
mod stats;

pub(crate) use document::check_page;
pub use document::{Document, DrawOp, Metadata, Page};
pub use font::{FontFamily, FontState, FontStyle, FontWeight};
pub use quiz::{
    Difficulty, Letter, Question, QuestionType, Quiz, QuizSummary, MAX_OPTIONS, MIN_OPTIONS,
};
pub use resource::{ImageFormat, Resource};
pub use rich::{
    DeltaAttributes, DeltaInsert, DeltaOp, RichContent, Script, ScriptOffset, StyledRun,
};
pub use stats::LayoutStats;
