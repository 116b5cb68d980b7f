//! Statistics collected while laying out a document.

use serde::{Deserialize, Serialize};

/// Counters gathered by the composer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStats {
    /// Total number of pages produced
    pub page_count: u32,

    /// Number of questions laid out
    pub question_count: u32,

    /// Number of answer options drawn
    pub option_count: u32,

    /// Number of options drawn highlighted as correct
    pub highlighted_count: u32,

    /// Number of images placed
    pub image_count: u32,

    /// Number of images replaced by a text placeholder
    pub placeholder_count: u32,

    /// Number of blank answer rules drawn
    pub answer_rule_count: u32,

    /// Number of page breaks taken before a question
    pub page_break_count: u32,

    /// Number of questions that failed validation but were still rendered
    pub invalid_question_count: u32,
}

impl LayoutStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_question(&mut self) {
        self.question_count += 1;
    }

    /// Count one drawn option, highlighted or not.
    pub fn add_option(&mut self, highlighted: bool) {
        self.option_count += 1;
        if highlighted {
            self.highlighted_count += 1;
        }
    }

    pub fn add_image(&mut self) {
        self.image_count += 1;
    }

    pub fn add_placeholder(&mut self) {
        self.placeholder_count += 1;
    }

    pub fn add_answer_rules(&mut self, count: u32) {
        self.answer_rule_count += count;
    }

    pub fn add_page_break(&mut self) {
        self.page_break_count += 1;
    }

    pub fn add_invalid_question(&mut self) {
        self.invalid_question_count += 1;
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &LayoutStats) {
        self.page_count += other.page_count;
        self.question_count += other.question_count;
        self.option_count += other.option_count;
        self.highlighted_count += other.highlighted_count;
        self.image_count += other.image_count;
        self.placeholder_count += other.placeholder_count;
        self.answer_rule_count += other.answer_rule_count;
        self.page_break_count += other.page_break_count;
        self.invalid_question_count += other.invalid_question_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_option() {
        let mut stats = LayoutStats::new();
        stats.add_option(false);
        stats.add_option(true);
        assert_eq!(stats.option_count, 2);
        assert_eq!(stats.highlighted_count, 1);
    }

    #[test]
    fn test_layout_stats_merge() {
        let mut stats1 = LayoutStats::new();
        stats1.question_count = 5;
        stats1.image_count = 2;

        let stats2 = LayoutStats {
            question_count: 3,
            image_count: 1,
            placeholder_count: 4,
            ..Default::default()
        };

        stats1.merge(&stats2);

        assert_eq!(stats1.question_count, 8);
        assert_eq!(stats1.image_count, 3);
        assert_eq!(stats1.placeholder_count, 4);
    }
}
