use serde::{Deserialize, Serialize};

use crate::model::category::Category;

/// Fixed reward for a correct answer.
pub const POINTS_PER_QUESTION: u32 = 10;

//
// ─── CATEGORY SCORES ───────────────────────────────────────────────────────────
//

/// Score accumulators partitioned by practice category.
///
/// The total is always derived from the partitions, so it cannot drift from them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
    listening: u32,
    writing: u32,
    speaking: u32,
}

impl CategoryScores {
    pub fn add(&mut self, category: Category, points: u32) {
        let slot = match category {
            Category::Listening => &mut self.listening,
            Category::Writing => &mut self.writing,
            Category::Speaking => &mut self.speaking,
        };
        *slot = slot.saturating_add(points);
    }

    #[must_use]
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::Listening => self.listening,
            Category::Writing => self.writing,
            Category::Speaking => self.speaking,
        }
    }

    #[must_use]
    pub fn listening(&self) -> u32 {
        self.listening
    }

    #[must_use]
    pub fn writing(&self) -> u32 {
        self.writing
    }

    #[must_use]
    pub fn speaking(&self) -> u32 {
        self.speaking
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.listening
            .saturating_add(self.writing)
            .saturating_add(self.speaking)
    }
}

//
// ─── SESSION RESULTS ───────────────────────────────────────────────────────────
//

/// Aggregate results of one run through an exercise list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResults {
    question_count: u32,
    correct: u32,
    scores: CategoryScores,
}

impl SessionResults {
    #[must_use]
    pub fn new(question_count: u32) -> Self {
        Self {
            question_count,
            ..Self::default()
        }
    }

    /// Record a correct answer in `category`, worth [`POINTS_PER_QUESTION`].
    pub fn record_correct(&mut self, category: Category) {
        self.correct = self.correct.saturating_add(1);
        self.scores.add(category, POINTS_PER_QUESTION);
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn scores(&self) -> &CategoryScores {
        &self.scores
    }

    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.scores.total()
    }

    /// Total score as a share of the maximum reachable score, rounded to the nearest integer.
    ///
    /// Returns 0 for an empty session.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percentage(&self) -> u32 {
        let max = u64::from(self.question_count) * u64::from(POINTS_PER_QUESTION);
        if max == 0 {
            return 0;
        }
        let pct = f64::from(self.total_score()) / max as f64 * 100.0;
        pct.round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_sum_of_categories() {
        let mut scores = CategoryScores::default();
        scores.add(Category::Writing, 10);
        scores.add(Category::Listening, 10);
        scores.add(Category::Speaking, 10);
        scores.add(Category::Writing, 10);
        assert_eq!(scores.writing(), 20);
        assert_eq!(scores.total(), 40);
        assert_eq!(
            scores.total(),
            scores.listening() + scores.writing() + scores.speaking()
        );
    }

    #[test]
    fn percentage_rounds_to_nearest() {
        let mut results = SessionResults::new(3);
        results.record_correct(Category::Writing);
        results.record_correct(Category::Listening);
        assert_eq!(results.total_score(), 20);
        assert_eq!(results.correct(), 2);
        // 66.67 rounds up
        assert_eq!(results.percentage(), 67);
    }

    #[test]
    fn every_answer_correct_is_full_marks() {
        let mut results = SessionResults::new(2);
        results.record_correct(Category::Speaking);
        assert_eq!(results.scores().speaking(), POINTS_PER_QUESTION);
        assert_eq!(results.percentage(), 50);

        results.record_correct(Category::Writing);
        assert_eq!(results.total_score(), 2 * POINTS_PER_QUESTION);
        assert_eq!(results.percentage(), 100);
    }

    #[test]
    fn empty_session_percentage_is_zero() {
        let results = SessionResults::new(0);
        assert_eq!(results.percentage(), 0);
        assert_eq!(results.total_score(), 0);
    }
}
