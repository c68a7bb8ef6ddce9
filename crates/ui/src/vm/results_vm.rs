use practice_core::model::{Category, SessionResults};
use services::session::FinishReason;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryScoreVm {
    pub label: &'static str,
    pub score: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub title: &'static str,
    pub total_score_label: String,
    pub percentage_label: String,
    pub correct_label: String,
    pub rows: Vec<CategoryScoreVm>,
    /// Shown above the score when the session did not run to the last question.
    pub notice: Option<&'static str>,
}

#[must_use]
pub fn map_results(results: &SessionResults, reason: FinishReason) -> ResultsVm {
    let rows = [Category::Listening, Category::Writing, Category::Speaking]
        .into_iter()
        .map(|category| CategoryScoreVm {
            label: category.as_str(),
            score: results.scores().get(category),
        })
        .collect();

    let notice = match reason {
        FinishReason::Completed => None,
        FinishReason::TimedOut => Some("Time's up!"),
        FinishReason::Empty => Some("No exercises available right now."),
    };

    ResultsVm {
        title: "Quiz Results",
        total_score_label: format!("Total Score: {}", results.total_score()),
        percentage_label: format!("{}%", results.percentage()),
        correct_label: format!(
            "{} out of {} questions correct",
            results.correct(),
            results.question_count()
        ),
        rows,
        notice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_results_show_rounded_percentage() {
        let mut results = SessionResults::new(3);
        results.record_correct(Category::Writing);
        results.record_correct(Category::Listening);

        let vm = map_results(&results, FinishReason::Completed);
        assert_eq!(vm.total_score_label, "Total Score: 20");
        assert_eq!(vm.percentage_label, "67%");
        assert_eq!(vm.correct_label, "2 out of 3 questions correct");
        assert_eq!(
            vm.rows,
            vec![
                CategoryScoreVm {
                    label: "Listening",
                    score: 10
                },
                CategoryScoreVm {
                    label: "Writing",
                    score: 10
                },
                CategoryScoreVm {
                    label: "Speaking",
                    score: 0
                },
            ]
        );
        assert_eq!(vm.notice, None);
    }

    #[test]
    fn empty_session_reads_zero() {
        let vm = map_results(&SessionResults::new(0), FinishReason::Empty);
        assert_eq!(vm.percentage_label, "0%");
        assert_eq!(vm.correct_label, "0 out of 0 questions correct");
        assert!(vm.notice.is_some());
    }
}
