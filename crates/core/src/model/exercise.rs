use thiserror::Error;

use crate::model::category::Category;
use crate::model::ids::ExerciseId;
use crate::model::media::MediaUri;

pub const DEFAULT_LESSON_LABEL: &str = "Unknown Lesson";
pub const DEFAULT_PROMPT: &str = "No prompt available";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExerciseError {
    #[error("exercise id cannot be empty")]
    EmptyId,
}

//
// ─── DRAFT (unvalidated provider record) ───────────────────────────────────────
//

/// Exercise fields as delivered by the content provider, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExerciseDraft {
    pub id: String,
    pub category: Category,
    pub lesson: Option<String>,
    pub prompt: Option<String>,
    pub correct_answer: Option<String>,
    pub choices: Vec<String>,
    pub media: Option<MediaUri>,
}

impl ExerciseDraft {
    #[must_use]
    pub fn new(id: impl Into<String>, category: Category) -> Self {
        Self {
            id: id.into(),
            category,
            lesson: None,
            prompt: None,
            correct_answer: None,
            choices: Vec::new(),
            media: None,
        }
    }

    /// Validate the draft, filling provider defaults for missing text fields.
    ///
    /// Choice-based questions without choices are still accepted: the provider has
    /// shipped such records and they must render (they simply cannot be answered
    /// correctly).
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError::EmptyId` if the id is blank.
    pub fn validate(self) -> Result<Exercise, ExerciseError> {
        if self.id.trim().is_empty() {
            return Err(ExerciseError::EmptyId);
        }

        let lesson = non_blank(self.lesson).unwrap_or_else(|| DEFAULT_LESSON_LABEL.to_string());
        let prompt = non_blank(self.prompt).unwrap_or_else(|| DEFAULT_PROMPT.to_string());

        Ok(Exercise {
            id: ExerciseId::new(self.id),
            category: self.category,
            lesson,
            prompt,
            correct_answer: self.correct_answer.unwrap_or_default(),
            choices: self.choices,
            media: self.media,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

//
// ─── VALIDATED ENTITY ──────────────────────────────────────────────────────────
//

/// A single practice question. Immutable once fetched for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    id: ExerciseId,
    category: Category,
    lesson: String,
    prompt: String,
    correct_answer: String,
    choices: Vec<String>,
    media: Option<MediaUri>,
}

impl Exercise {
    #[must_use]
    pub fn id(&self) -> &ExerciseId {
        &self.id
    }

    #[must_use]
    pub fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub fn lesson(&self) -> &str {
        &self.lesson
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn media(&self) -> Option<&MediaUri> {
        self.media.as_ref()
    }

    /// Exact string comparison against the correct answer.
    #[must_use]
    pub fn is_correct(&self, choice: &str) -> bool {
        choice == self.correct_answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn writing(id: &str, answer: &str) -> ExerciseDraft {
        ExerciseDraft {
            correct_answer: Some(answer.to_string()),
            choices: vec!["Jambo".into(), "Habari".into()],
            ..ExerciseDraft::new(id, Category::Writing)
        }
    }

    #[test]
    fn validate_fills_provider_defaults() {
        let exercise = ExerciseDraft::new("ex-1", Category::Speaking)
            .validate()
            .unwrap();
        assert_eq!(exercise.lesson(), DEFAULT_LESSON_LABEL);
        assert_eq!(exercise.prompt(), DEFAULT_PROMPT);
        assert_eq!(exercise.correct_answer(), "");
        assert!(exercise.media().is_none());
    }

    #[test]
    fn blank_id_is_rejected() {
        let err = ExerciseDraft::new("  ", Category::Writing)
            .validate()
            .unwrap_err();
        assert_eq!(err, ExerciseError::EmptyId);
    }

    #[test]
    fn correctness_is_exact_string_equality() {
        let exercise = writing("ex-2", "Jambo").validate().unwrap();
        assert!(exercise.is_correct("Jambo"));
        assert!(!exercise.is_correct("jambo"));
        assert!(!exercise.is_correct("Jambo "));
    }

    #[test]
    fn choice_question_without_choices_still_validates() {
        let exercise = ExerciseDraft::new("ex-3", Category::Listening)
            .validate()
            .unwrap();
        assert!(exercise.choices().is_empty());
        assert!(!exercise.is_correct("Jambo"));
    }
}
