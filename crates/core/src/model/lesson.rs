use thiserror::Error;

use crate::model::category::Category;
use crate::model::ids::LessonId;
use crate::model::media::MediaUri;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson id cannot be empty")]
    EmptyId,
}

/// Lesson fields as delivered by the content provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonDraft {
    pub id: String,
    pub title: Option<String>,
    pub language: Option<String>,
    pub level: Option<String>,
    pub lesson_type: Option<String>,
    pub content: Option<String>,
    pub audio: Option<MediaUri>,
    pub video: Option<MediaUri>,
}

impl LessonDraft {
    /// # Errors
    ///
    /// Returns `LessonError::EmptyId` if the id is blank.
    pub fn validate(self) -> Result<Lesson, LessonError> {
        if self.id.trim().is_empty() {
            return Err(LessonError::EmptyId);
        }

        let category = self
            .lesson_type
            .as_deref()
            .and_then(|raw| raw.parse::<Category>().ok());

        Ok(Lesson {
            id: LessonId::new(self.id),
            title: or_default(self.title, "Unnamed Lesson"),
            language: or_default(self.language, "Kiswahili"),
            level: or_default(self.level, "Beginner"),
            category,
            content: or_default(self.content, "No content available"),
            audio: self.audio,
            video: self.video,
        })
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read-only lesson as browsed on the lessons screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    language: String,
    level: String,
    category: Option<Category>,
    content: String,
    audio: Option<MediaUri>,
    video: Option<MediaUri>,
}

impl Lesson {
    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    /// `None` for lesson types outside the practice categories (e.g. video lessons).
    #[must_use]
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn audio(&self) -> Option<&MediaUri> {
        self.audio.as_ref()
    }

    #[must_use]
    pub fn video(&self) -> Option<&MediaUri> {
        self.video.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let lesson = LessonDraft {
            id: "l-1".into(),
            ..LessonDraft::default()
        }
        .validate()
        .unwrap();

        assert_eq!(lesson.title(), "Unnamed Lesson");
        assert_eq!(lesson.language(), "Kiswahili");
        assert_eq!(lesson.level(), "Beginner");
        assert_eq!(lesson.content(), "No content available");
        assert_eq!(lesson.category(), None);
    }

    #[test]
    fn lesson_type_maps_to_category() {
        let lesson = LessonDraft {
            id: "l-2".into(),
            lesson_type: Some("Listening".into()),
            ..LessonDraft::default()
        }
        .validate()
        .unwrap();
        assert_eq!(lesson.category(), Some(Category::Listening));
    }

    #[test]
    fn blank_id_is_rejected() {
        assert_eq!(
            LessonDraft::default().validate().unwrap_err(),
            LessonError::EmptyId
        );
    }
}
