use practice_core::model::{Category, Lesson, LessonId};
use services::{LessonService, LessonServiceError};

use crate::state::ViewError;
use crate::vm::markdown_vm::{markdown_to_html, plain_excerpt};

const EXCERPT_CHARS: usize = 80;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonListItemVm {
    pub id: LessonId,
    pub title: String,
    pub meta_label: String,
    pub excerpt: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonVm {
    pub id: LessonId,
    pub title: String,
    pub meta_label: String,
    pub content_html: String,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    /// Category used for the "Practice this lesson" button.
    pub practice: Option<Category>,
}

fn meta_label(lesson: &Lesson) -> String {
    format!("{} · {}", lesson.language(), lesson.level())
}

impl From<&Lesson> for LessonListItemVm {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id().clone(),
            title: lesson.title().to_string(),
            meta_label: meta_label(lesson),
            excerpt: plain_excerpt(lesson.content(), EXCERPT_CHARS),
        }
    }
}

impl From<&Lesson> for LessonVm {
    fn from(lesson: &Lesson) -> Self {
        Self {
            id: lesson.id().clone(),
            title: lesson.title().to_string(),
            meta_label: meta_label(lesson),
            content_html: markdown_to_html(lesson.content()),
            audio_url: lesson.audio().map(|uri| uri.as_str().to_string()),
            video_url: lesson.video().map(|uri| uri.as_str().to_string()),
            practice: lesson.category(),
        }
    }
}

#[must_use]
pub fn map_lesson_list(lessons: &[Lesson]) -> Vec<LessonListItemVm> {
    lessons.iter().map(LessonListItemVm::from).collect()
}

/// Lessons for one category; an unavailable provider yields an empty list.
pub async fn list_lessons(lessons: &LessonService, category: Option<Category>) -> Vec<LessonListItemVm> {
    map_lesson_list(&lessons.list(category).await)
}

/// # Errors
///
/// Returns `ViewError::LessonUnavailable` when the lesson is missing or cannot be fetched.
pub async fn load_lesson(lessons: &LessonService, id: &LessonId) -> Result<LessonVm, ViewError> {
    match lessons.get(id).await {
        Ok(lesson) => Ok(LessonVm::from(&lesson)),
        Err(LessonServiceError::NotFound | LessonServiceError::Storage(_)) => {
            Err(ViewError::LessonUnavailable)
        }
        Err(_) => Err(ViewError::Unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use practice_core::model::{LessonDraft, MediaUri};
    use std::sync::Arc;
    use storage::repository::InMemoryRepository;

    fn service() -> LessonService {
        let repo = InMemoryRepository::new();
        repo.push_lesson(
            LessonDraft {
                id: "greetings".into(),
                title: Some("Greetings".into()),
                lesson_type: Some("Speaking".into()),
                content: Some("## Salamu\n\nSay *Jambo* to greet someone.".into()),
                audio: Some(MediaUri::parse("//cdn.example.net/jambo.mp3").unwrap()),
                ..LessonDraft::default()
            }
            .validate()
            .unwrap(),
        )
        .unwrap();
        LessonService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn lesson_detail_renders_content() {
        let vm = load_lesson(&service(), &LessonId::new("greetings"))
            .await
            .unwrap();
        assert_eq!(vm.title, "Greetings");
        assert_eq!(vm.meta_label, "Kiswahili · Beginner");
        assert!(vm.content_html.contains("<em>Jambo</em>"));
        assert_eq!(
            vm.audio_url.as_deref(),
            Some("https://cdn.example.net/jambo.mp3")
        );
        assert_eq!(vm.practice, Some(Category::Speaking));
    }

    #[tokio::test]
    async fn missing_lesson_reports_failure() {
        let err = load_lesson(&service(), &LessonId::new("nope"))
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Failed to load lesson");
    }

    #[tokio::test]
    async fn list_items_carry_excerpt() {
        let items = list_lessons(&service(), Some(Category::Speaking)).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].excerpt, "Salamu Say Jambo to greet someone.");
        assert!(list_lessons(&service(), Some(Category::Writing)).await.is_empty());
    }
}
