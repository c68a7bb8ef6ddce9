use std::sync::Arc;

use practice_core::model::{Category, Lesson, LessonId};
use storage::repository::{LessonRepository, StorageError};
use tracing::{debug, warn};

use crate::error::LessonServiceError;

#[derive(Clone)]
pub struct LessonService {
    repo: Arc<dyn LessonRepository>,
}

impl LessonService {
    #[must_use]
    pub fn new(repo: Arc<dyn LessonRepository>) -> Self {
        Self { repo }
    }

    /// Lessons of one category (or all), in provider order. Failures yield an empty list.
    pub async fn list(&self, category: Option<Category>) -> Vec<Lesson> {
        match self.repo.list_lessons(category).await {
            Ok(lessons) => {
                debug!(?category, count = lessons.len(), "fetched lessons");
                lessons
            }
            Err(err) => {
                warn!(?category, error = %err, "lesson fetch failed");
                Vec::new()
            }
        }
    }

    /// # Errors
    ///
    /// Returns `LessonServiceError::NotFound` for an unknown id and
    /// `LessonServiceError::Storage` for fetch failures.
    pub async fn get(&self, id: &LessonId) -> Result<Lesson, LessonServiceError> {
        match self.repo.get_lesson(id).await {
            Ok(lesson) => Ok(lesson),
            Err(StorageError::NotFound) => Err(LessonServiceError::NotFound),
            Err(err) => {
                warn!(lesson = %id, error = %err, "failed to load lesson");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use practice_core::model::LessonDraft;
    use storage::repository::InMemoryRepository;

    fn lesson(id: &str, kind: &str) -> Lesson {
        LessonDraft {
            id: id.into(),
            lesson_type: Some(kind.into()),
            ..LessonDraft::default()
        }
        .validate()
        .unwrap()
    }

    #[tokio::test]
    async fn lists_by_category_and_fetches_by_id() {
        let repo = InMemoryRepository::new();
        repo.push_lesson(lesson("a", "listening")).unwrap();
        repo.push_lesson(lesson("b", "writing")).unwrap();
        let service = LessonService::new(Arc::new(repo));

        let listening = service.list(Some(Category::Listening)).await;
        assert_eq!(listening.len(), 1);
        assert_eq!(listening[0].title(), "Unnamed Lesson");

        let fetched = service.get(&LessonId::new("b")).await.unwrap();
        assert_eq!(fetched.category(), Some(Category::Writing));

        assert!(matches!(
            service.get(&LessonId::new("zzz")).await,
            Err(LessonServiceError::NotFound)
        ));
    }
}
