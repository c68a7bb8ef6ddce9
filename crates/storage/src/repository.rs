use async_trait::async_trait;
use practice_core::model::{Category, Exercise, Lesson, LessonId, UserId, UserProfile};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Filter for exercise lookups against the content provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseQuery {
    pub category: Option<Category>,
    /// Lesson label the exercises belong to.
    pub lesson: Option<String>,
    pub limit: Option<u32>,
}

impl ExerciseQuery {
    #[must_use]
    pub fn category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_lesson(mut self, lesson: impl Into<String>) -> Self {
        self.lesson = Some(lesson.into());
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn matches(&self, exercise: &Exercise) -> bool {
        self.category.is_none_or(|c| c == exercise.category())
            && self
                .lesson
                .as_deref()
                .is_none_or(|lesson| lesson == exercise.lesson())
    }
}

/// Content provider contract for exercises.
#[async_trait]
pub trait ExerciseRepository: Send + Sync {
    /// Fetch exercises matching the query, in provider order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the provider cannot be reached or answers garbage.
    async fn list_exercises(&self, query: &ExerciseQuery) -> Result<Vec<Exercise>, StorageError>;
}

/// Content provider contract for lessons.
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// List lessons, optionally filtered by their practice category.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on provider failures.
    async fn list_lessons(&self, category: Option<Category>) -> Result<Vec<Lesson>, StorageError>;

    /// Fetch one lesson by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_lesson(&self, id: &LessonId) -> Result<Lesson, StorageError>;
}

/// Read-only profile store contract.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch the profile document for a user. `None` when the user has no profile yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_profile(&self, user: &UserId) -> Result<Option<UserProfile>, StorageError>;
}

/// Simple in-memory repository implementation for testing and offline runs.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    exercises: Arc<Mutex<Vec<Exercise>>>,
    lessons: Arc<Mutex<Vec<Lesson>>>,
    profiles: Arc<Mutex<HashMap<UserId, UserProfile>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an exercise; insertion order is the provider order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn push_exercise(&self, exercise: Exercise) -> Result<(), StorageError> {
        let mut guard = self
            .exercises
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(exercise);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn push_lesson(&self, lesson: Lesson) -> Result<(), StorageError> {
        let mut guard = self
            .lessons
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.push(lesson);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the lock is poisoned.
    pub fn upsert_profile(&self, user: UserId, profile: UserProfile) -> Result<(), StorageError> {
        let mut guard = self
            .profiles
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(user, profile);
        Ok(())
    }
}

#[async_trait]
impl ExerciseRepository for InMemoryRepository {
    async fn list_exercises(&self, query: &ExerciseQuery) -> Result<Vec<Exercise>, StorageError> {
        let guard = self
            .exercises
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let limit = query
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        Ok(guard
            .iter()
            .filter(|exercise| query.matches(exercise))
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LessonRepository for InMemoryRepository {
    async fn list_lessons(&self, category: Option<Category>) -> Result<Vec<Lesson>, StorageError> {
        let guard = self
            .lessons
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .iter()
            .filter(|lesson| category.is_none() || lesson.category() == category)
            .cloned()
            .collect())
    }

    async fn get_lesson(&self, id: &LessonId) -> Result<Lesson, StorageError> {
        let guard = self
            .lessons
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|lesson| lesson.id() == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn get_profile(&self, user: &UserId) -> Result<Option<UserProfile>, StorageError> {
        let guard = self
            .profiles
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user).cloned())
    }
}

/// Aggregates the external collaborators behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub exercises: Arc<dyn ExerciseRepository>,
    pub lessons: Arc<dyn LessonRepository>,
    pub profiles: Arc<dyn ProfileRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_in_memory(InMemoryRepository::new())
    }

    #[must_use]
    pub fn from_in_memory(repo: InMemoryRepository) -> Self {
        let exercises: Arc<dyn ExerciseRepository> = Arc::new(repo.clone());
        let lessons: Arc<dyn LessonRepository> = Arc::new(repo.clone());
        let profiles: Arc<dyn ProfileRepository> = Arc::new(repo);
        Self {
            exercises,
            lessons,
            profiles,
        }
    }

    /// Content from the delivery API, profiles from the document store.
    #[must_use]
    pub fn remote(
        content: crate::content_api::ContentClient,
        profiles: crate::profile_store::ProfileStoreClient,
    ) -> Self {
        let content = Arc::new(content);
        let exercises: Arc<dyn ExerciseRepository> = content.clone();
        let lessons: Arc<dyn LessonRepository> = content;
        let profiles: Arc<dyn ProfileRepository> = Arc::new(profiles);
        Self {
            exercises,
            lessons,
            profiles,
        }
    }
}
